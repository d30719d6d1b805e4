//! Expiry-token distributed locks over a shared key-value store.
//!
//! A lock is one store record `key -> token`, where the token is the epoch
//! second at which the holder's lease runs out. Acquisition creates the
//! record if it is absent, or reclaims it once the stored lease has run out;
//! release deletes it only while it still holds the caller's token.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use kv_lock::*;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = KvLockProvider::new(MemoryLockStore::new());
//!
//!     // Wait up to 5 seconds for a 30 second lease
//!     let handle = provider
//!         .try_lock_for("my-resource", Duration::from_secs(30), Duration::from_secs(5))
//!         .await?
//!         .ok_or("resource busy")?;
//!
//!     println!("Doing critical work...");
//!
//!     handle.release().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Waiting policies
//!
//! - [`KvLockProvider::try_lock`]: one attempt, `Ok(None)` if busy
//! - [`KvLockProvider::try_lock_for`]: retry with backoff for a bounded time
//! - [`KvLockProvider::lock`]: retry with backoff until acquired
//! - [`KvLockProvider::lock_interruptibly`]: as `lock`, stopped by a
//!   `tokio::sync::watch` signal
//!
//! # Backends
//!
//! - `memory` (default): [`MemoryLockStore`], in-process only
//! - `redis` (default): [`RedisLockStore`], `SET NX` / `GET` / `GETSET` / `DEL`
//!
//! Any other store can be plugged in by implementing [`LockStore`].
//!
//! # Guarantees
//!
//! The lease is the only liveness mechanism: a holder that crashes keeps the
//! lock until its lease runs out. Stale-lock reclamation uses `GETSET`
//! rather than compare-and-swap, so two reclaimers racing for the same stale
//! record can both believe they won (see [`kv_lock_core::lock`]). There are
//! no fencing tokens; do not rely on this lock where two simultaneous
//! holders would corrupt data.
//!
//! # Crate Organization
//!
//! This is a meta-crate that re-exports types from:
//! - `kv-lock-core`: traits, tokens and the lock algorithm
//! - `kv-lock-memory`: in-process backend
//! - `kv-lock-redis`: Redis backend

// Re-export core types and traits
pub use kv_lock_core::*;

// Re-export memory backend
#[cfg(feature = "memory")]
#[allow(ambiguous_glob_reexports)]
pub use kv_lock_memory::*;

// Re-export redis backend
#[cfg(feature = "redis")]
#[allow(ambiguous_glob_reexports)]
pub use kv_lock_redis::*;
