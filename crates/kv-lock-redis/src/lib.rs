//! Redis store backend for key-value locks.
//!
//! ```rust,no_run
//! use kv_lock_core::prelude::*;
//! use kv_lock_redis::RedisLockStore;
//! use std::time::Duration;
//!
//! # async fn run() -> LockResult<()> {
//! let store = RedisLockStore::connect("redis://localhost:6379").await?;
//! let provider = KvLockProvider::new(store);
//!
//! if let Some(handle) = provider.try_lock("nightly-report", Duration::from_secs(60)).await? {
//!     // ... generate the report ...
//!     handle.release().await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod provider;
pub mod store;

pub use provider::{RedisLockProvider, RedisLockStoreBuilder};
pub use store::RedisLockStore;
