//! Core traits and the acquisition/release algorithm for key-value backed locks.
//!
//! A lock is a single record `key -> token` in a shared store, where the
//! token is the epoch second at which the holder's lease runs out. Any store
//! offering atomic set-if-absent, get, get-and-set and delete can back it
//! (see [`LockStore`]).

pub mod backoff;
pub mod clock;
pub mod error;
pub mod handle;
pub mod lock;
pub mod options;
pub mod prelude;
pub mod provider;
pub mod timeout;
pub mod token;
pub mod traits;

#[cfg(test)]
mod test_store;

pub use error::{LockError, LockResult};
pub use prelude::*;
