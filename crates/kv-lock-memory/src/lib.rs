//! In-process store backend for key-value locks.
//!
//! Useful for tests and for serializing tasks within one process; locks
//! taken here are invisible to other processes.

pub mod store;

pub use store::MemoryLockStore;
