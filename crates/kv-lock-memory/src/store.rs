//! Mutex-guarded map implementing the lock store primitives.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use kv_lock_core::error::LockResult;
use kv_lock_core::traits::LockStore;
use tracing::trace;

/// A thread-safe in-memory key-value store.
///
/// Every operation runs under one mutex, so all four lock primitives are
/// linearizable. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryLockStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryLockStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // Values are plain strings; a panic elsewhere cannot leave them half-written.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Unconditionally sets `key`.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries().insert(key.into(), value.into());
    }

    /// Reads `key` without going through the async interface.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.entries().clear();
    }
}

impl LockStore for MemoryLockStore {
    async fn set_if_absent(&self, key: &str, value: &str) -> LockResult<bool> {
        let mut entries = self.entries();
        if entries.contains_key(key) {
            trace!(key, "set_if_absent: key exists");
            return Ok(false);
        }
        entries.insert(key.to_string(), value.to_string());
        trace!(key, value, "set_if_absent: created");
        Ok(true)
    }

    async fn get(&self, key: &str) -> LockResult<Option<String>> {
        Ok(self.peek(key))
    }

    async fn get_and_set(&self, key: &str, value: &str) -> LockResult<Option<String>> {
        let previous = self.entries().insert(key.to_string(), value.to_string());
        trace!(key, value, previous = ?previous, "get_and_set");
        Ok(previous)
    }

    async fn delete(&self, key: &str) -> LockResult<()> {
        self.entries().remove(key);
        trace!(key, "delete");
        Ok(())
    }
}
