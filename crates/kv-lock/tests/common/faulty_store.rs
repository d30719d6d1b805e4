//! Store wrapper for testing failure propagation and call patterns.

#![allow(dead_code)]

use kv_lock_core::error::{LockError, LockResult};
use kv_lock_core::traits::LockStore;
use kv_lock_memory::MemoryLockStore;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Store operations, for targeting failures and reading call counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    SetIfAbsent,
    Get,
    GetAndSet,
    Delete,
}

#[derive(Default)]
struct Counters {
    set_if_absent: AtomicUsize,
    get: AtomicUsize,
    get_and_set: AtomicUsize,
    delete: AtomicUsize,
}

/// Wraps a `MemoryLockStore`, counting calls and failing chosen operations.
#[derive(Clone, Default)]
pub struct FaultyStore {
    inner: MemoryLockStore,
    counters: Arc<Counters>,
    failing: Arc<Mutex<Vec<Op>>>,
    unreachable: Arc<AtomicBool>,
}

impl FaultyStore {
    pub fn new(inner: MemoryLockStore) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    pub fn inner(&self) -> &MemoryLockStore {
        &self.inner
    }

    /// Makes every call to `op` fail with a backend error.
    pub fn fail(&self, op: Op) {
        self.failing.lock().unwrap().push(op);
    }

    /// Makes every call fail with a connection error.
    pub fn disconnect(&self) {
        self.unreachable.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self, op: Op) -> usize {
        self.counter(op).load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        [Op::SetIfAbsent, Op::Get, Op::GetAndSet, Op::Delete]
            .into_iter()
            .map(|op| self.calls(op))
            .sum()
    }

    fn counter(&self, op: Op) -> &AtomicUsize {
        match op {
            Op::SetIfAbsent => &self.counters.set_if_absent,
            Op::Get => &self.counters.get,
            Op::GetAndSet => &self.counters.get_and_set,
            Op::Delete => &self.counters.delete,
        }
    }

    fn enter(&self, op: Op) -> LockResult<()> {
        self.counter(op).fetch_add(1, Ordering::SeqCst);
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(LockError::connection("store unreachable"));
        }
        if self.failing.lock().unwrap().contains(&op) {
            return Err(LockError::backend(format!("{op:?} failed")));
        }
        Ok(())
    }
}

impl LockStore for FaultyStore {
    async fn set_if_absent(&self, key: &str, value: &str) -> LockResult<bool> {
        self.enter(Op::SetIfAbsent)?;
        self.inner.set_if_absent(key, value).await
    }

    async fn get(&self, key: &str) -> LockResult<Option<String>> {
        self.enter(Op::Get)?;
        self.inner.get(key).await
    }

    async fn get_and_set(&self, key: &str, value: &str) -> LockResult<Option<String>> {
        self.enter(Op::GetAndSet)?;
        self.inner.get_and_set(key, value).await
    }

    async fn delete(&self, key: &str) -> LockResult<()> {
        self.enter(Op::Delete)?;
        self.inner.delete(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_faulty_store_counts_and_fails() {
        let store = FaultyStore::default();
        assert!(store.set_if_absent("k", "1").await.unwrap());
        store.fail(Op::Get);
        assert!(matches!(store.get("k").await, Err(LockError::Backend(_))));
        assert_eq!(store.calls(Op::SetIfAbsent), 1);
        assert_eq!(store.calls(Op::Get), 1);

        store.disconnect();
        assert!(matches!(
            store.delete("k").await,
            Err(LockError::Connection(_))
        ));
    }
}
