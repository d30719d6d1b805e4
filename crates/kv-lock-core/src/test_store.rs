//! Map-backed store for the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::LockResult;
use crate::traits::LockStore;

/// A change to one key, applied just before the next matching command on it.
/// `None` deletes the key.
type Interleave = Arc<Mutex<Option<(String, Option<String>)>>>;

#[derive(Clone, Default)]
pub(crate) struct MapStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    before_get: Interleave,
    before_get_and_set: Interleave,
    calls: Arc<AtomicUsize>,
}

impl MapStore {
    pub(crate) fn put(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    pub(crate) fn value(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Simulates a rival reclaimer writing `value` between our GET and GETSET.
    pub(crate) fn before_get_and_set(&self, key: &str, value: &str) {
        *self.before_get_and_set.lock().unwrap() = Some((key.to_string(), Some(value.to_string())));
    }

    /// Simulates the holder releasing between our SET NX and GET.
    pub(crate) fn delete_before_get(&self, key: &str) {
        *self.before_get.lock().unwrap() = Some((key.to_string(), None));
    }

    /// Simulates the key being deleted between our GET and GETSET.
    pub(crate) fn delete_before_get_and_set(&self, key: &str) {
        *self.before_get_and_set.lock().unwrap() = Some((key.to_string(), None));
    }

    fn interleave(&self, slot: &Interleave, key: &str) {
        let pending = slot.lock().unwrap().take();
        match pending {
            Some((k, Some(v))) if k == key => self.put(&k, &v),
            Some((k, None)) if k == key => {
                self.entries.lock().unwrap().remove(&k);
            }
            Some(other) => *slot.lock().unwrap() = Some(other),
            None => {}
        }
    }

    fn count(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl LockStore for MapStore {
    async fn set_if_absent(&self, key: &str, value: &str) -> LockResult<bool> {
        self.count();
        let mut entries = self.entries.lock().unwrap();
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(true)
    }

    async fn get(&self, key: &str) -> LockResult<Option<String>> {
        self.count();
        self.interleave(&self.before_get, key);
        Ok(self.value(key))
    }

    async fn get_and_set(&self, key: &str, value: &str) -> LockResult<Option<String>> {
        self.count();
        self.interleave(&self.before_get_and_set, key);
        Ok(self
            .entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string()))
    }

    async fn delete(&self, key: &str) -> LockResult<()> {
        self.count();
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}
