use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};

use crate::errors::{StoreError, StoreResult};

use super::KeyValueStore;

/// In-process slots. Clones share the same underlying map, so a test can keep a
/// handle while the store owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: Arc<Mutex<HashMap<String, String>>>,
    reject_writes: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose `key` slot already holds `value`.
    pub fn with_slot(key: &str, value: impl Into<String>) -> Self {
        let store = Self::new();
        store.insert_raw(key, value);
        store
    }

    /// Writes `value` without going through [`KeyValueStore::set`].
    pub fn insert_raw(&self, key: &str, value: impl Into<String>) {
        if let Ok(mut slots) = self.slots.lock() {
            slots.insert(key.to_string(), value.into());
        }
    }

    /// Makes every subsequent `set` fail, simulating an unavailable backend.
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let slots = self
            .slots
            .lock()
            .map_err(|_| StoreError::Storage("memory store lock poisoned".into()))?;
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Storage(format!(
                "slot `{}` is not writable",
                key
            )));
        }
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| StoreError::Storage("memory store lock poisoned".into()))?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
