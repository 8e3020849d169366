//! In-memory slots, scoped to the process lifetime

use super::{KeyValueStore, StoreError, StoreResult};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let slots = self
            .slots
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store poisoned".to_string()))?;
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.slots
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store poisoned".to_string()))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
