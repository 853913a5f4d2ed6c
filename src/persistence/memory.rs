//! In-memory key-value store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{KeyValueStore, StoreError};

/// Process-local store; contents vanish on shutdown.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with `value` already stored under `key`.
    #[must_use]
    pub fn with_slot(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        let mut slots = HashMap::new();
        slots.insert(key.into(), value.into());
        Self {
            slots: RwLock::new(slots),
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.slots.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.slots
            .write()
            .await
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }
}
