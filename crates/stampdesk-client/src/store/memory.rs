use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{CredentialStore, StoreError};

/// Thread-safe, cloneable in-memory credential store.
///
/// Clones share the same map. The `parking_lot` lock is never held across
/// an `.await`, so the async methods complete without suspending.
///
/// Values do not outlive the process; use [`super::FileCredentialStore`]
/// for persistence.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    data: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.data.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.data.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.data.write().remove(key);
        Ok(())
    }

    fn store_name(&self) -> &str {
        "MemoryCredentialStore"
    }
}
