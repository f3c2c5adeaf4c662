use std::sync::Arc;

use async_trait::async_trait;

use super::{CredentialStore, StoreError};

/// Routes to a primary store, falling back to a secondary store whenever
/// the primary errors.
///
/// Reads also consult the fallback when the primary has no value, so a
/// token written while the primary was down is still found once it
/// recovers. Removal is applied to both stores and only fails if both fail.
#[derive(Debug, Clone)]
pub struct FallbackCredentialStore {
    primary: Arc<dyn CredentialStore>,
    fallback: Arc<dyn CredentialStore>,
}

impl FallbackCredentialStore {
    /// Combine two stores.
    pub fn new(primary: Arc<dyn CredentialStore>, fallback: Arc<dyn CredentialStore>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl CredentialStore for FallbackCredentialStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.primary.get(key).await {
            Ok(Some(value)) => Ok(Some(value)),
            Ok(None) => self.fallback.get(key).await.or(Ok(None)),
            Err(e) => {
                tracing::warn!(
                    primary = self.primary.store_name(),
                    fallback = self.fallback.store_name(),
                    "credential read failed, using fallback: {e}"
                );
                self.fallback.get(key).await
            }
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        match self.primary.set(key, value).await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!(
                    primary = self.primary.store_name(),
                    fallback = self.fallback.store_name(),
                    "credential write failed, using fallback: {e}"
                );
                self.fallback.set(key, value).await
            }
        }
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let primary = self.primary.remove(key).await;
        let fallback = self.fallback.remove(key).await;
        match (primary, fallback) {
            (Err(e), Err(_)) => Err(e),
            _ => Ok(()),
        }
    }

    fn store_name(&self) -> &str {
        "FallbackCredentialStore"
    }
}
