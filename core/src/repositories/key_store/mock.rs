//! In-memory implementation of the key store for tests and single-node use.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::entities::key_metadata::KeyRegistryMetadata;
use crate::domain::entities::signing_key::SigningKey;
use crate::errors::DomainError;

use super::KeyStore;

/// In-memory key store backed by a shared map.
///
/// TTLs are not enforced on read; expiry is handled through the records'
/// own `expires_at`, which is what `delete_expired_keys` scans.
#[derive(Clone, Default)]
pub struct MockKeyStore {
    inner: Arc<RwLock<MockKeyStoreState>>,
}

#[derive(Default)]
struct MockKeyStoreState {
    current_key_id: Option<String>,
    keys: HashMap<String, SigningKey>,
    metadata: Option<KeyRegistryMetadata>,
}

impl MockKeyStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held. Test helper.
    pub async fn key_count(&self) -> usize {
        self.inner.read().await.keys.len()
    }
}

#[async_trait]
impl KeyStore for MockKeyStore {
    async fn save_current_key_id(&self, key_id: &str) -> Result<(), DomainError> {
        self.inner.write().await.current_key_id = Some(key_id.to_string());
        Ok(())
    }

    async fn find_current_key_id(&self) -> Result<Option<String>, DomainError> {
        Ok(self.inner.read().await.current_key_id.clone())
    }

    async fn save_key(&self, key: &SigningKey, _ttl: Duration) -> Result<(), DomainError> {
        self.inner
            .write()
            .await
            .keys
            .insert(key.key_id.clone(), key.clone());
        Ok(())
    }

    async fn find_key(&self, key_id: &str) -> Result<Option<SigningKey>, DomainError> {
        Ok(self.inner.read().await.keys.get(key_id).cloned())
    }

    async fn list_key_ids(&self) -> Result<Vec<String>, DomainError> {
        Ok(self.inner.read().await.keys.keys().cloned().collect())
    }

    async fn delete_key(&self, key_id: &str) -> Result<(), DomainError> {
        self.inner.write().await.keys.remove(key_id);
        Ok(())
    }

    async fn delete_expired_keys(&self) -> Result<usize, DomainError> {
        let mut state = self.inner.write().await;
        let before = state.keys.len();
        state.keys.retain(|_, key| !key.is_expired());
        Ok(before - state.keys.len())
    }

    async fn save_metadata(&self, metadata: &KeyRegistryMetadata) -> Result<(), DomainError> {
        self.inner.write().await.metadata = Some(metadata.clone());
        Ok(())
    }

    async fn find_metadata(&self) -> Result<Option<KeyRegistryMetadata>, DomainError> {
        Ok(self.inner.read().await.metadata.clone())
    }
}
