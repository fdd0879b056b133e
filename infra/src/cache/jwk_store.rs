//! Redis-backed signing key store shared by every service instance.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use care_core::domain::entities::key_metadata::KeyRegistryMetadata;
use care_core::domain::entities::signing_key::SigningKey;
use care_core::errors::DomainError;
use care_core::repositories::KeyStore;

use super::redis_client::RedisClient;

const KEY_DATA_PREFIX: &str = "jwk:data:";
const METADATA_KEY: &str = "jwk:metadata";
const CURRENT_KEY_ID_KEY: &str = "jwk:current-key-id";

/// [`KeyStore`] over Redis.
///
/// Key records live at `jwk:data:{key_id}` as JSON with a TTL matching the
/// record's own validity window, so Redis drops retired material on its
/// own even if pruning never runs. The current-key pointer and the
/// rotation metadata are plain keys without TTL.
#[derive(Clone)]
pub struct RedisKeyStore {
    client: RedisClient,
}

impl RedisKeyStore {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    fn data_key(key_id: &str) -> String {
        format!("{}{}", KEY_DATA_PREFIX, key_id)
    }
}

#[async_trait]
impl KeyStore for RedisKeyStore {
    async fn save_current_key_id(&self, key_id: &str) -> Result<(), DomainError> {
        self.client.set(CURRENT_KEY_ID_KEY, key_id).await?;
        Ok(())
    }

    async fn find_current_key_id(&self) -> Result<Option<String>, DomainError> {
        Ok(self.client.get(CURRENT_KEY_ID_KEY).await?)
    }

    async fn save_key(&self, key: &SigningKey, ttl: Duration) -> Result<(), DomainError> {
        let payload = serde_json::to_string(key).map_err(|e| DomainError::Internal {
            message: format!("Failed to serialize signing key: {}", e),
        })?;

        self.client
            .set_with_expiry(&Self::data_key(&key.key_id), &payload, ttl.as_secs().max(1))
            .await?;

        debug!(key_id = %key.key_id, "Stored signing key");
        Ok(())
    }

    async fn find_key(&self, key_id: &str) -> Result<Option<SigningKey>, DomainError> {
        let Some(payload) = self.client.get(&Self::data_key(key_id)).await? else {
            return Ok(None);
        };

        let key = serde_json::from_str(&payload).map_err(|e| DomainError::Internal {
            message: format!("Corrupt signing key record for '{}': {}", key_id, e),
        })?;

        Ok(Some(key))
    }

    async fn list_key_ids(&self) -> Result<Vec<String>, DomainError> {
        let keys = self
            .client
            .scan_keys(&format!("{}*", KEY_DATA_PREFIX))
            .await?;

        Ok(keys
            .into_iter()
            .filter_map(|key| key.strip_prefix(KEY_DATA_PREFIX).map(str::to_string))
            .collect())
    }

    async fn delete_key(&self, key_id: &str) -> Result<(), DomainError> {
        self.client.delete(&Self::data_key(key_id)).await?;
        Ok(())
    }

    async fn delete_expired_keys(&self) -> Result<usize, DomainError> {
        // Redis TTLs already cover most of this; the sweep catches records
        // whose entity-level expiry is shorter than their key TTL.
        let mut deleted = 0;

        for key_id in self.list_key_ids().await? {
            match self.find_key(&key_id).await {
                Ok(Some(record)) if record.is_expired() => {
                    self.delete_key(&key_id).await?;
                    deleted += 1;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(%key_id, "Skipping unreadable key record during sweep: {}", e);
                }
            }
        }

        Ok(deleted)
    }

    async fn save_metadata(&self, metadata: &KeyRegistryMetadata) -> Result<(), DomainError> {
        let payload = serde_json::to_string(metadata).map_err(|e| DomainError::Internal {
            message: format!("Failed to serialize key metadata: {}", e),
        })?;

        self.client.set(METADATA_KEY, &payload).await?;
        Ok(())
    }

    async fn find_metadata(&self) -> Result<Option<KeyRegistryMetadata>, DomainError> {
        let Some(payload) = self.client.get(METADATA_KEY).await? else {
            return Ok(None);
        };

        let metadata = serde_json::from_str(&payload).map_err(|e| DomainError::Internal {
            message: format!("Corrupt key metadata record: {}", e),
        })?;

        Ok(Some(metadata))
    }
}
