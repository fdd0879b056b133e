//! Key store trait defining the interface for the shared signing key store.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::entities::key_metadata::KeyRegistryMetadata;
use crate::domain::entities::signing_key::SigningKey;
use crate::errors::DomainError;

/// Shared, durable key-value store for signing key material.
///
/// One deployment-wide store (Redis in production) holds the current-key-id
/// pointer, per-key RSA material with expiry flags, and aggregate rotation
/// metadata. Every process instance reads and writes the same store, which
/// is what lets any instance verify tokens signed by any other.
///
/// # Security Considerations
/// - Implementations must apply the supplied TTL so orphaned key material
///   ages out of the store even if pruning never runs
/// - Store read failures during verification must surface as errors so the
///   caller can fail closed
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Persist the pointer to the key currently used for signing.
    async fn save_current_key_id(&self, key_id: &str) -> Result<(), DomainError>;

    /// Fetch the current-key-id pointer, if one has ever been published.
    async fn find_current_key_id(&self) -> Result<Option<String>, DomainError>;

    /// Persist one signing key record with a time-to-live.
    async fn save_key(&self, key: &SigningKey, ttl: Duration) -> Result<(), DomainError>;

    /// Fetch one signing key record by id.
    async fn find_key(&self, key_id: &str) -> Result<Option<SigningKey>, DomainError>;

    /// List every key id currently present in the store.
    async fn list_key_ids(&self) -> Result<Vec<String>, DomainError>;

    /// Delete one signing key record.
    async fn delete_key(&self, key_id: &str) -> Result<(), DomainError>;

    /// Delete every key whose validity window has passed.
    ///
    /// # Returns
    /// Number of keys removed.
    async fn delete_expired_keys(&self) -> Result<usize, DomainError>;

    /// Overwrite the rotation metadata document.
    async fn save_metadata(&self, metadata: &KeyRegistryMetadata) -> Result<(), DomainError>;

    /// Fetch the rotation metadata document, if published.
    async fn find_metadata(&self) -> Result<Option<KeyRegistryMetadata>, DomainError>;
}
