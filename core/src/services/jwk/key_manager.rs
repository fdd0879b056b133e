//! Rotating RSA key management for JWT signing and verification.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey};
use rand::rngs::OsRng;
use rsa::pkcs8::{DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use care_shared::config::KeyRotationConfig;

use crate::domain::entities::key_metadata::KeyRegistryMetadata;
use crate::domain::entities::signing_key::SigningKey;
use crate::errors::{DomainError, DomainResult, KeyError};
use crate::repositories::KeyStore;

use super::jwks::JwkSet;

/// A signing key record together with its decoded key material, ready for
/// signing and verification without further parsing.
pub struct CachedKeyPair {
    record: SigningKey,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    public_key: RsaPublicKey,
}

impl CachedKeyPair {
    fn from_record(record: SigningKey) -> DomainResult<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(record.private_key_pem.as_bytes())
            .map_err(|e| KeyError::InvalidKeyMaterial {
                message: format!("Invalid private key format: {}", e),
            })?;

        let decoding_key = DecodingKey::from_rsa_pem(record.public_key_pem.as_bytes())
            .map_err(|e| KeyError::InvalidKeyMaterial {
                message: format!("Invalid public key format: {}", e),
            })?;

        let public_key = RsaPublicKey::from_public_key_pem(&record.public_key_pem)
            .map_err(|e| KeyError::InvalidKeyMaterial {
                message: format!("Unparseable public key: {}", e),
            })?;

        Ok(Self {
            record,
            encoding_key,
            decoding_key,
            public_key,
        })
    }

    /// The stored record backing this pair.
    pub fn record(&self) -> &SigningKey {
        &self.record
    }

    /// Key id embedded into JWT headers as `kid`.
    pub fn key_id(&self) -> &str {
        &self.record.key_id
    }

    /// Private key handle for signing.
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    /// Public key handle for verification.
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

impl std::fmt::Debug for CachedKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedKeyPair")
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}

/// Manager for the rotating signing key set.
///
/// Owns the in-process key cache read by every verification and written
/// only by rotation and lazy hydration. The current-key-id pointer is
/// switched only after the new key is durably stored and cached, so a
/// verification in flight during rotation sees either the old or the new
/// current key, never a pointer at a missing key.
pub struct JwkKeyManager<S: KeyStore> {
    store: S,
    config: KeyRotationConfig,
    cache: RwLock<HashMap<String, Arc<CachedKeyPair>>>,
    current_key_id: RwLock<Option<String>>,
}

impl<S: KeyStore> JwkKeyManager<S> {
    /// Creates an uninitialized manager. Call [`initialize`](Self::initialize)
    /// before issuing tokens.
    pub fn new(store: S, config: KeyRotationConfig) -> Self {
        Self {
            store,
            config,
            cache: RwLock::new(HashMap::new()),
            current_key_id: RwLock::new(None),
        }
    }

    /// Cold start: adopt the stored current key when it is still valid,
    /// otherwise generate a fresh one. Hydrates the cache with every other
    /// known key and republishes metadata either way.
    pub async fn initialize(&self) -> DomainResult<()> {
        let stored_key_id = match self.store.find_current_key_id().await {
            Ok(id) => id,
            Err(e) => {
                warn!("Key store unreachable during cold start: {}", e);
                None
            }
        };

        match stored_key_id {
            Some(key_id) if self.is_key_valid(&key_id).await => {
                info!(%key_id, "Adopting stored signing key on cold start");
                *self.current_key_id.write().await = Some(key_id);
                self.hydrate_from_store().await;
            }
            _ => {
                info!("No valid stored signing key, generating a new one");
                self.generate_new_key().await?;
            }
        }

        self.publish_metadata().await;
        Ok(())
    }

    /// Returns the cached key pair for the current key id.
    ///
    /// Cache hit by construction: rotation populates the cache before it
    /// switches the pointer.
    pub async fn current_key_pair(&self) -> DomainResult<Arc<CachedKeyPair>> {
        let current = self.current_key_id.read().await.clone();
        let key_id = current.ok_or(KeyError::NoCurrentKey)?;

        self.cache
            .read()
            .await
            .get(&key_id)
            .cloned()
            .ok_or_else(|| KeyError::NoCurrentKey.into())
    }

    /// Current key id, if initialized.
    pub async fn current_key_id(&self) -> Option<String> {
        self.current_key_id.read().await.clone()
    }

    /// Looks up a key pair by id, lazily hydrating the cache from the
    /// store on miss so verification works across process restarts.
    ///
    /// Fails closed: store errors and invalid or expired records all come
    /// back as `None`, and an expired cached entry is evicted rather than
    /// served.
    pub async fn get_key_pair(&self, key_id: &str) -> Option<Arc<CachedKeyPair>> {
        let cached = self.cache.read().await.get(key_id).cloned();
        if let Some(pair) = cached {
            if pair.record.is_valid() {
                return Some(pair);
            }
            self.cache.write().await.remove(key_id);
            debug!(%key_id, "Evicted expired signing key from cache");
            return None;
        }

        // Double-checked under the write lock so concurrent misses for the
        // same key id collapse into a single store read.
        let mut cache = self.cache.write().await;
        if let Some(pair) = cache.get(key_id) {
            return pair.record.is_valid().then(|| Arc::clone(pair));
        }

        let record = match self.store.find_key(key_id).await {
            Ok(Some(record)) => record,
            Ok(None) => return None,
            Err(e) => {
                warn!(%key_id, "Key store read failed, rejecting token: {}", e);
                return None;
            }
        };

        if !record.is_valid() {
            debug!(%key_id, "Stored signing key is expired or inactive");
            return None;
        }

        match CachedKeyPair::from_record(record) {
            Ok(pair) => {
                let pair = Arc::new(pair);
                cache.insert(key_id.to_string(), Arc::clone(&pair));
                debug!(%key_id, "Hydrated signing key from store");
                Some(pair)
            }
            Err(e) => {
                error!(%key_id, "Stored signing key is unusable: {}", e);
                None
            }
        }
    }

    /// Rotates the signing key: generates a new RSA pair, publishes it,
    /// switches the current pointer, prunes retired keys, and rewrites
    /// metadata.
    ///
    /// Any failure before the pointer switch leaves the previous current
    /// key and the cache intact.
    pub async fn rotate_key(&self) -> DomainResult<String> {
        info!("Starting signing key rotation");

        let key_id = self.generate_new_key().await?;

        self.prune_keys().await;
        self.publish_metadata().await;

        info!(%key_id, "Signing key rotation complete");
        Ok(key_id)
    }

    /// Builds the publishable JWK set from every cached, still-valid key.
    /// Contains public halves only.
    pub async fn public_jwk_set(&self) -> JwkSet {
        let cache = self.cache.read().await;

        let keys: Vec<(&str, &RsaPublicKey)> = cache
            .values()
            .filter(|pair| pair.record.is_valid())
            .map(|pair| (pair.key_id(), &pair.public_key))
            .collect();

        JwkSet::from_rsa_public_keys(keys)
    }

    /// Reads the rotation metadata from the store.
    pub async fn key_metadata(&self) -> DomainResult<Option<KeyRegistryMetadata>> {
        self.store.find_metadata().await
    }

    /// Generates and publishes a new key, then switches the current
    /// pointer to it. Store-first ordering: the key must be durable and
    /// cached before any pointer mentions it.
    async fn generate_new_key(&self) -> DomainResult<String> {
        let key_id = format!("key-{}", Utc::now().timestamp_millis());
        let bits = self.config.key_size_bits;

        let (private_pem, public_pem) =
            tokio::task::spawn_blocking(move || generate_rsa_key_pair(bits))
                .await
                .map_err(|e| KeyError::GenerationFailed {
                    message: format!("Key generation task failed: {}", e),
                })??;

        let now = Utc::now();
        let expires_at = now + Duration::seconds(self.config.key_validity_secs());
        let record = SigningKey::new(key_id.clone(), public_pem, private_pem, now, expires_at)?;
        let cached = Arc::new(CachedKeyPair::from_record(record.clone())?);

        self.store.save_key(&record, self.key_ttl()).await?;
        self.cache
            .write()
            .await
            .insert(key_id.clone(), Arc::clone(&cached));

        self.store.save_current_key_id(&key_id).await?;
        *self.current_key_id.write().await = Some(key_id.clone());

        info!(%key_id, "New signing key generated");
        Ok(key_id)
    }

    /// Loads the current key and every other known key from the store
    /// into the cache. Unreadable or invalid keys are skipped.
    async fn hydrate_from_store(&self) -> usize {
        let mut hydrated = 0;

        let mut key_ids = match self.store.list_key_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                warn!("Could not list stored signing keys: {}", e);
                Vec::new()
            }
        };

        if let Some(current) = self.current_key_id.read().await.clone() {
            if !key_ids.contains(&current) {
                key_ids.push(current);
            }
        }

        for key_id in key_ids {
            if self.get_key_pair(&key_id).await.is_some() {
                hydrated += 1;
            }
        }

        info!(count = hydrated, "Hydrated signing keys from store");
        hydrated
    }

    async fn is_key_valid(&self, key_id: &str) -> bool {
        if let Some(pair) = self.cache.read().await.get(key_id) {
            return pair.record.is_valid();
        }

        match self.store.find_key(key_id).await {
            Ok(Some(record)) => record.is_valid(),
            Ok(None) => false,
            Err(e) => {
                warn!(%key_id, "Key store read failed during validity check: {}", e);
                false
            }
        }
    }

    /// Evicts the oldest non-current keys beyond `max_keys` and drops
    /// everything past its expiry, from cache and store alike. Best
    /// effort: store failures are logged, the next rotation retries.
    async fn prune_keys(&self) {
        let current = self.current_key_id.read().await.clone();
        let mut cache = self.cache.write().await;

        if cache.len() > self.config.max_keys {
            let mut evictable: Vec<(String, chrono::DateTime<Utc>)> = cache
                .iter()
                .filter(|(key_id, _)| Some(key_id.as_str()) != current.as_deref())
                .map(|(key_id, pair)| (key_id.clone(), pair.record.created_at))
                .collect();
            evictable.sort_by_key(|(_, created_at)| *created_at);

            let excess = cache.len() - self.config.max_keys;
            for (key_id, _) in evictable.into_iter().take(excess) {
                cache.remove(&key_id);
                if let Err(e) = self.store.delete_key(&key_id).await {
                    warn!(%key_id, "Failed to delete retired key from store: {}", e);
                }
                info!(%key_id, "Evicted retired signing key");
            }
        }

        let expired: Vec<String> = cache
            .iter()
            .filter(|(_, pair)| pair.record.is_expired())
            .map(|(key_id, _)| key_id.clone())
            .collect();
        for key_id in expired {
            cache.remove(&key_id);
            debug!(%key_id, "Dropped expired signing key from cache");
        }
        drop(cache);

        match self.store.delete_expired_keys().await {
            Ok(0) => {}
            Ok(count) => info!(count, "Deleted expired signing keys from store"),
            Err(e) => warn!("Failed to delete expired keys from store: {}", e),
        }
    }

    /// Rewrites the rotation metadata document. Best effort.
    async fn publish_metadata(&self) {
        let Some(current) = self.current_key_id.read().await.clone() else {
            return;
        };

        let active_key_ids: HashSet<String> = self.cache.read().await.keys().cloned().collect();
        let now = Utc::now();

        let metadata = match KeyRegistryMetadata::new(
            current,
            active_key_ids,
            now,
            now + Duration::seconds(self.config.rotation_interval_secs),
        ) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("Could not build key registry metadata: {}", e);
                return;
            }
        };

        if let Err(e) = self.store.save_metadata(&metadata).await {
            warn!("Failed to publish key registry metadata: {}", e);
        }
    }

    fn key_ttl(&self) -> StdDuration {
        StdDuration::from_secs(self.config.key_validity_secs().max(0) as u64)
    }
}

impl<S: KeyStore> std::fmt::Debug for JwkKeyManager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwkKeyManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Generates an RSA key pair and returns `(private_pem, public_pem)`.
fn generate_rsa_key_pair(bits: usize) -> Result<(String, String), DomainError> {
    let private_key = RsaPrivateKey::new(&mut OsRng, bits).map_err(|e| KeyError::GenerationFailed {
        message: format!("RSA generation failed: {}", e),
    })?;
    let public_key = private_key.to_public_key();

    let private_pem = private_key
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| KeyError::GenerationFailed {
            message: format!("Private key encoding failed: {}", e),
        })?
        .to_string();
    let public_pem = public_key
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| KeyError::GenerationFailed {
            message: format!("Public key encoding failed: {}", e),
        })?;

    Ok((private_pem, public_pem))
}
