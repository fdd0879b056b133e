//! Key manager lifecycle tests: cold start, rotation, pruning, hydration

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use care_shared::config::KeyRotationConfig;

use crate::domain::entities::key_metadata::KeyRegistryMetadata;
use crate::domain::entities::signing_key::SigningKey;
use crate::errors::DomainError;
use crate::repositories::{KeyStore, MockKeyStore};
use crate::services::jwk::{JwkKeyManager, KeyRotationScheduler};

async fn initialized_manager(store: MockKeyStore) -> JwkKeyManager<MockKeyStore> {
    let manager = JwkKeyManager::new(store, KeyRotationConfig::default());
    manager.initialize().await.unwrap();
    manager
}

/// A signing key record that is syntactically valid but already past its
/// expiry. Its PEMs are placeholders; an expired record must be rejected
/// before its material is ever parsed.
fn expired_record(key_id: &str) -> SigningKey {
    let now = Utc::now();
    SigningKey::new(
        key_id.to_string(),
        "placeholder public pem".to_string(),
        "placeholder private pem".to_string(),
        now - Duration::days(3),
        now - Duration::days(1),
    )
    .unwrap()
}

#[tokio::test]
async fn cold_start_on_empty_store_generates_a_key() {
    let store = MockKeyStore::new();
    let manager = initialized_manager(store.clone()).await;

    let current = manager.current_key_id().await.unwrap();
    assert_eq!(store.find_current_key_id().await.unwrap(), Some(current.clone()));
    assert_eq!(store.key_count().await, 1);

    let pair = manager.current_key_pair().await.unwrap();
    assert_eq!(pair.key_id(), current);

    let metadata = manager.key_metadata().await.unwrap().unwrap();
    assert_eq!(metadata.current_key_id, current);
    assert!(metadata.active_key_ids.contains(&current));
}

#[tokio::test]
async fn cold_start_adopts_a_valid_stored_key() {
    let store = MockKeyStore::new();
    let first = initialized_manager(store.clone()).await;
    let original = first.current_key_id().await.unwrap();

    let restarted = initialized_manager(store.clone()).await;

    assert_eq!(restarted.current_key_id().await, Some(original));
    assert_eq!(store.key_count().await, 1);
}

#[tokio::test]
async fn cold_start_replaces_an_expired_stored_key() {
    let store = MockKeyStore::new();
    let stale = expired_record("stale-key");
    store.save_key(&stale, StdDuration::from_secs(60)).await.unwrap();
    store.save_current_key_id("stale-key").await.unwrap();

    let manager = initialized_manager(store.clone()).await;

    let current = manager.current_key_id().await.unwrap();
    assert_ne!(current, "stale-key");
    assert_eq!(store.find_current_key_id().await.unwrap(), Some(current));
}

#[tokio::test]
async fn uninitialized_manager_has_no_current_key() {
    let manager = JwkKeyManager::new(MockKeyStore::new(), KeyRotationConfig::default());

    assert!(manager.current_key_id().await.is_none());
    assert!(manager.current_key_pair().await.is_err());
}

#[tokio::test]
async fn unknown_key_id_resolves_to_none() {
    let manager = initialized_manager(MockKeyStore::new()).await;

    assert!(manager.get_key_pair("no-such-key").await.is_none());
}

#[tokio::test]
async fn lookup_hydrates_from_the_store_after_restart() {
    let store = MockKeyStore::new();
    let first = initialized_manager(store.clone()).await;
    let key_id = first.current_key_id().await.unwrap();

    // Fresh manager over the same store, cache empty, never initialized.
    let restarted = JwkKeyManager::new(store, KeyRotationConfig::default());

    let pair = restarted.get_key_pair(&key_id).await.unwrap();
    assert_eq!(pair.key_id(), key_id);
}

#[tokio::test]
async fn expired_stored_key_is_not_served() {
    let store = MockKeyStore::new();
    let stale = expired_record("stale-key");
    store.save_key(&stale, StdDuration::from_secs(60)).await.unwrap();

    let manager = initialized_manager(store).await;

    assert!(manager.get_key_pair("stale-key").await.is_none());
}

#[tokio::test]
async fn rotation_switches_current_and_keeps_the_old_key_resolvable() {
    let store = MockKeyStore::new();
    let manager = initialized_manager(store.clone()).await;
    let old_id = manager.current_key_id().await.unwrap();

    let new_id = manager.rotate_key().await.unwrap();

    assert_ne!(new_id, old_id);
    assert_eq!(manager.current_key_id().await, Some(new_id.clone()));
    assert!(manager.get_key_pair(&old_id).await.is_some());
    assert_eq!(store.key_count().await, 2);

    let metadata = manager.key_metadata().await.unwrap().unwrap();
    assert_eq!(metadata.current_key_id, new_id);
    assert!(metadata.active_key_ids.contains(&old_id));
    assert_eq!(metadata.total_key_count, 2);
}

#[tokio::test]
async fn rotation_prunes_the_oldest_keys_beyond_the_retention_cap() {
    let config = KeyRotationConfig {
        max_keys: 2,
        ..KeyRotationConfig::default()
    };
    let store = MockKeyStore::new();
    let manager = JwkKeyManager::new(store.clone(), config);
    manager.initialize().await.unwrap();
    let first_id = manager.current_key_id().await.unwrap();

    manager.rotate_key().await.unwrap();
    manager.rotate_key().await.unwrap();

    assert_eq!(store.key_count().await, 2);
    assert!(manager.get_key_pair(&first_id).await.is_none());
    assert!(manager.current_key_pair().await.is_ok());
}

#[tokio::test]
async fn failed_rotation_leaves_the_previous_key_current() {
    let store = FlakyKeyStore::new();
    let manager = JwkKeyManager::new(store.clone(), KeyRotationConfig::default());
    manager.initialize().await.unwrap();
    let original = manager.current_key_id().await.unwrap();

    store.fail_writes(true);
    assert!(manager.rotate_key().await.is_err());

    assert_eq!(manager.current_key_id().await, Some(original.clone()));
    let pair = manager.current_key_pair().await.unwrap();
    assert_eq!(pair.key_id(), original);
}

#[tokio::test]
async fn concurrent_lookups_converge_on_a_single_cache_entry() {
    let store = MockKeyStore::new();
    let seeded = initialized_manager(store.clone()).await;
    let key_id = seeded.current_key_id().await.unwrap();

    let manager = Arc::new(JwkKeyManager::new(store, KeyRotationConfig::default()));

    let mut handles = Vec::new();
    for _ in 0..16 {
        let manager = Arc::clone(&manager);
        let key_id = key_id.clone();
        handles.push(tokio::spawn(
            async move { manager.get_key_pair(&key_id).await },
        ));
    }

    let mut pairs = Vec::new();
    for handle in handles {
        pairs.push(handle.await.unwrap().unwrap());
    }

    // Every task sees the same hydrated entry.
    for pair in &pairs {
        assert!(Arc::ptr_eq(pair, &pairs[0]));
    }
}

#[tokio::test]
async fn scheduler_run_once_rotates_the_key() {
    let manager = Arc::new(initialized_manager(MockKeyStore::new()).await);
    let before = manager.current_key_id().await.unwrap();

    let scheduler = KeyRotationScheduler::new(Arc::clone(&manager), StdDuration::from_secs(3600));
    scheduler.run_once().await;

    let after = manager.current_key_id().await.unwrap();
    assert_ne!(before, after);
}

/// Key store whose writes can be switched to fail, for rotation failure
/// tests.
#[derive(Clone)]
struct FlakyKeyStore {
    inner: MockKeyStore,
    writes_fail: Arc<AtomicBool>,
}

impl FlakyKeyStore {
    fn new() -> Self {
        Self {
            inner: MockKeyStore::new(),
            writes_fail: Arc::new(AtomicBool::new(false)),
        }
    }

    fn fail_writes(&self, fail: bool) {
        self.writes_fail.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), DomainError> {
        if self.writes_fail.load(Ordering::SeqCst) {
            Err(DomainError::Internal {
                message: "store write refused".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl KeyStore for FlakyKeyStore {
    async fn save_current_key_id(&self, key_id: &str) -> Result<(), DomainError> {
        self.check()?;
        self.inner.save_current_key_id(key_id).await
    }

    async fn find_current_key_id(&self) -> Result<Option<String>, DomainError> {
        self.inner.find_current_key_id().await
    }

    async fn save_key(&self, key: &SigningKey, ttl: StdDuration) -> Result<(), DomainError> {
        self.check()?;
        self.inner.save_key(key, ttl).await
    }

    async fn find_key(&self, key_id: &str) -> Result<Option<SigningKey>, DomainError> {
        self.inner.find_key(key_id).await
    }

    async fn list_key_ids(&self) -> Result<Vec<String>, DomainError> {
        self.inner.list_key_ids().await
    }

    async fn delete_key(&self, key_id: &str) -> Result<(), DomainError> {
        self.check()?;
        self.inner.delete_key(key_id).await
    }

    async fn delete_expired_keys(&self) -> Result<usize, DomainError> {
        self.check()?;
        self.inner.delete_expired_keys().await
    }

    async fn save_metadata(&self, metadata: &KeyRegistryMetadata) -> Result<(), DomainError> {
        self.check()?;
        self.inner.save_metadata(metadata).await
    }

    async fn find_metadata(&self) -> Result<Option<KeyRegistryMetadata>, DomainError> {
        self.inner.find_metadata().await
    }
}
