//! In-memory nonce cache for tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::errors::DomainError;

use super::NonceCache;

/// In-memory nonce cache with per-entry expiry instants.
#[derive(Clone, Default)]
pub struct MockNonceCache {
    entries: Arc<Mutex<HashMap<String, (i64, Instant)>>>,
}

impl MockNonceCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NonceCache for MockNonceCache {
    async fn put(&self, nonce: &str, user_id: i64, ttl: Duration) -> Result<(), DomainError> {
        self.entries
            .lock()
            .await
            .insert(nonce.to_string(), (user_id, Instant::now() + ttl));
        Ok(())
    }

    async fn take(&self, nonce: &str) -> Result<Option<i64>, DomainError> {
        let mut entries = self.entries.lock().await;

        match entries.remove(nonce) {
            Some((user_id, expires_at)) if Instant::now() < expires_at => Ok(Some(user_id)),
            _ => Ok(None),
        }
    }

    async fn remove(&self, nonce: &str) -> Result<(), DomainError> {
        self.entries.lock().await.remove(nonce);
        Ok(())
    }
}
