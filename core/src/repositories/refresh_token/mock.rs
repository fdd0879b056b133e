//! In-memory implementation of the refresh token ledger for tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::refresh_token::RefreshTokenRecord;
use crate::errors::{DomainError, RefreshTokenError};

use super::RefreshTokenRepository;

/// In-memory ledger keyed by record id.
#[derive(Clone, Default)]
pub struct MockRefreshTokenRepository {
    records: Arc<RwLock<HashMap<Uuid, RefreshTokenRecord>>>,
}

impl MockRefreshTokenRepository {
    /// Create a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RefreshTokenRepository for MockRefreshTokenRepository {
    async fn save(&self, record: RefreshTokenRecord) -> Result<RefreshTokenRecord, DomainError> {
        let mut records = self.records.write().await;

        // token_hash carries a uniqueness constraint in the real store
        if records.values().any(|r| r.token_hash == record.token_hash) {
            return Err(DomainError::Validation {
                message: "Token hash already exists".to_string(),
            });
        }

        records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefreshTokenRecord>, DomainError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn find_by_user(&self, user_id: i64) -> Result<Vec<RefreshTokenRecord>, DomainError> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update(&self, record: &RefreshTokenRecord) -> Result<(), DomainError> {
        let mut records = self.records.write().await;

        // revoked_at is terminal; a stored copy that already carries one
        // is never overwritten, so the loser of a concurrent revoke fails
        // instead of resetting the winner's timestamp.
        match records.get_mut(&record.id) {
            Some(stored) if stored.revoked_at.is_none() => {
                *stored = record.clone();
                Ok(())
            }
            Some(_) => Err(RefreshTokenError::AlreadyRevoked.into()),
            None => Err(DomainError::NotFound {
                resource: format!("refresh token {}", record.id),
            }),
        }
    }

    async fn save_rotation(
        &self,
        revoked: &RefreshTokenRecord,
        replacement: RefreshTokenRecord,
    ) -> Result<RefreshTokenRecord, DomainError> {
        let mut records = self.records.write().await;

        // The stored copy must still be active; a revoked copy means a
        // concurrent rotate/revoke already won this race.
        match records.get(&revoked.id) {
            Some(stored) if stored.revoked_at.is_none() => {}
            _ => return Err(RefreshTokenError::NotFound.into()),
        }

        records.insert(revoked.id, revoked.clone());
        records.insert(replacement.id, replacement.clone());
        Ok(replacement)
    }

    async fn delete_expired(&self) -> Result<usize, DomainError> {
        let mut records = self.records.write().await;
        let before = records.len();
        let now = chrono::Utc::now();
        records.retain(|_, r| r.expired_at > now);
        Ok(before - records.len())
    }
}
