//! Refresh token ledger service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::domain::entities::claims::ClaimSet;
use crate::domain::entities::refresh_token::{RefreshTokenRecord, RefreshTokenStatus};
use crate::errors::{DomainResult, RefreshTokenError};
use crate::repositories::{KeyStore, RefreshTokenRepository};

use super::provider::RefreshTokenProvider;
use super::RefreshTokenEncoder;

/// Service owning the refresh token lifecycle against the durable ledger.
///
/// Presenting a token that has no active ledger record, because it was
/// already rotated away or revoked, fails with
/// [`RefreshTokenError::NotFound`]. Callers treat that as the replay
/// signal.
pub struct RefreshTokenService<R, S>
where
    R: RefreshTokenRepository,
    S: KeyStore,
{
    repository: Arc<R>,
    provider: Arc<RefreshTokenProvider<S>>,
    encoder: Arc<RefreshTokenEncoder>,
}

impl<R, S> RefreshTokenService<R, S>
where
    R: RefreshTokenRepository,
    S: KeyStore,
{
    pub fn new(
        repository: Arc<R>,
        provider: Arc<RefreshTokenProvider<S>>,
        encoder: Arc<RefreshTokenEncoder>,
    ) -> Self {
        Self {
            repository,
            provider,
            encoder,
        }
    }

    /// Issues a refresh token for `user_id` and records it in the ledger.
    ///
    /// # Returns
    ///
    /// The raw token for the client and the persisted ledger record.
    pub async fn generate(
        &self,
        user_id: i64,
        claims: &ClaimSet,
        ip: Option<String>,
        user_agent: Option<String>,
    ) -> DomainResult<(String, RefreshTokenRecord)> {
        let grant = self.provider.generate(user_id, claims).await?;

        let record = RefreshTokenRecord::new(
            user_id,
            grant.token_hash,
            ip,
            user_agent,
            grant.issued_at,
            grant.expired_at,
        )?;
        let record = self.repository.save(record).await?;

        info!(user_id, record_id = %record.id, "Issued refresh token");
        Ok((grant.token, record))
    }

    /// Every ledger record belonging to `user_id`, regardless of status.
    pub async fn find_by_user(&self, user_id: i64) -> DomainResult<Vec<RefreshTokenRecord>> {
        self.repository.find_by_user(user_id).await
    }

    /// The user's records filtered by status, evaluated at `as_of` (now
    /// when absent). No status filter returns everything.
    pub async fn find_by_user_and_status(
        &self,
        user_id: i64,
        status: Option<RefreshTokenStatus>,
        as_of: Option<DateTime<Utc>>,
    ) -> DomainResult<Vec<RefreshTokenRecord>> {
        let mut records = self.repository.find_by_user(user_id).await?;

        if let Some(status) = status {
            let as_of = as_of.unwrap_or_else(Utc::now);
            records.retain(|record| record.status_at(as_of) == status);
        }

        Ok(records)
    }

    /// Resolves a raw token to the user's active ledger record.
    ///
    /// Scans the user's active records and bcrypt-matches each hash. A
    /// token whose record was revoked, rotated away, or never existed
    /// fails identically with [`RefreshTokenError::NotFound`].
    pub async fn find_by_user_and_token(
        &self,
        user_id: i64,
        raw_token: &str,
    ) -> DomainResult<RefreshTokenRecord> {
        let records = self.repository.find_by_user(user_id).await?;

        records
            .into_iter()
            .filter(|record| record.status() == RefreshTokenStatus::Active)
            .find(|record| self.encoder.matches(raw_token, &record.token_hash))
            .ok_or_else(|| {
                debug!(user_id, "No active ledger record matches presented token");
                RefreshTokenError::NotFound.into()
            })
    }

    /// Rotates a presented token: revokes its record and issues a chained
    /// replacement in one ledger write.
    ///
    /// # Returns
    ///
    /// The new raw token and its ledger record, whose `rotated_from`
    /// points at the revoked record.
    pub async fn rotate(
        &self,
        user_id: i64,
        raw_token: &str,
        claims: &ClaimSet,
        ip: Option<String>,
        user_agent: Option<String>,
    ) -> DomainResult<(String, RefreshTokenRecord)> {
        let mut current = self.find_by_user_and_token(user_id, raw_token).await?;
        let grant = self.provider.generate(user_id, claims).await?;

        let replacement = current.rotate(
            grant.token_hash,
            grant.issued_at,
            grant.expired_at,
            ip,
            user_agent,
        )?;
        let replacement = self.repository.save_rotation(&current, replacement).await?;

        info!(
            user_id,
            revoked_id = %current.id,
            replacement_id = %replacement.id,
            "Rotated refresh token"
        );
        Ok((grant.token, replacement))
    }

    /// Revokes the active record matching a presented token.
    pub async fn revoke(&self, user_id: i64, raw_token: &str) -> DomainResult<RefreshTokenRecord> {
        let mut record = self.find_by_user_and_token(user_id, raw_token).await?;

        record.revoke()?;
        self.repository.update(&record).await?;

        info!(user_id, record_id = %record.id, "Revoked refresh token");
        Ok(record)
    }

    /// Revokes every active record of a user. Used when a rotation chain
    /// is found replayed and the whole session family must die.
    pub async fn revoke_all(&self, user_id: i64) -> DomainResult<usize> {
        let records = self
            .find_by_user_and_status(user_id, Some(RefreshTokenStatus::Active), None)
            .await?;

        let mut revoked = 0;
        for mut record in records {
            if record.revoke().is_ok() {
                self.repository.update(&record).await?;
                revoked += 1;
            }
        }

        if revoked > 0 {
            warn!(user_id, count = revoked, "Revoked all active refresh tokens");
        }
        Ok(revoked)
    }

    /// Deletes records past their expiry.
    pub async fn purge_expired(&self) -> DomainResult<usize> {
        let purged = self.repository.delete_expired().await?;
        if purged > 0 {
            info!(count = purged, "Purged expired refresh tokens");
        }
        Ok(purged)
    }
}
