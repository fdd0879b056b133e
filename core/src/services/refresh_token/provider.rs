//! Minting of raw refresh tokens together with their ledger material.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::domain::entities::claims::ClaimSet;
use crate::errors::DomainResult;
use crate::repositories::KeyStore;
use crate::services::token::TokenService;

use super::encoder::RefreshTokenEncoder;

/// A freshly minted refresh token and the material the ledger records for
/// it. `token` goes to the client; only `token_hash` may be persisted.
#[derive(Debug, Clone)]
pub struct RefreshTokenGrant {
    pub token: String,
    pub token_hash: String,
    pub issued_at: DateTime<Utc>,
    pub expired_at: DateTime<Utc>,
}

/// Mints refresh JWTs and their storable hashes.
pub struct RefreshTokenProvider<S: KeyStore> {
    token_service: Arc<TokenService<S>>,
    encoder: Arc<RefreshTokenEncoder>,
}

impl<S: KeyStore> RefreshTokenProvider<S> {
    pub fn new(token_service: Arc<TokenService<S>>, encoder: Arc<RefreshTokenEncoder>) -> Self {
        Self {
            token_service,
            encoder,
        }
    }

    /// Mints a refresh token for `user_id` and returns it with its hash
    /// and validity window.
    pub async fn generate(&self, user_id: i64, claims: &ClaimSet) -> DomainResult<RefreshTokenGrant> {
        let issued_at = Utc::now();
        let expired_at = issued_at + Duration::seconds(self.token_service.refresh_token_ttl_secs());

        let token = self.token_service.issue_refresh_token(user_id, claims).await?;
        let token_hash = self.encoder.encode(&token)?;

        Ok(RefreshTokenGrant {
            token,
            token_hash,
            issued_at,
            expired_at,
        })
    }
}
