//! JWT issuance and verification service.

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, decode_header, encode, Algorithm, Header, Validation};
use tracing::debug;

use care_shared::config::JwtConfig;

use crate::domain::entities::claims::{ClaimSet, Claims};
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::repositories::KeyStore;
use crate::services::jwk::JwkKeyManager;

/// Service issuing and verifying JWTs against the rotating key set.
pub struct TokenService<S: KeyStore> {
    key_manager: Arc<JwkKeyManager<S>>,
    config: JwtConfig,
}

impl<S: KeyStore> TokenService<S> {
    /// Creates a new token service.
    ///
    /// # Arguments
    ///
    /// * `key_manager` - Initialized key manager supplying signing keys
    /// * `config` - Issuer string and token TTLs
    pub fn new(key_manager: Arc<JwkKeyManager<S>>, config: JwtConfig) -> Self {
        Self {
            key_manager,
            config,
        }
    }

    /// Issues a signed access token for `user_id`.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The compact JWT
    /// * `Err(DomainError)` - No current key or signing failed
    pub async fn issue_access_token(
        &self,
        user_id: i64,
        claims: &ClaimSet,
    ) -> DomainResult<String> {
        self.issue(user_id, claims, self.config.access_token_ttl_secs)
            .await
    }

    /// Issues a signed refresh token for `user_id`.
    pub async fn issue_refresh_token(
        &self,
        user_id: i64,
        claims: &ClaimSet,
    ) -> DomainResult<String> {
        self.issue(user_id, claims, self.config.refresh_token_ttl_secs)
            .await
    }

    /// Verifies a JWT and returns its claims.
    ///
    /// Resolves the key named by the header `kid` through the key manager,
    /// then checks signature, issuer, and expiry. Every failure maps to a
    /// typed [`TokenError`]; nothing from the JWT library escapes raw, and
    /// every failure rejects the token (fail closed).
    pub async fn verify(&self, token: &str) -> DomainResult<Claims> {
        let header = decode_header(token).map_err(|e| {
            debug!("Undecodable JWT header: {}", e);
            TokenError::Malformed
        })?;

        let key_id = header.kid.ok_or_else(|| {
            debug!("JWT header carries no kid");
            TokenError::UnknownKey
        })?;

        let key_pair = self
            .key_manager
            .get_key_pair(&key_id)
            .await
            .ok_or(TokenError::UnknownKey)?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[self.config.issuer.as_str()]);
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, key_pair.decoding_key(), &validation)
            .map_err(|e| map_jwt_error(&e))?;

        Ok(token_data.claims)
    }

    /// Verifies a JWT and returns its subject (the user id string).
    pub async fn extract_subject(&self, token: &str) -> DomainResult<String> {
        let claims = self.verify(token).await?;
        Ok(claims.sub)
    }

    /// Configured refresh token TTL in seconds.
    pub fn refresh_token_ttl_secs(&self) -> i64 {
        self.config.refresh_token_ttl_secs
    }

    async fn issue(&self, user_id: i64, claims: &ClaimSet, ttl_secs: i64) -> DomainResult<String> {
        let key_pair = self.key_manager.current_key_pair().await?;

        let now = Utc::now();
        let payload = Claims::new(
            user_id,
            &self.config.issuer,
            now,
            now + Duration::seconds(ttl_secs),
            claims,
        );

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(key_pair.key_id().to_string());

        encode(&header, &payload, key_pair.encoding_key()).map_err(|e| {
            debug!("JWT signing failed: {}", e);
            DomainError::Token(TokenError::GenerationFailed)
        })
    }
}

/// Maps a `jsonwebtoken` failure onto the token error taxonomy.
fn map_jwt_error(error: &jsonwebtoken::errors::Error) -> DomainError {
    use jsonwebtoken::errors::ErrorKind;

    let kind = match error.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
        ErrorKind::InvalidIssuer => TokenError::IssuerMismatch,
        _ => TokenError::Malformed,
    };

    debug!("JWT verification failed as {:?}: {}", kind, error);
    DomainError::Token(kind)
}
