//! Nonce issuance and single-use resolution.

use std::time::Duration;

use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::{DomainResult, NonceError};
use crate::repositories::NonceCache;

/// Time a nonce stays redeemable.
const NONCE_TTL: Duration = Duration::from_secs(5 * 60);

/// Service binding opaque nonces to user ids for the MFA hand-off.
pub struct NonceService<C: NonceCache> {
    cache: C,
    ttl: Duration,
}

impl<C: NonceCache> NonceService<C> {
    pub fn new(cache: C) -> Self {
        Self {
            cache,
            ttl: NONCE_TTL,
        }
    }

    /// Service with a custom TTL. Tests use this to exercise expiry
    /// without waiting out the real window.
    pub fn with_ttl(cache: C, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// Issues a fresh nonce bound to `user_id`.
    pub async fn issue(&self, user_id: i64) -> DomainResult<String> {
        let nonce = Uuid::new_v4().to_string();
        self.cache.put(&nonce, user_id, self.ttl).await?;

        info!(user_id, "Issued MFA nonce");
        Ok(nonce)
    }

    /// Resolves a nonce to its user id, consuming it.
    ///
    /// The read and the delete are one atomic step in the cache, so a
    /// nonce can never resolve twice. Absent, expired, and already
    /// consumed all fail the same way.
    pub async fn resolve(&self, nonce: &str) -> DomainResult<i64> {
        match self.cache.take(nonce).await? {
            Some(user_id) => {
                info!(user_id, "Resolved MFA nonce");
                Ok(user_id)
            }
            None => {
                debug!("Presented nonce is unknown, expired, or spent");
                Err(NonceError::Invalid.into())
            }
        }
    }

    /// Discards a nonce without resolving it.
    pub async fn revoke(&self, nonce: &str) -> DomainResult<()> {
        self.cache.remove(nonce).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DomainError;
    use crate::repositories::MockNonceCache;

    #[tokio::test]
    async fn issued_nonce_resolves_to_its_user() {
        let service = NonceService::new(MockNonceCache::new());

        let nonce = service.issue(42).await.unwrap();

        assert_eq!(service.resolve(&nonce).await.unwrap(), 42);
    }

    #[tokio::test]
    async fn nonce_resolves_exactly_once() {
        let service = NonceService::new(MockNonceCache::new());

        let nonce = service.issue(42).await.unwrap();
        service.resolve(&nonce).await.unwrap();

        let second = service.resolve(&nonce).await;
        assert!(matches!(
            second,
            Err(DomainError::Nonce(NonceError::Invalid))
        ));
    }

    #[tokio::test]
    async fn unknown_nonce_is_invalid() {
        let service = NonceService::new(MockNonceCache::new());

        let result = service.resolve("never-issued").await;

        assert!(matches!(
            result,
            Err(DomainError::Nonce(NonceError::Invalid))
        ));
    }

    #[tokio::test]
    async fn expired_nonce_is_invalid() {
        let service = NonceService::with_ttl(MockNonceCache::new(), Duration::from_millis(10));

        let nonce = service.issue(42).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        let result = service.resolve(&nonce).await;

        assert!(matches!(
            result,
            Err(DomainError::Nonce(NonceError::Invalid))
        ));
    }

    #[tokio::test]
    async fn revoked_nonce_is_invalid() {
        let service = NonceService::new(MockNonceCache::new());

        let nonce = service.issue(42).await.unwrap();
        service.revoke(&nonce).await.unwrap();

        let result = service.resolve(&nonce).await;

        assert!(matches!(
            result,
            Err(DomainError::Nonce(NonceError::Invalid))
        ));
    }

    #[tokio::test]
    async fn nonces_are_unique_per_issue() {
        let service = NonceService::new(MockNonceCache::new());

        let first = service.issue(42).await.unwrap();
        let second = service.issue(42).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(service.resolve(&first).await.unwrap(), 42);
        assert_eq!(service.resolve(&second).await.unwrap(), 42);
    }
}
