//! Nonce cache trait for the MFA step-up hand-off.

use std::time::Duration;

use async_trait::async_trait;

use crate::errors::DomainError;

/// Short-lived nonce-to-user-id mapping.
///
/// Entries expire on their own after the supplied TTL; `take` is the
/// consume path and must remove the entry atomically with the read so a
/// nonce can never resolve twice.
#[async_trait]
pub trait NonceCache: Send + Sync {
    /// Bind a nonce to a user id for `ttl`.
    async fn put(&self, nonce: &str, user_id: i64, ttl: Duration) -> Result<(), DomainError>;

    /// Atomically fetch and delete the binding. `None` when the nonce is
    /// absent, expired, or was already consumed.
    async fn take(&self, nonce: &str) -> Result<Option<i64>, DomainError>;

    /// Delete the binding without resolving it.
    async fn remove(&self, nonce: &str) -> Result<(), DomainError>;
}
