//! Redis-backed MFA nonce cache.

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use care_core::errors::DomainError;
use care_core::repositories::NonceCache;

use super::redis_client::RedisClient;

const NONCE_PREFIX: &str = "mfa:nonce:";

/// [`NonceCache`] over Redis.
///
/// Bindings live at `mfa:nonce:{nonce}` under a Redis TTL; `take` rides on
/// `GETDEL` so the read and the delete are one server-side step.
#[derive(Clone)]
pub struct RedisNonceCache {
    client: RedisClient,
}

impl RedisNonceCache {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    fn nonce_key(nonce: &str) -> String {
        format!("{}{}", NONCE_PREFIX, nonce)
    }
}

#[async_trait]
impl NonceCache for RedisNonceCache {
    async fn put(&self, nonce: &str, user_id: i64, ttl: Duration) -> Result<(), DomainError> {
        self.client
            .set_with_expiry(
                &Self::nonce_key(nonce),
                &user_id.to_string(),
                ttl.as_secs().max(1),
            )
            .await?;
        Ok(())
    }

    async fn take(&self, nonce: &str) -> Result<Option<i64>, DomainError> {
        let Some(value) = self.client.get_del(&Self::nonce_key(nonce)).await? else {
            return Ok(None);
        };

        match value.parse() {
            Ok(user_id) => Ok(Some(user_id)),
            Err(_) => {
                // Unparseable binding is treated as absent; the nonce is
                // already consumed at this point.
                warn!("Discarding corrupt nonce binding");
                Ok(None)
            }
        }
    }

    async fn remove(&self, nonce: &str) -> Result<(), DomainError> {
        self.client.delete(&Self::nonce_key(nonce)).await?;
        Ok(())
    }
}
