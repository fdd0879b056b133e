//! Rotating RSA signing key record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};

/// One asymmetric key pair record as held in the shared key store.
///
/// Created by the key manager on rotation or cold start and read-only
/// afterward. A key past its `expires_at` (or flagged inactive) is never
/// used to sign new tokens but may still verify tokens it signed while
/// active, which is what makes zero-downtime rotation possible.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningKey {
    /// Opaque, time-derived key identifier embedded in JWT headers as `kid`
    pub key_id: String,

    /// PEM-encoded RSA public key (SPKI)
    pub public_key_pem: String,

    /// PEM-encoded RSA private key (PKCS#8)
    pub private_key_pem: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// End of the validity window (creation + expiry-multiplier x rotation
    /// interval)
    pub expires_at: DateTime<Utc>,

    /// Whether the key participates in verification at all
    pub active: bool,
}

impl SigningKey {
    /// Creates a new signing key record, validating its invariants.
    pub fn new(
        key_id: String,
        public_key_pem: String,
        private_key_pem: String,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if key_id.trim().is_empty() {
            return Err(DomainError::Validation {
                message: "Key id must not be blank".to_string(),
            });
        }

        if public_key_pem.trim().is_empty() || private_key_pem.trim().is_empty() {
            return Err(DomainError::Validation {
                message: "Key material must not be empty".to_string(),
            });
        }

        if expires_at <= created_at {
            return Err(DomainError::Validation {
                message: "Key expiry must be after creation".to_string(),
            });
        }

        Ok(Self {
            key_id,
            public_key_pem,
            private_key_pem,
            created_at,
            expires_at,
            active: true,
        })
    }

    /// Whether the key's validity window has passed.
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Whether the key may still verify tokens (active and unexpired).
    pub fn is_valid(&self) -> bool {
        self.active && !self.is_expired()
    }
}

// Private key material must never reach logs.
impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("key_id", &self.key_id)
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}
