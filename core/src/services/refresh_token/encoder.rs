//! One-way encoding of raw refresh tokens for ledger storage.

use sha2::{Digest, Sha256};

use crate::errors::{DomainError, DomainResult};

/// Hashes raw refresh tokens before they touch the ledger.
///
/// A raw refresh JWT is far longer than bcrypt's 72-byte input cap, so the
/// token is first reduced to a SHA-256 hex digest and that digest is what
/// bcrypt works on.
pub struct RefreshTokenEncoder {
    cost: u32,
}

impl Default for RefreshTokenEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshTokenEncoder {
    /// Encoder at the default bcrypt cost.
    pub fn new() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Encoder at an explicit bcrypt cost. Tests use a low cost to keep
    /// hashing off the critical path.
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    /// Produces the storable hash of a raw token.
    pub fn encode(&self, raw_token: &str) -> DomainResult<String> {
        bcrypt::hash(Self::digest(raw_token), self.cost).map_err(|e| DomainError::Internal {
            message: format!("Token hashing failed: {}", e),
        })
    }

    /// Checks a raw token against a stored hash. Any hashing failure reads
    /// as a mismatch.
    pub fn matches(&self, raw_token: &str, encoded: &str) -> bool {
        bcrypt::verify(Self::digest(raw_token), encoded).unwrap_or(false)
    }

    fn digest(raw_token: &str) -> String {
        hex::encode(Sha256::digest(raw_token.as_bytes()))
    }
}
