//! Refresh token ledger entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{DomainError, DomainResult, RefreshTokenError};

/// Derived state of a [`RefreshTokenRecord`].
///
/// Two states, one terminal: a record leaves `Active` either by time
/// passage (no explicit transition) or by an explicit revoke/rotate.
/// Nothing leaves `Expired`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefreshTokenStatus {
    Active,
    Expired,
}

/// Durable session record for one issued refresh token.
///
/// Only the one-way hash of the raw token is ever stored. The
/// `rotated_from` back-reference chains each record to the one it
/// superseded, so an operator can trace a session's full rotation lineage
/// after a suspected compromise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    /// Unique record id
    pub id: Uuid,

    /// Owning user
    pub user_id: i64,

    /// One-way hash of the raw token (never the token itself)
    pub token_hash: String,

    /// Record this one replaced through rotation, if any
    pub rotated_from: Option<Uuid>,

    /// Client IP at issuance
    pub ip: Option<String>,

    /// Client user agent at issuance
    pub user_agent: Option<String>,

    /// Issuance timestamp
    pub issued_at: DateTime<Utc>,

    /// Expiry timestamp
    pub expired_at: DateTime<Utc>,

    /// Revocation timestamp; once set it is never unset
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshTokenRecord {
    /// Creates a new record, validating its invariants.
    pub fn new(
        user_id: i64,
        token_hash: String,
        ip: Option<String>,
        user_agent: Option<String>,
        issued_at: DateTime<Utc>,
        expired_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if token_hash.trim().is_empty() {
            return Err(DomainError::Validation {
                message: "Token hash must not be blank".to_string(),
            });
        }

        if expired_at <= issued_at {
            return Err(DomainError::Validation {
                message: "Expired at must be after issued at".to_string(),
            });
        }

        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            token_hash,
            rotated_from: None,
            ip,
            user_agent,
            issued_at,
            expired_at,
            revoked_at: None,
        })
    }

    /// Status of this record as of the given instant.
    pub fn status_at(&self, as_of: DateTime<Utc>) -> RefreshTokenStatus {
        if self.revoked_at.is_some() || as_of > self.expired_at {
            RefreshTokenStatus::Expired
        } else {
            RefreshTokenStatus::Active
        }
    }

    /// Status of this record right now.
    pub fn status(&self) -> RefreshTokenStatus {
        self.status_at(Utc::now())
    }

    /// Revokes this record. One-way terminal transition; revoking an
    /// already revoked record is an error so double-processing races are
    /// detected rather than silently absorbed.
    pub fn revoke(&mut self) -> Result<(), RefreshTokenError> {
        if self.revoked_at.is_some() {
            return Err(RefreshTokenError::AlreadyRevoked);
        }

        self.revoked_at = Some(Utc::now());
        Ok(())
    }

    /// Rotates this record: revokes it and returns the replacement carrying
    /// a `rotated_from` back-reference. Callers must persist both records
    /// as a single unit.
    pub fn rotate(
        &mut self,
        token_hash: String,
        issued_at: DateTime<Utc>,
        expired_at: DateTime<Utc>,
        ip: Option<String>,
        user_agent: Option<String>,
    ) -> DomainResult<RefreshTokenRecord> {
        let mut renewed =
            RefreshTokenRecord::new(self.user_id, token_hash, ip, user_agent, issued_at, expired_at)?;
        renewed.rotated_from = Some(self.id);

        self.revoke()?;

        Ok(renewed)
    }
}
