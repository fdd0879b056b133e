//! Refresh token repository trait defining the interface for ledger
//! persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::refresh_token::RefreshTokenRecord;
use crate::errors::DomainError;

/// Repository contract for the refresh token ledger.
///
/// The backing store is the authority for mutual exclusion on a given
/// token's rotate/revoke race: `save_rotation` must reject its write when
/// the record being revoked is no longer active in the store, so a losing
/// concurrent attempt surfaces as "not found as active" instead of
/// corrupting the chain.
///
/// # Security Considerations
/// - Only token hashes are ever persisted, never raw tokens
/// - `token_hash` is unique across all records
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Persist a new ledger record.
    ///
    /// # Returns
    /// * `Ok(RefreshTokenRecord)` - The saved record
    /// * `Err(DomainError)` - Save failed (e.g. duplicate token hash)
    async fn save(&self, record: RefreshTokenRecord) -> Result<RefreshTokenRecord, DomainError>;

    /// Find a record by its id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefreshTokenRecord>, DomainError>;

    /// Fetch every record belonging to a user, regardless of status.
    async fn find_by_user(&self, user_id: i64) -> Result<Vec<RefreshTokenRecord>, DomainError>;

    /// Overwrite an existing record (used for revocation).
    ///
    /// The write only lands while the stored copy is still unrevoked;
    /// `revoked_at` is terminal and a second revocation must not reset
    /// the timestamp the first one committed.
    ///
    /// # Returns
    /// * `Err(RefreshTokenError::AlreadyRevoked)` - Stored copy is already revoked
    /// * `Err(DomainError::NotFound)` - No record with that id exists
    async fn update(&self, record: &RefreshTokenRecord) -> Result<(), DomainError>;

    /// Persist a rotation: revoke the old record and insert its
    /// replacement as one unit.
    ///
    /// No concurrent reader may observe both records active or both
    /// inactive. Implementations must fail with
    /// [`RefreshTokenError::NotFound`](crate::errors::RefreshTokenError)
    /// when the stored copy of `revoked` is not active anymore, which is
    /// how a losing concurrent rotate/revoke is rejected.
    async fn save_rotation(
        &self,
        revoked: &RefreshTokenRecord,
        replacement: RefreshTokenRecord,
    ) -> Result<RefreshTokenRecord, DomainError>;

    /// Remove records whose expiry has passed.
    ///
    /// # Returns
    /// Number of records removed.
    async fn delete_expired(&self) -> Result<usize, DomainError>;
}
