//! Unit tests for the refresh token ledger entity.

use chrono::{Duration, Utc};

use crate::domain::entities::refresh_token::{RefreshTokenRecord, RefreshTokenStatus};
use crate::errors::{DomainError, RefreshTokenError};

fn record() -> RefreshTokenRecord {
    let now = Utc::now();
    RefreshTokenRecord::new(
        42,
        "hashed-token".to_string(),
        Some("203.0.113.7".to_string()),
        Some("ios-app".to_string()),
        now,
        now + Duration::days(14),
    )
    .unwrap()
}

#[test]
fn new_record_is_active() {
    let token = record();
    assert_eq!(token.status(), RefreshTokenStatus::Active);
    assert!(token.revoked_at.is_none());
    assert!(token.rotated_from.is_none());
}

#[test]
fn rejects_blank_hash() {
    let now = Utc::now();
    let result = RefreshTokenRecord::new(1, "  ".to_string(), None, None, now, now + Duration::days(1));
    assert!(matches!(result, Err(DomainError::Validation { .. })));
}

#[test]
fn rejects_expiry_before_issuance() {
    let now = Utc::now();
    let result =
        RefreshTokenRecord::new(1, "hash".to_string(), None, None, now, now - Duration::seconds(1));
    assert!(matches!(result, Err(DomainError::Validation { .. })));
}

#[test]
fn passing_expiry_makes_record_expired_without_transition() {
    let now = Utc::now();
    let token = RefreshTokenRecord::new(
        1,
        "hash".to_string(),
        None,
        None,
        now - Duration::days(2),
        now - Duration::days(1),
    )
    .unwrap();

    assert_eq!(token.status(), RefreshTokenStatus::Expired);
    // Still active when asked "as of" a time inside its validity window
    assert_eq!(
        token.status_at(now - Duration::days(1) - Duration::hours(1)),
        RefreshTokenStatus::Active
    );
}

#[test]
fn revoke_is_terminal() {
    let mut token = record();
    token.revoke().unwrap();

    assert_eq!(token.status(), RefreshTokenStatus::Expired);
    assert!(token.revoked_at.is_some());
}

#[test]
fn second_revoke_is_an_error() {
    let mut token = record();
    token.revoke().unwrap();

    let first_revoked_at = token.revoked_at;
    assert_eq!(token.revoke(), Err(RefreshTokenError::AlreadyRevoked));
    // The original revocation timestamp is untouched
    assert_eq!(token.revoked_at, first_revoked_at);
}

#[test]
fn rotate_revokes_old_and_links_new() {
    let mut old = record();
    let now = Utc::now();

    let renewed = old
        .rotate(
            "new-hash".to_string(),
            now,
            now + Duration::days(14),
            Some("198.51.100.2".to_string()),
            Some("android-app".to_string()),
        )
        .unwrap();

    assert_eq!(old.status(), RefreshTokenStatus::Expired);
    assert_eq!(renewed.status(), RefreshTokenStatus::Active);
    assert_eq!(renewed.rotated_from, Some(old.id));
    assert_eq!(renewed.user_id, old.user_id);
    assert_ne!(renewed.id, old.id);
}

#[test]
fn rotate_of_revoked_record_fails() {
    let mut old = record();
    old.revoke().unwrap();

    let now = Utc::now();
    let result = old.rotate("new-hash".to_string(), now, now + Duration::days(14), None, None);
    assert!(matches!(
        result,
        Err(DomainError::RefreshToken(RefreshTokenError::AlreadyRevoked))
    ));
}
