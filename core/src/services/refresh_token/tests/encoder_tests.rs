//! Tests for refresh token hashing

use crate::services::refresh_token::RefreshTokenEncoder;

const TEST_COST: u32 = 4;

#[test]
fn encoded_hash_matches_its_token() {
    let encoder = RefreshTokenEncoder::with_cost(TEST_COST);

    let hash = encoder.encode("some-refresh-token").unwrap();

    assert_ne!(hash, "some-refresh-token");
    assert!(encoder.matches("some-refresh-token", &hash));
}

#[test]
fn wrong_token_does_not_match() {
    let encoder = RefreshTokenEncoder::with_cost(TEST_COST);

    let hash = encoder.encode("some-refresh-token").unwrap();

    assert!(!encoder.matches("other-refresh-token", &hash));
}

#[test]
fn tokens_longer_than_bcrypt_cap_are_distinguished() {
    // bcrypt truncates input at 72 bytes; the SHA-256 pre-hash keeps long
    // tokens that share a prefix distinguishable.
    let encoder = RefreshTokenEncoder::with_cost(TEST_COST);
    let prefix = "a".repeat(100);
    let first = format!("{}-first", prefix);
    let second = format!("{}-second", prefix);

    let hash = encoder.encode(&first).unwrap();

    assert!(encoder.matches(&first, &hash));
    assert!(!encoder.matches(&second, &hash));
}

#[test]
fn encoding_is_salted() {
    let encoder = RefreshTokenEncoder::with_cost(TEST_COST);

    let first = encoder.encode("some-refresh-token").unwrap();
    let second = encoder.encode("some-refresh-token").unwrap();

    assert_ne!(first, second);
    assert!(encoder.matches("some-refresh-token", &first));
    assert!(encoder.matches("some-refresh-token", &second));
}

#[test]
fn garbage_stored_hash_reads_as_mismatch() {
    let encoder = RefreshTokenEncoder::with_cost(TEST_COST);

    assert!(!encoder.matches("some-refresh-token", "not-a-bcrypt-hash"));
}
