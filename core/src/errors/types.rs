//! Error type definitions for token, refresh token, nonce, and signing key
//! operations.
//!
//! Every failure in the token lifecycle surfaces as one of these enumerable
//! kinds; no error from the underlying JWT or crypto libraries crosses a
//! service boundary untyped.

use thiserror::Error;

/// JWT verification and issuance errors
///
/// Verification failures are always fail-closed: any of these kinds means
/// the presented token is rejected.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    /// Structurally invalid token (wrong segment count, undecodable
    /// header or payload)
    #[error("Malformed token")]
    Malformed,

    /// Signature valid but past its expiry
    #[error("Token expired")]
    Expired,

    /// The header carries no key id, or the referenced signing key is not
    /// resolvable (deleted, expired, or never existed)
    #[error("Unknown signing key")]
    UnknownKey,

    /// Signature verification failed against the resolved key
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Issuer claim does not match the configured issuer
    #[error("Token issuer mismatch")]
    IssuerMismatch,

    /// Token could not be signed
    #[error("Token generation failed")]
    GenerationFailed,
}

/// Refresh token ledger errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RefreshTokenError {
    /// No active record matches the supplied raw token for that user.
    ///
    /// A rotate or revoke hitting this on a token that was once valid is
    /// the replay-detection signal: the token was already superseded.
    #[error("Refresh token not found")]
    NotFound,

    /// Attempted to revoke a record already in its terminal state
    #[error("Refresh token already revoked")]
    AlreadyRevoked,
}

/// MFA nonce errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum NonceError {
    /// Nonce absent, expired, or already consumed
    #[error("Invalid nonce")]
    Invalid,
}

/// Signing key lifecycle errors
#[derive(Error, Debug)]
pub enum KeyError {
    /// Rotation could not produce a new key pair. Fatal to that rotation
    /// attempt only; the previous key stays current.
    #[error("Key generation failed: {message}")]
    GenerationFailed { message: String },

    /// The key manager holds no current signing key (not yet initialized)
    #[error("No current signing key available")]
    NoCurrentKey,

    /// Stored key material could not be decoded into a usable key pair
    #[error("Invalid key material: {message}")]
    InvalidKeyMaterial { message: String },
}
