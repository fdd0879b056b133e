//! # ParentCare Core
//!
//! Core authentication token lifecycle for the ParentCare backend.
//! This crate contains the rotating JWT signing key manager, the token
//! issuance/verification service, the chained refresh token ledger, and the
//! MFA nonce store, together with the repository interfaces they persist
//! through.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::{
    ClaimSet, Claims, KeyRegistryMetadata, RefreshTokenRecord, RefreshTokenStatus, SigningKey,
};
pub use errors::{
    DomainError, DomainResult, KeyError, NonceError, RefreshTokenError, TokenError,
};
pub use repositories::{
    KeyStore, MockKeyStore, MockNonceCache, MockRefreshTokenRepository, NonceCache,
    RefreshTokenRepository,
};
pub use services::{
    Jwk, JwkKeyManager, JwkSet, KeyRotationScheduler, NonceService, RefreshTokenEncoder,
    RefreshTokenGrant, RefreshTokenProvider, RefreshTokenService, TokenService,
};
