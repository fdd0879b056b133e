//! Business services containing the token lifecycle logic.

pub mod jwk;
pub mod nonce;
pub mod refresh_token;
pub mod token;

// Re-export commonly used types
pub use jwk::{Jwk, JwkKeyManager, JwkSet, KeyRotationScheduler};
pub use nonce::NonceService;
pub use refresh_token::{
    RefreshTokenEncoder, RefreshTokenGrant, RefreshTokenProvider, RefreshTokenService,
};
pub use token::TokenService;
