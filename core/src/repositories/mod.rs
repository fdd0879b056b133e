//! Repository interfaces for the durable stores behind the token core.

pub mod key_store;
pub mod nonce;
pub mod refresh_token;

pub use key_store::KeyStore;
pub use nonce::NonceCache;
pub use refresh_token::RefreshTokenRepository;

pub use key_store::MockKeyStore;
pub use nonce::MockNonceCache;
pub use refresh_token::MockRefreshTokenRepository;
