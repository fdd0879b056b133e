//! Redis caching layer
//!
//! Holds the shared signing key store read by every service instance and
//! the short-lived MFA nonce cache.

pub mod jwk_store;
pub mod nonce_cache;
pub mod redis_client;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use jwk_store::RedisKeyStore;
pub use nonce_cache::RedisNonceCache;
pub use redis_client::RedisClient;
