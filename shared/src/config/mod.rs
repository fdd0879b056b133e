//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `jwt` - Token TTLs, issuer, and signing key rotation policy
//! - `cache` - Redis connection configuration for the key store and nonces
//! - `database` - MySQL connection and pool configuration

pub mod cache;
pub mod database;
pub mod jwt;

// Re-export commonly used types
pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use jwt::{JwtConfig, KeyRotationConfig};
