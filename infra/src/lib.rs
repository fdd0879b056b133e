//! # Infrastructure Layer
//!
//! Concrete implementations of the core repository traits:
//! - **Database**: MySQL refresh token ledger using SQLx
//! - **Cache**: Redis-backed signing key store and MFA nonce cache
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)
//! - `redis-cache`: Enable Redis caching support (default)

use care_core::errors::DomainError;
use thiserror::Error;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Cache module - Redis client and repository implementations
#[cfg(feature = "redis-cache")]
pub mod cache;

/// Errors raised by the infrastructure backends before they cross into
/// the domain.
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(error: InfrastructureError) -> Self {
        DomainError::Internal {
            message: error.to_string(),
        }
    }
}
