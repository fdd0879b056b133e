//! Shared configuration types for the ParentCare backend
//!
//! This crate provides the configuration surface used across the server
//! modules: JWT issuance/verification settings, signing key rotation
//! settings, and connection settings for the Redis cache and MySQL database.

pub mod config;

// Re-export commonly used items at crate root
pub use config::{CacheConfig, DatabaseConfig, JwtConfig, KeyRotationConfig};
