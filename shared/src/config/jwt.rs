//! JWT and signing key rotation configuration

use serde::{Deserialize, Serialize};

/// JWT issuance and verification configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Issuer claim stamped into every token and required on verification
    pub issuer: String,

    /// Access token time-to-live in seconds
    pub access_token_ttl_secs: i64,

    /// Refresh token time-to-live in seconds
    pub refresh_token_ttl_secs: i64,

    /// Signing key rotation policy
    #[serde(default)]
    pub key: KeyRotationConfig,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            issuer: String::from("parent-care-service"),
            access_token_ttl_secs: 900,
            refresh_token_ttl_secs: 14 * 24 * 60 * 60,
            key: KeyRotationConfig::default(),
        }
    }
}

impl JwtConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
            access_token_ttl_secs: parse_env("JWT_ACCESS_TOKEN_TTL_SECS", defaults.access_token_ttl_secs),
            refresh_token_ttl_secs: parse_env("JWT_REFRESH_TOKEN_TTL_SECS", defaults.refresh_token_ttl_secs),
            key: KeyRotationConfig::from_env(),
        }
    }
}

/// Signing key rotation policy
///
/// A freshly generated key stays valid for `expiry_multiplier` rotation
/// intervals, so tokens signed just before a rotation keep verifying during
/// the grace window.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KeyRotationConfig {
    /// How often the background job replaces the signing key, in seconds
    pub rotation_interval_secs: i64,

    /// Key validity window as a multiple of the rotation interval
    #[serde(default = "default_expiry_multiplier")]
    pub expiry_multiplier: i64,

    /// Maximum number of retired keys retained for verification
    #[serde(default = "default_max_keys")]
    pub max_keys: usize,

    /// RSA modulus size in bits (2048 minimum)
    #[serde(default = "default_key_size_bits")]
    pub key_size_bits: usize,
}

impl Default for KeyRotationConfig {
    fn default() -> Self {
        Self {
            rotation_interval_secs: 24 * 60 * 60,
            expiry_multiplier: default_expiry_multiplier(),
            max_keys: default_max_keys(),
            key_size_bits: default_key_size_bits(),
        }
    }
}

impl KeyRotationConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            rotation_interval_secs: parse_env("JWT_KEY_ROTATION_INTERVAL_SECS", defaults.rotation_interval_secs),
            expiry_multiplier: parse_env("JWT_KEY_EXPIRY_MULTIPLIER", defaults.expiry_multiplier),
            max_keys: parse_env("JWT_KEY_MAX_KEYS", defaults.max_keys),
            key_size_bits: parse_env("JWT_KEY_SIZE_BITS", defaults.key_size_bits),
        }
    }

    /// Full validity window of a newly generated key, in seconds
    pub fn key_validity_secs(&self) -> i64 {
        self.rotation_interval_secs * self.expiry_multiplier
    }
}

fn default_expiry_multiplier() -> i64 {
    2
}

fn default_max_keys() -> usize {
    5
}

fn default_key_size_bits() -> usize {
    2048
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_key_validity_covers_two_rotations() {
        let config = KeyRotationConfig::default();
        assert_eq!(config.key_validity_secs(), 2 * config.rotation_interval_secs);
    }

    #[test]
    fn default_jwt_config_is_sane() {
        let config = JwtConfig::default();
        assert!(config.access_token_ttl_secs < config.refresh_token_ttl_secs);
        assert!(config.key.key_size_bits >= 2048);
        assert!(!config.issuer.is_empty());
    }
}
