//! Signing key management module
//!
//! This module owns the JWT signing key lifecycle:
//! - RSA key pair generation on schedule or cold start
//! - An in-process cache of decoded key pairs serving every verification
//! - Count- and expiry-based pruning of retired keys
//! - Publication of the public JWK set for external verifiers
//! - The background rotation job

mod jwks;
mod key_manager;
mod rotation;

#[cfg(test)]
mod tests;

pub use jwks::{Jwk, JwkSet};
pub use key_manager::{CachedKeyPair, JwkKeyManager};
pub use rotation::KeyRotationScheduler;
