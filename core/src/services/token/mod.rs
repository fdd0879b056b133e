//! Token service module for JWT issuance and verification
//!
//! Signs access and refresh JWTs with the key manager's current key,
//! embedding the key id in the token header, and verifies incoming JWTs by
//! resolving the embedded key id. Rotation therefore never invalidates a
//! token whose key is still inside its grace window.

mod service;

#[cfg(test)]
mod tests;

pub use service::TokenService;
