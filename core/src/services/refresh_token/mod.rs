//! Refresh token ledger: issuance, lookup, rotation, and revocation.
//!
//! Raw refresh tokens live only in transit. The ledger stores a one-way
//! hash per token, chains rotations through `rotated_from`, and treats a
//! missing active record on rotate as the replay signal.

mod encoder;
mod provider;
mod service;

#[cfg(test)]
mod tests;

pub use encoder::RefreshTokenEncoder;
pub use provider::{RefreshTokenGrant, RefreshTokenProvider};
pub use service::RefreshTokenService;
