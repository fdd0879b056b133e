//! Domain entities representing core token lifecycle objects.

pub mod claims;
pub mod key_metadata;
pub mod refresh_token;
pub mod signing_key;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use claims::{ClaimSet, Claims};
pub use key_metadata::KeyRegistryMetadata;
pub use refresh_token::{RefreshTokenRecord, RefreshTokenStatus};
pub use signing_key::SigningKey;
