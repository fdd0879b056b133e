//! Domain layer containing the token lifecycle entities.

pub mod entities;

// Re-export commonly used domain types
pub use entities::*;
