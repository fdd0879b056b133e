#[path = "trait.rs"]
mod trait_;

pub use trait_::NonceCache;

pub mod mock;
pub use mock::MockNonceCache;
