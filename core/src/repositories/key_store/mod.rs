#[path = "trait.rs"]
mod trait_;

pub use trait_::KeyStore;

pub mod mock;
pub use mock::MockKeyStore;
