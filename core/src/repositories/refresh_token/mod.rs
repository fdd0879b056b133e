#[path = "trait.rs"]
mod trait_;

pub use trait_::RefreshTokenRepository;

pub mod mock;
pub use mock::MockRefreshTokenRepository;
