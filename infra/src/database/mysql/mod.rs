//! MySQL repository implementations

mod refresh_token_repository_impl;

pub use refresh_token_repository_impl::MySqlRefreshTokenRepository;
