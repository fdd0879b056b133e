//! Domain-specific error types and error handling.

mod types;

// Re-export all error types
pub use types::{KeyError, NonceError, RefreshTokenError, TokenError};

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    RefreshToken(#[from] RefreshTokenError),

    #[error(transparent)]
    Nonce(#[from] NonceError),

    #[error(transparent)]
    Key(#[from] KeyError),
}

impl DomainError {
    /// Whether this error represents a failed credential check.
    ///
    /// Callers at the API boundary collapse every such failure into one
    /// uniform "invalid or expired credential" response so the specific
    /// failure mode is not leaked; logs retain the precise kind.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            DomainError::Token(_) | DomainError::RefreshToken(_) | DomainError::Nonce(_)
        )
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
