//! Short-lived nonce hand-off for the MFA step-up flow.
//!
//! The first authentication factor issues a nonce instead of tokens; the
//! second factor redeems it. A nonce resolves exactly once and dies on its
//! own after five minutes.

mod service;

pub use service::NonceService;
