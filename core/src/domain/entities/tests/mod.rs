//! Unit tests for domain entities.

mod refresh_token_tests;
mod signing_key_tests;
