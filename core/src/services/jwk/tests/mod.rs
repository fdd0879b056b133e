//! Tests for signing key management

mod jwks_tests;
mod manager_tests;
