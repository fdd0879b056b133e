//! Tests for JWT issuance and verification

mod rotation_tests;
mod service_tests;
