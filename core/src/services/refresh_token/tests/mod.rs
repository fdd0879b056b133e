//! Tests for the refresh token ledger

mod encoder_tests;
