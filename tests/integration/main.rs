//! Integration tests for the ory-auth gateway.
//!
//! Gateway flows run against the in-process mocks in `ory_auth::testing`;
//! the REST adapters run against wiremock servers. No external services
//! are required.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test integration
//!
//! # With gateway logs
//! RUST_LOG=ory_auth=debug cargo test --test integration -- --nocapture
//! ```

mod cache_tests;
mod common;
mod lifecycle_tests;
mod login_tests;
#[cfg(feature = "rest")]
mod rest_tests;
