//! Testing utilities for hosts embedding the gateway.
//!
//! - [`MockIdentityService`]: Session lookups from a token table
//! - [`MockAuthorizationService`]: Relation checks from a tuple set
//! - [`MockConnector`]: Hands the mocks to the connection cache and counts dials
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use ory_auth::testing::{MockAuthorizationService, MockConnector, MockIdentityService};
//! use ory_auth::{Gateway, InMemoryStorage, LoginRequest};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let connector = MockConnector::new(
//!     MockIdentityService::new().with_session("token-1", "user-1"),
//!     MockAuthorizationService::new().allow("files", "report.pdf", "viewer", "user-1"),
//! );
//! let gateway = Gateway::builder()
//!     .storage(Arc::new(InMemoryStorage::new()))
//!     .connector(Arc::new(connector))
//!     .build()
//!     .unwrap();
//!
//! let outcome = gateway
//!     .login(&LoginRequest::new("token-1", "files", "report.pdf", "viewer"))
//!     .await;
//! assert!(outcome.is_granted());
//! # }
//! ```

mod mock_connector;
mod mock_services;

pub use mock_connector::MockConnector;
pub use mock_services::{MockAuthorizationService, MockIdentityService};
