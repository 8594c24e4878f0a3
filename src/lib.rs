//! # ory-auth
//!
//! Session-plus-relation login gateway for Ory Kratos and Ory Keto.
//!
//! A login presents a Kratos session token and a Keto relation
//! (namespace, object, relation). The gateway resolves the session to a
//! subject, checks that the subject holds the relation, and only then
//! issues a time-bounded [`Credential`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ory_auth::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ory_auth::Error> {
//!     let gateway = Gateway::builder()
//!         .storage(std::sync::Arc::new(InMemoryStorage::new()))
//!         .build()?;
//!
//!     gateway.write_config(&GatewayConfig::builder()
//!         .identity(IdentityConfig::builder().url("https://kratos.internal").build())
//!         .build()).await?;
//!
//!     let request = LoginRequest::new(cookie, "files", "report.pdf", "viewer");
//!     match gateway.login(&request).await {
//!         LoginOutcome::Granted(credential) => println!("policies: {:?}", credential.policies),
//!         LoginOutcome::Denied(denial) => println!("denied: {}", denial),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Key Concepts
//!
//! - **Pipeline order**: fields, then session, then relation check; the
//!   first failure ends the attempt
//! - **Denial ≠ Error**: a relation that is not held is a
//!   [`Denial`] carrying an [`AccessDenied`], distinct from a failed call
//! - **Lazy connections**: service handles are created on first use and
//!   dropped when the configuration changes
//!
//! ## Features
//!
//! - `grpc` (default): Keto check over gRPC via tonic
//! - `rest` (default): Kratos and Keto over REST via reqwest
//! - `rustls` (default): Use rustls for TLS
//! - `native-tls`: Use native TLS (OpenSSL on Linux, Secure Transport on macOS)

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod error;
pub mod login;
pub mod transport;
pub mod types;

// Testing utilities
pub mod testing;

// Prelude for convenient imports
pub mod prelude;

// Re-export main types at crate root for convenience
pub use client::{
    ComponentHealth, ConnectionCache, Gateway, GatewayBuilder, HealthReport, HealthStatus,
    ServiceHandle,
};
pub use config::{
    AuthorizationConfig, CONFIG_KEY, CredentialPolicy, GatewayConfig, IdentityConfig,
    InMemoryStorage, SessionTokenKind, Storage,
};
pub use error::{AccessDenied, Error, ErrorKind};
pub use login::{CallContext, Denial, DenyReason, LoginOutcome, LoginState};
pub use transport::{DefaultConnector, ServiceConnector, ServiceKind, Transport};
pub use types::{Credential, LoginRequest, RelationQuery, Subject};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Gateway>();
        assert_send_sync::<ConnectionCache>();
        assert_send_sync::<LoginOutcome>();
    }
}
