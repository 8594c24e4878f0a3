//! Service boundary and wire adapters.
//!
//! - [`IdentityService`] / [`AuthorizationService`]: what the login pipeline calls
//! - [`ServiceConnector`]: builds handles from configuration on a cache miss
//! - [`DefaultConnector`]: Kratos over REST, Keto over gRPC or REST
//!
//! ## Feature Flags
//!
//! - `grpc` (default): Keto check over gRPC
//! - `rest` (default): Kratos session lookup and Keto check over REST

mod connector;
mod traits;

#[cfg(feature = "grpc")]
mod grpc;

#[cfg(feature = "grpc")]
mod proto;

#[cfg(feature = "rest")]
mod rest;

pub use connector::DefaultConnector;
pub use traits::{
    AuthorizationService, BackingService, CheckResult, IdentityService, ServiceConnector,
    ServiceKind, SessionLookup, Transport,
};

#[cfg(feature = "grpc")]
pub use grpc::KetoGrpcClient;

#[cfg(feature = "rest")]
pub use rest::{KetoRestClient, KratosRestClient};

/// `User-Agent` sent to both services unless the configuration overrides it.
#[cfg(any(feature = "grpc", feature = "rest"))]
pub(crate) const DEFAULT_USER_AGENT: &str =
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
