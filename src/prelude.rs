//! Prelude module for convenient imports.
//!
//! ```rust
//! use ory_auth::prelude::*;
//! ```

pub use crate::{
    client::{Gateway, GatewayBuilder, HealthReport, HealthStatus},
    config::{
        AuthorizationConfig, CredentialPolicy, GatewayConfig, IdentityConfig, InMemoryStorage,
        SessionTokenKind, Storage,
    },
    error::{AccessDenied, Error, ErrorKind, Result},
    login::{CallContext, Denial, LoginOutcome},
    transport::{ServiceKind, Transport},
    types::{Credential, LoginRequest, RelationQuery, Subject},
};
