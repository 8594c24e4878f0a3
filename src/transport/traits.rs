//! Service boundary traits and common types.
//!
//! The gateway talks to two backing services through these traits. Real
//! adapters live next to this module; `crate::testing` provides mocks.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::Error;
use crate::config::{AuthorizationConfig, IdentityConfig};
use crate::types::RelationQuery;

// ============================================================================
// Transport Enum
// ============================================================================

/// Wire protocol used to reach the authorization service.
///
/// ## Example
///
/// ```rust
/// use ory_auth::Transport;
///
/// let transport = Transport::Grpc;
/// assert!(transport.is_grpc());
/// assert_eq!(transport.to_string(), "gRPC");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// gRPC over HTTP/2 (default).
    #[default]
    Grpc,
    /// REST over HTTP/1.1.
    Http,
}

impl Transport {
    /// Returns `true` if this is gRPC transport.
    pub fn is_grpc(&self) -> bool {
        matches!(self, Transport::Grpc)
    }

    /// Returns `true` if this is HTTP/REST transport.
    pub fn is_http(&self) -> bool {
        matches!(self, Transport::Http)
    }
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transport::Grpc => write!(f, "gRPC"),
            Transport::Http => write!(f, "HTTP/REST"),
        }
    }
}

// ============================================================================
// Service Kind
// ============================================================================

/// The two backing services the gateway holds connections to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    /// The identity service that resolves sessions.
    Identity,
    /// The authorization service that checks relations.
    Authorization,
}

impl ServiceKind {
    /// Both kinds, in resolution order.
    pub const ALL: [ServiceKind; 2] = [ServiceKind::Identity, ServiceKind::Authorization];
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceKind::Identity => write!(f, "identity"),
            ServiceKind::Authorization => write!(f, "authorization"),
        }
    }
}

// ============================================================================
// Session Lookup / Check Result
// ============================================================================

/// Result of asking the identity service about a session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLookup {
    /// Identity id attached to the session, when the service returned one.
    pub subject_id: Option<String>,
    /// Whether the service considers the session live.
    pub valid: bool,
    /// HTTP-style status of the lookup.
    pub status: u16,
}

impl SessionLookup {
    /// A live session belonging to `subject_id`.
    pub fn active(subject_id: impl Into<String>) -> Self {
        Self { subject_id: Some(subject_id.into()), valid: true, status: 200 }
    }

    /// A session the service refused, with the status it answered.
    pub fn rejected(status: u16) -> Self {
        Self { subject_id: None, valid: false, status }
    }
}

/// Result of a relation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckResult {
    /// Whether the subject holds the relation.
    pub allowed: bool,
}

// ============================================================================
// Service Traits
// ============================================================================

/// Lifecycle shared by every backing service handle.
#[async_trait::async_trait]
pub trait BackingService: Send + Sync {
    /// Endpoint the handle talks to, for logs and health reports.
    fn endpoint(&self) -> &str;

    /// Liveness probe: one round trip to the service's health endpoint.
    async fn probe(&self) -> Result<(), Error>;

    /// Eviction hook, called once when the connection cache drops the handle.
    ///
    /// The default does nothing. The REST and gRPC adapters release their
    /// connections when the last clone of the handle is dropped, so clones
    /// held by in-flight requests stay usable.
    fn close(&self) {}
}

/// Identity service (Ory Kratos) boundary.
#[async_trait::async_trait]
pub trait IdentityService: BackingService {
    /// Resolves a session token into the identity behind it.
    ///
    /// A refused or expired session is `Ok` with `valid == false`; `Err` is
    /// reserved for failures of the call itself.
    async fn resolve_session(&self, token: &str) -> Result<SessionLookup, Error>;
}

/// Authorization service (Ory Keto) boundary.
#[async_trait::async_trait]
pub trait AuthorizationService: BackingService {
    /// Checks whether the query's subject holds the relation.
    async fn check(&self, query: &RelationQuery) -> Result<CheckResult, Error>;
}

/// Builds service handles from configuration.
///
/// Called by the connection cache on a miss, under the slot's exclusive
/// lock, so an implementation is invoked at most once per cold slot.
#[async_trait::async_trait]
pub trait ServiceConnector: Send + Sync {
    /// Creates an identity service handle.
    async fn connect_identity(
        &self,
        config: &IdentityConfig,
    ) -> Result<Arc<dyn IdentityService>, Error>;

    /// Creates an authorization service handle, dialing if the transport
    /// requires it.
    async fn connect_authorization(
        &self,
        config: &AuthorizationConfig,
    ) -> Result<Arc<dyn AuthorizationService>, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_serde() {
        assert_eq!(serde_json::to_string(&Transport::Grpc).unwrap(), "\"grpc\"");
        assert_eq!(serde_json::to_string(&Transport::Http).unwrap(), "\"http\"");
        let parsed: Transport = serde_json::from_str("\"http\"").unwrap();
        assert!(parsed.is_http());
    }

    #[test]
    fn test_service_kind_display() {
        assert_eq!(ServiceKind::Identity.to_string(), "identity");
        assert_eq!(ServiceKind::Authorization.to_string(), "authorization");
    }

    #[test]
    fn test_session_lookup_constructors() {
        let active = SessionLookup::active("user-1");
        assert!(active.valid);
        assert_eq!(active.subject_id.as_deref(), Some("user-1"));

        let rejected = SessionLookup::rejected(401);
        assert!(!rejected.valid);
        assert_eq!(rejected.status, 401);
        assert!(rejected.subject_id.is_none());
    }
}
