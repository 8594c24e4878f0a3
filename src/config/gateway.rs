//! Persisted configuration for the two backing services.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::Error;
use crate::transport::Transport;
use crate::types::duration_secs;

/// Default identity service URL.
pub const DEFAULT_IDENTITY_URL: &str = "https://localhost/auth";

/// Default authorization service endpoint.
pub const DEFAULT_AUTHORIZATION_ENDPOINT: &str = "http://localhost:4466";

/// Configuration for both backing services.
///
/// Stored by the host as JSON under the `config` key and read again on
/// every connection cache miss, so a change takes effect on the next
/// login after [`Gateway::write_config`](crate::Gateway::write_config).
///
/// ## Example
///
/// ```rust
/// use ory_auth::{AuthorizationConfig, GatewayConfig, IdentityConfig, Transport};
///
/// let config = GatewayConfig::builder()
///     .identity(IdentityConfig::builder().url("https://kratos.internal").build())
///     .authorization(
///         AuthorizationConfig::builder()
///             .transport(Transport::Http)
///             .endpoint("http://keto.internal:4466")
///             .build(),
///     )
///     .build();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, bon::Builder)]
#[serde(default)]
pub struct GatewayConfig {
    /// Identity service (Kratos) settings.
    #[builder(default)]
    pub identity: IdentityConfig,

    /// Authorization service (Keto) settings.
    #[builder(default)]
    pub authorization: AuthorizationConfig,
}

impl GatewayConfig {
    /// Validates both service sections.
    pub fn validate(&self) -> Result<(), Error> {
        self.identity.validate()?;
        self.authorization.validate()
    }
}

/// How the session token is presented to the identity service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionTokenKind {
    /// Sent verbatim as the `Cookie` header (browser sessions).
    #[default]
    Cookie,
    /// Sent as the `X-Session-Token` header (API clients).
    Header,
}

/// Identity service (Kratos) configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bon::Builder)]
#[serde(default)]
pub struct IdentityConfig {
    /// Public API base URL.
    #[builder(into, default = DEFAULT_IDENTITY_URL.to_string())]
    pub url: String,

    /// How the session token is sent.
    #[builder(default)]
    pub token_kind: SessionTokenKind,

    /// Per-request timeout.
    #[builder(default = Duration::from_secs(10))]
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,

    /// User-Agent override.
    #[builder(into)]
    pub user_agent: Option<String>,

    /// Headers added to every request.
    #[builder(default)]
    pub default_headers: BTreeMap<String, String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl IdentityConfig {
    /// Returns the parsed base URL.
    pub fn parsed_url(&self) -> Result<Url, Error> {
        Ok(Url::parse(&self.url)?)
    }

    fn validate(&self) -> Result<(), Error> {
        self.parsed_url()?;
        if self.request_timeout.is_zero() {
            return Err(Error::configuration("identity request_timeout must be positive"));
        }
        Ok(())
    }
}

/// Authorization service (Keto) configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bon::Builder)]
#[serde(default)]
pub struct AuthorizationConfig {
    /// Wire protocol used for the check call.
    #[builder(default)]
    pub transport: Transport,

    /// Read API endpoint, e.g. `http://localhost:4466`.
    #[builder(into, default = DEFAULT_AUTHORIZATION_ENDPOINT.to_string())]
    pub endpoint: String,

    /// Timeout for establishing the connection.
    #[builder(default = Duration::from_secs(5))]
    #[serde(with = "duration_secs")]
    pub connect_timeout: Duration,

    /// Per-request timeout.
    #[builder(default = Duration::from_secs(10))]
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl AuthorizationConfig {
    /// Returns the parsed endpoint URL.
    pub fn parsed_endpoint(&self) -> Result<Url, Error> {
        Ok(Url::parse(&self.endpoint)?)
    }

    fn validate(&self) -> Result<(), Error> {
        self.parsed_endpoint()?;
        if self.connect_timeout.is_zero() || self.request_timeout.is_zero() {
            return Err(Error::configuration("authorization timeouts must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.identity.url, DEFAULT_IDENTITY_URL);
        assert_eq!(config.identity.token_kind, SessionTokenKind::Cookie);
        assert_eq!(config.authorization.endpoint, DEFAULT_AUTHORIZATION_ENDPOINT);
        assert_eq!(config.authorization.transport, Transport::Grpc);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial_uses_defaults() {
        let config: GatewayConfig =
            serde_json::from_str(r#"{"identity": {"url": "https://kratos.example"}}"#).unwrap();
        assert_eq!(config.identity.url, "https://kratos.example");
        assert_eq!(config.identity.request_timeout, Duration::from_secs(10));
        assert_eq!(config.authorization, AuthorizationConfig::default());
    }

    #[test]
    fn test_json_shape() {
        let value = serde_json::to_value(GatewayConfig::default()).unwrap();
        assert_eq!(value["identity"]["token_kind"], "cookie");
        assert_eq!(value["identity"]["request_timeout"], 10);
        assert_eq!(value["authorization"]["transport"], "grpc");
        assert_eq!(value["authorization"]["connect_timeout"], 5);
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = GatewayConfig::builder()
            .identity(IdentityConfig::builder().url("not a url").build())
            .build();
        assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = GatewayConfig::builder()
            .authorization(AuthorizationConfig::builder().connect_timeout(Duration::ZERO).build())
            .build();
        assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::Configuration);
    }
}
