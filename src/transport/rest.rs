//! REST adapters using reqwest.
//!
//! - [`KratosRestClient`]: session lookup against the Kratos public API
//! - [`KetoRestClient`]: relation checks against the Keto read API

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, COOKIE, HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use url::Url;

use crate::config::{AuthorizationConfig, IdentityConfig, SessionTokenKind};
use crate::transport::traits::{
    AuthorizationService, BackingService, CheckResult, IdentityService, SessionLookup,
};
use crate::types::RelationQuery;
use crate::Error;
use crate::transport::DEFAULT_USER_AGENT;

/// Header used for API (non-browser) session tokens.
const SESSION_TOKEN_HEADER: &str = "x-session-token";

// ============================================================================
// Kratos
// ============================================================================

/// Identity service adapter for the Kratos public API.
///
/// Resolves sessions with `GET /sessions/whoami`.
#[derive(Clone)]
pub struct KratosRestClient {
    client: reqwest::Client,
    base_url: Url,
    token_kind: SessionTokenKind,
}

impl std::fmt::Debug for KratosRestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KratosRestClient")
            .field("base_url", &self.base_url.as_str())
            .field("token_kind", &self.token_kind)
            .finish_non_exhaustive()
    }
}

impl KratosRestClient {
    /// Creates a client from configuration. Does not contact the service.
    pub fn new(config: &IdentityConfig) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        for (name, value) in &config.default_headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                Error::configuration(format!("invalid header name {:?}: {}", name, e))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                Error::configuration(format!("invalid header value for {}: {}", name, e))
            })?;
            headers.insert(name, value);
        }

        let user_agent = config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        let client = build_http_client(config.request_timeout, None, user_agent, headers)?;

        Ok(Self { client, base_url: config.parsed_url()?, token_kind: config.token_kind })
    }
}

/// Subset of the Kratos session object the gateway reads.
#[derive(Debug, Deserialize)]
struct WhoAmIResponse {
    #[serde(default)]
    active: Option<bool>,
    #[serde(default)]
    identity: Option<IdentityRecord>,
}

#[derive(Debug, Deserialize)]
struct IdentityRecord {
    id: String,
}

#[async_trait::async_trait]
impl BackingService for KratosRestClient {
    fn endpoint(&self) -> &str {
        self.base_url.as_str()
    }

    async fn probe(&self) -> Result<(), Error> {
        probe_alive(&self.client, &self.base_url).await
    }
}

#[async_trait::async_trait]
impl IdentityService for KratosRestClient {
    async fn resolve_session(&self, token: &str) -> Result<SessionLookup, Error> {
        let url = join_path(&self.base_url, "sessions/whoami")?;
        let header = match self.token_kind {
            SessionTokenKind::Cookie => COOKIE,
            SessionTokenKind::Header => HeaderName::from_static(SESSION_TOKEN_HEADER),
        };
        let value = HeaderValue::from_str(token)
            .map_err(|_| Error::invalid_input("session token contains invalid characters"))?;

        let response =
            self.client.get(url).header(header, value).send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "identity service rejected session");
            return Ok(SessionLookup::rejected(status.as_u16()));
        }

        let session: WhoAmIResponse = response.json().await.map_err(|e| {
            Error::upstream(format!("failed to parse session response: {}", e)).with_source(e)
        })?;

        if session.active == Some(false) {
            return Ok(SessionLookup::rejected(StatusCode::UNAUTHORIZED.as_u16()));
        }

        Ok(SessionLookup {
            subject_id: session.identity.map(|identity| identity.id),
            valid: true,
            status: status.as_u16(),
        })
    }
}

// ============================================================================
// Keto
// ============================================================================

/// Authorization service adapter for the Keto read API over REST.
///
/// Checks relations with `GET /relation-tuples/check/openapi`.
#[derive(Clone)]
pub struct KetoRestClient {
    client: reqwest::Client,
    base_url: Url,
}

impl std::fmt::Debug for KetoRestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KetoRestClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl KetoRestClient {
    /// Creates a client from configuration. Does not contact the service.
    pub fn new(config: &AuthorizationConfig) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = build_http_client(
            config.request_timeout,
            Some(config.connect_timeout),
            DEFAULT_USER_AGENT,
            headers,
        )?;

        Ok(Self { client, base_url: config.parsed_endpoint()? })
    }
}

#[derive(Debug, Deserialize)]
struct CheckBody {
    allowed: bool,
}

#[async_trait::async_trait]
impl BackingService for KetoRestClient {
    fn endpoint(&self) -> &str {
        self.base_url.as_str()
    }

    async fn probe(&self) -> Result<(), Error> {
        probe_alive(&self.client, &self.base_url).await
    }
}

#[async_trait::async_trait]
impl AuthorizationService for KetoRestClient {
    async fn check(&self, query: &RelationQuery) -> Result<CheckResult, Error> {
        let mut url = join_path(&self.base_url, "relation-tuples/check/openapi")?;
        url.query_pairs_mut()
            .append_pair("namespace", query.namespace())
            .append_pair("object", query.object())
            .append_pair("relation", query.relation())
            .append_pair("subject_id", query.subject());

        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;

        // Older Keto versions answer a negative check with 403 and the same body.
        let status = response.status();
        if !(status.is_success() || status == StatusCode::FORBIDDEN) {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::upstream(format!("check returned HTTP {}: {}", status, body)));
        }

        let body: CheckBody = response.json().await.map_err(|e| {
            Error::upstream(format!("failed to parse check response: {}", e)).with_source(e)
        })?;
        Ok(CheckResult { allowed: body.allowed })
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn build_http_client(
    timeout: Duration,
    connect_timeout: Option<Duration>,
    user_agent: &str,
    headers: HeaderMap,
) -> Result<reqwest::Client, Error> {
    let mut builder = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .default_headers(headers);
    if let Some(connect_timeout) = connect_timeout {
        builder = builder.connect_timeout(connect_timeout);
    }

    builder.build().map_err(|e| {
        Error::configuration(format!("failed to create HTTP client: {}", e)).with_source(e)
    })
}

/// Joins `path` onto `base`, keeping any path prefix `base` already has.
fn join_path(base: &Url, path: &str) -> Result<Url, Error> {
    let mut url = base.clone();
    if !url.path().ends_with('/') {
        let prefixed = format!("{}/", url.path());
        url.set_path(&prefixed);
    }
    Ok(url.join(path.trim_start_matches('/'))?)
}

async fn probe_alive(client: &reqwest::Client, base_url: &Url) -> Result<(), Error> {
    let url = join_path(base_url, "health/alive")?;
    let response = client.get(url).send().await.map_err(map_reqwest_error)?;

    if response.status().is_success() {
        Ok(())
    } else {
        Err(Error::upstream(format!("health check failed with status {}", response.status())))
    }
}

/// Maps reqwest errors to gateway errors.
fn map_reqwest_error(e: reqwest::Error) -> Error {
    let message = if e.is_timeout() {
        format!("request timed out: {}", e)
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        format!("HTTP error: {}", e)
    };
    Error::upstream(message).with_source(e)
}

// ============================================================================
// Tests
// ============================================================================
