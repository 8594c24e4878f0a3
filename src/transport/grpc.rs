//! gRPC adapter for the Keto check API using tonic.

use std::time::Duration;

use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};
use tonic_prost::ProstCodec;

use crate::Error;
use crate::config::AuthorizationConfig;
use crate::transport::DEFAULT_USER_AGENT;
use crate::transport::proto::{self, CHECK_PATH, HEALTH_CHECK_PATH, ServingStatus};
use crate::transport::traits::{AuthorizationService, BackingService, CheckResult};
use crate::types::RelationQuery;

/// Authorization service adapter for the Keto read API over gRPC.
///
/// Holds one HTTP/2 channel. Cloning is cheap and shares the channel.
#[derive(Clone)]
pub struct KetoGrpcClient {
    channel: Channel,
    endpoint: String,
    request_timeout: Duration,
}

impl std::fmt::Debug for KetoGrpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KetoGrpcClient").field("endpoint", &self.endpoint).finish_non_exhaustive()
    }
}

impl KetoGrpcClient {
    /// Dials the configured endpoint.
    ///
    /// Fails with [`ErrorKind::UpstreamUnavailable`](crate::ErrorKind::UpstreamUnavailable)
    /// when the connection cannot be established within `connect_timeout`.
    pub async fn connect(config: &AuthorizationConfig) -> Result<Self, Error> {
        let endpoint = Self::endpoint(config)?;

        let channel = endpoint.connect().await.map_err(|e| {
            Error::upstream_unavailable(format!(
                "failed to connect to authorization service at {}: {}",
                config.endpoint, e
            ))
            .with_source(e)
        })?;

        tracing::debug!(endpoint = %config.endpoint, "gRPC channel established");
        Ok(Self::from_channel(channel, config))
    }

    /// Builds the channel without dialing; the connection is made on first use.
    #[cfg(test)]
    pub(crate) fn connect_lazy(config: &AuthorizationConfig) -> Result<Self, Error> {
        let channel = Self::endpoint(config)?.connect_lazy();
        Ok(Self::from_channel(channel, config))
    }

    fn from_channel(channel: Channel, config: &AuthorizationConfig) -> Self {
        Self {
            channel,
            endpoint: config.endpoint.clone(),
            request_timeout: config.request_timeout,
        }
    }

    fn endpoint(config: &AuthorizationConfig) -> Result<Endpoint, Error> {
        let url = config.parsed_endpoint()?;

        let mut endpoint = Endpoint::from_shared(config.endpoint.clone())
            .map_err(|e| {
                Error::configuration(format!("invalid gRPC endpoint {}: {}", config.endpoint, e))
                    .with_source(e)
            })?
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .map_err(|e| {
                Error::configuration(format!("invalid user agent: {}", e)).with_source(e)
            })?;

        if url.scheme() == "https" {
            endpoint = endpoint
                .tls_config(ClientTlsConfig::new().with_native_roots())
                .map_err(|e| {
                    Error::configuration(format!("failed to configure TLS: {}", e)).with_source(e)
                })?;
        }

        Ok(endpoint)
    }

    async fn unary<Req, Resp>(
        &self,
        path: &'static str,
        message: Req,
    ) -> Result<Resp, tonic::Status>
    where
        Req: prost::Message + 'static,
        Resp: prost::Message + Default + 'static,
    {
        let mut grpc = tonic::client::Grpc::new(self.channel.clone());
        grpc.ready()
            .await
            .map_err(|e| tonic::Status::unavailable(format!("gRPC channel not ready: {}", e)))?;

        let codec: ProstCodec<Req, Resp> = ProstCodec::default();
        let response =
            grpc.unary(tonic::Request::new(message), PathAndQuery::from_static(path), codec).await?;
        Ok(response.into_inner())
    }
}

#[async_trait::async_trait]
impl BackingService for KetoGrpcClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Calls `grpc.health.v1.Health/Check` for the whole server.
    async fn probe(&self) -> Result<(), Error> {
        let call = self.unary::<_, proto::HealthCheckResponse>(
            HEALTH_CHECK_PATH,
            proto::HealthCheckRequest::default(),
        );
        let response = tokio::time::timeout(self.request_timeout, call)
            .await
            .map_err(|_| Error::timeout("health check timed out"))?
            .map_err(|status| map_status("health check", status))?;

        match response.status() {
            ServingStatus::Serving => Ok(()),
            status => {
                Err(Error::upstream(format!("authorization service reports {:?}", status)))
            },
        }
    }
}

#[async_trait::async_trait]
impl AuthorizationService for KetoGrpcClient {
    async fn check(&self, query: &RelationQuery) -> Result<CheckResult, Error> {
        let request = proto::CheckRequest {
            namespace: query.namespace().to_string(),
            object: query.object().to_string(),
            relation: query.relation().to_string(),
            subject: Some(proto::Subject::id(query.subject())),
            ..Default::default()
        };

        let response: proto::CheckResponse =
            self.unary(CHECK_PATH, request).await.map_err(|status| map_status("check", status))?;

        Ok(CheckResult { allowed: response.allowed })
    }
}

/// Maps a gRPC status to a gateway error.
fn map_status(operation: &str, status: tonic::Status) -> Error {
    match status.code() {
        tonic::Code::Cancelled => Error::cancelled().with_source(status),
        tonic::Code::DeadlineExceeded => {
            Error::timeout(format!("{} deadline exceeded: {}", operation, status.message()))
                .with_source(status)
        },
        code => Error::upstream(format!(
            "{} failed with {:?}: {}",
            operation,
            code,
            status.message()
        ))
        .with_source(status),
    }
}
