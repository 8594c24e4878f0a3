//! Default connector selecting real adapters from configuration.

use std::sync::Arc;

use crate::Error;
use crate::config::{AuthorizationConfig, IdentityConfig};
use crate::transport::Transport;
use crate::transport::traits::{AuthorizationService, IdentityService, ServiceConnector};

/// Connects to Kratos over REST and to Keto over the configured transport.
///
/// | Service       | Transport | Adapter                                        | Feature |
/// |---------------|-----------|------------------------------------------------|---------|
/// | identity      | REST      | [`KratosRestClient`](crate::transport::KratosRestClient) | `rest`  |
/// | authorization | gRPC      | [`KetoGrpcClient`](crate::transport::KetoGrpcClient)     | `grpc`  |
/// | authorization | REST      | [`KetoRestClient`](crate::transport::KetoRestClient)     | `rest`  |
///
/// Selecting a transport whose feature is disabled yields a configuration
/// error when the handle is first acquired.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConnector;

impl DefaultConnector {
    /// Creates the connector.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl ServiceConnector for DefaultConnector {
    async fn connect_identity(
        &self,
        config: &IdentityConfig,
    ) -> Result<Arc<dyn IdentityService>, Error> {
        #[cfg(feature = "rest")]
        {
            let client = super::rest::KratosRestClient::new(config)?;
            tracing::debug!(url = %config.url, "identity client created");
            Ok(Arc::new(client))
        }

        #[cfg(not(feature = "rest"))]
        {
            let _ = config;
            Err(Error::configuration("identity service requires the `rest` feature"))
        }
    }

    async fn connect_authorization(
        &self,
        config: &AuthorizationConfig,
    ) -> Result<Arc<dyn AuthorizationService>, Error> {
        match config.transport {
            Transport::Grpc => connect_grpc(config).await,
            Transport::Http => connect_rest(config),
        }
    }
}

#[cfg(feature = "grpc")]
async fn connect_grpc(
    config: &AuthorizationConfig,
) -> Result<Arc<dyn AuthorizationService>, Error> {
    let client = super::grpc::KetoGrpcClient::connect(config).await?;
    Ok(Arc::new(client))
}

#[cfg(not(feature = "grpc"))]
async fn connect_grpc(
    _config: &AuthorizationConfig,
) -> Result<Arc<dyn AuthorizationService>, Error> {
    Err(Error::configuration("gRPC transport requires the `grpc` feature"))
}

#[cfg(feature = "rest")]
fn connect_rest(config: &AuthorizationConfig) -> Result<Arc<dyn AuthorizationService>, Error> {
    let client = super::rest::KetoRestClient::new(config)?;
    tracing::debug!(endpoint = %config.endpoint, "authorization REST client created");
    Ok(Arc::new(client))
}

#[cfg(not(feature = "rest"))]
fn connect_rest(_config: &AuthorizationConfig) -> Result<Arc<dyn AuthorizationService>, Error> {
    Err(Error::configuration("HTTP transport requires the `rest` feature"))
}
