//! The host-facing gateway.
//!
//! - [`Gateway`]: Login entry point, configuration, invalidation and health
//! - [`ConnectionCache`]: At most one live handle per backing service
//! - [`HealthReport`]: Probe results for cached handles
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ory_auth::prelude::*;
//!
//! let gateway = Gateway::builder()
//!     .storage(host_storage)
//!     .build()?;
//!
//! let outcome = gateway
//!     .login(&LoginRequest::new(cookie, "files", "report.pdf", "viewer"))
//!     .await;
//! match outcome {
//!     LoginOutcome::Granted(credential) => host.store(credential),
//!     LoginOutcome::Denied(denial) => host.reject(denial.to_string()),
//! }
//! ```

mod builder;
mod cache;
mod health;
mod inner;

pub use builder::{GatewayBuilder, HasStorage, NoStorage};
pub use cache::{ConnectionCache, ServiceHandle};
pub use health::{ComponentHealth, HealthReport, HealthStatus};

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::{CONFIG_KEY, CredentialPolicy, GatewayConfig, load_config, save_config};
use crate::login::{CallContext, LoginOutcome};
use crate::types::LoginRequest;
use crate::Error;

/// The authentication gateway.
///
/// Resolves a session through the identity service, checks the claimed
/// relation through the authorization service, and issues a credential
/// when the relation is held.
///
/// ## Thread Safety
///
/// `Gateway` is `Clone` and thread-safe. Clones share one connection
/// cache; concurrent logins share its handles.
#[derive(Clone)]
pub struct Gateway {
    inner: Arc<inner::GatewayInner>,
}

impl Gateway {
    /// Creates a new gateway builder.
    pub fn builder() -> GatewayBuilder<NoStorage> {
        GatewayBuilder::new()
    }

    /// Runs a login with no cancellation and no deadline.
    pub async fn login(&self, request: &LoginRequest) -> LoginOutcome {
        self.login_with_context(request, &CallContext::new()).await
    }

    /// Runs a login bounded by `ctx`.
    ///
    /// Cancelling the context's token or passing its deadline denies the
    /// attempt with `Cancelled` or `Timeout`. Dropping the returned future
    /// abandons the attempt as well.
    pub async fn login_with_context(
        &self,
        request: &LoginRequest,
        ctx: &CallContext,
    ) -> LoginOutcome {
        self.inner.coordinator.login(request, ctx).await
    }

    /// Runs a login from the host's named fields
    /// (`session_token`, `namespace`, `object`, `relation`).
    pub async fn login_fields(
        &self,
        fields: &Map<String, Value>,
        ctx: &CallContext,
    ) -> LoginOutcome {
        self.login_with_context(&LoginRequest::from_fields(fields), ctx).await
    }

    /// Returns the stored configuration, or `None` if none was written.
    pub async fn read_config(&self) -> Result<Option<GatewayConfig>, Error> {
        load_config(self.inner.cache.storage().as_ref()).await
    }

    /// Validates and stores `config`, then drops both cached handles so the
    /// next login connects with the new settings.
    pub async fn write_config(&self, config: &GatewayConfig) -> Result<(), Error> {
        config.validate()?;
        save_config(self.inner.cache.storage().as_ref(), config).await?;
        self.inner.cache.invalidate_all().await;
        tracing::info!(
            identity = %config.identity.url,
            authorization = %config.authorization.endpoint,
            transport = %config.authorization.transport,
            "configuration updated"
        );
        Ok(())
    }

    /// Storage invalidation hook.
    ///
    /// The host calls this when a storage key changes outside the gateway.
    /// Only [`CONFIG_KEY`] has an effect: both cached handles are dropped.
    pub async fn invalidate(&self, key: &str) {
        if key == CONFIG_KEY {
            self.inner.cache.invalidate_all().await;
        } else {
            tracing::debug!(key, "ignoring invalidation of unrelated key");
        }
    }

    /// Closes both cached handles.
    ///
    /// The gateway stays usable; the next login reconnects.
    pub async fn close(&self) {
        self.inner.cache.invalidate_all().await;
    }

    /// Probes the cached handles. Never creates one.
    pub async fn health(&self) -> HealthReport {
        health::check(&self.inner.cache).await
    }

    /// Probes the cached handles every `interval` until `cancellation` fires.
    ///
    /// Results are only logged; the probe never changes cache state.
    pub fn spawn_health_probe(
        &self,
        interval: Duration,
        cancellation: CancellationToken,
    ) -> JoinHandle<()> {
        let gateway = self.clone();
        tokio::spawn(async move {
            // `interval` panics on a zero period.
            let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = cancellation.cancelled() => break,
                    _ = ticker.tick() => {
                        let report = gateway.health().await;
                        match report.status {
                            HealthStatus::Degraded | HealthStatus::Unhealthy => {
                                tracing::warn!(
                                    summary = %report.summary(),
                                    "backing services unhealthy"
                                );
                            },
                            _ => tracing::debug!(summary = %report.summary(), "health probe"),
                        }
                    },
                }
            }
            tracing::debug!("health probe stopped");
        })
    }

    /// The lease policy applied to issued credentials.
    pub fn credential_policy(&self) -> &CredentialPolicy {
        &self.inner.credential_policy
    }

    /// The connection cache, for diagnostics.
    pub fn cache(&self) -> &ConnectionCache {
        &self.inner.cache
    }

    pub(crate) fn from_inner(inner: inner::GatewayInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("cache", &self.inner.cache)
            .field("credential_policy", &self.inner.credential_policy)
            .finish_non_exhaustive()
    }
}
