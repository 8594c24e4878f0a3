//! A connector that hands out mock services and counts dials.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::RwLock;

use super::{MockAuthorizationService, MockIdentityService};
use crate::Error;
use crate::config::{AuthorizationConfig, IdentityConfig};
use crate::transport::{AuthorizationService, IdentityService, ServiceConnector, ServiceKind};

/// A [`ServiceConnector`] backed by [`MockIdentityService`] and
/// [`MockAuthorizationService`].
///
/// Every successful connect returns a fresh `Arc` around a clone of the
/// mock, so handles from different dials are distinct while sharing the
/// mock's scripted state and counters.
///
/// ## Example
///
/// ```rust
/// use ory_auth::testing::{MockAuthorizationService, MockConnector, MockIdentityService};
/// use ory_auth::ServiceKind;
///
/// let connector = MockConnector::new(
///     MockIdentityService::new().with_session("token-1", "user-1"),
///     MockAuthorizationService::new().allow("files", "a", "viewer", "user-1"),
/// );
/// assert_eq!(connector.connects(ServiceKind::Identity), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockConnector {
    identity: MockIdentityService,
    authorization: MockAuthorizationService,
    state: Arc<ConnectorState>,
}

#[derive(Debug, Default)]
struct ConnectorState {
    identity_connects: AtomicUsize,
    authorization_connects: AtomicUsize,
    fail_identity: AtomicBool,
    fail_authorization: AtomicBool,
    dial_delay: RwLock<Option<Duration>>,
    last_identity: RwLock<Option<IdentityConfig>>,
    last_authorization: RwLock<Option<AuthorizationConfig>>,
}

impl MockConnector {
    /// Creates a connector for the given mocks.
    pub fn new(identity: MockIdentityService, authorization: MockAuthorizationService) -> Self {
        Self { identity, authorization, state: Arc::new(ConnectorState::default()) }
    }

    /// Sleeps for `delay` inside every connect, widening the window in
    /// which concurrent acquires can race.
    #[must_use]
    pub fn with_dial_delay(self, delay: Duration) -> Self {
        *self.state.dial_delay.write() = Some(delay);
        self
    }

    /// Makes connects for `kind` fail (or succeed again) with
    /// `UpstreamUnavailable`.
    pub fn set_unreachable(&self, kind: ServiceKind, unreachable: bool) {
        match kind {
            ServiceKind::Identity => self.state.fail_identity.store(unreachable, Ordering::SeqCst),
            ServiceKind::Authorization => {
                self.state.fail_authorization.store(unreachable, Ordering::SeqCst)
            },
        }
    }

    /// Number of connect calls made for `kind`, failed ones included.
    pub fn connects(&self, kind: ServiceKind) -> usize {
        match kind {
            ServiceKind::Identity => self.state.identity_connects.load(Ordering::SeqCst),
            ServiceKind::Authorization => self.state.authorization_connects.load(Ordering::SeqCst),
        }
    }

    /// The identity configuration passed to the most recent connect.
    pub fn last_identity_config(&self) -> Option<IdentityConfig> {
        self.state.last_identity.read().clone()
    }

    /// The authorization configuration passed to the most recent connect.
    pub fn last_authorization_config(&self) -> Option<AuthorizationConfig> {
        self.state.last_authorization.read().clone()
    }

    /// The identity mock shared with issued handles.
    pub fn identity(&self) -> &MockIdentityService {
        &self.identity
    }

    /// The authorization mock shared with issued handles.
    pub fn authorization(&self) -> &MockAuthorizationService {
        &self.authorization
    }

    async fn dial_delay(&self) {
        let delay = *self.state.dial_delay.read();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait::async_trait]
impl ServiceConnector for MockConnector {
    async fn connect_identity(
        &self,
        config: &IdentityConfig,
    ) -> Result<Arc<dyn IdentityService>, Error> {
        self.state.identity_connects.fetch_add(1, Ordering::SeqCst);
        *self.state.last_identity.write() = Some(config.clone());
        self.dial_delay().await;

        if self.state.fail_identity.load(Ordering::SeqCst) {
            return Err(Error::upstream_unavailable(format!("cannot reach {}", config.url)));
        }
        Ok(Arc::new(self.identity.clone()))
    }

    async fn connect_authorization(
        &self,
        config: &AuthorizationConfig,
    ) -> Result<Arc<dyn AuthorizationService>, Error> {
        self.state.authorization_connects.fetch_add(1, Ordering::SeqCst);
        *self.state.last_authorization.write() = Some(config.clone());
        self.dial_delay().await;

        if self.state.fail_authorization.load(Ordering::SeqCst) {
            return Err(Error::upstream_unavailable(format!("cannot reach {}", config.endpoint)));
        }
        Ok(Arc::new(self.authorization.clone()))
    }
}
