//! Gateway builder with typestate pattern.

use std::marker::PhantomData;
use std::sync::Arc;

use super::cache::ConnectionCache;
use super::inner::GatewayInner;
use crate::config::{CredentialPolicy, Storage};
use crate::login::{CredentialIssuer, LoginCoordinator, RelationChecker, SessionResolver};
use crate::transport::{DefaultConnector, ServiceConnector};
use crate::{Error, Gateway};

/// Marker type: storage not yet provided.
pub struct NoStorage;

/// Marker type: storage has been provided.
pub struct HasStorage;

/// Builder for creating [`Gateway`] instances.
///
/// Storage is required and enforced at compile time.
///
/// ## Optional Configuration
///
/// - `connector()`: How service handles are created (default:
///   [`DefaultConnector`])
/// - `credential_policy()`: Lease settings for issued credentials
///
/// ## Example
///
/// ```rust
/// use std::sync::Arc;
/// use std::time::Duration;
/// use ory_auth::{CredentialPolicy, Gateway, InMemoryStorage};
///
/// let gateway = Gateway::builder()
///     .storage(Arc::new(InMemoryStorage::new()))
///     .credential_policy(CredentialPolicy::with_window(Duration::from_secs(900)))
///     .build()
///     .unwrap();
/// assert_eq!(gateway.credential_policy().ttl, Duration::from_secs(900));
/// ```
pub struct GatewayBuilder<StorageState> {
    storage: Option<Arc<dyn Storage>>,
    connector: Option<Arc<dyn ServiceConnector>>,
    credential_policy: CredentialPolicy,
    _storage_state: PhantomData<StorageState>,
}

impl GatewayBuilder<NoStorage> {
    /// Creates a new gateway builder.
    pub fn new() -> Self {
        Self {
            storage: None,
            connector: None,
            credential_policy: CredentialPolicy::default(),
            _storage_state: PhantomData,
        }
    }

    /// Sets the host storage holding the persisted configuration.
    pub fn storage(self, storage: Arc<dyn Storage>) -> GatewayBuilder<HasStorage> {
        GatewayBuilder {
            storage: Some(storage),
            connector: self.connector,
            credential_policy: self.credential_policy,
            _storage_state: PhantomData,
        }
    }
}

impl Default for GatewayBuilder<NoStorage> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> GatewayBuilder<S> {
    /// Sets the connector used on connection cache misses.
    #[must_use]
    pub fn connector(mut self, connector: Arc<dyn ServiceConnector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Sets the lease policy for issued credentials.
    #[must_use]
    pub fn credential_policy(mut self, policy: CredentialPolicy) -> Self {
        self.credential_policy = policy;
        self
    }
}

impl GatewayBuilder<HasStorage> {
    /// Builds the gateway.
    ///
    /// No backing service is contacted; handles are created on first use.
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if the credential policy is invalid.
    pub fn build(self) -> Result<Gateway, Error> {
        self.credential_policy.validate()?;

        let storage = self
            .storage
            .ok_or_else(|| Error::configuration("storage is required"))?;
        let connector = self.connector.unwrap_or_else(|| Arc::new(DefaultConnector::new()));

        let cache = Arc::new(ConnectionCache::new(storage, connector));
        let coordinator = LoginCoordinator::new(
            SessionResolver::new(cache.clone()),
            RelationChecker::new(cache.clone()),
            CredentialIssuer::new(self.credential_policy.clone()),
        );

        Ok(Gateway::from_inner(GatewayInner {
            cache,
            coordinator,
            credential_policy: self.credential_policy,
        }))
    }
}
