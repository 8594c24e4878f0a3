//! Lazily-created, shared, invalidatable service handles.
//!
//! The cache keeps at most one handle per [`ServiceKind`]. Acquisition is
//! double-checked: a shared-lock read serves the warm path; on a miss the
//! exclusive lock is taken, the slot re-checked, and only then is the
//! connector asked to dial. Concurrent first use therefore dials once.

use std::fmt;
use std::future::Future;
use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;

use crate::Error;
use crate::config::{GatewayConfig, Storage, load_config};
use crate::transport::{
    AuthorizationService, BackingService, IdentityService, ServiceConnector, ServiceKind,
};

// ============================================================================
// Service Handle
// ============================================================================

/// A shared reference to one live service client.
///
/// Cloning is cheap. A clone stays usable after the cache evicts the
/// handle, so a login that already acquired it finishes against it.
pub struct ServiceHandle<S: ?Sized> {
    service: Arc<S>,
    generation: u64,
}

impl<S: ?Sized> ServiceHandle<S> {
    /// The creation sequence number of this handle, starting at 1.
    ///
    /// A handle created after an invalidation always has a higher
    /// generation than the one it replaced.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns the underlying service.
    pub fn service(&self) -> &Arc<S> {
        &self.service
    }

    /// Returns `true` if both handles refer to the same client.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.service, &other.service)
    }
}

impl<S: ?Sized> Clone for ServiceHandle<S> {
    fn clone(&self) -> Self {
        Self { service: Arc::clone(&self.service), generation: self.generation }
    }
}

impl<S: ?Sized> Deref for ServiceHandle<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.service
    }
}

impl<S: ?Sized + BackingService> fmt::Debug for ServiceHandle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceHandle")
            .field("endpoint", &self.service.endpoint())
            .field("generation", &self.generation)
            .finish()
    }
}

// ============================================================================
// Slot
// ============================================================================

struct Slot<S: ?Sized> {
    kind: ServiceKind,
    handle: RwLock<Option<ServiceHandle<S>>>,
}

impl<S: ?Sized + BackingService> Slot<S> {
    fn new(kind: ServiceKind) -> Self {
        Self { kind, handle: RwLock::new(None) }
    }

    async fn acquire<F, Fut>(
        &self,
        generations: &AtomicU64,
        create: F,
    ) -> Result<ServiceHandle<S>, Error>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Arc<S>, Error>>,
    {
        if let Some(handle) = self.handle.read().await.as_ref() {
            return Ok(handle.clone());
        }

        let mut slot = self.handle.write().await;
        if let Some(handle) = slot.as_ref() {
            return Ok(handle.clone());
        }

        let service = match create().await {
            Ok(service) => service,
            Err(e) => {
                tracing::warn!(service = %self.kind, error = %e, "failed to create service handle");
                return Err(e);
            },
        };

        let handle =
            ServiceHandle { service, generation: generations.fetch_add(1, Ordering::SeqCst) + 1 };
        tracing::debug!(
            service = %self.kind,
            endpoint = handle.endpoint(),
            generation = handle.generation,
            "service handle created"
        );
        *slot = Some(handle.clone());
        Ok(handle)
    }

    async fn peek(&self) -> Option<ServiceHandle<S>> {
        self.handle.read().await.clone()
    }

    async fn invalidate(&self) {
        let mut slot = self.handle.write().await;
        if let Some(handle) = slot.take() {
            handle.close();
            tracing::debug!(
                service = %self.kind,
                generation = handle.generation,
                "service handle invalidated"
            );
        }
    }
}

// ============================================================================
// Connection Cache
// ============================================================================

/// Holds at most one live handle per backing service.
///
/// Handles are created on first use from the configuration currently in
/// [`Storage`] (defaults when nothing is stored) and live until
/// invalidated.
pub struct ConnectionCache {
    storage: Arc<dyn Storage>,
    connector: Arc<dyn ServiceConnector>,
    identity: Slot<dyn IdentityService>,
    authorization: Slot<dyn AuthorizationService>,
    generations: AtomicU64,
}

impl ConnectionCache {
    /// Creates an empty cache.
    pub fn new(storage: Arc<dyn Storage>, connector: Arc<dyn ServiceConnector>) -> Self {
        Self {
            storage,
            connector,
            identity: Slot::new(ServiceKind::Identity),
            authorization: Slot::new(ServiceKind::Authorization),
            generations: AtomicU64::new(0),
        }
    }

    /// Returns the identity handle, creating it if absent.
    pub async fn identity(&self) -> Result<ServiceHandle<dyn IdentityService>, Error> {
        self.identity
            .acquire(&self.generations, || async {
                let config = self.current_config().await?;
                self.connector.connect_identity(&config.identity).await
            })
            .await
    }

    /// Returns the authorization handle, creating it if absent.
    pub async fn authorization(&self) -> Result<ServiceHandle<dyn AuthorizationService>, Error> {
        self.authorization
            .acquire(&self.generations, || async {
                let config = self.current_config().await?;
                self.connector.connect_authorization(&config.authorization).await
            })
            .await
    }

    /// Returns the cached handle for `kind` without creating one.
    pub async fn peek(&self, kind: ServiceKind) -> Option<ServiceHandle<dyn BackingService>> {
        match kind {
            ServiceKind::Identity => self.identity.peek().await.map(|handle| {
                let service: Arc<dyn BackingService> = handle.service;
                ServiceHandle { service, generation: handle.generation }
            }),
            ServiceKind::Authorization => self.authorization.peek().await.map(|handle| {
                let service: Arc<dyn BackingService> = handle.service;
                ServiceHandle { service, generation: handle.generation }
            }),
        }
    }

    /// Returns `true` if a handle for `kind` is cached.
    pub async fn is_cached(&self, kind: ServiceKind) -> bool {
        self.peek(kind).await.is_some()
    }

    /// Closes and drops the handle for `kind`. No-op when empty.
    pub async fn invalidate(&self, kind: ServiceKind) {
        match kind {
            ServiceKind::Identity => self.identity.invalidate().await,
            ServiceKind::Authorization => self.authorization.invalidate().await,
        }
    }

    /// Invalidates both handles.
    pub async fn invalidate_all(&self) {
        for kind in ServiceKind::ALL {
            self.invalidate(kind).await;
        }
    }

    /// Total number of handles created so far.
    pub fn handles_created(&self) -> u64 {
        self.generations.load(Ordering::SeqCst)
    }

    pub(crate) fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    async fn current_config(&self) -> Result<GatewayConfig, Error> {
        Ok(load_config(self.storage.as_ref()).await?.unwrap_or_default())
    }
}

impl fmt::Debug for ConnectionCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionCache")
            .field("handles_created", &self.handles_created())
            .finish_non_exhaustive()
    }
}
