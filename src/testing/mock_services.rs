//! Scriptable identity and authorization services.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::Notify;

use crate::transport::{
    AuthorizationService, BackingService, CheckResult, IdentityService, SessionLookup,
};
use crate::types::RelationQuery;
use crate::{Error, ErrorKind};

/// A failure the mock returns instead of answering.
#[derive(Debug, Clone)]
struct ScriptedFailure {
    kind: ErrorKind,
    message: String,
}

impl ScriptedFailure {
    fn to_error(&self) -> Error {
        Error::new(self.kind, self.message.clone())
    }
}

/// Liveness and close bookkeeping shared by both mocks.
#[derive(Debug)]
struct Lifecycle {
    endpoint: String,
    healthy: AtomicBool,
    probes: AtomicUsize,
    closes: AtomicUsize,
}

impl Lifecycle {
    fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            healthy: AtomicBool::new(true),
            probes: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
        }
    }

    fn probe(&self) -> Result<(), Error> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::upstream(format!("{} is not responding", self.endpoint)))
        }
    }
}

// ============================================================================
// Identity
// ============================================================================

/// An in-process identity service.
///
/// Unknown tokens are rejected with status 401. Clones share state, so a
/// test can keep one clone for assertions while the gateway uses another.
///
/// ## Example
///
/// ```rust
/// use ory_auth::testing::MockIdentityService;
///
/// let identity = MockIdentityService::new().with_session("token-1", "user-1");
/// assert_eq!(identity.calls(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockIdentityService {
    state: Arc<IdentityState>,
}

#[derive(Debug)]
struct IdentityState {
    sessions: RwLock<HashMap<String, SessionLookup>>,
    failure: RwLock<Option<ScriptedFailure>>,
    calls: AtomicUsize,
    lifecycle: Lifecycle,
}

impl Default for MockIdentityService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockIdentityService {
    /// Creates a service that knows no sessions.
    pub fn new() -> Self {
        Self {
            state: Arc::new(IdentityState {
                sessions: RwLock::new(HashMap::new()),
                failure: RwLock::new(None),
                calls: AtomicUsize::new(0),
                lifecycle: Lifecycle::new("mock://identity"),
            }),
        }
    }

    /// Registers a live session for `token` owned by `subject_id`.
    #[must_use]
    pub fn with_session(self, token: impl Into<String>, subject_id: impl Into<String>) -> Self {
        self.with_lookup(token, SessionLookup::active(subject_id))
    }

    /// Registers an arbitrary lookup result for `token`.
    #[must_use]
    pub fn with_lookup(self, token: impl Into<String>, lookup: SessionLookup) -> Self {
        self.state.sessions.write().insert(token.into(), lookup);
        self
    }

    /// Makes every lookup fail with the given error.
    #[must_use]
    pub fn failing(self, kind: ErrorKind, message: impl Into<String>) -> Self {
        *self.state.failure.write() =
            Some(ScriptedFailure { kind, message: message.into() });
        self
    }

    /// Sets the result of [`probe`](BackingService::probe).
    pub fn set_healthy(&self, healthy: bool) {
        self.state.lifecycle.healthy.store(healthy, Ordering::SeqCst);
    }

    /// Number of `resolve_session` calls served.
    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    /// Number of probes served.
    pub fn probes(&self) -> usize {
        self.state.lifecycle.probes.load(Ordering::SeqCst)
    }

    /// Number of times a handle backed by this service was closed.
    pub fn closes(&self) -> usize {
        self.state.lifecycle.closes.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl BackingService for MockIdentityService {
    fn endpoint(&self) -> &str {
        &self.state.lifecycle.endpoint
    }

    async fn probe(&self) -> Result<(), Error> {
        self.state.lifecycle.probe()
    }

    fn close(&self) {
        self.state.lifecycle.closes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl IdentityService for MockIdentityService {
    async fn resolve_session(&self, token: &str) -> Result<SessionLookup, Error> {
        self.state.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(failure) = self.state.failure.read().as_ref() {
            return Err(failure.to_error());
        }

        Ok(self
            .state
            .sessions
            .read()
            .get(token)
            .cloned()
            .unwrap_or_else(|| SessionLookup::rejected(401)))
    }
}

// ============================================================================
// Authorization
// ============================================================================

/// An in-process authorization service holding a set of relation tuples.
///
/// A check is allowed iff the exact query was registered with
/// [`allow`](Self::allow). The service can also be made slow
/// ([`with_delay`](Self::with_delay)) or made to block until released
/// ([`blocking`](Self::blocking)), for cancellation and deadline tests.
#[derive(Debug, Clone)]
pub struct MockAuthorizationService {
    state: Arc<AuthorizationState>,
}

#[derive(Debug)]
struct AuthorizationState {
    tuples: RwLock<HashSet<RelationQuery>>,
    failure: RwLock<Option<ScriptedFailure>>,
    delay: RwLock<Option<Duration>>,
    blocking: AtomicBool,
    release: Notify,
    entered: Notify,
    last_query: RwLock<Option<RelationQuery>>,
    calls: AtomicUsize,
    lifecycle: Lifecycle,
}

impl Default for MockAuthorizationService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAuthorizationService {
    /// Creates a service with no tuples; every check is denied.
    pub fn new() -> Self {
        Self {
            state: Arc::new(AuthorizationState {
                tuples: RwLock::new(HashSet::new()),
                failure: RwLock::new(None),
                delay: RwLock::new(None),
                blocking: AtomicBool::new(false),
                release: Notify::new(),
                entered: Notify::new(),
                last_query: RwLock::new(None),
                calls: AtomicUsize::new(0),
                lifecycle: Lifecycle::new("mock://authorization"),
            }),
        }
    }

    /// Registers the tuple `namespace:object#relation@subject`.
    #[must_use]
    pub fn allow(
        self,
        namespace: impl Into<String>,
        object: impl Into<String>,
        relation: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        self.state.tuples.write().insert(RelationQuery::new(namespace, object, relation, subject));
        self
    }

    /// Makes every check fail with the given error.
    #[must_use]
    pub fn failing(self, kind: ErrorKind, message: impl Into<String>) -> Self {
        *self.state.failure.write() =
            Some(ScriptedFailure { kind, message: message.into() });
        self
    }

    /// Delays every check by `delay` before answering.
    #[must_use]
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.state.delay.write() = Some(delay);
        self
    }

    /// Makes every check wait until [`release`](Self::release) is called.
    #[must_use]
    pub fn blocking(self) -> Self {
        self.state.blocking.store(true, Ordering::SeqCst);
        self
    }

    /// Unblocks checks waiting in [`blocking`](Self::blocking) mode.
    pub fn release(&self) {
        self.state.blocking.store(false, Ordering::SeqCst);
        self.state.release.notify_waiters();
    }

    /// Resolves once a check call has started.
    pub async fn wait_until_called(&self) {
        self.state.entered.notified().await;
    }

    /// Sets the result of [`probe`](BackingService::probe).
    pub fn set_healthy(&self, healthy: bool) {
        self.state.lifecycle.healthy.store(healthy, Ordering::SeqCst);
    }

    /// Number of `check` calls started.
    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    /// The most recent query received.
    pub fn last_query(&self) -> Option<RelationQuery> {
        self.state.last_query.read().clone()
    }

    /// Number of probes served.
    pub fn probes(&self) -> usize {
        self.state.lifecycle.probes.load(Ordering::SeqCst)
    }

    /// Number of times a handle backed by this service was closed.
    pub fn closes(&self) -> usize {
        self.state.lifecycle.closes.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl BackingService for MockAuthorizationService {
    fn endpoint(&self) -> &str {
        &self.state.lifecycle.endpoint
    }

    async fn probe(&self) -> Result<(), Error> {
        self.state.lifecycle.probe()
    }

    fn close(&self) {
        self.state.lifecycle.closes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl AuthorizationService for MockAuthorizationService {
    async fn check(&self, query: &RelationQuery) -> Result<CheckResult, Error> {
        self.state.calls.fetch_add(1, Ordering::SeqCst);
        *self.state.last_query.write() = Some(query.clone());

        // Register for release before announcing the call, so a release
        // issued right after `wait_until_called` is not missed.
        let released = self.state.release.notified();
        self.state.entered.notify_one();

        if self.state.blocking.load(Ordering::SeqCst) {
            released.await;
        }

        let delay = *self.state.delay.read();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(failure) = self.state.failure.read().as_ref() {
            return Err(failure.to_error());
        }

        Ok(CheckResult { allowed: self.state.tuples.read().contains(query) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_identity_known_and_unknown_tokens() {
        let identity = MockIdentityService::new().with_session("token-1", "user-1");

        assert_eq!(
            identity.resolve_session("token-1").await.unwrap(),
            SessionLookup::active("user-1")
        );
        assert_eq!(identity.resolve_session("other").await.unwrap(), SessionLookup::rejected(401));
        assert_eq!(identity.calls(), 2);
    }

    #[tokio::test]
    async fn test_identity_failure() {
        let identity = MockIdentityService::new().failing(ErrorKind::Upstream, "connection reset");
        let err = identity.resolve_session("token").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Upstream);
    }

    #[tokio::test]
    async fn test_authorization_tuples() {
        let authz = MockAuthorizationService::new().allow("files", "a", "viewer", "user-1");

        let allowed = RelationQuery::new("files", "a", "viewer", "user-1");
        let denied = RelationQuery::new("files", "a", "editor", "user-1");
        assert!(authz.check(&allowed).await.unwrap().allowed);
        assert!(!authz.check(&denied).await.unwrap().allowed);
        assert_eq!(authz.last_query(), Some(denied));
    }

    #[tokio::test]
    async fn test_blocking_until_release() {
        let authz =
            MockAuthorizationService::new().allow("files", "a", "viewer", "user-1").blocking();
        let query = RelationQuery::new("files", "a", "viewer", "user-1");

        let task = {
            let authz = authz.clone();
            tokio::spawn(async move { authz.check(&query).await })
        };
        authz.wait_until_called().await;
        authz.release();

        assert!(task.await.unwrap().unwrap().allowed);
    }

    #[tokio::test]
    async fn test_probe_and_close() {
        let authz = MockAuthorizationService::new();
        assert!(authz.probe().await.is_ok());
        authz.set_healthy(false);
        assert!(authz.probe().await.is_err());
        assert_eq!(authz.probes(), 2);

        authz.close();
        assert_eq!(authz.closes(), 1);
    }
}
