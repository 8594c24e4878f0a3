//! Common harness for gateway integration tests.

use std::sync::{Arc, Once};

use ory_auth::testing::{MockAuthorizationService, MockConnector, MockIdentityService};
use ory_auth::{Gateway, InMemoryStorage, LoginRequest};

pub const TOKEN: &str = "ory_kratos_session=alice-session";
pub const SUBJECT: &str = "3f6c9a1e-alice";
pub const NAMESPACE: &str = "documents";
pub const OBJECT: &str = "roadmap";
pub const RELATION: &str = "viewer";

static TRACING: Once = Once::new();

/// Installs a test subscriber honouring `RUST_LOG`, once per binary.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A gateway wired to mocks where `SUBJECT` owns `TOKEN` and holds
/// `RELATION` on `NAMESPACE:OBJECT`.
pub struct TestFixture {
    pub gateway: Gateway,
    pub connector: MockConnector,
    pub storage: Arc<InMemoryStorage>,
}

impl TestFixture {
    pub fn new() -> Self {
        Self::with_services(
            MockIdentityService::new().with_session(TOKEN, SUBJECT),
            MockAuthorizationService::new().allow(NAMESPACE, OBJECT, RELATION, SUBJECT),
        )
    }

    pub fn with_services(
        identity: MockIdentityService,
        authorization: MockAuthorizationService,
    ) -> Self {
        init_tracing();

        let connector = MockConnector::new(identity, authorization);
        let storage = Arc::new(InMemoryStorage::new());
        let gateway = Gateway::builder()
            .storage(storage.clone())
            .connector(Arc::new(connector.clone()))
            .build()
            .expect("default gateway should build");

        Self { gateway, connector, storage }
    }
}

/// A request for the fixture's allowed relation.
pub fn allowed_request() -> LoginRequest {
    LoginRequest::new(TOKEN, NAMESPACE, OBJECT, RELATION)
}
