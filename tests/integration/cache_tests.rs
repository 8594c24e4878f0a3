//! Connection cache behaviour under the gateway.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use ory_auth::testing::{MockAuthorizationService, MockConnector, MockIdentityService};
use ory_auth::transport::ServiceKind;
use ory_auth::{Gateway, InMemoryStorage};

use crate::common::{NAMESPACE, OBJECT, RELATION, SUBJECT, TOKEN, TestFixture, allowed_request};

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_cold_logins_construct_once() {
    crate::common::init_tracing();

    let connector = MockConnector::new(
        MockIdentityService::new().with_session(TOKEN, SUBJECT),
        MockAuthorizationService::new().allow(NAMESPACE, OBJECT, RELATION, SUBJECT),
    )
    .with_dial_delay(Duration::from_millis(25));
    let gateway = Gateway::builder()
        .storage(Arc::new(InMemoryStorage::new()))
        .connector(Arc::new(connector.clone()))
        .build()
        .unwrap();

    let attempts = (0..64).map(|_| {
        let gateway = gateway.clone();
        tokio::spawn(async move { gateway.login(&allowed_request()).await })
    });
    let outcomes = join_all(attempts).await;

    assert!(outcomes.into_iter().all(|o| o.unwrap().is_granted()));
    assert_eq!(connector.connects(ServiceKind::Identity), 1);
    assert_eq!(connector.connects(ServiceKind::Authorization), 1);
    assert_eq!(connector.identity().calls(), 64);
    assert_eq!(gateway.cache().handles_created(), 2);
}

#[tokio::test]
async fn test_invalidate_when_empty_is_noop() {
    let fixture = TestFixture::new();

    fixture.gateway.cache().invalidate(ServiceKind::Identity).await;
    fixture.gateway.cache().invalidate_all().await;
    fixture.gateway.close().await;

    assert_eq!(fixture.connector.identity().closes(), 0);
    assert_eq!(fixture.connector.authorization().closes(), 0);
    assert!(fixture.gateway.login(&allowed_request()).await.is_granted());
}

#[tokio::test]
async fn test_invalidate_tears_down_and_recreates() {
    let fixture = TestFixture::new();
    let cache = fixture.gateway.cache();

    let before = cache.authorization().await.unwrap();
    cache.invalidate(ServiceKind::Authorization).await;
    let after = cache.authorization().await.unwrap();

    assert!(!before.ptr_eq(&after));
    assert!(after.generation() > before.generation());
    assert_eq!(fixture.connector.authorization().closes(), 1);
    assert_eq!(fixture.connector.connects(ServiceKind::Authorization), 2);

    // The identity slot is untouched.
    assert!(!cache.is_cached(ServiceKind::Identity).await);
}

#[tokio::test]
async fn test_in_flight_login_finishes_on_evicted_handle() {
    let fixture = TestFixture::with_services(
        MockIdentityService::new().with_session(TOKEN, SUBJECT),
        MockAuthorizationService::new().allow(NAMESPACE, OBJECT, RELATION, SUBJECT).blocking(),
    );

    let gateway = fixture.gateway.clone();
    let attempt = tokio::spawn(async move { gateway.login(&allowed_request()).await });

    fixture.connector.authorization().wait_until_called().await;
    fixture.gateway.close().await;
    fixture.connector.authorization().release();

    assert!(attempt.await.unwrap().is_granted());
    assert_eq!(fixture.connector.authorization().closes(), 1);
    assert!(!fixture.gateway.cache().is_cached(ServiceKind::Authorization).await);
}

#[tokio::test]
async fn test_failed_dial_is_retried_by_next_login() {
    let fixture = TestFixture::new();
    fixture.connector.set_unreachable(ServiceKind::Identity, true);

    assert!(!fixture.gateway.login(&allowed_request()).await.is_granted());
    assert!(!fixture.gateway.cache().is_cached(ServiceKind::Identity).await);

    fixture.connector.set_unreachable(ServiceKind::Identity, false);
    assert!(fixture.gateway.login(&allowed_request()).await.is_granted());
    assert_eq!(fixture.connector.connects(ServiceKind::Identity), 2);
}
