//! Configuration writes, invalidation hooks and health.

use std::time::Duration;

use ory_auth::transport::ServiceKind;
use ory_auth::{
    AuthorizationConfig, CONFIG_KEY, ErrorKind, GatewayConfig, HealthStatus, IdentityConfig,
    Storage, Transport,
};

use crate::common::{TestFixture, allowed_request};

fn custom_config() -> GatewayConfig {
    GatewayConfig::builder()
        .identity(IdentityConfig::builder().url("https://kratos.internal").build())
        .authorization(
            AuthorizationConfig::builder()
                .transport(Transport::Http)
                .endpoint("http://keto.internal:4466")
                .request_timeout(Duration::from_secs(3))
                .build(),
        )
        .build()
}

#[tokio::test]
async fn test_defaults_used_until_config_written() {
    let fixture = TestFixture::new();

    assert!(fixture.gateway.read_config().await.unwrap().is_none());
    assert!(fixture.gateway.login(&allowed_request()).await.is_granted());

    let identity = fixture.connector.last_identity_config().unwrap();
    assert_eq!(identity, IdentityConfig::default());
    let authorization = fixture.connector.last_authorization_config().unwrap();
    assert_eq!(authorization.transport, Transport::Grpc);
}

#[tokio::test]
async fn test_write_config_forces_recreation() {
    let fixture = TestFixture::new();
    let before = fixture.gateway.cache().identity().await.unwrap();

    fixture.gateway.write_config(&custom_config()).await.unwrap();
    assert_eq!(fixture.gateway.read_config().await.unwrap(), Some(custom_config()));
    assert!(!fixture.gateway.cache().is_cached(ServiceKind::Identity).await);

    assert!(fixture.gateway.login(&allowed_request()).await.is_granted());
    let after = fixture.gateway.cache().identity().await.unwrap();

    assert!(after.generation() > before.generation());
    assert_eq!(fixture.connector.last_identity_config().unwrap().url, "https://kratos.internal");
    assert_eq!(
        fixture.connector.last_authorization_config().unwrap().endpoint,
        "http://keto.internal:4466"
    );
}

#[tokio::test]
async fn test_external_config_change_via_invalidation_hook() {
    let fixture = TestFixture::new();
    assert!(fixture.gateway.login(&allowed_request()).await.is_granted());

    // The host rewrites storage itself, then notifies the gateway.
    let raw = serde_json::to_vec(&custom_config()).unwrap();
    fixture.storage.put(CONFIG_KEY, raw).await.unwrap();

    fixture.gateway.invalidate("some/other/key").await;
    assert!(fixture.gateway.cache().is_cached(ServiceKind::Authorization).await);

    fixture.gateway.invalidate(CONFIG_KEY).await;
    assert!(!fixture.gateway.cache().is_cached(ServiceKind::Authorization).await);

    assert!(fixture.gateway.login(&allowed_request()).await.is_granted());
    assert_eq!(
        fixture.connector.last_authorization_config().unwrap().transport,
        Transport::Http
    );
}

#[tokio::test]
async fn test_corrupt_stored_config_denies_with_unavailable() {
    let fixture = TestFixture::new();
    fixture.storage.put(CONFIG_KEY, b"{\"identity\": 7}".to_vec()).await.unwrap();

    assert_eq!(fixture.gateway.read_config().await.unwrap_err().kind(), ErrorKind::Storage);

    let outcome = fixture.gateway.login(&allowed_request()).await;
    assert_eq!(outcome.denial().unwrap().kind(), ErrorKind::UpstreamUnavailable);
    assert_eq!(fixture.connector.connects(ServiceKind::Identity), 0);
}

#[tokio::test]
async fn test_health_on_cold_cache_does_not_connect() {
    let fixture = TestFixture::new();

    let report = fixture.gateway.health().await;

    assert_eq!(report.status, HealthStatus::NotConnected);
    for kind in ServiceKind::ALL {
        assert_eq!(report.component(kind).unwrap().status, HealthStatus::NotConnected);
        assert_eq!(fixture.connector.connects(kind), 0);
    }
    assert_eq!(fixture.storage.read_count(), 0);
}

#[tokio::test]
async fn test_health_on_warm_cache() {
    let fixture = TestFixture::new();
    assert!(fixture.gateway.login(&allowed_request()).await.is_granted());

    let report = fixture.gateway.health().await;
    assert!(report.is_healthy());

    fixture.connector.identity().set_healthy(false);
    fixture.connector.authorization().set_healthy(false);
    let report = fixture.gateway.health().await;
    assert_eq!(report.status, HealthStatus::Unhealthy);

    // Probing never evicts or creates handles.
    assert!(fixture.gateway.cache().is_cached(ServiceKind::Identity).await);
    assert_eq!(fixture.gateway.cache().handles_created(), 2);
}
