//! Gateway over the real REST adapters, against wiremock servers.

use std::sync::Arc;
use std::time::Duration;

use ory_auth::{
    AuthorizationConfig, ErrorKind, Gateway, GatewayConfig, HealthStatus, IdentityConfig,
    InMemoryStorage, LoginRequest, SessionTokenKind, Transport,
};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::init_tracing;

async fn gateway_for(kratos: &MockServer, keto: &MockServer) -> Gateway {
    init_tracing();

    let gateway = Gateway::builder().storage(Arc::new(InMemoryStorage::new())).build().unwrap();
    let config = GatewayConfig::builder()
        .identity(
            IdentityConfig::builder()
                .url(format!("{}/auth", kratos.uri()))
                .token_kind(SessionTokenKind::Header)
                .request_timeout(Duration::from_secs(5))
                .build(),
        )
        .authorization(
            AuthorizationConfig::builder()
                .transport(Transport::Http)
                .endpoint(keto.uri())
                .build(),
        )
        .build();
    gateway.write_config(&config).await.unwrap();
    gateway
}

async fn mount_session(kratos: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/auth/sessions/whoami"))
        .and(header("x-session-token", "session-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "b7c1",
            "active": true,
            "identity": {"id": "user-42", "traits": {"email": "dev@example.com"}}
        })))
        .mount(kratos)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/sessions/whoami"))
        .respond_with(ResponseTemplate::new(401))
        .with_priority(10)
        .mount(kratos)
        .await;
}

async fn mount_check(keto: &MockServer, relation: &str, allowed: bool) {
    Mock::given(method("GET"))
        .and(path("/relation-tuples/check/openapi"))
        .and(query_param("namespace", "projects"))
        .and(query_param("object", "apollo"))
        .and(query_param("relation", relation))
        .and(query_param("subject_id", "user-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"allowed": allowed})))
        .mount(keto)
        .await;
}

#[tokio::test]
async fn test_login_granted_over_rest() {
    let (kratos, keto) = (MockServer::start().await, MockServer::start().await);
    mount_session(&kratos).await;
    mount_check(&keto, "member", true).await;
    let gateway = gateway_for(&kratos, &keto).await;

    let credential = gateway
        .login(&LoginRequest::new("session-abc", "projects", "apollo", "member"))
        .await
        .into_result()
        .unwrap();

    assert!(credential.has_policy("projects/apollo"));
    assert_eq!(credential.metadata_value("subject"), Some("user-42"));
}

#[tokio::test]
async fn test_login_denied_over_rest() {
    let (kratos, keto) = (MockServer::start().await, MockServer::start().await);
    mount_session(&kratos).await;
    mount_check(&keto, "owner", false).await;
    let gateway = gateway_for(&kratos, &keto).await;

    let outcome =
        gateway.login(&LoginRequest::new("session-abc", "projects", "apollo", "owner")).await;

    assert!(outcome.denial().unwrap().is_not_authorized());
}

#[tokio::test]
async fn test_expired_session_over_rest() {
    let (kratos, keto) = (MockServer::start().await, MockServer::start().await);
    mount_session(&kratos).await;
    Mock::given(method("GET"))
        .and(path("/relation-tuples/check/openapi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"allowed": true})))
        .expect(0)
        .mount(&keto)
        .await;
    let gateway = gateway_for(&kratos, &keto).await;

    let outcome =
        gateway.login(&LoginRequest::new("stale-session", "projects", "apollo", "member")).await;

    assert_eq!(outcome.denial().unwrap().kind(), ErrorKind::SessionInvalid);
}

#[tokio::test]
async fn test_keto_failure_over_rest() {
    let (kratos, keto) = (MockServer::start().await, MockServer::start().await);
    mount_session(&kratos).await;
    Mock::given(method("GET"))
        .and(path("/relation-tuples/check/openapi"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database unavailable"))
        .mount(&keto)
        .await;
    let gateway = gateway_for(&kratos, &keto).await;

    let outcome =
        gateway.login(&LoginRequest::new("session-abc", "projects", "apollo", "member")).await;

    let denial = outcome.denial().unwrap();
    assert_eq!(denial.kind(), ErrorKind::Upstream);
    assert!(!denial.is_not_authorized());
}

#[tokio::test]
async fn test_health_probes_cached_rest_handles() {
    let (kratos, keto) = (MockServer::start().await, MockServer::start().await);
    mount_session(&kratos).await;
    mount_check(&keto, "member", true).await;
    Mock::given(method("GET"))
        .and(path("/auth/health/alive"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&kratos)
        .await;
    Mock::given(method("GET"))
        .and(path("/health/alive"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&keto)
        .await;
    let gateway = gateway_for(&kratos, &keto).await;

    assert_eq!(gateway.health().await.status, HealthStatus::NotConnected);

    gateway.login(&LoginRequest::new("session-abc", "projects", "apollo", "member")).await;
    let report = gateway.health().await;

    assert_eq!(report.status, HealthStatus::Degraded);
}
