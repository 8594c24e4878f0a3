//! End-to-end login decisions.

use std::collections::BTreeMap;
use std::time::Duration;

use ory_auth::testing::{MockAuthorizationService, MockIdentityService};
use ory_auth::transport::{ServiceKind, SessionLookup};
use ory_auth::{CallContext, ErrorKind, LoginOutcome, LoginRequest, LoginState};
use test_case::test_case;
use tokio_util::sync::CancellationToken;

use crate::common::{NAMESPACE, OBJECT, RELATION, SUBJECT, TOKEN, TestFixture, allowed_request};

#[test_case("session_token" ; "session token")]
#[test_case("namespace" ; "namespace")]
#[test_case("object" ; "object")]
#[test_case("relation" ; "relation")]
#[tokio::test]
async fn test_missing_field_never_reaches_services(missing: &str) {
    let fixture = TestFixture::new();
    let mut fields = serde_json::Map::new();
    let all = [
        ("session_token", TOKEN),
        ("namespace", NAMESPACE),
        ("object", OBJECT),
        ("relation", RELATION),
    ];
    for (name, value) in all {
        if name != missing {
            fields.insert(name.to_string(), value.into());
        }
    }

    let outcome = fixture.gateway.login_fields(&fields, &CallContext::new()).await;

    let denial = outcome.denial().expect("missing field must deny");
    assert_eq!(denial.kind(), ErrorKind::InvalidInput);
    assert_eq!(denial.stage(), LoginState::Start);
    assert!(denial.to_string().contains(missing));
    assert_eq!(fixture.connector.connects(ServiceKind::Identity), 0);
    assert_eq!(fixture.connector.connects(ServiceKind::Authorization), 0);
    assert_eq!(fixture.connector.identity().calls(), 0);
    assert_eq!(fixture.connector.authorization().calls(), 0);
    assert_eq!(fixture.storage.read_count(), 0);
}

#[tokio::test]
async fn test_non_string_field_counts_as_missing() {
    let fixture = TestFixture::new();
    let fields = serde_json::json!({
        "session_token": TOKEN,
        "namespace": NAMESPACE,
        "object": 42,
        "relation": RELATION,
    });

    let outcome =
        fixture.gateway.login_fields(fields.as_object().unwrap(), &CallContext::new()).await;
    assert_eq!(outcome.into_result().unwrap_err().kind(), ErrorKind::InvalidInput);
}

#[tokio::test]
async fn test_granted_credential() {
    let fixture = TestFixture::new();

    let outcome = fixture.gateway.login(&allowed_request()).await;
    assert!(matches!(outcome, LoginOutcome::Granted(_)));
    let credential = outcome.into_result().expect("login should be granted");

    assert_eq!(credential.policies.len(), 1);
    assert!(credential.has_policy("documents/roadmap"));
    assert_eq!(
        credential.metadata,
        [("namespace", NAMESPACE), ("object", OBJECT), ("relation", RELATION), ("subject", SUBJECT)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>()
    );
    assert_eq!(credential.ttl, Duration::from_secs(3600));
    assert_eq!(credential.max_ttl, Duration::from_secs(3600));
    assert_eq!(credential.period, Some(Duration::from_secs(3600)));
    assert!(credential.renewable);
    assert_eq!(credential.alias, "kratos-session");
    assert_eq!(credential.display_name, "kratos");

    let query = fixture.connector.authorization().last_query().unwrap();
    assert_eq!(query.subject(), SUBJECT);
}

#[tokio::test]
async fn test_relation_not_held_is_denial_not_error() {
    let fixture = TestFixture::new();
    let request = LoginRequest::new(TOKEN, NAMESPACE, OBJECT, "editor");

    let outcome = fixture.gateway.login(&request).await;

    let message = outcome.error_message().unwrap();
    assert!(message.contains("relation not held"), "message: {message}");
    let denial = outcome.denial().unwrap();
    assert!(denial.is_not_authorized());
    assert_eq!(denial.stage(), LoginState::RelationChecked);
    assert_eq!(outcome.into_result().unwrap_err().kind(), ErrorKind::NotAuthorized);
}

#[tokio::test]
async fn test_invalid_session_skips_authorization() {
    let fixture = TestFixture::with_services(
        MockIdentityService::new().with_lookup(TOKEN, SessionLookup::rejected(401)),
        MockAuthorizationService::new().allow(NAMESPACE, OBJECT, RELATION, SUBJECT),
    );

    let outcome = fixture.gateway.login(&allowed_request()).await;

    let denial = outcome.denial().unwrap();
    assert_eq!(denial.kind(), ErrorKind::SessionInvalid);
    assert_eq!(fixture.connector.identity().calls(), 1);
    assert_eq!(fixture.connector.connects(ServiceKind::Authorization), 0);
    assert_eq!(fixture.connector.authorization().calls(), 0);
}

#[tokio::test]
async fn test_unreachable_services_are_distinguished_from_denial() {
    let fixture = TestFixture::new();
    fixture.connector.set_unreachable(ServiceKind::Authorization, true);

    let outcome = fixture.gateway.login(&allowed_request()).await;

    let denial = outcome.denial().unwrap();
    assert_eq!(denial.kind(), ErrorKind::UpstreamUnavailable);
    assert!(!denial.is_not_authorized());
    assert!(outcome.error_message().unwrap().starts_with("upstream unavailable"));
}

#[tokio::test]
async fn test_cancel_while_blocked_on_authorization() {
    let fixture = TestFixture::with_services(
        MockIdentityService::new().with_session(TOKEN, SUBJECT),
        MockAuthorizationService::new().allow(NAMESPACE, OBJECT, RELATION, SUBJECT).blocking(),
    );
    let token = CancellationToken::new();
    let ctx = CallContext::new().with_cancellation(token.clone());

    let gateway = fixture.gateway.clone();
    let attempt =
        tokio::spawn(async move { gateway.login_with_context(&allowed_request(), &ctx).await });

    fixture.connector.authorization().wait_until_called().await;
    token.cancel();

    let outcome = tokio::time::timeout(Duration::from_secs(5), attempt)
        .await
        .expect("cancelled login should return promptly")
        .unwrap();
    let denial = outcome.denial().expect("cancelled login must not be granted");
    assert_eq!(denial.kind(), ErrorKind::Cancelled);
    assert_eq!(denial.stage(), LoginState::SessionResolved);

    // The allowed answer arriving later changes nothing.
    fixture.connector.authorization().release();
}

#[tokio::test(start_paused = true)]
async fn test_deadline_while_waiting_on_authorization() {
    let fixture = TestFixture::with_services(
        MockIdentityService::new().with_session(TOKEN, SUBJECT),
        MockAuthorizationService::new()
            .allow(NAMESPACE, OBJECT, RELATION, SUBJECT)
            .with_delay(Duration::from_secs(60)),
    );
    let ctx = CallContext::new().with_timeout(Duration::from_secs(2));

    let outcome = fixture.gateway.login_with_context(&allowed_request(), &ctx).await;

    assert_eq!(outcome.into_result().unwrap_err().kind(), ErrorKind::Timeout);
}

#[tokio::test]
async fn test_already_cancelled_context_makes_no_calls() {
    let fixture = TestFixture::new();
    let token = CancellationToken::new();
    token.cancel();

    let outcome = fixture
        .gateway
        .login_with_context(&allowed_request(), &CallContext::new().with_cancellation(token))
        .await;

    assert_eq!(outcome.denial().unwrap().kind(), ErrorKind::Cancelled);
    assert_eq!(fixture.connector.identity().calls(), 0);
}
