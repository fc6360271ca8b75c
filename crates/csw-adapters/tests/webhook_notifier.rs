//! # HTTP Webhook Notifier against a Mock Endpoint
//!
//! Verifies request construction (method, path, headers, JSON body) and
//! error mapping of [`HttpWebhookNotifier`] using wiremock.

use csw_adapters::{HttpWebhookNotifier, EVENT_HEADER};
use csw_core::Timestamp;
use csw_validation::{
    dispatch_best_effort, event_types, NotificationEvent, NotifyError, WebhookConfig,
    WebhookNotifier,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn notifier(server: &MockServer, token: Option<&str>) -> HttpWebhookNotifier {
    let config = WebhookConfig {
        url: format!("{}/hooks/csw", server.uri()),
        timeout_secs: 5,
        auth_token: token.map(String::from),
    };
    HttpWebhookNotifier::new(&config).expect("notifier build")
}

fn event() -> NotificationEvent {
    NotificationEvent {
        event_type: event_types::TRANSACTION_OVERRIDE_REQUIRED.to_string(),
        payload: serde_json::json!({
            "external_id": "SO-1001",
            "violation_count": 1,
        }),
        occurred_at: Timestamp::now(),
    }
}

#[tokio::test]
async fn posts_event_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hooks/csw"))
        .and(header("Authorization", "Bearer s3cret"))
        .and(header("Content-Type", "application/json"))
        .and(header(EVENT_HEADER, event_types::TRANSACTION_OVERRIDE_REQUIRED))
        .and(body_partial_json(serde_json::json!({
            "event_type": "transaction.override_required",
            "payload": { "external_id": "SO-1001" },
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    notifier(&server, Some("s3cret"))
        .dispatch(&event())
        .await
        .expect("dispatch");
}

#[tokio::test]
async fn non_success_is_rejected_with_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hooks/csw"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&server)
        .await;

    let err = notifier(&server, None).dispatch(&event()).await.unwrap_err();
    match err {
        NotifyError::Rejected { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn long_error_body_is_truncated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("x".repeat(4096)))
        .mount(&server)
        .await;

    let err = notifier(&server, None).dispatch(&event()).await.unwrap_err();
    let NotifyError::Rejected { body, .. } = err else {
        panic!("expected Rejected");
    };
    assert_eq!(body.len(), 512);
}

#[tokio::test]
async fn unreachable_endpoint_is_transport_error() {
    let config = WebhookConfig {
        url: "http://127.0.0.1:9/hooks/csw".into(),
        timeout_secs: 2,
        auth_token: None,
    };
    let notifier = HttpWebhookNotifier::new(&config).expect("notifier build");
    assert!(matches!(
        notifier.dispatch(&event()).await,
        Err(NotifyError::Transport(_))
    ));
}

#[tokio::test]
async fn best_effort_dispatch_swallows_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    dispatch_best_effort(&notifier(&server, None), event()).await;
}
