//! Gateway interceptor behavior against a live fixture server.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use opsconsole::bridge::MemoryBridge;
use opsconsole::config::{ApiConfig, PathsConfig};
use opsconsole::error::{ConsoleError, TransportKind};
use opsconsole::gateway::Gateway;
use opsconsole::session::SessionStore;

fn fixture_app() -> Router {
    Router::new()
        .route(
            "/ok",
            get(|| async { Json(json!({"status": 200, "message": "ok", "data": {"value": 42}, "timestamp": 1})) }),
        )
        .route(
            "/ok-alt",
            get(|| async { Json(json!({"code": 0, "msg": "ok", "data": []})) }),
        )
        .route(
            "/expired",
            get(|| async { Json(json!({"status": 401, "message": "session expired"})) }),
        )
        .route(
            "/apperr",
            get(|| async { Json(json!({"status": 500, "message": "boom"})) }),
        )
        .route(
            "/echo-auth",
            get(|headers: HeaderMap| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                Json(json!({"status": 200, "message": "ok", "data": {"auth": auth}}))
            }),
        )
        .route(
            "/forbidden",
            get(|| async {
                (
                    axum::http::StatusCode::FORBIDDEN,
                    Json(json!({"error": "forbidden"})),
                )
            }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(1500)).await;
                Json(json!({"status": 200, "message": "ok", "data": null}))
            }),
        )
}

async fn spawn_fixture() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fixture listener");
    let addr = listener.local_addr().expect("fixture addr");
    tokio::spawn(async move {
        axum::serve(listener, fixture_app()).await.expect("serve");
    });
    format!("http://{addr}")
}

fn gateway_for(base_url: String, timeout_ms: u64) -> (Gateway, SessionStore, Arc<MemoryBridge>) {
    let session = SessionStore::in_memory();
    let bridge = Arc::new(MemoryBridge::new());
    let api = ApiConfig {
        base_url,
        timeout_ms,
    };
    let gateway = Gateway::new(&api, &PathsConfig::default(), session.clone(), bridge.clone())
        .expect("gateway");
    (gateway, session, bridge)
}

#[tokio::test]
async fn success_envelope_passes_through_unchanged() {
    let base = spawn_fixture().await;
    let (gateway, _, bridge) = gateway_for(base, 5_000);

    let envelope = gateway.get::<Value>("/ok").await.unwrap();
    assert_eq!(envelope.status, 200);
    assert_eq!(envelope.message, "ok");
    assert_eq!(envelope.data, Some(json!({"value": 42})));
    assert!(bridge.events().is_empty());
}

#[tokio::test]
async fn alternate_success_sentinel_is_accepted() {
    let base = spawn_fixture().await;
    let (gateway, _, _) = gateway_for(base, 5_000);

    let envelope = gateway.get::<Value>("/ok-alt").await.unwrap();
    assert_eq!(envelope.status, 0);
    assert!(envelope.is_success());
}

#[tokio::test]
async fn bearer_token_is_attached_when_present() {
    let base = spawn_fixture().await;
    let (gateway, session, _) = gateway_for(base, 5_000);
    session.set_token("tok-abc");

    let envelope = gateway.get::<Value>("/echo-auth").await.unwrap();
    assert_eq!(
        envelope.data,
        Some(json!({"auth": "Bearer tok-abc"}))
    );
}

#[tokio::test]
async fn absent_token_does_not_block_the_request() {
    let base = spawn_fixture().await;
    let (gateway, _, _) = gateway_for(base, 5_000);

    let envelope = gateway.get::<Value>("/echo-auth").await.unwrap();
    assert_eq!(envelope.data, Some(json!({"auth": null})));
}

#[tokio::test]
async fn expired_envelope_clears_session_and_redirects() {
    let base = spawn_fixture().await;
    let (gateway, session, bridge) = gateway_for(base, 5_000);
    session.set_token("tok-abc");

    let err = gateway.get::<Value>("/expired").await.unwrap_err();
    match err {
        ConsoleError::AuthExpired { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "session expired");
        }
        other => panic!("expected AuthExpired, got {other:?}"),
    }
    assert!(!session.is_authenticated());
    assert_eq!(bridge.redirects(), vec!["/login".to_string()]);
    assert!(bridge.errors().iter().any(|m| m.contains("session expired")));
}

#[tokio::test]
async fn application_error_rejects_without_touching_session() {
    let base = spawn_fixture().await;
    let (gateway, session, bridge) = gateway_for(base, 5_000);
    session.set_token("tok-abc");

    let err = gateway.get::<Value>("/apperr").await.unwrap_err();
    assert!(matches!(err, ConsoleError::Application { status: 500, .. }));
    assert!(session.is_authenticated());
    assert!(bridge.redirects().is_empty());
    assert!(bridge.errors().iter().any(|m| m.contains("boom")));
}

#[tokio::test]
async fn transport_forbidden_clears_session_and_redirects() {
    let base = spawn_fixture().await;
    let (gateway, session, bridge) = gateway_for(base, 5_000);
    session.set_token("tok-abc");

    let err = gateway.get::<Value>("/forbidden").await.unwrap_err();
    assert!(err.is_auth_expired());
    assert!(!session.is_authenticated());
    assert_eq!(bridge.redirects(), vec!["/login".to_string()]);
}

#[tokio::test]
async fn timeout_notifies_and_rejects_without_touching_session() {
    let base = spawn_fixture().await;
    let (gateway, session, bridge) = gateway_for(base, 300);
    session.set_token("tok-abc");

    let err = gateway.get::<Value>("/slow").await.unwrap_err();
    assert_eq!(err.transport_kind(), Some(TransportKind::Timeout));
    assert!(session.is_authenticated());
    assert!(bridge.redirects().is_empty());
    assert!(bridge.errors().iter().any(|m| m.contains("timed out")));
}

#[tokio::test]
async fn unreachable_server_redirects_to_offline_page() {
    let port = portpicker::pick_unused_port().expect("free port");
    let (gateway, session, bridge) = gateway_for(format!("http://127.0.0.1:{port}"), 2_000);
    session.set_token("tok-abc");

    let err = gateway.get::<Value>("/ok").await.unwrap_err();
    assert_eq!(err.transport_kind(), Some(TransportKind::Offline));
    assert!(session.is_authenticated());
    assert_eq!(bridge.redirects(), vec!["/500".to_string()]);
}
