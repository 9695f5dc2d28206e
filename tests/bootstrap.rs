//! End-to-end session bootstrap: login over the gateway, menu fetch through
//! the guard, dynamic routes materialized, original target re-dispatched.

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use opsconsole::api::{self, HttpMenuSource};
use opsconsole::bridge::MemoryBridge;
use opsconsole::config::{ApiConfig, PathsConfig};
use opsconsole::gateway::Gateway;
use opsconsole::menu::MenuState;
use opsconsole::router::guard::{Navigator, RouteGuardDecision};
use opsconsole::router::{RouteTable, View, ViewRegistry};
use opsconsole::session::SessionStore;

const VALID_TOKEN: &str = "tok-e2e";

fn fixture_app() -> Router {
    Router::new()
        .route(
            "/management/login",
            post(|Json(body): Json<Value>| async move {
                if body["username"] == "admin" && body["password"] == "secret" {
                    Json(json!({
                        "status": 200,
                        "message": "ok",
                        "data": {
                            "token": VALID_TOKEN,
                            "userInfo": {
                                "id": "1",
                                "username": "admin",
                                "fullname": "Administrator",
                                "avatar": ""
                            }
                        }
                    }))
                } else {
                    Json(json!({"status": 500, "message": "bad credentials"}))
                }
            }),
        )
        .route(
            "/management/menus",
            get(|headers: HeaderMap| async move {
                let authorized = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .is_some_and(|v| v == format!("Bearer {VALID_TOKEN}"));
                if authorized {
                    Json(json!({
                        "status": 200,
                        "message": "ok",
                        "data": [
                            {
                                "path": "/home/index",
                                "name": "home",
                                "component": "/home/index",
                                "meta": {"title": "Home", "isAffix": true}
                            },
                            {
                                "path": "/system",
                                "name": "system",
                                "redirect": "/system/users",
                                "meta": {"title": "System"},
                                "children": [
                                    {
                                        "path": "/system/users",
                                        "name": "users",
                                        "component": "/system/users",
                                        "meta": {"title": "Users", "isKeepAlive": true}
                                    }
                                ]
                            }
                        ]
                    }))
                } else {
                    Json(json!({"status": 401, "message": "token invalid"}))
                }
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

struct Blank;

impl View for Blank {
    fn render(&self) -> String {
        String::new()
    }
}

fn console(base_url: String) -> (Navigator, Arc<Gateway>, Arc<MemoryBridge>) {
    let paths = PathsConfig::default();
    let session = SessionStore::in_memory();
    let bridge = Arc::new(MemoryBridge::new());
    let api_cfg = ApiConfig {
        base_url,
        timeout_ms: 5_000,
    };
    let gateway = Arc::new(
        Gateway::new(&api_cfg, &paths, session.clone(), bridge.clone()).expect("gateway"),
    );
    let mut views = ViewRegistry::new();
    views.set_fallback(|| Box::new(Blank));
    let navigator = Navigator::new(
        session,
        MenuState::new(),
        RouteTable::with_baseline(&paths),
        views,
        Arc::new(HttpMenuSource::new(gateway.clone())),
        bridge.clone(),
        paths,
    );
    (navigator, gateway, bridge)
}

#[tokio::test]
async fn login_then_navigate_bootstraps_dynamic_routes() {
    let base = spawn_fixture().await;
    let (navigator, gateway, _) = console(base);

    let reply = api::login(&gateway, "admin", "secret").await.unwrap();
    assert_eq!(reply.user_info.username, "admin");
    navigator.session().set_token(reply.token);
    navigator.session().set_user(reply.user_info);

    let outcome = navigator.navigate("/system/users").await.unwrap();
    assert_eq!(outcome.decision, RouteGuardDecision::DeferThenRetry);
    assert_eq!(outcome.path, "/system/users");
    assert_eq!(outcome.route.name, "users");
    assert!(outcome.route.meta.is_keep_alive);
    assert!(!navigator.routes().dynamic_is_empty());

    // Breadcrumbs derive from the same fetched tree
    let crumbs = navigator.menu().breadcrumbs();
    let chain: Vec<_> = crumbs["/system/users"]
        .iter()
        .map(|c| c.title.clone())
        .collect();
    assert_eq!(chain, vec!["System", "Users"]);
}

#[tokio::test]
async fn bad_credentials_surface_as_application_error() {
    let base = spawn_fixture().await;
    let (_, gateway, bridge) = console(base);

    let err = api::login(&gateway, "admin", "wrong").await.unwrap_err();
    assert!(matches!(
        err,
        opsconsole::error::ConsoleError::Application { status: 500, .. }
    ));
    assert!(bridge.errors().iter().any(|m| m.contains("bad credentials")));
}

#[tokio::test]
async fn stale_token_menu_fetch_invalidates_session() {
    let base = spawn_fixture().await;
    let (navigator, _, bridge) = console(base);
    navigator.session().set_token("stale");

    let err = navigator.navigate("/system/users").await.unwrap_err();
    assert!(err.is_auth_expired());
    assert!(!navigator.session().is_authenticated());
    // Gateway and guard both redirect to login; double notification accepted
    assert!(bridge.redirects().iter().all(|p| p == "/login"));
    assert!(!bridge.redirects().is_empty());
    assert_eq!(navigator.current(), "/login");
}
