//! End-to-end checks of the interceptor pipeline against a mock backend.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tracegate_core::auth::{Credential, CredentialStore, MemoryStore};
use tracegate_core::nav::{HistoryNavigator, Navigator};
use tracegate_core::{ApiError, Config, Gate, Surface};
use wiremock::matchers::{header, method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

struct NoAuthorization;

impl Match for NoAuthorization {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key("authorization")
    }
}

fn config(origin: &str) -> Config {
    Config {
        origin: origin.to_string(),
        ..Config::default()
    }
}

fn gate(origin: &str, token: Option<&str>, start: &str) -> (Gate, Arc<MemoryStore>, Arc<HistoryNavigator>) {
    let store = Arc::new(match token {
        Some(t) => MemoryStore::with_credential(Credential::new(t)),
        None => MemoryStore::new(),
    });
    let navigator = Arc::new(HistoryNavigator::new(start));
    let gate = Gate::with_parts(Surface::admin(), &config(origin), store.clone(), navigator.clone())
        .unwrap();
    (gate, store, navigator)
}

#[tokio::test]
async fn test_stored_credential_is_sent_as_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/batches"))
        .and(header("authorization", "Bearer T-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .expect(1)
        .mount(&server)
        .await;

    let (gate, _, _) = gate(&server.uri(), Some("T-123"), "/batches");
    let batches: Vec<Value> = gate.http().get("/batches").await.unwrap();
    assert_eq!(batches.len(), 1);
}

#[tokio::test]
async fn test_empty_store_sends_no_authorization() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/trace/B-1"))
        .and(NoAuthorization)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"batch": "B-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let (gate, _, _) = gate(&server.uri(), None, "/trace/B-1");
    let body: Value = gate.http().get("/trace/B-1").await.unwrap();
    assert_eq!(body["batch"], "B-1");
}

#[tokio::test]
async fn test_credential_change_applies_to_next_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/batches"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 7})))
        .expect(1)
        .mount(&server)
        .await;

    let (gate, store, _) = gate(&server.uri(), Some("stale"), "/batches");
    store.set(Credential::new("fresh"));
    let created: Value = gate.http().post("/batches", &json!({"name": "Tea"})).await.unwrap();
    assert_eq!(created["id"], 7);
}

#[tokio::test]
async fn test_unauthorized_clears_store_redirects_and_reaches_caller() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/batches"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "expired"})))
        .mount(&server)
        .await;

    let (gate, store, navigator) = gate(&server.uri(), Some("T"), "/batches");
    let result: Result<Value, ApiError> = gate.http().get("/batches").await;

    let err = result.unwrap_err();
    assert!(err.is_unauthorized());
    assert!(store.get().is_none());
    assert_eq!(navigator.visits(), vec!["/login".to_string()]);
    assert!(!gate.is_authenticated());
}

#[tokio::test]
async fn test_unauthorized_on_login_page_does_not_navigate() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let (gate, store, navigator) = gate(&server.uri(), Some("T"), "/login?redirect=/batches");
    let err = gate.http().delete("/me").await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized));
    assert!(store.get().is_none());
    assert!(navigator.visits().is_empty());
}

#[tokio::test]
async fn test_concurrent_unauthorized_navigates_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(20)))
        .expect(4)
        .mount(&server)
        .await;

    let (gate, store, navigator) = gate(&server.uri(), Some("T"), "/batches");
    let http = gate.http().clone();
    let calls = ["/batches", "/batches/1", "/batches/2", "/stats"]
        .into_iter()
        .map(|p| {
            let http = http.clone();
            async move { http.get::<Value>(p).await }
        });

    let results = futures::future::join_all(calls).await;

    assert!(results.iter().all(|r| matches!(r, Err(ApiError::Unauthorized))));
    assert!(store.get().is_none());
    assert_eq!(navigator.visits(), vec!["/login".to_string()]);
}

#[tokio::test]
async fn test_other_rejections_pass_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/batches/9"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such batch"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/batches"))
        .respond_with(ResponseTemplate::new(500).set_body_string("db down"))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/batches/1"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let (gate, store, navigator) = gate(&server.uri(), Some("T"), "/batches");

    let not_found = gate.http().get::<Value>("/batches/9").await.unwrap_err();
    assert!(matches!(not_found, ApiError::NotFound(ref body) if body == "no such batch"));

    let server_error = gate.http().get::<Value>("/batches").await.unwrap_err();
    assert_eq!(server_error.status().map(|s| s.as_u16()), Some(500));

    let denied = gate.http().put::<Value, _>("/batches/1", &json!({})).await.unwrap_err();
    assert!(matches!(denied, ApiError::AccessDenied(_)));

    assert_eq!(store.get(), Some(Credential::new("T")));
    assert!(navigator.visits().is_empty());
}

#[tokio::test]
async fn test_timeout_is_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::with_credential(Credential::new("T")));
    let navigator = Arc::new(HistoryNavigator::new("/batches"));
    let config = Config {
        origin: server.uri(),
        timeout_ms: 50,
        ..Config::default()
    };
    let gate = Gate::with_parts(Surface::admin(), &config, store.clone(), navigator.clone()).unwrap();

    let err = gate.http().get::<Value>("/batches").await.unwrap_err();
    assert!(err.is_timeout());
    assert!(err.is_transport());
    assert_eq!(err.status(), None);
    assert!(store.get().is_some());
    assert!(navigator.visits().is_empty());
}

#[tokio::test]
async fn test_unreachable_host_is_transport_failure() {
    // Bind and drop a listener to get a port nothing is listening on.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let (gate, store, navigator) = gate(&format!("http://127.0.0.1:{}", port), Some("T"), "/batches");
    let err = gate.http().get::<Value>("/batches").await.unwrap_err();

    assert!(err.is_transport());
    assert!(!err.is_unauthorized());
    assert!(store.get().is_some());
    assert_eq!(navigator.current_path(), "/batches");
}

#[tokio::test]
async fn test_invalid_json_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/batches"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let (gate, store, _) = gate(&server.uri(), Some("T"), "/batches");
    let err = gate.http().get::<Value>("/batches").await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidResponse(_)));
    assert!(store.get().is_some());
}

#[tokio::test]
async fn test_expired_session_then_guard_sends_to_login() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/batches"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let (gate, _, navigator) = gate(&server.uri(), Some("T"), "/login");
    gate.router().push("/batches").unwrap();
    assert_eq!(navigator.current_path(), "/batches");

    let _ = gate.http().get::<Value>("/batches").await;
    assert_eq!(navigator.current_path(), "/login");

    let nav = gate.router().push("/batches").unwrap();
    assert_eq!(nav.route().full_path, "/login?redirect=/batches");
}
