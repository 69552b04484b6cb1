mod support;

use std::fs;
use std::sync::Arc;

use obsidian_core::api::{ApiClient, ApiErrorKind};
use obsidian_core::auth::{LogoutOutcome, Session, SessionStatus, SessionStore};
use obsidian_core::guard::{GuardOutcome, RouteGuard};
use obsidian_core::router::{AdminRoute, History};
use obsidian_core::storage::{
    ACCESS_TOKEN_KEY, FileStorage, MemoryStorage, REFRESH_TOKEN_KEY, Storage,
};
use serde_json::{Value, json};
use support::{harness, harness_with, signed_in};
use tempfile::tempdir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LOGIN: &str = "/api/newsletter/admin/login/";
const LOGOUT: &str = "/api/newsletter/admin/logout/";
const PROFILE: &str = "/api/newsletter/admin/profile/";
const REFRESH: &str = "/api/token/refresh/";

#[tokio::test]
async fn test_login_persists_tokens_and_sets_header() {
    let h = harness().await;
    Mock::given(method("POST"))
        .and(path(LOGIN))
        .and(body_json(json!({"username": "admin", "password": "secret1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "A1",
            "refresh": "R1",
            "user": {"id": 1, "username": "admin", "email": "admin@obsidian.com"}
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let user = h.client.auth().login("admin", "secret1").await.unwrap();
    assert_eq!(user.username, "admin");

    let session = h.client.session();
    assert!(session.is_authenticated());
    assert_eq!(session.status(), SessionStatus::Authenticated);
    assert_eq!(session.authorization_header().as_deref(), Some("Bearer A1"));
    assert_eq!(h.access_token().as_deref(), Some("A1"));
    assert_eq!(h.refresh_token().as_deref(), Some("R1"));
}

#[tokio::test]
async fn test_login_with_blank_credentials_sends_nothing() {
    let h = harness().await;

    let err = h.client.auth().login("  ", "secret1").await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Validation);
    assert_eq!(err.message, "Username and password required");
    assert_eq!(h.client.session().status(), SessionStatus::Failed);
    assert!(h.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_login_rejected_reports_server_message() {
    let h = harness().await;
    Mock::given(method("POST"))
        .and(path(LOGIN))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid credentials"})),
        )
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.server)
        .await;

    let err = h.client.auth().login("admin", "wrong").await.unwrap_err();
    assert_eq!(err.message, "Invalid credentials");

    let session = h.client.session();
    assert!(!session.is_authenticated());
    assert_eq!(session.error().as_deref(), Some("Invalid credentials"));
    assert!(h.access_token().is_none());
    assert!(h.history.entries().is_empty());
}

#[tokio::test]
async fn test_logout_clears_tokens_even_when_server_fails() {
    let h = signed_in("A1", "R1").await;
    Mock::given(method("POST"))
        .and(path(LOGOUT))
        .and(body_json(json!({"refresh_token": "R1"})))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&h.server)
        .await;

    let outcome = h.client.auth().logout().await;
    assert_eq!(outcome, LogoutOutcome::LocalOnly);
    assert!(h.access_token().is_none());
    assert!(h.refresh_token().is_none());
    assert!(!h.client.session().is_authenticated());
    assert!(h.client.session().user().is_none());
}

#[tokio::test]
async fn test_logout_acknowledged() {
    let h = signed_in("A1", "R1").await;
    Mock::given(method("POST"))
        .and(path(LOGOUT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Logged out"})))
        .expect(1)
        .mount(&h.server)
        .await;

    assert_eq!(h.client.auth().logout().await, LogoutOutcome::Acknowledged);
    assert!(h.access_token().is_none());
}

#[tokio::test]
async fn test_initialize_restores_without_network() {
    let h = signed_in("A1", "R1").await;
    let session = h.client.session();
    assert_eq!(session.status(), SessionStatus::Authenticated);
    assert_eq!(session.authorization_header().as_deref(), Some("Bearer A1"));
    assert!(h.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_initialize_with_partial_pair_stays_signed_out() {
    let h = harness_with(MemoryStorage::with_entries([(ACCESS_TOKEN_KEY, "A1")])).await;

    assert!(!h.client.auth().initialize());
    assert!(!h.client.session().is_authenticated());
    assert!(h.access_token().is_none());
    assert!(h.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_refresh_without_refresh_token_makes_no_request() {
    let h = harness().await;

    let err = h.client.auth().refresh_token().await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Unauthenticated);
    assert!(h.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_fetch_profile_updates_user() {
    let h = signed_in("A1", "R1").await;
    Mock::given(method("GET"))
        .and(path(PROFILE))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {"id": 3, "username": "editor", "first_name": "Ada", "role": "staff"}
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let user = h.client.auth().fetch_profile().await.unwrap();
    assert_eq!(user.first_name.as_deref(), Some("Ada"));
    assert_eq!(
        h.client.session().user().map(|u| u.username),
        Some("editor".to_string())
    );
}

#[tokio::test]
async fn test_fetch_profile_when_signed_out_is_local_error() {
    let h = harness().await;
    let err = h.client.auth().fetch_profile().await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Unauthenticated);
    assert!(h.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_login_whose_tokens_cannot_be_saved_holds_no_session() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, "").unwrap();
    let storage: Arc<dyn Storage> = Arc::new(FileStorage::open(blocker.join("storage.json")).unwrap());

    let server = MockServer::start().await;
    let session = Arc::new(SessionStore::new(Arc::clone(&storage)));
    let client = ApiClient::new(&server.uri(), session, Arc::new(History::new())).unwrap();
    Mock::given(method("POST"))
        .and(path(LOGIN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "A1",
            "refresh": "R1",
            "user": {"id": 1, "username": "admin"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/newsletter/latest/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let err = client.auth().login("admin", "secret1").await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Storage);
    assert_eq!(client.session().status(), SessionStatus::Failed);
    assert!(storage.get(ACCESS_TOKEN_KEY).is_none());
    assert!(storage.get(REFRESH_TOKEN_KEY).is_none());

    let _: Value = client.get("/api/newsletter/latest/").await.unwrap();
    let requests = server.received_requests().await.unwrap();
    let follow_up = requests.last().unwrap();
    assert!(follow_up.headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_failed_login_keeps_restored_session() {
    let h = signed_in("A1", "R1").await;
    Mock::given(method("POST"))
        .and(path(LOGIN))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid credentials"})),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h.client.auth().login("admin", "wrong").await.unwrap_err();
    assert_eq!(err.message, "Invalid credentials");

    let session = h.client.session();
    assert_eq!(session.status(), SessionStatus::Authenticated);
    assert_eq!(session.authorization_header().as_deref(), Some("Bearer A1"));
    assert_eq!(h.access_token().as_deref(), Some("A1"));
    assert_eq!(h.refresh_token().as_deref(), Some("R1"));
}

#[tokio::test]
async fn test_logout_twice_is_harmless() {
    let h = signed_in("A1", "R1").await;
    Mock::given(method("POST"))
        .and(path(LOGOUT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Logged out"})))
        .expect(1)
        .mount(&h.server)
        .await;

    assert_eq!(h.client.auth().logout().await, LogoutOutcome::Acknowledged);
    assert_eq!(h.client.auth().logout().await, LogoutOutcome::LocalOnly);
    assert_eq!(h.client.session().status(), SessionStatus::Idle);
    assert_eq!(h.server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_profile_server_error_keeps_session() {
    let h = signed_in("A1", "R1").await;
    Mock::given(method("GET"))
        .and(path(PROFILE))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h.client.auth().fetch_profile().await.unwrap_err();
    assert_eq!(err.status, Some(500));

    let session = h.client.session();
    assert!(session.is_authenticated());
    assert_eq!(session.status(), SessionStatus::Authenticated);
    assert!(session.error().is_some());
    assert_eq!(h.access_token().as_deref(), Some("A1"));
    assert!(h.history.entries().is_empty());
}

#[tokio::test]
async fn test_guard_restores_session_loads_profile_and_renders() {
    let h = harness_with(MemoryStorage::with_entries([
        (ACCESS_TOKEN_KEY, "A1"),
        (REFRESH_TOKEN_KEY, "R1"),
    ]))
    .await;
    Mock::given(method("GET"))
        .and(path(PROFILE))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {"id": 1, "username": "admin", "role": "superuser"}
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let guard = RouteGuard::new(Arc::new(h.client));
    let outcome = guard
        .guard(
            &|session: &Session| session.user.as_ref().map(|u| u.username.clone()),
            &AdminRoute::Dashboard.location(),
        )
        .await;

    assert_eq!(outcome, GuardOutcome::Render(Some("admin".to_string())));
    assert_eq!(h.server.received_requests().await.unwrap().len(), 1);
    assert!(h.history.entries().is_empty());
}
