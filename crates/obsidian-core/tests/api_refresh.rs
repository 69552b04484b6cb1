mod support;

use obsidian_core::api::ApiErrorKind;
use obsidian_core::router::Navigation;
use serde_json::{Value, json};
use support::{harness, signed_in};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

const OVERVIEW: &str = "/api/newsletter/admin/dashboard/overview/";
const REFRESH: &str = "/api/token/refresh/";

#[tokio::test]
async fn test_request_without_token_has_no_authorization_header() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/api/newsletter/latest/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&h.server)
        .await;

    let body: Value = h.client.get("/api/newsletter/latest/").await.unwrap();
    assert_eq!(body["ok"], true);

    let requests = h.server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_stored_token_is_attached_as_bearer() {
    let h = signed_in("access-1", "refresh-1").await;
    Mock::given(method("GET"))
        .and(path(OVERVIEW))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"overview": {}})))
        .expect(1)
        .mount(&h.server)
        .await;

    let _: Value = h.client.get(OVERVIEW).await.unwrap();
}

#[tokio::test]
async fn test_single_401_refreshes_once_and_retries_with_new_token() {
    let h = signed_in("stale", "refresh-1").await;
    Mock::given(method("GET"))
        .and(path(OVERVIEW))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Token expired"})))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .and(body_json(json!({"refresh": "refresh-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "fresh"})))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path(OVERVIEW))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"overview": {"total_subscribers": 7}})))
        .expect(1)
        .mount(&h.server)
        .await;

    let body: Value = h.client.get(OVERVIEW).await.unwrap();
    assert_eq!(body["overview"]["total_subscribers"], 7);
    assert_eq!(h.access_token().as_deref(), Some("fresh"));
    assert_eq!(h.refresh_token().as_deref(), Some("refresh-1"));
    assert!(h.history.entries().is_empty());
}

#[tokio::test]
async fn test_second_401_propagates_without_another_refresh() {
    let h = signed_in("stale", "refresh-1").await;
    Mock::given(method("GET"))
        .and(path(OVERVIEW))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Nope"})))
        .expect(2)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "fresh"})))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h.client.get::<Value>(OVERVIEW).await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Unauthorized);
    assert_eq!(err.status, Some(401));
    assert_eq!(err.message, "Nope");
    assert!(h.history.entries().is_empty());
}

#[tokio::test]
async fn test_failed_refresh_clears_tokens_and_hard_redirects_to_login() {
    let h = signed_in("stale", "revoked").await;
    Mock::given(method("GET"))
        .and(path(OVERVIEW))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Token is blacklisted"})),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h.client.get::<Value>(OVERVIEW).await.unwrap_err();
    assert_eq!(err.message, "Token is blacklisted");
    assert!(h.access_token().is_none());
    assert!(h.refresh_token().is_none());
    assert!(!h.client.session().is_authenticated());
    assert_eq!(
        h.history.entries(),
        vec![Navigation::Hard {
            to: "/admin/login".to_string()
        }]
    );
}

#[tokio::test]
async fn test_401_without_refresh_token_redirects_without_refresh_call() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path(OVERVIEW))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "x"})))
        .expect(0)
        .mount(&h.server)
        .await;

    let err = h.client.get::<Value>(OVERVIEW).await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Unauthenticated);
    assert_eq!(h.history.current().as_deref(), Some("/admin/login"));
}

#[tokio::test]
async fn test_non_401_errors_pass_through_untouched() {
    let h = signed_in("access-1", "refresh-1").await;
    Mock::given(method("GET"))
        .and(path(OVERVIEW))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h.client.get::<Value>(OVERVIEW).await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Http);
    assert_eq!(err.status, Some(500));
    assert_eq!(err.details.as_deref(), Some("boom"));
    assert_eq!(h.access_token().as_deref(), Some("access-1"));
}
