mod support;

use obsidian_core::api::ApiErrorKind;
use obsidian_core::forms::{CallbackForm, ContactForm, ContactMethod};
use obsidian_core::newsletter::{DEFAULT_NEWS_LIMIT, NewsletterSlice, Subscription};
use obsidian_core::slice::LoadStatus;
use serde_json::json;
use support::harness;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_subscribe_success_updates_slice() {
    let h = harness().await;
    Mock::given(method("POST"))
        .and(path("/api/newsletter/subscribe/"))
        .and(body_json(json!({
            "email": "fan@example.com",
            "name": "Alex",
            "preferences": {"sports": ["rugby"]}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "message": "Successfully subscribed to newsletter!",
            "subscriber_id": "6f1c2a7e-1f0b-4c55-9a57-5d1a0d3f9a10"
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let mut slice = NewsletterSlice::new();
    let subscription = Subscription::new(" fan@example.com ", "Alex").with_sports(["rugby"]);
    slice.subscribe(&h.client, &subscription).await.unwrap();

    assert_eq!(slice.subscription_status, LoadStatus::Succeeded);
    assert!(slice.is_subscribed);
    assert_eq!(
        slice.subscription_message.as_deref(),
        Some("Successfully subscribed to newsletter!")
    );
}

#[tokio::test]
async fn test_subscribe_conflict_keeps_server_message() {
    let h = harness().await;
    Mock::given(method("POST"))
        .and(path("/api/newsletter/subscribe/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "email": ["subscriber with this email already exists."]
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let mut slice = NewsletterSlice::new();
    let err = slice
        .subscribe(&h.client, &Subscription::new("fan@example.com", "Alex"))
        .await
        .unwrap_err();

    assert_eq!(err.status, Some(400));
    assert_eq!(slice.subscription_status, LoadStatus::Failed);
    assert!(!slice.is_subscribed);
    assert_eq!(slice.subscription_error.as_deref(), Some(err.message.as_str()));
}

#[tokio::test]
async fn test_invalid_subscription_never_reaches_backend() {
    let h = harness().await;
    let mut slice = NewsletterSlice::new();

    let err = slice
        .subscribe(&h.client, &Subscription::new("nope", "Alex"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Validation);
    assert_eq!(slice.subscription_error.as_deref(), Some("Invalid email format"));
    assert!(h.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_news_feed_passes_sport_and_limit() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/api/newsletter/news/"))
        .and(query_param("sport", "golf"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "articles": [{
                "id": "0b9a4f4e-2d35-4a8e-8a0f-7c4f3a1b2c3d",
                "title": "Ryder Cup hospitality",
                "sport_category": {"name": "golf", "display_name": "Golf"}
            }],
            "total": 1,
            "sport_filter": "golf"
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let mut slice = NewsletterSlice::new();
    let articles = slice
        .fetch_news(&h.client, Some("golf"), DEFAULT_NEWS_LIMIT)
        .await
        .unwrap();
    assert_eq!(articles[0].sport_name(), "Golf");
    assert_eq!(slice.news.data.as_ref().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_contact_form_submits_and_reads_receipt() {
    let h = harness().await;
    Mock::given(method("POST"))
        .and(path("/api/newsletter/contact/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "message": "Thank you for your enquiry!",
            "contact_id": "6f1c2a7e-1f0b-4c55-9a57-5d1a0d3f9a10",
            "status": "success"
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let form = ContactForm {
        name: "Jordan".into(),
        email: "jordan@example.com".into(),
        phone: "07700900000".into(),
        event: "Wimbledon final".into(),
        guests: Some(2),
        message: "Centre court debenture seats".into(),
        contact_method: ContactMethod::Phone,
    };
    let receipt = form.submit(&h.client).await.unwrap();
    assert_eq!(receipt.message, "Thank you for your enquiry!");
    assert!(receipt.id.is_some());
}

#[tokio::test]
async fn test_form_failure_without_server_message_uses_fallback() {
    let h = harness().await;
    Mock::given(method("POST"))
        .and(path("/api/newsletter/callback/"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&h.server)
        .await;

    let form = CallbackForm {
        phone: "+44 20 7946 0000".into(),
        name: "Jordan".into(),
        preferred_time: None,
    };
    let err = form.submit(&h.client).await.unwrap_err();
    assert_eq!(err.message, "Failed to submit. Please try again.");
}
