//! Public newsletter surface: subscription, preferences and the news feeds.

use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::api::{ApiClient, ApiError, ApiRequest, ApiResult};
use crate::forms::{validate_email, validate_min_chars};
use crate::models::{
    Listing, MatchFixture, MessageResponse, NewsArticle, Newsletter, SportCategory, Subscriber,
    SubscriberPreferences,
};
use crate::slice::{LoadStatus, Section};

const BASE: &str = "/api/newsletter";

pub const DEFAULT_NEWS_LIMIT: u32 = 10;
pub const DEFAULT_FIXTURE_DAYS: u32 = 14;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subscription {
    pub email: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<SubscriberPreferences>,
}

impl Subscription {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_string(),
            name: name.into().trim().to_string(),
            preferences: None,
        }
    }

    #[must_use]
    pub fn with_sports<I, S>(mut self, sports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preferences = Some(SubscriberPreferences {
            sports: sports.into_iter().map(Into::into).collect(),
            ..SubscriberPreferences::default()
        });
        self
    }

    /// # Errors
    /// Returns a validation error naming the first bad field.
    pub fn validate(&self) -> ApiResult<()> {
        validate_email(&self.email)?;
        validate_min_chars(&self.name, 2, "Name must be at least 2 characters long")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubscribeResponse {
    pub message: String,
    #[serde(default)]
    pub subscriber_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PreferencesPage {
    pub subscriber: Subscriber,
    #[serde(default)]
    pub available_sports: Vec<SportCategory>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct NewsFeed {
    articles: Vec<NewsArticle>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct FixtureFeed {
    fixtures: Vec<MatchFixture>,
}

/// Parses a subscriber token (the unsubscribe/preferences UUID).
///
/// # Errors
/// Returns a validation error for anything that is not a UUID.
pub fn parse_token(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::validation("Invalid subscriber token"))
}

/// Public newsletter state.
#[derive(Debug, Clone, Default)]
pub struct NewsletterSlice {
    pub subscription_status: LoadStatus,
    pub subscription_error: Option<String>,
    pub subscription_message: Option<String>,
    pub is_subscribed: bool,
    pub preferences: Section<PreferencesPage>,
    pub sport_categories: Section<Vec<SportCategory>>,
    pub latest: Section<Newsletter>,
    pub news: Section<Vec<NewsArticle>>,
    pub fixtures: Section<Vec<MatchFixture>>,
}

impl NewsletterSlice {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    /// Fails locally on invalid input, otherwise with the backend's message.
    pub async fn subscribe(
        &mut self,
        client: &ApiClient,
        subscription: &Subscription,
    ) -> ApiResult<SubscribeResponse> {
        self.begin_subscription();
        let result = match subscription.validate() {
            Ok(()) => {
                client
                    .post::<_, SubscribeResponse>(&format!("{BASE}/subscribe/"), subscription)
                    .await
            }
            Err(err) => Err(err),
        };

        match result {
            Ok(response) => {
                tracing::info!(subscriber_id = ?response.subscriber_id, "subscribed");
                self.subscription_status = LoadStatus::Succeeded;
                self.is_subscribed = true;
                self.subscription_message = Some(response.message.clone());
                Ok(response)
            }
            Err(err) => {
                let err = err.or_fallback("Failed to subscribe");
                self.fail_subscription(&err);
                self.is_subscribed = false;
                Err(err)
            }
        }
    }

    /// # Errors
    /// Fails locally on a malformed token, otherwise with the backend's message.
    pub async fn unsubscribe(&mut self, client: &ApiClient, token: &str) -> ApiResult<String> {
        self.begin_subscription();
        let result = match parse_token(token) {
            Ok(token) => {
                client
                    .post::<_, MessageResponse>(&format!("{BASE}/unsubscribe/"), &json!({ "token": token }))
                    .await
            }
            Err(err) => Err(err),
        };

        match result {
            Ok(response) => {
                self.subscription_status = LoadStatus::Succeeded;
                self.is_subscribed = false;
                self.subscription_message = Some(response.message.clone());
                Ok(response.message)
            }
            Err(err) => {
                let err = err.or_fallback("Failed to unsubscribe");
                self.fail_subscription(&err);
                Err(err)
            }
        }
    }

    /// # Errors
    /// Fails locally on a malformed token, otherwise with the backend's message.
    pub async fn fetch_preferences(
        &mut self,
        client: &ApiClient,
        token: &str,
    ) -> ApiResult<PreferencesPage> {
        self.preferences.begin();
        let result = match parse_token(token) {
            Ok(token) => client.get(&format!("{BASE}/preferences/{token}/")).await,
            Err(err) => Err(err),
        };
        let result = self.preferences.finish(result, "Failed to fetch preferences");
        if let Ok(page) = &result {
            self.sport_categories.data = Some(page.available_sports.clone());
        }
        result
    }

    /// # Errors
    /// Fails locally on a malformed token, otherwise with the backend's message.
    pub async fn update_preferences(
        &mut self,
        client: &ApiClient,
        token: &str,
        preferences: &SubscriberPreferences,
    ) -> ApiResult<String> {
        self.preferences.begin();
        let result = match parse_token(token) {
            Ok(token) => {
                client
                    .put::<_, MessageResponse>(
                        &format!("{BASE}/preferences/{token}/"),
                        &json!({ "preferences": preferences }),
                    )
                    .await
            }
            Err(err) => Err(err),
        };

        match result {
            Ok(response) => {
                self.preferences.status = LoadStatus::Succeeded;
                if let Some(page) = self.preferences.data.as_mut() {
                    page.subscriber.preferences = preferences.clone();
                }
                self.subscription_message = Some(response.message.clone());
                Ok(response.message)
            }
            Err(err) => {
                let err = err.or_fallback("Failed to update preferences");
                self.preferences.status = LoadStatus::Failed;
                self.preferences.error = Some(err.message.clone());
                Err(err)
            }
        }
    }

    /// # Errors
    /// Returns the fetch error.
    pub async fn fetch_sport_categories(
        &mut self,
        client: &ApiClient,
    ) -> ApiResult<Vec<SportCategory>> {
        self.sport_categories.begin();
        let result = client
            .get::<Listing<SportCategory>>(&format!("{BASE}/sports/"))
            .await
            .map(Listing::into_items);
        self.sport_categories.finish(result, "Failed to fetch sports")
    }

    /// # Errors
    /// Returns the fetch error.
    pub async fn fetch_latest(&mut self, client: &ApiClient) -> ApiResult<Newsletter> {
        self.latest.begin();
        let result = client.get(&format!("{BASE}/latest/")).await;
        self.latest.finish(result, "Failed to fetch newsletter")
    }

    /// # Errors
    /// Returns the fetch error.
    pub async fn fetch_news(
        &mut self,
        client: &ApiClient,
        sport: Option<&str>,
        limit: u32,
    ) -> ApiResult<Vec<NewsArticle>> {
        self.news.begin();
        let request = ApiRequest::get(format!("{BASE}/news/"))
            .query_opt("sport", sport)
            .query("limit", limit);
        let result = client
            .send::<NewsFeed>(request)
            .await
            .map(|feed| feed.articles);
        self.news.finish(result, "Failed to fetch news")
    }

    /// # Errors
    /// Returns the fetch error.
    pub async fn fetch_fixtures(
        &mut self,
        client: &ApiClient,
        sport: Option<&str>,
        days: u32,
    ) -> ApiResult<Vec<MatchFixture>> {
        self.fixtures.begin();
        let request = ApiRequest::get(format!("{BASE}/fixtures/"))
            .query_opt("sport", sport)
            .query("days", days);
        let result = client
            .send::<FixtureFeed>(request)
            .await
            .map(|feed| feed.fixtures);
        self.fixtures.finish(result, "Failed to fetch fixtures")
    }

    pub fn clear_subscription_message(&mut self) {
        self.subscription_message = None;
        self.subscription_error = None;
    }

    pub fn clear_preferences_error(&mut self) {
        self.preferences.clear_error();
    }

    pub fn reset_subscription_status(&mut self) {
        self.subscription_status = LoadStatus::Idle;
        self.is_subscribed = false;
        self.subscription_message = None;
        self.subscription_error = None;
    }

    fn begin_subscription(&mut self) {
        self.subscription_status = LoadStatus::Loading;
        self.subscription_error = None;
    }

    fn fail_subscription(&mut self, err: &ApiError) {
        self.subscription_status = LoadStatus::Failed;
        self.subscription_error = Some(err.message.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiErrorKind;

    #[test]
    fn test_subscription_validation() {
        assert!(Subscription::new("fan@example.com", "Al").validate().is_ok());

        let err = Subscription::new("not-an-email", "Alex").validate().unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Validation);
        assert_eq!(err.message, "Invalid email format");

        let err = Subscription::new("fan@example.com", " A ").validate().unwrap_err();
        assert_eq!(err.message, "Name must be at least 2 characters long");
    }

    #[test]
    fn test_subscription_body_omits_missing_preferences() {
        let body = serde_json::to_value(Subscription::new("fan@example.com", "Alex")).unwrap();
        assert_eq!(body, json!({"email": "fan@example.com", "name": "Alex"}));

        let body = serde_json::to_value(
            Subscription::new("fan@example.com", "Alex").with_sports(["rugby", "golf"]),
        )
        .unwrap();
        assert_eq!(body["preferences"]["sports"], json!(["rugby", "golf"]));
    }

    #[test]
    fn test_parse_token() {
        assert!(parse_token(" 6f1c2a7e-1f0b-4c55-9a57-5d1a0d3f9a10 ").is_ok());
        assert_eq!(
            parse_token("abc").unwrap_err().kind,
            ApiErrorKind::Validation
        );
    }

    #[test]
    fn test_reset_subscription_status() {
        let mut slice = NewsletterSlice::new();
        slice.subscription_status = LoadStatus::Succeeded;
        slice.is_subscribed = true;
        slice.subscription_message = Some("Successfully subscribed to newsletter!".into());

        slice.reset_subscription_status();
        assert_eq!(slice.subscription_status, LoadStatus::Idle);
        assert!(!slice.is_subscribed);
        assert!(slice.subscription_message.is_none());
    }
}
