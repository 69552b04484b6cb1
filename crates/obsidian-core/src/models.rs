//! Backend resource types shared by the public and admin surfaces.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SportCategory {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub sport_category: Option<SportCategory>,
    #[serde(default)]
    pub article_type: Option<String>,
    #[serde(default)]
    pub source_name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub publish_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_premium: bool,
}

impl NewsArticle {
    pub fn sport_name(&self) -> &str {
        self.sport_category
            .as_ref()
            .map_or("", |sport| sport.display_name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchFixture {
    pub id: Uuid,
    #[serde(default)]
    pub sport_category: Option<SportCategory>,
    pub home_team: String,
    pub away_team: String,
    pub match_date: DateTime<Utc>,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub league_competition: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub home_score: Option<i32>,
    #[serde(default)]
    pub away_score: Option<i32>,
}

impl MatchFixture {
    /// `"Home 2-1 Away"` once scored, `"Home vs Away"` before.
    pub fn headline(&self) -> String {
        match (self.home_score, self.away_score) {
            (Some(home), Some(away)) => {
                format!("{} {home}-{away} {}", self.home_team, self.away_team)
            }
            _ => format!("{} vs {}", self.home_team, self.away_team),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsletterStatus {
    Draft,
    Scheduled,
    Sending,
    Sent,
    Failed,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for NewsletterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NewsletterStatus::Draft => "draft",
            NewsletterStatus::Scheduled => "scheduled",
            NewsletterStatus::Sending => "sending",
            NewsletterStatus::Sent => "sent",
            NewsletterStatus::Failed => "failed",
            NewsletterStatus::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Newsletter {
    pub id: Uuid,
    pub title: String,
    pub edition_date: NaiveDate,
    pub status: NewsletterStatus,
    #[serde(default)]
    pub featured_article: Option<NewsArticle>,
    #[serde(default)]
    pub articles: Vec<NewsArticle>,
    #[serde(default)]
    pub fixtures: Vec<MatchFixture>,
    #[serde(default)]
    pub sent_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_subscribers: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriberStatus {
    Active,
    Inactive,
    Unsubscribed,
}

impl SubscriberStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SubscriberStatus::Active => "active",
            SubscriberStatus::Inactive => "inactive",
            SubscriberStatus::Unsubscribed => "unsubscribed",
        }
    }
}

impl fmt::Display for SubscriberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sports and delivery preferences of a subscriber.
///
/// Unknown keys are kept so a read-modify-write never drops them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriberPreferences {
    #[serde(default)]
    pub sports: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub premium_content: Option<bool>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub subscription_date: Option<DateTime<Utc>>,
    pub status: SubscriberStatus,
    #[serde(default)]
    pub preferences: SubscriberPreferences,
}

/// Generic `{message}` acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

/// A list endpoint's response: a paginated page or a bare array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Page {
        count: u64,
        #[serde(default)]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
        results: Vec<T>,
    },
    Items(Vec<T>),
}

impl<T> Listing<T> {
    /// Backend page size for paginated admin lists.
    pub const PAGE_SIZE: u64 = 20;

    pub fn items(&self) -> &[T] {
        match self {
            Listing::Page { results, .. } => results,
            Listing::Items(items) => items,
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            Listing::Page { results, .. } => results,
            Listing::Items(items) => items,
        }
    }

    /// Total across all pages; a bare array is its own total.
    pub fn total(&self) -> u64 {
        match self {
            Listing::Page { count, .. } => *count,
            Listing::Items(items) => items.len() as u64,
        }
    }

    pub fn total_pages(&self) -> u64 {
        self.total().div_ceil(Self::PAGE_SIZE).max(1)
    }
}

fn default_true() -> bool {
    true
}
