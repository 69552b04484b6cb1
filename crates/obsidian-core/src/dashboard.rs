//! Admin dashboard analytics.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{ApiClient, ApiErrorKind, ApiRequest, ApiResult};
use crate::slice::Section;

const BASE: &str = "/api/newsletter/admin";

/// Default window for subscriber analytics, in days.
pub const DEFAULT_ANALYTICS_DAYS: u32 = 30;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverviewStats {
    pub total_subscribers: u64,
    pub active_subscribers: u64,
    pub total_newsletters: u64,
    pub sent_newsletters: u64,
    pub recent_subscriptions: u64,
    pub recent_newsletters: u64,
    pub open_rate: f64,
    pub growth_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuickStats {
    pub total_articles: u64,
    pub total_fixtures: u64,
    pub active_sports: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub overview: OverviewStats,
    #[serde(default)]
    pub quick_stats: QuickStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyGrowth {
    pub date: NaiveDate,
    #[serde(default)]
    pub total_subscribers: u64,
    #[serde(default)]
    pub new_subscriptions: u64,
    #[serde(default)]
    pub active_subscribers: u64,
    #[serde(default)]
    pub growth_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriberAnalytics {
    pub daily_growth: Vec<DailyGrowth>,
    pub sport_preferences: BTreeMap<String, u64>,
    pub subscription_sources: BTreeMap<String, u64>,
    pub total_active: u64,
    pub total_unsubscribed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignStats {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub edition_date: Option<NaiveDate>,
    #[serde(default)]
    pub sent_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_sent: u64,
    #[serde(default)]
    pub total_opened: u64,
    #[serde(default)]
    pub total_clicked: u64,
    #[serde(default)]
    pub open_rate: f64,
    #[serde(default)]
    pub click_rate: f64,
    #[serde(default)]
    pub delivery_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverallMetrics {
    pub total_campaigns: u64,
    pub total_sent: u64,
    pub total_opened: u64,
    pub total_clicked: u64,
    pub avg_open_rate: f64,
    pub avg_click_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsletterAnalytics {
    pub recent_campaigns: Vec<CampaignStats>,
    pub overall_metrics: OverallMetrics,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SportContent {
    pub total_articles: u64,
    pub recent_articles: u64,
    pub icon: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureStats {
    pub total_fixtures: u64,
    pub upcoming_fixtures: u64,
    pub this_week: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentAnalytics {
    pub sport_content: BTreeMap<String, SportContent>,
    pub fixture_stats: FixtureStats,
}

/// One point of the subscriber growth chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GrowthPoint {
    pub date: NaiveDate,
    pub total: u64,
    pub new: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignRates {
    pub title: String,
    pub open_rate: f64,
    pub click_rate: f64,
}

/// Dashboard state: four independently loaded sections.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardSlice {
    pub overview: Section<Overview>,
    pub subscribers: Section<SubscriberAnalytics>,
    pub newsletters: Section<NewsletterAnalytics>,
    pub content: Section<ContentAnalytics>,
    /// Last failure across all sections.
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl DashboardSlice {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    /// Returns the fetch error; the previous payload is kept.
    pub async fn fetch_overview(&mut self, client: &ApiClient) -> ApiResult<Overview> {
        self.overview.begin();
        let result = client.get(&format!("{BASE}/dashboard/overview/")).await;
        let result = self.overview.finish(result, "Failed to fetch overview");
        match &result {
            Ok(_) => self.last_updated = Some(Utc::now()),
            Err(err) => self.error = Some(err.message.clone()),
        }
        result
    }

    /// # Errors
    /// Returns the fetch error; the previous payload is kept.
    pub async fn fetch_subscriber_analytics(
        &mut self,
        client: &ApiClient,
        days: u32,
    ) -> ApiResult<SubscriberAnalytics> {
        self.subscribers.begin();
        let request = ApiRequest::get(format!("{BASE}/subscriber-analytics/")).query("days", days);
        let result = client.send(request).await;
        let result = self
            .subscribers
            .finish(result, "Failed to fetch subscriber analytics");
        self.note_error(&result);
        result
    }

    /// # Errors
    /// Returns the fetch error; the previous payload is kept.
    pub async fn fetch_newsletter_analytics(
        &mut self,
        client: &ApiClient,
    ) -> ApiResult<NewsletterAnalytics> {
        self.newsletters.begin();
        let result = client.get(&format!("{BASE}/newsletter-analytics/")).await;
        let result = self
            .newsletters
            .finish(result, "Failed to fetch newsletter analytics");
        self.note_error(&result);
        result
    }

    /// # Errors
    /// Returns the fetch error; the previous payload is kept.
    pub async fn fetch_content_analytics(
        &mut self,
        client: &ApiClient,
    ) -> ApiResult<ContentAnalytics> {
        self.content.begin();
        let result = client.get(&format!("{BASE}/content-analytics/")).await;
        let result = self
            .content
            .finish(result, "Failed to fetch content analytics");
        self.note_error(&result);
        result
    }

    /// Loads every section. Failures are recorded per section; the first one
    /// is returned after all four have been attempted. An authentication
    /// failure stops the remaining sections.
    ///
    /// # Errors
    /// Returns the first section failure.
    pub async fn fetch_all(&mut self, client: &ApiClient, days: u32) -> ApiResult<()> {
        let overview = self.fetch_overview(client).await.map(drop);
        if auth_lost(&overview) {
            return overview;
        }
        let subscribers = self.fetch_subscriber_analytics(client, days).await.map(drop);
        if auth_lost(&subscribers) {
            return overview.and(subscribers);
        }
        let newsletters = self.fetch_newsletter_analytics(client).await.map(drop);
        if auth_lost(&newsletters) {
            return overview.and(subscribers).and(newsletters);
        }
        let content = self.fetch_content_analytics(client).await.map(drop);
        overview.and(subscribers).and(newsletters).and(content)
    }

    pub fn refresh_data(&mut self) {
        self.last_updated = Some(Utc::now());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
        self.overview.clear_error();
        self.subscribers.clear_error();
        self.newsletters.clear_error();
        self.content.clear_error();
    }

    pub fn is_loading(&self) -> bool {
        self.overview.is_loading()
            || self.subscribers.is_loading()
            || self.newsletters.is_loading()
            || self.content.is_loading()
    }

    fn note_error<T>(&mut self, result: &ApiResult<T>) {
        if let Err(err) = result {
            self.error = Some(err.message.clone());
        }
    }
}

fn auth_lost(result: &ApiResult<()>) -> bool {
    result.as_ref().is_err_and(|err| {
        matches!(
            err.kind,
            ApiErrorKind::Unauthenticated | ApiErrorKind::Unauthorized
        )
    })
}

impl SubscriberAnalytics {
    /// Subscriber totals per day, in date order.
    pub fn growth_series(&self) -> Vec<GrowthPoint> {
        let mut points: Vec<GrowthPoint> = self
            .daily_growth
            .iter()
            .map(|day| GrowthPoint {
                date: day.date,
                total: day.total_subscribers,
                new: day.new_subscriptions,
            })
            .collect();
        points.sort_by_key(|point| point.date);
        points
    }

    /// Sport preference counts, largest first; ties by name.
    pub fn sport_breakdown(&self) -> Vec<(String, u64)> {
        let mut sports: Vec<(String, u64)> = self
            .sport_preferences
            .iter()
            .map(|(name, count)| (name.clone(), *count))
            .collect();
        sports.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        sports
    }
}

impl NewsletterAnalytics {
    pub fn campaign_rates(&self) -> Vec<CampaignRates> {
        self.recent_campaigns
            .iter()
            .map(|campaign| CampaignRates {
                title: campaign.title.clone(),
                open_rate: campaign.open_rate,
                click_rate: campaign.click_rate,
            })
            .collect()
    }
}
