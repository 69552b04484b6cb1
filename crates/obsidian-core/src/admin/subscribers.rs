use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::{ADMIN_BASE, PageQuery};
use crate::api::{ApiClient, ApiError, ApiRequest, ApiResult};
use crate::models::{Listing, MessageResponse, Subscriber, SubscriberStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriberFilter {
    pub page: PageQuery,
    pub status: Option<SubscriberStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    Activate,
    Deactivate,
    Unsubscribe,
    Delete,
}

impl fmt::Display for BulkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BulkAction::Activate => "activate",
            BulkAction::Deactivate => "deactivate",
            BulkAction::Unsubscribe => "unsubscribe",
            BulkAction::Delete => "delete",
        })
    }
}

impl FromStr for BulkAction {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "activate" => Ok(BulkAction::Activate),
            "deactivate" => Ok(BulkAction::Deactivate),
            "unsubscribe" => Ok(BulkAction::Unsubscribe),
            "delete" => Ok(BulkAction::Delete),
            _ => Err(ApiError::validation("Invalid action")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusChange {
    pub message: String,
    #[serde(default)]
    pub subscriber: Option<Subscriber>,
}

pub struct Subscribers<'a> {
    client: &'a ApiClient,
}

impl<'a> Subscribers<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// # Errors
    /// Returns the request error.
    pub async fn list(&self, filter: &SubscriberFilter) -> ApiResult<Listing<Subscriber>> {
        let request = filter
            .page
            .apply(ApiRequest::get(format!("{ADMIN_BASE}/subscribers/")))
            .query_opt("status", filter.status.map(SubscriberStatus::as_str));
        self.client
            .send(request)
            .await
            .map_err(|e| e.or_fallback("Failed to load subscribers"))
    }

    /// # Errors
    /// Returns the request error.
    pub async fn get(&self, id: Uuid) -> ApiResult<Subscriber> {
        self.client
            .get(&format!("{ADMIN_BASE}/subscribers/{id}/"))
            .await
    }

    /// # Errors
    /// Returns the request error.
    pub async fn change_status(&self, id: Uuid, status: SubscriberStatus) -> ApiResult<StatusChange> {
        self.client
            .post(
                &format!("{ADMIN_BASE}/subscribers/{id}/change_status/"),
                &json!({ "status": status }),
            )
            .await
            .map_err(|e| e.or_fallback("Failed to change subscriber status"))
    }

    /// Applies `action` to every subscriber in `ids`.
    ///
    /// # Errors
    /// An empty selection is rejected locally.
    pub async fn bulk_action(&self, action: BulkAction, ids: &[Uuid]) -> ApiResult<String> {
        if ids.is_empty() {
            return Err(ApiError::validation("No subscribers selected"));
        }

        let response: MessageResponse = self
            .client
            .post(
                &format!("{ADMIN_BASE}/subscribers/bulk_action/"),
                &json!({ "action": action, "subscriber_ids": ids }),
            )
            .await
            .map_err(|e| e.or_fallback("Bulk action failed"))?;
        tracing::info!(%action, count = ids.len(), "bulk action applied");
        Ok(response.message)
    }

    /// # Errors
    /// Returns the request error.
    pub async fn delete(&self, id: Uuid) -> ApiResult<()> {
        self.client
            .delete(&format!("{ADMIN_BASE}/subscribers/{id}/"))
            .await
            .map_err(|e| e.or_fallback("Failed to delete subscriber"))
    }
}

/// Parses a comma- or whitespace-separated list of subscriber ids.
///
/// # Errors
/// Returns a validation error naming the first malformed id.
pub fn parse_ids(raw: &[String]) -> ApiResult<Vec<Uuid>> {
    raw.iter()
        .flat_map(|chunk| chunk.split([',', ' ']))
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            Uuid::parse_str(id)
                .map_err(|_| ApiError::validation(format!("Invalid subscriber id: {id}")))
        })
        .collect()
}
