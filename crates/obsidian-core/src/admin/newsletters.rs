use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ADMIN_BASE;
use crate::api::{ApiClient, ApiRequest, ApiResult};
use crate::models::{Listing, Newsletter};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SendReceipt {
    pub message: String,
    #[serde(default)]
    pub task_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReason {
    #[serde(default)]
    pub error_message: String,
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryReport {
    pub total_sent: u64,
    pub total_failed: u64,
    pub total_bounced: u64,
    pub total_opened: u64,
    pub total_clicked: u64,
    pub failure_reasons: Vec<FailureReason>,
}

impl DeliveryReport {
    /// Opened share of sent messages, in percent.
    pub fn open_rate(&self) -> f64 {
        percent(self.total_opened, self.total_sent)
    }

    pub fn click_rate(&self) -> f64 {
        percent(self.total_clicked, self.total_sent)
    }
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

pub struct Newsletters<'a> {
    client: &'a ApiClient,
}

impl<'a> Newsletters<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Editions, newest first.
    ///
    /// # Errors
    /// Returns the request error.
    pub async fn list(&self, page: u32) -> ApiResult<Listing<Newsletter>> {
        let request =
            ApiRequest::get(format!("{ADMIN_BASE}/newsletters/")).query("page", page.max(1));
        self.client
            .send(request)
            .await
            .map_err(|e| e.or_fallback("Failed to load newsletters"))
    }

    /// # Errors
    /// Returns the request error.
    pub async fn get(&self, id: Uuid) -> ApiResult<Newsletter> {
        self.client
            .get(&format!("{ADMIN_BASE}/newsletters/{id}/"))
            .await
    }

    /// Queues the edition for delivery.
    ///
    /// # Errors
    /// The backend refuses editions that were already sent.
    pub async fn send(&self, id: Uuid) -> ApiResult<SendReceipt> {
        let receipt: SendReceipt = self
            .client
            .send(ApiRequest::post(format!(
                "{ADMIN_BASE}/newsletters/{id}/send_newsletter/"
            )))
            .await
            .map_err(|e| e.or_fallback("Failed to send newsletter"))?;
        tracing::info!(%id, task_id = ?receipt.task_id, "newsletter queued");
        Ok(receipt)
    }

    /// # Errors
    /// Returns the request error.
    pub async fn delivery_report(&self, id: Uuid) -> ApiResult<DeliveryReport> {
        self.client
            .get(&format!("{ADMIN_BASE}/newsletters/{id}/delivery_report/"))
            .await
            .map_err(|e| e.or_fallback("Failed to load delivery report"))
    }

    /// # Errors
    /// Returns the request error.
    pub async fn delete(&self, id: Uuid) -> ApiResult<()> {
        self.client
            .delete(&format!("{ADMIN_BASE}/newsletters/{id}/"))
            .await
            .map_err(|e| e.or_fallback("Failed to delete newsletter"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_report_rates() {
        let report: DeliveryReport = serde_json::from_str(
            r#"{"total_sent": 200, "total_failed": 3, "total_bounced": 1, "total_opened": 50,
                "total_clicked": 10, "failure_reasons": [{"error_message": "Mailbox full", "count": 2}]}"#,
        )
        .unwrap();
        assert!((report.open_rate() - 25.0).abs() < f64::EPSILON);
        assert!((report.click_rate() - 5.0).abs() < f64::EPSILON);
        assert_eq!(report.failure_reasons[0].count, 2);

        assert!(DeliveryReport::default().open_rate().abs() < f64::EPSILON);
    }
}
