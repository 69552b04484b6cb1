use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::ADMIN_BASE;
use crate::api::{ApiClient, ApiError, ApiResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSettings {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailSettings {
    pub from_email: String,
    pub from_name: String,
    pub reply_to: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub use_tls: bool,
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            from_email: "newsletter@obsidian.com".to_string(),
            from_name: "Obsidian Newsletter".to_string(),
            reply_to: "support@obsidian.com".to_string(),
            smtp_host: String::new(),
            smtp_port: 587,
            use_tls: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub new_subscriber_alert: bool,
    pub newsletter_sent_alert: bool,
    pub weekly_report: bool,
    pub system_updates: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            new_subscriber_alert: true,
            newsletter_sent_alert: true,
            weekly_report: true,
            system_updates: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSettings {
    pub default_template: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub logo_url: String,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self {
            default_template: "modern".to_string(),
            primary_color: "#fbbf24".to_string(),
            secondary_color: "#f59e0b".to_string(),
            logo_url: String::new(),
        }
    }
}

/// All four settings sections. Sections the backend omits keep their
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminSettings {
    pub profile: ProfileSettings,
    pub email: EmailSettings,
    pub notifications: NotificationSettings,
    pub template: TemplateSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl PasswordChange {
    /// # Errors
    /// Returns a validation error when a field is empty or the confirmation
    /// differs.
    pub fn validate(&self) -> ApiResult<()> {
        if self.current_password.is_empty() || self.new_password.is_empty() {
            return Err(ApiError::validation("Current and new password are required"));
        }
        if self.new_password != self.confirm_password {
            return Err(ApiError::validation("Passwords do not match"));
        }
        Ok(())
    }

    fn body(&self) -> Value {
        json!({
            "current_password": self.current_password,
            "new_password": self.new_password,
        })
    }
}

pub struct Settings<'a> {
    client: &'a ApiClient,
}

impl<'a> Settings<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// # Errors
    /// Returns the request error.
    pub async fn load(&self) -> ApiResult<AdminSettings> {
        self.client
            .get(&format!("{ADMIN_BASE}/settings/"))
            .await
            .map_err(|e| e.or_fallback("Failed to load settings"))
    }

    /// # Errors
    /// Returns the request error.
    pub async fn save_profile(&self, profile: &ProfileSettings) -> ApiResult<()> {
        self.save("profile", profile).await
    }

    /// Only the current and new password go over the wire.
    ///
    /// # Errors
    /// Fails locally when the confirmation differs, otherwise with the
    /// backend's message.
    pub async fn change_password(&self, change: &PasswordChange) -> ApiResult<()> {
        change.validate()?;
        self.client
            .post::<_, Value>(
                &format!("{ADMIN_BASE}/settings/change-password/"),
                &change.body(),
            )
            .await
            .map_err(|e| e.or_fallback("Failed to change password"))?;
        tracing::info!("admin password changed");
        Ok(())
    }

    /// # Errors
    /// Returns the request error.
    pub async fn save_email(&self, email: &EmailSettings) -> ApiResult<()> {
        self.save("email", email).await
    }

    /// # Errors
    /// Returns the request error.
    pub async fn save_notifications(&self, notifications: &NotificationSettings) -> ApiResult<()> {
        self.save("notifications", notifications).await
    }

    /// # Errors
    /// Returns the request error.
    pub async fn save_template(&self, template: &TemplateSettings) -> ApiResult<()> {
        self.save("template", template).await
    }

    async fn save<B: Serialize>(&self, section: &str, body: &B) -> ApiResult<()> {
        self.client
            .put::<_, Value>(&format!("{ADMIN_BASE}/settings/{section}/"), body)
            .await
            .map_err(|e| e.or_fallback("Failed to save settings"))?;
        tracing::info!(section, "settings saved");
        Ok(())
    }
}
