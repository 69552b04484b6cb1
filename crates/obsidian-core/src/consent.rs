//! Cookie consent and the personalization preferences it gates.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::storage::{COOKIE_CONSENT_KEY, Storage, USER_PREFERENCES_KEY};

const ACCEPTED: &str = "accepted";
const DECLINED: &str = "declined";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookieCategory {
    Essential,
    Analytics,
    Marketing,
}

impl fmt::Display for CookieCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CookieCategory::Essential => "essential",
            CookieCategory::Analytics => "analytics",
            CookieCategory::Marketing => "marketing",
        })
    }
}

impl FromStr for CookieCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "essential" => Ok(CookieCategory::Essential),
            "analytics" => Ok(CookieCategory::Analytics),
            "marketing" => Ok(CookieCategory::Marketing),
            other => anyhow::bail!("Unknown cookie category: {other}"),
        }
    }
}

/// Per-category choice made from the consent details panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentSelection {
    #[serde(default = "essential_default")]
    pub essential: bool,
    #[serde(default)]
    pub analytics: bool,
    #[serde(default)]
    pub marketing: bool,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

fn essential_default() -> bool {
    true
}

/// A stored consent decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieConsent {
    Accepted,
    Declined,
    Selected(ConsentSelection),
}

impl CookieConsent {
    /// Decodes the stored representation: a bare `accepted`/`declined` or a
    /// JSON selection.
    ///
    /// # Errors
    /// Returns an error if the value is neither.
    pub fn decode(raw: &str) -> Result<Self> {
        match raw.trim() {
            ACCEPTED => Ok(CookieConsent::Accepted),
            DECLINED => Ok(CookieConsent::Declined),
            other => serde_json::from_str(other)
                .map(CookieConsent::Selected)
                .context("Failed to parse cookie consent"),
        }
    }

    /// # Errors
    /// Returns an error if the selection cannot be serialized.
    pub fn encode(&self) -> Result<String> {
        match self {
            CookieConsent::Accepted => Ok(ACCEPTED.to_string()),
            CookieConsent::Declined => Ok(DECLINED.to_string()),
            CookieConsent::Selected(selection) => {
                serde_json::to_string(selection).context("Failed to serialize cookie consent")
            }
        }
    }

    pub fn allows(&self, category: CookieCategory) -> bool {
        match (self, category) {
            (_, CookieCategory::Essential) | (CookieConsent::Accepted, _) => true,
            (CookieConsent::Declined, _) => false,
            (CookieConsent::Selected(selection), CookieCategory::Analytics) => selection.analytics,
            (CookieConsent::Selected(selection), CookieCategory::Marketing) => selection.marketing,
        }
    }
}

impl fmt::Display for CookieConsent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CookieConsent::Accepted => f.write_str("accepted (all categories)"),
            CookieConsent::Declined => f.write_str("declined (essential only)"),
            CookieConsent::Selected(selection) => write!(
                f,
                "custom (essential, analytics: {}, marketing: {})",
                selection.analytics, selection.marketing
            ),
        }
    }
}

/// Consent record plus the preferences stored under it.
pub struct ConsentStore {
    storage: Arc<dyn Storage>,
}

impl ConsentStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// The current decision. Unreadable records count as no decision.
    pub fn consent(&self) -> Option<CookieConsent> {
        let raw = self.storage.get(COOKIE_CONSENT_KEY)?;
        match CookieConsent::decode(&raw) {
            Ok(consent) => Some(consent),
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "ignoring unreadable cookie consent");
                None
            }
        }
    }

    pub fn should_show_banner(&self) -> bool {
        self.storage.get(COOKIE_CONSENT_KEY).is_none()
    }

    /// # Errors
    /// Returns an error if storage cannot be written.
    pub fn accept_all(&self) -> Result<()> {
        self.record(&CookieConsent::Accepted)
    }

    /// # Errors
    /// Returns an error if storage cannot be written.
    pub fn decline_all(&self) -> Result<()> {
        self.record(&CookieConsent::Declined)
    }

    /// # Errors
    /// Returns an error if storage cannot be written.
    pub fn save_selection(&self, analytics: bool, marketing: bool) -> Result<()> {
        self.record(&CookieConsent::Selected(ConsentSelection {
            essential: true,
            analytics,
            marketing,
            timestamp: Some(Utc::now()),
        }))
    }

    /// Nothing is allowed until a choice exists.
    pub fn is_allowed(&self, category: CookieCategory) -> bool {
        self.consent()
            .is_some_and(|consent| consent.allows(category))
    }

    /// Forgets the decision and the preferences that depended on it.
    ///
    /// # Errors
    /// Returns an error if storage cannot be written.
    pub fn reset(&self) -> Result<()> {
        self.storage.remove(COOKIE_CONSENT_KEY)?;
        self.storage.remove(USER_PREFERENCES_KEY)?;
        tracing::info!("cookie consent reset");
        Ok(())
    }

    /// Stored preferences, or `{"personalization": false}` without analytics
    /// consent.
    pub fn preferences(&self) -> Value {
        if !self.is_allowed(CookieCategory::Analytics) {
            return json!({ "personalization": false });
        }

        let Some(raw) = self.storage.get(USER_PREFERENCES_KEY) else {
            return Value::Object(Map::new());
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(value @ Value::Object(_)) => value,
            Ok(_) | Err(_) => {
                tracing::warn!("ignoring unreadable user preferences");
                Value::Object(Map::new())
            }
        }
    }

    /// Stores `preferences` with an `updated` timestamp.
    ///
    /// Returns `false` without writing when analytics consent is missing.
    ///
    /// # Errors
    /// Returns an error if `preferences` is not a JSON object or storage
    /// cannot be written.
    pub fn save_preferences(&self, preferences: &Value) -> Result<bool> {
        if !self.is_allowed(CookieCategory::Analytics) {
            tracing::debug!("analytics not allowed, preferences not saved");
            return Ok(false);
        }

        let Value::Object(map) = preferences else {
            anyhow::bail!("Preferences must be a JSON object");
        };
        let mut map = map.clone();
        map.insert("updated".to_string(), Value::String(Utc::now().to_rfc3339()));

        let encoded = serde_json::to_string(&Value::Object(map))
            .context("Failed to serialize user preferences")?;
        self.storage.set(USER_PREFERENCES_KEY, &encoded)?;
        Ok(true)
    }

    fn record(&self, consent: &CookieConsent) -> Result<()> {
        self.storage.set(COOKIE_CONSENT_KEY, &consent.encode()?)?;
        tracing::info!(%consent, "cookie consent recorded");
        Ok(())
    }
}
