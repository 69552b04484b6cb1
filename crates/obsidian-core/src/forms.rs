//! Public enquiry forms: contact, event booking and callback requests.
//!
//! Every form validates locally and reports the first failing field before
//! anything is sent.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{ApiClient, ApiError, ApiResult};

const BASE: &str = "/api/newsletter";

const INVALID_EMAIL: &str = "Invalid email format";
const INVALID_PHONE: &str = "Please provide a valid phone number";

/// Checks the overall shape `local@domain.tld`.
///
/// # Errors
/// Returns a validation error when the address is malformed.
pub fn validate_email(email: &str) -> ApiResult<()> {
    let email = email.trim();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| {
            !local.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
                && domain
                    .rsplit_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && tld.len() >= 2)
                && domain.split('.').all(|label| !label.is_empty())
        });

    if valid {
        Ok(())
    } else {
        Err(ApiError::validation(INVALID_EMAIL))
    }
}

/// Requires at least `min` characters after trimming.
///
/// # Errors
/// Returns a validation error carrying `message`.
pub fn validate_min_chars(value: &str, min: usize, message: &str) -> ApiResult<()> {
    if value.trim().chars().count() < min {
        return Err(ApiError::validation(message));
    }
    Ok(())
}

fn validate_required(value: &str, field: &str) -> ApiResult<()> {
    validate_min_chars(value, 1, &format!("{field} is required"))
}

fn validate_phone(phone: &str) -> ApiResult<()> {
    validate_min_chars(phone, 6, INVALID_PHONE)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactMethod {
    #[default]
    Email,
    Phone,
}

impl FromStr for ContactMethod {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "email" => Ok(ContactMethod::Email),
            "phone" => Ok(ContactMethod::Phone),
            other => Err(ApiError::validation(format!(
                "Unknown contact method: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Soccer,
    Formula1,
    Rugby,
    Golf,
    Tennis,
    Boxing,
    Concerts,
}

impl EventCategory {
    pub const ALL: [EventCategory; 7] = [
        EventCategory::Soccer,
        EventCategory::Formula1,
        EventCategory::Rugby,
        EventCategory::Golf,
        EventCategory::Tennis,
        EventCategory::Boxing,
        EventCategory::Concerts,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventCategory::Soccer => "soccer",
            EventCategory::Formula1 => "formula1",
            EventCategory::Rugby => "rugby",
            EventCategory::Golf => "golf",
            EventCategory::Tennis => "tennis",
            EventCategory::Boxing => "boxing",
            EventCategory::Concerts => "concerts",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventCategory {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == wanted)
            .ok_or_else(|| ApiError::validation(format!("Unknown event category: {s}")))
    }
}

/// Backend acknowledgement of a submitted form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FormReceipt {
    pub message: String,
    #[serde(default, alias = "contact_id", alias = "booking_id")]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub booking_reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub event: String,
    pub guests: Option<u32>,
    pub message: String,
    pub contact_method: ContactMethod,
}

impl ContactForm {
    /// # Errors
    /// Returns a validation error for the first bad field.
    pub fn validate(&self) -> ApiResult<()> {
        validate_min_chars(&self.name, 2, "Name must be at least 2 characters")?;
        validate_email(&self.email)?;
        validate_phone(&self.phone)?;
        validate_required(&self.message, "Message")
    }

    /// # Errors
    /// Fails locally on invalid input, otherwise with the backend's message.
    pub async fn submit(&self, client: &ApiClient) -> ApiResult<FormReceipt> {
        submit(client, "contact", self, |form| form.validate()).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub event_title: String,
    pub event_category: EventCategory,
    pub event_details: String,
    pub favorite_entity: String,
    pub number_of_guests: u32,
    pub preferred_date: Option<NaiveDate>,
    pub special_requirements: String,
}

impl BookingForm {
    /// # Errors
    /// Returns a validation error for the first bad field.
    pub fn validate(&self) -> ApiResult<()> {
        validate_required(&self.name, "Name")?;
        validate_email(&self.email)?;
        validate_required(&self.phone, "Phone")?;
        validate_required(&self.event_title, "Event title")?;
        validate_min_chars(
            &self.event_details,
            10,
            "Please provide more details about the event you want to attend",
        )?;
        if !(1..=100).contains(&self.number_of_guests) {
            return Err(ApiError::validation(
                "Number of guests must be between 1 and 100",
            ));
        }
        Ok(())
    }

    /// # Errors
    /// Fails locally on invalid input, otherwise with the backend's message.
    pub async fn submit(&self, client: &ApiClient) -> ApiResult<FormReceipt> {
        submit(client, "booking", self, |form| form.validate()).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallbackForm {
    pub phone: String,
    pub name: String,
    pub preferred_time: Option<DateTime<Utc>>,
}

impl CallbackForm {
    /// # Errors
    /// Returns a validation error when the phone number is too short.
    pub fn validate(&self) -> ApiResult<()> {
        validate_phone(&self.phone)
    }

    /// # Errors
    /// Fails locally on invalid input, otherwise with the backend's message.
    pub async fn submit(&self, client: &ApiClient) -> ApiResult<FormReceipt> {
        submit(client, "callback", self, |form| form.validate()).await
    }
}

async fn submit<F, V>(client: &ApiClient, endpoint: &str, form: &F, validate: V) -> ApiResult<FormReceipt>
where
    F: Serialize,
    V: FnOnce(&F) -> ApiResult<()>,
{
    validate(form)?;
    client
        .post(&format!("{BASE}/{endpoint}/"), form)
        .await
        .map_err(|err| err.or_fallback("Failed to submit. Please try again."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiErrorKind;

    fn contact() -> ContactForm {
        ContactForm {
            name: "Jordan".into(),
            email: "jordan@example.com".into(),
            phone: "+44 20 7946 0000".into(),
            event: "Six Nations Final".into(),
            guests: Some(4),
            message: "Looking for a box for four.".into(),
            contact_method: ContactMethod::Email,
        }
    }

    fn booking() -> BookingForm {
        BookingForm {
            name: "Jordan".into(),
            email: "jordan@example.com".into(),
            phone: "07700900000".into(),
            event_title: "Monaco Grand Prix".into(),
            event_category: EventCategory::Formula1,
            event_details: "Paddock club, Sunday race".into(),
            favorite_entity: String::new(),
            number_of_guests: 2,
            preferred_date: None,
            special_requirements: String::new(),
        }
    }

    #[test]
    fn test_email_shapes() {
        for ok in ["a@b.co", "first.last+tag@mail.example.org"] {
            assert!(validate_email(ok).is_ok(), "{ok}");
        }
        for bad in ["", "plain", "@example.com", "a@b", "a@@b.com", "a b@c.com", "a@.com", "a@b.c"] {
            assert_eq!(
                validate_email(bad).unwrap_err().message,
                INVALID_EMAIL,
                "{bad}"
            );
        }
    }

    #[test]
    fn test_contact_reports_first_failing_field() {
        assert!(contact().validate().is_ok());

        let mut form = contact();
        form.name = "J".into();
        form.phone = "123".into();
        assert_eq!(
            form.validate().unwrap_err().message,
            "Name must be at least 2 characters"
        );

        let mut form = contact();
        form.phone = " 12345 ".into();
        let err = form.validate().unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Validation);
        assert_eq!(err.message, INVALID_PHONE);
    }

    #[test]
    fn test_contact_body_shape() {
        let mut form = contact();
        form.guests = None;
        let body = serde_json::to_value(&form).unwrap();
        assert_eq!(body["guests"], serde_json::Value::Null);
        assert_eq!(body["contact_method"], "email");
    }

    #[test]
    fn test_booking_guest_bounds() {
        let mut form = booking();
        form.number_of_guests = 0;
        assert!(form.validate().is_err());
        form.number_of_guests = 100;
        assert!(form.validate().is_ok());
        form.number_of_guests = 101;
        assert_eq!(
            form.validate().unwrap_err().message,
            "Number of guests must be between 1 and 100"
        );
    }

    #[test]
    fn test_booking_details_length() {
        let mut form = booking();
        form.event_details = "  box  ".into();
        assert_eq!(
            form.validate().unwrap_err().message,
            "Please provide more details about the event you want to attend"
        );
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("Formula1".parse::<EventCategory>().unwrap(), EventCategory::Formula1);
        assert!("cricket".parse::<EventCategory>().is_err());
        assert_eq!("PHONE".parse::<ContactMethod>().unwrap(), ContactMethod::Phone);
    }

    #[test]
    fn test_receipt_aliases() {
        let receipt: FormReceipt = serde_json::from_str(
            r#"{"message": "Booking request received!", "booking_id": "6f1c2a7e-1f0b-4c55-9a57-5d1a0d3f9a10",
                "booking_reference": "OBS-1234", "status": "success"}"#,
        )
        .unwrap();
        assert!(receipt.id.is_some());
        assert_eq!(receipt.booking_reference.as_deref(), Some("OBS-1234"));
    }
}
