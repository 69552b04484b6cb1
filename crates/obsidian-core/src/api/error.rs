//! Tagged error type for backend API operations.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    /// Input rejected locally before any network call
    Validation,
    /// No usable credentials (missing tokens, refresh impossible)
    Unauthenticated,
    /// HTTP 401 from the backend
    Unauthorized,
    /// Any other non-success HTTP status
    Http,
    /// Connection failure or interrupted transfer
    Transport,
    /// Response body could not be decoded
    Parse,
    /// Durable storage could not be written
    Storage,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ApiErrorKind::Validation => "validation",
            ApiErrorKind::Unauthenticated => "unauthenticated",
            ApiErrorKind::Unauthorized => "unauthorized",
            ApiErrorKind::Http => "http_status",
            ApiErrorKind::Transport => "transport",
            ApiErrorKind::Parse => "parse",
            ApiErrorKind::Storage => "storage",
        };
        f.write_str(label)
    }
}

/// Structured error from an API operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    /// HTTP status, when the backend answered
    pub status: Option<u16>,
    /// One-line summary suitable for display
    pub message: String,
    /// Raw body or transport detail, when there is one
    pub details: Option<String>,
    /// Whether `message` came from the backend payload
    #[serde(default)]
    pub from_server: bool,
}

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
            details: None,
            from_server: false,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Validation, message)
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Unauthenticated, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Parse, message)
    }

    pub fn storage(err: &anyhow::Error) -> Self {
        Self::new(ApiErrorKind::Storage, format!("{err:#}"))
    }

    pub fn transport(err: &reqwest::Error) -> Self {
        let message = if err.is_connect() {
            "Could not connect to the server"
        } else if err.is_timeout() {
            "The request timed out"
        } else {
            "Network error"
        };
        Self {
            details: Some(err.to_string()),
            ..Self::new(ApiErrorKind::Transport, message)
        }
    }

    /// Builds an error from a non-success response.
    pub fn from_response(status: u16, body: &str) -> Self {
        let kind = if status == 401 {
            ApiErrorKind::Unauthorized
        } else {
            ApiErrorKind::Http
        };
        let details = (!body.trim().is_empty()).then(|| body.to_string());

        match server_message(body) {
            Some(message) => Self {
                kind,
                status: Some(status),
                message,
                details,
                from_server: true,
            },
            None => Self {
                kind,
                status: Some(status),
                message: format!("HTTP {status}"),
                details,
                from_server: false,
            },
        }
    }

    /// Replaces the message with `fallback` unless the backend supplied one.
    #[must_use]
    pub fn or_fallback(mut self, fallback: &str) -> Self {
        if !self.from_server && self.kind != ApiErrorKind::Validation {
            self.message = fallback.to_string();
        }
        self
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ApiErrorKind::Unauthorized
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

/// Extracts a display message from a backend error payload.
///
/// Tries `{"error": ...}`, then `{"detail": ...}`, then the first message of a
/// field-validation map such as `{"email": ["Invalid email format"]}`.
pub fn server_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    let obj = json.as_object()?;

    for key in ["error", "detail", "message"] {
        if let Some(text) = obj.get(key).and_then(first_text) {
            return Some(text);
        }
    }

    obj.values().find_map(first_text)
}

fn first_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(first_text),
        Value::Object(map) => map.values().find_map(first_text),
        _ => None,
    }
}
