//! Client-side routes and navigation.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

/// Route of the admin login page.
pub const LOGIN_ROUTE: &str = "/admin/login";

/// A requested location (path plus optional query string).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: None,
        }
    }

    /// Splits `"/admin/subscribers?page=2"` into path and query.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once('?') {
            Some((path, query)) if !query.is_empty() => Self {
                path: path.to_string(),
                query: Some(query.to_string()),
            },
            Some((path, _)) => Self::new(path),
            None => Self::new(raw),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.query {
            Some(query) => write!(f, "{}?{}", self.path, query),
            None => write!(f, "{}", self.path),
        }
    }
}

/// Admin dashboard pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminRoute {
    Dashboard,
    Subscribers,
    Newsletters,
    Analytics,
    Content,
    Settings,
}

impl AdminRoute {
    pub fn path(self) -> &'static str {
        match self {
            AdminRoute::Dashboard => "/admin/dashboard",
            AdminRoute::Subscribers => "/admin/subscribers",
            AdminRoute::Newsletters => "/admin/newsletters",
            AdminRoute::Analytics => "/admin/analytics",
            AdminRoute::Content => "/admin/content",
            AdminRoute::Settings => "/admin/settings",
        }
    }

    pub fn location(self) -> Location {
        Location::new(self.path())
    }
}

/// A navigation performed by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Full reload at `to`; all in-flight view state is discarded.
    Hard { to: String },
    /// In-app redirect that remembers where the user was heading.
    Client { to: String, from: Option<Location> },
}

impl Navigation {
    pub fn target(&self) -> &str {
        match self {
            Navigation::Hard { to } | Navigation::Client { to, .. } => to,
        }
    }
}

/// Performs navigations on behalf of the API client and route guard.
pub trait Navigator: Send + Sync {
    fn hard_redirect(&self, to: &str);

    fn redirect(&self, to: &str, from: Option<&Location>);
}

/// Navigator that records every navigation in order.
#[derive(Debug, Default)]
pub struct History {
    entries: Mutex<Vec<Navigation>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Navigation> {
        self.lock().clone()
    }

    pub fn last(&self) -> Option<Navigation> {
        self.lock().last().cloned()
    }

    /// Path of the most recent navigation target, if any.
    pub fn current(&self) -> Option<String> {
        self.lock().last().map(|nav| nav.target().to_string())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Navigation>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Navigator for History {
    fn hard_redirect(&self, to: &str) {
        tracing::info!(to, "hard redirect");
        self.lock().push(Navigation::Hard { to: to.to_string() });
    }

    fn redirect(&self, to: &str, from: Option<&Location>) {
        tracing::debug!(to, from = ?from.map(ToString::to_string), "client redirect");
        self.lock().push(Navigation::Client {
            to: to.to_string(),
            from: from.cloned(),
        });
    }
}
