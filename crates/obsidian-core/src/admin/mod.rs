//! Admin resources behind the bearer token: subscribers, newsletters,
//! content and settings.

mod content;
mod newsletters;
mod settings;
mod subscribers;

use crate::api::ApiRequest;

pub use content::{ArticleFilter, Content, FixtureFilter};
pub use newsletters::{DeliveryReport, FailureReason, Newsletters, SendReceipt};
pub use settings::{
    AdminSettings, EmailSettings, NotificationSettings, PasswordChange, ProfileSettings, Settings,
    TemplateSettings,
};
pub use subscribers::{BulkAction, StatusChange, SubscriberFilter, Subscribers, parse_ids};

const ADMIN_BASE: &str = "/api/newsletter/admin";

/// Paging and free-text search shared by every admin list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub page: u32,
    pub search: Option<String>,
    pub sport: Option<String>,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: 1,
            search: None,
            sport: None,
        }
    }
}

impl PageQuery {
    fn apply(&self, request: ApiRequest) -> ApiRequest {
        request
            .query("page", self.page.max(1))
            .query_opt("search", non_blank(self.search.as_deref()))
            .query_opt("sport", non_blank(self.sport.as_deref()))
    }
}

/// Blank and `all` mean "no filter".
fn non_blank(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_blank_filters() {
        assert_eq!(non_blank(Some(" rugby ")), Some("rugby"));
        assert_eq!(non_blank(Some("All")), None);
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(None), None);
    }
}
