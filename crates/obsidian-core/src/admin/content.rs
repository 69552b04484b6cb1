use uuid::Uuid;

use super::{ADMIN_BASE, PageQuery, non_blank};
use crate::api::{ApiClient, ApiRequest, ApiResult};
use crate::models::{Listing, MatchFixture, NewsArticle};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleFilter {
    pub page: PageQuery,
    /// `news`, `fixture`, `result` or `analysis`.
    pub article_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixtureFilter {
    pub page: PageQuery,
}

/// Scraped articles and fixtures.
pub struct Content<'a> {
    client: &'a ApiClient,
}

impl<'a> Content<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// # Errors
    /// Returns the request error.
    pub async fn articles(&self, filter: &ArticleFilter) -> ApiResult<Listing<NewsArticle>> {
        let request = filter
            .page
            .apply(ApiRequest::get(format!("{ADMIN_BASE}/articles/")))
            .query_opt("type", non_blank(filter.article_type.as_deref()));
        self.client
            .send(request)
            .await
            .map_err(|e| e.or_fallback("Failed to load articles"))
    }

    /// # Errors
    /// Returns the request error.
    pub async fn fixtures(&self, filter: &FixtureFilter) -> ApiResult<Listing<MatchFixture>> {
        let request = filter
            .page
            .apply(ApiRequest::get(format!("{ADMIN_BASE}/fixtures/")));
        self.client
            .send(request)
            .await
            .map_err(|e| e.or_fallback("Failed to load fixtures"))
    }

    /// # Errors
    /// Returns the request error.
    pub async fn delete_article(&self, id: Uuid) -> ApiResult<()> {
        self.client
            .delete(&format!("{ADMIN_BASE}/articles/{id}/"))
            .await
            .map_err(|e| e.or_fallback("Failed to delete article"))
    }

    /// # Errors
    /// Returns the request error.
    pub async fn delete_fixture(&self, id: Uuid) -> ApiResult<()> {
        self.client
            .delete(&format!("{ADMIN_BASE}/fixtures/{id}/"))
            .await
            .map_err(|e| e.or_fallback("Failed to delete fixture"))
    }
}
