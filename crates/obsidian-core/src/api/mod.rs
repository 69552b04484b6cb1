//! Authenticated HTTP client for the Obsidian backend.
//!
//! Every request reads the access token from the session's durable storage and
//! attaches it as a bearer credential. A 401 triggers one token refresh and one
//! retry of the original request; if the refresh fails the client performs a
//! hard redirect to the login route.

mod error;

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::Instrument;

pub use error::{ApiError, ApiErrorKind, ApiResult, server_message};

use crate::auth::{Auth, SessionStore};
use crate::config::Config;
use crate::router::{LOGIN_ROUTE, Navigator};

/// Standard User-Agent header for Obsidian API requests.
pub const USER_AGENT: &str = concat!("obsidian/", env!("CARGO_PKG_VERSION"));

/// A single logical request.
///
/// `retried` is the per-request flag that bounds the refresh protocol to one
/// automatic retry.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
    retried: bool,
    intercept: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            retried: false,
            intercept: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attaches a JSON body.
    ///
    /// # Errors
    /// Returns a parse error if `body` cannot be serialized.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> ApiResult<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::parse(format!("Failed to encode request body: {e}")))?;
        self.body = Some(value);
        Ok(self)
    }

    #[must_use]
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Adds the pair only when `value` is present.
    #[must_use]
    pub fn query_opt(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Disables the refresh-on-401 interceptor (used by the auth endpoints).
    #[must_use]
    pub fn without_refresh(mut self) -> Self {
        self.intercept = false;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_retried(&self) -> bool {
        self.retried
    }
}

/// Backend API client.
pub struct ApiClient {
    base_url: String,
    login_path: String,
    http: reqwest::Client,
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    /// Creates a client for `base_url` bound to `session`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        session: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            login_path: LOGIN_ROUTE.to_string(),
            http,
            session,
            navigator,
        })
    }

    /// Creates a client from the resolved configuration.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client cannot be built.
    pub fn from_config(
        config: &Config,
        session: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let base_url = config.api_base_url()?;
        Ok(Self::new(&base_url, session, navigator)?.with_login_path(&config.login_path))
    }

    #[must_use]
    pub fn with_login_path(mut self, login_path: &str) -> Self {
        self.login_path = login_path.to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// Session lifecycle operations bound to this client.
    pub fn auth(&self) -> Auth<'_> {
        Auth::new(self)
    }

    /// # Errors
    /// Returns an error if the request fails or the body cannot be decoded.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send(ApiRequest::get(path)).await
    }

    /// # Errors
    /// Returns an error if the request fails or the body cannot be decoded.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::post(path).json(body)?).await
    }

    /// # Errors
    /// Returns an error if the request fails or the body cannot be decoded.
    pub async fn put<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::put(path).json(body)?).await
    }

    /// # Errors
    /// Returns an error if the request fails or the body cannot be decoded.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send(ApiRequest::delete(path)).await
    }

    /// Sends a request through the refresh interceptor and decodes the body.
    ///
    /// An empty body decodes as JSON `null`, so `()` works for 204 responses.
    ///
    /// # Errors
    /// Returns an error if the request fails or the body cannot be decoded.
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<T> {
        let span = tracing::debug_span!(
            "api_request",
            request_id = %uuid::Uuid::new_v4(),
            method = %request.method,
            path = %request.path,
        );
        let body = self.dispatch(request).instrument(span).await?;
        decode(&body)
    }

    /// Sends a request without the refresh interceptor.
    ///
    /// The refresh call itself goes through here, so it can never trigger
    /// another refresh.
    pub(crate) async fn send_once<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<T> {
        let span = tracing::debug_span!(
            "api_request",
            request_id = %uuid::Uuid::new_v4(),
            method = %request.method,
            path = %request.path,
        );
        let body = self.execute(&request).instrument(span).await?;
        decode(&body)
    }

    async fn dispatch(&self, mut request: ApiRequest) -> ApiResult<String> {
        if !request.intercept {
            return self.execute(&request).await;
        }

        match self.execute(&request).await {
            Err(err) if err.is_unauthorized() && !request.retried => {
                request.retried = true;
                tracing::debug!("received 401, refreshing access token");

                match self.auth().refresh_token().await {
                    Ok(_) => {
                        tracing::debug!("token refreshed, retrying original request");
                        self.execute(&request).await
                    }
                    Err(refresh_err) => {
                        tracing::warn!(error = %refresh_err, "token refresh failed, redirecting to login");
                        self.navigator.hard_redirect(&self.login_path);
                        Err(refresh_err)
                    }
                }
            }
            other => other,
        }
    }

    async fn execute(&self, request: &ApiRequest) -> ApiResult<String> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.http.request(request.method.clone(), &url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = self.session.stored_access_token() {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| ApiError::transport(&e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| ApiError::transport(&e))?;
        tracing::debug!(status = status.as_u16(), retried = request.retried, "response");

        if status.is_success() {
            Ok(body)
        } else {
            Err(ApiError::from_response(status.as_u16(), &body))
        }
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> ApiResult<T> {
    let body = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(body)
        .map_err(|e| ApiError::parse(format!("Failed to parse response: {e}")))
}
