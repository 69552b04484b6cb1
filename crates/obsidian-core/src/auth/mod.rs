//! Session lifecycle operations: login, logout, refresh, profile, restore.

mod session;

use serde::{Deserialize, Serialize};
use serde_json::json;

pub use session::{Session, SessionStatus, SessionStore, UserProfile};

use crate::api::{ApiClient, ApiError, ApiRequest, ApiResult};

pub const LOGIN_ENDPOINT: &str = "/api/newsletter/admin/login/";
pub const LOGOUT_ENDPOINT: &str = "/api/newsletter/admin/logout/";
pub const PROFILE_ENDPOINT: &str = "/api/newsletter/admin/profile/";
pub const REFRESH_ENDPOINT: &str = "/api/token/refresh/";

const LOGIN_FAILED: &str = "Login failed";
const PROFILE_FAILED: &str = "Failed to fetch profile";
const REFRESH_FAILED: &str = "Token refresh failed";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access: String,
    refresh: String,
    #[serde(default)]
    user: Option<UserProfile>,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
}

#[derive(Debug, Deserialize)]
struct ProfileResponse {
    user: UserProfile,
}

/// How a logout ended. Local state is cleared either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    /// The backend accepted the refresh token invalidation.
    Acknowledged,
    /// No server call was made, or it failed.
    LocalOnly,
}

/// Auth operations bound to an `ApiClient` and its session.
pub struct Auth<'a> {
    client: &'a ApiClient,
}

impl<'a> Auth<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    fn session(&self) -> &SessionStore {
        self.client.session()
    }

    /// Exchanges credentials for a token pair.
    ///
    /// # Errors
    /// Returns a validation error for blank credentials, otherwise the
    /// backend or transport failure with its display message.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<UserProfile> {
        let session = self.session();
        session.begin();

        if username.trim().is_empty() || password.is_empty() {
            let err = ApiError::validation("Username and password required");
            session.fail_login(&err.message);
            return Err(err);
        }

        let request = ApiRequest::post(LOGIN_ENDPOINT)
            .without_refresh()
            .json(&LoginRequest { username, password })?;

        let response: LoginResponse = match self.client.send(request).await {
            Ok(response) => response,
            Err(err) => {
                let err = err.or_fallback(LOGIN_FAILED);
                tracing::info!(username, error = %err, "login failed");
                session.fail_login(&err.message);
                return Err(err);
            }
        };

        let user = response.user.unwrap_or_else(|| UserProfile {
            username: username.to_string(),
            ..UserProfile::default()
        });
        if let Err(err) = session.establish(&response.access, &response.refresh, Some(user.clone())) {
            session.fail_login(&err.message);
            return Err(err);
        }

        tracing::info!(username = %user.username, "logged in");
        Ok(user)
    }

    /// Best-effort server logout followed by unconditional local cleanup.
    pub async fn logout(&self) -> LogoutOutcome {
        let session = self.session();
        let outcome = match session.stored_refresh_token() {
            Some(refresh_token) => {
                let result = match ApiRequest::post(LOGOUT_ENDPOINT)
                    .without_refresh()
                    .json(&json!({ "refresh_token": refresh_token }))
                {
                    Ok(request) => self.client.send::<serde_json::Value>(request).await,
                    Err(err) => Err(err),
                };
                match result {
                    Ok(_) => LogoutOutcome::Acknowledged,
                    Err(err) => {
                        tracing::warn!(error = %err, "server logout failed, clearing local session");
                        LogoutOutcome::LocalOnly
                    }
                }
            }
            None => LogoutOutcome::LocalOnly,
        };

        session.clear();
        session.clear_error();
        tracing::info!(?outcome, "logged out");
        outcome
    }

    /// Obtains a new access token from the persisted refresh token.
    ///
    /// # Errors
    /// Fails without a network call when no refresh token is stored. Any
    /// failure clears both tokens.
    pub async fn refresh_token(&self) -> ApiResult<String> {
        let session = self.session();
        let Some(refresh) = session.stored_refresh_token() else {
            session.clear();
            return Err(ApiError::unauthenticated("No refresh token available"));
        };

        let result = async {
            let request = ApiRequest::post(REFRESH_ENDPOINT)
                .without_refresh()
                .json(&json!({ "refresh": refresh }))?;
            let response: RefreshResponse = self.client.send_once(request).await?;
            session.replace_access_token(&response.access)?;
            Ok::<_, ApiError>(response.access)
        }
        .await;

        match result {
            Ok(access) => {
                tracing::debug!("access token refreshed");
                Ok(access)
            }
            Err(err) => {
                let err = err.or_fallback(REFRESH_FAILED);
                tracing::info!(error = %err, "refresh failed, clearing session");
                session.clear();
                Err(err)
            }
        }
    }

    /// Loads the current user's profile into the session.
    ///
    /// # Errors
    /// Returns `Unauthenticated` without a network call when no session
    /// exists. Other failures leave the session authenticated.
    pub async fn fetch_profile(&self) -> ApiResult<UserProfile> {
        let session = self.session();
        if !session.is_authenticated() {
            return Err(ApiError::unauthenticated("Not authenticated"));
        }

        match self.client.get::<ProfileResponse>(PROFILE_ENDPOINT).await {
            Ok(ProfileResponse { user }) => {
                session.set_user(user.clone());
                Ok(user)
            }
            Err(err) => {
                let err = err.or_fallback(PROFILE_FAILED);
                session.set_error(&err.message);
                Err(err)
            }
        }
    }

    /// Restores the session from durable storage without network access.
    pub fn initialize(&self) -> bool {
        let restored = self.session().restore();
        tracing::debug!(restored, "session initialized");
        restored
    }

    pub fn clear_error(&self) {
        self.session().clear_error();
    }
}
