//! Owned session state and its transition functions.
//!
//! The session is the only holder of the token pair in memory; durable storage
//! holds the persisted copy. All mutation goes through `SessionStore`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::api::{ApiError, ApiResult};
use crate::storage::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, Storage};

/// Session lifecycle status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Idle,
    Loading,
    Authenticated,
    Failed,
}

/// Admin user as returned by the backend. Only `username` is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub last_login: Option<String>,
}

impl UserProfile {
    /// First name when the backend has one, else the username.
    pub fn display_name(&self) -> &str {
        self.first_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.username)
    }
}

/// In-memory session snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<UserProfile>,
    pub status: SessionStatus,
    pub error: Option<String>,
}

impl Session {
    /// Both tokens present. A lone token never counts.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some() && self.refresh_token.is_some()
    }

    /// The default `Authorization` header value for this session.
    pub fn authorization_header(&self) -> Option<String> {
        self.access_token
            .as_ref()
            .filter(|_| self.is_authenticated())
            .map(|token| format!("Bearer {token}"))
    }
}

/// Session owner backed by durable storage.
pub struct SessionStore {
    storage: Arc<dyn Storage>,
    state: Mutex<Session>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            state: Mutex::new(Session::default()),
        }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Copy of the current session.
    pub fn snapshot(&self) -> Session {
        self.lock().clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.lock().status
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().is_authenticated()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.lock().user.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn authorization_header(&self) -> Option<String> {
        self.lock().authorization_header()
    }

    /// Access token as persisted, read fresh on every request.
    pub fn stored_access_token(&self) -> Option<String> {
        non_blank(self.storage.get(ACCESS_TOKEN_KEY))
    }

    pub fn stored_refresh_token(&self) -> Option<String> {
        non_blank(self.storage.get(REFRESH_TOKEN_KEY))
    }

    pub(crate) fn begin(&self) {
        let mut state = self.lock();
        state.status = SessionStatus::Loading;
        state.error = None;
    }

    /// Persists both tokens and marks the session authenticated.
    pub(crate) fn establish(
        &self,
        access: &str,
        refresh: &str,
        user: Option<UserProfile>,
    ) -> ApiResult<()> {
        self.storage
            .set(ACCESS_TOKEN_KEY, access)
            .map_err(|e| ApiError::storage(&e))?;
        if let Err(e) = self.storage.set(REFRESH_TOKEN_KEY, refresh) {
            if let Err(cleanup) = self.storage.remove(ACCESS_TOKEN_KEY) {
                tracing::warn!(error = %format!("{cleanup:#}"), "failed to drop unpaired access token");
            }
            return Err(ApiError::storage(&e));
        }

        let mut state = self.lock();
        state.access_token = Some(access.to_string());
        state.refresh_token = Some(refresh.to_string());
        state.user = user;
        state.status = SessionStatus::Authenticated;
        state.error = None;
        Ok(())
    }

    /// Records a failed login. An authenticated session stays authenticated.
    pub(crate) fn fail_login(&self, message: &str) {
        let mut state = self.lock();
        if state.is_authenticated() {
            state.status = SessionStatus::Authenticated;
        } else {
            state.access_token = None;
            state.refresh_token = None;
            state.user = None;
            state.status = SessionStatus::Failed;
        }
        state.error = Some(message.to_string());
    }

    /// Overwrites the access token only.
    pub(crate) fn replace_access_token(&self, access: &str) -> ApiResult<()> {
        self.storage
            .set(ACCESS_TOKEN_KEY, access)
            .map_err(|e| ApiError::storage(&e))?;

        let mut state = self.lock();
        state.access_token = Some(access.to_string());
        if state.refresh_token.is_none() {
            state.refresh_token = self.stored_refresh_token();
        }
        if state.is_authenticated() {
            state.status = SessionStatus::Authenticated;
        }
        Ok(())
    }

    /// Drops both tokens (persisted and in memory) and the user; back to idle.
    pub(crate) fn clear(&self) {
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!(key, error = %format!("{e:#}"), "failed to remove token from storage");
            }
        }

        let mut state = self.lock();
        state.access_token = None;
        state.refresh_token = None;
        state.user = None;
        state.status = SessionStatus::Idle;
    }

    /// Restores the session from storage without network access.
    ///
    /// Returns whether the session is authenticated afterwards.
    pub(crate) fn restore(&self) -> bool {
        let access = self.stored_access_token();
        let refresh = self.stored_refresh_token();

        match (access, refresh) {
            (Some(access), Some(refresh)) => {
                let mut state = self.lock();
                state.access_token = Some(access);
                state.refresh_token = Some(refresh);
                state.status = SessionStatus::Authenticated;
                true
            }
            (None, None) => {
                let mut state = self.lock();
                state.access_token = None;
                state.refresh_token = None;
                state.status = SessionStatus::Idle;
                false
            }
            _ => {
                tracing::warn!("found a partial token pair in storage, discarding it");
                self.clear();
                false
            }
        }
    }

    pub(crate) fn set_user(&self, user: UserProfile) {
        self.lock().user = Some(user);
    }

    pub(crate) fn set_error(&self, message: &str) {
        self.lock().error = Some(message.to_string());
    }

    pub fn clear_error(&self) {
        self.lock().error = None;
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn store_with(entries: &[(&str, &str)]) -> SessionStore {
        SessionStore::new(Arc::new(MemoryStorage::with_entries(
            entries.iter().map(|(k, v)| (*k, *v)),
        )))
    }

    #[test]
    fn test_restore_with_both_tokens() {
        let store = store_with(&[(ACCESS_TOKEN_KEY, "a1"), (REFRESH_TOKEN_KEY, "r1")]);
        assert!(store.restore());
        assert_eq!(store.status(), SessionStatus::Authenticated);
        assert_eq!(store.authorization_header().as_deref(), Some("Bearer a1"));
    }

    #[test]
    fn test_restore_with_one_token_discards_it() {
        let store = store_with(&[(ACCESS_TOKEN_KEY, "a1")]);
        assert!(!store.restore());
        assert!(!store.is_authenticated());
        assert!(store.authorization_header().is_none());
        assert!(store.stored_access_token().is_none());
    }

    #[test]
    fn test_failed_login_keeps_existing_session() {
        let store = store_with(&[]);
        store.establish("a1", "r1", None).unwrap();
        store.begin();
        store.fail_login("Invalid credentials");

        let session = store.snapshot();
        assert_eq!(session.status, SessionStatus::Authenticated);
        assert_eq!(session.error.as_deref(), Some("Invalid credentials"));
        assert_eq!(store.stored_refresh_token().as_deref(), Some("r1"));
    }

    #[test]
    fn test_failed_login_without_session() {
        let store = store_with(&[]);
        store.begin();
        store.fail_login("Login failed");
        assert_eq!(store.status(), SessionStatus::Failed);
        assert!(store.authorization_header().is_none());
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let mut user = UserProfile {
            username: "admin".into(),
            first_name: Some("  ".into()),
            ..UserProfile::default()
        };
        assert_eq!(user.display_name(), "admin");
        user.first_name = Some("Ada".into());
        assert_eq!(user.display_name(), "Ada");
    }

    #[test]
    fn test_profile_ignores_unknown_fields() {
        let user: UserProfile = serde_json::from_str(
            r#"{"id": 1, "username": "admin", "is_staff": true, "permissions": ["send_newsletters"]}"#,
        )
        .unwrap();
        assert_eq!(user.username, "admin");
        assert_eq!(user.permissions, vec!["send_newsletters"]);
    }
}
