//! Route guard for admin views.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::auth::{Session, SessionStatus};
use crate::router::Location;

/// Any view that should only render for an authenticated session.
pub trait ProtectedView {
    type Output;

    fn render(&self, session: &Session) -> Self::Output;
}

impl<F, T> ProtectedView for F
where
    F: Fn(&Session) -> T,
{
    type Output = T;

    fn render(&self, session: &Session) -> T {
        self(session)
    }
}

/// Result of rendering through the guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome<T> {
    /// Session still resolving; show a loading indicator and nothing else.
    Loading,
    /// Sent to the login route; `from` is where the user was heading.
    Redirect { to: String, from: Location },
    Render(T),
}

impl<T> GuardOutcome<T> {
    pub fn into_rendered(self) -> Option<T> {
        match self {
            GuardOutcome::Render(output) => Some(output),
            GuardOutcome::Loading | GuardOutcome::Redirect { .. } => None,
        }
    }
}

pub struct RouteGuard {
    client: Arc<ApiClient>,
}

impl RouteGuard {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Restores the session and, when authenticated, loads the profile.
    ///
    /// Profile failures are logged and otherwise ignored.
    pub async fn mount(&self, location: &Location) {
        let auth = self.client.auth();
        if !auth.initialize() {
            tracing::debug!(%location, "no stored session");
            return;
        }

        if let Err(err) = auth.fetch_profile().await {
            tracing::warn!(%location, error = %err, "profile fetch failed");
        }
    }

    /// Renders `view` if the session allows it.
    pub fn render<V: ProtectedView>(
        &self,
        view: &V,
        location: &Location,
    ) -> GuardOutcome<V::Output> {
        let session = self.client.session().snapshot();

        if session.status == SessionStatus::Loading {
            return GuardOutcome::Loading;
        }

        if !session.is_authenticated() {
            let to = self.client.login_path().to_string();
            self.client.navigator().redirect(&to, Some(location));
            return GuardOutcome::Redirect {
                to,
                from: location.clone(),
            };
        }

        GuardOutcome::Render(view.render(&session))
    }

    /// `mount` followed by `render`.
    pub async fn guard<V: ProtectedView>(
        &self,
        view: &V,
        location: &Location,
    ) -> GuardOutcome<V::Output> {
        self.mount(location).await;
        self.render(view, location)
    }
}
