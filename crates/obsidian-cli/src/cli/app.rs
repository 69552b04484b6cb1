//! Shared state for command handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use obsidian_core::api::ApiClient;
use obsidian_core::auth::{Session, SessionStore};
use obsidian_core::config::Config;
use obsidian_core::consent::ConsentStore;
use obsidian_core::guard::{GuardOutcome, RouteGuard};
use obsidian_core::router::{AdminRoute, Location, Navigator};
use obsidian_core::storage::FileStorage;

/// Navigator for a terminal: there is no page to reload, so a forced
/// navigation to the login route becomes a hint on stderr.
struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn hard_redirect(&self, to: &str) {
        tracing::info!(to, "session ended");
        eprintln!("Session expired. Run `obsidian login <username>` to sign in again.");
    }

    fn redirect(&self, to: &str, from: Option<&Location>) {
        tracing::debug!(to, from = ?from.map(ToString::to_string), "sign-in required");
    }
}

pub struct App {
    client: Arc<ApiClient>,
}

impl App {
    pub fn open(config: Config) -> Result<Self> {
        let storage = FileStorage::open_default().context("open client storage")?;
        let session = Arc::new(SessionStore::new(Arc::new(storage)));
        let client = ApiClient::from_config(&config, session, Arc::new(TerminalNavigator))?;
        tracing::debug!(base_url = client.base_url(), "client ready");

        Ok(Self {
            client: Arc::new(client),
        })
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn consent(&self) -> ConsentStore {
        ConsentStore::new(Arc::clone(self.client.session().storage()))
    }

    /// Restores the stored session and loads the profile before an admin
    /// command runs.
    pub async fn require_admin(&self, route: AdminRoute) -> Result<Session> {
        let guard = RouteGuard::new(Arc::clone(&self.client));
        let location = route.location();

        match guard
            .guard(&|session: &Session| session.clone(), &location)
            .await
        {
            GuardOutcome::Render(session) => Ok(session),
            GuardOutcome::Redirect { from, .. } => anyhow::bail!(
                "Not signed in (needed for {from}). Run `obsidian login <username>` first."
            ),
            GuardOutcome::Loading => anyhow::bail!("Session is still loading"),
        }
    }
}
