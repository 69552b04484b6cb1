//! Shared setup for client integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use obsidian_core::api::ApiClient;
use obsidian_core::auth::SessionStore;
use obsidian_core::router::History;
use obsidian_core::storage::{ACCESS_TOKEN_KEY, MemoryStorage, REFRESH_TOKEN_KEY, Storage};
use wiremock::MockServer;

pub struct Harness {
    pub server: MockServer,
    pub storage: Arc<MemoryStorage>,
    pub history: Arc<History>,
    pub client: ApiClient,
}

impl Harness {
    pub fn access_token(&self) -> Option<String> {
        self.storage.get(ACCESS_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.storage.get(REFRESH_TOKEN_KEY)
    }
}

/// Client against a fresh mock server with empty storage.
pub async fn harness() -> Harness {
    harness_with(MemoryStorage::new()).await
}

/// Client whose storage already holds a token pair, restored into the session.
pub async fn signed_in(access: &str, refresh: &str) -> Harness {
    let harness = harness_with(MemoryStorage::with_entries([
        (ACCESS_TOKEN_KEY, access),
        (REFRESH_TOKEN_KEY, refresh),
    ]))
    .await;
    assert!(harness.client.auth().initialize());
    harness
}

pub async fn harness_with(storage: MemoryStorage) -> Harness {
    let server = MockServer::start().await;
    let storage = Arc::new(storage);
    let history = Arc::new(History::new());
    let session = Arc::new(SessionStore::new(storage.clone()));
    let client = ApiClient::new(&server.uri(), session, history.clone()).unwrap();
    Harness {
        server,
        storage,
        history,
        client,
    }
}
