//! Durable client-side key/value storage.
//!
//! Holds the session tokens and the cookie-consent records. `FileStorage`
//! keeps every key in `<base>/storage.json` with restricted permissions (0600);
//! `MemoryStorage` backs tests and ephemeral sessions.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result};

use crate::config::paths;

/// Storage key for the short-lived access token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Storage key for the long-lived refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
/// Storage key for the cookie-consent record.
pub const COOKIE_CONSENT_KEY: &str = "obsidian-cookie-consent";
/// Storage key for personalization preferences.
pub const USER_PREFERENCES_KEY: &str = "obsidian-user-preferences";

/// String key/value store with browser-storage semantics.
///
/// Reads never fail; a missing or unreadable entry is simply absent.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// # Errors
    /// Returns an error if the value cannot be persisted.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removing a missing key is not an error.
    ///
    /// # Errors
    /// Returns an error if the removal cannot be persisted.
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates storage pre-populated with the given entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Mutex::new(entries),
        }
    }

    /// Returns every stored key, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock().remove(key);
        Ok(())
    }
}

/// JSON-file storage, written through on every mutation.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Opens the storage file at the default location.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open_default() -> Result<Self> {
        Self::open(paths::storage_path())
    }

    /// Opens (or lazily creates) the storage file at `path`.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read storage from {}", path.display()))?;
            if contents.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&contents)
                    .with_context(|| format!("Failed to parse storage from {}", path.display()))?
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents =
            serde_json::to_string_pretty(entries).context("Failed to serialize storage")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)
                .with_context(|| format!("Failed to open {} for writing", self.path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        #[cfg(not(unix))]
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&self.path)
                .with_context(|| format!("Failed to open {} for writing", self.path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.lock();
        let mut next = entries.clone();
        next.insert(key.to_string(), value.to_string());
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.lock();
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }
}
