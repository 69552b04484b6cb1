//! Configuration management for Obsidian.
//!
//! Loads configuration from ${OBSIDIAN_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides the configured API base URL.
pub const API_URL_ENV: &str = "OBSIDIAN_API_URL";

fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for Obsidian configuration and data files.
    //!
    //! OBSIDIAN_HOME resolution order:
    //! 1. OBSIDIAN_HOME environment variable (if set)
    //! 2. ~/.config/obsidian (default)

    use std::path::PathBuf;

    /// Returns the Obsidian home directory.
    pub fn obsidian_home() -> PathBuf {
        if let Ok(home) = std::env::var("OBSIDIAN_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".obsidian"),
            |h| h.join(".config").join("obsidian"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        obsidian_home().join("config.toml")
    }

    /// Returns the path to the durable client storage file.
    pub fn storage_path() -> PathBuf {
        obsidian_home().join("storage.json")
    }

    /// Returns the directory that holds rotated log files.
    pub fn logs_dir() -> PathBuf {
        obsidian_home().join("logs")
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the backend API
    pub api_base_url: String,
    /// Route used for hard redirects when re-authentication is required
    pub login_path: String,
    /// Default tracing filter
    pub log_level: String,
}

impl Config {
    pub const DEFAULT_API_BASE_URL: &'static str = "http://localhost:8000";
    pub const DEFAULT_LOGIN_PATH: &'static str = "/admin/login";
    pub const DEFAULT_LOG_LEVEL: &'static str = "info";

    /// Loads configuration from the default path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Writes the default config template to `path`.
    ///
    /// # Errors
    /// Returns an error if a config already exists or the write fails.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Resolves the API base URL with precedence: env > config.
    ///
    /// # Errors
    /// Returns an error if the resolved URL is not well-formed.
    pub fn api_base_url(&self) -> Result<String> {
        resolve_base_url(
            std::env::var(API_URL_ENV).ok().as_deref(),
            &self.api_base_url,
        )
    }

    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: Self::DEFAULT_API_BASE_URL.to_string(),
            login_path: Self::DEFAULT_LOGIN_PATH.to_string(),
            log_level: Self::DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Picks the env override when it is non-blank, otherwise the configured value,
/// and validates the result. Trailing slashes are dropped.
fn resolve_base_url(env_value: Option<&str>, config_value: &str) -> Result<String> {
    let candidate = env_value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| config_value.trim());

    url::Url::parse(candidate).with_context(|| format!("Invalid API base URL: {candidate}"))?;
    Ok(candidate.trim_end_matches('/').to_string())
}
