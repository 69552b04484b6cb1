//! Tracing subscriber setup.
//!
//! Logs go to a daily-rotated file under `<base>/logs` so command output stays
//! clean; `verbose` sends them to stderr instead.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{Config, paths};

/// Environment variable holding a tracing filter directive.
pub const LOG_ENV: &str = "OBSIDIAN_LOG";

const LOG_FILE_PREFIX: &str = "obsidian";
const LOG_FILE_SUFFIX: &str = "log";

/// Keeps the background log writer alive; flushes on drop.
#[must_use = "dropping the guard stops file logging"]
pub struct LogGuard {
    _worker: Option<WorkerGuard>,
}

/// Installs the global tracing subscriber.
///
/// # Errors
/// Returns an error if the log directory cannot be created or a subscriber
/// is already installed.
pub fn init(config: &Config, verbose: bool) -> Result<LogGuard> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new(Config::DEFAULT_LOG_LEVEL));

    if verbose {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .context("Failed to install tracing subscriber")?;
        return Ok(LogGuard { _worker: None });
    }

    let appender = file_appender(&paths::logs_dir())?;
    let (writer, worker) = tracing_appender::non_blocking(appender);
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(LogGuard {
        _worker: Some(worker),
    })
}

fn file_appender(dir: &Path) -> Result<RollingFileAppender> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .build(dir)
        .with_context(|| format!("Failed to open log file in {}", dir.display()))
}
