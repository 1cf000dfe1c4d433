//! File logging
//!
//! The library owns the console, so log output goes to
//! `~/.rawline/rawline.log` instead. The level comes from `RAWLINE_LOG`
//! (`tracing_subscriber::EnvFilter` syntax, default `info`).

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::Subscriber;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::home_dir;

pub const LOG_ENV: &str = "RAWLINE_LOG";

/// Default log file path.
pub fn log_path() -> PathBuf {
    home_dir()
        .map(|h| h.join(".rawline").join("rawline.log"))
        .unwrap_or_else(|| PathBuf::from("rawline.log"))
}

/// Install a global subscriber writing to the default log file.
pub fn init() -> io::Result<()> {
    init_with_path(&log_path())
}

/// Install a global subscriber appending to `path`.
///
/// Does nothing if another subscriber is already installed.
pub fn init_with_path(path: &Path) -> io::Result<()> {
    if tracing::subscriber::set_global_default(file_subscriber(path)?).is_err() {
        tracing::debug!("Global subscriber already set; keeping it");
    }
    Ok(())
}

/// Subscriber appending plain-text events to `path`.
pub fn file_subscriber(path: &Path) -> io::Result<impl Subscriber + Send + Sync + 'static> {
    // Create log directory if needed
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    Ok(FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .finish())
}
