//! Configuration for rawline.
//!
//! Settings come from `~/.rawline/config.toml`, then environment overrides:
//!
//! ```toml
//! # Encoding of multi-byte console input: UTF-8, UTF-16, UTF-32,
//! # or any other name for a single-byte code page
//! input_encoding = "UTF-8"
//!
//! # true: always read through the native console
//! # false: always read through the given stream
//! # unset: native console only when reading the process console
//! direct_console = true
//! ```
//!
//! | Variable | Overrides |
//! |----------|-----------|
//! | `RAWLINE_INPUT_ENCODING` | `input_encoding` |
//! | `RAWLINE_DIRECT_CONSOLE` | `direct_console` (`true`/`false`, anything else = auto) |

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::replay::Encoding;

pub const ENCODING_ENV: &str = "RAWLINE_INPUT_ENCODING";
pub const DIRECT_CONSOLE_ENV: &str = "RAWLINE_DIRECT_CONSOLE";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Read(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input encoding name
    pub input_encoding: String,
    /// Direct console override (None = auto-detect)
    pub direct_console: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_encoding: "UTF-8".to_string(),
            direct_console: None,
        }
    }
}

impl Config {
    /// Load configuration from the default file plus environment overrides.
    ///
    /// A missing or unreadable file falls back to defaults.
    pub fn load() -> Self {
        let config = match Self::config_path() {
            Some(path) if path.exists() => match Self::load_from(&path) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Ignoring {}: {}", path.display(), e);
                    Self::default()
                }
            },
            _ => Self::default(),
        };
        config.with_env_overrides()
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Apply `RAWLINE_*` environment variables.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var(ENCODING_ENV).ok(),
            std::env::var(DIRECT_CONSOLE_ENV).ok(),
        )
    }

    fn with_overrides(mut self, encoding: Option<String>, direct: Option<String>) -> Self {
        if let Some(encoding) = encoding {
            self.input_encoding = encoding;
        }
        if let Some(direct) = direct {
            self.direct_console = parse_tri_state(&direct);
        }
        self
    }

    /// Encoding derived from `input_encoding`.
    pub fn encoding(&self) -> Encoding {
        Encoding::from_name(&self.input_encoding)
    }

    /// Default config file path.
    pub fn config_path() -> Option<PathBuf> {
        home_dir().map(|home| home.join(".rawline").join("config.toml"))
    }
}

fn parse_tri_state(value: &str) -> Option<bool> {
    match value {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

// Get home directory
pub(crate) fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE")
        .or_else(|| std::env::var_os("HOME"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.encoding(), Encoding::Utf8);
        assert_eq!(config.direct_console, None);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "input_encoding = \"UTF-16\"").unwrap();
        writeln!(file, "direct_console = false").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.encoding(), Encoding::Utf16);
        assert_eq!(config.direct_console, Some(false));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "direct_console = true").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.input_encoding, "UTF-8");
        assert_eq!(config.direct_console, Some(true));
    }

    #[test]
    fn test_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "direct_console = \"maybe\"").unwrap();

        assert!(matches!(
            Config::load_from(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::load_from(&dir.path().join("none.toml")),
            Err(ConfigError::Read(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let config = Config::default().with_overrides(Some("Cp850".into()), Some("true".into()));
        assert_eq!(config.encoding(), Encoding::SingleByte);
        assert_eq!(config.direct_console, Some(true));

        // Anything but true/false means auto-detect
        let config = config.with_overrides(None, Some("auto".into()));
        assert_eq!(config.direct_console, None);
        assert_eq!(config.input_encoding, "Cp850");
    }
}
