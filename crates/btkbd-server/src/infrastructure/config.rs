//! TOML configuration for `btkbd`.
//!
//! Read from the path given with `--config` / `BTKBD_CONFIG`, otherwise from
//! [`DEFAULT_CONFIG_PATH`].  Every field is optional:
//!
//! ```toml
//! [bluetooth]
//! adapter = "hci0"
//! profile_name = "btkbd keyboard"
//! service_record = "/usr/share/btkbd/service_record.xml"
//!
//! [logging]
//! level = "info"
//! ```
//!
//! # Serde default values
//!
//! Fields annotated with `#[serde(default = "some_fn")]` take the value of
//! `some_fn()` when absent, so an empty file (or no file at all) yields
//! [`AppConfig::default()`].
//!
//! The L2CAP PSMs, report delay, and HID UUID are protocol constants and are
//! not configurable.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Location read when no path is given explicitly.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/btkbd/config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub bluetooth: BluetoothConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BluetoothConfig {
    /// BlueZ adapter name, e.g. `hci0`.
    #[serde(default = "default_adapter")]
    pub adapter: String,
    /// Name announced with the profile registration.
    #[serde(default = "default_profile_name")]
    pub profile_name: String,
    /// SDP record XML file.  The built-in record is used when absent.
    #[serde(default)]
    pub service_record: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_adapter() -> String {
    "hci0".to_string()
}
fn default_profile_name() -> String {
    "btkbd keyboard".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for BluetoothConfig {
    fn default() -> Self {
        Self {
            adapter: default_adapter(),
            profile_name: default_profile_name(),
            service_record: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Loads the configuration.
///
/// With `Some(path)` the file must exist.  With `None`, [`DEFAULT_CONFIG_PATH`]
/// is tried and a missing file yields [`AppConfig::default()`].
///
/// # Errors
///
/// [`ConfigError::Io`] for unreadable files, [`ConfigError::Parse`] for
/// malformed TOML or unknown keys.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let (path, required) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    };

    match std::fs::read_to_string(&path) {
        Ok(content) => parse_config(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
            Ok(AppConfig::default())
        }
        Err(source) => Err(ConfigError::Io { path, source }),
    }
}

/// Parses configuration TOML.
///
/// # Errors
///
/// [`ConfigError::Parse`] if the text is not valid TOML for [`AppConfig`].
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
