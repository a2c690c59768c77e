//! Configuration loading traits and types.
//!
//! Every robot base tool reads a single TOML file. The [`ConfigLoader`]
//! blanket trait gives any deserializable struct a `load()` constructor.
//!
//! # Usage
//!
//! ```rust,no_run
//! use robobase_common::config::{ConfigError, ConfigLoader, SharedConfig};
//! use serde::Deserialize;
//! use std::path::Path;
//!
//! #[derive(Debug, Deserialize)]
//! struct ToolConfig {
//!     shared: SharedConfig,
//! }
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = ToolConfig::load(Path::new("monitor.toml"))?;
//!     config.shared.validate()?;
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for configuration loading and validation.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file does not exist.
    #[error("configuration file not found: {0}")]
    NotFound(PathBuf),

    /// File exists but could not be read.
    #[error("failed to read {path}: {reason}")]
    Io { path: PathBuf, reason: String },

    /// TOML syntax or schema mismatch.
    #[error("failed to parse configuration: {0}")]
    Parse(String),

    /// Values parsed but are semantically invalid.
    #[error("configuration validation failed: {0}")]
    Invalid(String),
}

/// Log verbosity, lowercase in TOML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub const fn as_directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Fields common to every robot base tool configuration.
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "base-monitor-sim"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Instance identifier used in log output.
    pub service_name: String,
}

impl SharedConfig {
    /// Reject an empty `service_name`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.trim().is_empty() {
            return Err(ConfigError::Invalid("service_name cannot be empty".into()));
        }
        Ok(())
    }
}

/// Load a configuration struct from a TOML file.
///
/// - `ConfigError::NotFound` if the path does not exist
/// - `ConfigError::Io` for any other read failure
/// - `ConfigError::Parse` on TOML errors
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::Io {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                }
            }
        })?;
        tracing::debug!("loaded {} bytes of configuration from {}", content.len(), path.display());
        Self::from_toml(&content)
    }

    fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
