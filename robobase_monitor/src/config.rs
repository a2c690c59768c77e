//! Simulation configuration loader.
//!
//! One TOML file with a `[shared]` section and an optional `[monitor]`
//! section. Missing monitor keys fall back to the firmware constants.

use std::path::Path;

use robobase_common::config::{ConfigError, ConfigLoader, SharedConfig};
use robobase_common::monitor::config::MonitorConfig;
use serde::Deserialize;

/// On-disk layout.
#[derive(Debug, Clone, Deserialize)]
pub struct SimConfig {
    pub shared: SharedConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
}

/// Validated configuration, ready for runtime use.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub shared: SharedConfig,
    pub monitor: MonitorConfig,
}

/// Load and validate the configuration at `path`.
pub fn load_config(path: &Path) -> Result<LoadedConfig, ConfigError> {
    let raw = SimConfig::load(path)?;
    validate(raw)
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<LoadedConfig, ConfigError> {
    validate(SimConfig::from_toml(content)?)
}

fn validate(raw: SimConfig) -> Result<LoadedConfig, ConfigError> {
    raw.shared.validate()?;
    raw.monitor.validate()?;
    Ok(LoadedConfig {
        shared: raw.shared,
        monitor: raw.monitor,
    })
}
