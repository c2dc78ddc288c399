//! Configuration resolution for Hoist.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (`<config dir>/hoist/settings.json`)
//! 3. Environment variables
//! 4. CLI arguments (highest priority, applied by the binary)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Complete Hoist configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub install: InstallDefaults,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerSettings {
    pub port: u16,
    pub log_level: String,
    /// Interval between SSE keep-alive comments (seconds).
    pub keepalive_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 4000,
            log_level: "info".to_string(),
            keepalive_secs: 15,
        }
    }
}

/// Defaults applied to install requests that leave fields empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InstallDefaults {
    pub region: String,
    pub instance_type: String,
    pub num_instances: u32,
    /// Pause between steps of the simulated provisioning workflow (ms).
    pub step_delay_ms: u64,
}

impl Default for InstallDefaults {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            instance_type: "m3.medium".to_string(),
            num_instances: 1,
            step_delay_ms: 250,
        }
    }
}

/// Load configuration with hierarchical resolution.
pub fn load_config() -> Result<Config> {
    load_config_from(global_config_path().as_deref())
}

/// Load configuration using an explicit settings file (if it exists).
pub fn load_config_from(settings_path: Option<&Path>) -> Result<Config> {
    let mut config = match settings_path {
        Some(path) if path.exists() => load_config_file(path)?,
        _ => Config::default(),
    };

    apply_env_overrides(&mut config);

    Ok(config)
}

/// Get the global config file path.
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("hoist").join("settings.json"))
}

fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(val) = std::env::var("HOIST_PORT")
        && let Ok(n) = val.parse()
    {
        config.server.port = n;
    }
    if let Ok(val) = std::env::var("HOIST_LOG_LEVEL") {
        config.server.log_level = val;
    }
    if let Ok(val) = std::env::var("HOIST_KEEPALIVE_SECS")
        && let Ok(n) = val.parse()
    {
        config.server.keepalive_secs = n;
    }
    if let Ok(val) = std::env::var("HOIST_STEP_DELAY_MS")
        && let Ok(n) = val.parse()
    {
        config.install.step_delay_ms = n;
    }
}
