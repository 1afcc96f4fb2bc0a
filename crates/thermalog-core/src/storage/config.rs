//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Device name shown to the companion device
//! - Preferred temperature unit for display and logging
//! - Whether companion sync is enabled
//!
//! Configuration is stored at `~/.config/thermalog/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::session::TemperatureUnit;

use super::data_dir;

/// Sync-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Human-readable name broadcast to the companion device.
    #[serde(default = "default_device_name")]
    pub device_name: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            device_name: default_device_name(),
        }
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/thermalog/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sync: SyncConfig,
    /// Unit used when logging temperatures from the CLI.
    #[serde(default = "default_unit")]
    pub temperature_unit: TemperatureUnit,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sync: SyncConfig::default(),
            temperature_unit: default_unit(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_device_name() -> String {
    "primary".to_string()
}

fn default_unit() -> TemperatureUnit {
    TemperatureUnit::Fahrenheit
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        data_dir()
            .map(|d| d.join("config.toml"))
            .map_err(|e| ConfigError::LoadFailed {
                path: PathBuf::from("~/.config/thermalog"),
                message: e.to_string(),
            })
    }

    /// Load the configuration, falling back to defaults if the file
    /// does not exist yet.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Persist the configuration.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.sync.enabled);
        assert_eq!(config.sync.device_name, "primary");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str("[sync]\ndevice_name = \"bathhouse\"\n").unwrap();
        assert!(config.sync.enabled);
        assert_eq!(config.sync.device_name, "bathhouse");
        assert_eq!(config.temperature_unit, TemperatureUnit::Fahrenheit);
    }
}
