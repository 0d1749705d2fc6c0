//! Configuration for the simbridge host bridge
//!
//! Configuration is organized into sections:
//! - Serial line settings (port, baud rate, read timeout)
//! - Reconnect behavior
//! - Relay options for the JSON observer stream
//!
//! Files may be TOML or JSON, chosen by extension.

use crate::error::{ConfigError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Serial line settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialSettings {
    /// Device path, or "Auto" to search for the simulator
    pub port: String,
    /// Line speed
    pub baud_rate: u32,
    /// Upper bound on a single blocking read, in milliseconds
    pub read_timeout_ms: u64,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            port: "Auto".to_string(),
            baud_rate: 1_000_000,
            read_timeout_ms: 100,
        }
    }
}

/// Reconnect settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectSettings {
    /// Wait between connection attempts, in milliseconds
    pub cooldown_ms: u64,
}

impl Default for ReconnectSettings {
    fn default() -> Self {
        Self { cooldown_ms: 1000 }
    }
}

/// Observer relay settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelaySettings {
    /// Broadcast capacity of the event bus
    pub event_capacity: usize,
    /// Render bitmap payloads as uppercase hex
    pub uppercase_hex: bool,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            event_capacity: 1024,
            uppercase_hex: true,
        }
    }
}

/// Complete bridge configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BridgeConfig {
    pub serial: SerialSettings,
    pub reconnect: ReconnectSettings,
    pub relay: RelaySettings,
}

#[derive(Clone, Copy)]
enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> Result<Format, ConfigError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(ConfigError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}

fn out_of_range(key: &str, value: impl ToString) -> ConfigError {
    ConfigError::ValueOutOfRange {
        key: key.to_string(),
        value: value.to_string(),
    }
}

impl BridgeConfig {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    ///
    /// Missing sections and keys take their defaults.
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path)?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load `path` if it exists, otherwise return defaults
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    ///
    /// Creates the parent directory if needed.
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.serial.baud_rate == 0 {
            return Err(out_of_range("serial.baud_rate", self.serial.baud_rate));
        }

        if self.serial.read_timeout_ms == 0 {
            return Err(out_of_range(
                "serial.read_timeout_ms",
                self.serial.read_timeout_ms,
            ));
        }

        if self.reconnect.cooldown_ms == 0 {
            return Err(out_of_range(
                "reconnect.cooldown_ms",
                self.reconnect.cooldown_ms,
            ));
        }

        if self.relay.event_capacity == 0 {
            return Err(out_of_range(
                "relay.event_capacity",
                self.relay.event_capacity,
            ));
        }

        Ok(())
    }
}

/// Default config location: `<config_dir>/simbridge/config.toml`
pub fn default_config_path() -> SettingsResult<PathBuf> {
    let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDirectory)?;
    Ok(dir.join("simbridge").join("config.toml"))
}
