//! Simbridge Settings Crate
//!
//! Handles bridge configuration: serial line settings, reconnect behavior,
//! and relay options, loaded from TOML or JSON files.

pub mod config;
pub mod error;

pub use config::{default_config_path, BridgeConfig, ReconnectSettings, RelaySettings, SerialSettings};
pub use error::{ConfigError, SettingsError, SettingsResult};
