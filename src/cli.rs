//! Command line interface

use clap::Parser;
use simbridge_settings::{default_config_path, BridgeConfig};
use std::path::PathBuf;

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATE"), ")");

/// Bridge a washer simulator board to JSON observers on stdin/stdout
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "simbridge", version, long_version = LONG_VERSION, about)]
pub struct Cli {
    /// Serial port to open, or "Auto" to search for the board
    pub port: Option<String>,

    /// Serial baud rate
    #[arg(short, long)]
    pub baud: Option<u32>,

    /// Config file (.toml or .json)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Wait between reconnect attempts, in milliseconds
    #[arg(long, value_name = "MS")]
    pub cooldown_ms: Option<u64>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,

    /// List serial ports and exit
    #[arg(long)]
    pub list_ports: bool,
}

impl Cli {
    /// Load the config file and apply command line overrides
    ///
    /// An explicit `--config` must exist. The default location is optional.
    pub fn resolve_config(&self) -> anyhow::Result<BridgeConfig> {
        let mut config = match &self.config {
            Some(path) => BridgeConfig::load_from_file(path)?,
            None => match default_config_path() {
                Ok(path) => BridgeConfig::load_or_default(&path)?,
                Err(e) => {
                    tracing::debug!("{}, using defaults", e);
                    BridgeConfig::default()
                }
            },
        };

        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut BridgeConfig) {
        if let Some(port) = &self.port {
            config.serial.port = port.clone();
        }
        if let Some(baud) = self.baud {
            config.serial.baud_rate = baud;
        }
        if let Some(cooldown_ms) = self.cooldown_ms {
            config.reconnect.cooldown_ms = cooldown_ms;
        }
    }
}
