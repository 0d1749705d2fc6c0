//! # simbridge
//!
//! Host-side bridge for the washer simulator board. Reads the board's serial
//! stream, decodes it into typed events, and relays them to observers as
//! JSON lines; observer commands travel back to the board the same way.
//!
//! ## Architecture
//!
//! 1. **simbridge-core** - Events, commands, link state, errors, event bus
//! 2. **simbridge-communication** - Frame decoder, command encoder, serial
//!    link, and the reconnecting bridge loop
//! 3. **simbridge-settings** - Configuration files and validation
//! 4. **simbridge** - This binary: logging, CLI, and the JSON relay

pub mod cli;
pub mod relay;

pub use cli::Cli;
pub use relay::{event_message, forward_commands, forward_events, parse_command_line, RelayOptions};

use simbridge_communication::{BridgeOptions, ConnectionParams};
use simbridge_settings::BridgeConfig;
use std::time::Duration;

/// Initialize tracing/logging infrastructure
///
/// Logs go to stderr; stdout carries the relay stream. `RUST_LOG` directives
/// are honored on top of the default level.
pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_names(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Serial parameters for the configured device
pub fn connection_params(config: &BridgeConfig) -> ConnectionParams {
    let mut params = ConnectionParams::new(config.serial.port.clone());
    params.baud_rate = config.serial.baud_rate;
    params.read_timeout = Duration::from_millis(config.serial.read_timeout_ms);
    params
}

/// Bridge options for the configured reconnect policy
pub fn bridge_options(config: &BridgeConfig) -> BridgeOptions {
    BridgeOptions {
        reconnect_cooldown: Duration::from_millis(config.reconnect.cooldown_ms),
    }
}
