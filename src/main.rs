use clap::Parser;
use simbridge::{bridge_options, connection_params, init_logging, Cli, RelayOptions};
use simbridge_communication::{list_ports, Bridge, SerialOpener};
use simbridge_core::{EventBus, EventBusConfig, EventSink};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    if cli.list_ports {
        for port in list_ports()? {
            let marker = if port.is_simulator_device() { "*" } else { " " };
            println!("{} {}  {}", marker, port.port_name, port.description);
        }
        return Ok(());
    }

    let config = cli.resolve_config()?;
    tracing::info!(
        "simbridge {} on port {} at {} baud",
        env!("CARGO_PKG_VERSION"),
        config.serial.port,
        config.serial.baud_rate
    );

    let bus = Arc::new(EventBus::with_config(EventBusConfig {
        channel_capacity: config.relay.event_capacity,
    }));
    let events = bus.receiver();
    let sink: Arc<dyn EventSink> = bus.clone();

    let handle = Bridge::new(SerialOpener::new(connection_params(&config)), sink)
        .with_options(bridge_options(&config))
        .spawn()?;

    let relay_options = RelayOptions {
        uppercase_hex: config.relay.uppercase_hex,
    };
    let outbound = tokio::spawn(simbridge::forward_events(
        events,
        tokio::io::stdout(),
        relay_options,
    ));
    // stdin reads block and cannot be cancelled
    let commands = handle.commands();
    std::thread::Builder::new()
        .name("simbridge-stdin".to_string())
        .spawn(move || {
            if let Err(e) = simbridge::forward_commands(std::io::stdin().lock(), &commands) {
                tracing::warn!("Command input closed: {}", e);
            }
        })?;

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            tracing::info!("Interrupted, shutting down");
        }
        result = outbound => {
            if let Ok(Err(e)) = result {
                tracing::warn!("Event output closed: {}", e);
            }
        }
    }

    handle.shutdown().await;
    Ok(())
}
