//! JSON line relay between the bridge and its observers
//!
//! Outbound, every event becomes one line `{"topic": ..., "data": {...}}`.
//! Inbound, each line of the same shape is validated into a [`Command`] and
//! queued for the device. Malformed input lines are logged and skipped.

use serde_json::{json, Value};
use simbridge_communication::CommandSender;
use simbridge_core::{Command, Error, Event, Result};
use std::io::BufRead;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast;

/// Relay formatting options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayOptions {
    pub uppercase_hex: bool,
}

impl Default for RelayOptions {
    fn default() -> Self {
        Self {
            uppercase_hex: true,
        }
    }
}

/// Observer message for one event
pub fn event_message(event: &Event, options: RelayOptions) -> Value {
    let mut data = event.to_payload();
    if !options.uppercase_hex {
        if let Some(Value::String(hex)) = data.get_mut("data") {
            hex.make_ascii_lowercase();
        }
    }
    json!({ "topic": event.topic(), "data": data })
}

/// Parse one inbound observer line
///
/// Blank lines yield `Ok(None)`.
pub fn parse_command_line(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let message: Value =
        serde_json::from_str(line).map_err(|e| Error::other(format!("Invalid JSON: {}", e)))?;
    let topic = message
        .get("topic")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::other("Message has no topic"))?;
    let data = message.get("data").unwrap_or(&Value::Null);

    Ok(Some(Command::from_message(topic, data)?))
}

/// Write every event from `events` to `out` until the bus closes
///
/// A slow writer loses the oldest events rather than stalling the bridge.
pub async fn forward_events<W>(
    mut events: broadcast::Receiver<Event>,
    mut out: W,
    options: RelayOptions,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!("Observer fell behind, {} events dropped", skipped);
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => return Ok(()),
        };

        let mut line = event_message(&event, options).to_string();
        line.push('\n');
        out.write_all(line.as_bytes()).await?;
        out.flush().await?;
    }
}

/// Queue a command for every valid line read from `input`
///
/// Blocks the calling thread. Returns when the input ends or the bridge
/// stops accepting commands.
pub fn forward_commands<R: BufRead>(input: R, commands: &CommandSender) -> std::io::Result<()> {
    for line in input.lines() {
        match parse_command_line(&line?) {
            Ok(Some(command)) => {
                if commands.send(command).is_err() {
                    tracing::debug!("Bridge stopped, no longer reading commands");
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Ignoring observer message: {}", e),
        }
    }
    Ok(())
}
