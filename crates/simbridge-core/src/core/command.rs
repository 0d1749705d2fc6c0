//! Host-to-device commands

use crate::error::CommandError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Control input destined for the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Drive a simulated GPIO input (`$I`)
    GpioInput {
        /// Pin number.
        pin: i32,
        /// Level to apply.
        value: i32,
    },
    /// Rotate the selector dial by a number of detents (`$D`)
    DialDelta {
        /// Signed detent count.
        delta: i32,
    },
}

impl Command {
    /// Topic observers publish this command on
    pub fn topic(&self) -> &'static str {
        match self {
            Command::GpioInput { .. } => "gpio_input",
            Command::DialDelta { .. } => "dial_delta",
        }
    }

    /// Build a command from an observer message
    ///
    /// `gpio_input` carries `{"pin", "val"}` and `dial_delta` carries
    /// `{"delta"}`. Fields must be integers (or strings holding one) that fit
    /// in 32 bits. A `dial_delta` without `delta` is a zero step.
    pub fn from_message(topic: &str, body: &Value) -> Result<Self, CommandError> {
        match topic {
            "gpio_input" => Ok(Command::GpioInput {
                pin: required_int(topic, body, "pin")?,
                value: required_int(topic, body, "val")?,
            }),
            "dial_delta" => {
                let delta = match body.get("delta") {
                    None | Some(Value::Null) => 0,
                    Some(_) => required_int(topic, body, "delta")?,
                };
                Ok(Command::DialDelta { delta })
            }
            other => Err(CommandError::UnknownTopic {
                topic: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::GpioInput { pin, value } => write!(f, "GPIO input {} = {}", pin, value),
            Command::DialDelta { delta } => write!(f, "Dial {:+}", delta),
        }
    }
}

fn required_int(topic: &str, body: &Value, field: &str) -> Result<i32, CommandError> {
    let value = body.get(field).ok_or_else(|| CommandError::MissingField {
        topic: topic.to_string(),
        field: field.to_string(),
    })?;

    let parsed = match value {
        Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    };

    parsed.ok_or_else(|| CommandError::InvalidField {
        topic: topic.to_string(),
        field: field.to_string(),
    })
}
