//! Command encoder
//!
//! Host to device commands are single ASCII lines:
//! - `GpioInput { pin, value }` -> `$I<pin>,<value>\n`
//! - `DialDelta { delta }` -> `$D<delta>\n`

use super::{DIAL_DELTA_SELECTOR, GPIO_INPUT_SELECTOR, SIGIL, TERMINATOR};
use simbridge_core::{Command, FrameParseError};

/// Encode a command into its wire bytes
pub fn encode_command(command: &Command) -> Vec<u8> {
    let line = match command {
        Command::GpioInput { pin, value } => format!(
            "{}{}{},{}",
            SIGIL as char, GPIO_INPUT_SELECTOR, pin, value
        ),
        Command::DialDelta { delta } => {
            format!("{}{}{}", SIGIL as char, DIAL_DELTA_SELECTOR, delta)
        }
    };

    let mut bytes = line.into_bytes();
    bytes.push(TERMINATOR);
    bytes
}

/// Parse a command line as the device would
///
/// Accepts one encoded command with or without its terminator. Used by
/// device simulators and loopback tests.
pub fn parse_command(line: &[u8]) -> Result<Command, FrameParseError> {
    let text = String::from_utf8_lossy(line);
    let text = text.trim();

    let body = text
        .strip_prefix(SIGIL as char)
        .ok_or_else(|| FrameParseError::MalformedHeader {
            header: text.to_string(),
        })?;

    let mut chars = body.chars();
    let kind = chars.next().ok_or(FrameParseError::EmptyLine)?;
    let fields: Vec<&str> = chars.as_str().split(',').collect();

    let expected = match kind {
        GPIO_INPUT_SELECTOR => 2,
        DIAL_DELTA_SELECTOR => 1,
        _ => {
            return Err(FrameParseError::MalformedHeader {
                header: text.to_string(),
            })
        }
    };
    if fields.len() != expected {
        return Err(FrameParseError::FieldCount {
            kind,
            expected,
            found: fields.len(),
        });
    }

    let int = |index: usize| -> Result<i32, FrameParseError> {
        fields[index]
            .trim()
            .parse()
            .map_err(|_| FrameParseError::InvalidField {
                kind,
                index,
                value: fields[index].to_string(),
            })
    };

    Ok(match kind {
        GPIO_INPUT_SELECTOR => Command::GpioInput {
            pin: int(0)?,
            value: int(1)?,
        },
        _ => Command::DialDelta { delta: int(0)? },
    })
}
