//! Error handling for simbridge
//!
//! Provides the error taxonomy shared by every layer of the bridge:
//! - Frame parse errors (malformed headers/fields, recovered by the decoder)
//! - Link errors (serial I/O failures, absent device)
//! - Command errors (observer messages that do not describe a valid command)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Frame parse error type
///
/// Raised while decoding a single frame. The decoder never surfaces these to
/// the event sink: the frame is discarded and decoding resumes with the next
/// byte on the wire.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameParseError {
    /// Bitmap header was not four comma-separated decimal integers
    #[error("Malformed bitmap header: {header:?}")]
    MalformedHeader {
        /// The header text as received (terminator stripped).
        header: String,
    },

    /// Text frame had the wrong number of fields
    #[error("{kind} frame expected {expected} fields, found {found}")]
    FieldCount {
        /// Frame kind selector, e.g. `'R'`.
        kind: char,
        /// Number of fields required.
        expected: usize,
        /// Number of fields found.
        found: usize,
    },

    /// A field could not be parsed as the required number type
    #[error("{kind} frame field {index} is not a number: {value:?}")]
    InvalidField {
        /// Frame kind selector.
        kind: char,
        /// Zero-based field index.
        index: usize,
        /// The offending field text.
        value: String,
    },

    /// Unmarked line was empty after trimming
    #[error("Empty line")]
    EmptyLine,
}

/// Link error type
///
/// Represents failures of the serial link itself. These are surfaced to the
/// bridge loop, which drops the link and re-enters the reconnect cycle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// Read from the link failed
    #[error("Link read failed: {reason}")]
    ReadFailure {
        /// The reason the read failed.
        reason: String,
    },

    /// Write to the link failed
    #[error("Link write failed: {reason}")]
    WriteFailure {
        /// The reason the write failed.
        reason: String,
    },

    /// Link reached end of stream or was closed locally
    #[error("Link closed")]
    Closed,

    /// No device is connected
    #[error("No device link available")]
    Absent,

    /// Opening the port failed
    #[error("Failed to open port {port}: {reason}")]
    OpenFailed {
        /// The name of the port that failed to open.
        port: String,
        /// The reason the port failed to open.
        reason: String,
    },
}

impl LinkError {
    /// Wrap an I/O error raised by a read
    pub fn read(err: &std::io::Error) -> Self {
        LinkError::ReadFailure {
            reason: err.to_string(),
        }
    }

    /// Wrap an I/O error raised by a write
    pub fn write(err: &std::io::Error) -> Self {
        LinkError::WriteFailure {
            reason: err.to_string(),
        }
    }
}

/// Command error type
///
/// Raised by collaborators when an inbound observer message cannot be turned
/// into a [`Command`](crate::Command).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Message topic is not a known command
    #[error("Unknown command topic: {topic}")]
    UnknownTopic {
        /// The topic that was received.
        topic: String,
    },

    /// Required field missing
    #[error("Command {topic} is missing field '{field}'")]
    MissingField {
        /// The command topic.
        topic: String,
        /// The missing field name.
        field: String,
    },

    /// Field present but not an integer in range
    #[error("Command {topic} field '{field}' is not a 32-bit integer")]
    InvalidField {
        /// The command topic.
        topic: String,
        /// The offending field name.
        field: String,
    },
}

/// Main error type for simbridge
///
/// A unified error type that can represent any error from all layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Frame parse error
    #[error(transparent)]
    Frame(#[from] FrameParseError),

    /// Link error
    #[error(transparent)]
    Link(#[from] LinkError),

    /// Command error
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a link error
    pub fn is_link_error(&self) -> bool {
        matches!(self, Error::Link(_))
    }

    /// Check if this is a frame parse error
    pub fn is_frame_error(&self) -> bool {
        matches!(self, Error::Frame(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
