//! Serial link management
//!
//! A [`Link`] is one open connection to the device, split into the read half
//! owned by the bridge's reader thread and the write half placed behind the
//! shared [`LinkWriter`]. Links come from a [`LinkOpener`], which the bridge
//! calls on startup and after every failure.

pub mod serial;
pub mod writer;

use simbridge_core::LinkError;
use std::io::{Read, Write};
use std::time::Duration;

pub use serial::{find_device, list_ports, SerialOpener, SerialPortInfo};
pub use writer::LinkWriter;

/// Port name that requests device discovery
pub const AUTO_PORT: &str = "Auto";

/// Default serial baud rate of the simulator firmware
pub const DEFAULT_BAUD_RATE: u32 = 1_000_000;

/// Default bounded wait for a single read
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Connection parameters for the serial link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    /// Port name (`/dev/ttyUSB0`, `COM3`) or [`AUTO_PORT`]
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Bounded wait for a single read
    pub read_timeout: Duration,
}

impl ConnectionParams {
    /// Parameters for a specific port with default line settings
    ///
    /// Surrounding whitespace is stripped from the port name.
    pub fn new(port: impl Into<String>) -> Self {
        let port: String = port.into();
        Self {
            port: port.trim().to_string(),
            ..Self::default()
        }
    }

    /// Check whether the port should be discovered on each attempt
    pub fn is_auto(&self) -> bool {
        let port = self.port.trim();
        port.is_empty() || port.eq_ignore_ascii_case(AUTO_PORT)
    }
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self {
            port: AUTO_PORT.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// An open connection to the device
pub struct Link {
    /// Human-readable name for logging
    pub name: String,
    /// Read half, used only by the reader thread
    pub reader: Box<dyn Read + Send>,
    /// Write half, handed to the [`LinkWriter`]
    pub writer: Box<dyn Write + Send>,
}

impl Link {
    /// Assemble a link from its halves
    pub fn new(
        name: impl Into<String>,
        reader: impl Read + Send + 'static,
        writer: impl Write + Send + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            reader: Box::new(reader),
            writer: Box::new(writer),
        }
    }
}

impl std::fmt::Debug for Link {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Link").field("name", &self.name).finish()
    }
}

/// Source of links for the bridge
///
/// Returns [`LinkError::Absent`] when no device is present, or
/// [`LinkError::OpenFailed`] when one is present but cannot be opened.
pub trait LinkOpener: Send + 'static {
    /// Attempt to open a link
    fn open(&mut self) -> Result<Link, LinkError>;
}

impl<F> LinkOpener for F
where
    F: FnMut() -> Result<Link, LinkError> + Send + 'static,
{
    fn open(&mut self) -> Result<Link, LinkError> {
        self()
    }
}
