//! # Simbridge Communication
//!
//! Serial framing protocol and link management for simbridge.
//! Decodes the simulator's `$`-framed serial stream into typed events,
//! encodes host commands, and runs the reconnecting bridge loop.

pub mod bridge;
pub mod communication;
pub mod protocol;

pub use bridge::{Bridge, BridgeHandle, BridgeOptions, CommandSender, DEFAULT_RECONNECT_COOLDOWN};

pub use communication::{
    find_device, list_ports, ConnectionParams, Link, LinkOpener, LinkWriter, SerialOpener,
    SerialPortInfo, AUTO_PORT, DEFAULT_BAUD_RATE, DEFAULT_READ_TIMEOUT,
};

pub use protocol::{encode_command, parse_command, parse_text_frame, FrameDecoder, FrameOutcome};
