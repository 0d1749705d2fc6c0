//! Link state machine
//!
//! `Disconnected -> Connecting -> Connected -> Disconnected`, forever. Decoding
//! and command writes only happen while `Connected`.

use serde::{Deserialize, Serialize};

/// Connection state of the serial link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LinkState {
    /// No link is open; commands are discarded
    #[default]
    Disconnected,
    /// Discovering or opening the port
    Connecting,
    /// Link open, decoder running
    Connected,
}

impl LinkState {
    /// Check whether decode and encode may run
    pub fn is_connected(&self) -> bool {
        matches!(self, LinkState::Connected)
    }
}

impl std::fmt::Display for LinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkState::Disconnected => write!(f, "Disconnected"),
            LinkState::Connecting => write!(f, "Connecting"),
            LinkState::Connected => write!(f, "Connected"),
        }
    }
}
