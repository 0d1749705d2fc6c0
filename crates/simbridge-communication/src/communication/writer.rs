//! Serialized write path to the link
//!
//! Every encoded command is written while holding the writer lock, so
//! concurrent senders can never interleave bytes on the wire. The raw port
//! handle never leaves this type.

use crate::protocol::encode_command;
use parking_lot::Mutex;
use simbridge_core::{Command, LinkError};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared, lock-guarded write half of the current link
///
/// Cloning is cheap; all clones write to the same link. While no link is
/// attached every write fails with [`LinkError::Absent`].
#[derive(Clone, Default)]
pub struct LinkWriter {
    port: Arc<Mutex<Option<Box<dyn Write + Send>>>>,
    faulted: Arc<AtomicBool>,
}

impl LinkWriter {
    /// Create a writer with no link attached
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the write half of a freshly opened link
    pub fn attach(&self, port: Box<dyn Write + Send>) {
        *self.port.lock() = Some(port);
        self.faulted.store(false, Ordering::SeqCst);
    }

    /// Drop the current link, if any
    ///
    /// Returns true if a link was attached.
    pub fn detach(&self) -> bool {
        self.port.lock().take().is_some()
    }

    /// Check whether a link is attached
    pub fn is_attached(&self) -> bool {
        self.port.lock().is_some()
    }

    /// Check whether the last write failed since the link was attached
    pub fn is_faulted(&self) -> bool {
        self.faulted.load(Ordering::SeqCst)
    }

    /// Encode and write one command atomically
    pub fn send(&self, command: &Command) -> Result<(), LinkError> {
        self.write_frame(&encode_command(command))
    }

    /// Write one complete frame atomically
    ///
    /// A failed write detaches the link and marks the writer faulted so the
    /// reader side can begin reconnecting.
    pub fn write_frame(&self, frame: &[u8]) -> Result<(), LinkError> {
        let mut guard = self.port.lock();
        let port = guard.as_mut().ok_or(LinkError::Absent)?;

        if let Err(e) = port.write_all(frame).and_then(|_| port.flush()) {
            *guard = None;
            self.faulted.store(true, Ordering::SeqCst);
            return Err(LinkError::write(&e));
        }
        Ok(())
    }
}

impl std::fmt::Debug for LinkWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkWriter")
            .field("attached", &self.is_attached())
            .field("faulted", &self.is_faulted())
            .finish()
    }
}
