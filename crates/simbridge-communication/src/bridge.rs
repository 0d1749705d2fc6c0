//! Bridge loop
//!
//! Owns the serial link and runs it through
//! `Disconnected -> Connecting -> Connected -> Disconnected` indefinitely:
//! - A dedicated reader thread opens the link, drives the [`FrameDecoder`],
//!   and forwards every event to the sink in wire order.
//! - A command pump task receives [`Command`]s from any number of producers
//!   and writes each through the shared [`LinkWriter`].
//! - On any link failure the link is dropped, the bridge waits a fixed
//!   cooldown, then tries again. There is no retry limit.
//!
//! While disconnected no events are produced and commands are discarded.

use crate::communication::{LinkOpener, LinkWriter};
use crate::protocol::FrameDecoder;
use parking_lot::RwLock;
use simbridge_core::{Command, EventSink, LinkError, LinkState};
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::mpsc;

/// Default wait between reconnect attempts
pub const DEFAULT_RECONNECT_COOLDOWN: Duration = Duration::from_secs(1);

/// Granularity at which the cooldown checks for shutdown
const COOLDOWN_SLICE: Duration = Duration::from_millis(50);

/// Sender half of the bridge's command queue
///
/// Never blocks; commands sent while disconnected are dropped by the pump.
pub type CommandSender = mpsc::UnboundedSender<Command>;

/// Bridge tuning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeOptions {
    /// Wait after a failure before reopening the link
    pub reconnect_cooldown: Duration,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            reconnect_cooldown: DEFAULT_RECONNECT_COOLDOWN,
        }
    }
}

/// State shared between the reader thread, the pump, and the handle
struct Shared {
    state: RwLock<LinkState>,
    running: AtomicBool,
    writer: LinkWriter,
}

impl Shared {
    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn set_state(&self, next: LinkState) {
        let mut state = self.state.write();
        if *state != next {
            tracing::info!("Link state {} -> {}", *state, next);
            *state = next;
        }
    }
}

/// Serial bridge between a device link and an event sink
pub struct Bridge {
    opener: Box<dyn LinkOpener>,
    sink: Arc<dyn EventSink>,
    options: BridgeOptions,
}

impl Bridge {
    /// Create a bridge that opens links with `opener` and emits into `sink`
    pub fn new(opener: impl LinkOpener, sink: Arc<dyn EventSink>) -> Self {
        Self {
            opener: Box::new(opener),
            sink,
            options: BridgeOptions::default(),
        }
    }

    /// Override the default options
    pub fn with_options(mut self, options: BridgeOptions) -> Self {
        self.options = options;
        self
    }

    /// Start the reader thread and the command pump
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(self) -> std::io::Result<BridgeHandle> {
        let shared = Arc::new(Shared {
            state: RwLock::new(LinkState::Disconnected),
            running: AtomicBool::new(true),
            writer: LinkWriter::new(),
        });

        let (commands, rx) = mpsc::unbounded_channel();
        let pump = tokio::spawn(pump_commands(rx, shared.writer.clone()));

        let reader_shared = shared.clone();
        let reader = std::thread::Builder::new()
            .name("simbridge-reader".to_string())
            .spawn(move || run_reader(self, reader_shared))?;

        Ok(BridgeHandle {
            shared,
            commands,
            pump,
            reader: Some(reader),
        })
    }
}

/// Control handle for a running bridge
pub struct BridgeHandle {
    shared: Arc<Shared>,
    commands: CommandSender,
    pump: tokio::task::JoinHandle<()>,
    reader: Option<JoinHandle<()>>,
}

impl BridgeHandle {
    /// Current link state
    pub fn state(&self) -> LinkState {
        *self.shared.state.read()
    }

    /// Queue a command for the device
    ///
    /// Returns false only if the bridge has shut down.
    pub fn send(&self, command: Command) -> bool {
        self.commands.send(command).is_ok()
    }

    /// A sender for command producers on other tasks
    pub fn commands(&self) -> CommandSender {
        self.commands.clone()
    }

    /// The guarded write path, for producers that write synchronously
    pub fn writer(&self) -> LinkWriter {
        self.shared.writer.clone()
    }

    /// Stop the bridge and wait for the reader thread to exit
    ///
    /// The reader notices within one read timeout or cooldown slice.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(reader) = self.reader.take() {
            if tokio::task::spawn_blocking(move || reader.join())
                .await
                .is_err()
            {
                tracing::warn!("Reader thread did not exit cleanly");
            }
        }
    }

    fn stop(&self) {
        self.shared.running.store(false, Ordering::SeqCst);
        self.pump.abort();
    }
}

impl Drop for BridgeHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn pump_commands(mut rx: mpsc::UnboundedReceiver<Command>, writer: LinkWriter) {
    while let Some(command) = rx.recv().await {
        match writer.send(&command) {
            Ok(()) => tracing::trace!("Sent {}", command),
            Err(LinkError::Absent) => {
                tracing::debug!("No link, dropping command: {}", command)
            }
            Err(e) => tracing::warn!("Failed to send {}: {}", command, e),
        }
    }
}

fn run_reader(bridge: Bridge, shared: Arc<Shared>) {
    let Bridge {
        mut opener,
        sink,
        options,
    } = bridge;
    let mut reported_absent = false;

    while shared.is_running() {
        shared.set_state(LinkState::Connecting);

        match opener.open() {
            Ok(link) => {
                reported_absent = false;
                tracing::info!("Connected to {}", link.name);
                shared.writer.attach(link.writer);
                shared.set_state(LinkState::Connected);

                let err = decode_until_failure(link.reader, sink.as_ref(), &shared);

                shared.writer.detach();
                shared.set_state(LinkState::Disconnected);
                if !shared.is_running() {
                    break;
                }
                tracing::warn!("Lost link to {}: {}", link.name, err);
            }
            Err(LinkError::Absent) => {
                shared.set_state(LinkState::Disconnected);
                if !reported_absent {
                    tracing::warn!("No device found, retrying every {:?}", options.reconnect_cooldown);
                    reported_absent = true;
                }
            }
            Err(e) => {
                shared.set_state(LinkState::Disconnected);
                tracing::warn!("{}", e);
            }
        }

        cooldown(&shared, options.reconnect_cooldown);
    }

    shared.set_state(LinkState::Disconnected);
    tracing::debug!("Reader thread exiting");
}

fn decode_until_failure(
    reader: Box<dyn Read + Send>,
    sink: &dyn EventSink,
    shared: &Arc<Shared>,
) -> LinkError {
    let watch = shared.clone();
    let mut decoder = FrameDecoder::new(reader)
        .with_abort(move || !watch.is_running() || watch.writer.is_faulted());

    loop {
        match decoder.next_event() {
            Ok(event) => sink.emit(event),
            Err(e) => return e,
        }
    }
}

fn cooldown(shared: &Shared, duration: Duration) {
    let mut remaining = duration;
    while shared.is_running() && !remaining.is_zero() {
        let step = remaining.min(COOLDOWN_SLICE);
        std::thread::sleep(step);
        remaining -= step;
    }
}
