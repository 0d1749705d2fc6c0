//! # Simbridge Core
//!
//! Core types, errors, and the event bus for simbridge.
//! Defines the typed events decoded from the simulator's serial stream,
//! the commands sent back to it, and the link state machine.

pub mod core;
pub mod error;
pub mod event_bus;

pub use core::{Command, Event, EventCategory, EventSink, LinkState};

pub use error::{CommandError, Error, FrameParseError, LinkError, Result};

pub use event_bus::{EventBus, EventBusConfig, EventBusError, EventFilter, SubscriptionId};
