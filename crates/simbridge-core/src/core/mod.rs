//! Bridge data model
//!
//! Typed events decoded from the device, typed commands sent to it, and the
//! link state machine shared by the bridge and its observers.

pub mod command;
pub mod event;
pub mod state;

pub use command::Command;
pub use event::{Event, EventCategory, EventSink};
pub use state::LinkState;
