//! # Event Bus Module
//!
//! In-process publish/subscribe fan-out for decoded device events. This is
//! the default sink the bridge forwards into; relays subscribe to it and
//! deliver events onward in their own wire format.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use simbridge_core::event_bus::{EventBus, EventFilter};
//! use simbridge_core::{Event, EventCategory};
//!
//! let bus = EventBus::new();
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Gpio]),
//!     |event| println!("gpio: {}", event),
//! );
//!
//! bus.publish(Event::GpioUpdate { pin: 4, value: 1 }).ok();
//! bus.unsubscribe(subscription);
//! ```

mod bus;

pub use bus::*;
