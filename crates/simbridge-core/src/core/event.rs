//! Device events
//!
//! Provides:
//! - The typed event produced for every decoded frame
//! - Event categories used for subscription filtering
//! - The observer-facing payload representation of each event
//! - The sink trait the bridge forwards events into

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Event decoded from one frame on the serial link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Pixel region blit (`$b`)
    BitmapBlit {
        /// Left edge in pixels.
        x: u16,
        /// Top edge in pixels.
        y: u16,
        /// Width in pixels.
        w: u16,
        /// Height in pixels.
        h: u16,
        /// Raw 16-bit big-endian pixels, exactly `w * h * 2` bytes.
        pixels: Vec<u8>,
    },
    /// Filled rectangle (`$R`)
    RectDraw {
        /// Left edge in pixels.
        x: i32,
        /// Top edge in pixels.
        y: i32,
        /// Width in pixels.
        w: i32,
        /// Height in pixels.
        h: i32,
        /// Fill color as sent by the device.
        color: i32,
    },
    /// GPIO level report (`$G`)
    GpioUpdate {
        /// Pin number.
        pin: i32,
        /// Pin level.
        value: i32,
    },
    /// Drum motor telemetry (`$M`)
    MotorTelemetry {
        /// Target speed.
        target: f64,
        /// Measured speed.
        current: f64,
        /// Rotation direction.
        direction: i32,
    },
    /// Free-form device output
    LogLine {
        /// The line, trimmed.
        text: String,
    },
}

/// Event categories for filtering subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Screen drawing (bitmap blits and rectangles)
    Display,
    /// GPIO level reports
    Gpio,
    /// Motor telemetry
    Motor,
    /// Device log output
    Log,
}

impl Event {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            Event::BitmapBlit { .. } | Event::RectDraw { .. } => EventCategory::Display,
            Event::GpioUpdate { .. } => EventCategory::Gpio,
            Event::MotorTelemetry { .. } => EventCategory::Motor,
            Event::LogLine { .. } => EventCategory::Log,
        }
    }

    /// Channel name observers subscribe to for this event
    pub fn topic(&self) -> &'static str {
        match self {
            Event::BitmapBlit { .. } => "draw_bitmap",
            Event::RectDraw { .. } => "draw_rect",
            Event::GpioUpdate { .. } => "gpio_update",
            Event::MotorTelemetry { .. } => "motor_state",
            Event::LogLine { .. } => "log",
        }
    }

    /// Observer-facing JSON body for this event
    ///
    /// Bitmap pixels are rendered as an uppercase hex string so browser
    /// front-ends can consume them without a binary transport.
    pub fn to_payload(&self) -> Value {
        match self {
            Event::BitmapBlit { x, y, w, h, pixels } => json!({
                "x": x,
                "y": y,
                "w": w,
                "h": h,
                "data": hex::encode_upper(pixels),
            }),
            Event::RectDraw { x, y, w, h, color } => json!({
                "x": x,
                "y": y,
                "w": w,
                "h": h,
                "c": color,
            }),
            Event::GpioUpdate { pin, value } => json!({ "p": pin, "v": value }),
            Event::MotorTelemetry {
                target,
                current,
                direction,
            } => json!({
                "target": target,
                "current": current,
                "direction": direction,
            }),
            Event::LogLine { text } => json!({ "msg": text }),
        }
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Event::BitmapBlit { x, y, w, h, pixels } => {
                write!(f, "Bitmap {}x{} at ({}, {}), {} bytes", w, h, x, y, pixels.len())
            }
            Event::RectDraw { x, y, w, h, color } => {
                write!(f, "Rect {}x{} at ({}, {}) color {}", w, h, x, y, color)
            }
            Event::GpioUpdate { pin, value } => write!(f, "GPIO {} = {}", pin, value),
            Event::MotorTelemetry {
                target,
                current,
                direction,
            } => write!(
                f,
                "Motor target {} current {} dir {}",
                target, current, direction
            ),
            Event::LogLine { text } => write!(f, "Log: {}", text),
        }
    }
}

/// Consumer of decoded events
///
/// Called once per decoded frame, in wire order, from the reader thread.
/// Implementations should return quickly and must not block on observers.
pub trait EventSink: Send + Sync {
    /// Deliver one event
    fn emit(&self, event: Event);
}

impl<F> EventSink for F
where
    F: Fn(Event) + Send + Sync,
{
    fn emit(&self, event: Event) {
        self(event)
    }
}
