//! Message value types flowing between workers.
//!
//! Every type here is a small `Copy`-able value (display text excepted,
//! which is a fixed-capacity string). Messages are fully constructed
//! before they are handed to a channel, so the receiving worker never
//! observes a partially built value.
//!
//! ```text
//! sensor node                         base station
//! ┌───────────┐  MotionReport  ┌──────────┐  LidPosition  ┌──────────┐
//! │ tilt FSM  │───(radio)─────▶│ receiver │──────────────▶│ delivery │
//! └───────────┘                │  worker  │               │   FSM    │
//!                              └────┬─────┘               └────┬─────┘
//!                          LinkEvent│                  Alarm/Led/Display
//!                                   ▼                          ▼
//!                            connection FSM            effect channels
//! ```

use serde::{Deserialize, Serialize};

/// Below any physically possible reading; used before the first sample.
pub const ABSOLUTE_ZERO_CELSIUS: f32 = -273.15;

/// Maximum text payload carried by a display command.
pub const MAX_DISPLAY_TEXT: usize = 16;

// ───────────────────────────────────────────────────────────────
// Sensor → base station wire record
// ───────────────────────────────────────────────────────────────

/// Raw lid motion classification produced by the inclination sampler
/// and refined by the tilt confirmation FSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum MotionStatus {
    /// Lid is at rest (inclination below threshold).
    NotMoved = 0,
    /// Lid is raised (inclination above threshold).
    Raised = 1,
    /// Upstream inclination signal lost on the sensor node.
    SignalLost = 2,
    /// Keep-alive substituted for a raw sample during verification.
    Ping = 3,
}

/// The fixed record carried over the radio link, one per sample tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionReport {
    pub status: MotionStatus,
    pub temperature_celsius: f32,
}

impl MotionReport {
    pub fn new(status: MotionStatus, temperature_celsius: f32) -> Self {
        Self {
            status,
            temperature_celsius,
        }
    }

    /// Encode for the radio transport (postcard, well under one
    /// ESP-NOW frame).
    pub fn encode(&self) -> postcard::Result<heapless::Vec<u8, 8>> {
        let mut buf = [0u8; 8];
        let used = postcard::to_slice(self, &mut buf)?.len();
        let mut out = heapless::Vec::new();
        out.extend_from_slice(&buf[..used])
            .map_err(|()| postcard::Error::SerializeBufferFull)?;
        Ok(out)
    }

    /// Decode a received frame. Truncated or garbage frames are errors,
    /// never panics.
    pub fn decode(frame: &[u8]) -> postcard::Result<Self> {
        postcard::from_bytes(frame)
    }
}

// ───────────────────────────────────────────────────────────────
// Base-station internal events
// ───────────────────────────────────────────────────────────────

/// Lid position events consumed by the delivery lifecycle FSM.
/// `OpenTimeout`/`CloseTimeout` are generated by the debounce timer's
/// expiry action, never by the receiver translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LidPosition {
    Unchanged = 0,
    Open = 1,
    Closed = 2,
    OpenTimeout = 3,
    CloseTimeout = 4,
}

/// Link-health events feeding the connection status FSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    /// No traffic within the watchdog window.
    Down,
    /// Traffic resumed after a down period.
    Up,
    /// The sender reported an unrecoverable failure.
    SenderFailed,
}

// ───────────────────────────────────────────────────────────────
// Outbound side-effect messages
// ───────────────────────────────────────────────────────────────

/// Alarm (beeper) request kinds. The alarm worker maps each kind to a
/// level/duration pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmEvent {
    Connected,
    Delivered,
    Disconnected,
    LidOpen,
    SenderPanic,
}

/// Delivery indicator LED illumination request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedIllumination {
    Off,
    Blink,
    On,
}

/// Commands for the LCD worker. Each maps to a predefined screen; some
/// carry a short formatted text payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayCommand {
    Clear,
    Connected,
    Arriving,
    Delivered,
    Disconnected,
    Elapsed,
    Init,
    Noop,
    Run,
    TimeOfDay,
    TamperAlert,
    Panic,
}

/// A display command plus optional fixed-length text (e.g. "HH:MM" or
/// elapsed minutes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayMessage {
    pub command: DisplayCommand,
    pub text: heapless::String<MAX_DISPLAY_TEXT>,
}

impl DisplayMessage {
    /// A command with no text payload.
    pub fn command(command: DisplayCommand) -> Self {
        Self {
            command,
            text: heapless::String::new(),
        }
    }

    /// A command with text, truncated to the display width.
    pub fn with_text(command: DisplayCommand, text: &str) -> Self {
        let mut s = heapless::String::new();
        for ch in text.chars().take(MAX_DISPLAY_TEXT) {
            if s.push(ch).is_err() {
                break;
            }
        }
        Self { command, text: s }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_wire_roundtrip() {
        let report = MotionReport::new(MotionStatus::Raised, 21.5);
        let frame = report.encode().unwrap();
        let back = MotionReport::decode(&frame).unwrap();
        assert_eq!(back.status, MotionStatus::Raised);
        assert!((back.temperature_celsius - 21.5).abs() < f32::EPSILON);
    }

    #[test]
    fn report_fits_in_tiny_frame() {
        let report = MotionReport::new(MotionStatus::NotMoved, ABSOLUTE_ZERO_CELSIUS);
        let frame = report.encode().unwrap();
        assert!(frame.len() <= 8, "frame is {} bytes", frame.len());
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(MotionReport::decode(&[]).is_err());
        assert!(MotionReport::decode(&[0xff, 0xff, 0xff]).is_err());
    }

    #[test]
    fn display_text_truncates_to_width() {
        let msg = DisplayMessage::with_text(DisplayCommand::Elapsed, "a very long elapsed string");
        assert_eq!(msg.text.len(), MAX_DISPLAY_TEXT);
    }
}
