//! Port traits — the boundary between domain logic and hardware.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ service / FSM (domain)
//! ```
//!
//! Driven adapters (inclination sensor, radio, GPIO indicators, the
//! channel plumbing) implement these traits. The services consume them
//! via generics, so the domain core never touches hardware directly.
//! The FSM-specific effect bundles live next to their consumers:
//! [`ConnectionOutputs`](crate::fsm::connection::ConnectionOutputs),
//! [`DeliveryOutputs`](crate::fsm::delivery::DeliveryOutputs) and
//! [`LinkSink`](crate::timer::watchdog::LinkSink).

use crate::error::RadioError;
use crate::events::{LidPosition, MotionReport};

pub use crate::timer::watchdog::LinkSink;

/// Read-side port on the sensor node: one inclination + temperature
/// sample per tick. Adapters map sensor faults to
/// [`MotionStatus::SignalLost`](crate::events::MotionStatus::SignalLost)
/// rather than returning an error, so loss of the upstream signal
/// travels the same path as any other observation.
pub trait SensorPort {
    fn sample(&mut self) -> MotionReport;
}

/// Write-side port on the sensor node: the point-to-point radio.
pub trait RadioPort {
    fn send(&mut self, report: &MotionReport) -> Result<(), RadioError>;
}

/// Millisecond uptime clock, wrapping. One reading per sample tick.
pub trait Clock {
    fn now_ms(&self) -> u32;
}

/// Liveness reset signal. Any component observing fresh inbound
/// traffic kicks this; it is the watchdog's only external entry point.
pub trait HeartbeatPort {
    fn reset(&mut self);
}

/// Consumer of translated lid position events (the delivery FSM's
/// input queue).
pub trait PositionSink {
    fn post(&mut self, position: LidPosition);
}

/// On/off indicator output (a single GPIO in production).
pub trait IndicatorPort {
    fn set(&mut self, on: bool);
}

/// Starts the elapsed-since-delivery stopwatch on the display clock.
pub trait StopwatchPort {
    fn start(&mut self);
}

/// The services emit structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (serial log,
/// telemetry, nothing).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
