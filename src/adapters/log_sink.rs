//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART / USB-CDC in production). High-rate per-sample
//! events go out at `debug!`, state changes at `info!`.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::ReportSent(status) => {
                debug!("TX    | {:?}", status);
            }
            AppEvent::ReportReceived(status) => {
                debug!("RX    | {:?}", status);
            }
            AppEvent::FrameRejected(len) => {
                warn!("RX    | rejected {len}-byte frame");
            }
            AppEvent::TiltChanged { from, to } => {
                info!("TILT  | {:?} -> {:?}", from, to);
            }
            AppEvent::DeliveryChanged { from, to } => {
                info!("DELIV | {:?} -> {:?}", from, to);
            }
            AppEvent::ConnectionChanged { from, to } => {
                info!("LINK  | {:?} -> {:?}", from, to);
            }
            AppEvent::LinkObserved(event) => {
                debug!("LINK  | observed {:?}", event);
            }
            AppEvent::TimerFault(e) => {
                warn!("TIMER | backend fault: {e}");
            }
        }
    }
}

/// Sink for contexts that want no telemetry at all.
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn emit(&mut self, _event: &AppEvent) {}
}
