//! Outbound application events.
//!
//! The services emit these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other
//! side decide what to do with them — log to serial, count, drop.

use crate::error::TimerError;
use crate::events::{LinkEvent, MotionStatus};
use crate::fsm::connection::ConnectionState;
use crate::fsm::delivery::DeliveryState;
use crate::fsm::tilt::TiltState;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppEvent {
    /// The sensor node transmitted a record.
    ReportSent(MotionStatus),

    /// The base station decoded an inbound record.
    ReportReceived(MotionStatus),

    /// An inbound radio frame failed to decode (carries its length).
    FrameRejected(usize),

    /// The tilt confirmation FSM changed state.
    TiltChanged { from: TiltState, to: TiltState },

    /// The delivery lifecycle FSM changed state.
    DeliveryChanged {
        from: DeliveryState,
        to: DeliveryState,
    },

    /// The connection status FSM changed state.
    ConnectionChanged {
        from: ConnectionState,
        to: ConnectionState,
    },

    /// A link verdict was fed to the connection FSM.
    LinkObserved(LinkEvent),

    /// A confirmation-window timer backend faulted.
    TimerFault(TimerError),
}
