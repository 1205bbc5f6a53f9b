//! Channel-backed effect adapters for the base-station FSMs.
//!
//! The FSMs see only their output traits; these boards satisfy them by
//! posting to the outbound channels and driving the injected indicator
//! and stopwatch ports. The confirmation window is a
//! [`DebounceTimer`] whose expiry action relays a pre-armed lid
//! position back into the delivery worker's input queue, exactly like
//! any other lid event.

use core::cell::Cell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use crate::app::channels::{
    ALARM_CHANNEL, DISPLAY_CHANNEL, ILLUMINATION_CHANNEL, LID_POSITION_CHANNEL, post,
};
use crate::app::ports::{IndicatorPort, StopwatchPort};
use crate::error::TimerError;
use crate::events::{AlarmEvent, DisplayMessage, LedIllumination, LidPosition};
use crate::fsm::connection::ConnectionOutputs;
use crate::fsm::delivery::DeliveryOutputs;
use crate::timer::debounce::DebounceTimer;
use crate::timer::{ExpiryAction, OneShotBackend};

/// The lid event the armed window will report when it elapses. Shared
/// between the delivery worker (writer) and the timer-service expiry
/// context (reader), hence the lock. `Unchanged` means "nothing
/// pending"; a disarmed window that fires anyway reports nothing.
pub struct PendingPosition(Mutex<CriticalSectionRawMutex, Cell<LidPosition>>);

impl PendingPosition {
    pub const fn new() -> Self {
        Self(Mutex::new(Cell::new(LidPosition::Unchanged)))
    }

    pub fn set(&self, position: LidPosition) {
        self.0.lock(|cell| cell.set(position));
    }

    pub fn get(&self) -> LidPosition {
        self.0.lock(Cell::get)
    }
}

impl Default for PendingPosition {
    fn default() -> Self {
        Self::new()
    }
}

/// Expiry action bound to the delivery confirmation window: posts the
/// pending lid position into the delivery worker's queue.
pub struct PositionRelay {
    pending: &'static PendingPosition,
}

impl PositionRelay {
    pub const fn new(pending: &'static PendingPosition) -> Self {
        Self { pending }
    }
}

impl ExpiryAction for PositionRelay {
    fn run(&self) {
        let position = self.pending.get();
        if position != LidPosition::Unchanged {
            post(&LID_POSITION_CHANNEL, position, "lid position");
        }
    }
}

/// [`DeliveryOutputs`] wired to the real base-station board.
pub struct DeliveryBoard<B: OneShotBackend + 'static, L, S> {
    window: &'static DebounceTimer<B, PositionRelay>,
    pending: &'static PendingPosition,
    activity: L,
    stopwatch: S,
}

impl<B: OneShotBackend, L: IndicatorPort, S: StopwatchPort> DeliveryBoard<B, L, S> {
    pub fn new(
        window: &'static DebounceTimer<B, PositionRelay>,
        pending: &'static PendingPosition,
        activity: L,
        stopwatch: S,
    ) -> Self {
        Self {
            window,
            pending,
            activity,
            stopwatch,
        }
    }
}

impl<B: OneShotBackend, L: IndicatorPort, S: StopwatchPort> DeliveryOutputs
    for DeliveryBoard<B, L, S>
{
    fn activity_led(&mut self, on: bool) {
        self.activity.set(on);
    }

    fn illumination(&mut self, level: LedIllumination) {
        post(&ILLUMINATION_CHANNEL, level, "illumination");
    }

    fn alarm(&mut self, event: AlarmEvent) {
        post(&ALARM_CHANNEL, event, "alarm");
    }

    fn display(&mut self, message: DisplayMessage) {
        post(&DISPLAY_CHANNEL, message, "display");
    }

    fn start_stopwatch(&mut self) {
        self.stopwatch.start();
    }

    fn arm_window(&mut self, duration_ms: u32, on_expiry: LidPosition) -> Result<(), TimerError> {
        self.pending.set(on_expiry);
        self.window.start(duration_ms)
    }

    fn halt_window(&mut self) -> Result<(), TimerError> {
        self.pending.set(LidPosition::Unchanged);
        self.window.stop()
    }
}

/// [`ConnectionOutputs`] wired to the real base-station board.
pub struct ConnectionBoard<C, K> {
    connected: C,
    blink: K,
}

impl<C: IndicatorPort, K: IndicatorPort> ConnectionBoard<C, K> {
    pub fn new(connected: C, blink: K) -> Self {
        Self { connected, blink }
    }
}

impl<C: IndicatorPort, K: IndicatorPort> ConnectionOutputs for ConnectionBoard<C, K> {
    fn connected_indicator(&mut self, on: bool) {
        self.connected.set(on);
    }

    fn disconnected_blink(&mut self, enabled: bool) {
        self.blink.set(enabled);
    }

    fn display(&mut self, message: DisplayMessage) {
        post(&DISPLAY_CHANNEL, message, "display");
    }

    fn alarm(&mut self, event: AlarmEvent) {
        post(&ALARM_CHANNEL, event, "alarm");
    }
}
