//! Inter-worker channels.
//!
//! Uses `embassy-sync` bounded MPMC channels. Every worker drains
//! exactly one of these; producers enqueue with [`post`], which is
//! non-blocking and drops on a full queue — stale status updates are
//! worthless, so the backpressure policy is drop-newest.
//!
//! ```text
//! radio rx ──▶ RX_FRAME ──▶ receiver ──▶ LID_POSITION ──▶ delivery
//!                              │               ▲ (window expiry)
//!                              ▼
//!                    LINK_WATCHDOG / SENSOR_WATCHDOG
//!                              │
//!                              ▼
//!                            LINK ──▶ connection
//!                                        │
//!                                        ▼
//!                         ALARM · ILLUMINATION · DISPLAY
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, with_timeout};
use futures_lite::future::block_on;
use log::warn;

use crate::events::{AlarmEvent, DisplayMessage, LedIllumination, LidPosition, LinkEvent};
use crate::timer::watchdog::{LinkSink, WatchdogEvent};

use super::ports::{HeartbeatPort, PositionSink};

/// An inbound radio frame, exactly as received.
pub struct RxFrame {
    pub bytes: heapless::Vec<u8, 8>,
}

/// Raw frames: radio receive callback → receiver worker.
pub static RX_FRAME_CHANNEL: Channel<CriticalSectionRawMutex, RxFrame, 3> = Channel::new();

/// Translated lid positions: receiver + window expiries → delivery worker.
pub static LID_POSITION_CHANNEL: Channel<CriticalSectionRawMutex, LidPosition, 10> =
    Channel::new();

/// Link verdicts: both watchdogs + receiver escalation → connection worker.
pub static LINK_CHANNEL: Channel<CriticalSectionRawMutex, LinkEvent, 3> = Channel::new();

/// Radio-link watchdog events (reset on every inbound frame).
pub static LINK_WATCHDOG_CHANNEL: Channel<CriticalSectionRawMutex, WatchdogEvent, 10> =
    Channel::new();

/// Sensor-signal watchdog events (reset on frames carrying a live
/// inclination signal).
pub static SENSOR_WATCHDOG_CHANNEL: Channel<CriticalSectionRawMutex, WatchdogEvent, 10> =
    Channel::new();

/// Alarm requests → alarm worker.
pub static ALARM_CHANNEL: Channel<CriticalSectionRawMutex, AlarmEvent, 3> = Channel::new();

/// Delivery indicator LED requests → LED worker.
pub static ILLUMINATION_CHANNEL: Channel<CriticalSectionRawMutex, LedIllumination, 3> =
    Channel::new();

/// Display commands → LCD worker.
pub static DISPLAY_CHANNEL: Channel<CriticalSectionRawMutex, DisplayMessage, 3> = Channel::new();

/// Non-blocking enqueue; a full queue drops the message with a warning.
pub fn post<T, const N: usize>(
    channel: &Channel<CriticalSectionRawMutex, T, N>,
    message: T,
    what: &str,
) {
    if channel.try_send(message).is_err() {
        warn!("{what} queue full, dropping");
    }
}

/// Blocking receive with a timeout, for worker loops that must stay
/// live (never a true infinite wait).
pub fn recv_timeout<T, const N: usize>(
    channel: &'static Channel<CriticalSectionRawMutex, T, N>,
    timeout: Duration,
) -> Option<T> {
    block_on(with_timeout(timeout, channel.receive())).ok()
}

/// Handle to one watchdog instance's event queue. The expiry callback
/// and heartbeat producers go through this; the watchdog worker drains
/// the queue, so the watchdog itself needs no lock.
#[derive(Clone, Copy)]
pub struct WatchdogHandle {
    channel: &'static Channel<CriticalSectionRawMutex, WatchdogEvent, 10>,
    name: &'static str,
}

impl WatchdogHandle {
    pub const fn new(
        channel: &'static Channel<CriticalSectionRawMutex, WatchdogEvent, 10>,
        name: &'static str,
    ) -> Self {
        Self { channel, name }
    }

    pub fn reset(&self) {
        post(self.channel, WatchdogEvent::Reset, self.name);
    }

    pub fn expire(&self) {
        post(self.channel, WatchdogEvent::Expire, self.name);
    }
}

impl HeartbeatPort for WatchdogHandle {
    fn reset(&mut self) {
        WatchdogHandle::reset(self);
    }
}

/// Handle to the radio-link watchdog queue.
pub const LINK_WATCHDOG: WatchdogHandle =
    WatchdogHandle::new(&LINK_WATCHDOG_CHANNEL, "link watchdog");

/// Handle to the sensor-signal watchdog queue.
pub const SENSOR_WATCHDOG: WatchdogHandle =
    WatchdogHandle::new(&SENSOR_WATCHDOG_CHANNEL, "sensor watchdog");

/// [`LinkSink`] backed by [`LINK_CHANNEL`]. Both watchdog instances
/// share it, as does the receiver's sender-failure escalation.
#[derive(Clone, Copy, Default)]
pub struct ChannelLinkSink;

impl LinkSink for ChannelLinkSink {
    fn publish(&mut self, event: LinkEvent) {
        post(&LINK_CHANNEL, event, "link");
    }
}

/// [`PositionSink`] backed by [`LID_POSITION_CHANNEL`].
#[derive(Clone, Copy, Default)]
pub struct ChannelPositionSink;

impl PositionSink for ChannelPositionSink {
    fn post(&mut self, position: LidPosition) {
        post(&LID_POSITION_CHANNEL, position, "lid position");
    }
}
