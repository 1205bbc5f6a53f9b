//! Worker-facing services.
//!
//! One service per worker loop, mirroring the queue topology in
//! [`super::channels`]: the sensor node runs [`SensorService`] on a
//! sampling tick; the base station runs [`ReceiverService`] on inbound
//! frames, [`DeliveryService`] on translated lid positions and
//! [`ConnectionService`] on link verdicts. Each owns its FSM and
//! reaches the outside world only through injected ports, so all of
//! them run under host tests with mocks.

use log::{error, info, warn};

use crate::config::SystemConfig;
use crate::error::Error;
use crate::events::{LidPosition, LinkEvent, MotionReport, MotionStatus};
use crate::fsm::connection::{ConnectionFsm, ConnectionOutputs, ConnectionState};
use crate::fsm::delivery::{DeliveryFsm, DeliveryOutputs, DeliveryState};
use crate::fsm::tilt::TiltConfirmer;

use super::events::AppEvent;
use super::ports::{
    EventSink, HeartbeatPort, LinkSink, PositionSink, RadioPort, SensorPort,
};

// ───────────────────────────────────────────────────────────────
// Sensor node
// ───────────────────────────────────────────────────────────────

/// Sensor-node orchestration: sample → debounce → transmit, once per
/// sampling tick. Every tick transmits exactly one record, which is
/// also the base station's heartbeat.
pub struct SensorService {
    confirmer: TiltConfirmer,
}

impl SensorService {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            confirmer: TiltConfirmer::new(config.tilt_confirm_ms),
        }
    }

    /// Returns the raw classification so the board can mirror it on
    /// the tilt LED.
    pub fn tick(
        &mut self,
        now_ms: u32,
        sensor: &mut impl SensorPort,
        radio: &mut impl RadioPort,
        sink: &mut impl EventSink,
    ) -> Result<MotionStatus, Error> {
        let sample = sensor.sample();
        let from = self.confirmer.state();
        let report = self.confirmer.on_sample(sample, now_ms);
        let to = self.confirmer.state();
        if from != to {
            info!("tilt {from:?} -> {to:?}");
            sink.emit(&AppEvent::TiltChanged { from, to });
        }
        radio.send(&report)?;
        sink.emit(&AppEvent::ReportSent(report.status));
        Ok(sample.status)
    }
}

// ───────────────────────────────────────────────────────────────
// Base station: receiver translation
// ───────────────────────────────────────────────────────────────

/// Translates inbound radio frames into lid positions and liveness
/// resets. Stateless; all the policy is in the match below.
pub struct ReceiverService;

impl ReceiverService {
    #[allow(clippy::too_many_arguments)]
    pub fn on_frame(
        &mut self,
        frame: &[u8],
        link_heartbeat: &mut impl HeartbeatPort,
        sensor_heartbeat: &mut impl HeartbeatPort,
        positions: &mut impl PositionSink,
        links: &mut impl LinkSink,
        sink: &mut impl EventSink,
    ) {
        let report = match MotionReport::decode(frame) {
            Ok(report) => report,
            Err(e) => {
                warn!("rejecting {}-byte frame: {e}", frame.len());
                sink.emit(&AppEvent::FrameRejected(frame.len()));
                return;
            }
        };

        // Any decodable frame proves the radio link alive.
        link_heartbeat.reset();
        sink.emit(&AppEvent::ReportReceived(report.status));

        match report.status {
            MotionStatus::NotMoved => {
                sensor_heartbeat.reset();
                positions.post(LidPosition::Closed);
            }
            MotionStatus::Raised => {
                sensor_heartbeat.reset();
                positions.post(LidPosition::Open);
            }
            MotionStatus::Ping => sensor_heartbeat.reset(),
            MotionStatus::SignalLost => {
                // The sender's own inclination source is gone; it
                // cannot observe the lid any more.
                error!("sender reports inclination signal lost");
                links.publish(LinkEvent::SenderFailed);
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Base station: delivery lifecycle
// ───────────────────────────────────────────────────────────────

/// Owns the delivery FSM and its escalation policy: a faulted
/// confirmation-window timer is a hard fault, reported as a sender
/// failure so the whole appliance lands in the panic indication.
pub struct DeliveryService {
    fsm: DeliveryFsm,
}

impl DeliveryService {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            fsm: DeliveryFsm::new(config.open_confirm_ms, config.close_confirm_ms),
        }
    }

    pub fn on_position(
        &mut self,
        position: LidPosition,
        outputs: &mut impl DeliveryOutputs,
        links: &mut impl LinkSink,
        sink: &mut impl EventSink,
    ) {
        let from = self.fsm.state();
        match self.fsm.on_position(position, outputs) {
            Ok(()) => {
                let to = self.fsm.state();
                if from != to {
                    info!("delivery {from:?} -> {to:?}");
                    sink.emit(&AppEvent::DeliveryChanged { from, to });
                }
            }
            Err(e) => {
                error!("confirmation window timer faulted: {e}");
                sink.emit(&AppEvent::TimerFault(e));
                links.publish(LinkEvent::SenderFailed);
            }
        }
    }

    pub fn state(&self) -> DeliveryState {
        self.fsm.state()
    }
}

// ───────────────────────────────────────────────────────────────
// Base station: connection status
// ───────────────────────────────────────────────────────────────

/// Owns the connection FSM; thin, but keeps the logging and telemetry
/// in one place.
pub struct ConnectionService {
    fsm: ConnectionFsm,
}

impl Default for ConnectionService {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionService {
    pub fn new() -> Self {
        Self {
            fsm: ConnectionFsm::new(),
        }
    }

    pub fn on_link_event(
        &mut self,
        event: LinkEvent,
        outputs: &mut impl ConnectionOutputs,
        sink: &mut impl EventSink,
    ) {
        sink.emit(&AppEvent::LinkObserved(event));
        let from = self.fsm.state();
        self.fsm.on_link_event(event, outputs);
        let to = self.fsm.state();
        if from != to {
            info!("connection {from:?} -> {to:?}");
            sink.emit(&AppEvent::ConnectionChanged { from, to });
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.fsm.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RadioError;

    #[derive(Default)]
    struct NullSink {
        events: Vec<AppEvent>,
    }

    impl EventSink for NullSink {
        fn emit(&mut self, event: &AppEvent) {
            self.events.push(*event);
        }
    }

    #[derive(Default)]
    struct CountingHeartbeat {
        resets: u32,
    }

    impl HeartbeatPort for CountingHeartbeat {
        fn reset(&mut self) {
            self.resets += 1;
        }
    }

    #[derive(Default)]
    struct RecordingPositions {
        posted: Vec<LidPosition>,
    }

    impl PositionSink for RecordingPositions {
        fn post(&mut self, position: LidPosition) {
            self.posted.push(position);
        }
    }

    #[derive(Default)]
    struct RecordingLinks {
        published: Vec<LinkEvent>,
    }

    impl LinkSink for RecordingLinks {
        fn publish(&mut self, event: LinkEvent) {
            self.published.push(event);
        }
    }

    struct Fixture {
        link_hb: CountingHeartbeat,
        sensor_hb: CountingHeartbeat,
        positions: RecordingPositions,
        links: RecordingLinks,
        sink: NullSink,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                link_hb: CountingHeartbeat::default(),
                sensor_hb: CountingHeartbeat::default(),
                positions: RecordingPositions::default(),
                links: RecordingLinks::default(),
                sink: NullSink::default(),
            }
        }

        fn feed(&mut self, status: MotionStatus) {
            let frame = MotionReport::new(status, 5.0).encode().unwrap();
            ReceiverService.on_frame(
                &frame,
                &mut self.link_hb,
                &mut self.sensor_hb,
                &mut self.positions,
                &mut self.links,
                &mut self.sink,
            );
        }
    }

    #[test]
    fn positions_translate_and_reset_both_watchdogs() {
        let mut fx = Fixture::new();
        fx.feed(MotionStatus::NotMoved);
        fx.feed(MotionStatus::Raised);
        assert_eq!(
            fx.positions.posted,
            vec![LidPosition::Closed, LidPosition::Open]
        );
        assert_eq!(fx.link_hb.resets, 2);
        assert_eq!(fx.sensor_hb.resets, 2);
        assert!(fx.links.published.is_empty());
    }

    #[test]
    fn ping_is_heartbeat_only() {
        let mut fx = Fixture::new();
        fx.feed(MotionStatus::Ping);
        assert!(fx.positions.posted.is_empty());
        assert_eq!(fx.link_hb.resets, 1);
        assert_eq!(fx.sensor_hb.resets, 1);
    }

    #[test]
    fn signal_lost_escalates_to_sender_failure() {
        let mut fx = Fixture::new();
        fx.feed(MotionStatus::SignalLost);
        assert!(fx.positions.posted.is_empty());
        // The radio link itself is alive, so its watchdog resets; the
        // sensor-signal watchdog does not.
        assert_eq!(fx.link_hb.resets, 1);
        assert_eq!(fx.sensor_hb.resets, 0);
        assert_eq!(fx.links.published, vec![LinkEvent::SenderFailed]);
    }

    #[test]
    fn garbage_frames_are_rejected_without_heartbeat() {
        let mut fx = Fixture::new();
        ReceiverService.on_frame(
            &[0xff, 0xff, 0xff],
            &mut fx.link_hb,
            &mut fx.sensor_hb,
            &mut fx.positions,
            &mut fx.links,
            &mut fx.sink,
        );
        assert_eq!(fx.link_hb.resets, 0);
        assert!(matches!(fx.sink.events[0], AppEvent::FrameRejected(3)));
    }

    // ── SensorService ─────────────────────────────────────────

    struct FixedSensor(MotionStatus);

    impl SensorPort for FixedSensor {
        fn sample(&mut self) -> MotionReport {
            MotionReport::new(self.0, 6.5)
        }
    }

    #[derive(Default)]
    struct RecordingRadio {
        sent: Vec<MotionStatus>,
        fail: bool,
    }

    impl RadioPort for RecordingRadio {
        fn send(&mut self, report: &MotionReport) -> Result<(), RadioError> {
            if self.fail {
                return Err(RadioError::SendFailed);
            }
            self.sent.push(report.status);
            Ok(())
        }
    }

    #[test]
    fn sensor_tick_transmits_every_sample() {
        let mut service = SensorService::new(&SystemConfig::default());
        let mut sensor = FixedSensor(MotionStatus::NotMoved);
        let mut radio = RecordingRadio::default();
        let mut sink = NullSink::default();

        for i in 0..4u32 {
            service
                .tick(i * 50, &mut sensor, &mut radio, &mut sink)
                .unwrap();
        }
        // All inside the confirmation window: pings only.
        assert_eq!(radio.sent, vec![MotionStatus::Ping; 4]);

        service
            .tick(2500, &mut sensor, &mut radio, &mut sink)
            .unwrap();
        assert_eq!(radio.sent.last(), Some(&MotionStatus::NotMoved));
    }

    #[test]
    fn sensor_tick_surfaces_radio_failure() {
        let mut service = SensorService::new(&SystemConfig::default());
        let mut sensor = FixedSensor(MotionStatus::Raised);
        let mut radio = RecordingRadio {
            fail: true,
            ..RecordingRadio::default()
        };
        let mut sink = NullSink::default();
        assert!(service.tick(0, &mut sensor, &mut radio, &mut sink).is_err());
    }
}
