//! Event-storm properties over the state machines: any sequence of
//! inputs leaves each FSM in a declared state, terminal states absorb,
//! and the debounce action never fires more often than it was armed.

#![cfg(not(target_os = "espidf"))]

use proptest::prelude::*;

use lidwatch::error::TimerError;
use lidwatch::events::{
    AlarmEvent, DisplayMessage, LedIllumination, LidPosition, LinkEvent, MotionReport,
    MotionStatus,
};
use lidwatch::fsm::connection::{ConnectionFsm, ConnectionOutputs, ConnectionState};
use lidwatch::fsm::delivery::{DeliveryFsm, DeliveryOutputs, DeliveryState};
use lidwatch::fsm::tilt::TiltConfirmer;
use lidwatch::timer::debounce::{DebounceTimer, TimerState};
use lidwatch::timer::{ExpiryAction, OneShotBackend};

// ── Mocks ─────────────────────────────────────────────────────

#[derive(Default)]
struct CountingDeliveryOutputs {
    effects: u32,
}

impl DeliveryOutputs for CountingDeliveryOutputs {
    fn activity_led(&mut self, _on: bool) {}
    fn illumination(&mut self, _level: LedIllumination) {
        self.effects += 1;
    }
    fn alarm(&mut self, _event: AlarmEvent) {
        self.effects += 1;
    }
    fn display(&mut self, _message: DisplayMessage) {
        self.effects += 1;
    }
    fn start_stopwatch(&mut self) {
        self.effects += 1;
    }
    fn arm_window(&mut self, _duration_ms: u32, _on_expiry: LidPosition) -> Result<(), TimerError> {
        Ok(())
    }
    fn halt_window(&mut self) -> Result<(), TimerError> {
        Ok(())
    }
}

#[derive(Default)]
struct CountingConnectionOutputs {
    effects: u32,
}

impl ConnectionOutputs for CountingConnectionOutputs {
    fn connected_indicator(&mut self, _on: bool) {
        self.effects += 1;
    }
    fn disconnected_blink(&mut self, _enabled: bool) {
        self.effects += 1;
    }
    fn display(&mut self, _message: DisplayMessage) {
        self.effects += 1;
    }
    fn alarm(&mut self, _event: AlarmEvent) {
        self.effects += 1;
    }
}

struct NullBackend;

impl OneShotBackend for NullBackend {
    fn arm(&mut self, _duration_ms: u32) -> Result<(), TimerError> {
        Ok(())
    }
    fn rearm(&mut self) -> Result<(), TimerError> {
        Ok(())
    }
    fn cancel(&mut self) -> Result<(), TimerError> {
        Ok(())
    }
    fn recreate(&mut self) -> Result<(), TimerError> {
        Ok(())
    }
}

struct Counter(std::rc::Rc<core::cell::Cell<u32>>);

impl ExpiryAction for Counter {
    fn run(&self) {
        self.0.set(self.0.get() + 1);
    }
}

// ── Strategies ────────────────────────────────────────────────

fn lid_positions() -> impl Strategy<Value = Vec<LidPosition>> {
    prop::collection::vec(
        prop_oneof![
            Just(LidPosition::Unchanged),
            Just(LidPosition::Open),
            Just(LidPosition::Closed),
            Just(LidPosition::OpenTimeout),
            Just(LidPosition::CloseTimeout),
        ],
        0..64,
    )
}

fn link_events() -> impl Strategy<Value = Vec<LinkEvent>> {
    prop::collection::vec(
        prop_oneof![
            Just(LinkEvent::Down),
            Just(LinkEvent::Up),
            Just(LinkEvent::SenderFailed),
        ],
        0..64,
    )
}

fn motion_statuses() -> impl Strategy<Value = Vec<MotionStatus>> {
    prop::collection::vec(
        prop_oneof![
            Just(MotionStatus::NotMoved),
            Just(MotionStatus::Raised),
            Just(MotionStatus::SignalLost),
        ],
        0..64,
    )
}

// ── Properties ────────────────────────────────────────────────

proptest! {
    #[test]
    fn delivery_tampering_is_absorbing(storm in lid_positions()) {
        let mut fsm = DeliveryFsm::new(500, 5000);
        let mut outputs = CountingDeliveryOutputs::default();
        let mut tampered_at_effects = None;
        for position in storm {
            fsm.on_position(position, &mut outputs).unwrap();
            match tampered_at_effects {
                None => {
                    if fsm.state() == DeliveryState::ConfirmedTampering {
                        tampered_at_effects = Some(outputs.effects);
                    }
                }
                Some(frozen) => {
                    prop_assert_eq!(fsm.state(), DeliveryState::ConfirmedTampering);
                    prop_assert_eq!(outputs.effects, frozen);
                }
            }
        }
    }

    #[test]
    fn connection_panic_is_absorbing(storm in link_events()) {
        let mut fsm = ConnectionFsm::new();
        let mut outputs = CountingConnectionOutputs::default();
        let mut panicked_at_effects = None;
        for event in storm {
            fsm.on_link_event(event, &mut outputs);
            match panicked_at_effects {
                None => {
                    if fsm.state() == ConnectionState::SenderPanic {
                        panicked_at_effects = Some(outputs.effects);
                    }
                }
                Some(frozen) => {
                    prop_assert_eq!(fsm.state(), ConnectionState::SenderPanic);
                    prop_assert_eq!(outputs.effects, frozen);
                }
            }
        }
    }

    #[test]
    fn duplicated_lid_events_are_inert(storm in lid_positions()) {
        // Every state entered by an event ignores a repeat of that same
        // event, so delivering each event twice must track a single
        // delivery exactly, with no extra effects.
        let mut once = DeliveryFsm::new(500, 5000);
        let mut twice = DeliveryFsm::new(500, 5000);
        let mut sink_a = CountingDeliveryOutputs::default();
        let mut sink_b = CountingDeliveryOutputs::default();
        for position in storm {
            once.on_position(position, &mut sink_a).unwrap();
            twice.on_position(position, &mut sink_b).unwrap();
            let effects_after_first = sink_b.effects;
            twice.on_position(position, &mut sink_b).unwrap();
            prop_assert_eq!(twice.state(), once.state());
            prop_assert_eq!(sink_b.effects, effects_after_first);
        }
    }

    #[test]
    fn tilt_never_invents_signal_loss(storm in motion_statuses()) {
        let mut confirmer = TiltConfirmer::new(2500);
        let mut now_ms = 0u32;
        let mut signal_lost_seen = false;
        for status in storm {
            signal_lost_seen |= status == MotionStatus::SignalLost;
            let out = confirmer.on_sample(MotionReport::new(status, 5.0), now_ms);
            if !signal_lost_seen {
                prop_assert_ne!(out.status, MotionStatus::SignalLost);
            }
            now_ms = now_ms.wrapping_add(50);
        }
    }

    #[test]
    fn debounce_action_runs_at_most_once_per_start(
        ops in prop::collection::vec(0u8..4, 0..64),
    ) {
        let runs = std::rc::Rc::new(core::cell::Cell::new(0u32));
        let timer = DebounceTimer::new("prop", NullBackend, Counter(runs.clone()));
        let mut starts = 0u32;
        for op in ops {
            match op {
                0 => {
                    timer.start(100).unwrap();
                    starts += 1;
                }
                1 => timer.reset().unwrap(),
                2 => timer.stop().unwrap(),
                _ => timer.notify_expired(),
            }
        }
        prop_assert!(runs.get() <= starts);
        // An infallible backend never faults the timer.
        prop_assert_ne!(timer.state(), TimerState::Failed);
    }
}
