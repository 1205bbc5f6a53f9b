//! Periodic liveness watchdog.
//!
//! Pessimistic link monitor: the link is presumed down until fresh
//! traffic proves otherwise. `start` arms a self-reloading countdown
//! and immediately asserts down; every observed `Reset` keeps the
//! countdown from elapsing, and the reset that arrives while the link
//! is down is the exact transition that asserts up. If the countdown
//! elapses, down is asserted again on every further elapsed interval
//! until traffic resumes.
//!
//! Unlike the debounce timer this type is single-context: both the
//! owner's resets and the backend's expiries arrive as
//! [`WatchdogEvent`] messages on the owning worker's channel, so no
//! lock is needed.

use log::warn;

use crate::error::TimerError;
use crate::events::LinkEvent;
use crate::fsm::{TableEnum, TransitionTable};
use crate::timer::PeriodicBackend;

/// Consumer of the watchdog's link verdicts.
pub trait LinkSink {
    fn publish(&mut self, event: LinkEvent);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WatchdogState {
    Created = 0,
    Starting = 1,
    Resetting = 2,
    HasReset = 3,
    Expiring = 4,
    HasExpired = 5,
}

impl TableEnum for WatchdogState {
    const COUNT: usize = 6;
    fn index(self) -> usize {
        self as usize
    }
}

/// Inputs: `Reset` from the owner on fresh traffic, `Expire` from the
/// periodic backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WatchdogEvent {
    Reset = 0,
    Expire = 1,
}

impl TableEnum for WatchdogEvent {
    const COUNT: usize = 2;
    fn index(self) -> usize {
        self as usize
    }
}

/// (state, event) → next state. Every pair is meaningful here; the
/// self-loops on `HasReset` and `HasExpired` re-enter their state so
/// the entry effect (silent rearm, repeated down) runs again.
const TRANSITIONS: TransitionTable<WatchdogState, 6, 2> = {
    use WatchdogState::{Expiring, HasExpired, HasReset, Resetting, Starting};
    TransitionTable::new([
        // Reset             Expire
        [Some(Starting), Some(Expiring)],   // Created (expire should not happen)
        [Some(Resetting), Some(Expiring)],  // Starting
        [Some(HasReset), Some(Expiring)],   // Resetting
        [Some(HasReset), Some(Expiring)],   // HasReset
        [Some(Resetting), Some(HasExpired)], // Expiring
        [Some(Resetting), Some(HasExpired)], // HasExpired
    ])
};

/// One liveness watchdog instance. The system runs two: one per radio
/// link direction, differing only in timeout and sink.
pub struct LivenessWatchdog<B: PeriodicBackend> {
    name: &'static str,
    timeout_ms: u32,
    backend: B,
    state: WatchdogState,
}

impl<B: PeriodicBackend> LivenessWatchdog<B> {
    pub fn new(name: &'static str, timeout_ms: u32, backend: B) -> Self {
        Self {
            name,
            timeout_ms,
            backend,
            state: WatchdogState::Created,
        }
    }

    /// Arm the periodic countdown and assert down until traffic
    /// proves the link alive.
    pub fn start(&mut self, sink: &mut impl LinkSink) -> Result<(), TimerError> {
        self.backend.start(self.timeout_ms)?;
        sink.publish(LinkEvent::Down);
        self.state = WatchdogState::Starting;
        Ok(())
    }

    /// Feed one event through the transition table and run the entry
    /// effect of the state entered.
    pub fn on_event(
        &mut self,
        event: WatchdogEvent,
        sink: &mut impl LinkSink,
    ) -> Result<(), TimerError> {
        let Some(entered) = TRANSITIONS.step(&mut self.state, event, self.name) else {
            return Ok(());
        };
        match entered {
            WatchdogState::Created => Ok(()),
            WatchdogState::Starting => self.backend.start(self.timeout_ms),
            WatchdogState::Resetting => {
                // The reset that revives a down link.
                self.backend.rearm()?;
                sink.publish(LinkEvent::Up);
                Ok(())
            }
            WatchdogState::HasReset => self.backend.rearm(),
            WatchdogState::Expiring | WatchdogState::HasExpired => {
                warn!("{}: liveness timeout", self.name);
                sink.publish(LinkEvent::Down);
                Ok(())
            }
        }
    }

    pub fn state(&self) -> WatchdogState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MockBackend {
        starts: Vec<u32>,
        rearms: u32,
    }

    impl PeriodicBackend for MockBackend {
        fn start(&mut self, period_ms: u32) -> Result<(), TimerError> {
            self.starts.push(period_ms);
            Ok(())
        }
        fn rearm(&mut self) -> Result<(), TimerError> {
            self.rearms += 1;
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Vec<LinkEvent>,
    }

    impl LinkSink for RecordingSink {
        fn publish(&mut self, event: LinkEvent) {
            self.events.push(event);
        }
    }

    fn started() -> (LivenessWatchdog<MockBackend>, RecordingSink) {
        let mut wd = LivenessWatchdog::new("test-watchdog", 1510, MockBackend::default());
        let mut sink = RecordingSink::default();
        wd.start(&mut sink).unwrap();
        (wd, sink)
    }

    #[test]
    fn start_asserts_down_pessimistically() {
        let (wd, sink) = started();
        assert_eq!(sink.events, vec![LinkEvent::Down]);
        assert_eq!(wd.state(), WatchdogState::Starting);
        assert_eq!(wd.backend.starts, vec![1510]);
    }

    #[test]
    fn first_reset_asserts_up() {
        let (mut wd, mut sink) = started();
        wd.on_event(WatchdogEvent::Reset, &mut sink).unwrap();
        assert_eq!(sink.events, vec![LinkEvent::Down, LinkEvent::Up]);
        assert_eq!(wd.state(), WatchdogState::Resetting);
    }

    #[test]
    fn steady_resets_never_reassert_up() {
        let (mut wd, mut sink) = started();
        for _ in 0..5 {
            wd.on_event(WatchdogEvent::Reset, &mut sink).unwrap();
        }
        // One up on revival, then silent rearms.
        assert_eq!(sink.events, vec![LinkEvent::Down, LinkEvent::Up]);
        assert_eq!(wd.state(), WatchdogState::HasReset);
        assert_eq!(wd.backend.rearms, 5);
    }

    #[test]
    fn expiry_asserts_down_once_per_interval() {
        let (mut wd, mut sink) = started();
        wd.on_event(WatchdogEvent::Reset, &mut sink).unwrap();
        sink.events.clear();

        wd.on_event(WatchdogEvent::Expire, &mut sink).unwrap();
        assert_eq!(sink.events, vec![LinkEvent::Down]);
        assert_eq!(wd.state(), WatchdogState::Expiring);

        // Each further elapsed interval re-asserts down.
        wd.on_event(WatchdogEvent::Expire, &mut sink).unwrap();
        wd.on_event(WatchdogEvent::Expire, &mut sink).unwrap();
        assert_eq!(
            sink.events,
            vec![LinkEvent::Down, LinkEvent::Down, LinkEvent::Down]
        );
        assert_eq!(wd.state(), WatchdogState::HasExpired);
    }

    #[test]
    fn reset_revives_expired_link() {
        let (mut wd, mut sink) = started();
        wd.on_event(WatchdogEvent::Expire, &mut sink).unwrap();
        wd.on_event(WatchdogEvent::Expire, &mut sink).unwrap();
        sink.events.clear();

        wd.on_event(WatchdogEvent::Reset, &mut sink).unwrap();
        assert_eq!(sink.events, vec![LinkEvent::Up]);
        assert_eq!(wd.state(), WatchdogState::Resetting);
    }

    #[test]
    fn down_up_alternation_over_outages() {
        let (mut wd, mut sink) = started();
        wd.on_event(WatchdogEvent::Reset, &mut sink).unwrap();
        wd.on_event(WatchdogEvent::Expire, &mut sink).unwrap();
        wd.on_event(WatchdogEvent::Reset, &mut sink).unwrap();
        wd.on_event(WatchdogEvent::Expire, &mut sink).unwrap();
        assert_eq!(
            sink.events,
            vec![
                LinkEvent::Down,
                LinkEvent::Up,
                LinkEvent::Down,
                LinkEvent::Up,
                LinkEvent::Down,
            ]
        );
    }
}
