//! One-shot debounce timer with a bound expiry action.
//!
//! The confirmation-window primitive every state machine leans on:
//! `start(duration)` arms a countdown, `reset()` is the confirmation-
//! extension primitive (restart the same window), `stop()` disarms,
//! and exactly one expiry runs the bound [`ExpiryAction`].
//!
//! The control block is driven from two execution contexts — the
//! owning worker's control calls and the timer-service expiry
//! callback — so every entry point routes through one table-driven
//! transition function under a single lock. Whichever context takes
//! the lock first determines the outcome of a race; the table records
//! the ignore sentinel for combinations that must have no effect
//! (e.g. an expiry that lost the race against `stop`).

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use log::error;

use crate::error::TimerError;
use crate::fsm::{TableEnum, TransitionTable};
use crate::timer::{ExpiryAction, OneShotBackend};

/// Debounce timer states. `Stopping` doubles as the initial (idle)
/// state; `Failed` is terminal until `force_clear`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TimerState {
    /// Countdown completed and the action has run.
    Expired = 0,
    /// Countdown restarted from the configured duration.
    Resetting = 1,
    /// Countdown armed with a fresh duration.
    Starting = 2,
    /// Countdown cancelled / never armed.
    Stopping = 3,
    /// The backend could not be manipulated. Terminal until cleared.
    Failed = 4,
}

impl TableEnum for TimerState {
    const COUNT: usize = 5;
    fn index(self) -> usize {
        self as usize
    }
}

/// Debounce timer events. `Expire` arrives from the timer-service
/// context; the rest are owner control calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TimerEvent {
    Expire = 0,
    Reset = 1,
    Start = 2,
    Stop = 3,
}

impl TableEnum for TimerEvent {
    const COUNT: usize = 4;
    fn index(self) -> usize {
        self as usize
    }
}

/// (state, event) → next state. The `Failed` row ignores everything:
/// a faulted timer reacts only to `force_clear`.
const TRANSITIONS: TransitionTable<TimerState, 5, 4> = {
    use TimerState::{Expired, Resetting, Starting, Stopping};
    TransitionTable::new([
        // Expire          Reset            Start            Stop
        [None, None, Some(Starting), None],                            // Expired
        [Some(Expired), Some(Resetting), Some(Starting), Some(Stopping)], // Resetting
        [Some(Expired), Some(Resetting), Some(Starting), Some(Stopping)], // Starting
        [None, None, Some(Starting), None],                            // Stopping
        [None, None, None, None],                                      // Failed
    ])
};

struct Inner<B, A> {
    state: TimerState,
    duration_ms: u32,
    backend: B,
    action: A,
}

/// A one-shot countdown bound to an [`ExpiryAction`], owned by exactly
/// one FSM but driven from two contexts. All entry points take `&self`
/// and serialise on the internal lock.
pub struct DebounceTimer<B: OneShotBackend, A: ExpiryAction> {
    name: &'static str,
    inner: Mutex<CriticalSectionRawMutex, RefCell<Inner<B, A>>>,
}

impl<B: OneShotBackend, A: ExpiryAction> DebounceTimer<B, A> {
    pub fn new(name: &'static str, backend: B, action: A) -> Self {
        Self {
            name,
            inner: Mutex::new(RefCell::new(Inner {
                state: TimerState::Stopping,
                duration_ms: 0,
                backend,
                action,
            })),
        }
    }

    /// Arm a single countdown of `duration_ms`, cancelling and
    /// replacing any pending countdown.
    pub fn start(&self, duration_ms: u32) -> Result<(), TimerError> {
        self.transition(TimerEvent::Start, Some(duration_ms))
    }

    /// Restart the currently configured countdown without changing its
    /// duration. Ignored while stopped or expired.
    pub fn reset(&self) -> Result<(), TimerError> {
        self.transition(TimerEvent::Reset, None)
    }

    /// Cancel any pending countdown. No side effect if none is pending.
    pub fn stop(&self) -> Result<(), TimerError> {
        self.transition(TimerEvent::Stop, None)
    }

    /// Expiry entry point, called from the timer-service context. Runs
    /// the action exactly once per armed countdown; an expiry that lost
    /// the race against `stop` is ignored.
    pub fn notify_expired(&self) {
        // Expiry failures have nowhere useful to go; the action itself
        // is infallible and backend calls do not occur on this path.
        let _ = self.transition(TimerEvent::Expire, None);
    }

    /// Escape hatch: recover from a `Failed` backend by tearing the
    /// resource down and recreating it. Lands in `Stopping` on success
    /// and stays `Failed` on failure.
    pub fn force_clear(&self) -> Result<(), TimerError> {
        self.inner.lock(|cell| {
            let mut inner = cell.borrow_mut();
            match inner.backend.cancel().and_then(|()| inner.backend.recreate()) {
                Ok(()) => {
                    inner.state = TimerState::Stopping;
                    Ok(())
                }
                Err(e) => {
                    error!("{}: force_clear failed: {e}", self.name);
                    inner.state = TimerState::Failed;
                    Err(e)
                }
            }
        })
    }

    /// Current state (for owners that must escalate on `Failed`).
    pub fn state(&self) -> TimerState {
        self.inner.lock(|cell| cell.borrow().state)
    }

    /// The currently configured countdown duration.
    pub fn duration_ms(&self) -> u32 {
        self.inner.lock(|cell| cell.borrow().duration_ms)
    }

    fn transition(&self, event: TimerEvent, new_duration: Option<u32>) -> Result<(), TimerError> {
        self.inner.lock(|cell| {
            let mut inner = cell.borrow_mut();

            // A faulted timer is reported, not silently ignored; the
            // owner decides how hard to escalate.
            if inner.state == TimerState::Failed {
                return Err(TimerError::Faulted);
            }

            let mut state = inner.state;
            let Some(entered) = TRANSITIONS.step(&mut state, event, self.name) else {
                return Ok(());
            };
            inner.state = state;

            let result = match entered {
                TimerState::Expired => {
                    inner.action.run();
                    Ok(())
                }
                TimerState::Starting => {
                    if let Some(d) = new_duration {
                        inner.duration_ms = d;
                    }
                    let d = inner.duration_ms;
                    inner.backend.arm(d)
                }
                TimerState::Resetting => inner.backend.rearm(),
                TimerState::Stopping => inner.backend.cancel(),
                // Failed is never a table target; Expired handled above.
                TimerState::Failed => Ok(()),
            };

            if let Err(e) = result {
                error!("{}: backend fault on {:?}: {e}", self.name, event);
                inner.state = TimerState::Failed;
                return Err(e);
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use std::cell::RefCell as StdRefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Call {
        Arm(u32),
        Rearm,
        Cancel,
        Recreate,
    }

    #[derive(Default)]
    struct MockBackend {
        calls: Rc<StdRefCell<Vec<Call>>>,
        fail_arm: bool,
        fail_recreate: bool,
    }

    impl OneShotBackend for MockBackend {
        fn arm(&mut self, duration_ms: u32) -> Result<(), TimerError> {
            if self.fail_arm {
                return Err(TimerError::ArmFailed);
            }
            self.calls.borrow_mut().push(Call::Arm(duration_ms));
            Ok(())
        }
        fn rearm(&mut self) -> Result<(), TimerError> {
            self.calls.borrow_mut().push(Call::Rearm);
            Ok(())
        }
        fn cancel(&mut self) -> Result<(), TimerError> {
            self.calls.borrow_mut().push(Call::Cancel);
            Ok(())
        }
        fn recreate(&mut self) -> Result<(), TimerError> {
            if self.fail_recreate {
                return Err(TimerError::CreateFailed);
            }
            self.calls.borrow_mut().push(Call::Recreate);
            Ok(())
        }
    }

    struct CountingAction {
        runs: Rc<Cell<u32>>,
    }

    impl ExpiryAction for CountingAction {
        fn run(&self) {
            self.runs.set(self.runs.get() + 1);
        }
    }

    fn make_timer(
        backend: MockBackend,
    ) -> (DebounceTimer<MockBackend, CountingAction>, Rc<Cell<u32>>) {
        let runs = Rc::new(Cell::new(0));
        let action = CountingAction { runs: runs.clone() };
        (DebounceTimer::new("test-timer", backend, action), runs)
    }

    #[test]
    fn starts_idle() {
        let (timer, runs) = make_timer(MockBackend::default());
        assert_eq!(timer.state(), TimerState::Stopping);
        assert_eq!(runs.get(), 0);
    }

    #[test]
    fn start_then_stop_never_runs_action() {
        let (timer, runs) = make_timer(MockBackend::default());
        timer.start(500).unwrap();
        timer.stop().unwrap();
        // A late expiry callback that lost the race against stop.
        timer.notify_expired();
        assert_eq!(runs.get(), 0);
        assert_eq!(timer.state(), TimerState::Stopping);
    }

    #[test]
    fn expiry_runs_action_exactly_once() {
        let (timer, runs) = make_timer(MockBackend::default());
        timer.start(500).unwrap();
        timer.notify_expired();
        timer.notify_expired(); // spurious second callback
        assert_eq!(runs.get(), 1);
        assert_eq!(timer.state(), TimerState::Expired);
    }

    #[test]
    fn restartable_after_expiry() {
        let (timer, runs) = make_timer(MockBackend::default());
        timer.start(500).unwrap();
        timer.notify_expired();
        timer.start(500).unwrap();
        timer.notify_expired();
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn reset_restarts_without_changing_duration() {
        let backend = MockBackend::default();
        let calls = backend.calls.clone();
        let (timer, _runs) = make_timer(backend);
        timer.start(500).unwrap();
        timer.reset().unwrap();
        timer.reset().unwrap();
        assert_eq!(timer.duration_ms(), 500);
        assert_eq!(
            *calls.borrow(),
            vec![Call::Arm(500), Call::Rearm, Call::Rearm]
        );
    }

    #[test]
    fn reset_while_stopped_is_ignored() {
        let backend = MockBackend::default();
        let calls = backend.calls.clone();
        let (timer, _runs) = make_timer(backend);
        timer.reset().unwrap();
        assert!(calls.borrow().is_empty());
        assert_eq!(timer.state(), TimerState::Stopping);
    }

    #[test]
    fn start_replaces_pending_countdown() {
        let backend = MockBackend::default();
        let calls = backend.calls.clone();
        let (timer, _runs) = make_timer(backend);
        timer.start(500).unwrap();
        timer.start(5000).unwrap();
        assert_eq!(timer.duration_ms(), 5000);
        assert_eq!(*calls.borrow(), vec![Call::Arm(500), Call::Arm(5000)]);
    }

    #[test]
    fn backend_fault_is_terminal_until_cleared() {
        let backend = MockBackend {
            fail_arm: true,
            ..MockBackend::default()
        };
        let (timer, runs) = make_timer(backend);
        assert_eq!(timer.start(500), Err(TimerError::ArmFailed));
        assert_eq!(timer.state(), TimerState::Failed);

        // Everything is reported as faulted, nothing retried.
        assert_eq!(timer.stop(), Err(TimerError::Faulted));
        assert_eq!(timer.reset(), Err(TimerError::Faulted));
        timer.notify_expired();
        assert_eq!(runs.get(), 0);
        assert_eq!(timer.state(), TimerState::Failed);
    }

    #[test]
    fn force_clear_recovers_failed_timer() {
        let backend = MockBackend {
            fail_arm: true,
            ..MockBackend::default()
        };
        let (timer, _runs) = make_timer(backend);
        let _ = timer.start(500);
        assert_eq!(timer.state(), TimerState::Failed);

        timer.force_clear().unwrap();
        assert_eq!(timer.state(), TimerState::Stopping);
    }

    #[test]
    fn force_clear_failure_stays_failed() {
        let backend = MockBackend {
            fail_arm: true,
            fail_recreate: true,
            ..MockBackend::default()
        };
        let (timer, _runs) = make_timer(backend);
        let _ = timer.start(500);
        assert_eq!(timer.force_clear(), Err(TimerError::CreateFailed));
        assert_eq!(timer.state(), TimerState::Failed);
    }
}
