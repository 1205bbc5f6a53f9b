//! Countdown timer abstractions.
//!
//! The FSMs never touch the timer service directly; they drive these
//! port traits. On the target the backends wrap `esp_timer` handles
//! (see `drivers::hw_timer`); host tests substitute recording mocks
//! and deliver expiry by calling the owner's expiry entry point.
//!
//! Expiry callbacks run on the timer-service task, concurrently with
//! the owning worker — the debounce timer's control block is the only
//! lock-guarded shared state in the system for exactly this reason.

pub mod debounce;
pub mod watchdog;

use crate::error::TimerError;

/// One-shot countdown resource, the primitive under [`debounce::DebounceTimer`].
///
/// The backend delivers expiry by invoking whatever registration the
/// adapter set up at wiring time (a callback into `notify_expired`, or
/// a message posted to the owner's queue). It never transitions FSM
/// state itself.
pub trait OneShotBackend {
    /// Arm a single countdown of `duration_ms`, cancelling and
    /// replacing any pending countdown.
    fn arm(&mut self, duration_ms: u32) -> Result<(), TimerError>;

    /// Restart the countdown from the most recently armed duration.
    fn rearm(&mut self) -> Result<(), TimerError>;

    /// Cancel any pending countdown. No effect if none is pending.
    fn cancel(&mut self) -> Result<(), TimerError>;

    /// Tear down and recreate the underlying resource. Used only by
    /// `force_clear` to recover from a failed backend.
    fn recreate(&mut self) -> Result<(), TimerError>;
}

/// Auto-reloading periodic countdown, the primitive under
/// [`watchdog::LivenessWatchdog`].
pub trait PeriodicBackend {
    /// Arm the periodic countdown with the given period.
    fn start(&mut self, period_ms: u32) -> Result<(), TimerError>;

    /// Restart the current period from now.
    fn rearm(&mut self) -> Result<(), TimerError>;
}

/// A zero-argument, side-effecting callback bound to a debounce timer,
/// run exactly once per expiry. Implementations typically enqueue a
/// preconfigured event; they must not call back into the owning timer
/// (it holds its lock while running the action).
pub trait ExpiryAction {
    fn run(&self);
}
