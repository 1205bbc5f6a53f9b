//! Elapsed-since-delivery stopwatch.
//!
//! The delivery FSM starts it on confirmed completion; the display
//! worker periodically renders the elapsed minutes. The start instant
//! lives in a shared cell because the writer (delivery worker) and the
//! reader (display worker) are different threads. Generic over the
//! [`Clock`] port so it runs under host tests with a manual clock.

use core::cell::Cell;
use core::fmt::Write as _;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use crate::app::ports::{Clock, StopwatchPort};
use crate::events::MAX_DISPLAY_TEXT;

/// The shared start instant. `None` until the first delivery.
pub struct StopwatchStart(Mutex<CriticalSectionRawMutex, Cell<Option<u32>>>);

impl StopwatchStart {
    pub const fn new() -> Self {
        Self(Mutex::new(Cell::new(None)))
    }

    fn set(&self, at_ms: u32) {
        self.0.lock(|cell| cell.set(Some(at_ms)));
    }

    fn get(&self) -> Option<u32> {
        self.0.lock(Cell::get)
    }
}

impl Default for StopwatchStart {
    fn default() -> Self {
        Self::new()
    }
}

/// Stopwatch view over a [`StopwatchStart`]; each worker holds its own
/// copy bound to the same cell.
pub struct ElapsedStopwatch<C: Clock> {
    clock: C,
    start: &'static StopwatchStart,
}

impl<C: Clock> ElapsedStopwatch<C> {
    pub fn new(clock: C, start: &'static StopwatchStart) -> Self {
        Self { clock, start }
    }

    /// Whole minutes since the last `start`, if running.
    pub fn elapsed_minutes(&self) -> Option<u32> {
        let started = self.start.get()?;
        Some(self.clock.now_ms().wrapping_sub(started) / 60_000)
    }

    /// Display text for the elapsed screen, e.g. `"73 min ago"`.
    /// Empty when the stopwatch has never been started.
    pub fn display_text(&self) -> heapless::String<MAX_DISPLAY_TEXT> {
        let mut text = heapless::String::new();
        if let Some(minutes) = self.elapsed_minutes() {
            // A 16-char line always fits u32 minutes; write cannot fail.
            let _ = write!(text, "{minutes} min ago");
        }
        text
    }
}

impl<C: Clock> StopwatchPort for ElapsedStopwatch<C> {
    fn start(&mut self) {
        self.start.set(self.clock.now_ms());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::time::ManualClock;

    #[test]
    fn idle_until_started() {
        static START: StopwatchStart = StopwatchStart::new();
        let clock = ManualClock::new();
        let sw = ElapsedStopwatch::new(clock, &START);
        assert_eq!(sw.elapsed_minutes(), None);
        assert!(sw.display_text().is_empty());
    }

    #[test]
    fn counts_whole_minutes() {
        static START: StopwatchStart = StopwatchStart::new();
        let clock = ManualClock::new();
        let mut sw = ElapsedStopwatch::new(clock.clone(), &START);
        clock.set(10_000);
        sw.start();
        clock.set(10_000 + 73 * 60_000 + 59_999);
        assert_eq!(sw.elapsed_minutes(), Some(73));
        assert_eq!(sw.display_text().as_str(), "73 min ago");
    }

    #[test]
    fn writer_and_reader_share_the_start() {
        static START: StopwatchStart = StopwatchStart::new();
        let clock = ManualClock::new();
        let mut writer = ElapsedStopwatch::new(clock.clone(), &START);
        let reader = ElapsedStopwatch::new(clock.clone(), &START);
        clock.set(30_000);
        writer.start();
        clock.set(150_000);
        assert_eq!(reader.elapsed_minutes(), Some(2));
    }
}
