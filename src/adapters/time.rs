//! Uptime clock adapters for the [`Clock`] port.

use crate::app::ports::Clock;

/// Wrapping millisecond uptime from the esp_timer service.
#[cfg(feature = "espidf")]
#[derive(Clone, Copy, Default)]
pub struct EspClock;

#[cfg(feature = "espidf")]
impl EspClock {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "espidf")]
impl Clock for EspClock {
    fn now_ms(&self) -> u32 {
        // Microsecond uptime truncated to wrapping milliseconds; all
        // consumers use wrapping_sub arithmetic.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() } / 1000) as u32
    }
}

/// Hand-cranked clock for host tests.
#[cfg(not(target_os = "espidf"))]
#[derive(Clone, Default)]
pub struct ManualClock(std::rc::Rc<core::cell::Cell<u32>>);

#[cfg(not(target_os = "espidf"))]
impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, now_ms: u32) {
        self.0.set(now_ms);
    }

    pub fn advance(&self, delta_ms: u32) {
        self.0.set(self.0.get().wrapping_add(delta_ms));
    }
}

#[cfg(not(target_os = "espidf"))]
impl Clock for ManualClock {
    fn now_ms(&self) -> u32 {
        self.0.get()
    }
}
