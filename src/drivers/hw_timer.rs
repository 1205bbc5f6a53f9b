//! esp_timer-backed countdown backends.
//!
//! [`EspOneShot`] and [`EspPeriodic`] implement the timer port traits
//! on top of ESP-IDF's `esp_timer` service. Expiry callbacks run in
//! the esp_timer task context (not ISR), so they may take the debounce
//! timer's lock or post to a channel.
//!
//! The whole module is target-only; host tests drive the timer FSMs
//! with recording mocks instead.

#![cfg(target_os = "espidf")]

use core::ffi::{CStr, c_void};

use esp_idf_svc::sys::*;

use crate::error::TimerError;
use crate::timer::{OneShotBackend, PeriodicBackend};

/// Expiry callback signature as esp_timer wants it. The `arg` is
/// always null; callbacks reach their owner through a static.
pub type ExpiryCallback = unsafe extern "C" fn(*mut c_void);

fn create_timer(
    name: &'static CStr,
    callback: ExpiryCallback,
) -> Result<esp_timer_handle_t, TimerError> {
    let args = esp_timer_create_args_t {
        callback: Some(callback),
        arg: core::ptr::null_mut(),
        dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
        name: name.as_ptr(),
        skip_unhandled_events: false,
    };
    let mut handle: esp_timer_handle_t = core::ptr::null_mut();
    // SAFETY: args outlives the call; esp_timer copies what it keeps.
    let ret = unsafe { esp_timer_create(&args, &mut handle) };
    if ret != ESP_OK {
        return Err(TimerError::CreateFailed);
    }
    Ok(handle)
}

/// Stop a timer, treating "was not running" as success.
fn stop_timer(handle: esp_timer_handle_t) -> Result<(), TimerError> {
    // SAFETY: handle came from esp_timer_create and has not been deleted.
    let ret = unsafe { esp_timer_stop(handle) };
    if ret == ESP_OK || ret == ESP_ERR_INVALID_STATE {
        Ok(())
    } else {
        Err(TimerError::CancelFailed)
    }
}

// ── One-shot ──────────────────────────────────────────────────

/// One-shot countdown over an `esp_timer` handle.
pub struct EspOneShot {
    handle: esp_timer_handle_t,
    name: &'static CStr,
    callback: ExpiryCallback,
    last_ms: u32,
}

impl EspOneShot {
    pub fn new(name: &'static CStr, callback: ExpiryCallback) -> Result<Self, TimerError> {
        Ok(Self {
            handle: create_timer(name, callback)?,
            name,
            callback,
            last_ms: 0,
        })
    }

    fn start_once(&self, duration_ms: u32) -> Result<(), TimerError> {
        // SAFETY: handle is valid; a still-armed countdown was stopped
        // by the caller.
        let ret = unsafe { esp_timer_start_once(self.handle, u64::from(duration_ms) * 1_000) };
        if ret != ESP_OK {
            return Err(TimerError::ArmFailed);
        }
        Ok(())
    }
}

// SAFETY: the handle is only manipulated through &mut self or, for the
// debounce timer, under its control-block lock; esp_timer's own API is
// task-safe.
unsafe impl Send for EspOneShot {}

impl OneShotBackend for EspOneShot {
    fn arm(&mut self, duration_ms: u32) -> Result<(), TimerError> {
        stop_timer(self.handle).map_err(|_| TimerError::ArmFailed)?;
        self.start_once(duration_ms)?;
        self.last_ms = duration_ms;
        Ok(())
    }

    fn rearm(&mut self) -> Result<(), TimerError> {
        stop_timer(self.handle).map_err(|_| TimerError::ResetFailed)?;
        self.start_once(self.last_ms)
            .map_err(|_| TimerError::ResetFailed)
    }

    fn cancel(&mut self) -> Result<(), TimerError> {
        stop_timer(self.handle)
    }

    fn recreate(&mut self) -> Result<(), TimerError> {
        let _ = stop_timer(self.handle);
        // SAFETY: handle is valid and stopped; it is replaced before
        // anything else can observe it.
        unsafe { esp_timer_delete(self.handle) };
        self.handle = create_timer(self.name, self.callback)?;
        Ok(())
    }
}

// ── Periodic ──────────────────────────────────────────────────

/// Auto-reloading countdown over an `esp_timer` handle, the watchdog
/// tick source.
pub struct EspPeriodic {
    handle: esp_timer_handle_t,
    period_ms: u32,
}

impl EspPeriodic {
    pub fn new(name: &'static CStr, callback: ExpiryCallback) -> Result<Self, TimerError> {
        Ok(Self {
            handle: create_timer(name, callback)?,
            period_ms: 0,
        })
    }

    fn start_periodic(&self, period_ms: u32) -> Result<(), TimerError> {
        // SAFETY: handle is valid; any running period was stopped first.
        let ret = unsafe { esp_timer_start_periodic(self.handle, u64::from(period_ms) * 1_000) };
        if ret != ESP_OK {
            return Err(TimerError::ArmFailed);
        }
        Ok(())
    }
}

// SAFETY: same ownership discipline as EspOneShot.
unsafe impl Send for EspPeriodic {}

impl PeriodicBackend for EspPeriodic {
    fn start(&mut self, period_ms: u32) -> Result<(), TimerError> {
        stop_timer(self.handle).map_err(|_| TimerError::ArmFailed)?;
        self.start_periodic(period_ms)?;
        self.period_ms = period_ms;
        Ok(())
    }

    fn rearm(&mut self) -> Result<(), TimerError> {
        stop_timer(self.handle).map_err(|_| TimerError::ResetFailed)?;
        self.start_periodic(self.period_ms)
            .map_err(|_| TimerError::ResetFailed)
    }
}
