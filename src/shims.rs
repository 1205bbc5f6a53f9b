//! ESP-IDF runtime symbol providers for third-party crates.
//!
//! `critical-section` and `embassy-time` both resolve their backing
//! symbols at link time; on the target the former is backed by a
//! reentrant process mutex and the latter by the `esp_timer` clock.

#![cfg(target_os = "espidf")]

use core::cell::RefCell;
use core::time::Duration;
use std::sync::{Mutex, MutexGuard};

static CS_MUTEX: Mutex<()> = Mutex::new(());

/// Per-thread reentrancy state: nesting depth plus the guard held while
/// the depth is non-zero.
struct CsState {
    depth: u8,
    guard: Option<MutexGuard<'static, ()>>,
}

thread_local! {
    static CS_STATE: RefCell<CsState> = const {
        RefCell::new(CsState { depth: 0, guard: None })
    };
}

/// Acquire symbol for `critical-section` 1.x. Reentrant per thread.
#[unsafe(no_mangle)]
pub extern "C" fn _critical_section_1_0_acquire() -> u8 {
    CS_STATE.with(|state| {
        let mut state = state.borrow_mut();
        if state.depth == 0 {
            state.guard = Some(CS_MUTEX.lock().expect("critical-section mutex poisoned"));
        }
        state.depth = state.depth.saturating_add(1);
        state.depth
    })
}

/// Release symbol for `critical-section` 1.x.
#[unsafe(no_mangle)]
pub extern "C" fn _critical_section_1_0_release(_token: u8) {
    CS_STATE.with(|state| {
        let mut state = state.borrow_mut();
        if state.depth == 0 {
            return;
        }
        state.depth -= 1;
        if state.depth == 0 {
            state.guard = None;
        }
    })
}

/// Monotonic microsecond clock for `embassy-time`.
#[unsafe(no_mangle)]
pub extern "C" fn _embassy_time_now() -> u64 {
    unsafe { esp_idf_svc::sys::esp_timer_get_time() as u64 }
}

/// Wake scheduler for `embassy-time`'s generic queue; the worker
/// receive timeouts land here.
#[unsafe(no_mangle)]
pub extern "C" fn _embassy_time_schedule_wake(at: u64, waker: *mut core::ffi::c_void) {
    if waker.is_null() {
        return;
    }

    // SAFETY: embassy-time hands over a valid `Waker` pointer for the
    // duration of the call; the clone taken here outlives it.
    let waker = unsafe { (*(waker as *const core::task::Waker)).clone() };
    std::thread::spawn(move || {
        let now = _embassy_time_now();
        if at > now {
            std::thread::sleep(Duration::from_micros(at - now));
        }
        waker.wake();
    });
}
