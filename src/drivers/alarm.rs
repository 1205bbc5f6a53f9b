//! Alarm (beeper) worker.
//!
//! Maps each [`AlarmEvent`] to a level/duration pattern and plays it on
//! the buzzer pin, mirrored on the alarm LED. A pattern repeats until
//! the next request arrives; each step's hold time doubles as the
//! queue wait, so a new request interrupts mid-pattern.

#[cfg(target_os = "espidf")]
use embassy_time::Duration;

#[cfg(target_os = "espidf")]
use crate::app::channels::{ALARM_CHANNEL, recv_timeout};
#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::events::AlarmEvent;
#[cfg(target_os = "espidf")]
use crate::pins;

/// One pattern step: pin level and how long to hold it.
pub type Step = (bool, u16);

/// "Connected" is the quiet pattern: one long low hold.
pub const SILENCE: &[Step] = &[(false, 60_000)];

/// Short chirp every ten seconds until acknowledged.
pub const DELIVERED: &[Step] = &[(true, 100), (false, 9_900)];

/// Three beeps, then a long pause.
pub const DISCONNECTED: &[Step] = &[
    (true, 500),
    (false, 500),
    (true, 500),
    (false, 500),
    (true, 500),
    (false, 500),
    (false, 7_000),
];

/// Rapid chirping while the lid is open.
pub const LID_OPEN: &[Step] = &[(true, 100), (false, 100)];

/// Near-continuous tone for a sender-reported failure.
pub const PANIC: &[Step] = &[(true, 950), (false, 50)];

pub fn pattern_for(event: AlarmEvent) -> &'static [Step] {
    match event {
        AlarmEvent::Connected => SILENCE,
        AlarmEvent::Delivered => DELIVERED,
        AlarmEvent::Disconnected => DISCONNECTED,
        AlarmEvent::LidOpen => LID_OPEN,
        AlarmEvent::SenderPanic => PANIC,
    }
}

/// Alarm worker loop. Runs forever on its own thread.
#[cfg(target_os = "espidf")]
pub fn run() -> ! {
    let mut pattern = SILENCE;
    'pattern: loop {
        for &(level, hold_ms) in pattern.iter().cycle() {
            hw_init::gpio_write(pins::ALARM_GPIO, level);
            hw_init::gpio_write(pins::ALARM_LED_GPIO, level);
            if let Some(event) = recv_timeout(&ALARM_CHANNEL, Duration::from_millis(u64::from(hold_ms)))
            {
                pattern = pattern_for(event);
                continue 'pattern;
            }
        }
    }
}
