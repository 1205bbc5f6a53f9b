//! GPIO indicator LEDs.
//!
//! [`GpioIndicator`] is the plain on/off implementation of
//! [`IndicatorPort`]. The disconnected LED blinks instead, so its port
//! implementation only flips a shared flag; a dedicated blinker thread
//! owns the pin and toggles it while the flag is set.

use core::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::app::ports::IndicatorPort;
use crate::drivers::hw_init;

/// On/off LED on a single output pin.
pub struct GpioIndicator {
    pin: i32,
}

impl GpioIndicator {
    pub fn new(pin: i32) -> Self {
        Self { pin }
    }
}

impl IndicatorPort for GpioIndicator {
    fn set(&mut self, on: bool) {
        hw_init::gpio_write(self.pin, on);
    }
}

/// Shared blink-enable flag for the disconnected LED.
pub static DISCONNECTED_BLINK: AtomicBool = AtomicBool::new(false);

const BLINK_HALF_PERIOD_MS: u64 = 500;

/// [`IndicatorPort`] that arms or disarms a blinker instead of driving
/// the pin directly.
pub struct BlinkIndicator {
    flag: &'static AtomicBool,
}

impl BlinkIndicator {
    pub fn new(flag: &'static AtomicBool) -> Self {
        Self { flag }
    }
}

impl IndicatorPort for BlinkIndicator {
    fn set(&mut self, on: bool) {
        self.flag.store(on, Ordering::Relaxed);
    }
}

/// Blinker loop: toggles `pin` at 1 Hz while `flag` is set, holds it
/// low otherwise. Runs forever on its own thread.
pub fn blinker(flag: &'static AtomicBool, pin: i32) -> ! {
    let mut level = false;
    loop {
        if flag.load(Ordering::Relaxed) {
            level = !level;
        } else {
            level = false;
        }
        hw_init::gpio_write(pin, level);
        std::thread::sleep(Duration::from_millis(BLINK_HALF_PERIOD_MS));
    }
}

/// Delivery LED worker loop: holds the pin per the last illumination
/// request; `Blink` toggles until the next request arrives (the blink
/// holds double as the queue wait).
#[cfg(target_os = "espidf")]
pub fn delivery_led(pin: i32) -> ! {
    use embassy_time::Duration;

    use crate::app::channels::{ILLUMINATION_CHANNEL, recv_timeout};
    use crate::events::LedIllumination;

    const DELIVERY_BLINK_ON_MS: u64 = 500;
    const DELIVERY_BLINK_OFF_MS: u64 = 500;

    let mut current = LedIllumination::Off;
    loop {
        match current {
            LedIllumination::Off | LedIllumination::On => {
                hw_init::gpio_write(pin, current == LedIllumination::On);
                if let Some(next) =
                    recv_timeout(&ILLUMINATION_CHANNEL, Duration::from_millis(60_000))
                {
                    current = next;
                }
            }
            LedIllumination::Blink => {
                hw_init::gpio_write(pin, true);
                if let Some(next) =
                    recv_timeout(&ILLUMINATION_CHANNEL, Duration::from_millis(DELIVERY_BLINK_ON_MS))
                {
                    current = next;
                    continue;
                }
                hw_init::gpio_write(pin, false);
                if let Some(next) = recv_timeout(
                    &ILLUMINATION_CHANNEL,
                    Duration::from_millis(DELIVERY_BLINK_OFF_MS),
                ) {
                    current = next;
                }
            }
        }
    }
}
