//! MPU-6050 accelerometer attitude source.
//!
//! Roll and pitch are derived from the gravity vector; the tilt
//! confirmation FSM downstream handles the noise, so no fusion filter
//! is needed here. A read failure is reported as `None` — the caller
//! turns that into a signal-lost record, it is never a panic.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: raw I2C register reads via hw_init.
//! On host/test: angles injected into statics.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

#[cfg(not(target_os = "espidf"))]
static SIM_ROLL_BITS: AtomicU32 = AtomicU32::new(0);
#[cfg(not(target_os = "espidf"))]
static SIM_PITCH_BITS: AtomicU32 = AtomicU32::new(0);
#[cfg(not(target_os = "espidf"))]
static SIM_SIGNAL_LOST: AtomicBool = AtomicBool::new(false);

/// Inject an attitude for host tests.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_angles(roll_deg: f32, pitch_deg: f32) {
    SIM_ROLL_BITS.store(roll_deg.to_bits(), Ordering::Relaxed);
    SIM_PITCH_BITS.store(pitch_deg.to_bits(), Ordering::Relaxed);
}

/// Simulate losing the IMU for host tests.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_signal_lost(lost: bool) {
    SIM_SIGNAL_LOST.store(lost, Ordering::Relaxed);
}

pub struct Imu;

impl Imu {
    pub fn new() -> Self {
        Self
    }

    /// (roll, pitch) in degrees, or `None` when the IMU is unreadable.
    #[cfg(target_os = "espidf")]
    pub fn read_angles(&mut self) -> Option<(f32, f32)> {
        let [ax, ay, az] = crate::drivers::hw_init::imu_read_accel()?;
        let roll = ay.atan2(az).to_degrees();
        let pitch = (-ax).atan2((ay * ay + az * az).sqrt()).to_degrees();
        Some((roll, pitch))
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn read_angles(&mut self) -> Option<(f32, f32)> {
        if SIM_SIGNAL_LOST.load(Ordering::Relaxed) {
            return None;
        }
        Some((
            f32::from_bits(SIM_ROLL_BITS.load(Ordering::Relaxed)),
            f32::from_bits(SIM_PITCH_BITS.load(Ordering::Relaxed)),
        ))
    }
}

impl Default for Imu {
    fn default() -> Self {
        Self::new()
    }
}
