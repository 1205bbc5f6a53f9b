//! System configuration parameters
//!
//! All tunable timing windows for both nodes, collected in one
//! serializable struct so the binaries share a single source of truth.

use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Sensor node ---
    /// Inclination sample period (milliseconds).
    pub sample_period_ms: u32,
    /// Inclination above this angle (degrees) reports the lid raised.
    pub inclination_threshold_deg: f32,
    /// Tilt confirmation window (milliseconds): a position change must
    /// persist this long before it is forwarded.
    pub tilt_confirm_ms: u32,

    // --- Base station ---
    /// Sensor-signal watchdog timeout (milliseconds). The sender's
    /// inclination source is down if no live position arrives within
    /// this window.
    pub signal_watchdog_ms: u32,
    /// Lid-open confirmation window (milliseconds). When the lid stays
    /// open this long, delivery has definitely started.
    pub open_confirm_ms: u32,
    /// Lid-close confirmation window (milliseconds). When the lid stays
    /// closed this long, delivery has definitely ended.
    pub close_confirm_ms: u32,
    /// Receiver link watchdog timeout (milliseconds). The link is down
    /// if no record arrives within this window.
    pub link_watchdog_ms: u32,

    // --- Workers ---
    /// Bounded-receive timeout for worker queue waits (milliseconds).
    /// Never an infinite wait where liveness matters.
    pub queue_wait_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Sensor node
            sample_period_ms: 50,
            inclination_threshold_deg: 30.0,
            tilt_confirm_ms: 2500,

            // Base station
            signal_watchdog_ms: 1510,
            open_confirm_ms: 500,
            close_confirm_ms: 5000,
            link_watchdog_ms: 1510,

            // Workers
            queue_wait_ms: 1000,
        }
    }
}
