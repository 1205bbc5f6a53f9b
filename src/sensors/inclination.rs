//! Lid inclination math.
//!
//! The lid's attitude comes back from the IMU as roll and pitch; the
//! lid is "raised" when the overall inclination from horizontal
//! exceeds the configured threshold regardless of direction, so the
//! two angles are folded into a single inclination:
//! `atan(sqrt(tan²(roll) + tan²(pitch)))`.

use crate::events::MotionStatus;

/// Overall inclination from horizontal, in degrees.
pub fn inclination_degrees(roll_deg: f32, pitch_deg: f32) -> f32 {
    let tan_roll = roll_deg.to_radians().tan();
    let tan_pitch = pitch_deg.to_radians().tan();
    (tan_roll * tan_roll + tan_pitch * tan_pitch)
        .sqrt()
        .atan()
        .to_degrees()
}

/// Classify one attitude sample against the raised threshold.
pub fn classify(roll_deg: f32, pitch_deg: f32, threshold_deg: f32) -> MotionStatus {
    if inclination_degrees(roll_deg, pitch_deg) > threshold_deg {
        MotionStatus::Raised
    } else {
        MotionStatus::NotMoved
    }
}
