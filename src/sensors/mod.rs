//! Sensor subsystem — attitude and temperature, aggregated into one
//! [`SensorPort`] implementation for the sensor node.

pub mod imu;
pub mod inclination;
pub mod temperature;

use crate::app::ports::SensorPort;
use crate::events::{ABSOLUTE_ZERO_CELSIUS, MotionReport, MotionStatus};
use imu::Imu;
use temperature::TemperatureSensor;

/// Produces one raw [`MotionReport`] per sampling tick. IMU loss maps
/// to a `SignalLost` record with a sentinel temperature so the outage
/// travels the normal report path.
pub struct TiltSensor {
    threshold_deg: f32,
    imu: Imu,
    temperature: TemperatureSensor,
}

impl TiltSensor {
    pub fn new(threshold_deg: f32) -> Self {
        Self {
            threshold_deg,
            imu: Imu::new(),
            temperature: TemperatureSensor::new(),
        }
    }
}

impl SensorPort for TiltSensor {
    fn sample(&mut self) -> MotionReport {
        match self.imu.read_angles() {
            Some((roll, pitch)) => MotionReport::new(
                inclination::classify(roll, pitch, self.threshold_deg),
                self.temperature.read_celsius(),
            ),
            None => MotionReport::new(MotionStatus::SignalLost, ABSOLUTE_ZERO_CELSIUS),
        }
    }
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;

    // One test: the sim statics are process-wide, so the scenarios run
    // in sequence rather than racing each other.
    #[test]
    fn sample_classifies_and_survives_imu_loss() {
        let mut sensor = TiltSensor::new(30.0);

        imu::sim_set_signal_lost(false);
        imu::sim_set_angles(45.0, 0.0);
        let report = sensor.sample();
        assert_eq!(report.status, MotionStatus::Raised);
        assert!(report.temperature_celsius > ABSOLUTE_ZERO_CELSIUS);

        imu::sim_set_angles(5.0, 5.0);
        assert_eq!(sensor.sample().status, MotionStatus::NotMoved);

        imu::sim_set_signal_lost(true);
        let report = sensor.sample();
        assert_eq!(report.status, MotionStatus::SignalLost);
        assert_eq!(report.temperature_celsius, ABSOLUTE_ZERO_CELSIUS);
        imu::sim_set_signal_lost(false);
    }
}
