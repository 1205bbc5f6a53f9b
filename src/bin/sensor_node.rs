//! Sensor-node binary.
//!
//! Lives on the delivery-box lid: samples the accelerometer on a fixed
//! cadence, debounces the tilt classification through the confirmation
//! FSM, and radios one record per tick to the base station. The record
//! stream doubles as the base station's heartbeat, so the loop never
//! skips a tick — even an unchanged position goes out.

use std::time::Duration;

use anyhow::{Result, anyhow};
use log::{error, info};

use lidwatch::adapters::espnow::{BASE_STATION_MAC, EspNowRadio, start_wifi};
use lidwatch::adapters::log_sink::LogEventSink;
use lidwatch::adapters::time::EspClock;
use lidwatch::app::ports::Clock;
use lidwatch::app::service::SensorService;
use lidwatch::config::SystemConfig;
use lidwatch::drivers::hw_init;
use lidwatch::events::MotionStatus;
use lidwatch::pins;
use lidwatch::sensors::TiltSensor;

fn main() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("LidWatch sensor node v{}", env!("CARGO_PKG_VERSION"));

    let config = SystemConfig::default();

    if let Err(e) = hw_init::init_sensor_node() {
        // Without the IMU and ADC there is nothing useful to run; hold
        // here until the hardware watchdog resets us.
        error!("peripheral init failed: {e} — halting");
        #[allow(clippy::empty_loop)]
        loop {}
    }

    let _wifi = start_wifi().map_err(|e| anyhow!("wifi sta start failed: {e}"))?;
    let mut radio =
        EspNowRadio::new(BASE_STATION_MAC).map_err(|e| anyhow!("radio init failed: {e}"))?;

    let clock = EspClock::new();
    let mut sensor = TiltSensor::new(config.inclination_threshold_deg);
    let mut service = SensorService::new(&config);
    let mut sink = LogEventSink::new();

    info!(
        "sampling every {} ms, raised above {} degrees",
        config.sample_period_ms, config.inclination_threshold_deg
    );

    loop {
        match service.tick(clock.now_ms(), &mut sensor, &mut radio, &mut sink) {
            Ok(raw) => {
                hw_init::gpio_write(pins::TILT_LED_GPIO, raw == MotionStatus::Raised);
            }
            Err(e) => {
                // A failed send drops one record; the next tick retries.
                error!("sample tick failed: {e}");
            }
        }
        std::thread::sleep(Duration::from_millis(u64::from(config.sample_period_ms)));
    }
}
