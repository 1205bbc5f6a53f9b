//! NTC thermistor temperature sensor (10 kOhm @ 25 C, B = 3950).
//!
//! Wired in a voltage-divider with a fixed 10 kOhm resistor, read via
//! ADC1. The simplified Beta (Steinhart-Hart) equation converts
//! resistance to temperature. The reading rides along on every radio
//! record.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the thermistor channel via the oneshot ADC unit.
//! On host/test: reads from a static AtomicU16 for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

#[cfg(not(target_os = "espidf"))]
static SIM_TEMP_ADC: AtomicU16 = AtomicU16::new(2048);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_temp_adc(raw: u16) {
    SIM_TEMP_ADC.store(raw, Ordering::Relaxed);
}

const R25: f32 = 10_000.0;
const BETA: f32 = 3950.0;
const T25_K: f32 = 298.15;
const R_DIVIDER: f32 = 10_000.0;
const ADC_MAX: f32 = 4095.0;
const V_REF: f32 = 3.3;

/// Fallback for shorted/open divider readings.
const FAULT_CELSIUS: f32 = -40.0;

pub struct TemperatureSensor;

impl TemperatureSensor {
    pub fn new() -> Self {
        Self
    }

    pub fn read_celsius(&self) -> f32 {
        adc_to_celsius(self.read_adc())
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> u16 {
        crate::drivers::hw_init::temperature_adc_read()
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> u16 {
        SIM_TEMP_ADC.load(Ordering::Relaxed)
    }
}

impl Default for TemperatureSensor {
    fn default() -> Self {
        Self::new()
    }
}

fn adc_to_celsius(raw: u16) -> f32 {
    let voltage = (raw as f32 / ADC_MAX) * V_REF;
    if voltage <= 0.01 || voltage >= (V_REF - 0.01) {
        return FAULT_CELSIUS;
    }
    let r_ntc = R_DIVIDER * voltage / (V_REF - voltage);
    let inv_t = (1.0 / T25_K) + (1.0 / BETA) * (r_ntc / R25).ln();
    if inv_t <= 0.0 {
        return FAULT_CELSIUS;
    }
    (1.0 / inv_t) - 273.15
}
