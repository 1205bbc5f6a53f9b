//! One-shot peripheral initialization for both boards.
//!
//! Configures the thermistor ADC channel, the MPU-6050 I2C bus, and the
//! GPIO outputs using raw ESP-IDF sys calls (I2C goes through the HAL
//! driver so the bus handle can live in a static). Called once from the
//! binary's `main()` before any worker starts.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
    I2cInitFailed(i32),
    ImuWakeFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::I2cInitFailed(rc) => write!(f, "I2C master init failed (rc={})", rc),
            Self::ImuWakeFailed(rc) => write!(f, "MPU-6050 wake failed (rc={})", rc),
        }
    }
}

impl std::error::Error for HwInitError {}

// ── Board init entry points ───────────────────────────────────

/// Sensor-node peripherals: thermistor ADC, IMU I2C bus, tilt LED.
#[cfg(target_os = "espidf")]
pub fn init_sensor_node() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before any worker thread starts;
    // single-threaded at this point.
    unsafe {
        init_adc()?;
        init_gpio_outputs(&[pins::BUILTIN_LED_GPIO, pins::TILT_LED_GPIO])?;
    }
    init_imu_bus()?;
    info!("hw_init: sensor-node peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_sensor_node() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): sensor-node peripheral init skipped");
    Ok(())
}

/// Base-station peripherals: all indicator LEDs plus the alarm buzzer.
#[cfg(target_os = "espidf")]
pub fn init_base_station() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before any worker thread starts.
    unsafe {
        init_gpio_outputs(&[
            pins::BUILTIN_LED_GPIO,
            pins::CONNECTED_LED_GPIO,
            pins::DISCONNECTED_LED_GPIO,
            pins::ACTIVITY_LED_GPIO,
            pins::DELIVERY_LED_GPIO,
            pins::ALARM_GPIO,
            pins::ALARM_LED_GPIO,
        ])?;
    }
    info!("hw_init: base-station peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_base_station() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): base-station peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: `ADC1_HANDLE` is written once by `init_adc()` before the
/// sampling loop starts; afterwards only the single sensor worker
/// reads through it.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    let ret =
        unsafe { adc_oneshot_config_channel(adc1_handle(), pins::TEMP_ADC1_CHANNEL, &chan_cfg) };
    if ret != ESP_OK {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    info!("hw_init: ADC1 CH{} configured (thermistor)", pins::TEMP_ADC1_CHANNEL);
    Ok(())
}

/// Raw thermistor reading, 0 on a transient read failure (the Beta
/// conversion maps 0 to the fault temperature).
#[cfg(target_os = "espidf")]
pub fn temperature_adc_read() -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: handle written once during init; single sensor-worker reader.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), pins::TEMP_ADC1_CHANNEL, &mut raw) };
    if ret != ESP_OK {
        return 0;
    }
    raw.max(0) as u16
}

// ── IMU I2C bus ───────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod imu_bus {
    use std::sync::Mutex;

    use esp_idf_hal::delay::BLOCK;
    use esp_idf_hal::gpio::AnyIOPin;
    use esp_idf_hal::i2c::{I2C0, I2cConfig, I2cDriver};
    use esp_idf_hal::units::FromValueType;
    use log::info;

    use super::HwInitError;
    use crate::pins;

    const MPU6050_ADDR: u8 = 0x68;
    const REG_PWR_MGMT_1: u8 = 0x6B;
    const REG_ACCEL_XOUT_H: u8 = 0x3B;
    /// LSB per g at the +/-2g default full-scale range.
    const ACCEL_LSB_PER_G: f32 = 16384.0;

    static BUS: Mutex<Option<I2cDriver<'static>>> = Mutex::new(None);

    pub fn init() -> Result<(), HwInitError> {
        let config = I2cConfig::new().baudrate(400.kHz().into());
        // SAFETY: I2C0 and its pins are claimed exactly once, here,
        // before any worker thread starts.
        let (i2c, sda, scl) = unsafe {
            (
                I2C0::new(),
                AnyIOPin::new(pins::IMU_SDA_GPIO),
                AnyIOPin::new(pins::IMU_SCL_GPIO),
            )
        };
        let mut driver = I2cDriver::new(i2c, sda, scl, &config)
            .map_err(|e| HwInitError::I2cInitFailed(e.code()))?;

        // Clear sleep mode so the accelerometer produces samples.
        driver
            .write(MPU6050_ADDR, &[REG_PWR_MGMT_1, 0x00], BLOCK)
            .map_err(|e| HwInitError::ImuWakeFailed(e.code()))?;

        *BUS.lock().expect("imu bus mutex poisoned") = Some(driver);
        info!("hw_init: MPU-6050 awake on I2C0 (sda={}, scl={})", pins::IMU_SDA_GPIO, pins::IMU_SCL_GPIO);
        Ok(())
    }

    /// One accelerometer sample in g, `None` while the bus is down.
    pub fn read_accel() -> Option<[f32; 3]> {
        let mut guard = BUS.lock().ok()?;
        let driver = guard.as_mut()?;
        let mut raw = [0u8; 6];
        driver
            .write_read(MPU6050_ADDR, &[REG_ACCEL_XOUT_H], &mut raw, BLOCK)
            .ok()?;
        let axis = |hi: u8, lo: u8| i16::from_be_bytes([hi, lo]) as f32 / ACCEL_LSB_PER_G;
        Some([
            axis(raw[0], raw[1]),
            axis(raw[2], raw[3]),
            axis(raw[4], raw[5]),
        ])
    }
}

#[cfg(target_os = "espidf")]
fn init_imu_bus() -> Result<(), HwInitError> {
    imu_bus::init()
}

/// One accelerometer sample in g, `None` while the IMU is unreadable.
#[cfg(target_os = "espidf")]
pub fn imu_read_accel() -> Option<[f32; 3]> {
    imu_bus::read_accel()
}

// ── GPIO Outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs(output_pins: &[i32]) -> Result<(), HwInitError> {
    for &pin in output_pins {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
        unsafe { gpio_set_level(pin, 0) };
    }
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: writes to a pin configured as output during init;
    // gpio_set_level is a register write, safe from any task.
    unsafe {
        gpio_set_level(pin, u32::from(high));
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}
