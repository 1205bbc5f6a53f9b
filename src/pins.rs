//! GPIO pin assignments for both boards.
//!
//! Kept in one place so a board respin touches only this file; the
//! drivers never hard-code pin numbers.

// ---------------------------------------------------------------------------
// Shared
// ---------------------------------------------------------------------------

/// On-board LED, toggled on every inbound frame as a traffic indicator.
pub const BUILTIN_LED_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// Sensor node
// ---------------------------------------------------------------------------

/// Lit while the lid is observed raised (raw, pre-confirmation).
pub const TILT_LED_GPIO: i32 = 16;

/// MPU-6050 accelerometer I2C pins.
pub const IMU_SDA_GPIO: i32 = 21;
pub const IMU_SCL_GPIO: i32 = 22;

/// NTC thermistor voltage-divider, GPIO34 = ADC1 channel 6.
pub const TEMP_ADC_GPIO: i32 = 34;
pub const TEMP_ADC1_CHANNEL: u32 = 6;

// ---------------------------------------------------------------------------
// Base station
// ---------------------------------------------------------------------------

/// Steady "link up" indicator.
pub const CONNECTED_LED_GPIO: i32 = 15;

/// Blinks while the link is down; also blinks on sender panic.
pub const DISCONNECTED_LED_GPIO: i32 = 14;

/// White activity LED, lit while lid events are being confirmed.
pub const ACTIVITY_LED_GPIO: i32 = 13;

/// Delivery indicator LED (off / blink / on per lifecycle state).
pub const DELIVERY_LED_GPIO: i32 = 16;

/// HIGH sounds the alarm buzzer; mirrored on the alarm LED.
pub const ALARM_GPIO: i32 = 33;

/// Alarm companion LED, driven in lockstep with the buzzer.
pub const ALARM_LED_GPIO: i32 = 12;
