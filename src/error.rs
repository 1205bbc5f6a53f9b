//! Unified error types for the LidWatch firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping
//! worker-loop error handling uniform. All variants are `Copy` so they
//! can be passed through FSMs and logged without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A timer backend could not be manipulated.
    Timer(TimerError),
    /// The radio transport failed.
    Radio(RadioError),
    /// A sensor could not be read or returned out-of-range data.
    Sensor(SensorError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timer(e) => write!(f, "timer: {e}"),
            Self::Radio(e) => write!(f, "radio: {e}"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Timer errors
// ---------------------------------------------------------------------------

/// Failures manipulating the underlying countdown primitive. Any of
/// these drives the owning debounce timer into its `Failed` state; they
/// are reported to the owner, never retried automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    /// The one-shot countdown could not be armed.
    ArmFailed,
    /// The running countdown could not be restarted.
    ResetFailed,
    /// The pending countdown could not be cancelled.
    CancelFailed,
    /// The timer resource could not be (re)created.
    CreateFailed,
    /// The timer is in the `Failed` state and must be force-cleared.
    Faulted,
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArmFailed => write!(f, "arm failed"),
            Self::ResetFailed => write!(f, "reset failed"),
            Self::CancelFailed => write!(f, "cancel failed"),
            Self::CreateFailed => write!(f, "create failed"),
            Self::Faulted => write!(f, "timer faulted"),
        }
    }
}

impl From<TimerError> for Error {
    fn from(e: TimerError) -> Self {
        Self::Timer(e)
    }
}

// ---------------------------------------------------------------------------
// Radio errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioError {
    /// Transport initialisation failed.
    InitFailed,
    /// A frame could not be queued for transmission.
    SendFailed,
    /// A received frame could not be decoded into a record.
    BadFrame,
}

impl fmt::Display for RadioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitFailed => write!(f, "init failed"),
            Self::SendFailed => write!(f, "send failed"),
            Self::BadFrame => write!(f, "bad frame"),
        }
    }
}

impl From<RadioError> for Error {
    fn from(e: RadioError) -> Self {
        Self::Radio(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The inclination sensor stopped responding.
    InclinationLost,
    /// I2C/GPIO read returned an error.
    ReadFailed,
    /// Reading is outside the physically plausible range.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InclinationLost => write!(f, "inclination signal lost"),
            Self::ReadFailed => write!(f, "read failed"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
