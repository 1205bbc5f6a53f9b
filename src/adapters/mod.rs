//! Driven adapters behind the port traits in [`crate::app::ports`].
//!
//! Host-portable adapters live here unconditionally; the ESP-NOW radio
//! needs the ESP-IDF bindings and is feature-gated.

pub mod log_sink;
pub mod outputs;
pub mod stopwatch;
pub mod time;

#[cfg(feature = "espidf")]
pub mod espnow;
