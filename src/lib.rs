//! LidWatch firmware library.
//!
//! Two binaries share this crate: the sensor node (lid-mounted
//! accelerometer, classifies tilt and radios reports) and the base
//! station (tracks the delivery lifecycle, link health, and drives the
//! board outputs). All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module, so the pure
//! logic builds and tests on the host.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod events;
pub mod fsm;
pub mod sensors;
pub mod timer;

pub mod error;
pub mod pins;

// ESP-IDF-only internals are guarded by cfg attributes inside.
pub mod adapters;
pub mod drivers;
mod shims;
