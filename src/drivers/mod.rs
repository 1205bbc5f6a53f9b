//! Peripheral initialisation and the board-level output workers.
//!
//! `hw_init` and `hw_timer` wrap raw ESP-IDF sys calls; the worker
//! modules (`alarm`, `display`, `indicator`) drain the outbound effect
//! channels and drive pins. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]`; pattern tables and rendering logic
//! stay host-testable.

pub mod alarm;
pub mod display;
pub mod hw_init;
pub mod hw_timer;
pub mod indicator;
