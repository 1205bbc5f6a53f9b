//! Application core — pure domain orchestration, zero I/O.
//!
//! The state machines in [`crate::fsm`] are wired together here and
//! talk to the outside world only through the port traits in
//! [`ports`], so the whole layer runs under host tests with mock
//! adapters. The channel plumbing between workers lives in
//! [`channels`].

pub mod channels;
pub mod events;
pub mod ports;
pub mod service;
