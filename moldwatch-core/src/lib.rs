//! Moldwatch Core
//!
//! Board-agnostic logic for the Moldwatch metric indicator. This crate
//! contains:
//!
//! - Metric store (current/previous value pairs)
//! - Message routing (device filter, metric dispatch, commands)
//! - Status reporting
//! - Update scheduling and the cooperative control loop
//! - Collaborator traits (transport, render trigger, system control)
//! - Configuration types and parsing
//!
//! Nothing in here reads a clock: every time-dependent operation takes
//! `now_ms` from the caller.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod log;

pub mod config;
pub mod controller;
pub mod router;
pub mod scheduler;
pub mod session;
pub mod status;
pub mod store;
pub mod traits;

pub use controller::{Controller, MAX_DELIVERIES_PER_PASS};
pub use moldwatch_protocol::METRIC_COUNT;
