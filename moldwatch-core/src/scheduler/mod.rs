//! Update scheduling
//!
//! Decides, on each control loop pass, whether the connection must be
//! maintained and whether a full redraw is due.

pub mod timer;
pub mod update;

pub use timer::IntervalTimer;
pub use update::{Tick, UpdateScheduler};
