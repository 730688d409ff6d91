//! Display abstraction and dashboard renderer for Moldwatch
//!
//! This crate provides:
//! - `DisplayBackend` trait for the panel driver (pixel text, rectangles,
//!   optional off-screen buffer)
//! - Section layout and value formatting
//! - `Dashboard`, the renderer plugged into the core as its render trigger
//!
//! # Architecture
//!
//! ```text
//!  Controller ──redraw(&MetricStore)──► Dashboard ──► DisplayBackend
//!                                          │              │
//!                                     layout/format   back buffer ─► panel
//!                                                     (or direct)
//! ```
//!
//! The backend owns fonts and pixels; the dashboard decides what goes where.

#![no_std]

pub mod backend;
pub mod dashboard;
pub mod format;
pub mod layout;

// Re-export key types
pub use backend::{Color, DisplayBackend, DisplayError, Font, Point, TextStyle};
pub use dashboard::{Dashboard, CURRENT_LABEL, PREVIOUS_LABEL};
pub use format::{format_value, ValueString};
pub use layout::SectionGeometry;
