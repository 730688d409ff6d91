//! Configuration types
//!
//! Board-agnostic configuration structures and the TOML subset parser
//! used to load them.

pub mod toml;
pub mod types;

pub use self::toml::{parse_config, ParseError};
pub use types::*;
