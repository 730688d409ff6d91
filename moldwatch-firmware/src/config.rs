//! Embedded device configuration
//!
//! `device.toml` is compiled into the image (and validated by build.rs).
//! A parse failure at runtime falls back to the built-in defaults.

use core::str;
use defmt::*;

use moldwatch_core::config::{parse_config, DeviceConfig, ParseError};

/// The configuration text baked into the firmware image
pub const DEVICE_TOML: &str = include_str!("../device.toml");

/// Configuration loading errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum ConfigError {
    /// Invalid UTF-8 in TOML data
    InvalidUtf8,
    /// TOML parsing failed
    Parse(ParseError),
}

impl From<ParseError> for ConfigError {
    fn from(e: ParseError) -> Self {
        ConfigError::Parse(e)
    }
}

/// Parse configuration from raw TOML bytes
pub fn parse_bytes(bytes: &[u8]) -> Result<DeviceConfig, ConfigError> {
    let text = str::from_utf8(bytes).map_err(|_| ConfigError::InvalidUtf8)?;
    Ok(parse_config(text)?)
}

/// Load the embedded configuration, or defaults if it does not parse
pub fn load_config() -> DeviceConfig {
    match parse_bytes(DEVICE_TOML.as_bytes()) {
        Ok(config) => {
            info!(
                "Loaded configuration for device {}",
                config.device_id.as_str()
            );
            config
        }
        Err(e) => {
            error!("Failed to parse device.toml: {:?}, using defaults", e);
            DeviceConfig::default()
        }
    }
}
