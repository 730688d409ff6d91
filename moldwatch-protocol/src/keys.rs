//! Field-name table for metric keys
//!
//! The three metric keys and the metric-3 alias are configured per
//! deployment. `device_id` and `command` are fixed.

use heapless::String;

use crate::{ProtocolError, METRIC_COUNT};

/// Maximum metric key length in bytes
pub const KEY_LEN: usize = 32;

/// Fixed key of the device identity filter
pub const DEVICE_ID_KEY: &str = "device_id";

/// Fixed key of the command field
pub const COMMAND_KEY: &str = "command";

/// Metric index that the alias key feeds
pub const ALIAS_TARGET: usize = 2;

/// Classification of an inbound field name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FieldKind {
    DeviceId,
    Command,
    /// Primary key of the metric at this index
    Metric(usize),
    /// Fallback key for [`ALIAS_TARGET`]
    Alias,
    Unknown,
}

/// Configured metric keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyTable {
    metrics: [String<KEY_LEN>; METRIC_COUNT],
    alias: Option<String<KEY_LEN>>,
}

impl KeyTable {
    /// Build a table from already-bounded keys
    pub fn from_keys(metrics: [String<KEY_LEN>; METRIC_COUNT], alias: Option<String<KEY_LEN>>) -> Self {
        Self { metrics, alias }
    }

    /// Build a table from string slices
    ///
    /// Fails with [`ProtocolError::KeyTooLong`] if any key exceeds [`KEY_LEN`].
    pub fn new(metrics: [&str; METRIC_COUNT], alias: Option<&str>) -> Result<Self, ProtocolError> {
        let mut keys: [String<KEY_LEN>; METRIC_COUNT] = core::array::from_fn(|_| String::new());
        for (slot, key) in keys.iter_mut().zip(metrics) {
            slot.push_str(key).map_err(|_| ProtocolError::KeyTooLong)?;
        }

        let alias = match alias {
            Some(key) => {
                let mut s = String::new();
                s.push_str(key).map_err(|_| ProtocolError::KeyTooLong)?;
                Some(s)
            }
            None => None,
        };

        Ok(Self::from_keys(keys, alias))
    }

    /// Primary key of a metric
    pub fn metric_key(&self, index: usize) -> Option<&str> {
        self.metrics.get(index).map(|k| k.as_str())
    }

    /// Alias key for [`ALIAS_TARGET`], if configured
    pub fn alias_key(&self) -> Option<&str> {
        self.alias.as_ref().map(|k| k.as_str())
    }

    /// Classify a field name
    ///
    /// Fixed keys win over configured ones; primary metric keys win over
    /// the alias.
    pub fn classify(&self, key: &str) -> FieldKind {
        if key == DEVICE_ID_KEY {
            return FieldKind::DeviceId;
        }
        if key == COMMAND_KEY {
            return FieldKind::Command;
        }
        if let Some(index) = self.metrics.iter().position(|k| k.as_str() == key) {
            return FieldKind::Metric(index);
        }
        if self.alias_key() == Some(key) {
            return FieldKind::Alias;
        }
        FieldKind::Unknown
    }
}

impl Default for KeyTable {
    fn default() -> Self {
        // Default keys are short literals; construction cannot overflow
        Self::new(
            ["oil_pressure", "parison_temp", "injection_time"],
            Some("injction_time"),
        )
        .unwrap_or_else(|_| Self::from_keys(core::array::from_fn(|_| String::new()), None))
    }
}
