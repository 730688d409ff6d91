//! Outbound status message encoding
//!
//! Key order on the wire is fixed: `device_id` first, then
//! `<name>_current`, `<name>_previous` for each metric in index order.

use heapless::{String, Vec};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::keys::{DEVICE_ID_KEY, KEY_LEN};
use crate::{ProtocolError, METRIC_COUNT};

/// Maximum encoded status size in bytes
pub const MAX_STATUS_SIZE: usize = 512;

const CURRENT_SUFFIX: &str = "_current";
const PREVIOUS_SUFFIX: &str = "_previous";

/// Capacity of a derived status key (metric key + longest suffix)
pub const STATUS_KEY_LEN: usize = KEY_LEN + PREVIOUS_SUFFIX.len();

/// One metric's entry in a status report
#[derive(Debug, Clone, PartialEq)]
struct StatusEntry {
    current_key: String<STATUS_KEY_LEN>,
    previous_key: String<STATUS_KEY_LEN>,
    current: f32,
    previous: f32,
}

/// A status report ready to be encoded
#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage<'a> {
    device_id: &'a str,
    entries: Vec<StatusEntry, METRIC_COUNT>,
}

impl<'a> StatusMessage<'a> {
    /// Create an empty report for a device
    pub fn new(device_id: &'a str) -> Self {
        Self {
            device_id,
            entries: Vec::new(),
        }
    }

    /// Append a metric's current and previous values
    ///
    /// Keys are derived from `name` as `<name>_current` and `<name>_previous`.
    pub fn push(&mut self, name: &str, current: f32, previous: f32) -> Result<(), ProtocolError> {
        let entry = StatusEntry {
            current_key: derive_key(name, CURRENT_SUFFIX)?,
            previous_key: derive_key(name, PREVIOUS_SUFFIX)?,
            current,
            previous,
        };
        self.entries
            .push(entry)
            .map_err(|_| ProtocolError::SerializationOverflow)
    }

    /// Device identity carried by the report
    pub fn device_id(&self) -> &str {
        self.device_id
    }

    /// Number of metrics in the report
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no metrics have been added
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encode to JSON in a bounded buffer
    pub fn encode(&self) -> Result<Vec<u8, MAX_STATUS_SIZE>, ProtocolError> {
        self.encode_bounded::<MAX_STATUS_SIZE>()
    }

    /// Encode to JSON in a buffer of capacity `N`
    ///
    /// Fails with [`ProtocolError::SerializationOverflow`] rather than
    /// truncating.
    pub fn encode_bounded<const N: usize>(&self) -> Result<Vec<u8, N>, ProtocolError> {
        serde_json_core::to_vec::<_, N>(self).map_err(|_| ProtocolError::SerializationOverflow)
    }
}

fn derive_key(name: &str, suffix: &str) -> Result<String<STATUS_KEY_LEN>, ProtocolError> {
    let mut key = String::new();
    key.push_str(name)
        .and_then(|_| key.push_str(suffix))
        .map_err(|_| ProtocolError::KeyTooLong)?;
    Ok(key)
}

impl Serialize for StatusMessage<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1 + 2 * self.entries.len()))?;
        map.serialize_entry(DEVICE_ID_KEY, self.device_id)?;
        for entry in &self.entries {
            map.serialize_entry(entry.current_key.as_str(), &entry.current)?;
            map.serialize_entry(entry.previous_key.as_str(), &entry.previous)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StatusMessage<'static> {
        let mut msg = StatusMessage::new("tab5_001");
        msg.push("oil_pressure", 125.0, 123.4).unwrap();
        msg.push("parison_temp", 0.0, 0.0).unwrap();
        msg.push("injection_time", 3.5, 0.0).unwrap();
        msg
    }

    #[test]
    fn test_encode_layout() {
        let bytes = sample().encode().unwrap();
        let json = core::str::from_utf8(&bytes).unwrap();

        assert!(json.starts_with(r#"{"device_id":"tab5_001","#));
        assert!(json.contains(r#""oil_pressure_current":125.0"#));
        assert!(json.contains(r#""oil_pressure_previous":123.4"#));
        assert!(json.contains(r#""parison_temp_current":0.0"#));
        assert!(json.contains(r#""injection_time_current":3.5"#));
        assert!(json.ends_with('}'));
    }

    #[test]
    fn test_encode_field_count() {
        let bytes = sample().encode().unwrap();
        let json = core::str::from_utf8(&bytes).unwrap();
        // device_id + 6 value fields
        assert_eq!(json.matches(':').count(), 7);
        assert_eq!(json.matches("_current").count(), 3);
        assert_eq!(json.matches("_previous").count(), 3);
    }

    #[test]
    fn test_key_order() {
        let bytes = sample().encode().unwrap();
        let json = core::str::from_utf8(&bytes).unwrap();
        let cur = json.find("oil_pressure_current").unwrap();
        let prev = json.find("oil_pressure_previous").unwrap();
        let next = json.find("parison_temp_current").unwrap();
        assert!(cur < prev && prev < next);
    }

    #[test]
    fn test_overflow_is_reported() {
        let msg = sample();
        assert_eq!(
            msg.encode_bounded::<32>(),
            Err(ProtocolError::SerializationOverflow)
        );
    }

    #[test]
    fn test_too_many_entries() {
        let mut msg = sample();
        assert_eq!(
            msg.push("extra", 1.0, 1.0),
            Err(ProtocolError::SerializationOverflow)
        );
        assert_eq!(msg.len(), METRIC_COUNT);
    }

    #[test]
    fn test_derived_key_too_long() {
        let mut msg = StatusMessage::new("dev");
        let long = "k".repeat(KEY_LEN + 1);
        assert_eq!(msg.push(&long, 0.0, 0.0), Err(ProtocolError::KeyTooLong));
        assert!(msg.is_empty());
    }
}
