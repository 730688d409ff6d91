//! Inbound message decoding
//!
//! An inbound payload is one JSON object. Field names are classified with a
//! [`KeyTable`]; the value type each field must carry follows from its
//! classification:
//!
//! | field          | value                    |
//! |----------------|--------------------------|
//! | `device_id`    | string                   |
//! | `command`      | string                   |
//! | metric / alias | number (`null` = absent) |
//! | anything else  | skipped, any type        |
//!
//! A `device_id` or `command` of the wrong type makes the whole message
//! malformed. Metric fields are independent: a value that is not a finite
//! number is skipped and reported through [`InboundMessage::rejected`],
//! and the other fields still apply.

use core::fmt;

use serde::de::{DeserializeSeed, IgnoredAny, MapAccess, Visitor};
use serde::Deserialize;

use crate::command::Command;
use crate::keys::{FieldKind, KeyTable, ALIAS_TARGET};
use crate::{ProtocolError, METRIC_COUNT};

/// A decoded inbound message borrowing from the payload
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InboundMessage<'a> {
    /// Target device identity, if the sender addressed one
    pub device_id: Option<&'a str>,
    /// Command, if present
    pub command: Option<Command<'a>>,
    metrics: [Option<f32>; METRIC_COUNT],
    alias: Option<f32>,
    /// Bit `i` set: metric `i` carried a non-numeric value; bit
    /// [`METRIC_COUNT`]: the alias did
    rejected: u8,
}

impl<'a> InboundMessage<'a> {
    /// A message with no fields
    pub const fn empty() -> Self {
        Self {
            device_id: None,
            command: None,
            metrics: [None; METRIC_COUNT],
            alias: None,
            rejected: 0,
        }
    }

    /// Decode a JSON payload
    pub fn decode(payload: &'a [u8], keys: &KeyTable) -> Result<Self, ProtocolError> {
        let mut de = serde_json_core::de::Deserializer::new(payload, None);
        MessageSeed { keys, payload }
            .deserialize(&mut de)
            .map_err(|_| ProtocolError::Malformed)
    }

    /// Value for a metric index
    ///
    /// The alias only applies to [`ALIAS_TARGET`] and only when the primary
    /// key is absent.
    pub fn metric(&self, index: usize) -> Option<f32> {
        match self.metrics.get(index).copied().flatten() {
            Some(value) => Some(value),
            None if index == ALIAS_TARGET => self.alias,
            None => None,
        }
    }

    /// True if the value for [`ALIAS_TARGET`] came from the alias key
    pub fn uses_alias(&self) -> bool {
        self.metrics[ALIAS_TARGET].is_none() && self.alias.is_some()
    }

    /// Iterate over `(index, value)` for every metric present
    pub fn metrics(&self) -> impl Iterator<Item = (usize, f32)> + '_ {
        (0..METRIC_COUNT).filter_map(move |i| self.metric(i).map(|v| (i, v)))
    }

    /// Metric fields that were present but not a finite number
    pub fn rejected(&self) -> impl Iterator<Item = FieldKind> + '_ {
        (0..=METRIC_COUNT)
            .filter(move |&bit| self.rejected & (1 << bit) != 0)
            .map(|bit| match bit {
                METRIC_COUNT => FieldKind::Alias,
                index => FieldKind::Metric(index),
            })
    }

    fn set_metric(&mut self, bit: usize, value: MetricValue) {
        let slot = match self.metrics.get_mut(bit) {
            Some(slot) => slot,
            None => &mut self.alias,
        };
        match value {
            MetricValue::Number(v) => {
                *slot = Some(v);
                self.rejected &= !(1 << bit);
            }
            MetricValue::Absent => {
                *slot = None;
                self.rejected &= !(1 << bit);
            }
            MetricValue::Rejected => {
                *slot = None;
                self.rejected |= 1 << bit;
            }
        }
    }
}

impl Default for InboundMessage<'_> {
    fn default() -> Self {
        Self::empty()
    }
}

/// A metric field value after lenient reading
#[derive(Debug, Clone, Copy, PartialEq)]
enum MetricValue {
    Number(f32),
    /// `null`
    Absent,
    /// String, bool, array, object or a number outside the f32 range
    Rejected,
}

impl MetricValue {
    /// Read the value that follows `key` in `payload`
    ///
    /// serde-json-core has no `deserialize_any`, and a failed typed read
    /// poisons the map, so the value is parsed from its own slice. `key`
    /// must borrow from `payload`.
    fn after_key(payload: &[u8], key: &str) -> Self {
        let Some(tail) = value_slice(payload, key) else {
            return MetricValue::Rejected;
        };
        let mut de = serde_json_core::de::Deserializer::new(tail, None);
        match Option::<f32>::deserialize(&mut de) {
            Ok(None) => MetricValue::Absent,
            Ok(Some(v)) if v.is_finite() => MetricValue::Number(v),
            _ => MetricValue::Rejected,
        }
    }
}

/// Bytes after the colon that follows a borrowed key
fn value_slice<'p>(payload: &'p [u8], key: &str) -> Option<&'p [u8]> {
    let start = (key.as_ptr() as usize).checked_sub(payload.as_ptr() as usize)?;
    // Skip the key and its closing quote
    let rest = payload.get(start + key.len() + 1..)?;
    let colon = rest.iter().position(|b| !b.is_ascii_whitespace())?;
    match rest.get(colon) {
        Some(b':') => rest.get(colon + 1..),
        _ => None,
    }
}

/// Seed carrying the key table into deserialization
struct MessageSeed<'k, 'p> {
    keys: &'k KeyTable,
    payload: &'p [u8],
}

impl<'de> DeserializeSeed<'de> for MessageSeed<'_, '_> {
    type Value = InboundMessage<'de>;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(MessageVisitor {
            keys: self.keys,
            payload: self.payload,
        })
    }
}

struct MessageVisitor<'k, 'p> {
    keys: &'k KeyTable,
    payload: &'p [u8],
}

impl<'de> Visitor<'de> for MessageVisitor<'_, '_> {
    type Value = InboundMessage<'de>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut msg = InboundMessage::empty();

        while let Some(key) = map.next_key::<&'de str>()? {
            match self.keys.classify(key) {
                FieldKind::DeviceId => {
                    msg.device_id = Some(map.next_value::<&'de str>()?);
                }
                FieldKind::Command => {
                    msg.command = Some(Command::parse(map.next_value::<&'de str>()?));
                }
                FieldKind::Metric(index) => {
                    let value = MetricValue::after_key(self.payload, key);
                    map.next_value::<IgnoredAny>()?;
                    msg.set_metric(index, value);
                }
                FieldKind::Alias => {
                    let value = MetricValue::after_key(self.payload, key);
                    map.next_value::<IgnoredAny>()?;
                    msg.set_metric(METRIC_COUNT, value);
                }
                FieldKind::Unknown => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }

        Ok(msg)
    }
}
