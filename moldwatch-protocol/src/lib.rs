//! Moldwatch wire protocol
//!
//! This crate defines the JSON messages exchanged between the indicator and
//! the publish/subscribe broker. The transport itself (connection, framing,
//! topics) is out of scope; this crate only turns payload bytes into typed
//! messages and back.
//!
//! # Message Overview
//!
//! Inbound (broker → device), every field optional:
//! ```text
//! {
//!   "device_id":      "tab5_001",      // target filter
//!   "oil_pressure":   123.4,           // metric 0
//!   "parison_temp":   201.0,           // metric 1
//!   "injection_time": 3.2,             // metric 2 (or the "injction_time" alias)
//!   "command":        "send_status"    // or "system_reset"
//! }
//! ```
//!
//! Outbound status (device → broker):
//! ```text
//! {"device_id":"tab5_001","oil_pressure_current":123.4,"oil_pressure_previous":0.0,...}
//! ```
//!
//! Metric key names are configured per deployment, so decoding is driven by
//! a [`KeyTable`] rather than fixed struct field names.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod inbound;
pub mod keys;
pub mod status;

pub use command::Command;
pub use inbound::InboundMessage;
pub use keys::{FieldKind, KeyTable, ALIAS_TARGET, COMMAND_KEY, DEVICE_ID_KEY, KEY_LEN};
pub use status::{StatusMessage, MAX_STATUS_SIZE};

/// Number of metrics carried by the protocol
pub const METRIC_COUNT: usize = 3;

/// Largest inbound payload accepted for decoding
pub const MAX_MESSAGE_SIZE: usize = 512;

/// Errors produced while decoding or encoding messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError {
    /// Payload is not a well-formed JSON object of the expected shape
    Malformed,
    /// Encoded message does not fit its output buffer
    SerializationOverflow,
    /// A configured key exceeds [`KEY_LEN`]
    KeyTooLong,
}
