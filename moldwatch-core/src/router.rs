//! Inbound message routing
//!
//! One payload in, zero or more metric updates and at most one command out:
//!
//! ```text
//! payload ─► decode ─► device filter ─► metric updates ─► command
//!              │             │                              │
//!           Malformed   AddressMismatch           SystemReset / SendStatus
//!           (dropped)     (dropped)               unknown: logged, ignored
//! ```
//!
//! Metric updates are applied to the sink before the command is returned,
//! so a `send_status` in the same message reports the values it carried.

use heapless::String;

use moldwatch_protocol::{Command, FieldKind, InboundMessage, KeyTable, ALIAS_TARGET};

use crate::config::types::{DeviceConfig, DEVICE_ID_LEN};
use crate::traits::DataSink;

/// A command the controller must carry out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Directive {
    /// Show the reset notice and restart (terminal)
    SystemReset,
    /// Publish a status report
    SendStatus,
}

/// Why a message was dropped without effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DropReason {
    /// Payload is not a JSON object of the expected shape
    Malformed,
    /// Message addressed to another device
    AddressMismatch,
}

/// Effect of a message that passed decoding and the device filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Routed {
    /// Number of metric updates applied
    pub updates: u8,
    /// Command to execute after the updates
    pub directive: Option<Directive>,
    /// The third metric's value came from the alias key
    pub used_alias: bool,
    /// Metric fields skipped because their value was not a finite number
    pub rejected: u8,
}

/// Result of routing one payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RouteOutcome {
    Applied(Routed),
    Dropped(DropReason),
}

impl RouteOutcome {
    pub fn directive(&self) -> Option<Directive> {
        match self {
            RouteOutcome::Applied(routed) => routed.directive,
            RouteOutcome::Dropped(_) => None,
        }
    }

    pub fn updates(&self) -> u8 {
        match self {
            RouteOutcome::Applied(routed) => routed.updates,
            RouteOutcome::Dropped(_) => 0,
        }
    }
}

/// Decodes inbound payloads and applies them to a [`DataSink`]
#[derive(Debug, Clone)]
pub struct MessageRouter {
    device_id: String<DEVICE_ID_LEN>,
    keys: KeyTable,
}

impl MessageRouter {
    pub fn new(device_id: String<DEVICE_ID_LEN>, keys: KeyTable) -> Self {
        Self { device_id, keys }
    }

    pub fn from_config(config: &DeviceConfig) -> Self {
        Self::new(config.device_id.clone(), config.key_table())
    }

    pub fn device_id(&self) -> &str {
        self.device_id.as_str()
    }

    pub fn keys(&self) -> &KeyTable {
        &self.keys
    }

    /// Route one payload
    ///
    /// Never fails: every problem is logged and reported in the outcome.
    pub fn route<S: DataSink + ?Sized>(&self, payload: &[u8], sink: &mut S) -> RouteOutcome {
        let msg = match InboundMessage::decode(payload, &self.keys) {
            Ok(msg) => msg,
            Err(e) => {
                log_warn!("Dropping malformed message ({} bytes): {:?}", payload.len(), e);
                return RouteOutcome::Dropped(DropReason::Malformed);
            }
        };

        if let Some(target) = msg.device_id {
            if target != self.device_id.as_str() {
                log_debug!("Message for device {} ignored", target);
                return RouteOutcome::Dropped(DropReason::AddressMismatch);
            }
        }

        let mut routed = Routed {
            used_alias: msg.uses_alias(),
            ..Routed::default()
        };

        for field in msg.rejected() {
            let key = match field {
                FieldKind::Alias => self.keys.alias_key(),
                FieldKind::Metric(index) => self.keys.metric_key(index),
                _ => None,
            };
            log_warn!("Ignoring non-numeric value for {}", key.unwrap_or_default());
            routed.rejected += 1;
        }

        for (index, value) in msg.metrics() {
            sink.update(index, value);
            routed.updates += 1;
            log_info!(
                "{} = {}",
                self.keys.metric_key(index).unwrap_or_default(),
                value
            );
        }
        if routed.used_alias {
            log_debug!(
                "Metric {} taken from alias key {}",
                self.keys.metric_key(ALIAS_TARGET).unwrap_or_default(),
                self.keys.alias_key().unwrap_or_default()
            );
        }

        routed.directive = match msg.command {
            Some(Command::SystemReset) => Some(Directive::SystemReset),
            Some(Command::SendStatus) => Some(Directive::SendStatus),
            Some(Command::Unknown(text)) => {
                log_warn!("Unknown command: {}", text);
                None
            }
            None => None,
        };

        if routed.updates == 0 && routed.directive.is_none() {
            log_info!("No valid data in message");
        }

        RouteOutcome::Applied(routed)
    }
}

impl Default for MessageRouter {
    fn default() -> Self {
        Self::from_config(&DeviceConfig::default())
    }
}
