//! Status reporting
//!
//! Builds a [`StatusMessage`] from the metric store and publishes it on the
//! configured status topic. Publishing is attempted once; failures are
//! logged and returned, and the next attempt happens only on the next
//! `send_status` command.

use heapless::String;

use moldwatch_protocol::{ProtocolError, StatusMessage};

use crate::config::types::{DeviceConfig, DEVICE_ID_LEN, TOPIC_LEN};
use crate::store::MetricStore;
use crate::traits::{Transport, TransportError};

/// Errors from building or publishing a status report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusError {
    /// No broker session; nothing was encoded or sent
    TransportUnavailable,
    /// Report does not fit the output buffer
    SerializationOverflow,
    /// Transport rejected the publish
    Transport(TransportError),
}

impl From<ProtocolError> for StatusError {
    fn from(_: ProtocolError) -> Self {
        StatusError::SerializationOverflow
    }
}

impl From<TransportError> for StatusError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::NotConnected => StatusError::TransportUnavailable,
            other => StatusError::Transport(other),
        }
    }
}

/// Serializes and publishes the metric store
#[derive(Debug, Clone)]
pub struct StatusResponder {
    device_id: String<DEVICE_ID_LEN>,
    topic: String<TOPIC_LEN>,
}

impl StatusResponder {
    pub fn new(device_id: String<DEVICE_ID_LEN>, topic: String<TOPIC_LEN>) -> Self {
        Self { device_id, topic }
    }

    pub fn from_config(config: &DeviceConfig) -> Self {
        Self::new(config.device_id.clone(), config.transport.publish_topic.clone())
    }

    pub fn topic(&self) -> &str {
        self.topic.as_str()
    }

    /// Build a report of every metric in index order
    pub fn build<'a>(&'a self, store: &MetricStore) -> Result<StatusMessage<'a>, StatusError> {
        let mut msg = StatusMessage::new(self.device_id.as_str());
        for metric in store.iter() {
            let reading = metric.reading();
            msg.push(metric.name(), reading.current, reading.previous)?;
        }
        Ok(msg)
    }

    /// Encode the store and hand it to the transport
    ///
    /// Returns the number of bytes published.
    pub fn publish<T: Transport + ?Sized>(
        &self,
        store: &MetricStore,
        transport: &mut T,
    ) -> Result<usize, StatusError> {
        let result = self.try_publish(store, transport);
        match result {
            Ok(len) => log_info!("Status published to {} ({} bytes)", self.topic.as_str(), len),
            Err(e) => log_error!("Failed to publish status: {:?}", e),
        }
        result
    }

    fn try_publish<T: Transport + ?Sized>(
        &self,
        store: &MetricStore,
        transport: &mut T,
    ) -> Result<usize, StatusError> {
        if !transport.is_connected() {
            return Err(StatusError::TransportUnavailable);
        }

        let payload = self.build(store)?.encode()?;
        transport.publish(self.topic.as_str(), &payload)?;
        Ok(payload.len())
    }
}

impl Default for StatusResponder {
    fn default() -> Self {
        Self::from_config(&DeviceConfig::default())
    }
}
