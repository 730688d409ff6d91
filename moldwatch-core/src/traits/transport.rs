//! Publish/subscribe transport trait
//!
//! The broker client (connection, framing, keep-alive) lives outside this
//! crate. The control loop only needs to know whether it is connected,
//! how to (re)connect, and how to move whole payloads in and out.

use heapless::String;

use crate::config::types::TOPIC_LEN;

/// Errors reported by a transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// No broker session
    NotConnected,
    /// Broker refused or did not answer the connection
    ConnectFailed,
    /// Subscription was rejected
    SubscribeFailed,
    /// Payload could not be handed to the broker
    PublishFailed,
    /// Inbound payload larger than the receive buffer
    PayloadTooLarge,
    /// Receive path failed
    Receive,
}

/// An inbound message copied into the caller's buffer
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Delivery {
    /// Topic the message arrived on
    pub topic: String<TOPIC_LEN>,
    /// Number of payload bytes written to the buffer
    pub len: usize,
}

/// Trait for the broker client
pub trait Transport {
    /// Returns true if a broker session is established
    fn is_connected(&self) -> bool;

    /// Open a session using `client_id`
    fn connect(&mut self, client_id: &str) -> Result<(), TransportError>;

    /// Subscribe to a topic on the current session
    fn subscribe(&mut self, topic: &str) -> Result<(), TransportError>;

    /// Publish a payload
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), TransportError>;

    /// Poll for one inbound message
    ///
    /// Returns `Ok(Some(delivery))` with the payload in `buf[..delivery.len]`,
    /// `Ok(None)` if nothing is pending. A payload that does not fit `buf`
    /// is consumed and reported as [`TransportError::PayloadTooLarge`].
    fn poll(&mut self, buf: &mut [u8]) -> Result<Option<Delivery>, TransportError>;
}
