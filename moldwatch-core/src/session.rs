//! Broker session maintenance
//!
//! A session is usable once the transport is connected and subscribed to
//! the inbound topic. A failed subscribe counts as a failed attempt; the
//! next control loop pass subscribes again, reconnecting first only if the
//! transport dropped.

use heapless::String;

use crate::config::types::{TransportConfig, CLIENT_ID_LEN, TOPIC_LEN};
use crate::traits::{Transport, TransportError};

/// Reconnects a [`Transport`] when it drops
#[derive(Debug, Clone)]
pub struct Session {
    client_id: String<CLIENT_ID_LEN>,
    topic: String<TOPIC_LEN>,
    subscribed: bool,
    attempts: u32,
    failures: u32,
}

impl Session {
    pub fn new(client_id: String<CLIENT_ID_LEN>, topic: String<TOPIC_LEN>) -> Self {
        Self {
            client_id,
            topic,
            subscribed: false,
            attempts: 0,
            failures: 0,
        }
    }

    pub fn from_config(config: &TransportConfig) -> Self {
        Self::new(config.client_id.clone(), config.subscribe_topic.clone())
    }

    /// Connect and subscribe if the transport is down or unsubscribed
    ///
    /// Returns true if the session is usable afterwards.
    pub fn ensure_connected<T: Transport + ?Sized>(&mut self, transport: &mut T) -> bool {
        if !transport.is_connected() {
            self.subscribed = false;
        } else if self.subscribed {
            return true;
        }

        self.attempts = self.attempts.wrapping_add(1);
        log_info!("Attempting broker connection (attempt {})", self.attempts);

        match self.open(transport) {
            Ok(()) => {
                log_info!("Connected, subscribed to {}", self.topic.as_str());
                self.subscribed = true;
                self.failures = 0;
                true
            }
            Err(e) => {
                self.failures = self.failures.saturating_add(1);
                log_warn!(
                    "Broker connection failed: {:?} ({} in a row)",
                    e,
                    self.failures
                );
                false
            }
        }
    }

    fn open<T: Transport + ?Sized>(&self, transport: &mut T) -> Result<(), TransportError> {
        if !transport.is_connected() {
            transport.connect(self.client_id.as_str())?;
        }
        transport.subscribe(self.topic.as_str())
    }

    /// True once the inbound topic is subscribed on the current connection
    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    /// Total connection attempts since startup
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Consecutive failed attempts
    pub fn failures(&self) -> u32 {
        self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Delivery;
    use std::string::String as StdString;
    use std::vec::Vec as StdVec;

    #[derive(Default)]
    struct FlakyTransport {
        connected: bool,
        refuse_connect: bool,
        refuse_subscribe: bool,
        calls: StdVec<StdString>,
    }

    impl Transport for FlakyTransport {
        fn is_connected(&self) -> bool {
            self.connected
        }

        fn connect(&mut self, client_id: &str) -> Result<(), TransportError> {
            self.calls.push(format!("connect {client_id}"));
            if self.refuse_connect {
                return Err(TransportError::ConnectFailed);
            }
            self.connected = true;
            Ok(())
        }

        fn subscribe(&mut self, topic: &str) -> Result<(), TransportError> {
            self.calls.push(format!("subscribe {topic}"));
            if self.refuse_subscribe {
                return Err(TransportError::SubscribeFailed);
            }
            Ok(())
        }

        fn publish(&mut self, _topic: &str, _payload: &[u8]) -> Result<(), TransportError> {
            Ok(())
        }

        fn poll(&mut self, _buf: &mut [u8]) -> Result<Option<Delivery>, TransportError> {
            Ok(None)
        }
    }

    fn session() -> Session {
        Session::from_config(&TransportConfig::default())
    }

    #[test]
    fn test_live_session_untouched() {
        let mut transport = FlakyTransport::default();
        let mut session = session();
        assert!(session.ensure_connected(&mut transport));
        transport.calls.clear();

        assert!(session.ensure_connected(&mut transport));
        assert!(transport.calls.is_empty());
        assert_eq!(session.attempts(), 1);
    }

    #[test]
    fn test_connected_but_unsubscribed_subscribes() {
        let mut transport = FlakyTransport {
            connected: true,
            ..Default::default()
        };
        let mut session = session();
        assert!(session.ensure_connected(&mut transport));
        assert_eq!(transport.calls, ["subscribe tab5/data"]);
        assert!(session.is_subscribed());
    }

    #[test]
    fn test_drop_resubscribes() {
        let mut transport = FlakyTransport::default();
        let mut session = session();
        assert!(session.ensure_connected(&mut transport));

        transport.connected = false;
        transport.calls.clear();
        assert!(session.ensure_connected(&mut transport));
        assert_eq!(
            transport.calls,
            ["connect tab5_indicator", "subscribe tab5/data"]
        );
    }

    #[test]
    fn test_connect_then_subscribe() {
        let mut transport = FlakyTransport::default();
        let mut session = session();
        assert!(session.ensure_connected(&mut transport));
        assert_eq!(
            transport.calls,
            ["connect tab5_indicator", "subscribe tab5/data"]
        );
        assert_eq!(session.attempts(), 1);
        assert_eq!(session.failures(), 0);
    }

    #[test]
    fn test_connect_failure_skips_subscribe() {
        let mut transport = FlakyTransport {
            refuse_connect: true,
            ..Default::default()
        };
        let mut session = session();
        assert!(!session.ensure_connected(&mut transport));
        assert!(!session.ensure_connected(&mut transport));
        assert_eq!(transport.calls.len(), 2);
        assert_eq!(session.failures(), 2);
    }

    #[test]
    fn test_subscribe_failure_is_failed_attempt() {
        let mut transport = FlakyTransport {
            refuse_subscribe: true,
            ..Default::default()
        };
        let mut session = session();
        assert!(!session.ensure_connected(&mut transport));
        assert_eq!(session.failures(), 1);
        assert!(transport.connected);
        assert!(!session.is_subscribed());

        // Still connected: only the subscribe is retried
        transport.refuse_subscribe = false;
        assert!(session.ensure_connected(&mut transport));
        assert_eq!(
            transport.calls,
            ["connect tab5_indicator", "subscribe tab5/data", "subscribe tab5/data"]
        );
        assert!(session.is_subscribed());
        assert_eq!(session.failures(), 0);
        assert_eq!(session.attempts(), 2);
    }
}
