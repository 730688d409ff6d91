//! Control loop composition
//!
//! The [`Controller`] owns every piece of indicator state and runs one
//! cooperative pass per [`Controller::poll`] call:
//!
//! ```text
//!  ┌────────────────────────────────────────────────────┐
//!  │ 1. maintain connection (Session)                   │
//!  │ 2. drain up to MAX_DELIVERIES_PER_PASS messages    │
//!  │      route ─► metric updates (immediate redraw)    │
//!  │            ─► command: status publish / reset      │
//!  │ 3. periodic full redraw if due                     │
//!  └────────────────────────────────────────────────────┘
//!            caller yields, then polls again
//! ```
//!
//! The store is only reachable through the controller, so updates and
//! reads never interleave even when the caller drives it from an executor.

use moldwatch_protocol::MAX_MESSAGE_SIZE;

use crate::config::types::DeviceConfig;
use crate::router::{Directive, MessageRouter, RouteOutcome};
use crate::scheduler::UpdateScheduler;
use crate::session::Session;
use crate::status::{StatusError, StatusResponder};
use crate::store::MetricStore;
use crate::traits::{LiveStore, RenderTrigger, SystemControl, Transport, TransportError};

/// Upper bound on inbound messages handled in one pass
pub const MAX_DELIVERIES_PER_PASS: usize = 8;

/// Notice shown before a requested restart
pub const RESET_NOTICE: &str = "Restarting...";

/// Summary of one control loop pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PassReport {
    /// Transport was usable during this pass
    pub connected: bool,
    /// Messages taken from the transport
    pub received: u8,
    /// Metric updates applied
    pub updates: u8,
    /// Periodic redraw happened
    pub redrawn: bool,
    /// A restart was requested
    pub reset: bool,
}

/// Owns the indicator state and its collaborators
pub struct Controller<T, R, S> {
    transport: T,
    live: LiveStore<R>,
    system: S,
    router: MessageRouter,
    responder: StatusResponder,
    scheduler: UpdateScheduler,
    session: Session,
    rx_buf: [u8; MAX_MESSAGE_SIZE],
}

impl<T, R, S> Controller<T, R, S>
where
    T: Transport,
    R: RenderTrigger,
    S: SystemControl,
{
    pub fn new(config: &DeviceConfig, transport: T, render: R, system: S) -> Self {
        Self {
            transport,
            live: LiveStore::new(MetricStore::from_config(config), render),
            system,
            router: MessageRouter::from_config(config),
            responder: StatusResponder::from_config(config),
            scheduler: UpdateScheduler::new(&config.scheduler),
            session: Session::from_config(&config.transport),
            rx_buf: [0; MAX_MESSAGE_SIZE],
        }
    }

    /// Draw the initial screen before the first pass
    pub fn boot(&mut self, now_ms: u32) {
        log_info!("Moldwatch indicator for device {}", self.router.device_id());
        self.live.redraw();
        self.scheduler.mark_redraw(now_ms);
    }

    /// Run one control loop pass
    pub fn poll(&mut self, now_ms: u32) -> PassReport {
        let tick = self.scheduler.tick(now_ms);
        let mut report = PassReport::default();

        if tick.maintain_connection {
            report.connected = self.session.ensure_connected(&mut self.transport);
        }

        if report.connected {
            self.drain(&mut report);
        }

        if tick.redraw && !report.reset {
            self.live.redraw();
            report.redrawn = true;
        }

        report
    }

    fn drain(&mut self, report: &mut PassReport) {
        for _ in 0..MAX_DELIVERIES_PER_PASS {
            let outcome = match self.transport.poll(&mut self.rx_buf) {
                Ok(Some(delivery)) => {
                    report.received += 1;
                    let payload = &self.rx_buf[..delivery.len.min(MAX_MESSAGE_SIZE)];
                    log_info!(
                        "Message arrived [{}] ({} bytes)",
                        delivery.topic.as_str(),
                        payload.len()
                    );
                    self.router.route(payload, &mut self.live)
                }
                Ok(None) => break,
                Err(TransportError::PayloadTooLarge) => {
                    report.received += 1;
                    log_warn!("Dropping oversized message");
                    continue;
                }
                Err(e) => {
                    log_warn!("Receive failed: {:?}", e);
                    break;
                }
            };

            report.updates = report.updates.saturating_add(outcome.updates());
            if let RouteOutcome::Applied(_) = outcome {
                if let Some(directive) = outcome.directive() {
                    self.execute(directive, report);
                }
            }

            if report.reset {
                break;
            }
        }
    }

    fn execute(&mut self, directive: Directive, report: &mut PassReport) {
        match directive {
            Directive::SendStatus => {
                if let Err(e) = self.send_status() {
                    log_debug!("Status request dropped: {:?}", e);
                }
            }
            Directive::SystemReset => {
                log_warn!("Reset requested, restarting");
                self.live.notice(RESET_NOTICE);
                report.reset = true;
                self.system.restart();
            }
        }
    }

    /// Publish the current metric values
    pub fn send_status(&mut self) -> Result<usize, StatusError> {
        self.responder.publish(self.live.store(), &mut self.transport)
    }

    pub fn store(&self) -> &MetricStore {
        self.live.store()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn render(&self) -> &R {
        self.live.render()
    }

    pub fn system(&self) -> &S {
        &self.system
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Pause the caller should take between passes
    pub fn loop_yield_ms(&self) -> u32 {
        self.scheduler.loop_yield_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Reading;
    use crate::traits::Delivery;
    use heapless::String;
    use std::collections::VecDeque;
    use std::string::String as StdString;
    use std::vec::Vec as StdVec;

    #[derive(Default)]
    struct FakeTransport {
        connected: bool,
        refuse_connect: bool,
        refuse_publish: bool,
        connects: u32,
        inbox: VecDeque<StdVec<u8>>,
        published: StdVec<StdString>,
    }

    impl FakeTransport {
        fn push(&mut self, json: &str) {
            self.inbox.push_back(json.as_bytes().to_vec());
        }
    }

    impl Transport for FakeTransport {
        fn is_connected(&self) -> bool {
            self.connected
        }

        fn connect(&mut self, _client_id: &str) -> Result<(), TransportError> {
            self.connects += 1;
            if self.refuse_connect {
                return Err(TransportError::ConnectFailed);
            }
            self.connected = true;
            Ok(())
        }

        fn subscribe(&mut self, _topic: &str) -> Result<(), TransportError> {
            Ok(())
        }

        fn publish(&mut self, _topic: &str, payload: &[u8]) -> Result<(), TransportError> {
            if !self.connected {
                return Err(TransportError::NotConnected);
            }
            if self.refuse_publish {
                return Err(TransportError::PublishFailed);
            }
            self.published
                .push(StdString::from_utf8(payload.to_vec()).unwrap());
            Ok(())
        }

        fn poll(&mut self, buf: &mut [u8]) -> Result<Option<Delivery>, TransportError> {
            let Some(payload) = self.inbox.pop_front() else {
                return Ok(None);
            };
            if payload.len() > buf.len() {
                return Err(TransportError::PayloadTooLarge);
            }
            buf[..payload.len()].copy_from_slice(&payload);
            Ok(Some(Delivery {
                topic: String::try_from("tab5/data").unwrap(),
                len: payload.len(),
            }))
        }
    }

    #[derive(Default)]
    struct FakeRender {
        redraws: usize,
        last: Option<Reading>,
        notices: StdVec<StdString>,
    }

    impl RenderTrigger for FakeRender {
        fn redraw(&mut self, metrics: &MetricStore) {
            self.redraws += 1;
            self.last = metrics.read(0);
        }

        fn notice(&mut self, message: &str) {
            self.notices.push(message.to_owned());
        }
    }

    #[derive(Default)]
    struct FakeSystem {
        restarts: usize,
    }

    impl SystemControl for FakeSystem {
        fn restart(&mut self) {
            self.restarts += 1;
        }
    }

    type TestController = Controller<FakeTransport, FakeRender, FakeSystem>;

    fn controller() -> TestController {
        Controller::new(
            &DeviceConfig::default(),
            FakeTransport::default(),
            FakeRender::default(),
            FakeSystem::default(),
        )
    }

    #[test]
    fn test_boot_draws_once() {
        let mut c = controller();
        c.boot(0);
        assert_eq!(c.render().redraws, 1);
        // Boot counts as the first periodic redraw
        assert!(!c.poll(10).redrawn);
    }

    #[test]
    fn test_first_pass_connects_and_redraws() {
        let mut c = controller();
        let report = c.poll(0);
        assert!(report.connected);
        assert!(report.redrawn);
        assert_eq!(c.transport().connects, 1);
    }

    #[test]
    fn test_update_redraws_immediately() {
        let mut c = controller();
        c.poll(0);
        let before = c.render().redraws;

        c.transport_mut().push(r#"{"oil_pressure": 123.4}"#);
        let report = c.poll(100);

        assert_eq!(report.updates, 1);
        assert!(!report.redrawn);
        assert_eq!(c.render().redraws, before + 1);
        assert_eq!(
            c.render().last,
            Some(Reading {
                current: 123.4,
                previous: 0.0
            })
        );
    }

    #[test]
    fn test_status_reflects_same_message_updates() {
        let mut c = controller();
        c.transport_mut()
            .push(r#"{"oil_pressure": 7.5, "command": "send_status"}"#);
        c.poll(0);

        assert_eq!(c.transport().published.len(), 1);
        let body = &c.transport().published[0];
        assert!(body.contains(r#""oil_pressure_current":7.5"#));
        assert!(body.contains(r#""oil_pressure_previous":0.0"#));
    }

    #[test]
    fn test_reset_shows_notice_then_restarts() {
        let mut c = controller();
        c.transport_mut().push(r#"{"command": "system_reset"}"#);
        c.transport_mut().push(r#"{"oil_pressure": 1.0}"#);
        let report = c.poll(0);

        assert!(report.reset);
        assert!(!report.redrawn);
        assert_eq!(c.render().notices, [RESET_NOTICE]);
        assert_eq!(c.system().restarts, 1);
        // Nothing after the reset is processed
        assert_eq!(c.store().read(0).map(|r| r.current), Some(0.0));
    }

    #[test]
    fn test_disconnected_keeps_stale_data() {
        let mut c = controller();
        c.transport_mut().refuse_connect = true;
        c.transport_mut().push(r#"{"oil_pressure": 5.0}"#);

        let report = c.poll(0);
        assert!(!report.connected);
        assert_eq!(report.received, 0);
        // Periodic redraw still runs with the stale values
        assert!(report.redrawn);
        assert_eq!(c.store().read(0).map(|r| r.current), Some(0.0));

        c.transport_mut().refuse_connect = false;
        let report = c.poll(100);
        assert!(report.connected);
        assert_eq!(report.updates, 1);
        assert_eq!(c.transport().connects, 2);
    }

    #[test]
    fn test_send_status_while_disconnected() {
        let mut c = controller();
        assert_eq!(c.send_status(), Err(StatusError::TransportUnavailable));
        assert!(c.transport().published.is_empty());
    }

    #[test]
    fn test_failed_status_request_keeps_loop_going() {
        let mut c = controller();
        c.poll(0);
        c.transport_mut().refuse_publish = true;
        c.transport_mut()
            .push(r#"{"oil_pressure": 8.5, "command":"send_status"}"#);
        c.transport_mut().push(r#"{"parison_temp": 3}"#);

        let report = c.poll(10);
        assert_eq!(report.received, 2);
        assert_eq!(report.updates, 2);
        assert!(!report.reset);
        assert!(c.transport().published.is_empty());
        assert_eq!(c.store().read(1).map(|r| r.current), Some(3.0));
    }

    #[test]
    fn test_drain_is_bounded() {
        let mut c = controller();
        for i in 0..(MAX_DELIVERIES_PER_PASS + 3) {
            c.transport_mut()
                .push(&format!(r#"{{"parison_temp": {i}}}"#));
        }
        let report = c.poll(0);
        assert_eq!(report.received as usize, MAX_DELIVERIES_PER_PASS);
        assert_eq!(c.transport().inbox.len(), 3);

        let report = c.poll(100);
        assert_eq!(report.received, 3);
    }

    #[test]
    fn test_oversized_message_dropped() {
        let mut c = controller();
        let big = format!(r#"{{"pad":"{}"}}"#, "x".repeat(MAX_MESSAGE_SIZE));
        c.transport_mut().push(&big);
        c.transport_mut().push(r#"{"injection_time": 2.0}"#);

        let report = c.poll(0);
        assert_eq!(report.received, 2);
        assert_eq!(report.updates, 1);
    }

    #[test]
    fn test_malformed_and_foreign_messages_ignored() {
        let mut c = controller();
        c.transport_mut().push("{not json");
        c.transport_mut()
            .push(r#"{"device_id":"other_device","oil_pressure":999}"#);
        let report = c.poll(0);

        assert_eq!(report.received, 2);
        assert_eq!(report.updates, 0);
        assert_eq!(c.store().read(0), Some(Reading::initial(0.0)));
    }
}
