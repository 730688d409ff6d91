//! Control loop runtime
//!
//! One cooperative loop: poll the controller, then sleep for the
//! configured yield. The controller owns the store, so no locking is
//! needed as long as the transport is polled from this task.

use defmt::*;
use embassy_time::{Instant, Timer};

use moldwatch_core::config::DeviceConfig;
use moldwatch_core::traits::{SystemControl, Transport};
use moldwatch_core::Controller;
use moldwatch_display::{Dashboard, DisplayBackend};

/// Milliseconds since boot on the wrapping clock the core expects
fn now_ms() -> u32 {
    Instant::now().as_millis() as u32
}

/// Run the indicator forever
pub async fn run<T, B, S>(config: DeviceConfig, transport: T, backend: B, system: S) -> !
where
    T: Transport,
    B: DisplayBackend,
    S: SystemControl,
{
    info!("=== Moldwatch metric indicator ===");
    info!(
        "Broker {}:{}, subscribe {}, publish {}",
        config.transport.broker_host.as_str(),
        config.transport.broker_port,
        config.transport.subscribe_topic.as_str(),
        config.transport.publish_topic.as_str()
    );

    let mut dashboard = Dashboard::new(backend, config.layout.clone());
    if let Err(e) = dashboard.init() {
        // Keep going: the broker link and status reports still work
        error!("Display init failed: {:?}", e);
    }

    let mut controller = Controller::new(&config, transport, dashboard, system);
    controller.boot(now_ms());
    info!("Setup completed");

    let yield_ms = u64::from(controller.loop_yield_ms());
    loop {
        let report = controller.poll(now_ms());
        if report.reset {
            warn!("Restart did not take effect");
        }
        trace!(
            "pass: connected={} received={} updates={}",
            report.connected,
            report.received,
            report.updates
        );
        Timer::after_millis(yield_ms).await;
    }
}
