//! Moldwatch firmware runtime
//!
//! Board-independent target side of the indicator: loads the embedded
//! configuration and drives the core controller from an embassy timer.
//!
//! A board crate provides the three collaborators and calls [`run`]:
//!
//! ```ignore
//! #[embassy_executor::main]
//! async fn main(_spawner: Spawner) {
//!     let config = moldwatch_firmware::load_config();
//!     let broker = BrokerClient::new(wifi, &config.transport);
//!     let panel = Tab5Panel::new(p.DSI);
//!     moldwatch_firmware::run(config, broker, panel, Watchdog::new(p.WDT)).await
//! }
//! ```

#![no_std]

pub mod config;
pub mod runtime;

pub use config::{load_config, parse_bytes, ConfigError, DEVICE_TOML};
pub use runtime::run;
