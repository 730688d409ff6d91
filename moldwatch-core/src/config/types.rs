//! Configuration type definitions
//!
//! Static for the lifetime of the process. Defaults reproduce the
//! original Tab5 indicator deployment.

use heapless::String;

use moldwatch_protocol::{KeyTable, KEY_LEN, METRIC_COUNT};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum device identity length
pub const DEVICE_ID_LEN: usize = 32;

/// Maximum broker host length
pub const HOST_LEN: usize = 64;

/// Maximum client identifier length
pub const CLIENT_ID_LEN: usize = 32;

/// Maximum topic length
pub const TOPIC_LEN: usize = 64;

/// Maximum display label length in bytes (labels may be multi-byte UTF-8)
pub const LABEL_LEN: usize = 48;

/// Publish/subscribe transport settings
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TransportConfig {
    /// Broker address
    pub broker_host: String<HOST_LEN>,
    /// Broker port
    pub broker_port: u16,
    /// Client identifier presented on connect
    pub client_id: String<CLIENT_ID_LEN>,
    /// Topic carrying inbound metric messages and commands
    pub subscribe_topic: String<TOPIC_LEN>,
    /// Topic receiving status reports
    pub publish_topic: String<TOPIC_LEN>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            broker_host: bounded("192.168.1.100"),
            broker_port: 1883,
            client_id: bounded("tab5_indicator"),
            subscribe_topic: bounded("tab5/data"),
            publish_topic: bounded("tab5/status"),
        }
    }
}

/// One metric slot
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MetricConfig {
    /// Wire key; also the stem of the status keys
    pub key: String<KEY_LEN>,
    /// Display title
    pub label: String<LABEL_LEN>,
    /// Value of both current and previous at startup
    pub initial: f32,
}

impl MetricConfig {
    pub fn new(key: &str, label: &str, initial: f32) -> Self {
        Self {
            key: bounded(key),
            label: bounded(label),
            initial,
        }
    }
}

/// Timer settings for the control loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SchedulerConfig {
    /// Full redraw interval (ms)
    pub render_interval_ms: u32,
    /// Pause between control loop passes (ms)
    pub loop_yield_ms: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            render_interval_ms: 1000,
            loop_yield_ms: 100,
        }
    }
}

/// Rectangle in panel pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

/// Offset relative to a section's top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Offset {
    pub dx: i32,
    pub dy: i32,
}

impl Offset {
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }
}

/// Typeface family for labels and values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FontFamily {
    #[default]
    Gothic,
    Mincho,
}

/// Screen layout of the three metric sections
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LayoutConfig {
    /// Section frames, top to bottom, one per metric
    pub sections: [Rect; METRIC_COUNT],
    pub title_offset: Offset,
    pub current_offset: Offset,
    pub previous_offset: Offset,
    pub font_family: FontFamily,
    pub title_font_size: u8,
    pub current_font_size: u8,
    pub previous_font_size: u8,
    /// Text magnification of the title
    pub title_scale: u8,
    /// Text magnification of the numeric values
    pub value_scale: u8,
    /// Digits after the decimal point
    pub decimal_places: u8,
    /// Total formatted width including sign and point (zero padded)
    pub total_width: u8,
    /// Right edge of values, relative to the section's x
    pub right_align_x: i32,
    /// Backlight level (0-255)
    pub brightness: u8,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            sections: [
                Rect::new(10, 10, 700, 410),
                Rect::new(10, 430, 700, 410),
                Rect::new(10, 850, 700, 410),
            ],
            title_offset: Offset::new(20, 20),
            current_offset: Offset::new(30, 150),
            previous_offset: Offset::new(30, 270),
            font_family: FontFamily::Gothic,
            title_font_size: 40,
            current_font_size: 40,
            previous_font_size: 40,
            title_scale: 2,
            value_scale: 3,
            decimal_places: 1,
            total_width: 6,
            right_align_x: 650,
            brightness: 200,
        }
    }
}

/// Complete device configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceConfig {
    /// Identity matched against inbound `device_id`
    pub device_id: String<DEVICE_ID_LEN>,
    pub transport: TransportConfig,
    pub metrics: [MetricConfig; METRIC_COUNT],
    /// Accepted synonym for the third metric's key
    pub alias_key: Option<String<KEY_LEN>>,
    pub scheduler: SchedulerConfig,
    pub layout: LayoutConfig,
}

impl DeviceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key table for decoding inbound messages
    pub fn key_table(&self) -> KeyTable {
        KeyTable::from_keys(
            core::array::from_fn(|i| self.metrics[i].key.clone()),
            self.alias_key.clone(),
        )
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            device_id: bounded("tab5_001"),
            transport: TransportConfig::default(),
            metrics: [
                MetricConfig::new("oil_pressure", "油圧", 0.0),
                MetricConfig::new("parison_temp", "パリソン温度", 0.0),
                MetricConfig::new("injection_time", "射出時間", 0.0),
            ],
            alias_key: Some(bounded("injction_time")),
            scheduler: SchedulerConfig::default(),
            layout: LayoutConfig::default(),
        }
    }
}

/// Copy a literal into a bounded string, truncating at a char boundary
pub(crate) fn bounded<const N: usize>(text: &str) -> String<N> {
    let mut s = String::new();
    for c in text.chars() {
        if s.push(c).is_err() {
            break;
        }
    }
    s
}
