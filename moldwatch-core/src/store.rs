//! Metric store
//!
//! Exactly [`METRIC_COUNT`] metrics, fixed at startup. Only values change
//! after construction, and only through [`MetricStore::update`]:
//!
//! ```text
//! update(i, v):   previous := current
//!                 current  := v
//! ```
//!
//! A metric never updated since startup has `current == previous == initial`.

use heapless::String;

use moldwatch_protocol::{KEY_LEN, METRIC_COUNT};

use crate::config::types::{DeviceConfig, MetricConfig, LABEL_LEN};

/// Current and previous value of one metric
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    pub current: f32,
    pub previous: f32,
}

impl Reading {
    /// Reading of a metric that has not been updated yet
    pub const fn initial(value: f32) -> Self {
        Self {
            current: value,
            previous: value,
        }
    }
}

/// A named metric slot
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Metric {
    name: String<KEY_LEN>,
    label: String<LABEL_LEN>,
    reading: Reading,
}

impl Metric {
    pub fn new(name: String<KEY_LEN>, label: String<LABEL_LEN>, initial: f32) -> Self {
        Self {
            name,
            label,
            reading: Reading::initial(initial),
        }
    }

    /// Wire key of the metric
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Display title
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    pub fn reading(&self) -> Reading {
        self.reading
    }

    fn apply(&mut self, value: f32) {
        self.reading.previous = self.reading.current;
        self.reading.current = value;
    }
}

impl From<&MetricConfig> for Metric {
    fn from(config: &MetricConfig) -> Self {
        Self::new(config.key.clone(), config.label.clone(), config.initial)
    }
}

/// The fixed set of metrics shown by the indicator
#[derive(Debug, Clone, PartialEq)]
pub struct MetricStore {
    metrics: [Metric; METRIC_COUNT],
}

impl MetricStore {
    pub fn new(metrics: [Metric; METRIC_COUNT]) -> Self {
        Self { metrics }
    }

    /// Build the store from configured names, labels and initial values
    pub fn from_config(config: &DeviceConfig) -> Self {
        Self::new(core::array::from_fn(|i| Metric::from(&config.metrics[i])))
    }

    /// Apply a new value to a metric
    ///
    /// Returns false (and changes nothing) if `index` is out of range.
    pub fn update(&mut self, index: usize, value: f32) -> bool {
        match self.metrics.get_mut(index) {
            Some(metric) => {
                metric.apply(value);
                true
            }
            None => {
                log_warn!("Ignoring update for metric index {}", index);
                false
            }
        }
    }

    /// Current and previous value of a metric
    pub fn read(&self, index: usize) -> Option<Reading> {
        self.metrics.get(index).map(Metric::reading)
    }

    pub fn metric(&self, index: usize) -> Option<&Metric> {
        self.metrics.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Metric> {
        self.metrics.iter()
    }

    pub const fn len(&self) -> usize {
        METRIC_COUNT
    }

    pub const fn is_empty(&self) -> bool {
        false
    }
}

impl Default for MetricStore {
    fn default() -> Self {
        Self::from_config(&DeviceConfig::default())
    }
}
