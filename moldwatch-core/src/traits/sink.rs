//! Data sink and render trigger
//!
//! The router writes metrics through [`DataSink`] without knowing whether a
//! redraw follows. [`LiveStore`] is the sink used at runtime: it owns the
//! [`MetricStore`] and redraws synchronously after every applied update.
//!
//! ```text
//!  MessageRouter ──update──► LiveStore ──► MetricStore
//!                                 │
//!                                 └──redraw──► RenderTrigger (display)
//! ```

use crate::store::{MetricStore, Reading};

/// Write/read access to metric values
pub trait DataSink {
    /// Apply a value to the metric at `index`
    ///
    /// Out-of-range indices are ignored.
    fn update(&mut self, index: usize, value: f32);

    /// Current and previous value of the metric at `index`
    fn read(&self, index: usize) -> Option<Reading>;
}

impl DataSink for MetricStore {
    fn update(&mut self, index: usize, value: f32) {
        MetricStore::update(self, index, value);
    }

    fn read(&self, index: usize) -> Option<Reading> {
        MetricStore::read(self, index)
    }
}

/// Something that can redraw the screen from the store
pub trait RenderTrigger {
    /// Redraw all metrics from current store contents
    fn redraw(&mut self, metrics: &MetricStore);

    /// Replace the screen with a full-screen notice
    fn notice(&mut self, _message: &str) {}
}

/// A metric store wired to a renderer
pub struct LiveStore<R> {
    store: MetricStore,
    render: R,
}

impl<R: RenderTrigger> LiveStore<R> {
    pub fn new(store: MetricStore, render: R) -> Self {
        Self { store, render }
    }

    /// Redraw without changing any value
    pub fn redraw(&mut self) {
        self.render.redraw(&self.store);
    }

    pub fn notice(&mut self, message: &str) {
        self.render.notice(message);
    }

    pub fn store(&self) -> &MetricStore {
        &self.store
    }

    pub fn render(&self) -> &R {
        &self.render
    }

    pub fn render_mut(&mut self) -> &mut R {
        &mut self.render
    }
}

impl<R: RenderTrigger> DataSink for LiveStore<R> {
    fn update(&mut self, index: usize, value: f32) {
        if self.store.update(index, value) {
            self.render.redraw(&self.store);
        }
    }

    fn read(&self, index: usize) -> Option<Reading> {
        self.store.read(index)
    }
}
