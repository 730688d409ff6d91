//! Wrapping millisecond interval timer

/// Fires once per interval of a free-running millisecond clock
///
/// The clock may wrap at `u32::MAX`; elapsed time is computed with
/// wrapping subtraction. A timer that has never fired is due immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalTimer {
    interval_ms: u32,
    last_ms: Option<u32>,
}

impl IntervalTimer {
    pub const fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            last_ms: None,
        }
    }

    /// Returns true if the interval has elapsed since the last firing
    pub fn is_due(&self, now_ms: u32) -> bool {
        match self.last_ms {
            None => true,
            Some(last) => now_ms.wrapping_sub(last) >= self.interval_ms,
        }
    }

    /// Record a firing at `now_ms`
    pub fn mark(&mut self, now_ms: u32) {
        self.last_ms = Some(now_ms);
    }

    /// Fire if due, returning whether it fired
    pub fn poll(&mut self, now_ms: u32) -> bool {
        if self.is_due(now_ms) {
            self.mark(now_ms);
            true
        } else {
            false
        }
    }
}
