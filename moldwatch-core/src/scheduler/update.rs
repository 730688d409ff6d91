//! Update scheduler
//!
//! ```text
//!  every pass:          maintain connection
//!  every render_ms:     full redraw (regardless of changes)
//!  on metric update:    redraw immediately (handled by the sink)
//! ```
//!
//! Both ticks are due on the first pass after startup.

use super::timer::IntervalTimer;
use crate::config::types::SchedulerConfig;

/// What a control loop pass must do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tick {
    /// Check the connection and reconnect if needed
    pub maintain_connection: bool,
    /// Redraw all metrics
    pub redraw: bool,
}

/// Periodic redraw and connection maintenance
#[derive(Debug, Clone)]
pub struct UpdateScheduler {
    render: IntervalTimer,
    loop_yield_ms: u32,
}

impl UpdateScheduler {
    pub fn new(config: &SchedulerConfig) -> Self {
        Self {
            render: IntervalTimer::new(config.render_interval_ms),
            loop_yield_ms: config.loop_yield_ms,
        }
    }

    /// Evaluate the timers at `now_ms`
    ///
    /// The redraw flag is consumed: it is true at most once per interval.
    pub fn tick(&mut self, now_ms: u32) -> Tick {
        Tick {
            maintain_connection: true,
            redraw: self.render.poll(now_ms),
        }
    }

    /// Record a redraw done outside the periodic tick
    pub fn mark_redraw(&mut self, now_ms: u32) {
        self.render.mark(now_ms);
    }

    /// Pause between control loop passes
    pub fn loop_yield_ms(&self) -> u32 {
        self.loop_yield_ms
    }
}

impl Default for UpdateScheduler {
    fn default() -> Self {
        Self::new(&SchedulerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_does_everything() {
        let mut scheduler = UpdateScheduler::default();
        assert_eq!(
            scheduler.tick(0),
            Tick {
                maintain_connection: true,
                redraw: true
            }
        );
    }

    #[test]
    fn test_redraw_every_interval() {
        let mut scheduler = UpdateScheduler::default();
        let redraws = (0..=3000u32)
            .step_by(100)
            .filter(|&t| scheduler.tick(t).redraw)
            .count();
        // t = 0, 1000, 2000, 3000
        assert_eq!(redraws, 4);
    }

    #[test]
    fn test_connection_checked_every_pass() {
        let mut scheduler = UpdateScheduler::default();
        scheduler.tick(0);
        assert!(scheduler.tick(10).maintain_connection);
        assert!(!scheduler.tick(10).redraw);
    }

    #[test]
    fn test_custom_interval() {
        let mut scheduler = UpdateScheduler::new(&SchedulerConfig {
            render_interval_ms: 250,
            loop_yield_ms: 20,
        });
        assert!(scheduler.tick(0).redraw);
        assert!(!scheduler.tick(249).redraw);
        assert!(scheduler.tick(250).redraw);
        assert_eq!(scheduler.loop_yield_ms(), 20);
    }

    #[test]
    fn test_mark_redraw_postpones_tick() {
        let mut scheduler = UpdateScheduler::default();
        scheduler.mark_redraw(500);
        assert!(!scheduler.tick(600).redraw);
        assert!(scheduler.tick(1500).redraw);
    }
}
