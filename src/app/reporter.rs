//! Periodic status-report cadence.

use crate::timing::{Millis, interval_passed};

#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    interval_ms: u32,
    last_ms: Millis,
}

impl Reporter {
    pub fn new(interval_ms: u32, now: Millis) -> Self {
        Self {
            interval_ms,
            last_ms: now,
        }
    }

    /// `true` once per interval; restarts the interval when it fires.
    pub fn tick(&mut self, now: Millis) -> bool {
        if interval_passed(now, self.last_ms, self.interval_ms) {
            self.last_ms = now;
            true
        } else {
            false
        }
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }
}
