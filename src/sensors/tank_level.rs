//! Float switches on the supply tank.
//!
//! Each switch closes to ground, so a LOW line means the switch is active:
//! the lower switch reports "tank low", the optional upper switch "tank
//! high".  The debouncer works on the raw line level.
//!
//! The telemetry bus expects the *inverse* of the raw line
//! (`reported = !line_high`); that quirk belongs to the remote consumer and
//! is kept as-is in [`FloatSwitch::reported_status`].

use super::debounce::DebouncedInput;
use crate::timing::Millis;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TankSwitch {
    Low,
    High,
}

/// A confirmed change on one float switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TankEvent {
    pub switch: TankSwitch,
    /// Debounced raw line level after the change.
    pub line_high: bool,
}

impl TankEvent {
    /// Value published on the telemetry bus for this change.
    pub fn reported_status(&self) -> bool {
        !self.line_high
    }
}

#[derive(Debug, Clone)]
pub struct FloatSwitch {
    line: DebouncedInput,
}

impl FloatSwitch {
    pub fn new(initial_line_high: bool, debounce_ms: u32) -> Self {
        Self {
            line: DebouncedInput::new(initial_line_high, debounce_ms),
        }
    }

    /// Debounced raw line level.
    pub fn line_high(&self) -> bool {
        self.line.level()
    }

    /// Switch closed (line pulled low).
    pub fn is_active(&self) -> bool {
        !self.line.level()
    }

    pub fn reported_status(&self) -> bool {
        !self.line.level()
    }

    /// Returns the new debounced line level when a change is confirmed.
    pub fn poll(&mut self, raw_line_high: bool, now: Millis) -> Option<bool> {
        self.line.poll(raw_line_high, now).map(|t| t.to)
    }
}

/// Both float switches of the tank (the upper one is optional).
#[derive(Debug, Clone)]
pub struct TankLevels {
    low: FloatSwitch,
    high: Option<FloatSwitch>,
}

impl TankLevels {
    pub fn new(low_line_high: bool, high_line_high: Option<bool>, debounce_ms: u32) -> Self {
        Self {
            low: FloatSwitch::new(low_line_high, debounce_ms),
            high: high_line_high.map(|lvl| FloatSwitch::new(lvl, debounce_ms)),
        }
    }

    /// Water below the lower float: dosing is interlocked.
    pub fn is_low(&self) -> bool {
        self.low.is_active()
    }

    /// Water at the upper float.  `None` on boards without one.
    pub fn is_high(&self) -> Option<bool> {
        self.high.as_ref().map(FloatSwitch::is_active)
    }

    pub fn has_high_switch(&self) -> bool {
        self.high.is_some()
    }

    pub fn low_switch(&self) -> &FloatSwitch {
        &self.low
    }

    pub fn high_switch(&self) -> Option<&FloatSwitch> {
        self.high.as_ref()
    }

    pub fn poll_low(&mut self, raw_line_high: bool, now: Millis) -> Option<TankEvent> {
        self.low.poll(raw_line_high, now).map(|line_high| TankEvent {
            switch: TankSwitch::Low,
            line_high,
        })
    }

    pub fn poll_high(&mut self, raw_line_high: bool, now: Millis) -> Option<TankEvent> {
        let high = self.high.as_mut()?;
        high.poll(raw_line_high, now).map(|line_high| TankEvent {
            switch: TankSwitch::High,
            line_high,
        })
    }
}
