//! Capacitive soil-moisture probe: calibration and smoothing.
//!
//! The probe's analog output falls as the soil gets wetter, so the stock
//! calibration maps the *dry* raw value to 0 % and the *wet* raw value to
//! 100 %.  Either direction works; only the two endpoints matter.
//!
//! ## Smoothing
//!
//! `filtered = (filtered * 10 + percent) / 11` in integer arithmetic.  The
//! floor division biases the filter low: approaching a constant input from
//! below it settles up to 10 points short, from above it reaches the input.
//! Remote dashboards and the auto-irrigation threshold were tuned against
//! this behaviour, so it is kept exactly.

use crate::timing::{Millis, interval_passed};

/// Weight of the accumulated history in the moving average.
pub const EMA_WEIGHT: u32 = 10;

/// Two-point linear calibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calibration {
    /// Raw reading that maps to 0 %.
    pub dry_raw: u16,
    /// Raw reading that maps to 100 %.
    pub wet_raw: u16,
}

impl Calibration {
    /// Map a raw ADC value onto 0–100 %, truncating toward zero, clamped.
    pub fn to_percent(&self, raw: u16) -> u8 {
        let span = i32::from(self.wet_raw) - i32::from(self.dry_raw);
        if span == 0 {
            return 0;
        }
        let pct = (i32::from(raw) - i32::from(self.dry_raw)) * 100 / span;
        pct.clamp(0, 100) as u8
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            dry_raw: 670,
            wet_raw: 277,
        }
    }
}

pub struct MoistureFilter {
    cal: Calibration,
    filtered: u8,
    interval_ms: u32,
    last_sample_ms: Millis,
}

impl MoistureFilter {
    pub fn new(cal: Calibration, interval_ms: u32) -> Self {
        Self {
            cal,
            filtered: 0,
            interval_ms,
            last_sample_ms: 0,
        }
    }

    /// Initialise the smoothed value directly from the first raw sample.
    pub fn seed(&mut self, raw: u16, now: Millis) -> u8 {
        self.filtered = self.cal.to_percent(raw);
        self.last_sample_ms = now;
        self.filtered
    }

    /// Fold one raw sample into the average.  Returns the instantaneous
    /// calibrated percentage; the smoothed value is [`filtered`](Self::filtered).
    pub fn sample(&mut self, raw: u16) -> u8 {
        let percent = self.cal.to_percent(raw);
        let acc = u32::from(self.filtered) * EMA_WEIGHT + u32::from(percent);
        self.filtered = (acc / (EMA_WEIGHT + 1)) as u8;
        percent
    }

    /// [`sample`](Self::sample) and restart the sampling interval at `now`.
    pub fn sample_at(&mut self, raw: u16, now: Millis) -> u8 {
        self.last_sample_ms = now;
        self.sample(raw)
    }

    /// Whether the sampling interval has passed since the last sample.
    pub fn is_due(&self, now: Millis) -> bool {
        interval_passed(now, self.last_sample_ms, self.interval_ms)
    }

    /// Smoothed moisture, 0–100 %.
    pub fn filtered(&self) -> u8 {
        self.filtered
    }

    pub fn calibration(&self) -> Calibration {
        self.cal
    }
}
