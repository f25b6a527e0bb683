//! Moisture setpoint with debounced persistence.
//!
//! Remote setpoint changes take effect immediately in memory, but flash is
//! only written once the value has been left alone for the quiet period.
//! A slider dragged across the UI produces a burst of commands; only the
//! last one reaches storage.
//!
//! ```text
//!   set(70) ─┐  set(72) ─┐  set(75) ─┐
//!            ▼           ▼           ▼
//!   ─────────┴───────────┴───────────┴──── quiet ────▶ write(75)
//! ```

use log::{info, warn};

use super::ports::{StorageError, StoragePort};
use crate::config::SystemConfig;
use crate::timing::{Millis, has_elapsed};

/// NVS namespace holding the persisted setpoint.
pub const SETPOINT_NAMESPACE: &str = "irrigator";
/// NVS key of the persisted setpoint (`i16`, little-endian).
pub const SETPOINT_KEY: &str = "setpoint";

#[derive(Debug, Clone)]
pub struct SetpointStore {
    value: u8,
    low: u8,
    high: u8,
    fallback: u8,
    quiet_ms: u32,
    /// Time of the last uncommitted `set`; `None` when flash is in sync.
    pending_since: Option<Millis>,
}

impl SetpointStore {
    pub fn new(config: &SystemConfig) -> Self {
        let low = config.moisture_low_limit;
        let high = config.moisture_hi_limit.max(low);
        let fallback = config.default_setpoint.max(low).min(high);
        Self {
            value: fallback,
            low,
            high,
            fallback,
            quiet_ms: config.setpoint_quiet_period_ms,
            pending_since: None,
        }
    }

    /// Restore the persisted setpoint.
    ///
    /// Missing slot, wrong length and negative values fall back to the
    /// default; anything else is clamped into bounds.
    pub fn load(&mut self, storage: &impl StoragePort) -> u8 {
        let mut buf = [0u8; 4];
        self.value = match storage.read(SETPOINT_NAMESPACE, SETPOINT_KEY, &mut buf) {
            Ok(2) => {
                let stored = i16::from_le_bytes([buf[0], buf[1]]);
                if stored < 0 {
                    warn!("setpoint: stored value {} is negative, using default", stored);
                    self.fallback
                } else {
                    self.clamp(i32::from(stored))
                }
            }
            Ok(len) => {
                warn!("setpoint: stored slot has {} bytes, using default", len);
                self.fallback
            }
            Err(StorageError::NotFound) => {
                info!("setpoint: nothing stored, using default {}", self.fallback);
                self.fallback
            }
            Err(e) => {
                warn!("setpoint: read failed ({}), using default", e);
                self.fallback
            }
        };
        self.pending_since = None;
        info!("setpoint: loaded {}%", self.value);
        self.value
    }

    /// Apply a requested setpoint and (re)arm the quiet-period timer.
    /// Returns the clamped value now in effect.
    pub fn set(&mut self, requested: i32, now: Millis) -> u8 {
        let clamped = self.clamp(requested);
        if i32::from(clamped) != requested {
            info!("setpoint: request {} clamped to {}", requested, clamped);
        }
        self.value = clamped;
        self.pending_since = Some(now);
        clamped
    }

    /// Commit the setpoint once the quiet period has elapsed.
    ///
    /// Returns the committed value when a write was attempted this call.
    /// A failed write is logged and not retried until the next `set`.
    pub fn tick(&mut self, now: Millis, storage: &mut impl StoragePort) -> Option<u8> {
        let since = self.pending_since?;
        if !has_elapsed(now, since, self.quiet_ms) {
            return None;
        }
        self.pending_since = None;

        let bytes = i16::from(self.value).to_le_bytes();
        match storage.write(SETPOINT_NAMESPACE, SETPOINT_KEY, &bytes) {
            Ok(()) => info!("setpoint: {}% committed to storage", self.value),
            Err(e) => warn!("setpoint: write failed ({}), keeping {}% in memory only", e, self.value),
        }
        Some(self.value)
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    /// An uncommitted change is waiting for its quiet period.
    pub fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }

    pub fn bounds(&self) -> (u8, u8) {
        (self.low, self.high)
    }

    fn clamp(&self, requested: i32) -> u8 {
        requested.clamp(i32::from(self.low), i32::from(self.high)) as u8
    }
}
