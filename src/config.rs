//! System configuration parameters
//!
//! All tunable parameters for the irrigation controller.  The values in
//! [`SystemConfig::default`] are the build-time constants for the stock
//! board; a different board revision overrides them in `main`.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Telemetry node ---
    /// Node address on the telemetry mesh (used for presentation labels).
    pub node_id: u8,

    // --- Moisture probe calibration ---
    /// Raw ADC value read with the probe in dry air (maps to 0 %).
    pub moisture_dry_raw: u16,
    /// Raw ADC value read with the probe in water (maps to 100 %).
    pub moisture_wet_raw: u16,
    /// Interval between moisture samples (milliseconds).
    pub moisture_sample_interval_ms: u32,

    // --- Setpoint policy ---
    /// Lowest accepted setpoint and the dry-probe interlock floor (%).
    pub moisture_low_limit: u8,
    /// Highest accepted setpoint (%).
    pub moisture_hi_limit: u8,
    /// Setpoint used when nothing valid is persisted (%).
    pub default_setpoint: u8,
    /// Quiet period after the last setpoint change before it is persisted.
    pub setpoint_quiet_period_ms: u32,

    // --- Dosing ---
    /// Pump run time per dose unit (milliseconds).
    pub impulse_time_ms: u32,
    /// Dose units per dose (mL for the stock peristaltic pump).
    pub impulse_volume: u32,

    // --- Digital inputs ---
    /// Confirmation window for float switches and the push-button.
    pub debounce_ms: u32,
    /// Board has an upper float switch on the tank.
    pub tank_high_present: bool,
    /// Board has the manual dose push-button fitted.
    pub button_present: bool,

    // --- Reporting ---
    /// Moisture report / auto-irrigation check interval (milliseconds).
    pub report_interval_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            node_id: 1,

            // Capacitive probe v1.2 on a 10-bit ADC
            moisture_dry_raw: 670,
            moisture_wet_raw: 277,
            moisture_sample_interval_ms: 1_000,

            moisture_low_limit: 10,
            moisture_hi_limit: 80,
            default_setpoint: 60,
            setpoint_quiet_period_ms: 10_000,

            // 38 ms/mL * 250 mL = 9.5 s per dose
            impulse_time_ms: 38,
            impulse_volume: 250,

            debounce_ms: 10,
            tank_high_present: false,
            button_present: true,

            report_interval_ms: 300_000, // 5 min
        }
    }
}

impl SystemConfig {
    /// Total pump-on time for one dose (milliseconds).
    pub fn dose_duration_ms(&self) -> u32 {
        self.impulse_time_ms.saturating_mul(self.impulse_volume)
    }

    /// Range-check every field.  Called once at startup; an invalid build
    /// constant falls back to [`SystemConfig::default`].
    pub fn validate(&self) -> Result<(), Error> {
        if self.moisture_dry_raw == self.moisture_wet_raw {
            return Err(Error::Config("moisture calibration endpoints must differ"));
        }
        if !(1_000..=6_000).contains(&self.moisture_sample_interval_ms) {
            return Err(Error::Config(
                "moisture_sample_interval_ms must be 1000–6000",
            ));
        }
        if self.moisture_hi_limit > 100 {
            return Err(Error::Config("moisture_hi_limit must be 0–100"));
        }
        if self.moisture_low_limit >= self.moisture_hi_limit {
            return Err(Error::Config(
                "moisture_low_limit must be < moisture_hi_limit",
            ));
        }
        if self.default_setpoint > 100 {
            return Err(Error::Config("default_setpoint must be 0–100"));
        }
        if self.setpoint_quiet_period_ms == 0 {
            return Err(Error::Config("setpoint_quiet_period_ms must be > 0"));
        }
        if self.dose_duration_ms() == 0 || self.dose_duration_ms() >= u32::MAX / 2 {
            return Err(Error::Config("dose duration out of range"));
        }
        if !(1..=100).contains(&self.debounce_ms) {
            return Err(Error::Config("debounce_ms must be 1–100"));
        }
        if !(60_000..=300_000).contains(&self.report_interval_ms) {
            return Err(Error::Config("report_interval_ms must be 60000–300000"));
        }
        Ok(())
    }
}
