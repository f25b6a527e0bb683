//! The control context: every piece of mutable state the loop owns.
//!
//! One struct, one writer per field, passed by reference through the
//! control pass.  Nothing here is global.  Only the setpoint survives a
//! restart (through [`SetpointStore`]); everything else is rebuilt from
//! the pins at boot.

use log::warn;

use super::ports::{DigitalLine, InputPort};
use super::pump::PumpController;
use super::reporter::Reporter;
use super::setpoint::SetpointStore;
use crate::config::SystemConfig;
use crate::drivers::button::ManualButton;
use crate::safety::{DoseConditions, Interlock};
use crate::sensors::{Calibration, MoistureFilter, TankLevels};
use crate::timing::Millis;

/// Raw input levels sampled once at boot, used to seed the debouncers
/// and the moisture filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootSample {
    pub tank_low_line_high: bool,
    pub tank_high_line_high: Option<bool>,
    pub button_line_high: Option<bool>,
    /// `None` when the first ADC read failed.
    pub moisture_raw: Option<u16>,
}

impl BootSample {
    /// Sample every configured input once.
    ///
    /// A failed tank-low read is taken as "tank low" so the pump stays
    /// interlocked until the line reads cleanly.  A failed button or
    /// upper-float read is taken as released/inactive.
    pub fn read(hw: &mut impl InputPort, config: &SystemConfig) -> Self {
        let mut line = |which: DigitalLine, fallback: bool| {
            hw.read_line(which).unwrap_or_else(|e| {
                warn!("boot: {:?} read failed ({}), assuming line {}", which, e, fallback);
                fallback
            })
        };
        let tank_low_line_high = line(DigitalLine::TankLow, false);
        let tank_high_line_high = config
            .tank_high_present
            .then(|| line(DigitalLine::TankHigh, true));
        let button_line_high = config.button_present.then(|| line(DigitalLine::Button, true));

        let moisture_raw = match hw.read_moisture_raw() {
            Ok(raw) => Some(raw),
            Err(e) => {
                warn!("boot: moisture read failed ({}), holding pump interlocked", e);
                None
            }
        };

        Self {
            tank_low_line_high,
            tank_high_line_high,
            button_line_high,
            moisture_raw,
        }
    }
}

pub struct ControlContext {
    pub config: SystemConfig,
    pub moisture: MoistureFilter,
    pub tanks: TankLevels,
    pub button: Option<ManualButton>,
    pub setpoint: SetpointStore,
    pub pump: PumpController,
    pub reporter: Reporter,
}

impl ControlContext {
    /// An invalid `config` is logged and replaced by the defaults.
    pub fn new(config: SystemConfig, boot: &BootSample, now: Millis) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                warn!("ControlContext: {}, using default config", e);
                SystemConfig::default()
            }
        };
        let calibration = Calibration {
            dry_raw: config.moisture_dry_raw,
            wet_raw: config.moisture_wet_raw,
        };
        let mut moisture = MoistureFilter::new(calibration, config.moisture_sample_interval_ms);
        if let Some(raw) = boot.moisture_raw {
            moisture.seed(raw, now);
        }

        let high = boot.tank_high_line_high.filter(|_| config.tank_high_present);
        let tanks = TankLevels::new(boot.tank_low_line_high, high, config.debounce_ms);

        let button = if config.button_present {
            boot.button_line_high
                .map(|line| ManualButton::new(line, config.debounce_ms))
        } else {
            None
        };

        let pump = PumpController::new(
            Interlock::new(config.moisture_low_limit),
            config.dose_duration_ms(),
        );

        Self {
            moisture,
            tanks,
            button,
            setpoint: SetpointStore::new(&config),
            pump,
            reporter: Reporter::new(config.report_interval_ms, now),
            config,
        }
    }

    /// Interlock inputs as of right now.
    pub fn dose_conditions(&self) -> DoseConditions {
        DoseConditions {
            tank_low: self.tanks.is_low(),
            moisture: self.moisture.filtered(),
            setpoint: self.setpoint.value(),
        }
    }
}
