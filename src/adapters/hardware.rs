//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the digital input pins and the pump driver, exposing them through
//! [`InputPort`] and [`OutputPort`].  Digital pins are generic over the
//! `embedded-hal` 1.0 traits (`PinDriver` on ESP-IDF, mocks on host).  On
//! target the moisture probe is read through `hw_init`; host builds keep a
//! simulated probe on the adapter itself so tests never share state.

use embedded_hal::digital::{InputPin, OutputPin};
use log::error;

use crate::app::ports::{DigitalLine, InputPort, OutputPort, SensorError};
#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::drivers::pump::PumpDriver;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<I, P> {
    tank_low: I,
    tank_high: Option<I>,
    button: Option<I>,
    pump: PumpDriver<P>,
    #[cfg(not(target_os = "espidf"))]
    sim_moisture_raw: u16,
    #[cfg(not(target_os = "espidf"))]
    sim_adc_fault: bool,
}

impl<I: InputPin, P: OutputPin> HardwareAdapter<I, P> {
    pub fn new(tank_low: I, tank_high: Option<I>, button: Option<I>, pump: PumpDriver<P>) -> Self {
        Self {
            tank_low,
            tank_high,
            button,
            pump,
            // Mid-scale between the default dry and wet endpoints.
            #[cfg(not(target_os = "espidf"))]
            sim_moisture_raw: 500,
            #[cfg(not(target_os = "espidf"))]
            sim_adc_fault: false,
        }
    }

    /// Set the raw count the simulated probe returns.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_moisture_adc(&mut self, raw: u16) {
        self.sim_moisture_raw = raw;
    }

    /// Make simulated probe reads fail.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_adc_fault(&mut self, fault: bool) {
        self.sim_adc_fault = fault;
    }

    pub fn pump(&self) -> &PumpDriver<P> {
        &self.pump
    }
}

// ── InputPort implementation ──────────────────────────────────

impl<I: InputPin, P: OutputPin> InputPort for HardwareAdapter<I, P> {
    fn read_line(&mut self, line: DigitalLine) -> Result<bool, SensorError> {
        let pin = match line {
            DigitalLine::TankLow => Some(&mut self.tank_low),
            DigitalLine::TankHigh => self.tank_high.as_mut(),
            DigitalLine::Button => self.button.as_mut(),
        };
        pin.ok_or(SensorError::GpioReadFailed)?
            .is_high()
            .map_err(|_| SensorError::GpioReadFailed)
    }

    #[cfg(target_os = "espidf")]
    fn read_moisture_raw(&mut self) -> Result<u16, SensorError> {
        hw_init::moisture_adc_read()
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_moisture_raw(&mut self) -> Result<u16, SensorError> {
        if self.sim_adc_fault {
            return Err(SensorError::AdcReadFailed);
        }
        Ok(self.sim_moisture_raw)
    }
}

// ── OutputPort implementation ─────────────────────────────────

impl<I: InputPin, P: OutputPin> OutputPort for HardwareAdapter<I, P> {
    fn set_pump(&mut self, active: bool) {
        if let Err(e) = self.pump.set(active) {
            error!("pump relay write failed ({}), requested active={}", e, active);
        }
    }
}
