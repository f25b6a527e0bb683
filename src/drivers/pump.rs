//! Pump relay driver.
//!
//! A single digital output.  Relay boards differ in polarity; the driver
//! hides that so callers only ever say "on" or "off".
//!
//! ## Safety contract
//!
//! The pump must never start while the tank is low.  That is enforced by
//! the dose interlock; this driver is a dumb actuator and obeys blindly.
//!
//! Generic over [`embedded_hal::digital::OutputPin`]: on ESP-IDF it wraps
//! a `PinDriver`, on host tests any mock pin.

use embedded_hal::digital::OutputPin;

use crate::error::ActuatorError;

pub struct PumpDriver<P> {
    pin: P,
    active_low: bool,
    running: bool,
}

impl<P: OutputPin> PumpDriver<P> {
    /// Take ownership of the pin and drive it to the inactive level.
    pub fn new(pin: P, active_low: bool) -> Result<Self, ActuatorError> {
        let mut driver = Self {
            pin,
            active_low,
            running: false,
        };
        driver.write(false)?;
        Ok(driver)
    }

    pub fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.write(on)?;
        self.running = on;
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn pin(&self) -> &P {
        &self.pin
    }

    fn write(&mut self, on: bool) -> Result<(), ActuatorError> {
        let high = on != self.active_low;
        let res = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        res.map_err(|_| ActuatorError::GpioWriteFailed)
    }
}
