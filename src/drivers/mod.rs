//! Actuator drivers, input conditioning for the button, and peripheral
//! initialisation.

pub mod button;
pub mod hw_init;
pub mod pump;
pub mod watchdog;
