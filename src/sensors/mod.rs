//! Sensor subsystem: pure signal conditioning, no I/O.
//!
//! Raw samples come in through [`InputPort`](crate::app::ports::InputPort);
//! the types here turn them into the confirmed/smoothed values the control
//! core acts on.

pub mod debounce;
pub mod moisture;
pub mod tank_level;

pub use debounce::{DebouncedInput, Transition};
pub use moisture::{Calibration, MoistureFilter};
pub use tank_level::{TankEvent, TankLevels, TankSwitch};
