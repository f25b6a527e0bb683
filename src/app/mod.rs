//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules for the irrigator: dose state
//! machine, setpoint persistence policy, report cadence and command
//! handling.  All interaction with hardware, the telemetry bus and flash
//! happens through **port traits** defined in [`ports`], keeping this
//! layer fully testable without real peripherals.

pub mod commands;
pub mod context;
pub mod events;
pub mod ports;
pub mod pump;
pub mod reporter;
pub mod service;
pub mod setpoint;
