//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (pins, ADC, telemetry bus, storage, clock) implement
//! these traits.  The [`AppService`](super::service::AppService) consumes
//! them via generics, so the control core never touches hardware directly.

use super::commands::InboundMessage;
use super::events::Report;
use crate::config::SystemConfig;
use crate::error::Error;
use crate::timing::Millis;

pub use crate::error::{BusError, SensorError, StorageError};

// ───────────────────────────────────────────────────────────────
// Input port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Digital inputs known to the control core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitalLine {
    /// Lower tank float switch.
    TankLow,
    /// Upper tank float switch (optional).
    TankHigh,
    /// Manual dose push-button.
    Button,
}

/// Read-side port: raw signal acquisition.
pub trait InputPort {
    /// Raw electrical level of a digital line (`true` = HIGH).
    fn read_line(&mut self, line: DigitalLine) -> Result<bool, SensorError>;

    /// Raw ADC count from the soil-moisture probe.
    fn read_moisture_raw(&mut self) -> Result<u16, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Output port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port.  Polarity is the adapter's business: `true` means
/// "water is flowing", whatever level the relay needs.
pub trait OutputPort {
    fn set_pump(&mut self, active: bool);
}

// ───────────────────────────────────────────────────────────────
// Telemetry bus (driven adapter: domain ↔ remote controller)
// ───────────────────────────────────────────────────────────────

/// Status reports out, commands in.  Delivery is best-effort: the core
/// logs a failed send and carries on.
pub trait TelemetryBus {
    fn send(&mut self, report: &Report) -> Result<(), BusError>;

    /// Next pending inbound command, if any.  Must not block.
    fn receive(&mut self) -> Option<InboundMessage>;
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / EEPROM)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage.
///
/// Write operations MUST be atomic: no partial writes on power loss.
/// The ESP-IDF NVS API guarantees this natively; in-memory simulation
/// achieves it trivially.
pub trait StoragePort {
    /// Read a value.  Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key.  Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    /// Check whether a key exists without reading it.
    fn exists(&self, namespace: &str, key: &str) -> bool;
}

/// Persisted [`SystemConfig`] override.  Absent means "use defaults";
/// anything stored must decode and validate.
pub trait ConfigPort {
    fn load(&self) -> Result<SystemConfig, Error>;
    fn save(&mut self, config: &SystemConfig) -> Result<(), Error>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.  Wraps at `u32::MAX`; compare readings
/// only through [`crate::timing`].
pub trait ClockPort {
    fn now_ms(&self) -> Millis;
}
