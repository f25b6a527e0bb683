//! Outbound status reports.
//!
//! The control core pushes these through the
//! [`TelemetryBus`](super::ports::TelemetryBus) port.  Every report is
//! addressed to one child identifier of the node; the gateway and the
//! remote controller know the node only by these identifiers.

/// Child/sensor identifiers of this node on the telemetry bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ChildId {
    Pump = 1,
    TankLow = 2,
    TankHigh = 3,
    Moisture = 4,
    Setpoint = 5,
}

impl ChildId {
    pub fn from_u8(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::Pump),
            2 => Some(Self::TankLow),
            3 => Some(Self::TankHigh),
            4 => Some(Self::Moisture),
            5 => Some(Self::Setpoint),
            _ => None,
        }
    }

    pub const fn id(self) -> u8 {
        self as u8
    }
}

/// A status value pushed to the remote controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    /// Pump running.
    PumpStatus(bool),
    /// Lower float status, already in bus polarity (`!line_high`).
    TankLowStatus(bool),
    /// Upper float status, already in bus polarity (`!line_high`).
    TankHighStatus(bool),
    /// Smoothed soil moisture, 0–100 %.
    MoistureLevel(u8),
    /// Current moisture setpoint, %.
    Setpoint(u8),
}

impl Report {
    pub fn child(&self) -> ChildId {
        match self {
            Self::PumpStatus(_) => ChildId::Pump,
            Self::TankLowStatus(_) => ChildId::TankLow,
            Self::TankHighStatus(_) => ChildId::TankHigh,
            Self::MoistureLevel(_) => ChildId::Moisture,
            Self::Setpoint(_) => ChildId::Setpoint,
        }
    }

    /// Payload as the integer carried on the wire (`bool` → 0/1).
    pub fn value(&self) -> i32 {
        match *self {
            Self::PumpStatus(b) | Self::TankLowStatus(b) | Self::TankHighStatus(b) => i32::from(b),
            Self::MoistureLevel(v) | Self::Setpoint(v) => i32::from(v),
        }
    }
}
