//! Dosing interlock.
//!
//! Evaluated at the instant of every `Idle → Dosing` request, whatever its
//! source (button, remote command, auto-trigger).  Each failed condition
//! sets one bit so a rejected request can log every reason at once.
//!
//! | Fault              | Condition                       |
//! |--------------------|---------------------------------|
//! | `TankLow`          | lower float switch active       |
//! | `ProbeAtFloor`     | moisture ≤ low limit            |
//! | `SetpointReached`  | moisture ≥ setpoint             |
//!
//! A moisture reading at or below the low limit usually means a dry or
//! disconnected probe rather than genuinely parched soil.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum InterlockFault {
    TankLow = 0b0000_0001,
    ProbeAtFloor = 0b0000_0010,
    SetpointReached = 0b0000_0100,
}

impl InterlockFault {
    pub const ALL: [Self; 3] = [Self::TankLow, Self::ProbeAtFloor, Self::SetpointReached];

    /// Return the bitmask for this fault.
    pub const fn mask(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for InterlockFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TankLow => write!(f, "tank low"),
            Self::ProbeAtFloor => write!(f, "moisture at/below low limit"),
            Self::SetpointReached => write!(f, "moisture at/above setpoint"),
        }
    }
}

/// Accumulated fault bitmask from one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InterlockFaults(u8);

impl InterlockFaults {
    pub fn is_clear(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, fault: InterlockFault) -> bool {
        self.0 & fault.mask() != 0
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    fn set(&mut self, fault: InterlockFault) {
        self.0 |= fault.mask();
    }
}

impl fmt::Display for InterlockFaults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clear() {
            return write!(f, "none");
        }
        let mut first = true;
        for fault in InterlockFault::ALL {
            if self.contains(fault) {
                if !first {
                    write!(f, ", ")?;
                }
                write!(f, "{fault}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Inputs the interlock needs, snapshotted from the control context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoseConditions {
    pub tank_low: bool,
    pub moisture: u8,
    pub setpoint: u8,
}

/// Dose interlock with the configured moisture floor.
#[derive(Debug, Clone, Copy)]
pub struct Interlock {
    low_limit: u8,
}

impl Interlock {
    pub fn new(low_limit: u8) -> Self {
        Self { low_limit }
    }

    pub fn evaluate(&self, c: &DoseConditions) -> InterlockFaults {
        let mut faults = InterlockFaults::default();
        if c.tank_low {
            faults.set(InterlockFault::TankLow);
        }
        if c.moisture <= self.low_limit {
            faults.set(InterlockFault::ProbeAtFloor);
        }
        if c.moisture >= c.setpoint {
            faults.set(InterlockFault::SetpointReached);
        }
        faults
    }
}
