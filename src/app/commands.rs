//! Inbound commands to the application service.
//!
//! The telemetry bus delivers raw `(child, value)` pairs; only two children
//! accept commands.  Each child id is its own case: a pump command never
//! touches the setpoint and vice versa.

use log::debug;

use super::events::ChildId;

/// A raw `set` message received from the telemetry bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InboundMessage {
    pub child: u8,
    pub value: i32,
}

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Remote pump on/off.  "On" is interlocked, "off" always succeeds.
    SetPump(bool),
    /// Remote setpoint request, clamped to the policy bounds on arrival.
    SetSetpoint(i32),
}

impl AppCommand {
    /// Interpret a bus message.  Messages for children that take no
    /// commands are dropped.
    pub fn from_message(msg: &InboundMessage) -> Option<Self> {
        match ChildId::from_u8(msg.child) {
            Some(ChildId::Pump) => Some(Self::SetPump(msg.value != 0)),
            Some(ChildId::Setpoint) => Some(Self::SetSetpoint(msg.value)),
            _ => {
                debug!("ignoring command for child {}", msg.child);
                None
            }
        }
    }
}
