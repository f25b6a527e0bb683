//! Node presentation: what the controller is told at boot about each child.
//!
//! | Child | Type         | Value type     | Label       |
//! |-------|--------------|----------------|-------------|
//! | 1     | `S_BINARY`   | `V_STATUS`     | `Rnn.BO1`   |
//! | 2     | `S_BINARY`   | `V_STATUS`     | `Rnn.BI1L`  |
//! | 3     | `S_BINARY`   | `V_STATUS`     | `Rnn.BI1H`  |
//! | 4     | `S_MOISTURE` | `V_LEVEL`      | `Rnn.AI1`   |
//! | 5     | `S_DIMMER`   | `V_PERCENTAGE` | `Rnn.AO1`   |
//!
//! Child 3 is only presented on boards with an upper float switch.

use core::fmt::Write as _;

use heapless::{String, Vec};

use super::codec::{
    Command, GatewayMessage, I_SKETCH_NAME, I_SKETCH_VERSION, NODE_SENSOR_ID, S_BINARY, S_DIMMER,
    S_MOISTURE, V_LEVEL, V_PERCENTAGE, V_STATUS,
};
use crate::app::events::{ChildId, Report};
use crate::config::SystemConfig;

pub const SKETCH_NAME: &str = "AS-Gardner";
pub const SKETCH_VERSION: &str = "1.2";

pub type Label = String<12>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildPresentation {
    pub child: ChildId,
    pub sensor_type: u8,
    pub label: Label,
}

/// `R{node:02}.{suffix}`
pub fn label(node: u8, suffix: &str) -> Label {
    let mut l = Label::new();
    // Longest case "R255.BI1L" fits the capacity.
    let _ = write!(l, "R{:02}.{}", node, suffix);
    l
}

fn describe(child: ChildId) -> (u8, &'static str) {
    match child {
        ChildId::Pump => (S_BINARY, "BO1"),
        ChildId::TankLow => (S_BINARY, "BI1L"),
        ChildId::TankHigh => (S_BINARY, "BI1H"),
        ChildId::Moisture => (S_MOISTURE, "AI1"),
        ChildId::Setpoint => (S_DIMMER, "AO1"),
    }
}

/// Value type used when reporting on `child`.
pub fn value_type(child: ChildId) -> u8 {
    match child {
        ChildId::Pump | ChildId::TankLow | ChildId::TankHigh => V_STATUS,
        ChildId::Moisture => V_LEVEL,
        ChildId::Setpoint => V_PERCENTAGE,
    }
}

/// Children this node exposes, in presentation order.
pub fn presentation_table(config: &SystemConfig) -> Vec<ChildPresentation, 5> {
    let mut table = Vec::new();
    for child in [
        ChildId::Pump,
        ChildId::TankLow,
        ChildId::TankHigh,
        ChildId::Moisture,
        ChildId::Setpoint,
    ] {
        if child == ChildId::TankHigh && !config.tank_high_present {
            continue;
        }
        let (sensor_type, suffix) = describe(child);
        let _ = table.push(ChildPresentation {
            child,
            sensor_type,
            label: label(config.node_id, suffix),
        });
    }
    table
}

/// Sketch info followed by one presentation line per child.
pub fn presentation_messages(config: &SystemConfig) -> Vec<GatewayMessage, 7> {
    let node = config.node_id;
    let mut out = Vec::new();
    let sketch = [
        (I_SKETCH_NAME, SKETCH_NAME),
        (I_SKETCH_VERSION, SKETCH_VERSION),
    ];
    for (kind, text) in sketch {
        if let Ok(msg) = GatewayMessage::new(node, NODE_SENSOR_ID, Command::Internal, kind, text) {
            let _ = out.push(msg);
        }
    }
    for entry in presentation_table(config) {
        if let Ok(msg) = GatewayMessage::new(
            node,
            entry.child.id(),
            Command::Presentation,
            entry.sensor_type,
            entry.label.as_str(),
        ) {
            let _ = out.push(msg);
        }
    }
    out
}

/// Wire message for a status report.
pub fn report_message(node: u8, report: &Report) -> GatewayMessage {
    let child = report.child();
    GatewayMessage::set_int(node, child.id(), value_type(child), report.value())
}
