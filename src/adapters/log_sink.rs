//! Log-only telemetry bus.
//!
//! Implements [`TelemetryBus`] by writing every report to the ESP-IDF
//! logger (UART console in production).  Used when no gateway is wired
//! up; commands can be injected by a bench harness via [`LogTelemetryBus::inject`].

use heapless::Deque;
use log::{info, warn};

use crate::app::commands::InboundMessage;
use crate::app::events::Report;
use crate::app::ports::{BusError, TelemetryBus};

const INBOX_DEPTH: usize = 8;

pub struct LogTelemetryBus {
    inbox: Deque<InboundMessage, INBOX_DEPTH>,
    sent: u32,
}

impl Default for LogTelemetryBus {
    fn default() -> Self {
        Self::new()
    }
}

impl LogTelemetryBus {
    pub fn new() -> Self {
        Self {
            inbox: Deque::new(),
            sent: 0,
        }
    }

    /// Queue a command as if it had arrived from the controller.
    pub fn inject(&mut self, msg: InboundMessage) -> Result<(), BusError> {
        self.inbox.push_back(msg).map_err(|_| {
            warn!("REPORT | inbox full, dropping command for child {}", msg.child);
            BusError::Overflow
        })
    }

    /// Reports written since boot.
    pub fn sent(&self) -> u32 {
        self.sent
    }
}

impl TelemetryBus for LogTelemetryBus {
    fn send(&mut self, report: &Report) -> Result<(), BusError> {
        match report {
            Report::PumpStatus(on) => info!("REPORT | pump={}", if *on { "ON" } else { "OFF" }),
            Report::TankLowStatus(v) => info!("REPORT | tank_low_status={}", v),
            Report::TankHighStatus(v) => info!("REPORT | tank_high_status={}", v),
            Report::MoistureLevel(pct) => info!("REPORT | moisture={}%", pct),
            Report::Setpoint(pct) => info!("REPORT | setpoint={}%", pct),
        }
        self.sent = self.sent.wrapping_add(1);
        Ok(())
    }

    fn receive(&mut self) -> Option<InboundMessage> {
        self.inbox.pop_front()
    }
}
