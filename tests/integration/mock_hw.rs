//! Mock adapters for integration tests.
//!
//! Records every pump write and every report so tests can assert on the
//! full history without touching real GPIO or a serial link.

use irrigator::app::commands::InboundMessage;
use irrigator::app::events::Report;
use irrigator::app::ports::{
    BusError, DigitalLine, InputPort, OutputPort, SensorError, TelemetryBus,
};
use irrigator::gateway::transport::Transport;
use std::collections::VecDeque;

// ── MockHardware ──────────────────────────────────────────────

/// Raw ADC values that land on a given filtered percentage with the
/// default 670/277 calibration.
pub const RAW_5_PCT: u16 = 650;
pub const RAW_30_PCT: u16 = 550;
pub const RAW_43_PCT: u16 = 500;
pub const RAW_50_PCT: u16 = 472;
pub const RAW_70_PCT: u16 = 392;

pub struct MockHardware {
    pub tank_low_line: bool,
    pub tank_high_line: bool,
    pub button_line: bool,
    pub moisture_raw: u16,
    pub adc_fault: bool,
    pub pump_writes: Vec<bool>,
    pub adc_reads: usize,
}

#[allow(dead_code)]
impl MockHardware {
    /// Tank full enough, button released, probe at 50 %.
    pub fn new() -> Self {
        Self {
            tank_low_line: true,
            tank_high_line: true,
            button_line: true,
            moisture_raw: RAW_50_PCT,
            adc_fault: false,
            pump_writes: Vec::new(),
            adc_reads: 0,
        }
    }

    pub fn pump_on(&self) -> bool {
        self.pump_writes.last().copied().unwrap_or(false)
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl InputPort for MockHardware {
    fn read_line(&mut self, line: DigitalLine) -> Result<bool, SensorError> {
        Ok(match line {
            DigitalLine::TankLow => self.tank_low_line,
            DigitalLine::TankHigh => self.tank_high_line,
            DigitalLine::Button => self.button_line,
        })
    }

    fn read_moisture_raw(&mut self) -> Result<u16, SensorError> {
        self.adc_reads += 1;
        if self.adc_fault {
            Err(SensorError::AdcReadFailed)
        } else {
            Ok(self.moisture_raw)
        }
    }
}

impl OutputPort for MockHardware {
    fn set_pump(&mut self, active: bool) {
        self.pump_writes.push(active);
    }
}

// ── MockBus ───────────────────────────────────────────────────

#[derive(Default)]
pub struct MockBus {
    pub sent: Vec<Report>,
    pub inbox: VecDeque<InboundMessage>,
}

#[allow(dead_code)]
impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, child: u8, value: i32) {
        self.inbox.push_back(InboundMessage { child, value });
    }

    pub fn pump_reports(&self) -> Vec<bool> {
        self.sent
            .iter()
            .filter_map(|r| match r {
                Report::PumpStatus(on) => Some(*on),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.sent.clear();
    }
}

impl TelemetryBus for MockBus {
    fn send(&mut self, report: &Report) -> Result<(), BusError> {
        self.sent.push(*report);
        Ok(())
    }

    fn receive(&mut self) -> Option<InboundMessage> {
        self.inbox.pop_front()
    }
}

// ── LoopbackLink ──────────────────────────────────────────────

/// In-memory serial link: `rx` is what the gateway sends us, `tx`
/// collects every byte we write.
#[derive(Default)]
pub struct LoopbackLink {
    pub rx: VecDeque<u8>,
    pub tx: Vec<u8>,
}

#[allow(dead_code)]
impl LoopbackLink {
    pub fn feed(&mut self, line: &str) {
        self.rx.extend(line.bytes());
    }

    pub fn tx_lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.tx)
            .lines()
            .map(str::to_owned)
            .collect()
    }
}

impl Transport for LoopbackLink {
    type Error = ();

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
        let n = buf.len().min(self.rx.len());
        for slot in buf.iter_mut().take(n) {
            *slot = self.rx.pop_front().unwrap_or_default();
        }
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, ()> {
        self.tx.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), ()> {
        Ok(())
    }
}
