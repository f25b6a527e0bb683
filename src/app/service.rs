//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the [`ControlContext`] and runs one non-blocking
//! control pass per call to [`AppService::poll`].  All I/O flows through
//! port traits injected at call sites, making the entire service testable
//! with mock adapters.
//!
//! ```text
//!  InputPort ──▶ ┌────────────────────────────┐ ──▶ TelemetryBus
//!                │         AppService         │ ◀── (commands)
//! OutputPort ◀── │ setpoint · pump · sensors  │ ◀─▶ StoragePort
//!                └────────────────────────────┘
//! ```
//!
//! Pass order:
//!
//! 0. drain inbound commands
//! 1. setpoint persistence
//! 2. dose timeout
//! 3. tank float switches
//! 4. manual button
//! 5. moisture sampling (idle only)
//! 6. periodic report + auto-trigger (idle only)

use log::{debug, info, warn};

use crate::config::SystemConfig;
use crate::drivers::button::ButtonEvent;
use crate::sensors::{TankEvent, TankSwitch};
use crate::timing::Millis;

use super::commands::AppCommand;
use super::context::{BootSample, ControlContext};
use super::events::Report;
use super::ports::{DigitalLine, InputPort, OutputPort, StoragePort, TelemetryBus};
use super::pump::{DoseTrigger, PumpPhase, StartOutcome};

/// Upper bound on inbound commands handled per pass, so a flooded bus
/// cannot starve the dose timer.
pub const MAX_COMMANDS_PER_PASS: usize = 8;

/// Point-in-time view of the controller for status queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerStatus {
    pub phase: PumpPhase,
    pub moisture: u8,
    pub setpoint: u8,
    pub setpoint_pending: bool,
    pub tank_low: bool,
    pub tank_high: Option<bool>,
    pub doses_completed: u32,
    pub last_trigger: Option<DoseTrigger>,
}

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

pub struct AppService {
    ctx: ControlContext,
    pass_count: u64,
}

impl AppService {
    /// Build the service from configuration and the boot-time input sample.
    ///
    /// Does **not** touch storage or the bus; call [`start`](Self::start) next.
    pub fn new(config: SystemConfig, boot: &BootSample, now: Millis) -> Self {
        Self {
            ctx: ControlContext::new(config, boot, now),
            pass_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Restore the setpoint, force the pump off and publish the initial
    /// state of every child.
    pub fn start(
        &mut self,
        hw: &mut impl OutputPort,
        bus: &mut impl TelemetryBus,
        storage: &impl StoragePort,
    ) {
        hw.set_pump(false);
        self.ctx.setpoint.load(storage);

        publish(bus, Report::PumpStatus(false));
        publish(bus, Report::TankLowStatus(self.ctx.tanks.low_switch().reported_status()));
        if let Some(high) = self.ctx.tanks.high_switch() {
            publish(bus, Report::TankHighStatus(high.reported_status()));
        }
        publish(bus, Report::MoistureLevel(self.ctx.moisture.filtered()));
        publish(bus, Report::Setpoint(self.ctx.setpoint.value()));

        info!(
            "AppService started: moisture={}% setpoint={}% tank_low={} dose={}ms",
            self.ctx.moisture.filtered(),
            self.ctx.setpoint.value(),
            self.ctx.tanks.is_low(),
            self.ctx.pump.dose_duration_ms()
        );
    }

    // ── Per-pass orchestration ────────────────────────────────

    /// Run one control pass.
    ///
    /// The `hw` parameter satisfies **both** [`InputPort`] and
    /// [`OutputPort`], which avoids a double mutable borrow while keeping
    /// the port boundary explicit.
    pub fn poll(
        &mut self,
        now: Millis,
        hw: &mut (impl InputPort + OutputPort),
        bus: &mut impl TelemetryBus,
        storage: &mut impl StoragePort,
    ) {
        self.pass_count += 1;

        // 0. Inbound commands
        for _ in 0..MAX_COMMANDS_PER_PASS {
            let Some(msg) = bus.receive() else { break };
            if let Some(cmd) = AppCommand::from_message(&msg) {
                self.handle_command(cmd, now, hw, bus);
            }
        }

        // 1. Setpoint persistence
        if let Some(committed) = self.ctx.setpoint.tick(now, storage) {
            publish(bus, Report::Setpoint(committed));
        }

        // 2. Dose timeout
        if self.ctx.pump.check_timeout(now, hw) {
            publish(bus, Report::PumpStatus(false));
        }

        // 3. Tank float switches
        self.poll_tanks(now, hw, bus);

        // 4. Manual button
        if self.poll_button(now, hw) == Some(ButtonEvent::Pressed) {
            self.start_dose(DoseTrigger::Button, now, hw, bus);
        }

        // 5. Moisture sampling
        if !self.ctx.pump.is_dosing() && self.ctx.moisture.is_due(now) {
            match hw.read_moisture_raw() {
                Ok(raw) => {
                    let pct = self.ctx.moisture.sample_at(raw, now);
                    debug!(
                        "moisture: raw={} now={}% filtered={}%",
                        raw,
                        pct,
                        self.ctx.moisture.filtered()
                    );
                }
                Err(e) => warn!("moisture: sample skipped ({})", e),
            }
        }

        // 6. Periodic report + auto-trigger
        if self.ctx.reporter.tick(now) {
            let moisture = self.ctx.moisture.filtered();
            publish(bus, Report::MoistureLevel(moisture));
            if !self.ctx.pump.is_dosing() && moisture < self.ctx.setpoint.value() {
                self.start_dose(DoseTrigger::Auto, now, hw, bus);
            }
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process one command from the telemetry bus.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        now: Millis,
        hw: &mut impl OutputPort,
        bus: &mut impl TelemetryBus,
    ) {
        match cmd {
            AppCommand::SetPump(true) => {
                self.start_dose(DoseTrigger::Remote, now, hw, bus);
            }
            AppCommand::SetPump(false) => {
                self.ctx.pump.stop(now, hw);
                publish(bus, Report::PumpStatus(false));
            }
            AppCommand::SetSetpoint(requested) => {
                let applied = self.ctx.setpoint.set(requested, now);
                publish(bus, Report::Setpoint(applied));
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn status(&self) -> ControllerStatus {
        ControllerStatus {
            phase: self.ctx.pump.phase(),
            moisture: self.ctx.moisture.filtered(),
            setpoint: self.ctx.setpoint.value(),
            setpoint_pending: self.ctx.setpoint.is_pending(),
            tank_low: self.ctx.tanks.is_low(),
            tank_high: self.ctx.tanks.is_high(),
            doses_completed: self.ctx.pump.doses_completed(),
            last_trigger: self.ctx.pump.last_trigger(),
        }
    }

    pub fn is_dosing(&self) -> bool {
        self.ctx.pump.is_dosing()
    }

    pub fn moisture(&self) -> u8 {
        self.ctx.moisture.filtered()
    }

    pub fn setpoint(&self) -> u8 {
        self.ctx.setpoint.value()
    }

    /// Control passes executed since startup.
    pub fn pass_count(&self) -> u64 {
        self.pass_count
    }

    pub fn config(&self) -> &SystemConfig {
        &self.ctx.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn start_dose(
        &mut self,
        trigger: DoseTrigger,
        now: Millis,
        hw: &mut impl OutputPort,
        bus: &mut impl TelemetryBus,
    ) -> StartOutcome {
        let conditions = self.ctx.dose_conditions();
        let outcome = self.ctx.pump.request_start(trigger, &conditions, now, hw);
        publish(bus, Report::PumpStatus(outcome.is_running()));
        outcome
    }

    fn poll_tanks(&mut self, now: Millis, hw: &mut impl InputPort, bus: &mut impl TelemetryBus) {
        match hw.read_line(DigitalLine::TankLow) {
            Ok(line) => {
                if let Some(ev) = self.ctx.tanks.poll_low(line, now) {
                    report_tank(bus, ev);
                }
            }
            Err(e) => warn!("tank: low switch read failed ({})", e),
        }

        if self.ctx.tanks.has_high_switch() {
            match hw.read_line(DigitalLine::TankHigh) {
                Ok(line) => {
                    if let Some(ev) = self.ctx.tanks.poll_high(line, now) {
                        report_tank(bus, ev);
                    }
                }
                Err(e) => warn!("tank: high switch read failed ({})", e),
            }
        }
    }

    fn poll_button(&mut self, now: Millis, hw: &mut impl InputPort) -> Option<ButtonEvent> {
        let button = self.ctx.button.as_mut()?;
        match hw.read_line(DigitalLine::Button) {
            Ok(line) => button.tick(line, now),
            Err(e) => {
                warn!("button: read failed ({})", e);
                None
            }
        }
    }
}

fn report_tank(bus: &mut impl TelemetryBus, ev: TankEvent) {
    info!("tank: {:?} switch line_high={}", ev.switch, ev.line_high);
    let report = match ev.switch {
        TankSwitch::Low => Report::TankLowStatus(ev.reported_status()),
        TankSwitch::High => Report::TankHighStatus(ev.reported_status()),
    };
    publish(bus, report);
}

/// Best-effort send: a dropped report is logged, never retried.
fn publish(bus: &mut impl TelemetryBus, report: Report) {
    if let Err(e) = bus.send(&report) {
        warn!("bus: {:?} not sent ({})", report, e);
    }
}
