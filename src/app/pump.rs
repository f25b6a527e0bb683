//! Dose state machine.
//!
//! ```text
//!            request_start ── interlock ok ──▶ ┌─────────┐
//!  ┌──────┐                                    │ Dosing  │
//!  │ Idle │ ◀── timeout (dose duration) ────── │ {start} │
//!  └──────┘ ◀── stop ──────────────────────── └─────────┘
//! ```
//!
//! The interlock gates only the `Idle → Dosing` edge.  Once a dose has
//! started it runs for the full dose duration unless explicitly stopped;
//! stopping is never gated.

use core::fmt;

use log::{info, warn};

use super::ports::OutputPort;
use crate::safety::{DoseConditions, Interlock, InterlockFaults};
use crate::timing::{Millis, elapsed_ms, has_elapsed};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpPhase {
    Idle,
    Dosing { start_ms: Millis },
}

/// What asked for the dose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoseTrigger {
    Button,
    Remote,
    Auto,
}

impl fmt::Display for DoseTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Button => write!(f, "button"),
            Self::Remote => write!(f, "remote"),
            Self::Auto => write!(f, "auto"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// Output driven active, dose timer armed.
    Started,
    /// A dose is already running; its start time is left alone.
    AlreadyDosing,
    /// Interlock refused the dose.
    Rejected(InterlockFaults),
}

impl StartOutcome {
    /// Whether the pump is running after the request.
    pub fn is_running(self) -> bool {
        !matches!(self, Self::Rejected(_))
    }
}

pub struct PumpController {
    phase: PumpPhase,
    interlock: Interlock,
    dose_ms: u32,
    doses_completed: u32,
    last_trigger: Option<DoseTrigger>,
}

impl PumpController {
    pub fn new(interlock: Interlock, dose_ms: u32) -> Self {
        Self {
            phase: PumpPhase::Idle,
            interlock,
            dose_ms,
            doses_completed: 0,
            last_trigger: None,
        }
    }

    /// Try to begin a dose.
    pub fn request_start(
        &mut self,
        trigger: DoseTrigger,
        conditions: &DoseConditions,
        now: Millis,
        out: &mut impl OutputPort,
    ) -> StartOutcome {
        if self.is_dosing() {
            return StartOutcome::AlreadyDosing;
        }

        let faults = self.interlock.evaluate(conditions);
        if !faults.is_clear() {
            warn!(
                "pump: {} dose rejected ({}) moisture={}% setpoint={}%",
                trigger, faults, conditions.moisture, conditions.setpoint
            );
            return StartOutcome::Rejected(faults);
        }

        out.set_pump(true);
        self.phase = PumpPhase::Dosing { start_ms: now };
        self.last_trigger = Some(trigger);
        info!(
            "pump: {} dose started ({} ms) moisture={}%",
            trigger, self.dose_ms, conditions.moisture
        );
        StartOutcome::Started
    }

    /// Drive the output inactive.  Returns `true` if a dose was cut short.
    pub fn stop(&mut self, now: Millis, out: &mut impl OutputPort) -> bool {
        out.set_pump(false);
        match self.phase {
            PumpPhase::Dosing { start_ms } => {
                info!("pump: stopped after {} ms", elapsed_ms(now, start_ms));
                self.phase = PumpPhase::Idle;
                true
            }
            PumpPhase::Idle => false,
        }
    }

    /// End the dose once its duration has elapsed.  Returns `true` on the
    /// pass that ends it.
    pub fn check_timeout(&mut self, now: Millis, out: &mut impl OutputPort) -> bool {
        let PumpPhase::Dosing { start_ms } = self.phase else {
            return false;
        };
        if !has_elapsed(now, start_ms, self.dose_ms) {
            return false;
        }
        out.set_pump(false);
        self.phase = PumpPhase::Idle;
        self.doses_completed = self.doses_completed.wrapping_add(1);
        info!("pump: dose complete (#{})", self.doses_completed);
        true
    }

    pub fn phase(&self) -> PumpPhase {
        self.phase
    }

    pub fn is_dosing(&self) -> bool {
        matches!(self.phase, PumpPhase::Dosing { .. })
    }

    /// Doses that ran their full duration since boot.
    pub fn doses_completed(&self) -> u32 {
        self.doses_completed
    }

    pub fn last_trigger(&self) -> Option<DoseTrigger> {
        self.last_trigger
    }

    pub fn dose_duration_ms(&self) -> u32 {
        self.dose_ms
    }
}
