//! Integration tests for the AppService control loop.
//!
//! Each test boots the service against [`MockHardware`], a recording
//! [`MockBus`] and the host NVS simulation, then drives `poll` with an
//! explicit clock.

use crate::mock_hw::{
    MockBus, MockHardware, RAW_5_PCT, RAW_30_PCT, RAW_43_PCT, RAW_50_PCT, RAW_70_PCT,
};

use irrigator::adapters::nvs::NvsAdapter;
use irrigator::app::context::BootSample;
use irrigator::app::events::Report;
use irrigator::app::ports::StoragePort;
use irrigator::app::pump::{DoseTrigger, PumpPhase};
use irrigator::app::service::AppService;
use irrigator::app::setpoint::{SETPOINT_KEY, SETPOINT_NAMESPACE};
use irrigator::config::SystemConfig;
use irrigator::timing::Millis;

const DOSE_MS: u32 = 9_500;
const REPORT_MS: u32 = 300_000;

struct Rig {
    app: AppService,
    hw: MockHardware,
    bus: MockBus,
    nvs: NvsAdapter,
}

impl Rig {
    fn boot(config: SystemConfig, hw: MockHardware, nvs: NvsAdapter) -> Self {
        let mut hw = hw;
        let mut bus = MockBus::new();
        let boot = BootSample::read(&mut hw, &config);
        let mut app = AppService::new(config, &boot, 0);
        app.start(&mut hw, &mut bus, &nvs);
        Self { app, hw, bus, nvs }
    }

    fn with_setpoint(setpoint: u8, hw: MockHardware) -> Self {
        let config = SystemConfig {
            default_setpoint: setpoint,
            ..SystemConfig::default()
        };
        Self::boot(config, hw, NvsAdapter::new().unwrap())
    }

    fn poll(&mut self, now: Millis) {
        self.app
            .poll(now, &mut self.hw, &mut self.bus, &mut self.nvs);
    }

    /// Poll every `step` ms over `(from, to]`.
    fn run(&mut self, from: Millis, to: Millis, step: u32) {
        let mut t = from;
        while t < to {
            t = (t + step).min(to);
            self.poll(t);
        }
    }

    fn stored_setpoint(&self) -> Option<i16> {
        let mut buf = [0u8; 2];
        match self.nvs.read(SETPOINT_NAMESPACE, SETPOINT_KEY, &mut buf) {
            Ok(2) => Some(i16::from_le_bytes(buf)),
            _ => None,
        }
    }
}

fn hw_at(raw: u16) -> MockHardware {
    MockHardware {
        moisture_raw: raw,
        ..MockHardware::new()
    }
}

// ── Auto irrigation ───────────────────────────────────────────

#[test]
fn dry_soil_auto_doses_then_stops_after_duration() {
    let mut rig = Rig::with_setpoint(65, hw_at(RAW_50_PCT));
    assert_eq!(rig.app.moisture(), 50);
    rig.bus.clear();

    rig.run(0, REPORT_MS, 100);
    assert!(!rig.app.is_dosing(), "no check before the report interval");
    rig.poll(REPORT_MS + 1);

    assert!(rig.app.is_dosing());
    assert!(rig.hw.pump_on());
    assert_eq!(
        rig.bus.sent,
        vec![Report::MoistureLevel(50), Report::PumpStatus(true)]
    );
    let start = REPORT_MS + 1;

    rig.poll(start + DOSE_MS - 1);
    assert!(rig.hw.pump_on(), "still dosing 1 ms before the end");

    rig.poll(start + DOSE_MS);
    assert!(!rig.hw.pump_on());
    assert!(!rig.app.is_dosing());
    assert_eq!(rig.bus.pump_reports(), vec![true, false]);

    let status = rig.app.status();
    assert_eq!(status.doses_completed, 1);
    assert_eq!(status.last_trigger, Some(DoseTrigger::Auto));
}

#[test]
fn wet_soil_never_starts_pump() {
    let mut rig = Rig::with_setpoint(65, hw_at(RAW_70_PCT));
    assert_eq!(rig.app.moisture(), 70);
    rig.bus.clear();

    rig.run(0, 2 * REPORT_MS + 1_000, 500);

    assert!(rig.hw.pump_writes.iter().all(|on| !on));
    assert!(rig.bus.pump_reports().is_empty());
    let levels: Vec<_> = rig
        .bus
        .sent
        .iter()
        .filter(|r| matches!(r, Report::MoistureLevel(_)))
        .collect();
    assert_eq!(levels.len(), 2, "one moisture report per interval");
}

#[test]
fn auto_check_with_low_tank_reports_pump_off() {
    let hw = MockHardware {
        tank_low_line: false,
        moisture_raw: RAW_30_PCT,
        ..MockHardware::new()
    };
    let mut rig = Rig::with_setpoint(60, hw);
    rig.bus.clear();

    rig.poll(REPORT_MS + 1);

    assert!(!rig.app.is_dosing());
    assert!(!rig.hw.pump_on());
    assert_eq!(
        rig.bus.sent,
        vec![Report::MoistureLevel(30), Report::PumpStatus(false)]
    );
}

#[test]
fn auto_check_below_probe_floor_reports_pump_off() {
    let mut rig = Rig::with_setpoint(60, hw_at(RAW_5_PCT));
    rig.bus.clear();

    rig.poll(REPORT_MS + 1);

    assert!(!rig.app.is_dosing());
    assert!(!rig.hw.pump_on());
    assert_eq!(
        rig.bus.sent,
        vec![Report::MoistureLevel(5), Report::PumpStatus(false)]
    );
}

#[test]
fn moisture_report_is_sent_even_while_dosing() {
    let config = SystemConfig {
        report_interval_ms: 60_000,
        ..SystemConfig::default()
    };
    let mut rig = Rig::boot(config, hw_at(RAW_50_PCT), NvsAdapter::new().unwrap());
    rig.bus.push(1, 1);
    rig.poll(55_000);
    assert!(rig.app.is_dosing());
    rig.bus.clear();

    rig.poll(60_001);
    assert_eq!(rig.bus.sent, vec![Report::MoistureLevel(50)]);
    assert!(rig.app.is_dosing(), "auto-check skipped, dose untouched");
}

// ── Manual button ─────────────────────────────────────────────

#[test]
fn button_press_with_low_tank_is_rejected_and_reported_off() {
    let hw = MockHardware {
        tank_low_line: false,
        moisture_raw: RAW_30_PCT,
        ..MockHardware::new()
    };
    let mut rig = Rig::with_setpoint(60, hw);
    assert_eq!(
        rig.bus.sent[1],
        Report::TankLowStatus(true),
        "low line reported inverted"
    );
    rig.bus.clear();

    rig.hw.button_line = false;
    rig.poll(100);
    rig.poll(110);

    assert!(!rig.app.is_dosing());
    assert!(!rig.hw.pump_on());
    assert_eq!(rig.bus.sent, vec![Report::PumpStatus(false)]);
}

#[test]
fn button_press_starts_dose_and_hold_does_not_repeat() {
    let mut rig = Rig::with_setpoint(60, hw_at(RAW_30_PCT));
    rig.bus.clear();

    rig.hw.button_line = false;
    rig.poll(100);
    rig.poll(110);
    assert!(rig.app.is_dosing());
    assert_eq!(rig.app.status().last_trigger, Some(DoseTrigger::Button));

    rig.run(110, 3_000, 50);
    assert_eq!(rig.bus.pump_reports(), vec![true]);
}

// ── Remote commands ───────────────────────────────────────────

#[test]
fn remote_setpoint_is_clamped_and_persisted_after_quiet_period() {
    let mut rig = Rig::with_setpoint(60, MockHardware::new());
    rig.bus.clear();

    rig.bus.push(5, 150);
    rig.poll(1_000);
    assert_eq!(rig.app.setpoint(), 80);
    assert_eq!(rig.bus.sent, vec![Report::Setpoint(80)]);
    assert!(rig.app.status().setpoint_pending);

    rig.poll(10_999);
    assert_eq!(rig.stored_setpoint(), None);

    rig.poll(11_000);
    assert_eq!(rig.stored_setpoint(), Some(80));
    assert!(!rig.app.status().setpoint_pending);
    assert_eq!(
        rig.bus.sent,
        vec![Report::Setpoint(80), Report::Setpoint(80)],
        "commit re-reports the setpoint"
    );
}

#[test]
fn remote_setpoint_below_floor_is_raised() {
    let mut rig = Rig::with_setpoint(60, MockHardware::new());
    rig.bus.push(5, -20);
    rig.poll(10);
    assert_eq!(rig.app.setpoint(), 10);
}

#[test]
fn burst_of_setpoint_changes_writes_once() {
    let mut rig = Rig::with_setpoint(60, MockHardware::new());
    let writes_before = rig.nvs.write_count();

    for (t, v) in [(1_000, 20), (2_000, 30), (3_000, 40)] {
        rig.bus.push(5, v);
        rig.poll(t);
    }
    rig.run(3_000, 12_999, 100);
    assert_eq!(rig.nvs.write_count(), writes_before);

    rig.run(12_999, 40_000, 100);
    assert_eq!(rig.nvs.write_count(), writes_before + 1);
    assert_eq!(rig.stored_setpoint(), Some(40));
}

#[test]
fn remote_off_cuts_dose_short() {
    let mut rig = Rig::with_setpoint(60, hw_at(RAW_50_PCT));
    rig.bus.clear();

    rig.bus.push(1, 1);
    rig.poll(1_000);
    assert!(rig.app.is_dosing());

    rig.bus.push(1, 0);
    rig.poll(4_000);
    assert!(!rig.app.is_dosing());
    assert!(!rig.hw.pump_on());

    rig.run(4_000, 1_000 + DOSE_MS + 500, 100);
    assert_eq!(rig.bus.pump_reports(), vec![true, false]);
    assert_eq!(rig.app.status().doses_completed, 0);
}

#[test]
fn remote_off_while_idle_still_reports() {
    let mut rig = Rig::with_setpoint(60, MockHardware::new());
    rig.bus.clear();
    rig.bus.push(1, 0);
    rig.poll(10);
    assert_eq!(rig.bus.sent, vec![Report::PumpStatus(false)]);
    assert_eq!(rig.hw.pump_writes.last(), Some(&false));
}

#[test]
fn repeated_on_re_reports_without_extending_dose() {
    let mut rig = Rig::with_setpoint(60, hw_at(RAW_50_PCT));
    rig.bus.clear();

    rig.bus.push(1, 1);
    rig.poll(1_000);
    rig.bus.push(1, 1);
    rig.poll(6_000);
    assert_eq!(rig.bus.pump_reports(), vec![true, true]);

    rig.poll(1_000 + DOSE_MS);
    assert!(!rig.app.is_dosing(), "timer runs from the first start");
}

#[test]
fn commands_for_unknown_children_are_ignored() {
    let mut rig = Rig::with_setpoint(60, MockHardware::new());
    rig.bus.clear();
    rig.bus.push(2, 1);
    rig.bus.push(4, 99);
    rig.bus.push(42, 1);
    rig.poll(10);
    assert!(rig.bus.sent.is_empty());
    assert!(!rig.app.is_dosing());
}

// ── Persistence at boot ───────────────────────────────────────

#[test]
fn persisted_setpoint_is_restored_at_boot() {
    let mut nvs = NvsAdapter::new().unwrap();
    nvs.write(SETPOINT_NAMESPACE, SETPOINT_KEY, &35i16.to_le_bytes())
        .unwrap();
    let rig = Rig::boot(SystemConfig::default(), MockHardware::new(), nvs);
    assert_eq!(rig.app.setpoint(), 35);
    assert_eq!(rig.bus.sent.last(), Some(&Report::Setpoint(35)));
}

#[test]
fn corrupt_persisted_setpoint_falls_back_to_default() {
    for bad in [vec![0xFF], vec![1, 2, 3], (-5i16).to_le_bytes().to_vec()] {
        let mut nvs = NvsAdapter::new().unwrap();
        nvs.write(SETPOINT_NAMESPACE, SETPOINT_KEY, &bad).unwrap();
        let rig = Rig::boot(SystemConfig::default(), MockHardware::new(), nvs);
        assert_eq!(rig.app.setpoint(), 60, "stored bytes {:?}", bad);
    }
}

// ── Inputs ────────────────────────────────────────────────────

#[test]
fn tank_glitch_is_ignored_and_sustained_change_reported_once() {
    let mut rig = Rig::with_setpoint(60, MockHardware::new());
    rig.bus.clear();

    rig.hw.tank_low_line = false;
    rig.poll(100);
    rig.hw.tank_low_line = true;
    rig.poll(105);
    rig.poll(200);
    assert!(rig.bus.sent.is_empty());
    assert!(!rig.app.status().tank_low);

    rig.hw.tank_low_line = false;
    rig.run(300, 400, 5);
    assert_eq!(rig.bus.sent, vec![Report::TankLowStatus(true)]);
    assert!(rig.app.status().tank_low);
}

#[test]
fn tank_going_low_blocks_remote_start() {
    let mut rig = Rig::with_setpoint(60, hw_at(RAW_43_PCT));
    rig.hw.tank_low_line = false;
    rig.run(0, 100, 5);
    rig.bus.clear();

    rig.bus.push(1, 1);
    rig.poll(200);
    assert!(!rig.app.is_dosing());
    assert_eq!(rig.bus.sent, vec![Report::PumpStatus(false)]);
}

#[test]
fn upper_float_is_reported_when_fitted() {
    let config = SystemConfig {
        tank_high_present: true,
        ..SystemConfig::default()
    };
    let hw = MockHardware {
        tank_high_line: false,
        ..MockHardware::new()
    };
    let mut rig = Rig::boot(config, hw, NvsAdapter::new().unwrap());
    assert_eq!(rig.bus.sent[2], Report::TankHighStatus(true));
    assert_eq!(rig.app.status().tank_high, Some(true), "switch closed");
    rig.bus.clear();

    rig.hw.tank_high_line = true;
    rig.run(0, 50, 5);
    assert_eq!(rig.bus.sent, vec![Report::TankHighStatus(false)]);
    assert_eq!(rig.app.status().tank_high, Some(false));
}

#[test]
fn moisture_is_not_sampled_while_dosing() {
    let mut rig = Rig::with_setpoint(60, hw_at(RAW_50_PCT));
    rig.bus.push(1, 1);
    rig.poll(500);
    assert!(rig.app.is_dosing());
    let reads = rig.hw.adc_reads;

    rig.hw.moisture_raw = RAW_70_PCT;
    rig.run(500, 500 + DOSE_MS - 1, 100);
    assert_eq!(rig.hw.adc_reads, reads);
    assert_eq!(rig.app.moisture(), 50);

    rig.run(500 + DOSE_MS - 1, 500 + DOSE_MS + 2_000, 100);
    assert!(rig.hw.adc_reads > reads);
    assert!(rig.app.moisture() > 50);
}

#[test]
fn filter_tracks_slowly_toward_new_level() {
    let mut rig = Rig::with_setpoint(60, hw_at(RAW_50_PCT));
    rig.hw.moisture_raw = RAW_70_PCT;
    rig.poll(1_001);
    assert_eq!(rig.app.moisture(), 51, "(50*10 + 70) / 11");
}

#[test]
fn failed_moisture_sample_keeps_previous_value() {
    let mut rig = Rig::with_setpoint(60, hw_at(RAW_50_PCT));
    rig.hw.adc_fault = true;
    rig.run(0, 5_000, 100);
    assert_eq!(rig.app.moisture(), 50);
}

#[test]
fn boot_adc_failure_holds_pump_interlocked() {
    let hw = MockHardware {
        adc_fault: true,
        ..MockHardware::new()
    };
    let mut rig = Rig::with_setpoint(60, hw);
    assert_eq!(rig.app.moisture(), 0);

    rig.bus.push(1, 1);
    rig.poll(10);
    assert!(!rig.app.is_dosing());
}

#[test]
fn dry_probe_floor_blocks_dose() {
    let mut rig = Rig::with_setpoint(60, hw_at(RAW_5_PCT));
    rig.bus.clear();
    rig.bus.push(1, 1);
    rig.poll(10);
    assert_eq!(rig.app.status().phase, PumpPhase::Idle);
    assert_eq!(rig.bus.sent, vec![Report::PumpStatus(false)]);
}

#[test]
fn dose_timer_survives_clock_wrap() {
    let mut rig = Rig::with_setpoint(60, hw_at(RAW_50_PCT));
    let start = u32::MAX - 2_000;
    rig.bus.push(1, 1);
    rig.poll(start);
    assert!(rig.app.is_dosing());

    rig.poll(start.wrapping_add(DOSE_MS - 1));
    assert!(rig.app.is_dosing());
    rig.poll(start.wrapping_add(DOSE_MS));
    assert!(!rig.app.is_dosing());
}
