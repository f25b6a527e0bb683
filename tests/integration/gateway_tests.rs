//! End-to-end tests over the serial gateway line protocol.
//!
//! The service runs against a [`SerialGatewayBus`] on an in-memory
//! [`LoopbackLink`], so every report and command passes through the real
//! codec.

use crate::mock_hw::{LoopbackLink, MockHardware, RAW_50_PCT};

use irrigator::adapters::nvs::NvsAdapter;
use irrigator::adapters::serial_gateway::SerialGatewayBus;
use irrigator::app::context::BootSample;
use irrigator::app::service::AppService;
use irrigator::config::SystemConfig;

fn boot(config: &SystemConfig) -> (AppService, MockHardware, SerialGatewayBus<LoopbackLink>, NvsAdapter) {
    let mut hw = MockHardware {
        moisture_raw: RAW_50_PCT,
        ..MockHardware::new()
    };
    let nvs = NvsAdapter::new().unwrap();
    let mut bus = SerialGatewayBus::new(LoopbackLink::default(), config.node_id);
    bus.present(config).unwrap();

    let sample = BootSample::read(&mut hw, config);
    let mut app = AppService::new(config.clone(), &sample, 0);
    app.start(&mut hw, &mut bus, &nvs);
    (app, hw, bus, nvs)
}

#[test]
fn boot_presents_node_then_reports_every_child() {
    let config = SystemConfig::default();
    let (_app, _hw, mut bus, _nvs) = boot(&config);

    let lines = bus.transport_mut().tx_lines();
    assert_eq!(
        lines,
        vec![
            "1;255;3;0;11;AS-Gardner",
            "1;255;3;0;12;1.2",
            "1;1;0;0;3;R01.BO1",
            "1;2;0;0;3;R01.BI1L",
            "1;4;0;0;35;R01.AI1",
            "1;5;0;0;4;R01.AO1",
            "1;1;1;0;2;0",
            "1;2;1;0;2;0",
            "1;4;1;0;37;50",
            "1;5;1;0;3;60",
        ]
    );
}

#[test]
fn upper_float_is_presented_when_fitted() {
    let config = SystemConfig {
        node_id: 7,
        tank_high_present: true,
        ..SystemConfig::default()
    };
    let (_app, _hw, mut bus, _nvs) = boot(&config);
    let lines = bus.transport_mut().tx_lines();
    assert!(lines.contains(&"7;3;0;0;3;R07.BI1H".to_owned()));
    assert!(lines.contains(&"7;3;1;0;2;0".to_owned()));
}

#[test]
fn remote_pump_command_round_trips_over_the_wire() {
    let config = SystemConfig::default();
    let (mut app, mut hw, mut bus, mut nvs) = boot(&config);
    bus.transport_mut().tx.clear();

    bus.transport_mut().feed("1;1;1;0;2;1\n");
    app.poll(100, &mut hw, &mut bus, &mut nvs);
    assert!(app.is_dosing());
    assert_eq!(bus.transport_mut().tx_lines(), vec!["1;1;1;0;2;1"]);

    bus.transport_mut().feed("1;1;1;0;2;0\n");
    app.poll(200, &mut hw, &mut bus, &mut nvs);
    assert!(!app.is_dosing());
    assert_eq!(
        bus.transport_mut().tx_lines(),
        vec!["1;1;1;0;2;1", "1;1;1;0;2;0"]
    );
}

#[test]
fn setpoint_command_is_clamped_and_echoed() {
    let config = SystemConfig::default();
    let (mut app, mut hw, mut bus, mut nvs) = boot(&config);
    bus.transport_mut().tx.clear();

    bus.transport_mut().feed("1;5;1;0;3;150\n");
    app.poll(100, &mut hw, &mut bus, &mut nvs);
    assert_eq!(app.setpoint(), 80);
    assert_eq!(bus.transport_mut().tx_lines(), vec!["1;5;1;0;3;80"]);
}

#[test]
fn foreign_and_malformed_lines_are_dropped() {
    let config = SystemConfig::default();
    let (mut app, mut hw, mut bus, mut nvs) = boot(&config);
    bus.transport_mut().tx.clear();

    bus.transport_mut().feed("2;1;1;0;2;1\n");
    bus.transport_mut().feed("1;1;2;0;2;\n");
    bus.transport_mut().feed("garbage\n");
    bus.transport_mut().feed("1;5;1;0;3;wet\n");
    for t in [100, 200, 300] {
        app.poll(t, &mut hw, &mut bus, &mut nvs);
    }

    assert!(!app.is_dosing());
    assert_eq!(app.setpoint(), 60);
    assert!(bus.transport_mut().tx.is_empty());
}

#[test]
fn command_split_across_reads_is_reassembled() {
    let config = SystemConfig::default();
    let (mut app, mut hw, mut bus, mut nvs) = boot(&config);

    bus.transport_mut().feed("1;5;1;");
    app.poll(100, &mut hw, &mut bus, &mut nvs);
    assert_eq!(app.setpoint(), 60);

    bus.transport_mut().feed("0;3;25\n");
    app.poll(200, &mut hw, &mut bus, &mut nvs);
    assert_eq!(app.setpoint(), 25);
}
