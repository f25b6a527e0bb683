//! Irrigator firmware: main entry point.
//!
//! Single-threaded cooperative loop; every pass is non-blocking.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter    SerialGatewayBus   NvsAdapter  Esp32Time   │
//! │  (Input+Output)     (TelemetryBus)     (Storage)   (Clock)     │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Setpoint · Pump interlock · Moisture filter           │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{AnyIOPin, IOPin, PinDriver, Pull};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::uart::{self, UartDriver};
use esp_idf_hal::units::Hertz;
use log::{error, info, warn};

use irrigator::adapters::hardware::HardwareAdapter;
use irrigator::adapters::log_sink::LogTelemetryBus;
use irrigator::adapters::nvs::NvsAdapter;
use irrigator::adapters::serial_gateway::SerialGatewayBus;
use irrigator::adapters::time::Esp32TimeAdapter;
use irrigator::app::context::BootSample;
use irrigator::app::ports::{ClockPort, ConfigPort, InputPort, OutputPort, StoragePort, TelemetryBus};
use irrigator::app::service::AppService;
use irrigator::config::SystemConfig;
use irrigator::drivers::pump::PumpDriver;
use irrigator::drivers::watchdog::{Watchdog, WATCHDOG_TIMEOUT_MS};
use irrigator::gateway::transport::UartTransport;
use irrigator::{drivers, pins};

/// Pause between control passes.  Well below the debounce window so a
/// sustained edge is confirmed on the first poll after the window.
const LOOP_PERIOD_MS: u32 = 5;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Irrigator v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let peripherals = Peripherals::take()?;

    // ── 2. Pump relay first, so it is released before anything else ──
    // GPIO25 drives the relay coil.
    let relay = PinDriver::output(peripherals.pins.gpio25)?;
    let pump = PumpDriver::new(relay, pins::PUMP_ACTIVE_LOW)?;

    if let Err(e) = drivers::hw_init::init_adc() {
        // Without the probe the filter seeds at 0 % and dosing stays interlocked.
        error!("ADC init failed: {}", e);
    }

    // ── 3. Storage + configuration ────────────────────────────
    let mut nvs = NvsAdapter::new()?;
    let config = match nvs.load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("Config override rejected ({}), using defaults", e);
            SystemConfig::default()
        }
    };
    info!(
        "Config: node={} setpoint bounds {}–{}% dose={}ms report={}ms",
        config.node_id,
        config.moisture_low_limit,
        config.moisture_hi_limit,
        config.dose_duration_ms(),
        config.report_interval_ms
    );

    // ── 4. Digital inputs (pulled up, switches close to ground) ──
    let input = |pin: AnyIOPin| -> Result<PinDriver<'static, AnyIOPin, esp_idf_hal::gpio::Input>> {
        let mut driver = PinDriver::input(pin)?;
        driver.set_pull(Pull::Up)?;
        Ok(driver)
    };
    // GPIO26: lower float, low = water below the float.
    let tank_low = input(peripherals.pins.gpio26.downgrade())?;
    // GPIO27: upper float, fitted on some boards only.
    let tank_high = if config.tank_high_present {
        Some(input(peripherals.pins.gpio27.downgrade())?)
    } else {
        None
    };
    // GPIO14: manual dose push-button.
    let button = if config.button_present {
        Some(input(peripherals.pins.gpio14.downgrade())?)
    } else {
        None
    };
    let mut hw = HardwareAdapter::new(tank_low, tank_high, button, pump);

    // ── 5. Application core ───────────────────────────────────
    let clock = Esp32TimeAdapter::new();
    let boot = BootSample::read(&mut hw, &config);
    let mut app = AppService::new(config.clone(), &boot, clock.now_ms());
    let mut watchdog = Watchdog::new(WATCHDOG_TIMEOUT_MS);

    // ── 6. Telemetry bus ──────────────────────────────────────
    let uart_cfg = uart::config::Config::default().baudrate(Hertz(pins::GATEWAY_BAUD));
    // UART1: TX on GPIO17, RX on GPIO16.
    let uart = UartDriver::new(
        peripherals.uart1,
        peripherals.pins.gpio17,
        peripherals.pins.gpio16,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &uart_cfg,
    );

    match uart {
        Ok(uart) => {
            let mut bus = SerialGatewayBus::new(UartTransport::new(uart), config.node_id);
            if let Err(e) = bus.present(&config) {
                warn!("Gateway presentation failed ({}), continuing", e);
            }
            app.start(&mut hw, &mut bus, &nvs);
            run(&mut app, &mut hw, &mut bus, &mut nvs, &clock, &mut watchdog)
        }
        Err(e) => {
            warn!("Gateway UART unavailable ({}), reporting to log only", e);
            let mut bus = LogTelemetryBus::new();
            app.start(&mut hw, &mut bus, &nvs);
            run(&mut app, &mut hw, &mut bus, &mut nvs, &clock, &mut watchdog)
        }
    }
}

/// The control loop.  Never returns.
fn run(
    app: &mut AppService,
    hw: &mut (impl InputPort + OutputPort),
    bus: &mut impl TelemetryBus,
    storage: &mut impl StoragePort,
    clock: &impl ClockPort,
    watchdog: &mut Watchdog,
) -> ! {
    info!("System ready. Entering control loop.");
    loop {
        app.poll(clock.now_ms(), hw, bus, storage);
        watchdog.feed();
        FreeRtos::delay_ms(LOOP_PERIOD_MS);
    }
}
