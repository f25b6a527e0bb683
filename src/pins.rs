//! Electrical facts about the irrigator board (ESP32).
//!
//! GPIO numbers are not listed here: `esp-idf-hal` hands each pin out as
//! its own type, so `main` binds them directly (`peripherals.pins.gpioN`)
//! and the board wiring is documented next to each binding there.  This
//! module keeps what the drivers need at runtime: relay polarity, the raw
//! ADC channel the sys calls take, and the gateway line rate.

/// Relay pulls in and water flows while the line is held low.
pub const PUMP_ACTIVE_LOW: bool = true;

/// Capacitive soil-moisture probe on ADC1 channel 6 (GPIO 34, input-only).
pub const MOISTURE_ADC_CHANNEL: u32 = 6;

/// Serial gateway line rate, 8N1.
pub const GATEWAY_BAUD: u32 = 115_200;
