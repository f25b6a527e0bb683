//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter          | Implements          | Connects to                  |
//! |------------------|---------------------|------------------------------|
//! | `hardware`       | InputPort           | GPIO (embedded-hal), ADC1    |
//! |                  | OutputPort          | pump relay                   |
//! | `log_sink`       | TelemetryBus        | Serial log output            |
//! | `nvs`            | StoragePort         | NVS / in-memory store        |
//! |                  | ConfigPort          |                              |
//! | `serial_gateway` | TelemetryBus        | Line protocol over Transport |
//! | `time`           | ClockPort           | ESP32 system timer           |

pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod serial_gateway;
pub mod time;
