//! Serial gateway protocol: byte transport, line codec, node presentation.
//!
//! The telemetry bus adapter ([`crate::adapters::serial_gateway`]) glues
//! these to the [`TelemetryBus`](crate::app::ports::TelemetryBus) port.

pub mod codec;
pub mod presentation;
pub mod transport;

pub use codec::{CodecError, Command, GatewayMessage, LineDecoder};
pub use transport::Transport;
