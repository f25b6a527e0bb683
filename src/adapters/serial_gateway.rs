//! Serial-gateway telemetry bus.
//!
//! Implements [`TelemetryBus`] over any byte [`Transport`] using the line
//! codec in [`crate::gateway::codec`].  Outbound reports become `set`
//! lines; inbound `set` lines addressed to this node become
//! [`InboundMessage`]s.  Everything else on the wire (other nodes,
//! `req`/internal traffic, garbage) is logged and dropped.

use heapless::Deque;
use log::{debug, info, warn};

use crate::app::commands::InboundMessage;
use crate::app::events::Report;
use crate::app::ports::{BusError, TelemetryBus};
use crate::config::SystemConfig;
use crate::gateway::codec::{Command, GatewayMessage, LineDecoder};
use crate::gateway::presentation::{presentation_messages, report_message};
use crate::gateway::transport::Transport;

/// Bytes pulled from the transport per `receive` call.
const RX_CHUNK: usize = 32;
const RX_QUEUE_DEPTH: usize = 8;

pub struct SerialGatewayBus<T: Transport> {
    transport: T,
    node_id: u8,
    decoder: LineDecoder,
    pending: Deque<InboundMessage, RX_QUEUE_DEPTH>,
}

impl<T: Transport> SerialGatewayBus<T> {
    pub fn new(transport: T, node_id: u8) -> Self {
        Self {
            transport,
            node_id,
            decoder: LineDecoder::new(),
            pending: Deque::new(),
        }
    }

    /// Send sketch info and the per-child presentation table.
    pub fn present(&mut self, config: &SystemConfig) -> Result<(), BusError> {
        for msg in presentation_messages(config) {
            self.write_message(&msg)?;
        }
        info!("gateway: node {} presented", self.node_id);
        Ok(())
    }

    /// Borrow the underlying transport (test inspection, link resets).
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    fn write_message(&mut self, msg: &GatewayMessage) -> Result<(), BusError> {
        let line = msg.encode().map_err(|_| BusError::Overflow)?;
        let mut bytes = line.as_bytes();
        while !bytes.is_empty() {
            match self.transport.write(bytes) {
                Ok(0) | Err(_) => return Err(BusError::TransportFailed),
                Ok(n) => bytes = &bytes[n..],
            }
        }
        self.transport
            .flush()
            .map_err(|_| BusError::TransportFailed)
    }

    fn ingest(&mut self, msg: GatewayMessage) {
        if msg.node != self.node_id {
            debug!("gateway: line for node {} ignored", msg.node);
            return;
        }
        if msg.command != Command::Set {
            debug!("gateway: {:?} for child {} ignored", msg.command, msg.child);
            return;
        }
        match msg.payload_int() {
            Ok(value) => {
                let inbound = InboundMessage {
                    child: msg.child,
                    value,
                };
                if self.pending.push_back(inbound).is_err() {
                    warn!("gateway: rx queue full, dropping command for child {}", msg.child);
                }
            }
            Err(e) => warn!("gateway: child {} payload {:?} ({})", msg.child, msg.payload, e),
        }
    }
}

impl<T: Transport> TelemetryBus for SerialGatewayBus<T> {
    fn send(&mut self, report: &Report) -> Result<(), BusError> {
        self.write_message(&report_message(self.node_id, report))
    }

    fn receive(&mut self) -> Option<InboundMessage> {
        if let Some(msg) = self.pending.pop_front() {
            return Some(msg);
        }

        let mut chunk = [0u8; RX_CHUNK];
        let n = match self.transport.read(&mut chunk) {
            Ok(n) => n,
            Err(e) => {
                warn!("gateway: read failed ({:?})", e);
                return None;
            }
        };
        for &byte in &chunk[..n] {
            match self.decoder.push(byte) {
                Some(Ok(msg)) => self.ingest(msg),
                Some(Err(e)) => warn!("gateway: bad line ({})", e),
                None => {}
            }
        }
        self.pending.pop_front()
    }
}
