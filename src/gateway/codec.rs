//! Serial-gateway line codec.
//!
//! Wire format (one ASCII line per message):
//! ```text
//! node;child;command;ack;type;payload\n
//!  │     │      │     │    │     └── up to 25 bytes, free text / integer
//!  │     │      │     │    └──────── value / presentation / internal type
//!  │     │      │     └───────────── 0 | 1
//!  │     │      └─────────────────── 0 presentation, 1 set, 2 req, 3 internal
//!  │     └────────────────────────── child id (255 = the node itself)
//!  └──────────────────────────────── node id
//! ```
//!
//! [`LineDecoder`] accumulates bytes and yields one parsed message per
//! newline.  Partial reads are fine; a line longer than the buffer is
//! dropped whole and reported once as [`CodecError::LineTooLong`].

use core::fmt::{self, Write as _};

use heapless::{String, Vec};

/// Longest accepted line, newline excluded.
pub const MAX_LINE: usize = 64;
/// Longest payload field.
pub const MAX_PAYLOAD: usize = 25;
/// Child id addressing the node itself (sketch info).
pub const NODE_SENSOR_ID: u8 = 255;

/// Presentation types (`command = 0`).
pub const S_BINARY: u8 = 3;
pub const S_DIMMER: u8 = 4;
pub const S_MOISTURE: u8 = 35;

/// Value types (`command = 1`).
pub const V_STATUS: u8 = 2;
pub const V_PERCENTAGE: u8 = 3;
pub const V_LEVEL: u8 = 37;

/// Internal types (`command = 3`).
pub const I_SKETCH_NAME: u8 = 11;
pub const I_SKETCH_VERSION: u8 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    Presentation = 0,
    Set = 1,
    Req = 2,
    Internal = 3,
    Stream = 4,
}

impl Command {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Presentation),
            1 => Some(Self::Set),
            2 => Some(Self::Req),
            3 => Some(Self::Internal),
            4 => Some(Self::Stream),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// Fewer than six `;`-separated fields.
    FieldCount,
    /// A header field is not a valid number.
    BadNumber,
    UnknownCommand(u8),
    PayloadTooLong,
    LineTooLong,
    NotUtf8,
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldCount => write!(f, "expected 6 fields"),
            Self::BadNumber => write!(f, "malformed numeric field"),
            Self::UnknownCommand(c) => write!(f, "unknown command {}", c),
            Self::PayloadTooLong => write!(f, "payload exceeds {} bytes", MAX_PAYLOAD),
            Self::LineTooLong => write!(f, "line exceeds {} bytes", MAX_LINE),
            Self::NotUtf8 => write!(f, "line is not valid UTF-8"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayMessage {
    pub node: u8,
    pub child: u8,
    pub command: Command,
    pub ack: bool,
    pub msg_type: u8,
    pub payload: String<MAX_PAYLOAD>,
}

impl GatewayMessage {
    pub fn new(
        node: u8,
        child: u8,
        command: Command,
        msg_type: u8,
        payload: &str,
    ) -> Result<Self, CodecError> {
        let mut p = String::new();
        p.push_str(payload).map_err(|()| CodecError::PayloadTooLong)?;
        Ok(Self {
            node,
            child,
            command,
            ack: false,
            msg_type,
            payload: p,
        })
    }

    /// A `set` message carrying an integer payload.
    pub fn set_int(node: u8, child: u8, msg_type: u8, value: i32) -> Self {
        let mut payload = String::new();
        // An i32 is at most 11 characters, well inside MAX_PAYLOAD.
        let _ = write!(payload, "{}", value);
        Self {
            node,
            child,
            command: Command::Set,
            ack: false,
            msg_type,
            payload,
        }
    }

    /// Parse one line (without its newline).
    pub fn parse(line: &str) -> Result<Self, CodecError> {
        let line = line.trim_end_matches(['\r', '\n']);
        let mut fields = line.splitn(6, ';');
        let mut next_u8 = || -> Result<u8, CodecError> {
            fields
                .next()
                .ok_or(CodecError::FieldCount)?
                .trim()
                .parse::<u8>()
                .map_err(|_| CodecError::BadNumber)
        };
        let node = next_u8()?;
        let child = next_u8()?;
        let raw_cmd = next_u8()?;
        let ack = match next_u8()? {
            0 => false,
            1 => true,
            _ => return Err(CodecError::BadNumber),
        };
        let msg_type = next_u8()?;
        let payload = fields.next().ok_or(CodecError::FieldCount)?;
        let command = Command::from_u8(raw_cmd).ok_or(CodecError::UnknownCommand(raw_cmd))?;

        let mut msg = Self::new(node, child, command, msg_type, payload)?;
        msg.ack = ack;
        Ok(msg)
    }

    /// Integer payload.  Booleans travel as `0`/`1`.
    pub fn payload_int(&self) -> Result<i32, CodecError> {
        self.payload
            .trim()
            .parse::<i32>()
            .map_err(|_| CodecError::BadNumber)
    }

    /// Serialise including the trailing newline.
    pub fn encode(&self) -> Result<String<{ MAX_LINE + 1 }>, CodecError> {
        let mut out = String::new();
        writeln!(
            out,
            "{};{};{};{};{};{}",
            self.node,
            self.child,
            self.command as u8,
            u8::from(self.ack),
            self.msg_type,
            self.payload
        )
        .map_err(|_| CodecError::LineTooLong)?;
        Ok(out)
    }
}

/// Streaming line decoder.
pub struct LineDecoder {
    buf: Vec<u8, MAX_LINE>,
    /// Set after overflow until the next newline.
    discarding: bool,
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl LineDecoder {
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            discarding: false,
        }
    }

    /// Feed one byte.  Returns the parse result when a line completes.
    pub fn push(&mut self, byte: u8) -> Option<Result<GatewayMessage, CodecError>> {
        match byte {
            b'\r' => None,
            b'\n' => {
                if self.discarding {
                    self.discarding = false;
                    self.buf.clear();
                    return Some(Err(CodecError::LineTooLong));
                }
                if self.buf.is_empty() {
                    return None;
                }
                let result = core::str::from_utf8(&self.buf)
                    .map_err(|_| CodecError::NotUtf8)
                    .and_then(GatewayMessage::parse);
                self.buf.clear();
                Some(result)
            }
            _ => {
                if !self.discarding && self.buf.push(byte).is_err() {
                    self.discarding = true;
                    self.buf.clear();
                }
                None
            }
        }
    }

    /// Drop any partial line (e.g. after a link reset).
    pub fn reset(&mut self) {
        self.buf.clear();
        self.discarding = false;
    }
}
