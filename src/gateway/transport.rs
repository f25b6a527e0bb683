//! Transport abstraction: any byte-oriented channel to the gateway.
//!
//! On target the link is a UART to the serial gateway ([`UartTransport`]);
//! host tests plug in an in-memory loopback.
//!
//! The serial gateway bus is generic over `Transport`, so adding a new
//! link (RS-485, radio module) requires zero changes to the codec.

/// Byte-oriented transport channel.
pub trait Transport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Read up to `buf.len()` bytes into `buf`.
    /// Returns the number of bytes actually read, 0 when idle.  Never blocks.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write `data` to the transport.
    /// Returns the number of bytes actually written.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Flush any buffered output.
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// UART link to the serial gateway.
#[cfg(target_os = "espidf")]
pub struct UartTransport {
    uart: esp_idf_hal::uart::UartDriver<'static>,
}

#[cfg(target_os = "espidf")]
impl UartTransport {
    pub fn new(uart: esp_idf_hal::uart::UartDriver<'static>) -> Self {
        Self { uart }
    }
}

#[cfg(target_os = "espidf")]
impl Transport for UartTransport {
    type Error = esp_idf_svc::sys::EspError;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        // Zero-tick timeout: return whatever the RX FIFO already holds.
        self.uart.read(buf, 0)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        self.uart.write(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.uart.wait_tx_done(esp_idf_hal::delay::BLOCK)
    }
}
