//! Core traits for serial port abstraction.
//!
//! Defines the `SerialPortAdapter` trait that allows real serial ports, mock
//! implementations and the logging decorator to be used interchangeably.

use super::error::PortError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Parameters used to open a real serial port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortConfiguration {
    /// Baud rate (bits per second).
    pub baud_rate: u32,

    /// Initial read/write timeout.
    pub timeout: Duration,
}

impl Default for PortConfiguration {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            timeout: Duration::from_secs(1),
        }
    }
}

/// Trait for serial port operations.
///
/// Every method a caller can issue against a port lives here, so a decorator
/// can intercept all of them. Real hardware ports, mocks and
/// [`LoggedPort`](super::LoggedPort) all implement it.
pub trait SerialPortAdapter: Send + std::fmt::Debug {
    /// Set the read timeout.
    fn set_read_timeout(&mut self, timeout: Duration) -> Result<(), PortError>;

    /// Set the read timeout together with an inter-byte timeout.
    fn set_read_timeout_ex(
        &mut self,
        timeout: Duration,
        inter_byte: Duration,
    ) -> Result<(), PortError>;

    /// Set how long a read waits for the first byte to arrive.
    fn set_first_byte_read_timeout(&mut self, timeout: Duration) -> Result<(), PortError>;

    /// Set the write timeout.
    fn set_write_timeout(&mut self, timeout: Duration) -> Result<(), PortError>;

    /// Number of bytes waiting in the receive buffer.
    fn ready_to_read(&self) -> Result<u32, PortError>;

    /// Read bytes from the serial port into the provided buffer.
    ///
    /// Returns the number of bytes actually read. A failure after some bytes
    /// were already moved is reported as [`PortError::Partial`].
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError>;

    /// Write bytes to the serial port.
    ///
    /// Returns the number of bytes actually written.
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError>;

    /// Discard unread data in the receive buffer.
    fn reset_input_buffer(&mut self) -> Result<(), PortError>;

    /// Discard unsent data in the transmit buffer.
    fn reset_output_buffer(&mut self) -> Result<(), PortError>;

    /// Drive the Data Terminal Ready line.
    fn set_dtr(&mut self, level: bool) -> Result<(), PortError>;

    /// Drive the Request To Send line.
    fn set_rts(&mut self, level: bool) -> Result<(), PortError>;

    /// Close the port.
    ///
    /// Closing is not idempotent: a second call fails with
    /// [`PortError::AlreadyClosed`].
    fn close(&mut self) -> Result<(), PortError>;

    /// Human-readable identifier of this port.
    fn name(&self) -> &str;
}

impl<P: SerialPortAdapter + ?Sized> SerialPortAdapter for Box<P> {
    fn set_read_timeout(&mut self, timeout: Duration) -> Result<(), PortError> {
        (**self).set_read_timeout(timeout)
    }

    fn set_read_timeout_ex(
        &mut self,
        timeout: Duration,
        inter_byte: Duration,
    ) -> Result<(), PortError> {
        (**self).set_read_timeout_ex(timeout, inter_byte)
    }

    fn set_first_byte_read_timeout(&mut self, timeout: Duration) -> Result<(), PortError> {
        (**self).set_first_byte_read_timeout(timeout)
    }

    fn set_write_timeout(&mut self, timeout: Duration) -> Result<(), PortError> {
        (**self).set_write_timeout(timeout)
    }

    fn ready_to_read(&self) -> Result<u32, PortError> {
        (**self).ready_to_read()
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        (**self).read_bytes(buffer)
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError> {
        (**self).write_bytes(data)
    }

    fn reset_input_buffer(&mut self) -> Result<(), PortError> {
        (**self).reset_input_buffer()
    }

    fn reset_output_buffer(&mut self) -> Result<(), PortError> {
        (**self).reset_output_buffer()
    }

    fn set_dtr(&mut self, level: bool) -> Result<(), PortError> {
        (**self).set_dtr(level)
    }

    fn set_rts(&mut self, level: bool) -> Result<(), PortError> {
        (**self).set_rts(level)
    }

    fn close(&mut self) -> Result<(), PortError> {
        (**self).close()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
