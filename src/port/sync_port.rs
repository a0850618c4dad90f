//! Synchronous serial port implementation.
//!
//! Wraps the `serialport` crate's `SerialPort` trait with our own `SerialPortAdapter`
//! trait so real hardware can sit behind the logging decorator.

use super::error::PortError;
use super::traits::{PortConfiguration, SerialPortAdapter};
use std::io::{Read, Write};
use std::time::Duration;

/// Synchronous serial port implementation wrapping `serialport::SerialPort`.
///
/// `serialport` exposes one timeout per port, so the read and write timeouts
/// are kept here and applied before each transfer. The first-byte timeout,
/// when set, replaces the read timeout for reads. The inter-byte timeout is
/// stored and reported but the backend has no way to enforce it.
pub struct SyncSerialPort {
    /// The underlying serial port implementation; `None` once closed.
    port: Option<Box<dyn serialport::SerialPort>>,
    /// The port name/path for identification.
    name: String,
    read_timeout: Duration,
    inter_byte_timeout: Duration,
    first_byte_timeout: Option<Duration>,
    write_timeout: Duration,
    /// Timeout currently programmed into the backend.
    applied_timeout: Duration,
}

impl SyncSerialPort {
    /// Open a serial port with the given configuration.
    ///
    /// # Arguments
    /// * `port_name` - The system path to the serial port (e.g., "/dev/ttyUSB0" or "COM3")
    /// * `config` - Configuration parameters for the port
    ///
    /// # Example
    /// ```no_run
    /// use serial_debug::port::{SyncSerialPort, PortConfiguration};
    ///
    /// let config = PortConfiguration::default();
    /// let port = SyncSerialPort::open("/dev/ttyUSB0", config)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(port_name: &str, config: PortConfiguration) -> Result<Self, PortError> {
        let port = serialport::new(port_name, config.baud_rate)
            .timeout(config.timeout)
            .open()
            .map_err(|e| match e.kind() {
                serialport::ErrorKind::NoDevice => PortError::not_found(port_name),
                serialport::ErrorKind::InvalidInput => PortError::config(e.to_string()),
                _ => PortError::Serial(e),
            })?;

        Ok(Self {
            port: Some(port),
            name: port_name.to_string(),
            read_timeout: config.timeout,
            inter_byte_timeout: Duration::ZERO,
            first_byte_timeout: None,
            write_timeout: config.timeout,
            applied_timeout: config.timeout,
        })
    }

    /// Open a serial port with default configuration (9600 baud, 1s timeout).
    pub fn open_default(port_name: &str) -> Result<Self, PortError> {
        Self::open(port_name, PortConfiguration::default())
    }

    /// Inter-byte timeout last requested through `set_read_timeout_ex`.
    pub fn inter_byte_timeout(&self) -> Duration {
        self.inter_byte_timeout
    }

    fn raw(&self) -> Result<&dyn serialport::SerialPort, PortError> {
        self.port.as_deref().ok_or(PortError::AlreadyClosed)
    }

    fn raw_mut(&mut self) -> Result<&mut Box<dyn serialport::SerialPort>, PortError> {
        self.port.as_mut().ok_or(PortError::AlreadyClosed)
    }

    /// Program `timeout` into the backend if it differs from the current one.
    fn apply_timeout(&mut self, timeout: Duration) -> Result<(), PortError> {
        if self.applied_timeout != timeout {
            self.raw_mut()?.set_timeout(timeout)?;
            self.applied_timeout = timeout;
        }
        Ok(())
    }
}

impl SerialPortAdapter for SyncSerialPort {
    fn set_read_timeout(&mut self, timeout: Duration) -> Result<(), PortError> {
        self.raw()?;
        self.read_timeout = timeout;
        Ok(())
    }

    fn set_read_timeout_ex(
        &mut self,
        timeout: Duration,
        inter_byte: Duration,
    ) -> Result<(), PortError> {
        self.raw()?;
        self.read_timeout = timeout;
        self.inter_byte_timeout = inter_byte;
        Ok(())
    }

    fn set_first_byte_read_timeout(&mut self, timeout: Duration) -> Result<(), PortError> {
        self.raw()?;
        self.first_byte_timeout = (!timeout.is_zero()).then_some(timeout);
        Ok(())
    }

    fn set_write_timeout(&mut self, timeout: Duration) -> Result<(), PortError> {
        self.raw()?;
        self.write_timeout = timeout;
        Ok(())
    }

    fn ready_to_read(&self) -> Result<u32, PortError> {
        Ok(self.raw()?.bytes_to_read()?)
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        let timeout = self.first_byte_timeout.unwrap_or(self.read_timeout);
        self.apply_timeout(timeout)?;
        self.raw_mut()?.read(buffer).map_err(PortError::Io)
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError> {
        let timeout = self.write_timeout;
        self.apply_timeout(timeout)?;
        self.raw_mut()?.write(data).map_err(PortError::Io)
    }

    fn reset_input_buffer(&mut self) -> Result<(), PortError> {
        Ok(self.raw()?.clear(serialport::ClearBuffer::Input)?)
    }

    fn reset_output_buffer(&mut self) -> Result<(), PortError> {
        Ok(self.raw()?.clear(serialport::ClearBuffer::Output)?)
    }

    fn set_dtr(&mut self, level: bool) -> Result<(), PortError> {
        Ok(self.raw_mut()?.write_data_terminal_ready(level)?)
    }

    fn set_rts(&mut self, level: bool) -> Result<(), PortError> {
        Ok(self.raw_mut()?.write_request_to_send(level)?)
    }

    fn close(&mut self) -> Result<(), PortError> {
        // serialport releases the device handle on drop
        match self.port.take() {
            Some(port) => {
                drop(port);
                Ok(())
            }
            None => Err(PortError::AlreadyClosed),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for SyncSerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncSerialPort")
            .field("name", &self.name)
            .field(
                "baud_rate",
                &self.port.as_ref().and_then(|p| p.baud_rate().ok()),
            )
            .field("open", &self.port.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_not_found_error() {
        let config = PortConfiguration::default();
        let result = SyncSerialPort::open("/dev/nonexistent_port_12345", config);

        assert!(result.is_err());
        if let Err(e) = result {
            assert!(!e.is_lifecycle(), "open failure must be a transport error: {e:?}");
        }
    }

    #[test]
    fn test_default_configuration() {
        let config = PortConfiguration::default();
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.timeout, Duration::from_secs(1));
    }
}
