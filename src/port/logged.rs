//! Logging decorator for serial ports.
//!
//! `LoggedPort` implements [`SerialPortAdapter`] by forwarding every call to
//! the port it wraps and recording the call with a shared [`TraceRecorder`].
//! Results and errors from the inner port are returned exactly as produced.

use super::error::PortError;
use super::opener::OpenLease;
use super::traits::SerialPortAdapter;
use crate::trace::TraceRecorder;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// A serial port whose every operation is recorded.
///
/// The inner port is owned exclusively and released on `close`, whether or
/// not the inner close succeeded. From then on every operation fails with
/// [`PortError::AlreadyClosed`] without reaching the inner port.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use serial_debug::port::{LoggedPort, MockSerialPort, SerialPortAdapter};
/// use serial_debug::trace::TraceRecorder;
///
/// let recorder = Arc::new(TraceRecorder::default());
/// let mut port = LoggedPort::new(MockSerialPort::echo("MOCK0"), Arc::clone(&recorder));
///
/// recorder.start();
/// port.set_dtr(true).unwrap();
/// port.write_bytes(b"AT\r\n").unwrap();
/// port.close().unwrap();
///
/// let ops: Vec<_> = recorder.stop().into_iter().map(|r| r.op).collect();
/// assert_eq!(ops, ["set_dtr", "write", "close"]);
/// ```
#[derive(Debug)]
pub struct LoggedPort<P = Box<dyn SerialPortAdapter>> {
    port: Option<P>,
    name: String,
    recorder: Arc<TraceRecorder>,
    /// Held while open when produced by a `PortOpener`.
    lease: Option<OpenLease>,
}

impl<P: SerialPortAdapter> LoggedPort<P> {
    /// Wrap an already open port.
    pub fn new(port: P, recorder: Arc<TraceRecorder>) -> Self {
        Self {
            name: port.name().to_string(),
            port: Some(port),
            recorder,
            lease: None,
        }
    }

    pub(crate) fn with_lease(mut self, lease: OpenLease) -> Self {
        self.lease = Some(lease);
        self
    }

    /// True until `close` has been called.
    pub fn is_open(&self) -> bool {
        self.port.is_some()
    }

    pub fn recorder(&self) -> &Arc<TraceRecorder> {
        &self.recorder
    }

    /// The wrapped port, if still open.
    pub fn get_ref(&self) -> Option<&P> {
        self.port.as_ref()
    }

    /// Record `op` around a delegated call on the inner port.
    fn call<T, F>(&mut self, op: &'static str, input: Option<Value>, f: F) -> Result<T, PortError>
    where
        T: Serialize,
        F: FnOnce(&mut P) -> Result<T, PortError>,
    {
        debug!(port = %self.name, op, "delegating call");
        let port = &mut self.port;
        let result = self.recorder.log_any(op, input, || match port.as_mut() {
            Some(port) => f(port),
            None => Err(PortError::AlreadyClosed),
        });
        self.report(op, &result);
        result
    }

    fn report<T>(&self, op: &str, result: &Result<T, PortError>) {
        match result {
            Err(err) if err.is_lifecycle() => {
                warn!(port = %self.name, op, error = %err, "port used after close");
            }
            Err(err) => debug!(port = %self.name, op, error = %err, "call failed"),
            Ok(_) => {}
        }
    }
}

/// Whole milliseconds, saturating.
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl<P: SerialPortAdapter> SerialPortAdapter for LoggedPort<P> {
    fn set_read_timeout(&mut self, timeout: Duration) -> Result<(), PortError> {
        let input = json!({ "timeout_ms": millis(timeout) });
        self.call("set_read_timeout", Some(input), |port| {
            port.set_read_timeout(timeout)
        })
    }

    fn set_read_timeout_ex(
        &mut self,
        timeout: Duration,
        inter_byte: Duration,
    ) -> Result<(), PortError> {
        let input = json!({
            "timeout_ms": millis(timeout),
            "inter_byte_ms": millis(inter_byte),
        });
        self.call("set_read_timeout_ex", Some(input), |port| {
            port.set_read_timeout_ex(timeout, inter_byte)
        })
    }

    fn set_first_byte_read_timeout(&mut self, timeout: Duration) -> Result<(), PortError> {
        let input = json!({ "timeout_ms": millis(timeout) });
        self.call("set_first_byte_read_timeout", Some(input), |port| {
            port.set_first_byte_read_timeout(timeout)
        })
    }

    fn set_write_timeout(&mut self, timeout: Duration) -> Result<(), PortError> {
        let input = json!({ "timeout_ms": millis(timeout) });
        self.call("set_write_timeout", Some(input), |port| {
            port.set_write_timeout(timeout)
        })
    }

    fn ready_to_read(&self) -> Result<u32, PortError> {
        debug!(port = %self.name, op = "ready_to_read", "delegating call");
        let result: Result<u32, PortError> = self.recorder.log_any("ready_to_read", None, || {
            self.port
                .as_ref()
                .ok_or(PortError::AlreadyClosed)?
                .ready_to_read()
        });
        self.report("ready_to_read", &result);
        result
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        debug!(port = %self.name, op = "read", len = buffer.len(), "delegating call");
        let port = &mut self.port;
        let result = self.recorder.log_read("read", buffer, |buf| match port.as_mut() {
            Some(port) => port.read_bytes(buf),
            None => Err(PortError::AlreadyClosed),
        });
        self.report("read", &result);
        result
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError> {
        debug!(port = %self.name, op = "write", len = data.len(), "delegating call");
        let port = &mut self.port;
        let result = self.recorder.log_write("write", data, |buf| match port.as_mut() {
            Some(port) => port.write_bytes(buf),
            None => Err(PortError::AlreadyClosed),
        });
        self.report("write", &result);
        result
    }

    fn reset_input_buffer(&mut self) -> Result<(), PortError> {
        self.call("reset_input_buffer", None, |port| port.reset_input_buffer())
    }

    fn reset_output_buffer(&mut self) -> Result<(), PortError> {
        self.call("reset_output_buffer", None, |port| port.reset_output_buffer())
    }

    fn set_dtr(&mut self, level: bool) -> Result<(), PortError> {
        self.call("set_dtr", Some(json!({ "level": level })), |port| {
            port.set_dtr(level)
        })
    }

    fn set_rts(&mut self, level: bool) -> Result<(), PortError> {
        self.call("set_rts", Some(json!({ "level": level })), |port| {
            port.set_rts(level)
        })
    }

    fn close(&mut self) -> Result<(), PortError> {
        debug!(port = %self.name, op = "close", "delegating call");
        let port = &mut self.port;
        let result = self.recorder.log_any("close", None, || match port.take() {
            Some(mut port) => port.close(),
            None => Err(PortError::AlreadyClosed),
        });
        self.lease = None;
        self.report("close", &result);
        result
    }

    fn name(&self) -> &str {
        &self.name
    }
}
