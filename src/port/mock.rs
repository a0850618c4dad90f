//! Mock serial port implementation for testing.
//!
//! Provides a `MockSerialPort` that simulates serial port behavior without
//! requiring actual hardware. Clones share state, so a test can hand one clone
//! to a decorator and keep another to inspect what was delegated.

use super::error::PortError;
use super::traits::SerialPortAdapter;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io::ErrorKind;
use std::sync::Arc;
use std::time::Duration;

/// Inner state of the mock port, protected by a mutex for interior mutability.
#[derive(Debug, Default)]
struct MockPortState {
    /// Queue of bytes to be returned by read operations.
    read_queue: VecDeque<u8>,
    /// Log of all bytes written to the port.
    write_log: Vec<Vec<u8>>,
    /// Reads with an empty queue fill the whole buffer instead of blocking.
    echo: bool,
    /// Whether the next read/write should time out.
    should_timeout: bool,
    /// Next read fails after moving this many bytes.
    read_failure: Option<(usize, ErrorKind)>,
    /// Next write fails after moving this many bytes.
    write_failure: Option<(usize, ErrorKind)>,
    read_timeout: Duration,
    inter_byte_timeout: Duration,
    first_byte_timeout: Duration,
    write_timeout: Duration,
    dtr: bool,
    rts: bool,
    input_resets: usize,
    output_resets: usize,
    closed: bool,
    close_calls: usize,
    /// Every trait call that reached the mock.
    calls: usize,
}

/// Mock serial port implementation for testing.
///
/// This implementation allows you to:
/// - Enqueue data to be returned by read operations
/// - Inspect what data was written
/// - Simulate timeouts and partial transfers
/// - Observe timeouts, control lines and close calls
///
/// # Example
/// ```
/// use serial_debug::port::{MockSerialPort, SerialPortAdapter};
///
/// let mut port = MockSerialPort::new("MOCK0");
///
/// // Enqueue data to be read
/// port.enqueue_read(b"Hello, World!");
///
/// // Perform a read
/// let mut buffer = [0u8; 13];
/// let n = port.read_bytes(&mut buffer).unwrap();
/// assert_eq!(n, 13);
/// assert_eq!(&buffer[..n], b"Hello, World!");
///
/// // Write some data
/// port.write_bytes(b"Response").unwrap();
///
/// // Verify what was written
/// let writes = port.get_write_log();
/// assert_eq!(writes.len(), 1);
/// assert_eq!(writes[0], b"Response");
/// ```
#[derive(Clone)]
pub struct MockSerialPort {
    /// The port name/identifier.
    name: String,
    /// The internal state, shared between clones.
    state: Arc<Mutex<MockPortState>>,
}

impl MockSerialPort {
    /// Create a new mock serial port with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(MockPortState {
                read_timeout: Duration::from_secs(1),
                write_timeout: Duration::from_secs(1),
                ..Default::default()
            })),
        }
    }

    /// Create a mock whose reads and writes always report the full buffer length.
    ///
    /// Queued bytes are still served first; the rest of the buffer is zeroed.
    pub fn echo(name: impl Into<String>) -> Self {
        let port = Self::new(name);
        port.state.lock().echo = true;
        port
    }

    /// Enqueue bytes to be returned by subsequent read operations.
    pub fn enqueue_read(&mut self, data: &[u8]) {
        self.state.lock().read_queue.extend(data);
    }

    /// Get a copy of all data written to the port.
    pub fn get_write_log(&self) -> Vec<Vec<u8>> {
        self.state.lock().write_log.clone()
    }

    /// Clear the write log.
    pub fn clear_write_log(&mut self) {
        self.state.lock().write_log.clear();
    }

    /// Set whether the next read/write operation should time out.
    pub fn set_should_timeout(&mut self, should_timeout: bool) {
        self.state.lock().should_timeout = should_timeout;
    }

    /// Make the next read fail after `transferred` bytes with the given kind.
    pub fn fail_next_read(&mut self, transferred: usize, kind: ErrorKind) {
        self.state.lock().read_failure = Some((transferred, kind));
    }

    /// Make the next write fail after `transferred` bytes with the given kind.
    pub fn fail_next_write(&mut self, transferred: usize, kind: ErrorKind) {
        self.state.lock().write_failure = Some((transferred, kind));
    }

    /// Get the number of bytes available to read.
    pub fn available_bytes(&self) -> usize {
        self.state.lock().read_queue.len()
    }

    pub fn read_timeout(&self) -> Duration {
        self.state.lock().read_timeout
    }

    pub fn inter_byte_timeout(&self) -> Duration {
        self.state.lock().inter_byte_timeout
    }

    pub fn first_byte_timeout(&self) -> Duration {
        self.state.lock().first_byte_timeout
    }

    pub fn write_timeout(&self) -> Duration {
        self.state.lock().write_timeout
    }

    pub fn dtr(&self) -> bool {
        self.state.lock().dtr
    }

    pub fn rts(&self) -> bool {
        self.state.lock().rts
    }

    /// How many times each buffer has been reset, as `(input, output)`.
    pub fn reset_counts(&self) -> (usize, usize) {
        let state = self.state.lock();
        (state.input_resets, state.output_resets)
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Number of `close` calls that reached the mock, including failed ones.
    pub fn close_calls(&self) -> usize {
        self.state.lock().close_calls
    }

    /// Number of trait calls that reached the mock.
    pub fn call_count(&self) -> usize {
        self.state.lock().calls
    }

    /// Count the call and fail if the port is closed.
    fn enter(&self) -> Result<parking_lot::MutexGuard<'_, MockPortState>, PortError> {
        let mut state = self.state.lock();
        state.calls += 1;
        if state.closed {
            return Err(PortError::AlreadyClosed);
        }
        Ok(state)
    }
}

/// Queue length as reported by `ready_to_read`, saturating at `u32::MAX`.
fn queued_count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// Produce the error for an injected failure after `transferred` bytes.
fn injected(transferred: usize, kind: ErrorKind) -> PortError {
    let source = std::io::Error::new(kind, "injected failure");
    if transferred == 0 {
        PortError::Io(source)
    } else {
        PortError::partial(transferred, source)
    }
}

impl SerialPortAdapter for MockSerialPort {
    fn set_read_timeout(&mut self, timeout: Duration) -> Result<(), PortError> {
        self.enter()?.read_timeout = timeout;
        Ok(())
    }

    fn set_read_timeout_ex(
        &mut self,
        timeout: Duration,
        inter_byte: Duration,
    ) -> Result<(), PortError> {
        let mut state = self.enter()?;
        state.read_timeout = timeout;
        state.inter_byte_timeout = inter_byte;
        Ok(())
    }

    fn set_first_byte_read_timeout(&mut self, timeout: Duration) -> Result<(), PortError> {
        self.enter()?.first_byte_timeout = timeout;
        Ok(())
    }

    fn set_write_timeout(&mut self, timeout: Duration) -> Result<(), PortError> {
        self.enter()?.write_timeout = timeout;
        Ok(())
    }

    fn ready_to_read(&self) -> Result<u32, PortError> {
        let state = self.enter()?;
        Ok(queued_count(state.read_queue.len()))
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        let mut state = self.enter()?;

        if state.should_timeout {
            state.should_timeout = false;
            return Err(PortError::timeout(state.read_timeout));
        }

        let failure = state.read_failure.take();
        let limit = match failure {
            Some((transferred, _)) => transferred.min(buffer.len()),
            None => buffer.len(),
        };

        let mut bytes_read = 0;
        for byte in buffer.iter_mut().take(limit) {
            match state.read_queue.pop_front() {
                Some(queued) => *byte = queued,
                None if state.echo || failure.is_some() => *byte = 0,
                None => break,
            }
            bytes_read += 1;
        }

        if let Some((_, kind)) = failure {
            return Err(injected(bytes_read, kind));
        }

        if bytes_read == 0 && !buffer.is_empty() {
            // Simulate "would block" behavior by returning an I/O error
            Err(PortError::Io(std::io::Error::new(
                ErrorKind::WouldBlock,
                "No data available",
            )))
        } else {
            Ok(bytes_read)
        }
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError> {
        let mut state = self.enter()?;

        if state.should_timeout {
            state.should_timeout = false;
            return Err(PortError::timeout(state.write_timeout));
        }

        if let Some((transferred, kind)) = state.write_failure.take() {
            let transferred = transferred.min(data.len());
            state.write_log.push(data[..transferred].to_vec());
            return Err(injected(transferred, kind));
        }

        state.write_log.push(data.to_vec());
        Ok(data.len())
    }

    fn reset_input_buffer(&mut self) -> Result<(), PortError> {
        let mut state = self.enter()?;
        state.read_queue.clear();
        state.input_resets += 1;
        Ok(())
    }

    fn reset_output_buffer(&mut self) -> Result<(), PortError> {
        self.enter()?.output_resets += 1;
        Ok(())
    }

    fn set_dtr(&mut self, level: bool) -> Result<(), PortError> {
        self.enter()?.dtr = level;
        Ok(())
    }

    fn set_rts(&mut self, level: bool) -> Result<(), PortError> {
        self.enter()?.rts = level;
        Ok(())
    }

    fn close(&mut self) -> Result<(), PortError> {
        let mut state = self.state.lock();
        state.calls += 1;
        state.close_calls += 1;
        if state.closed {
            return Err(PortError::AlreadyClosed);
        }
        state.closed = true;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for MockSerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSerialPort")
            .field("name", &self.name)
            .field("available_bytes", &self.available_bytes())
            .field("closed", &self.is_closed())
            .finish()
    }
}
