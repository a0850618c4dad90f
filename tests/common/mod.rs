//! Shared test utilities for serial-debug integration tests.
//!
//! This module provides common test infrastructure including:
//! - Recorders with an open capture window
//! - Port factories that count how often they are called
//! - A small driver modelled on code that opens ports through a factory

#![allow(dead_code)]

use serial_debug::port::{LoggedPort, MockSerialPort, PortError, SerialPortAdapter};
use serial_debug::trace::{CallRecord, TraceRecorder};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A shared recorder whose capture window is already open.
pub fn started_recorder() -> Arc<TraceRecorder> {
    let recorder = Arc::new(TraceRecorder::default());
    recorder.start();
    recorder
}

/// Operation names of `records`, in order.
pub fn ops(records: &[CallRecord]) -> Vec<String> {
    records.iter().map(|r| r.op.clone()).collect()
}

/// Factory handing out clones of `mock`, counting its invocations.
pub fn counting_factory(
    mock: &MockSerialPort,
) -> (
    impl FnMut() -> Result<MockSerialPort, PortError>,
    Arc<AtomicUsize>,
) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mock = mock.clone();
    let factory = move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(mock.clone())
    };
    (factory, calls)
}

/// Minimal driver that only knows how to call a port factory.
///
/// Code written against a raw factory works unchanged with a wrapped one.
pub struct FakeDriver<F, P> {
    pub open: F,
    pub port: Option<P>,
}

impl<F, P> FakeDriver<F, P>
where
    F: FnMut() -> Result<P, PortError>,
    P: SerialPortAdapter,
{
    pub fn new(open: F) -> Self {
        Self { open, port: None }
    }

    pub fn connect(&mut self) -> Result<(), PortError> {
        let port = (self.open)()?;
        self.port = Some(port);
        Ok(())
    }

    pub fn disconnect(&mut self) -> Result<(), PortError> {
        match self.port.take() {
            Some(mut port) => port.close(),
            None => Err(PortError::AlreadyClosed),
        }
    }
}

/// Every single-shot operation a test can issue, used to build call sequences.
#[derive(Debug, Clone, Copy)]
pub enum PortOp {
    ReadTimeout(u64),
    ReadTimeoutEx(u64, u64),
    FirstByteTimeout(u64),
    WriteTimeout(u64),
    ReadyToRead,
    Read(usize),
    Write(usize),
    ResetInput,
    ResetOutput,
    Dtr(bool),
    Rts(bool),
}

impl PortOp {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ReadTimeout(_) => "set_read_timeout",
            Self::ReadTimeoutEx(..) => "set_read_timeout_ex",
            Self::FirstByteTimeout(_) => "set_first_byte_read_timeout",
            Self::WriteTimeout(_) => "set_write_timeout",
            Self::ReadyToRead => "ready_to_read",
            Self::Read(_) => "read",
            Self::Write(_) => "write",
            Self::ResetInput => "reset_input_buffer",
            Self::ResetOutput => "reset_output_buffer",
            Self::Dtr(_) => "set_dtr",
            Self::Rts(_) => "set_rts",
        }
    }

    pub fn apply<P: SerialPortAdapter>(&self, port: &mut LoggedPort<P>) -> Result<(), PortError> {
        use std::time::Duration;
        match *self {
            Self::ReadTimeout(ms) => port.set_read_timeout(Duration::from_millis(ms)),
            Self::ReadTimeoutEx(ms, ib) => {
                port.set_read_timeout_ex(Duration::from_millis(ms), Duration::from_millis(ib))
            }
            Self::FirstByteTimeout(ms) => {
                port.set_first_byte_read_timeout(Duration::from_millis(ms))
            }
            Self::WriteTimeout(ms) => port.set_write_timeout(Duration::from_millis(ms)),
            Self::ReadyToRead => port.ready_to_read().map(|_| ()),
            Self::Read(len) => port.read_bytes(&mut vec![0u8; len]).map(|_| ()),
            Self::Write(len) => port.write_bytes(&vec![0xA5u8; len]).map(|_| ()),
            Self::ResetInput => port.reset_input_buffer(),
            Self::ResetOutput => port.reset_output_buffer(),
            Self::Dtr(level) => port.set_dtr(level),
            Self::Rts(level) => port.set_rts(level),
        }
    }
}
