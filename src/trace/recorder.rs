//! In-memory recorder for intercepted port calls.

use super::record::{CallRecord, PayloadSummary};
use crate::config::TraceConfig;
use crate::port::PortError;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::fmt::Display;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Records preallocated by `start` unless configured otherwise.
pub const DEFAULT_CAPACITY: usize = 8;

/// Bytes of payload kept in a read/write record unless configured otherwise.
pub const DEFAULT_PREVIEW_BYTES: usize = 32;

#[derive(Debug, Default)]
struct RecorderState {
    active: bool,
    records: VecDeque<CallRecord>,
    next_seq: u64,
    dropped: u64,
}

/// Accumulates [`CallRecord`]s between `start` and `stop`.
///
/// The recorder is shared (`Arc<TraceRecorder>`) between whoever controls the
/// capture window and any number of [`LoggedPort`](crate::port::LoggedPort)s.
/// Calls that complete while no window is open still run; they are just not
/// recorded. Logging primitives never change the result they are handed.
#[derive(Debug)]
pub struct TraceRecorder {
    state: Mutex<RecorderState>,
    capacity: usize,
    max_records: Option<usize>,
    preview_bytes: usize,
}

impl Default for TraceRecorder {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl TraceRecorder {
    /// Create an inactive recorder that preallocates `capacity` records per window.
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(RecorderState::default()),
            capacity,
            max_records: None,
            preview_bytes: DEFAULT_PREVIEW_BYTES,
        }
    }

    pub fn with_config(config: &TraceConfig) -> Self {
        Self {
            state: Mutex::new(RecorderState::default()),
            capacity: config.capacity,
            max_records: config.max_records,
            preview_bytes: config.preview_bytes,
        }
    }

    /// Bound the window to `max` records, evicting the oldest beyond that.
    pub fn with_max_records(mut self, max: usize) -> Self {
        self.max_records = Some(max);
        self
    }

    pub fn with_preview_bytes(mut self, preview_bytes: usize) -> Self {
        self.preview_bytes = preview_bytes;
        self
    }

    /// Open a new capture window, discarding anything recorded before.
    pub fn start(&self) {
        let mut state = self.state.lock();
        state.records.clear();
        state.records.reserve(self.capacity);
        state.next_seq = 1;
        state.dropped = 0;
        state.active = true;
        debug!("trace capture started");
    }

    /// Close the capture window and hand back everything it captured.
    pub fn stop(&self) -> Vec<CallRecord> {
        let mut state = self.state.lock();
        state.active = false;
        let records: Vec<CallRecord> = state.records.drain(..).collect();
        debug!(
            records = records.len(),
            dropped = state.dropped,
            "trace capture stopped"
        );
        records
    }

    /// Copy of the records captured so far, leaving the window open.
    pub fn snapshot(&self) -> Vec<CallRecord> {
        self.state.lock().records.iter().cloned().collect()
    }

    pub fn is_active(&self) -> bool {
        self.state.lock().active
    }

    /// Records evicted from the current window by `max_records`.
    pub fn dropped(&self) -> u64 {
        self.state.lock().dropped
    }

    pub fn preview_bytes(&self) -> usize {
        self.preview_bytes
    }

    /// Run `f` and record its outcome, returning the outcome unchanged.
    ///
    /// A successful value is recorded as its JSON form; `()` leaves the output
    /// empty.
    pub fn log_any<T, E, F>(&self, op: &str, input: Option<Value>, f: F) -> Result<T, E>
    where
        T: Serialize,
        E: Display,
        F: FnOnce() -> Result<T, E>,
    {
        self.log_with(op, input, f, |value| {
            serde_json::to_value(value).ok().filter(|v| !v.is_null())
        })
    }

    /// Like [`log_any`](Self::log_any) with a caller-supplied output summary.
    pub fn log_with<T, E, F, S>(
        &self,
        op: &str,
        input: Option<Value>,
        f: F,
        summarize: S,
    ) -> Result<T, E>
    where
        E: Display,
        F: FnOnce() -> Result<T, E>,
        S: FnOnce(&T) -> Option<Value>,
    {
        let started_at = Utc::now();
        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        let (output, error) = match &result {
            Ok(value) => (summarize(value), None),
            Err(err) => (None, Some(err.to_string())),
        };
        self.append(op, input, output, None, error, started_at, elapsed);
        result
    }

    /// Run a read into `buf` and record a bounded summary of the bytes received.
    pub fn log_read<F>(&self, op: &str, buf: &mut [u8], f: F) -> Result<usize, PortError>
    where
        F: FnOnce(&mut [u8]) -> Result<usize, PortError>,
    {
        let started_at = Utc::now();
        let start = Instant::now();
        let result = f(&mut *buf);
        let elapsed = start.elapsed();

        let transferred = transferred(&result).min(buf.len());
        let payload = PayloadSummary::new(
            buf.len(),
            transferred,
            &buf[..transferred],
            self.preview_bytes,
        );
        let error = result.as_ref().err().map(ToString::to_string);
        self.append(op, None, None, Some(payload), error, started_at, elapsed);
        result
    }

    /// Run a write of `buf` and record a bounded summary of the bytes offered.
    pub fn log_write<F>(&self, op: &str, buf: &[u8], f: F) -> Result<usize, PortError>
    where
        F: FnOnce(&[u8]) -> Result<usize, PortError>,
    {
        let started_at = Utc::now();
        let start = Instant::now();
        let result = f(buf);
        let elapsed = start.elapsed();

        let payload = PayloadSummary::new(
            buf.len(),
            transferred(&result),
            buf,
            self.preview_bytes,
        );
        let error = result.as_ref().err().map(ToString::to_string);
        self.append(op, None, None, Some(payload), error, started_at, elapsed);
        result
    }

    #[allow(clippy::too_many_arguments)]
    fn append(
        &self,
        op: &str,
        input: Option<Value>,
        output: Option<Value>,
        payload: Option<PayloadSummary>,
        error: Option<String>,
        started_at: DateTime<Utc>,
        elapsed: Duration,
    ) {
        let mut state = self.state.lock();
        if !state.active {
            return;
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        trace!(seq, op, failed = error.is_some(), "call recorded");
        state.records.push_back(CallRecord {
            seq,
            op: op.to_string(),
            input,
            output,
            payload,
            error,
            started_at,
            elapsed_us: u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
        });

        if let Some(max) = self.max_records {
            while state.records.len() > max {
                state.records.pop_front();
                state.dropped += 1;
            }
        }
    }
}

fn transferred(result: &Result<usize, PortError>) -> usize {
    match result {
        Ok(n) => *n,
        Err(err) => err.transferred(),
    }
}
