//! Call records produced by the trace recorder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// One intercepted port operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    /// Position within the capture window, starting at 1.
    pub seq: u64,
    /// Operation name, e.g. `set_dtr` or `read`.
    pub op: String,
    /// Operation-specific description of the inputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    /// Operation-specific description of the result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    /// Size and preview of the bytes moved, for read and write only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<PayloadSummary>,
    /// Display text of the error, if the call failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub elapsed_us: u64,
}

impl CallRecord {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_micros(self.elapsed_us)
    }
}

impl fmt::Display for CallRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} {}",
            self.seq,
            self.started_at.format("%H:%M:%S%.6f"),
            self.op
        )?;
        if let Some(input) = &self.input {
            write!(f, " {input}")?;
        }
        if let Some(payload) = &self.payload {
            write!(f, " {payload}")?;
        }
        match (&self.error, &self.output) {
            (Some(err), _) => write!(f, " -> error: {err}")?,
            (None, Some(output)) => write!(f, " -> {output}")?,
            (None, None) => write!(f, " -> ok")?,
        }
        write!(f, " ({}us)", self.elapsed_us)
    }
}

/// Bounded description of a byte transfer.
///
/// Never holds more than the configured preview length, however large the
/// buffer was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadSummary {
    /// Length of the caller's buffer.
    pub requested: usize,
    /// Bytes actually moved, including the partial count of a failed transfer.
    pub transferred: usize,
    /// Space separated hex of the previewed bytes.
    pub hex: String,
    /// Previewed bytes with non-printable characters shown as `.`.
    pub text: String,
    /// True when the previewed region was longer than the preview limit.
    pub truncated: bool,
}

impl PayloadSummary {
    /// Summarize `bytes`, keeping at most `limit` of them.
    pub fn new(requested: usize, transferred: usize, bytes: &[u8], limit: usize) -> Self {
        let shown = &bytes[..bytes.len().min(limit)];
        let hex = shown
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<Vec<_>>()
            .join(" ");
        let text = shown
            .iter()
            .map(|&b| {
                if b.is_ascii_graphic() || b == b' ' {
                    b as char
                } else {
                    '.'
                }
            })
            .collect();
        Self {
            requested,
            transferred,
            hex,
            text,
            truncated: bytes.len() > limit,
        }
    }

    /// Number of bytes held in the preview.
    pub fn preview_len(&self) -> usize {
        self.text.chars().count()
    }
}

impl fmt::Display for PayloadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}/{} bytes", self.transferred, self.requested)?;
        if !self.hex.is_empty() {
            write!(f, " {} {:?}", self.hex, self.text)?;
        }
        if self.truncated {
            write!(f, " ...")?;
        }
        write!(f, "]")
    }
}
