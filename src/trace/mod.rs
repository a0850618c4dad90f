//! Trace recording for intercepted port calls.
//!
//! A [`TraceRecorder`] collects one [`CallRecord`] per operation issued
//! through a [`LoggedPort`](crate::port::LoggedPort) while its capture window
//! is open.

pub mod record;
pub mod recorder;

pub use record::{CallRecord, PayloadSummary};
pub use recorder::{TraceRecorder, DEFAULT_CAPACITY, DEFAULT_PREVIEW_BYTES};
