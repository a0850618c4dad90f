//! Serial Debug Library
//!
//! A logging decorator for serial ports: every operation issued through a
//! wrapped port is delegated unchanged and recorded to an in-memory trace.
//!
//! # Modules
//!
//! - `port`: the `SerialPortAdapter` trait, real and mock ports, the
//!   `LoggedPort` decorator and the `PortOpener` / `wrap` factory adapters
//! - `trace`: the `TraceRecorder` and the `CallRecord`s it collects
//! - `config`: Configuration management with TOML support
//! - `logging`: `tracing` subscriber setup
//! - `error`: Application-level error type
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use serial_debug::port::{wrap, MockSerialPort, PortError, SerialPortAdapter};
//! use serial_debug::trace::TraceRecorder;
//!
//! let recorder = Arc::new(TraceRecorder::default());
//! let mut open = wrap(|| Ok::<_, PortError>(MockSerialPort::echo("MOCK0")), Arc::clone(&recorder));
//!
//! recorder.start();
//! let mut port = open().unwrap();
//! port.write_bytes(b"AT\r\n").unwrap();
//! port.close().unwrap();
//!
//! for record in recorder.stop() {
//!     println!("{record}");
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod port;
pub mod trace;

// Re-export commonly used types for convenience
pub use error::AppError;
pub use port::{
    wrap, LoggedPort, MockSerialPort, OpenFn, PortConfiguration, PortError, PortOpener,
    SerialPortAdapter, SyncSerialPort,
};
pub use trace::{CallRecord, PayloadSummary, TraceRecorder};

// Re-export config types
pub use config::{Config, ConfigError, ConfigLoader, ConfigResult};
