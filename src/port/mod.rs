//! Port abstraction layer for serial communication.
//!
//! Provides the capability trait every port implements, a real backend over
//! `serialport`, a mock for tests, and the logging decorator with its opener.

pub mod error;
pub mod logged;
pub mod mock;
pub mod opener;
pub mod sync_port;
pub mod traits;

pub use error::PortError;
pub use logged::LoggedPort;
pub use mock::MockSerialPort;
pub use opener::{wrap, OpenFn, PortOpener};
pub use sync_port::SyncSerialPort;
pub use traits::*;
