//! Port-specific error types.
//!
//! Transport failures come from the wrapped port and are passed through
//! untouched. Lifecycle misuse (`AlreadyOpen`, `AlreadyClosed`) is raised by the
//! logging layer itself so callers can tell configuration bugs apart from
//! hardware trouble.

use thiserror::Error;

/// Errors that can occur during serial port operations.
#[derive(Debug, Error)]
pub enum PortError {
    /// The specified serial port was not found on the system.
    #[error("Serial port not found: {0}")]
    NotFound(String),

    /// An I/O error occurred during port operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A read or write moved some bytes before failing.
    #[error("I/O error after {transferred} byte(s): {source}")]
    Partial {
        transferred: usize,
        #[source]
        source: std::io::Error,
    },

    /// Port configuration failed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation timed out.
    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The wrapped port is still open and cannot be opened again.
    #[error("wrapped port already opened")]
    AlreadyOpen,

    /// The wrapped port has been closed; nothing is delegated any more.
    #[error("wrapped port already closed")]
    AlreadyClosed,

    /// A serialport-specific error occurred.
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

impl PortError {
    /// Create a NotFound error from a port name.
    pub fn not_found(port_name: impl Into<String>) -> Self {
        Self::NotFound(port_name.into())
    }

    /// Create a Config error from a message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a Timeout error from a duration.
    pub fn timeout(duration: std::time::Duration) -> Self {
        Self::Timeout(duration)
    }

    /// Create a Partial error for a transfer that stopped after `transferred` bytes.
    pub fn partial(transferred: usize, source: std::io::Error) -> Self {
        Self::Partial {
            transferred,
            source,
        }
    }

    /// True for errors raised by the logging layer rather than the port.
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, Self::AlreadyOpen | Self::AlreadyClosed)
    }

    /// Bytes moved before the failure, zero for anything but `Partial`.
    pub fn transferred(&self) -> usize {
        match self {
            Self::Partial { transferred, .. } => *transferred,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PortError::not_found("/dev/ttyUSB0");
        assert_eq!(err.to_string(), "Serial port not found: /dev/ttyUSB0");

        let err = PortError::config("Invalid baud rate");
        assert_eq!(err.to_string(), "Configuration error: Invalid baud rate");

        assert_eq!(PortError::AlreadyOpen.to_string(), "wrapped port already opened");
        assert_eq!(PortError::AlreadyClosed.to_string(), "wrapped port already closed");
    }

    #[test]
    fn test_timeout_error() {
        let duration = std::time::Duration::from_millis(500);
        let err = PortError::timeout(duration);
        assert!(err.to_string().contains("500ms"));
    }

    #[test]
    fn test_lifecycle_classification() {
        assert!(PortError::AlreadyOpen.is_lifecycle());
        assert!(PortError::AlreadyClosed.is_lifecycle());
        assert!(!PortError::timeout(std::time::Duration::from_millis(1)).is_lifecycle());
        assert!(!PortError::not_found("COM9").is_lifecycle());
    }

    #[test]
    fn test_partial_transfer_count() {
        let err = PortError::partial(
            7,
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "line dropped"),
        );
        assert_eq!(err.transferred(), 7);
        assert!(err.to_string().contains("after 7 byte(s)"));
        assert_eq!(PortError::AlreadyClosed.transferred(), 0);
    }
}
