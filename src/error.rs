use crate::config::ConfigError;
use crate::port::PortError;
use std::fmt;

/// Unified application error type for the `serial-debug` binary.
///
/// Library calls return `PortError` or `ConfigError`; this type gathers them
/// so `main` can propagate everything with `?`.
#[derive(Debug)]
pub enum AppError {
    /// No port given on the command line or in the configuration.
    NoPortSpecified,
    Port(PortError),
    Config(ConfigError),
    Logging(String),
    IoError(std::io::Error),
    SerdeError(serde_json::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPortSpecified => write!(
                f,
                "No serial port specified. Pass --port, use --mock, or set serial.port in the configuration."
            ),
            Self::Port(e) => write!(f, "A serial port error occurred: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Logging(e) => write!(f, "Failed to initialize logging: {e}"),
            Self::IoError(e) => write!(f, "An I/O error occurred: {e}"),
            Self::SerdeError(e) => write!(f, "A serialization error occurred: {e}"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Port(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::IoError(e) => Some(e),
            Self::SerdeError(e) => Some(e),
            Self::NoPortSpecified | Self::Logging(_) => None,
        }
    }
}

// Implement `From` conversions to allow the `?` operator to work seamlessly.
impl From<PortError> for AppError {
    fn from(err: PortError) -> Self {
        AppError::Port(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::SerdeError(err)
    }
}
