//! Configuration module for serial-debug.
//!
//! This module provides TOML-based configuration with environment variable overrides.
//!
//! # Configuration Resolution
//!
//! Configuration is loaded from the following locations (in order of priority):
//!
//! 1. `SERIAL_DEBUG_CONFIG` environment variable (explicit path)
//! 2. `./serial-debug.toml` (current directory)
//! 3. The platform config directory, e.g. `~/.config/serial-debug/serial-debug.toml`
//! 4. Built-in defaults (no file required)
//!
//! # Environment Overrides
//!
//! Values can be overridden via environment variables following the pattern
//! `SERIAL_DEBUG_<SECTION>_<KEY>`, e.g. `SERIAL_DEBUG_SERIAL_PORT=/dev/ttyUSB0`
//! or `SERIAL_DEBUG_TRACE_PREVIEW_BYTES=64`.
//!
//! # Example
//!
//! ```rust,ignore
//! use serial_debug::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load()?;
//! let config = loader.config();
//! println!("Preview bytes: {}", config.trace.preview_bytes);
//! ```

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    get_default_config_dir, get_default_config_path, resolve_config_path, ConfigLoader,
};
pub use schema::{Config, LogFormat, LoggingConfig, SerialConfig, TraceConfig};
