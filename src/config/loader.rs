//! Configuration loader with file resolution and environment override support.

use super::error::{ConfigError, ConfigResult};
use super::schema::Config;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable prefix for overrides
const ENV_PREFIX: &str = "SERIAL_DEBUG";

/// Config file name
const CONFIG_FILE_NAME: &str = "serial-debug.toml";

/// Environment variable for explicit config path
const CONFIG_PATH_ENV: &str = "SERIAL_DEBUG_CONFIG";

/// Configuration loader with resolution and override logic.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Resolved config file path (if any)
    pub config_path: Option<PathBuf>,
    /// The loaded configuration
    pub config: Config,
}

impl ConfigLoader {
    /// Load configuration using standard resolution order.
    ///
    /// Resolution priority (highest to lowest):
    /// 1. `SERIAL_DEBUG_CONFIG` environment variable (explicit path)
    /// 2. `./serial-debug.toml` (current directory)
    /// 3. the platform config directory (`~/.config/serial-debug/` on Linux)
    /// 4. Built-in defaults (no file required)
    ///
    /// Environment variables can override any config file values.
    pub fn load() -> ConfigResult<Self> {
        let config_path = resolve_config_path();

        let mut config = if let Some(ref path) = config_path {
            load_from_file(path)?
        } else {
            Config::default()
        };

        apply_env_overrides(&mut config)?;
        config.validate()?;

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut config = load_from_file(&path)?;
        apply_env_overrides(&mut config)?;
        config.validate()?;

        Ok(Self {
            config_path: Some(path),
            config,
        })
    }

    /// Create a loader with default configuration (no file).
    ///
    /// Environment overrides still apply and are validated like a loaded file.
    pub fn with_defaults() -> ConfigResult<Self> {
        let mut config = Config::default();
        apply_env_overrides(&mut config)?;
        config.validate()?;

        Ok(Self {
            config_path: None,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> Config {
        self.config
    }

    /// Save the current configuration to a specific file.
    pub fn save_to(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        save_to_file(&self.config, path.as_ref())
    }
}

/// Resolve the configuration file path using standard locations.
pub fn resolve_config_path() -> Option<PathBuf> {
    // 1. Explicit environment variable
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. Current directory
    let cwd_config = PathBuf::from(CONFIG_FILE_NAME);
    if cwd_config.exists() {
        return Some(cwd_config);
    }

    // 3. Platform config directory
    if let Some(app_config) = get_default_config_path() {
        if app_config.exists() {
            return Some(app_config);
        }
    }

    None
}

/// Get the default config directory for creating new config files.
pub fn get_default_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "serial-debug").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the default config file path for creating new config files.
pub fn get_default_config_path() -> Option<PathBuf> {
    get_default_config_dir().map(|d| d.join(CONFIG_FILE_NAME))
}

/// Load configuration from a file.
fn load_from_file(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&content).map_err(ConfigError::ParseError)
}

/// Save configuration to a file.
fn save_to_file(config: &Config, path: &Path) -> ConfigResult<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|e| ConfigError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Read `SERIAL_DEBUG_<key>` and parse it, if set.
fn env_override<T: FromStr>(key: &str, what: &str) -> ConfigResult<Option<T>> {
    let var = format!("{}_{}", ENV_PREFIX, key);
    match std::env::var(&var) {
        Ok(val) => val
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::env_parse(var, format!("Invalid {what}"))),
        Err(_) => Ok(None),
    }
}

/// Apply environment variable overrides to the configuration.
///
/// Environment variables follow the pattern: `SERIAL_DEBUG_<SECTION>_<KEY>`
/// For example:
/// - `SERIAL_DEBUG_SERIAL_PORT=/dev/ttyUSB0`
/// - `SERIAL_DEBUG_SERIAL_BAUD_RATE=9600`
/// - `SERIAL_DEBUG_TRACE_PREVIEW_BYTES=64`
fn apply_env_overrides(config: &mut Config) -> ConfigResult<()> {
    // Serial overrides
    if let Some(port) = env_override::<String>("SERIAL_PORT", "port name")? {
        config.serial.port = Some(port);
    }
    if let Some(baud) = env_override("SERIAL_BAUD_RATE", "baud rate")? {
        config.serial.baud_rate = baud;
    }
    if let Some(ms) = env_override("SERIAL_READ_TIMEOUT_MS", "timeout")? {
        config.serial.read_timeout_ms = ms;
    }
    if let Some(ms) = env_override("SERIAL_INTER_BYTE_TIMEOUT_MS", "timeout")? {
        config.serial.inter_byte_timeout_ms = ms;
    }
    if let Some(ms) = env_override("SERIAL_FIRST_BYTE_TIMEOUT_MS", "timeout")? {
        config.serial.first_byte_timeout_ms = ms;
    }
    if let Some(ms) = env_override("SERIAL_WRITE_TIMEOUT_MS", "timeout")? {
        config.serial.write_timeout_ms = ms;
    }

    // Trace overrides
    if let Some(capacity) = env_override("TRACE_CAPACITY", "record capacity")? {
        config.trace.capacity = capacity;
    }
    if let Some(bytes) = env_override("TRACE_PREVIEW_BYTES", "preview size")? {
        config.trace.preview_bytes = bytes;
    }
    if let Some(max) = env_override("TRACE_MAX_RECORDS", "record limit")? {
        config.trace.max_records = Some(max);
    }

    // Logging overrides
    if let Some(level) = env_override::<String>("LOGGING_LEVEL", "log level")? {
        config.logging.level = level;
    }
    if let Some(format) = env_override("LOGGING_FORMAT", "log format")? {
        config.logging.format = format;
    }

    Ok(())
}
