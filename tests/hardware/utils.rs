//! Utility functions for hardware testing.
//!
//! Provides helpers for port discovery, opening real ports behind the logging
//! decorator, and timing assertions.

#![allow(clippy::field_reassign_with_default)]

use serial_debug::port::{wrap, LoggedPort, PortConfiguration, PortError, SyncSerialPort};
use serial_debug::trace::TraceRecorder;
use serialport::{available_ports, SerialPortInfo};
use std::env;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Test port configuration from environment.
pub struct TestPortConfig {
    pub port_name: String,
    pub baud_rate: u32,
    pub loopback_enabled: bool,
}

impl TestPortConfig {
    /// Get test configuration from environment variables.
    pub fn from_env() -> Option<Self> {
        let port_name = env::var("TEST_PORT").ok()?;
        let baud_rate = env::var("TEST_BAUD")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(9600);
        let loopback_enabled = env::var("TEST_LOOPBACK").ok().as_deref() == Some("1");

        Some(TestPortConfig {
            port_name,
            baud_rate,
            loopback_enabled,
        })
    }

    /// Create a port configuration for testing.
    pub fn to_port_config(&self) -> PortConfiguration {
        let mut config = PortConfiguration::default();
        config.baud_rate = self.baud_rate;
        config.timeout = Duration::from_millis(1000);
        config
    }

    /// Factory for the configured port, wrapped so every call lands in `recorder`.
    pub fn logged_opener(
        &self,
        recorder: &Arc<TraceRecorder>,
    ) -> impl FnMut() -> Result<LoggedPort<SyncSerialPort>, PortError> {
        let name = self.port_name.clone();
        let config = self.to_port_config();
        wrap(
            move || SyncSerialPort::open(&name, config.clone()),
            Arc::clone(recorder),
        )
    }
}

/// Discover all available serial ports on the system.
pub fn discover_available_ports() -> Vec<SerialPortInfo> {
    available_ports().unwrap_or_default()
}

/// Check if a specific port is available.
pub fn is_port_available(port_name: &str) -> bool {
    discover_available_ports()
        .iter()
        .any(|p| p.port_name == port_name)
}

/// Timing helper for measuring operation duration.
pub struct TimingHelper {
    start: Instant,
    name: String,
}

impl TimingHelper {
    pub fn new(name: &str) -> Self {
        println!("Starting: {}", name);
        TimingHelper {
            start: Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn finish(self) -> Duration {
        let elapsed = self.elapsed();
        println!("Completed: {} in {:?}", self.name, elapsed);
        elapsed
    }
}

/// Skip test with a clear message if hardware is not available.
#[macro_export]
macro_rules! skip_without_hardware {
    () => {
        match $crate::hardware::utils::TestPortConfig::from_env() {
            Some(config) => config,
            None => {
                println!("Skipping: TEST_PORT environment variable not set");
                println!("   Set TEST_PORT=COM3 (or /dev/ttyUSB0) to run hardware tests");
                return;
            }
        }
    };
}

/// Assert that duration is within expected range.
pub fn assert_duration_within(
    actual: Duration,
    expected: Duration,
    tolerance: Duration,
    message: &str,
) {
    let lower = expected.saturating_sub(tolerance);
    let upper = expected + tolerance;

    assert!(
        actual >= lower && actual <= upper,
        "{}: expected {:?} ± {:?}, got {:?}",
        message,
        expected,
        tolerance,
        actual
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_ports() {
        // Should not panic; the count depends on the machine.
        let ports = discover_available_ports();
        println!("Found {} ports", ports.len());
    }

    #[test]
    fn test_timing_helper() {
        let timer = TimingHelper::new("test operation");
        std::thread::sleep(Duration::from_millis(10));
        let elapsed = timer.finish();
        assert!(elapsed >= Duration::from_millis(10));
    }

    #[test]
    fn test_assert_duration_within() {
        assert_duration_within(
            Duration::from_millis(100),
            Duration::from_millis(95),
            Duration::from_millis(10),
            "should be within tolerance",
        );
    }

    #[test]
    #[should_panic]
    fn test_assert_duration_out_of_range() {
        assert_duration_within(
            Duration::from_millis(200),
            Duration::from_millis(100),
            Duration::from_millis(10),
            "should panic",
        );
    }
}
