//! Tests requiring actual serial hardware.
//!
//! These tests are skipped if no hardware is available.
//!
//! # Running Hardware Tests
//!
//! ```bash
//! # Set environment variables
//! export TEST_PORT=COM3                  # or /dev/ttyUSB0 on Linux
//! export TEST_BAUD=9600                  # optional, default: 9600
//! export TEST_LOOPBACK=1                 # if port has TX-RX loopback
//!
//! # Run tests
//! cargo test --features hardware-tests -- --ignored
//! ```
//!
//! # Hardware Requirements
//!
//! - **Real port tests**: Any available serial port
//! - **Loopback tests**: Port with TX and RX connected together

use super::utils::{assert_duration_within, is_port_available, TimingHelper};
use crate::common::{ops, started_recorder};
use serial_debug::port::{PortError, SerialPortAdapter};
use std::time::Duration;

#[test]
#[ignore] // Run with --ignored flag
fn test_real_port_open_close_is_traced() {
    let config = crate::skip_without_hardware!();
    println!(
        "Testing port: {} at {} baud",
        config.port_name, config.baud_rate
    );
    assert!(is_port_available(&config.port_name));

    let recorder = started_recorder();
    let mut open = config.logged_opener(&recorder);

    let mut port = open().expect("port should open");
    assert_eq!(port.name(), config.port_name);
    port.close().expect("port should close");

    let records = recorder.stop();
    assert_eq!(ops(&records), vec!["open", "close"]);
    assert!(records.iter().all(|r| r.is_ok()));
}

#[test]
#[ignore]
fn test_real_port_double_open_refused() {
    let config = crate::skip_without_hardware!();
    let recorder = started_recorder();
    let mut open = config.logged_opener(&recorder);

    let mut port = open().expect("port should open");
    assert!(matches!(open(), Err(PortError::AlreadyOpen)));
    port.close().expect("port should close");

    // Released by the close above.
    let mut port = open().expect("port should reopen");
    port.close().expect("port should close");

    assert_eq!(
        ops(&recorder.stop()),
        vec!["open", "open", "close", "open", "close"]
    );
}

#[test]
#[ignore]
fn test_real_port_control_lines_and_buffers() {
    let config = crate::skip_without_hardware!();
    let recorder = started_recorder();
    let mut open = config.logged_opener(&recorder);
    let mut port = open().expect("port should open");

    port.set_dtr(true).expect("set DTR");
    port.set_rts(true).expect("set RTS");
    port.reset_input_buffer().expect("reset input");
    port.reset_output_buffer().expect("reset output");
    let available = port.ready_to_read().expect("query input queue");
    println!("Bytes waiting after reset: {}", available);
    port.close().expect("port should close");

    let records = recorder.stop();
    assert_eq!(
        ops(&records),
        vec![
            "open",
            "set_dtr",
            "set_rts",
            "reset_input_buffer",
            "reset_output_buffer",
            "ready_to_read",
            "close",
        ]
    );
}

#[test]
#[ignore]
fn test_real_port_read_timeout_is_recorded() {
    let config = crate::skip_without_hardware!();
    if config.loopback_enabled {
        println!("Skipping: loopback adapter would echo stray bytes");
        return;
    }

    let recorder = started_recorder();
    let mut open = config.logged_opener(&recorder);
    let mut port = open().expect("port should open");
    port.set_read_timeout(Duration::from_millis(200))
        .expect("set read timeout");
    port.reset_input_buffer().expect("reset input");

    let timer = TimingHelper::new("read with no data");
    let result = port.read_bytes(&mut [0u8; 16]);
    let elapsed = timer.finish();
    assert!(result.is_err(), "no data expected, got {:?}", result);
    assert_duration_within(
        elapsed,
        Duration::from_millis(200),
        Duration::from_millis(150),
        "read should give up near the configured timeout",
    );
    port.close().expect("port should close");

    let records = recorder.stop();
    let read = records.iter().find(|r| r.op == "read").expect("read record");
    assert!(read.error.is_some());
    assert_eq!(read.payload.as_ref().map(|p| p.transferred), Some(0));
}

#[test]
#[ignore]
fn test_real_port_loopback_communication() {
    let config = crate::skip_without_hardware!();
    if !config.loopback_enabled {
        println!("Skipping: TEST_LOOPBACK not set to 1");
        println!("   This test requires a loopback adapter (TX connected to RX)");
        return;
    }

    let recorder = started_recorder();
    let mut open = config.logged_opener(&recorder);
    let mut port = open().expect("port should open");
    port.reset_input_buffer().expect("reset input");

    let message = b"serial-debug loopback";
    assert_eq!(port.write_bytes(message).expect("write"), message.len());
    std::thread::sleep(Duration::from_millis(100));

    let mut buffer = [0u8; 64];
    let mut received = 0;
    while received < message.len() {
        match port.read_bytes(&mut buffer[received..]) {
            Ok(n) => received += n,
            Err(e) => panic!("loopback read failed after {} bytes: {}", received, e),
        }
    }
    assert_eq!(&buffer[..received], message);
    port.close().expect("port should close");

    let records = recorder.stop();
    let write = records.iter().find(|r| r.op == "write").expect("write record");
    let payload = write.payload.as_ref().expect("write payload");
    assert_eq!(payload.transferred, message.len());
    assert_eq!(payload.text, "serial-debug loopback");
}
