use clap::Parser;
use serial_debug::config::{ConfigLoader, SerialConfig};
use serial_debug::port::{
    wrap, LoggedPort, MockSerialPort, PortConfiguration, PortError, SerialPortAdapter,
    SyncSerialPort,
};
use serial_debug::trace::{CallRecord, TraceRecorder};
use serial_debug::{logging, AppError};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    name = "serial-debug",
    version,
    about = "Open a serial port through a logging decorator and print the call trace.",
    long_about = "Every operation performed on the port (open, timeouts, control lines, reads, writes, close) is delegated unchanged and recorded. The recorded trace is printed to stdout when the session ends; diagnostics go to stderr."
)]
struct Args {
    /// Serial port to open (overrides serial.port from the configuration).
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate (overrides serial.baud_rate).
    #[arg(short, long)]
    baud: Option<u32>,

    /// Use an in-memory echo port instead of hardware.
    #[arg(long, conflicts_with = "port")]
    mock: bool,

    /// List available serial ports and exit.
    #[arg(long)]
    list: bool,

    /// Configuration file to load instead of the standard locations.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Drive the DTR line.
    #[arg(long)]
    dtr: Option<bool>,

    /// Drive the RTS line.
    #[arg(long)]
    rts: Option<bool>,

    /// Discard both port buffers before transferring.
    #[arg(long)]
    reset: bool,

    /// Text to write to the port.
    #[arg(short, long)]
    write: Option<String>,

    /// Number of bytes to read after writing.
    #[arg(short, long)]
    read: Option<usize>,

    /// Print the trace as JSON instead of one line per call.
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), AppError> {
    let loader = match &args.config {
        Some(path) => ConfigLoader::load_from(path)?,
        None => ConfigLoader::load()?,
    };
    let config = loader.into_config();
    logging::init_tracing(&config.logging).map_err(|e| AppError::Logging(e.to_string()))?;

    if args.list {
        let ports = serialport::available_ports().map_err(PortError::from)?;
        for port in ports {
            println!("{}", port.port_name);
        }
        return Ok(());
    }

    let recorder = Arc::new(TraceRecorder::with_config(&config.trace));

    if args.mock {
        let mut mock = MockSerialPort::echo("mock");
        if let Some(text) = &args.write {
            mock.enqueue_read(text.as_bytes());
        }
        let open = wrap(move || Ok(mock.clone()), Arc::clone(&recorder));
        return trace_session(open, &recorder, &args, &config.serial);
    }

    let requested = args
        .port
        .clone()
        .or_else(|| config.serial.port.clone())
        .ok_or(AppError::NoPortSpecified)?;
    let name = config.serial.resolve_port(&requested);
    let port_config = PortConfiguration {
        baud_rate: args.baud.unwrap_or(config.serial.baud_rate),
        timeout: config.serial.read_timeout(),
    };
    info!(port = %name, baud = port_config.baud_rate, "opening serial port");

    let open = wrap(
        move || SyncSerialPort::open(&name, port_config.clone()),
        Arc::clone(&recorder),
    );
    trace_session(open, &recorder, &args, &config.serial)
}

/// Run one session inside a capture window and print what was recorded.
///
/// The trace is printed even when the session fails part way.
fn trace_session<F, P>(
    mut open: F,
    recorder: &TraceRecorder,
    args: &Args,
    serial: &SerialConfig,
) -> Result<(), AppError>
where
    F: FnMut() -> Result<LoggedPort<P>, PortError>,
    P: SerialPortAdapter,
{
    recorder.start();
    let outcome = drive(&mut open, args, serial);
    let records = recorder.stop();
    print_records(&records, args.json)?;
    outcome
}

fn drive<F, P>(open: &mut F, args: &Args, serial: &SerialConfig) -> Result<(), AppError>
where
    F: FnMut() -> Result<LoggedPort<P>, PortError>,
    P: SerialPortAdapter,
{
    let mut port = open()?;
    let transferred = transfer(&mut port, args, serial);
    let closed = port.close();
    transferred?;
    closed?;
    Ok(())
}

fn transfer<P: SerialPortAdapter>(
    port: &mut LoggedPort<P>,
    args: &Args,
    serial: &SerialConfig,
) -> Result<(), PortError> {
    if serial.inter_byte_timeout_ms > 0 {
        port.set_read_timeout_ex(serial.read_timeout(), serial.inter_byte_timeout())?;
    } else {
        port.set_read_timeout(serial.read_timeout())?;
    }
    if serial.first_byte_timeout_ms > 0 {
        port.set_first_byte_read_timeout(serial.first_byte_timeout())?;
    }
    port.set_write_timeout(serial.write_timeout())?;

    if let Some(level) = args.dtr {
        port.set_dtr(level)?;
    }
    if let Some(level) = args.rts {
        port.set_rts(level)?;
    }
    if args.reset {
        port.reset_input_buffer()?;
        port.reset_output_buffer()?;
    }

    if let Some(text) = &args.write {
        let written = port.write_bytes(text.as_bytes())?;
        info!(bytes = written, "wrote to port");
    }

    if let Some(len) = args.read {
        let available = port.ready_to_read()?;
        let mut buffer = vec![0u8; len];
        let received = port.read_bytes(&mut buffer)?;
        info!(bytes = received, available, "read from port");
    }

    Ok(())
}

fn print_records(records: &[CallRecord], json: bool) -> Result<(), AppError> {
    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
    } else {
        for record in records {
            println!("{record}");
        }
    }
    Ok(())
}
