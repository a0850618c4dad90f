use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use serial_debug::port::{LoggedPort, MockSerialPort, SerialPortAdapter};
use serial_debug::trace::TraceRecorder;
use std::sync::Arc;
use std::time::Duration;

const FRAME: &[u8] = b"ATZ\r\nAT+CGMI\r\nAT+CGMM\r\nAT+CGSN\r\n";

pub fn bench_write_overhead(c: &mut Criterion) {
    let mut raw = MockSerialPort::echo("BENCH0");
    c.bench_function("write_raw", |b| {
        b.iter(|| {
            raw.clear_write_log();
            black_box(raw.write_bytes(black_box(FRAME)).unwrap());
        })
    });

    let recorder = Arc::new(TraceRecorder::default());
    let mut mock = MockSerialPort::echo("BENCH0");
    let mut idle = LoggedPort::new(mock.clone(), Arc::clone(&recorder));
    c.bench_function("write_logged_idle", |b| {
        b.iter(|| {
            mock.clear_write_log();
            black_box(idle.write_bytes(black_box(FRAME)).unwrap());
        })
    });

    let recorder = Arc::new(TraceRecorder::default().with_max_records(1024));
    let mut mock = MockSerialPort::echo("BENCH0");
    let mut active = LoggedPort::new(mock.clone(), Arc::clone(&recorder));
    recorder.start();
    c.bench_function("write_logged_recording", |b| {
        b.iter(|| {
            mock.clear_write_log();
            black_box(active.write_bytes(black_box(FRAME)).unwrap());
        })
    });
    recorder.stop();
}

pub fn bench_control_calls(c: &mut Criterion) {
    let recorder = Arc::new(TraceRecorder::default().with_max_records(1024));
    let mut port = LoggedPort::new(MockSerialPort::echo("BENCH0"), Arc::clone(&recorder));
    recorder.start();
    c.bench_function("set_read_timeout_logged", |b| {
        b.iter(|| port.set_read_timeout(black_box(Duration::from_millis(100))).unwrap())
    });
    recorder.stop();
}

criterion_group!{
    name = benches;
    config = Criterion::default()
        .warm_up_time(Duration::from_millis(300))
        .measurement_time(Duration::from_secs(2));
    targets = bench_write_overhead, bench_control_calls
}
criterion_main!(benches);
