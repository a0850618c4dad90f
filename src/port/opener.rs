//! Opener wrapper: turns a raw port factory into one that yields logged ports.

use super::error::PortError;
use super::logged::LoggedPort;
use super::traits::SerialPortAdapter;
use crate::trace::TraceRecorder;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Boxed port factory for call sites that store factories dynamically.
pub type OpenFn = Box<dyn FnMut() -> Result<Box<dyn SerialPortAdapter>, PortError> + Send>;

/// Marks a `PortOpener`'s port as open for as long as it lives.
#[derive(Debug)]
pub(crate) struct OpenLease(Arc<AtomicBool>);

impl Drop for OpenLease {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Opens ports through a factory and hands them out wrapped in [`LoggedPort`].
///
/// Only one port produced by an opener can be open at a time. Until that
/// port is closed or dropped, `open` fails with [`PortError::AlreadyOpen`]
/// without calling the factory. Each successful `open` calls the factory
/// exactly once; there are no retries.
pub struct PortOpener<F> {
    open: F,
    recorder: Arc<TraceRecorder>,
    in_use: Arc<AtomicBool>,
}

impl<F> PortOpener<F> {
    pub fn new(open: F, recorder: Arc<TraceRecorder>) -> Self {
        Self {
            open,
            recorder,
            in_use: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn recorder(&self) -> &Arc<TraceRecorder> {
        &self.recorder
    }

    /// True while the last port handed out is neither closed nor dropped.
    pub fn is_port_open(&self) -> bool {
        self.in_use.load(Ordering::Acquire)
    }

    /// Call the factory and wrap the port it produces.
    ///
    /// The attempt is recorded as `open`, including refusals and factory
    /// failures. On failure no decorator is created and the error is
    /// returned unchanged.
    pub fn open<P>(&mut self) -> Result<LoggedPort<P>, PortError>
    where
        F: FnMut() -> Result<P, PortError>,
        P: SerialPortAdapter,
    {
        let in_use = &self.in_use;
        let open = &mut self.open;
        let result = self.recorder.log_with(
            "open",
            None,
            || {
                if in_use.load(Ordering::Acquire) {
                    return Err(PortError::AlreadyOpen);
                }
                open()
            },
            |port: &P| Some(json!(port.name())),
        );

        let port = match result {
            Ok(port) => port,
            Err(err) => {
                if err.is_lifecycle() {
                    warn!(error = %err, "open refused");
                } else {
                    warn!(error = %err, "port factory failed");
                }
                return Err(err);
            }
        };

        info!(port = port.name(), "port opened");
        self.in_use.store(true, Ordering::Release);
        let lease = OpenLease(Arc::clone(&self.in_use));
        Ok(LoggedPort::new(port, Arc::clone(&self.recorder)).with_lease(lease))
    }

    /// Convert into a boxed factory yielding type-erased logged ports.
    pub fn into_boxed<P>(mut self) -> OpenFn
    where
        F: FnMut() -> Result<P, PortError> + Send + 'static,
        P: SerialPortAdapter + 'static,
    {
        Box::new(move || {
            self.open()
                .map(|port| Box::new(port) as Box<dyn SerialPortAdapter>)
        })
    }
}

impl<F> std::fmt::Debug for PortOpener<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortOpener")
            .field("port_open", &self.is_port_open())
            .field("recorder", &self.recorder)
            .finish()
    }
}

/// Adapt a raw port factory into one that returns logged ports.
///
/// The returned factory behaves like [`PortOpener::open`]: it calls `open`
/// at most once per invocation and refuses while its previous port is open.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use serial_debug::port::{wrap, MockSerialPort, PortError, SerialPortAdapter};
/// use serial_debug::trace::TraceRecorder;
///
/// let recorder = Arc::new(TraceRecorder::new(8));
/// let mut open = wrap(|| Ok::<_, PortError>(MockSerialPort::echo("fakeport")), Arc::clone(&recorder));
///
/// recorder.start();
/// let mut port = open().unwrap();
/// port.close().unwrap();
/// let records = recorder.stop();
///
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[0].op, "open");
/// assert_eq!(records[1].op, "close");
/// assert!(records.iter().all(|r| r.is_ok()));
/// ```
pub fn wrap<F, P>(
    open: F,
    recorder: Arc<TraceRecorder>,
) -> impl FnMut() -> Result<LoggedPort<P>, PortError>
where
    F: FnMut() -> Result<P, PortError>,
    P: SerialPortAdapter,
{
    let mut opener = PortOpener::new(open, recorder);
    move || opener.open()
}
