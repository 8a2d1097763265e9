//! Device backend — the only code that touches hardware.
//!
//! [`DevicePort`] is the hexagonal boundary: the command server, the
//! simulated backend, the Raspberry Pi backend, and the test mocks all
//! meet at this trait.
//!
//! The backend is a process-wide shared resource. Rather than bolting a
//! lock onto it, all access runs through a dedicated single-threaded
//! [`DeviceWorker`] reached via a message channel — cross-session
//! interleavings become a deterministic queue order, and backend
//! implementations stay free of synchronisation concerns.
//!
//! ```text
//!  session 1 ──┐
//!  session 2 ──┼──▶ DeviceHandle ──channel──▶ worker thread ──▶ DevicePort
//!  session N ──┘                                                (hardware)
//! ```

pub mod mpu6050;
#[cfg(feature = "rpi")]
pub mod rpi;
pub mod sim;

use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use log::info;

use crate::error::DeviceError;
use crate::protocol::{ChannelId, Level, Unit};

// ── Port trait ─────────────────────────────────────────────

/// A sensor value with its physical unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub value: f64,
    pub unit: Unit,
}

/// The device backend port. Operations are synchronous I/O and may
/// briefly block; callers must not hold latency-sensitive locks across
/// them.
pub trait DevicePort {
    /// Read one sensor channel. The channel set is closed, so an unknown
    /// channel cannot reach an implementation through the protocol path.
    fn read(&mut self, channel: ChannelId) -> Result<Reading, DeviceError>;

    /// Drive a digital output line. Implementations establish the line as
    /// an output first, then apply the level.
    fn write(&mut self, line: u8, level: Level) -> Result<(), DeviceError>;
}

// ── Hardware-access worker ─────────────────────────────────

enum WorkerRequest {
    Read {
        channel: ChannelId,
        reply: Sender<Result<Reading, DeviceError>>,
    },
    Write {
        line: u8,
        level: Level,
        reply: Sender<Result<(), DeviceError>>,
    },
}

/// Cloneable handle to the hardware-access worker. Every session holds
/// one; requests are serialised in arrival order on the worker thread.
#[derive(Clone)]
pub struct DeviceHandle {
    tx: Sender<WorkerRequest>,
}

impl DeviceHandle {
    pub fn read(&self, channel: ChannelId) -> Result<Reading, DeviceError> {
        let (reply, rx) = mpsc::channel();
        self.tx
            .send(WorkerRequest::Read { channel, reply })
            .map_err(|_| DeviceError::WorkerGone)?;
        rx.recv().map_err(|_| DeviceError::WorkerGone)?
    }

    pub fn write(&self, line: u8, level: Level) -> Result<(), DeviceError> {
        let (reply, rx) = mpsc::channel();
        self.tx
            .send(WorkerRequest::Write { line, level, reply })
            .map_err(|_| DeviceError::WorkerGone)?;
        rx.recv().map_err(|_| DeviceError::WorkerGone)?
    }
}

/// Owns the worker thread. Dropping every [`DeviceHandle`] lets the
/// thread drain its queue and exit.
pub struct DeviceWorker {
    thread: JoinHandle<()>,
}

impl DeviceWorker {
    /// Spawn the worker around a concrete backend and hand out the first
    /// handle.
    pub fn spawn(mut backend: impl DevicePort + Send + 'static) -> (DeviceHandle, DeviceWorker) {
        let (tx, rx) = mpsc::channel::<WorkerRequest>();
        let thread = thread::Builder::new()
            .name("device-worker".to_string())
            .spawn(move || {
                for request in rx {
                    match request {
                        WorkerRequest::Read { channel, reply } => {
                            // A session that vanished mid-request is not an error.
                            let _ = reply.send(backend.read(channel));
                        }
                        WorkerRequest::Write { line, level, reply } => {
                            let _ = reply.send(backend.write(line, level));
                        }
                    }
                }
                info!("device worker: all handles dropped, exiting");
            })
            .expect("spawning the device worker cannot fail");
        (DeviceHandle { tx }, DeviceWorker { thread })
    }

    /// Wait for the worker to finish (after all handles are gone).
    pub fn join(self) {
        let _ = self.thread.join();
    }
}
