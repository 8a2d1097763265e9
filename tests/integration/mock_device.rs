//! Mock device backend for integration tests.
//!
//! Records every read and write so tests can assert on the full call
//! history. The backend itself moves into the device worker thread, so
//! the call log is shared through an `Arc<Mutex<..>>` handle cloned
//! before spawning.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use remoteio::device::{DevicePort, Reading};
use remoteio::error::DeviceError;
use remoteio::protocol::{ChannelId, Level, Unit};

#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    Read(ChannelId),
    Write { line: u8, level: u8 },
}

pub type CallLog = Arc<Mutex<Vec<DeviceCall>>>;

pub struct MockDevice {
    calls: CallLog,
    readings: HashMap<ChannelId, f64>,
    fail_reads: bool,
}

#[allow(dead_code)]
impl MockDevice {
    pub fn new() -> (Self, CallLog) {
        let calls: CallLog = Arc::default();
        (
            Self {
                calls: Arc::clone(&calls),
                readings: HashMap::new(),
                fail_reads: false,
            },
            calls,
        )
    }

    /// Program the value a channel read will return.
    pub fn with_reading(mut self, channel: ChannelId, value: f64) -> Self {
        self.readings.insert(channel, value);
        self
    }

    /// Make every read report a bus fault.
    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }
}

/// Wire a full server stack around `device` and return a client talking
/// to it over an in-memory channel. The session thread and device
/// worker wind down when the returned client drops.
#[allow(dead_code)]
pub fn spawn_session(device: MockDevice, max_line: u8) -> remoteio::client::CommandClient {
    let (client_end, server_end) = remoteio::transport::in_memory_pair();
    let (handle, _worker) = remoteio::device::DeviceWorker::spawn(device);
    std::thread::Builder::new()
        .name("test-session".into())
        .spawn(move || {
            remoteio::server::session::run(server_end, &handle, max_line, "in-memory");
        })
        .unwrap();
    remoteio::client::CommandClient::from_channel(Box::new(client_end))
}

impl DevicePort for MockDevice {
    fn read(&mut self, channel: ChannelId) -> Result<Reading, DeviceError> {
        self.calls.lock().unwrap().push(DeviceCall::Read(channel));
        if self.fail_reads {
            return Err(DeviceError::Bus("mock bus fault".into()));
        }
        Ok(Reading {
            value: self.readings.get(&channel).copied().unwrap_or(0.0),
            unit: if channel.is_angular() {
                Unit::DegreesPerSecond
            } else {
                Unit::MetresPerSecondSquared
            },
        })
    }

    fn write(&mut self, line: u8, level: Level) -> Result<(), DeviceError> {
        self.calls.lock().unwrap().push(DeviceCall::Write {
            line,
            level: level.as_u8(),
        });
        Ok(())
    }
}
