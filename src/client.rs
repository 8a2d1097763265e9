//! Command client — synchronous request/response over one channel.
//!
//! The outward API is deliberately blunt: `connect() -> bool`,
//! `read() -> Option<Reading>`, `write() -> bool`. Surrounding code (GUI,
//! estimator, traffic light) only needs "did it work"; the richer
//! [`CallError`] taxonomy is logged here so operators can still tell a
//! reset from a server-side rejection.
//!
//! Exactly one request/response round trip per call — no pipelining, no
//! batching, no automatic retry. Callers that need a responsive UI run
//! the client on a worker of their own.

use std::fmt;

use log::{info, warn};

use crate::config::ClientConfig;
use crate::device::Reading;
use crate::error::{ConfigError, ProtocolError, TransportError};
use crate::protocol::{codec, ChannelId, Level, Request, Response};
use crate::transport::{frame_buffer, tls, Channel};

/// Everything a single client call can fail with. Internal taxonomy —
/// surfaced only through logging.
#[derive(Debug)]
pub enum CallError {
    /// No channel is open.
    NotConnected,
    /// Connection-level fault; the channel is dropped.
    Transport(TransportError),
    /// The response did not decode.
    Protocol(ProtocolError),
    /// TLS configuration could not be built.
    Config(ConfigError),
    /// The server answered with its error form.
    Server(String),
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "not connected"),
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Protocol(e) => write!(f, "protocol: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Server(msg) => write!(f, "server: {msg}"),
        }
    }
}

impl std::error::Error for CallError {}

impl From<TransportError> for CallError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

impl From<ProtocolError> for CallError {
    fn from(e: ProtocolError) -> Self {
        Self::Protocol(e)
    }
}

/// Synchronous protocol client over any [`Channel`].
pub struct CommandClient {
    config: ClientConfig,
    channel: Option<Box<dyn Channel>>,
}

impl CommandClient {
    /// Create a disconnected client. TLS material is loaded on `connect`.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            channel: None,
        }
    }

    /// Wrap an already-open channel (tests, loopback wiring).
    pub fn from_channel(channel: Box<dyn Channel>) -> Self {
        Self {
            config: ClientConfig::default(),
            channel: Some(channel),
        }
    }

    /// Open the TLS channel. Returns `false` on any failure; the cause is
    /// logged.
    pub fn connect(&mut self) -> bool {
        match self.try_connect() {
            Ok(()) => {
                info!(
                    "connected to {}:{}",
                    self.config.server_addr, self.config.port
                );
                true
            }
            Err(e) => {
                warn!(
                    "connect to {}:{} failed: {e}",
                    self.config.server_addr, self.config.port
                );
                false
            }
        }
    }

    fn try_connect(&mut self) -> Result<(), CallError> {
        let tls = tls::client_config(&self.config.ca_file).map_err(CallError::Config)?;
        let channel = tls::connect(tls, &self.config.server_addr, self.config.port)?;
        self.channel = Some(Box::new(channel));
        Ok(())
    }

    /// True while a channel is open.
    pub fn is_connected(&self) -> bool {
        self.channel.is_some()
    }

    /// Read one sensor channel. `None` covers transport faults, decode
    /// failures, and server-side errors alike — see the log for which.
    pub fn read(&mut self, channel: ChannelId) -> Option<Reading> {
        match self.try_read(channel) {
            Ok(reading) => Some(reading),
            Err(e) => {
                warn!("read {channel} failed: {e}");
                None
            }
        }
    }

    /// Drive one output line. Returns a bare success flag; causes are
    /// logged.
    pub fn write(&mut self, line: u8, level: Level) -> bool {
        match self.try_write(line, level) {
            Ok(()) => true,
            Err(e) => {
                warn!("write gpio {line} failed: {e}");
                false
            }
        }
    }

    /// Close the channel. Safe to call repeatedly.
    pub fn close(&mut self) {
        if self.channel.take().is_some() {
            info!("connection closed");
        }
    }

    // ── Richer internal API ───────────────────────────────────

    pub fn try_read(&mut self, channel: ChannelId) -> Result<Reading, CallError> {
        let response = self.round_trip(&Request::Read { channel })?;
        match response {
            Response::Read {
                channel: echoed,
                value,
                unit,
            } if echoed == channel => Ok(Reading { value, unit }),
            Response::Error(message) => Err(CallError::Server(message)),
            _ => Err(CallError::Protocol(ProtocolError::InvalidType(
                "response does not match the request",
            ))),
        }
    }

    pub fn try_write(&mut self, line: u8, level: Level) -> Result<(), CallError> {
        let response = self.round_trip(&Request::Write { line, level })?;
        match response {
            Response::Write {
                line: echoed_line,
                level: echoed_level,
            } if echoed_line == line && echoed_level == level => Ok(()),
            Response::Error(message) => Err(CallError::Server(message)),
            _ => Err(CallError::Protocol(ProtocolError::InvalidType(
                "response does not match the request",
            ))),
        }
    }

    /// One request out, one response in. A transport fault drops the
    /// channel: subsequent calls report `NotConnected` until the caller
    /// reconnects.
    fn round_trip(&mut self, request: &Request) -> Result<Response, CallError> {
        let channel = self.channel.as_mut().ok_or(CallError::NotConnected)?;

        let frame = codec::encode_request(request);
        if let Err(e) = channel.send(&frame) {
            self.channel = None;
            return Err(e.into());
        }

        let mut buf = frame_buffer();
        let n = match channel.recv(&mut buf) {
            Ok(0) => {
                self.channel = None;
                return Err(TransportError::Closed.into());
            }
            Ok(n) => n,
            Err(e) => {
                self.channel = None;
                return Err(e.into());
            }
        };

        Ok(codec::decode_response(&buf[..n])?)
    }
}

impl Drop for CommandClient {
    fn drop(&mut self) {
        self.close();
    }
}
