//! Unified error types for the remoteio daemon and client library.
//!
//! One enum per failure domain, matching how faults propagate:
//!
//! - [`TransportError`] — fatal to the current connection, never retried.
//! - [`ProtocolError`] — recoverable per message; the server answers with a
//!   structured error and keeps the session open.
//! - [`DeviceError`] — recoverable per request; reported as an error
//!   response, never crashes the server.
//! - [`ConfigError`] — fatal at startup; the process does not proceed to
//!   accept connections.

use std::fmt;
use std::io;

// ── Transport errors ───────────────────────────────────────

/// Connection-level faults. Any of these ends the session that saw them;
/// other sessions are unaffected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The peer refused the connection.
    Refused,
    /// The peer reset or aborted an established connection.
    Reset,
    /// The channel was closed (locally or by the peer).
    Closed,
    /// TLS handshake or record-layer failure.
    Tls(String),
    /// Any other socket-level I/O failure.
    Io(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Refused => write!(f, "connection refused"),
            Self::Reset => write!(f, "connection reset by peer"),
            Self::Closed => write!(f, "channel closed"),
            Self::Tls(msg) => write!(f, "TLS failure: {msg}"),
            Self::Io(msg) => write!(f, "I/O failure: {msg}"),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<io::Error> for TransportError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::ConnectionRefused => Self::Refused,
            io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe => Self::Reset,
            io::ErrorKind::UnexpectedEof => Self::Closed,
            // rustls surfaces TLS faults as InvalidData I/O errors.
            io::ErrorKind::InvalidData => Self::Tls(e.to_string()),
            _ => Self::Io(e.to_string()),
        }
    }
}

// ── Protocol errors ────────────────────────────────────────

/// Message-level validation failures, ordered by the decode pipeline.
/// The first violated rule is the single error reported — no partial
/// acceptance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The frame does not parse as a JSON object.
    InvalidJson,
    /// A required field is absent (`mode`, `data`, `data.value`, ...).
    MissingField(&'static str),
    /// A field is present but has the wrong JSON type.
    InvalidType(&'static str),
    /// `mode` is neither `read` nor `write`.
    UnknownMode(String),
    /// `data.value` names no known sensor channel.
    UnknownChannel(String),
    /// Write level is not exactly 0 or 1.
    InvalidLevel(i64),
    /// GPIO line index outside the representable line domain.
    LineOutOfRange(i64),
    /// Frame exceeds the fixed maximum frame size.
    FrameTooLarge(usize),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidJson => write!(f, "malformed frame: not a JSON object"),
            Self::MissingField(name) => write!(f, "missing required field '{name}'"),
            Self::InvalidType(what) => write!(f, "{what}"),
            Self::UnknownMode(mode) => write!(f, "unknown mode '{mode}'"),
            Self::UnknownChannel(tag) => write!(f, "unknown channel '{tag}'"),
            Self::InvalidLevel(n) => write!(f, "invalid level {n}: must be 0 or 1"),
            Self::LineOutOfRange(n) => write!(f, "gpio {n} outside the valid line domain"),
            Self::FrameTooLarge(n) => {
                write!(f, "frame of {n} bytes exceeds the maximum frame size")
            }
        }
    }
}

impl std::error::Error for ProtocolError {}

// ── Device errors ──────────────────────────────────────────

/// Hardware-level faults from the device backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// A sensor register pair could not be read.
    RegisterRead(u8),
    /// I2C bus fault outside a specific register transaction.
    Bus(String),
    /// GPIO subsystem fault (line claim or drive failure).
    Gpio(String),
    /// The backend rejected the line index.
    InvalidLine(u8),
    /// The hardware-access worker has shut down.
    WorkerGone,
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RegisterRead(reg) => write!(f, "register 0x{reg:02X} read failed"),
            Self::Bus(msg) => write!(f, "I2C bus fault: {msg}"),
            Self::Gpio(msg) => write!(f, "GPIO fault: {msg}"),
            Self::InvalidLine(line) => write!(f, "invalid line {line}"),
            Self::WorkerGone => write!(f, "device worker unavailable"),
        }
    }
}

impl std::error::Error for DeviceError {}

// ── Configuration errors ───────────────────────────────────

/// Startup configuration faults. All fatal — the daemon reports once and
/// exits without accepting connections.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    Io(String),
    /// Config file is not valid JSON for the expected schema.
    Parse(String),
    /// A value failed validation.
    Invalid(&'static str),
    /// Certificate or private key material could not be loaded.
    Certificate(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "config read failed: {msg}"),
            Self::Parse(msg) => write!(f, "config parse failed: {msg}"),
            Self::Invalid(what) => write!(f, "invalid config: {what}"),
            Self::Certificate(msg) => write!(f, "certificate/key load failed: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}
