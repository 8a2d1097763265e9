//! Transport abstraction — any bidirectional framed byte channel.
//!
//! Concrete implementations:
//! - TLS over TCP (the production channel, see [`tls`])
//! - in-memory channel pair (tests and loopback wiring)
//!
//! The server session loop and the command client are generic over
//! [`Channel`], so swapping the transport requires zero changes to the
//! protocol logic. A frame is one logical message: each `send` corresponds
//! to exactly one `recv` up to the fixed maximum frame size, and callers
//! never concatenate messages into one write.

pub mod tls;

use std::io::{self, Read, Write};
use std::sync::mpsc::{self, Receiver, Sender};

use crate::error::TransportError;
use crate::protocol::MAX_FRAME_SIZE;

/// Bidirectional framed byte channel.
pub trait Channel: Send {
    /// Send one frame.
    fn send(&mut self, frame: &[u8]) -> Result<(), TransportError>;

    /// Receive one frame into `buf`, blocking until data arrives.
    /// Returns the frame length, or `Ok(0)` when the peer has closed.
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;
}

// ── Stream-backed channel ──────────────────────────────────

/// A channel over any blocking byte stream (TLS session, plain TCP, ...).
///
/// Framing relies on the message-per-write discipline of the protocol:
/// one read yields one message for payloads within [`MAX_FRAME_SIZE`].
pub struct StreamChannel<S> {
    stream: S,
}

impl<S: Read + Write + Send> StreamChannel<S> {
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    /// Access the underlying stream (shutdown, peer inspection).
    pub fn get_ref(&self) -> &S {
        &self.stream
    }
}

impl<S: Read + Write + Send> Channel for StreamChannel<S> {
    fn send(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        self.stream.write_all(frame)?;
        self.stream.flush()?;
        Ok(())
    }

    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        match self.stream.read(buf) {
            Ok(n) => Ok(n),
            // A peer that drops the link without a TLS close_notify shows
            // up as an abrupt EOF; treat it as a normal close.
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}

// ── In-memory channel pair ─────────────────────────────────

/// One end of an in-memory channel pair. Frames preserve their boundaries
/// exactly, which matches the protocol's one-message-per-frame discipline.
pub struct InMemoryChannel {
    tx: Sender<Vec<u8>>,
    rx: Receiver<Vec<u8>>,
}

/// Create a connected pair of in-memory channels.
pub fn in_memory_pair() -> (InMemoryChannel, InMemoryChannel) {
    let (a_tx, b_rx) = mpsc::channel();
    let (b_tx, a_rx) = mpsc::channel();
    (
        InMemoryChannel { tx: a_tx, rx: a_rx },
        InMemoryChannel { tx: b_tx, rx: b_rx },
    )
}

impl Channel for InMemoryChannel {
    fn send(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        self.tx
            .send(frame.to_vec())
            .map_err(|_| TransportError::Closed)
    }

    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        match self.rx.recv() {
            Ok(frame) => {
                if frame.len() > buf.len() {
                    return Err(TransportError::Io(format!(
                        "frame of {} bytes exceeds receive buffer",
                        frame.len()
                    )));
                }
                buf[..frame.len()].copy_from_slice(&frame);
                Ok(frame.len())
            }
            // Peer end dropped.
            Err(_) => Ok(0),
        }
    }
}

/// Receive buffer sized for exactly one maximum-size frame.
pub fn frame_buffer() -> [u8; MAX_FRAME_SIZE] {
    [0u8; MAX_FRAME_SIZE]
}
