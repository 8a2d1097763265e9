//! Per-connection session loop and request dispatch.
//!
//! Session lifecycle:
//!
//! ```text
//! Listening ──accept──▶ Connected ──frame──▶ Processing
//!                           ▲                    │
//!                           └──────response──────┘
//!                           │
//!                  peer close / transport fault
//!                           ▼
//!                         Closed
//! ```
//!
//! Protocol errors are answered in-session and the loop continues;
//! transport faults end this session only. No request is ever retried
//! here — retry policy belongs to callers.

use log::{debug, info, warn};

use crate::device::DeviceHandle;
use crate::protocol::{codec, Request, Response};
use crate::transport::{frame_buffer, Channel};

/// Drive one session until the peer closes or the transport faults.
pub fn run(mut channel: impl Channel, device: &DeviceHandle, max_line: u8, peer: &str) {
    info!("{peer}: session open");
    loop {
        let mut buf = frame_buffer();
        let n = match channel.recv(&mut buf) {
            Ok(0) => {
                info!("{peer}: peer closed");
                break;
            }
            Ok(n) => n,
            Err(e) => {
                warn!("{peer}: transport fault: {e}");
                break;
            }
        };

        let response = handle_frame(&buf[..n], device, max_line);
        let frame = codec::encode_response(&response);
        if let Err(e) = channel.send(&frame) {
            warn!("{peer}: send failed: {e}");
            break;
        }
    }
    info!("{peer}: session closed");
}

/// Decode one inbound frame and produce the response for it. Decode
/// failures become error responses naming the violated rule; they do not
/// end the session.
pub fn handle_frame(frame: &[u8], device: &DeviceHandle, max_line: u8) -> Response {
    match codec::decode_request(frame) {
        Ok(request) => dispatch(request, device, max_line),
        Err(e) => {
            debug!("protocol error: {e}");
            Response::Error(e.to_string())
        }
    }
}

/// Execute a validated request against the device backend.
pub fn dispatch(request: Request, device: &DeviceHandle, max_line: u8) -> Response {
    match request {
        Request::Read { channel } => match device.read(channel) {
            Ok(reading) => Response::Read {
                channel,
                value: reading.value,
                unit: reading.unit,
            },
            Err(e) => Response::Error(format!("failed to read {channel}: {e}")),
        },
        Request::Write { line, level } => {
            // The codec has bounded the line to u8; the deployment maximum
            // is checked here, before anything reaches the hardware.
            if line > max_line {
                return Response::Error(format!(
                    "gpio {line} outside supported range 0-{max_line}"
                ));
            }
            match device.write(line, level) {
                Ok(()) => Response::Write { line, level },
                Err(e) => Response::Error(format!("failed to write gpio {line}: {e}")),
            }
        }
    }
}
