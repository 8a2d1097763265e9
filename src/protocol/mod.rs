//! Command protocol — message types and wire codec.
//!
//! One JSON object per transport frame, no length prefix:
//!
//! ```text
//! ──▶ {"mode":"read","data":{"value":"x_angle"}}
//! ◀── {"mode":"read","data":{"x_angle":{"value":1.53,"unit":"degrees/s"}}}
//!
//! ──▶ {"mode":"write","data":{"gpio":17,"value":1}}
//! ◀── {"mode":"write","data":{"gpio":17,"value":1}}
//!
//! ◀── {"error":"unknown mode 'frobnicate'"}
//! ```
//!
//! Every response carries exactly one of `data` / `error`.

pub mod codec;
pub mod message;

pub use codec::{decode_request, decode_response, encode_request, encode_response, MAX_FRAME_SIZE};
pub use message::{ChannelId, Level, Request, Response, Unit};
