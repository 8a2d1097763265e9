//! Wire codec — JSON frames in, validated messages out.
//!
//! Decoding applies its rules in a fixed order and reports the first
//! violation only:
//!
//! 1. frame parses as a JSON object (the message grammar);
//! 2. top-level `mode` and `data` are both present;
//! 3. `mode` is one of the two recognised values;
//! 4. mode-specific required fields are present and correctly typed;
//! 5. field values fall within their domains (channel tags, line range,
//!    binary level).
//!
//! There is no partial acceptance: a frame either becomes a [`Request`]
//! or a single [`ProtocolError`].

use serde_json::{json, Map, Value};

use crate::error::ProtocolError;

use super::message::{ChannelId, Level, Request, Response, Unit};

/// Fixed maximum frame size. One `send` corresponds to exactly one
/// `receive` up to this many bytes; larger frames are rejected outright.
pub const MAX_FRAME_SIZE: usize = 4096;

// ── Request decode / encode ────────────────────────────────

/// Decode and validate a request frame.
pub fn decode_request(frame: &[u8]) -> Result<Request, ProtocolError> {
    let obj = parse_object(frame)?;

    // Both top-level fields must be present before anything is interpreted.
    let mode = obj.get("mode").ok_or(ProtocolError::MissingField("mode"))?;
    let data = obj.get("data").ok_or(ProtocolError::MissingField("data"))?;

    let mode = mode
        .as_str()
        .ok_or(ProtocolError::InvalidType("field 'mode' must be a string"))?;
    let data = data
        .as_object()
        .ok_or(ProtocolError::InvalidType("field 'data' must be an object"))?;

    match mode {
        "read" => decode_read(data),
        "write" => decode_write(data),
        other => Err(ProtocolError::UnknownMode(other.to_string())),
    }
}

fn decode_read(data: &Map<String, Value>) -> Result<Request, ProtocolError> {
    let tag = data
        .get("value")
        .ok_or(ProtocolError::MissingField("data.value"))?
        .as_str()
        .ok_or(ProtocolError::InvalidType("field 'data.value' must be a string"))?;

    let channel = ChannelId::from_tag(tag)
        .ok_or_else(|| ProtocolError::UnknownChannel(tag.to_string()))?;
    Ok(Request::Read { channel })
}

fn decode_write(data: &Map<String, Value>) -> Result<Request, ProtocolError> {
    let gpio = data
        .get("gpio")
        .ok_or(ProtocolError::MissingField("data.gpio"))?
        .as_i64()
        .ok_or(ProtocolError::InvalidType("field 'data.gpio' must be an integer"))?;
    let level = data
        .get("value")
        .ok_or(ProtocolError::MissingField("data.value"))?
        .as_i64()
        .ok_or(ProtocolError::InvalidType("field 'data.value' must be an integer"))?;

    // Domain checks. The representable line domain is 0..=255 here; the
    // deployment maximum is enforced by the server on top of this.
    if !(0..=i64::from(u8::MAX)).contains(&gpio) {
        return Err(ProtocolError::LineOutOfRange(gpio));
    }
    let level = Level::from_i64(level).ok_or(ProtocolError::InvalidLevel(level))?;

    Ok(Request::Write {
        line: gpio as u8,
        level,
    })
}

/// Encode a request into a wire frame.
pub fn encode_request(request: &Request) -> Vec<u8> {
    let value = match request {
        Request::Read { channel } => json!({
            "mode": "read",
            "data": { "value": channel.as_str() },
        }),
        Request::Write { line, level } => json!({
            "mode": "write",
            "data": { "gpio": line, "value": level.as_u8() },
        }),
    };
    value.to_string().into_bytes()
}

// ── Response encode / decode ───────────────────────────────

/// Encode a response into a wire frame. Exactly one of the `data` / `error`
/// keys is populated.
pub fn encode_response(response: &Response) -> Vec<u8> {
    let value = match response {
        Response::Read {
            channel,
            value,
            unit,
        } => json!({
            "mode": "read",
            "data": { (channel.as_str()): { "value": value, "unit": unit.as_str() } },
        }),
        Response::Write { line, level } => json!({
            "mode": "write",
            "data": { "gpio": line, "value": level.as_u8() },
        }),
        Response::Error(message) => json!({ "error": message }),
    };
    value.to_string().into_bytes()
}

/// Decode a response frame (client side).
pub fn decode_response(frame: &[u8]) -> Result<Response, ProtocolError> {
    let obj = parse_object(frame)?;

    if let Some(error) = obj.get("error") {
        let message = error
            .as_str()
            .ok_or(ProtocolError::InvalidType("field 'error' must be a string"))?;
        return Ok(Response::Error(message.to_string()));
    }

    let mode = obj
        .get("mode")
        .ok_or(ProtocolError::MissingField("mode"))?
        .as_str()
        .ok_or(ProtocolError::InvalidType("field 'mode' must be a string"))?;
    let data = obj
        .get("data")
        .ok_or(ProtocolError::MissingField("data"))?
        .as_object()
        .ok_or(ProtocolError::InvalidType("field 'data' must be an object"))?;

    match mode {
        "read" => decode_read_response(data),
        "write" => decode_write(data).map(|req| match req {
            Request::Write { line, level } => Response::Write { line, level },
            Request::Read { .. } => unreachable!("decode_write only yields writes"),
        }),
        other => Err(ProtocolError::UnknownMode(other.to_string())),
    }
}

fn decode_read_response(data: &Map<String, Value>) -> Result<Response, ProtocolError> {
    // A read success carries a single channel-keyed entry.
    let (tag, entry) = data
        .iter()
        .next()
        .ok_or(ProtocolError::MissingField("data.<channel>"))?;
    let channel = ChannelId::from_tag(tag)
        .ok_or_else(|| ProtocolError::UnknownChannel(tag.to_string()))?;

    let entry = entry
        .as_object()
        .ok_or(ProtocolError::InvalidType("channel entry must be an object"))?;
    let value = entry
        .get("value")
        .ok_or(ProtocolError::MissingField("data.<channel>.value"))?
        .as_f64()
        .ok_or(ProtocolError::InvalidType("channel value must be a number"))?;
    let unit = entry
        .get("unit")
        .ok_or(ProtocolError::MissingField("data.<channel>.unit"))?
        .as_str()
        .ok_or(ProtocolError::InvalidType("channel unit must be a string"))?;
    let unit = Unit::from_tag(unit)
        .ok_or(ProtocolError::InvalidType("channel unit is not recognised"))?;

    Ok(Response::Read {
        channel,
        value,
        unit,
    })
}

// ── Shared grammar gate ────────────────────────────────────

fn parse_object(frame: &[u8]) -> Result<Map<String, Value>, ProtocolError> {
    if frame.len() > MAX_FRAME_SIZE {
        return Err(ProtocolError::FrameTooLarge(frame.len()));
    }
    let value: Value = serde_json::from_slice(frame).map_err(|_| ProtocolError::InvalidJson)?;
    match value {
        Value::Object(obj) => Ok(obj),
        _ => Err(ProtocolError::InvalidJson),
    }
}
