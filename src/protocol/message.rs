//! Protocol message types.
//!
//! The six sensor channels and the GPIO line/level domains are closed
//! sets — decoding rejects anything outside them before a request can
//! reach the device backend.

use std::fmt;

use serde::{Deserialize, Serialize};

// ── Channels ───────────────────────────────────────────────

/// The six fixed sensor read targets: {x,y,z} × {acceleration, angular rate}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelId {
    XAcc,
    YAcc,
    ZAcc,
    XAngle,
    YAngle,
    ZAngle,
}

impl ChannelId {
    /// Every channel, in wire-tag order.
    pub const ALL: [ChannelId; 6] = [
        Self::XAcc,
        Self::YAcc,
        Self::ZAcc,
        Self::XAngle,
        Self::YAngle,
        Self::ZAngle,
    ];

    /// The wire tag for this channel.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::XAcc => "x_acc",
            Self::YAcc => "y_acc",
            Self::ZAcc => "z_acc",
            Self::XAngle => "x_angle",
            Self::YAngle => "y_angle",
            Self::ZAngle => "z_angle",
        }
    }

    /// Parse a wire tag. Unknown tags are a protocol violation handled by
    /// the caller.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == tag)
    }

    /// True for the angular-rate channels.
    pub fn is_angular(self) -> bool {
        matches!(self, Self::XAngle | Self::YAngle | Self::ZAngle)
    }

    /// Physical unit of readings on this channel. The reference hardware
    /// exposes angular *rate*, not absolute angle.
    pub fn unit(self) -> Unit {
        if self.is_angular() {
            Unit::DegreesPerSecond
        } else {
            Unit::MetresPerSecondSquared
        }
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Units ──────────────────────────────────────────────────

/// Physical unit attached to a sensor reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    MetresPerSecondSquared,
    DegreesPerSecond,
}

impl Unit {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MetresPerSecondSquared => "m/s^2",
            Self::DegreesPerSecond => "degrees/s",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "m/s^2" => Some(Self::MetresPerSecondSquared),
            "degrees/s" => Some(Self::DegreesPerSecond),
            _ => None,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Digital levels ─────────────────────────────────────────

/// A digital output level — exactly 0 or 1 on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::High => 1,
        }
    }

    /// Strict domain check: only 0 and 1 are levels.
    pub fn from_i64(n: i64) -> Option<Self> {
        match n {
            0 => Some(Self::Low),
            1 => Some(Self::High),
            _ => None,
        }
    }

    pub fn is_high(self) -> bool {
        self == Self::High
    }
}

// ── Requests and responses ─────────────────────────────────

/// A decoded client request. Construction implies all protocol-level
/// validation has passed; only deployment bounds (max line number) remain
/// for the server to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Read one sensor channel.
    Read { channel: ChannelId },
    /// Drive one digital output line.
    Write { line: u8, level: Level },
}

/// A server response. Exactly one of the success forms or `Error`.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Successful read: value plus its physical unit.
    Read {
        channel: ChannelId,
        value: f64,
        unit: Unit,
    },
    /// Successful write: the applied line/level echoed back.
    Write { line: u8, level: Level },
    /// Failure of any kind, with a human-readable rule name.
    Error(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_tags_roundtrip() {
        for ch in ChannelId::ALL {
            assert_eq!(ChannelId::from_tag(ch.as_str()), Some(ch));
        }
        assert_eq!(ChannelId::from_tag("w_acc"), None);
    }

    #[test]
    fn channel_units() {
        assert_eq!(ChannelId::XAcc.unit(), Unit::MetresPerSecondSquared);
        assert_eq!(ChannelId::ZAngle.unit(), Unit::DegreesPerSecond);
    }

    #[test]
    fn level_domain_is_binary() {
        assert_eq!(Level::from_i64(0), Some(Level::Low));
        assert_eq!(Level::from_i64(1), Some(Level::High));
        assert_eq!(Level::from_i64(2), None);
        assert_eq!(Level::from_i64(-1), None);
    }

    #[test]
    fn channel_serde_uses_wire_tags() {
        let json = serde_json::to_string(&ChannelId::XAngle).unwrap();
        assert_eq!(json, "\"x_angle\"");
    }
}
