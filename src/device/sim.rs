//! Simulated device backend for host runs.
//!
//! Lets the daemon and every consumer above it run end-to-end on a
//! development machine with no IMU or GPIO attached. Sensor values are a
//! slow deterministic wobble around physically plausible resting values;
//! output lines are tracked in memory and logged.

use std::collections::HashMap;
use std::time::Instant;

use log::debug;

use crate::error::DeviceError;
use crate::protocol::{ChannelId, Level};

use super::{DevicePort, Reading};

/// In-memory stand-in for the Pi hardware.
pub struct SimDevice {
    started: Instant,
    lines: HashMap<u8, Level>,
}

impl SimDevice {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            lines: HashMap::new(),
        }
    }

    /// Last level driven on a line, if any. Test/inspection hook.
    pub fn line_level(&self, line: u8) -> Option<Level> {
        self.lines.get(&line).copied()
    }

    fn wobble(&self, period_secs: f64, amplitude: f64) -> f64 {
        let t = self.started.elapsed().as_secs_f64();
        (t * std::f64::consts::TAU / period_secs).sin() * amplitude
    }
}

impl Default for SimDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl DevicePort for SimDevice {
    fn read(&mut self, channel: ChannelId) -> Result<Reading, DeviceError> {
        // Resting pose: gravity on z, everything else near zero.
        let value = match channel {
            ChannelId::XAcc => self.wobble(7.0, 0.3),
            ChannelId::YAcc => self.wobble(9.0, 0.3),
            ChannelId::ZAcc => 9.81 + self.wobble(11.0, 0.15),
            ChannelId::XAngle => self.wobble(5.0, 4.0),
            ChannelId::YAngle => self.wobble(6.0, 4.0),
            ChannelId::ZAngle => self.wobble(8.0, 4.0),
        };
        Ok(Reading {
            value,
            unit: channel.unit(),
        })
    }

    fn write(&mut self, line: u8, level: Level) -> Result<(), DeviceError> {
        debug!("sim: line {line} -> {}", level.as_u8());
        self.lines.insert(line, level);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readings_carry_channel_units() {
        let mut dev = SimDevice::new();
        for channel in ChannelId::ALL {
            let r = dev.read(channel).unwrap();
            assert_eq!(r.unit, channel.unit());
        }
    }

    #[test]
    fn writes_are_tracked() {
        let mut dev = SimDevice::new();
        dev.write(22, Level::High).unwrap();
        assert_eq!(dev.line_level(22), Some(Level::High));
        dev.write(22, Level::Low).unwrap();
        assert_eq!(dev.line_level(22), Some(Level::Low));
        assert_eq!(dev.line_level(4), None);
    }

    #[test]
    fn z_acceleration_rests_near_gravity() {
        let mut dev = SimDevice::new();
        let r = dev.read(ChannelId::ZAcc).unwrap();
        assert!((r.value - 9.81).abs() < 0.5);
    }
}
