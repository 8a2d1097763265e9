//! MPU-6050 inertial sensor driver.
//!
//! Platform-agnostic: works with any `embedded_hal::i2c::I2c`
//! implementation (rppal on the Pi, a scripted fake in tests).
//!
//! Each channel reads a fixed pair of adjacent registers — high byte
//! first — combined into a signed 16-bit quantity and scaled by the
//! sensitivity of the configured range:
//!
//! - accelerometer, ±2 g range: 16384 LSB/g, reported in m/s²
//! - gyroscope, ±250 °/s range: 131 LSB/(°/s), reported in °/s

use embedded_hal::i2c::I2c;

use crate::error::DeviceError;
use crate::protocol::ChannelId;

use super::Reading;

/// Default I2C address (AD0 pin low).
pub const DEFAULT_ADDR: u8 = 0x68;

/// Power management register; clearing it wakes the part from sleep.
const REG_PWR_MGMT_1: u8 = 0x6B;

/// First accelerometer data register (ACCEL_XOUT_H).
const REG_ACCEL_XOUT_H: u8 = 0x3B;

/// First gyroscope data register (GYRO_XOUT_H).
const REG_GYRO_XOUT_H: u8 = 0x43;

/// Accelerometer sensitivity at the ±2 g default range (LSB per g).
const ACCEL_LSB_PER_G: f64 = 16384.0;

/// Gyroscope sensitivity at the ±250 °/s default range (LSB per °/s).
const GYRO_LSB_PER_DPS: f64 = 131.0;

/// Standard gravity, for reporting acceleration in m/s².
const STANDARD_GRAVITY: f64 = 9.806_65;

/// Combine a register pair into a signed 16-bit raw value.
///
/// Two's-complement correction: raw readings at or above 32768 represent
/// negative quantities (subtract 65536), which is exactly what
/// reinterpreting the big-endian pair as `i16` does.
pub fn decode_register_pair(high: u8, low: u8) -> i16 {
    i16::from_be_bytes([high, low])
}

/// Data register holding the high byte for a channel.
fn data_register(channel: ChannelId) -> u8 {
    match channel {
        ChannelId::XAcc => REG_ACCEL_XOUT_H,
        ChannelId::YAcc => REG_ACCEL_XOUT_H + 2,
        ChannelId::ZAcc => REG_ACCEL_XOUT_H + 4,
        ChannelId::XAngle => REG_GYRO_XOUT_H,
        ChannelId::YAngle => REG_GYRO_XOUT_H + 2,
        ChannelId::ZAngle => REG_GYRO_XOUT_H + 4,
    }
}

/// Scale a raw register value into the channel's physical unit.
fn scale(channel: ChannelId, raw: i16) -> f64 {
    if channel.is_angular() {
        f64::from(raw) / GYRO_LSB_PER_DPS
    } else {
        f64::from(raw) / ACCEL_LSB_PER_G * STANDARD_GRAVITY
    }
}

/// MPU-6050 driver over any I2C bus.
pub struct Mpu6050<I2C> {
    i2c: I2C,
    addr: u8,
}

impl<I2C: I2c> Mpu6050<I2C> {
    pub fn new(i2c: I2C, addr: u8) -> Self {
        Self { i2c, addr }
    }

    /// Wake the part from its power-on sleep state.
    pub fn init(&mut self) -> Result<(), DeviceError> {
        self.i2c
            .write(self.addr, &[REG_PWR_MGMT_1, 0x00])
            .map_err(|_| DeviceError::RegisterRead(REG_PWR_MGMT_1))?;
        Ok(())
    }

    /// Read one channel: register pair → two's complement → scale.
    pub fn read_channel(&mut self, channel: ChannelId) -> Result<Reading, DeviceError> {
        let reg = data_register(channel);
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.addr, &[reg], &mut buf)
            .map_err(|_| DeviceError::RegisterRead(reg))?;
        let raw = decode_register_pair(buf[0], buf[1]);
        Ok(Reading {
            value: scale(channel, raw),
            unit: channel.unit(),
        })
    }
}
