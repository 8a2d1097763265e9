//! Raspberry Pi hardware backend (`rpi` feature).
//!
//! GPIO and I2C via rppal. The IMU driver itself is the generic
//! [`Mpu6050`](super::mpu6050::Mpu6050); this module only wires it to the
//! Pi's I2C bus and adds the GPIO line bank.

use std::collections::HashMap;

use log::info;
use rppal::gpio::{Gpio, OutputPin};
use rppal::i2c::I2c;

use crate::config::DaemonConfig;
use crate::error::DeviceError;
use crate::protocol::{ChannelId, Level};

use super::mpu6050::Mpu6050;
use super::{DevicePort, Reading};

/// The real hardware: one IMU on the I2C bus, a bank of GPIO lines.
pub struct PiDevice {
    imu: Mpu6050<I2c>,
    gpio: Gpio,
    /// Lines already claimed as outputs. Claiming pins once and caching
    /// them keeps repeated writes cheap and keeps the line configured
    /// between requests.
    outputs: HashMap<u8, OutputPin>,
}

impl PiDevice {
    /// Open the I2C bus, wake the IMU, and prepare the GPIO controller.
    pub fn open(config: &DaemonConfig) -> Result<Self, DeviceError> {
        let i2c = I2c::with_bus(config.i2c_bus)
            .map_err(|e| DeviceError::Bus(e.to_string()))?;
        let mut imu = Mpu6050::new(i2c, config.imu_addr);
        imu.init()?;
        let gpio = Gpio::new().map_err(|e| DeviceError::Gpio(e.to_string()))?;
        info!(
            "pi backend: IMU at 0x{:02X} on i2c-{}, lines 0-{}",
            config.imu_addr, config.i2c_bus, config.max_line
        );
        Ok(Self {
            imu,
            gpio,
            outputs: HashMap::new(),
        })
    }
}

impl DevicePort for PiDevice {
    fn read(&mut self, channel: ChannelId) -> Result<Reading, DeviceError> {
        self.imu.read_channel(channel)
    }

    fn write(&mut self, line: u8, level: Level) -> Result<(), DeviceError> {
        if !self.outputs.contains_key(&line) {
            // Establish the line as an output before driving it.
            let pin = self
                .gpio
                .get(line)
                .map_err(|_| DeviceError::InvalidLine(line))?
                .into_output();
            self.outputs.insert(line, pin);
        }
        let pin = self
            .outputs
            .get_mut(&line)
            .ok_or(DeviceError::InvalidLine(line))?;
        if level.is_high() {
            pin.set_high();
        } else {
            pin.set_low();
        }
        Ok(())
    }
}
