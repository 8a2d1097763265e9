//! remoteiod — TLS command server daemon.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Sessions (one thread each)              │
//! │                                                          │
//! │  TLS accept → frame recv → decode → dispatch → respond   │
//! │                                                          │
//! │  ─────────────── DeviceHandle boundary ────────────────  │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │          Device worker (single thread)             │  │
//! │  │  MPU-6050 register reads · GPIO line writes        │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! On a Raspberry Pi (built with the `rpi` feature) the worker drives
//! the real I2C bus and GPIO header; elsewhere it falls back to the
//! simulated device so the daemon can be exercised on any host.
#![deny(unused_must_use)]

use anyhow::{Context, Result};
use log::{info, warn};

use remoteio::config::SystemConfig;
use remoteio::device::DeviceWorker;
use remoteio::server::CommandServer;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("remoteiod v{}", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "remoteio.json".to_string());
    let config = SystemConfig::load_or_default(&config_path)
        .with_context(|| format!("loading configuration from {config_path}"))?;

    let (handle, worker) = spawn_backend(&config);

    let server = CommandServer::new(config.daemon, handle).context("starting command server")?;
    server.run().context("command server failed")?;

    worker.join();
    Ok(())
}

#[cfg(feature = "rpi")]
fn spawn_backend(config: &SystemConfig) -> (remoteio::device::DeviceHandle, DeviceWorker) {
    use remoteio::device::rpi::PiDevice;

    match PiDevice::open(&config.daemon) {
        Ok(device) => {
            info!(
                "opened i2c bus {} (imu at {:#04x}) and gpio header",
                config.daemon.i2c_bus, config.daemon.imu_addr
            );
            DeviceWorker::spawn(device)
        }
        Err(e) => {
            warn!("hardware init failed ({e}), falling back to simulated device");
            DeviceWorker::spawn(remoteio::device::sim::SimDevice::new())
        }
    }
}

#[cfg(not(feature = "rpi"))]
fn spawn_backend(_config: &SystemConfig) -> (remoteio::device::DeviceHandle, DeviceWorker) {
    warn!("built without the rpi feature, serving the simulated device");
    DeviceWorker::spawn(remoteio::device::sim::SimDevice::new())
}
