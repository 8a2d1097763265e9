//! Attitude monitor.
//!
//! Connects to a remoteiod instance, polls the three angular-rate
//! channels on the configured cadence and prints the integrated
//! pitch/roll estimate plus the instantaneous yaw rate. Runs until the
//! connection drops or the process is interrupted.

#![deny(unused_must_use)]

use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use log::info;

use remoteio::attitude::OrientationEstimator;
use remoteio::client::CommandClient;
use remoteio::config::SystemConfig;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "remoteio.json".to_string());
    let config = SystemConfig::load_or_default(&config_path)
        .with_context(|| format!("loading configuration from {config_path}"))?;

    let mut client = CommandClient::new(config.client.clone());
    if !client.connect() {
        bail!(
            "could not connect to {}:{}",
            config.client.server_addr,
            config.client.port
        );
    }
    info!(
        "connected to {}:{}",
        config.client.server_addr, config.client.port
    );

    let cadence = Duration::from_millis(config.estimator.tick_interval_ms);
    let mut estimator = OrientationEstimator::new(&config.estimator);

    loop {
        let Some(attitude) = estimator.tick(&mut client, Instant::now()) else {
            bail!("lost connection to the server");
        };
        println!(
            "pitch {:+8.2}°  roll {:+8.2}°  yaw rate {:+7.2}°/s",
            attitude.pitch_deg, attitude.roll_deg, attitude.yaw_rate_dps
        );
        thread::sleep(cadence);
    }
}
