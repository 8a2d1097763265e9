//! Dead-reckoning orientation estimator.
//!
//! Integrates angular-rate samples over wall-clock time into running
//! pitch/roll estimates:
//!
//! - a dead-zone filter zeroes any rate at or below the configured
//!   threshold, suppressing integration drift from sensor noise;
//! - first-order Euler integration: `angle += rate * dt`;
//! - yaw rate is reported as-is, never integrated.
//!
//! There is no drift correction and no fusion with the accelerometer —
//! long-run drift is unbounded by design and accepted as a known
//! limitation of rate-only dead reckoning.

use std::time::Instant;

use crate::client::CommandClient;
use crate::config::EstimatorConfig;
use crate::protocol::ChannelId;

/// One estimator output, ready for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attitude {
    /// Integrated pitch estimate (degrees).
    pub pitch_deg: f64,
    /// Integrated roll estimate (degrees).
    pub roll_deg: f64,
    /// Instantaneous yaw rate (°/s), dead-zone filtered but not integrated.
    pub yaw_rate_dps: f64,
}

/// Accumulates pitch/roll from rate samples.
pub struct OrientationEstimator {
    pitch_est: f64,
    roll_est: f64,
    dead_zone_dps: f64,
    last_sample: Option<Instant>,
}

impl OrientationEstimator {
    pub fn new(config: &EstimatorConfig) -> Self {
        Self {
            pitch_est: 0.0,
            roll_est: 0.0,
            dead_zone_dps: config.dead_zone_dps,
            last_sample: None,
        }
    }

    pub fn pitch_deg(&self) -> f64 {
        self.pitch_est
    }

    pub fn roll_deg(&self) -> f64 {
        self.roll_est
    }

    /// Zero out rates at or below the dead-zone threshold.
    fn suppress(&self, rate_dps: f64) -> f64 {
        if rate_dps.abs() <= self.dead_zone_dps {
            0.0
        } else {
            rate_dps
        }
    }

    /// Integrate one sample over an explicit `dt`. Exposed for callers
    /// (and tests) that manage time themselves.
    pub fn integrate(&mut self, pitch_rate_dps: f64, roll_rate_dps: f64, dt_secs: f64) {
        self.pitch_est += self.suppress(pitch_rate_dps) * dt_secs;
        self.roll_est += self.suppress(roll_rate_dps) * dt_secs;
    }

    /// Fold in one `[pitch, roll, yaw]` rate sample taken at `now`.
    /// The first sample only establishes the time base.
    pub fn sample(&mut self, rates_dps: [f64; 3], now: Instant) -> Attitude {
        if let Some(last) = self.last_sample {
            let dt = now.duration_since(last).as_secs_f64();
            self.integrate(rates_dps[0], rates_dps[1], dt);
        }
        self.last_sample = Some(now);
        Attitude {
            pitch_deg: self.pitch_est,
            roll_deg: self.roll_est,
            yaw_rate_dps: self.suppress(rates_dps[2]),
        }
    }

    /// One estimator tick: read the three angular-rate channels through
    /// the client and fold them in. `None` if any read failed — the
    /// estimate is left untouched so a dropped frame cannot corrupt it.
    pub fn tick(&mut self, client: &mut CommandClient, now: Instant) -> Option<Attitude> {
        let pitch = client.read(ChannelId::XAngle)?.value;
        let roll = client.read(ChannelId::YAngle)?.value;
        let yaw = client.read(ChannelId::ZAngle)?.value;
        Some(self.sample([pitch, roll, yaw], now))
    }
}
