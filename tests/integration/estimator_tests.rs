//! Orientation estimator fed by channel reads over a live session.

use std::time::{Duration, Instant};

use remoteio::attitude::OrientationEstimator;
use remoteio::config::EstimatorConfig;
use remoteio::protocol::ChannelId;

use crate::mock_device::{spawn_session, MockDevice};

#[test]
fn estimator_integrates_rates_read_over_the_wire() {
    let (device, _calls) = MockDevice::new();
    let device = device
        .with_reading(ChannelId::XAngle, 10.0)
        .with_reading(ChannelId::YAngle, 0.5) // below the dead zone
        .with_reading(ChannelId::ZAngle, 30.0);
    let mut client = spawn_session(device, 27);

    let mut estimator = OrientationEstimator::new(&EstimatorConfig {
        dead_zone_dps: 2.0,
        tick_interval_ms: 100,
    });

    let t0 = Instant::now();
    let first = estimator.tick(&mut client, t0).expect("first tick");
    assert_eq!(first.pitch_deg, 0.0);

    let second = estimator
        .tick(&mut client, t0 + Duration::from_secs(1))
        .expect("second tick");
    assert!((second.pitch_deg - 10.0).abs() < 1e-9);
    assert_eq!(second.roll_deg, 0.0);
    assert!((second.yaw_rate_dps - 30.0).abs() < 1e-12);
}

#[test]
fn backend_failure_leaves_the_estimate_untouched() {
    let (device, _calls) = MockDevice::new();
    let mut client = spawn_session(device.failing_reads(), 27);

    let mut estimator = OrientationEstimator::new(&EstimatorConfig::default());
    assert!(estimator.tick(&mut client, Instant::now()).is_none());
    assert_eq!(estimator.pitch_deg(), 0.0);
    assert_eq!(estimator.roll_deg(), 0.0);
}
