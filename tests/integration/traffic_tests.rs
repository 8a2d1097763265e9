//! Traffic-light controller driving real line writes over a live
//! in-memory session.

use std::time::{Duration, Instant};

use remoteio::audio::CuePlayer;
use remoteio::config::TrafficConfig;
use remoteio::trafficlight::{
    LightState, Mode, TrafficLight, GREEN_HOLD, MANUAL_YELLOW_HOLD, RED_HOLD,
};

use crate::mock_device::{spawn_session, DeviceCall, MockDevice};

struct CountingCue {
    plays: usize,
}

impl CuePlayer for CountingCue {
    fn play(&mut self) {
        self.plays += 1;
    }
}

fn lines() -> TrafficConfig {
    TrafficConfig {
        red_line: 17,
        yellow_line: 27,
        green_line: 22,
        cue_command: None,
    }
}

fn write(line: u8, level: u8) -> DeviceCall {
    DeviceCall::Write { line, level }
}

#[test]
fn manual_toggle_rewrites_all_three_lines_at_the_backend() {
    let (device, calls) = MockDevice::new();
    let mut client = spawn_session(device, 27);
    let mut cue = CountingCue { plays: 0 };
    let mut light = TrafficLight::new(lines());

    light.start(&mut client, &mut cue);
    light.toggle(Instant::now(), &mut client, &mut cue);

    assert_eq!(light.state(), LightState::Green);
    assert_eq!(
        *calls.lock().unwrap(),
        vec![
            // start: Red
            write(17, 1),
            write(27, 0),
            write(22, 0),
            // toggle: Green
            write(17, 0),
            write(27, 0),
            write(22, 1),
        ]
    );
    assert_eq!(cue.plays, 1);
}

#[test]
fn two_phase_stop_reaches_red_after_the_hold() {
    let (device, calls) = MockDevice::new();
    let mut client = spawn_session(device, 27);
    let mut cue = CountingCue { plays: 0 };
    let mut light = TrafficLight::new(lines());

    let t0 = Instant::now();
    light.toggle(t0, &mut client, &mut cue); // Red -> Green
    light.toggle(t0, &mut client, &mut cue); // Green -> Yellow, Red queued
    assert_eq!(light.state(), LightState::Yellow);

    light.tick(t0 + MANUAL_YELLOW_HOLD, &mut client, &mut cue);
    assert_eq!(light.state(), LightState::Red);

    let last_frame: Vec<DeviceCall> =
        calls.lock().unwrap().iter().rev().take(3).rev().cloned().collect();
    assert_eq!(last_frame, vec![write(17, 1), write(27, 0), write(22, 0)]);
}

#[test]
fn automatic_cycle_runs_over_the_wire() {
    let (device, calls) = MockDevice::new();
    let mut client = spawn_session(device, 27);
    let mut cue = CountingCue { plays: 0 };
    let mut light = TrafficLight::new(lines());

    let t0 = Instant::now();
    light.start(&mut client, &mut cue);
    light.set_mode(Mode::Automatic, t0);

    light.tick(t0 + RED_HOLD, &mut client, &mut cue);
    assert_eq!(light.state(), LightState::Green);
    light.tick(t0 + RED_HOLD + GREEN_HOLD, &mut client, &mut cue);
    assert_eq!(light.state(), LightState::Yellow);

    // Switching back to manual cancels the queued Yellow -> Red step.
    light.set_mode(Mode::Manual, t0 + RED_HOLD + GREEN_HOLD);
    let writes_before = calls.lock().unwrap().len();
    light.tick(t0 + Duration::from_secs(60), &mut client, &mut cue);
    assert_eq!(light.state(), LightState::Yellow);
    assert_eq!(calls.lock().unwrap().len(), writes_before);
    assert_eq!(cue.plays, 1);
}
