//! Timed traffic-light state machine.
//!
//! Three GPIO lines map 1:1 to the states Red, Yellow and Green; the
//! active state's line is driven high and the other two low. Every
//! transition rewrites all three lines through the command client, in
//! a fixed red/yellow/green order. The wire gives no atomicity across
//! the three writes, so a peeking observer can see a brief all-off or
//! two-on window.
//!
//! ```text
//!            manual toggle                 manual toggle
//!     ┌────────────────────────┐    ┌──────────────────────┐
//!     ▼                        │    │                      ▼
//!  ┌──────┐  auto 6s   ┌───────┴──┐ └──────────────► ┌──────────┐
//!  │ Red  │ ─────────► │  Green   │      auto 1s     │  Yellow  │
//!  └──────┘            └──────────┘ ───────────────► └──────────┘
//!     ▲                                                    │
//!     └────────────────────────────────────────────────────┘
//!                 auto 6s / manual hold 1s
//! ```
//!
//! Timing is driven by a caller-polled [`TimerQueue`], never by a
//! thread inside the controller. Scheduled steps are held as
//! cancellable task handles, so leaving automatic mode cancels a
//! pending automatic step instead of letting one stray transition
//! fire after the switch.

use std::time::{Duration, Instant};

use log::{info, warn};

use crate::audio::CuePlayer;
use crate::client::CommandClient;
use crate::config::TrafficConfig;
use crate::protocol::Level;
use crate::scheduler::{TaskId, TimerQueue};

/// Dwell in Red before the automatic cycle moves to Green.
pub const RED_HOLD: Duration = Duration::from_secs(6);
/// Dwell in Green before the automatic cycle moves to Yellow.
pub const GREEN_HOLD: Duration = Duration::from_secs(1);
/// Dwell in Yellow before the automatic cycle moves back to Red.
pub const YELLOW_HOLD: Duration = Duration::from_secs(6);
/// Yellow hold during the two-phase manual Green → Red transition.
pub const MANUAL_YELLOW_HOLD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightState {
    Red,
    Yellow,
    Green,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Manual,
    Automatic,
}

/// One deferred transition held in the timer queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    ToRed,
    ToYellow,
    ToGreen,
}

impl Step {
    fn target(self) -> LightState {
        match self {
            Step::ToRed => LightState::Red,
            Step::ToYellow => LightState::Yellow,
            Step::ToGreen => LightState::Green,
        }
    }
}

/// Sink for the three output lines. The production implementation is
/// [`CommandClient`]; tests record writes instead.
pub trait LightOutput {
    fn set_line(&mut self, line: u8, level: Level) -> bool;
}

impl LightOutput for CommandClient {
    fn set_line(&mut self, line: u8, level: Level) -> bool {
        self.write(line, level)
    }
}

pub struct TrafficLight {
    state: LightState,
    mode: Mode,
    lines: TrafficConfig,
    timers: TimerQueue<Step>,
    auto_task: Option<TaskId>,
    manual_task: Option<TaskId>,
}

impl TrafficLight {
    pub fn new(lines: TrafficConfig) -> Self {
        Self {
            state: LightState::Red,
            mode: Mode::Manual,
            lines,
            timers: TimerQueue::new(),
            auto_task: None,
            manual_task: None,
        }
    }

    pub fn state(&self) -> LightState {
        self.state
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Time until the next scheduled step, for callers sizing their
    /// poll interval.
    pub fn next_step_in(&self, now: Instant) -> Option<Duration> {
        self.timers.next_deadline_in(now)
    }

    /// Drive the initial Red state onto the lines.
    pub fn start(&mut self, out: &mut dyn LightOutput, cue: &mut dyn CuePlayer) {
        self.apply(LightState::Red, out, cue);
    }

    fn apply(&mut self, to: LightState, out: &mut dyn LightOutput, cue: &mut dyn CuePlayer) {
        // Fixed write order: red, yellow, green.
        let pairs = [
            (self.lines.red_line, to == LightState::Red),
            (self.lines.yellow_line, to == LightState::Yellow),
            (self.lines.green_line, to == LightState::Green),
        ];
        for (line, active) in pairs {
            let level = if active { Level::High } else { Level::Low };
            if !out.set_line(line, level) {
                warn!("traffic light: write to gpio {line} failed");
            }
        }
        if to == LightState::Green {
            cue.play();
        }
        info!("traffic light: {:?} -> {:?}", self.state, to);
        self.state = to;
    }

    /// Manual control. From Red moves straight to Green; from Green
    /// starts the two-phase stop (Yellow now, Red after the hold).
    /// Ignored in automatic mode and while Yellow is held.
    pub fn toggle(&mut self, now: Instant, out: &mut dyn LightOutput, cue: &mut dyn CuePlayer) {
        if self.mode != Mode::Manual {
            return;
        }
        match self.state {
            LightState::Red => self.apply(LightState::Green, out, cue),
            LightState::Green => {
                self.apply(LightState::Yellow, out, cue);
                self.manual_task =
                    Some(self.timers.schedule(now, MANUAL_YELLOW_HOLD, Step::ToRed));
            }
            LightState::Yellow => {}
        }
    }

    /// Switch operating mode. Entering manual cancels any pending
    /// automatic step; entering automatic cancels a pending manual
    /// hold and arms the cycle from the current state.
    pub fn set_mode(&mut self, mode: Mode, now: Instant) {
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        info!("traffic light: mode {:?}", mode);
        match mode {
            Mode::Manual => {
                if let Some(id) = self.auto_task.take() {
                    self.timers.cancel(id);
                }
            }
            Mode::Automatic => {
                if let Some(id) = self.manual_task.take() {
                    self.timers.cancel(id);
                }
                self.arm(now);
            }
        }
    }

    fn arm(&mut self, now: Instant) {
        let (delay, step) = match self.state {
            LightState::Red => (RED_HOLD, Step::ToGreen),
            LightState::Green => (GREEN_HOLD, Step::ToYellow),
            LightState::Yellow => (YELLOW_HOLD, Step::ToRed),
        };
        self.auto_task = Some(self.timers.schedule(now, delay, step));
    }

    /// Fire every transition whose deadline has passed. Call this on
    /// the consuming loop's cadence; it never blocks on I/O beyond the
    /// line writes themselves.
    pub fn tick(&mut self, now: Instant, out: &mut dyn LightOutput, cue: &mut dyn CuePlayer) {
        for step in self.timers.poll(now) {
            self.apply(step.target(), out, cue);
        }
        if let Some(id) = self.auto_task {
            if !self.timers.is_pending(id) {
                self.auto_task = None;
            }
        }
        if let Some(id) = self.manual_task {
            if !self.timers.is_pending(id) {
                self.manual_task = None;
            }
        }
        if self.mode == Mode::Automatic && self.auto_task.is_none() {
            self.arm(now);
        }
    }
}
