//! Audio cue playback.
//!
//! The traffic-light controller plays a short cue when a green phase
//! begins. Playback runs on a detached thread so a slow or wedged
//! audio backend can never stall the light sequence; failures are
//! logged and otherwise ignored.

use std::process::Command;
use std::thread;

use log::{debug, warn};

/// Something that can play the green-phase cue.
pub trait CuePlayer {
    fn play(&mut self);
}

/// No-op player for headless deployments and tests.
#[derive(Debug, Default)]
pub struct NullCue;

impl CuePlayer for NullCue {
    fn play(&mut self) {}
}

/// Plays the cue by spawning an external command (e.g. `aplay go.wav`).
pub struct CommandCue {
    program: String,
    args: Vec<String>,
}

impl CommandCue {
    /// Parse a whitespace-separated command line. `None` when the
    /// string holds no program at all.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_owned);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }
}

impl CuePlayer for CommandCue {
    fn play(&mut self) {
        let program = self.program.clone();
        let args = self.args.clone();
        thread::Builder::new()
            .name("audio-cue".into())
            .spawn(move || match Command::new(&program).args(&args).status() {
                Ok(status) if status.success() => debug!("audio cue finished"),
                Ok(status) => warn!("audio cue {program} exited with {status}"),
                Err(e) => warn!("audio cue {program} failed to start: {e}"),
            })
            .map(|_| ())
            .unwrap_or_else(|e| warn!("could not spawn audio cue thread: {e}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_splits_program_and_args() {
        let cue = CommandCue::from_command_line("aplay -q go.wav").unwrap();
        assert_eq!(cue.program, "aplay");
        assert_eq!(cue.args, vec!["-q", "go.wav"]);
    }

    #[test]
    fn empty_command_line_yields_no_player() {
        assert!(CommandCue::from_command_line("").is_none());
        assert!(CommandCue::from_command_line("   ").is_none());
    }
}
