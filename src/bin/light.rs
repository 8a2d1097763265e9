//! Interactive traffic-light driver.
//!
//! Drives three GPIO lines on a remoteiod instance as a traffic light.
//! Reads single-letter commands from stdin:
//!
//! - `t` — manual toggle (Red → Green, or Green → Yellow → Red)
//! - `a` — switch to the automatic cycle
//! - `m` — switch back to manual control
//! - `q` — quit
//!
//! A background thread forwards stdin lines over a channel so the main
//! loop can keep polling the timer queue between keystrokes.

#![deny(unused_must_use)]

use std::io::BufRead;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use log::info;

use remoteio::audio::{CommandCue, CuePlayer, NullCue};
use remoteio::client::CommandClient;
use remoteio::config::SystemConfig;
use remoteio::trafficlight::{Mode, TrafficLight};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

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

    let mut cue: Box<dyn CuePlayer> = match config
        .traffic
        .cue_command
        .as_deref()
        .and_then(CommandCue::from_command_line)
    {
        Some(player) => Box::new(player),
        None => Box::new(NullCue),
    };

    let mut light = TrafficLight::new(config.traffic.clone());
    light.start(&mut client, cue.as_mut());
    info!("traffic light ready: t=toggle a=automatic m=manual q=quit");

    let (tx, rx) = mpsc::channel::<String>();
    thread::Builder::new()
        .name("stdin".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        })
        .context("spawning stdin reader")?;

    loop {
        let now = Instant::now();
        light.tick(now, &mut client, cue.as_mut());

        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(line) => match line.trim() {
                "t" => light.toggle(now, &mut client, cue.as_mut()),
                "a" => light.set_mode(Mode::Automatic, now),
                "m" => light.set_mode(Mode::Manual, now),
                "q" => break,
                "" => {}
                other => info!("unknown command {other:?}"),
            },
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    client.close();
    Ok(())
}
