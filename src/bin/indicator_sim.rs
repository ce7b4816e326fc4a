//! Desktop simulator for the status indicator.
//!
//! Renders the light bank as a bar in the terminal and reads events from
//! stdin, one per line:
//!
//! ```text
//! profile 1            select wireless profile 1
//! wired powered        wired host powered (also: none, suspended)
//! battery              battery level changed
//! show | hide          show / hide the battery level
//! {"event": "profile", "index": 0}
//! link up | link down  toggle the simulated wireless link
//! level 25             set the simulated battery level
//! status               print controller state
//! quit
//! ```
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=debug cargo run --features simulator --bin indicator_sim [config.json]
//! ```

use std::fs;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Context;
use indicator_leds::events::parse_event;
use indicator_leds::hal::{MockBattery, MockLink, StdDelay};
use indicator_leds::traits::IndicatorDriver;
use indicator_leds::{Config, IndicatorEvent, StatusIndicator};

/// Number of simulated lights.
const LIGHTS: usize = 4;

/// Brightness shades, dark to bright.
const SHADES: [char; 5] = [' ', '░', '▒', '▓', '█'];

/// Indicator driver that draws the lights on one terminal line.
struct TerminalLights {
    levels: [u8; LIGHTS],
}

impl TerminalLights {
    fn new() -> Self {
        Self {
            levels: [0; LIGHTS],
        }
    }

    fn render(&self) {
        let bar: String = self
            .levels
            .iter()
            .map(|&level| {
                let shade = SHADES[(usize::from(level) * (SHADES.len() - 1) + 50) / 100];
                format!("[{}{}]", shade, shade)
            })
            .collect();
        let mut out = io::stdout().lock();
        let _ = write!(out, "\r{} ", bar);
        let _ = out.flush();
    }
}

impl IndicatorDriver for TerminalLights {
    type Error = io::Error;

    fn set_brightness(&mut self, index: usize, percent: u8) -> Result<(), io::Error> {
        let level = self
            .levels
            .get_mut(index)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no such light"))?;
        if *level != percent {
            *level = percent;
            self.render();
        }
        Ok(())
    }
}

fn load_config() -> anyhow::Result<Config> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = fs::read(&path).with_context(|| format!("reading {}", path))?;
            Config::from_json(&json).with_context(|| format!("parsing {}", path))
        }
        None => Ok(Config::default()),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config()?;
    let battery = Arc::new(MockBattery::new(100));
    let link = Arc::new(MockLink::new(false));

    let indicator = StatusIndicator::start::<_, _, _, LIGHTS>(
        config,
        TerminalLights::new(),
        StdDelay::new(),
        Arc::clone(&battery),
        Arc::clone(&link),
    )?;

    println!("indicator simulator: type events, 'quit' to exit");

    for line in io::stdin().lock().lines() {
        let line = line?;
        let line = line.trim();
        let mut words = line.split_whitespace();

        match (words.next(), words.next()) {
            (None, _) => continue,
            (Some("quit" | "exit"), _) => break,
            (Some("link"), Some(state)) => {
                link.set_connected(matches!(state, "up" | "on" | "connected"));
                println!("\nwireless link {}", state);
            }
            (Some("level"), Some(level)) => match level.parse::<u8>() {
                Ok(level) => {
                    battery.set_level(level.min(100));
                    println!("\nbattery level {}%", level.min(100));
                }
                Err(_) => println!("\nlevel must be 0-100"),
            },
            (Some("status"), _) => println!("\n{:?}", indicator),
            _ => {
                let event = if line.starts_with('{') {
                    parse_event(line.as_bytes())
                } else {
                    IndicatorEvent::from_text(line)
                };
                match event {
                    Some(event) => {
                        let outcome = indicator.handle_event(event);
                        log::info!("{:?} -> {:?}", event, outcome);
                    }
                    None => println!("\nunrecognised: {}", line),
                }
            }
        }
    }

    println!();
    Ok(())
}
