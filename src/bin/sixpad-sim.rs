// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! sixpad simulator entry point
//!
//! Runs the adapter engine against a simulated SFC pad and a simulated Mega
//! Drive, and prints what the console decodes on each frame.
//!
//! # Usage
//!
//! ```bash
//! # Four frames of a 6-button console, nothing pressed
//! sixpad-sim
//!
//! # Power on holding Left (AB layout), then hold B and Start
//! sixpad-sim --hold left --press b,start
//!
//! # 3-button console, JSON report
//! sixpad-sim --three-button --press a,x --json
//! ```

use std::env;

use clap::Parser;
use sixpad::core::config::Config;
use sixpad::core::controller::SfcButtons;
use sixpad::sim::{self, PollKind, Report, Scenario};

/// Environment variable naming the default config file
const CONFIG_ENV: &str = "SIXPAD_CONFIG";

/// SFC to six-button pad adapter simulator
#[derive(Parser, Debug)]
#[command(name = "sixpad-sim")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file (defaults to $SIXPAD_CONFIG)
    #[arg(short, long)]
    config: Option<String>,

    /// Buttons held at power-on, comma separated (e.g. "left")
    #[arg(long, value_parser = SfcButtons::parse_list, default_value = "")]
    hold: SfcButtons,

    /// Buttons held during the run, comma separated (e.g. "b,start,up")
    #[arg(short, long, value_parser = SfcButtons::parse_list, default_value = "")]
    press: SfcButtons,

    /// Number of console frames
    #[arg(short, long, default_value_t = 4)]
    frames: u32,

    /// Poll like 3-button software (two select pulses per frame)
    #[arg(long)]
    three_button: bool,

    /// Time between two frames
    #[arg(long, default_value_t = 16_683)]
    frame_interval_us: u64,

    /// Time between two select edges
    #[arg(long, default_value_t = 5)]
    pulse_us: u64,

    /// Simulate an unplugged SFC pad
    #[arg(long)]
    disconnected: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Write the default configuration to this path and exit
    #[arg(long, value_name = "PATH")]
    write_default_config: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Pick up SIXPAD_CONFIG / RUST_LOG from .env if present
    dotenvy::dotenv().ok();

    // Initialize logging
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    if let Some(path) = &cli.write_default_config {
        Config::default().save(path)?;
        log::info!("Default configuration written to {}", path);
        return Ok(());
    }

    let config = match cli.config.clone().or_else(|| env::var(CONFIG_ENV).ok()) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };

    let scenario = Scenario {
        hold_at_power_on: cli.hold,
        pressed: cli.press,
        connected: !cli.disconnected,
        frames: cli.frames,
        kind: if cli.three_button {
            PollKind::ThreeButton
        } else {
            PollKind::SixButton
        },
        frame_interval_us: cli.frame_interval_us,
        pulse_us: cli.pulse_us,
        ..Scenario::default()
    };

    let report = sim::run(config, &scenario)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &Report) {
    println!("Layout:    {}", report.layout);
    println!("Console:   {:?}", report.kind);
    println!("Host reads: {}", report.host_reads);
    println!("Watchdog overflows: {}", report.watchdog_overflows);
    println!("Simulated: {}us", report.duration_us);
    println!();

    for frame in &report.frames {
        let samples: Vec<String> = frame.samples.iter().map(|b| format!("{:02X}", b)).collect();
        let pressed = frame.reading.pressed_names();
        println!(
            "frame {:>3} @ {:>8}us  [{}]  {}{}",
            frame.index,
            frame.start_us,
            samples.join(" "),
            if pressed.is_empty() {
                "-".to_string()
            } else {
                pressed.join(" ")
            },
            if frame.reading.six_button { "  (6B)" } else { "" }
        );
    }
}
