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

//! Host-side simulation
//!
//! Runs the unmodified adapter engine on a [`SimBoard`] wired to a simulated
//! host pad and a simulated console, and reports what the console software
//! would have decoded on every frame.
//!
//! # Example
//!
//! ```
//! use sixpad::core::config::Config;
//! use sixpad::core::controller::SfcButtons;
//! use sixpad::sim::{run, Scenario};
//!
//! let scenario = Scenario {
//!     pressed: SfcButtons::START,
//!     frames: 2,
//!     ..Scenario::default()
//! };
//! let report = run(Config::default(), &scenario).unwrap();
//! assert!(report.frames.iter().all(|frame| frame.reading.start));
//! ```

mod board;
mod console;
mod pad;

pub use board::{OutputWrite, SimBoard, DEFAULT_IO_COST_NS, DEFAULT_POLL_COST_NS};
pub use console::{ConsolePoll, ConsoleReading, PollKind, SelectWaveform};
pub use pad::ShiftRegisterPad;

use serde::Serialize;

use crate::core::config::Config;
use crate::core::controller::SfcButtons;
use crate::core::engine::{EmulationEngine, RestartSignal};
use crate::core::error::{AdapterError, Result};
use crate::core::schedule::DataLines;

/// What happens on both sides of the adapter during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    /// Buttons held while the adapter powers on (chooses the layout)
    pub hold_at_power_on: SfcButtons,

    /// Buttons held from right after power-on
    pub pressed: SfcButtons,

    /// Host pad plugged in
    pub connected: bool,

    /// Number of console frames
    pub frames: u32,

    /// Console read routine
    pub kind: PollKind,

    /// Time of the first poll
    pub first_frame_us: u64,

    /// Time between two polls
    pub frame_interval_us: u64,

    /// Time between two select edges within a poll
    pub pulse_us: u64,

    /// Delay between an edge and the console sampling D0-D5
    pub settle_ns: u64,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            hold_at_power_on: SfcButtons::empty(),
            pressed: SfcButtons::empty(),
            connected: true,
            frames: 4,
            kind: PollKind::SixButton,
            first_frame_us: 1_000,
            frame_interval_us: 16_683,
            pulse_us: 5,
            settle_ns: 2_000,
        }
    }
}

impl Scenario {
    /// Check that the polls form one ordered select waveform
    ///
    /// # Errors
    ///
    /// [`AdapterError::InvalidScenario`] if the select pulses have no width,
    /// if the console would sample after the next edge, or if a frame starts
    /// before the previous burst has ended.
    pub fn validate(&self) -> Result<()> {
        if self.pulse_us == 0 {
            return Err(AdapterError::InvalidScenario {
                field: "pulse_us",
                reason: "must be non-zero",
            });
        }

        let pulse_ns = self.pulse_us.saturating_mul(1_000);
        if self.settle_ns >= pulse_ns {
            return Err(AdapterError::InvalidScenario {
                field: "settle_ns",
                reason: "must be shorter than pulse_us",
            });
        }

        let burst_ns = (2 * u64::from(self.kind.pulses()) - 1).saturating_mul(pulse_ns);
        if self.frame_interval_us.saturating_mul(1_000) <= burst_ns {
            return Err(AdapterError::InvalidScenario {
                field: "frame_interval_us",
                reason: "must exceed one select burst",
            });
        }

        Ok(())
    }

    /// One poll per frame
    pub fn polls(&self) -> Vec<ConsolePoll> {
        (0..u64::from(self.frames))
            .map(|frame| ConsolePoll {
                kind: self.kind,
                start_ns: (self.first_frame_us + frame * self.frame_interval_us) * 1_000,
                half_period_ns: self.pulse_us * 1_000,
            })
            .collect()
    }
}

/// One console frame as seen on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameReport {
    pub index: u32,
    pub start_us: u64,
    /// Raw D0-D5 bytes at each sample point
    pub samples: Vec<u8>,
    pub reading: ConsoleReading,
}

/// Outcome of a simulation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub layout: String,
    pub kind: PollKind,
    pub frames: Vec<FrameReport>,
    /// Host pad reads, the power-on read included
    pub host_reads: u32,
    pub watchdog_overflows: u32,
    pub duration_us: u64,
}

/// Run `scenario` against the adapter engine
///
/// # Errors
///
/// Returns the validation error if `config` or `scenario` is not usable.
pub fn run(config: Config, scenario: &Scenario) -> Result<Report> {
    config.validate()?;
    scenario.validate()?;

    let polls = scenario.polls();
    let mut select = SelectWaveform::new(config.target.select_idle_high);
    for poll in &polls {
        select.add_poll(poll);
    }

    // Leave room for the watchdog to expire after the last burst
    let timeout_ns = u64::from(config.watchdog.timeout_us) * 1_000;
    let horizon_ns = polls
        .last()
        .map_or(scenario.first_frame_us * 1_000, ConsolePoll::end_ns)
        + 2 * timeout_ns;

    let signal = RestartSignal::new();
    let mut board = SimBoard::new(&signal, config)
        .with_select(select)
        .with_held(scenario.hold_at_power_on)
        .with_horizon(horizon_ns);
    board.pad_mut().set_connected(scenario.connected);

    log::info!(
        "Simulating {} {:?} frames, horizon {}us",
        scenario.frames,
        scenario.kind,
        horizon_ns / 1_000
    );

    let mut engine = EmulationEngine::power_on(board, &signal, config);
    engine.board_mut().pad_mut().set_held(scenario.pressed);

    while !engine.board().finished() {
        engine.step();
    }

    let layout = engine.layout();
    let board = engine.into_board();

    let frames = polls
        .iter()
        .zip(0u32..)
        .map(|(poll, index)| {
            let samples: Vec<DataLines> = poll
                .sample_times(scenario.settle_ns)
                .into_iter()
                .map(|t| board.lines_at(t).unwrap_or(DataLines::all()))
                .collect();
            FrameReport {
                index,
                start_us: poll.start_ns / 1_000,
                samples: samples.iter().map(|lines| lines.bits()).collect(),
                reading: ConsoleReading::decode(&samples).unwrap_or_default(),
            }
        })
        .collect();

    Ok(Report {
        layout: layout.to_string(),
        kind: scenario.kind,
        frames,
        host_reads: board.host_reads(),
        watchdog_overflows: board.watchdog_overflows(),
        duration_us: board.now_ns() / 1_000,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_pad_reads_released() {
        let report = run(Config::default(), &Scenario::default()).unwrap();
        assert_eq!(report.layout, "XC");
        assert_eq!(report.frames.len(), 4);
        for frame in &report.frames {
            assert!(frame.reading.six_button);
            assert!(frame.reading.pressed_names().is_empty());
            assert_eq!(frame.samples, vec![0x3F, 0x33, 0x3F, 0x33, 0x3F, 0x30, 0x3F, 0x3F, 0x3F]);
        }
    }

    #[test]
    fn test_watchdog_expires_once_per_frame() {
        let report = run(Config::default(), &Scenario::default()).unwrap();
        assert_eq!(report.watchdog_overflows, 4);
        // Power-on, first entry, one per frame, and the final stop
        assert_eq!(report.host_reads, 1 + 1 + 4 + 1);
    }

    #[test]
    fn test_pressed_buttons_reach_console() {
        let scenario = Scenario {
            pressed: SfcButtons::B | SfcButtons::L | SfcButtons::DOWN | SfcButtons::SELECT,
            ..Scenario::default()
        };
        let report = run(Config::default(), &scenario).unwrap();
        for frame in &report.frames {
            assert_eq!(frame.reading.pressed_names(), vec!["Down", "A", "Z", "Mode"]);
        }
    }

    #[test]
    fn test_layout_from_power_on_hold() {
        let scenario = Scenario {
            hold_at_power_on: SfcButtons::LEFT,
            pressed: SfcButtons::Y,
            frames: 1,
            ..Scenario::default()
        };
        let report = run(Config::default(), &scenario).unwrap();
        assert_eq!(report.layout, "AB");
        assert_eq!(report.frames[0].reading.pressed_names(), vec!["A"]);
    }

    #[test]
    fn test_three_button_console() {
        let scenario = Scenario {
            kind: PollKind::ThreeButton,
            pressed: SfcButtons::A | SfcButtons::X,
            frames: 3,
            ..Scenario::default()
        };
        let report = run(Config::default(), &scenario).unwrap();
        assert_eq!(report.watchdog_overflows, 3);
        for frame in &report.frames {
            assert_eq!(frame.samples.len(), 5);
            assert!(!frame.reading.six_button);
            // Host A is target B under XC, host X has no 3-button counterpart
            assert_eq!(frame.reading.pressed_names(), vec!["B"]);
        }
    }

    #[test]
    fn test_disconnected_pad_reads_released() {
        let scenario = Scenario {
            connected: false,
            hold_at_power_on: SfcButtons::RIGHT,
            pressed: SfcButtons::all(),
            frames: 2,
            ..Scenario::default()
        };
        let report = run(Config::default(), &scenario).unwrap();
        assert_eq!(report.layout, "XC");
        assert!(report.frames.iter().all(|f| f.reading.pressed_names().is_empty()));
    }

    #[test]
    fn test_inverted_select_polarity() {
        let mut config = Config::default();
        config.target.select_idle_high = false;
        let scenario = Scenario {
            pressed: SfcButtons::START | SfcButtons::R,
            frames: 2,
            ..Scenario::default()
        };
        let report = run(config, &scenario).unwrap();
        for frame in &report.frames {
            assert!(frame.reading.six_button);
            assert_eq!(frame.reading.pressed_names(), vec!["C", "Start"]);
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = Config::default();
        config.watchdog.timeout_us = 100;
        assert!(matches!(
            run(config, &Scenario::default()),
            Err(AdapterError::WatchdogTooShort { .. })
        ));
    }

    #[test]
    fn test_overlapping_frames_rejected() {
        // A 6-button burst spans 7 pulse widths, 35us here
        let scenario = Scenario {
            frame_interval_us: 10,
            pulse_us: 5,
            frames: 2,
            ..Scenario::default()
        };
        assert!(matches!(
            run(Config::default(), &scenario),
            Err(AdapterError::InvalidScenario {
                field: "frame_interval_us",
                ..
            })
        ));

        let back_to_back = Scenario {
            frame_interval_us: 36,
            ..scenario.clone()
        };
        assert!(back_to_back.validate().is_ok());

        let three_button = Scenario {
            kind: PollKind::ThreeButton,
            frame_interval_us: 15,
            ..scenario
        };
        assert!(three_button.validate().is_err());
    }

    #[test]
    fn test_zero_pulse_rejected() {
        let scenario = Scenario {
            pulse_us: 0,
            ..Scenario::default()
        };
        assert!(matches!(
            run(Config::default(), &scenario),
            Err(AdapterError::InvalidScenario {
                field: "pulse_us",
                ..
            })
        ));
    }

    #[test]
    fn test_settle_longer_than_pulse_rejected() {
        let scenario = Scenario {
            pulse_us: 2,
            settle_ns: 2_000,
            ..Scenario::default()
        };
        assert!(matches!(
            scenario.validate(),
            Err(AdapterError::InvalidScenario {
                field: "settle_ns",
                ..
            })
        ));
        assert!(Scenario::default().validate().is_ok());
    }

    #[test]
    fn test_report_serializes() {
        let scenario = Scenario {
            frames: 1,
            ..Scenario::default()
        };
        let report = run(Config::default(), &scenario).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["layout"], "XC");
        assert_eq!(json["kind"], "six_button");
        assert_eq!(json["frames"][0]["reading"]["six_button"], true);
    }
}
