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

//! Simulated console side of the target port
//!
//! A console polls the pad once per frame by pulsing the select line and
//! reading D0-D5 after every edge. 3-button software issues two pulses per
//! frame, 6-button aware software issues four.
//!
//! ## Six-button read sequence
//!
//! ```text
//! select  ‾‾|__|‾‾|__|‾‾|__|‾‾|__|‾‾
//! sample  s0  s1 s2 s3 s4 s5 s6 s7 s8
//!                         │  │
//!                         │  └─ Z Y X Mode
//!                         └──── D0-D3 all low: six-button pad present
//! ```
//!
//! A 3-button poll takes only `s0..s4`.

use serde::Serialize;

use crate::core::schedule::DataLines;

/// Select line level over time
///
/// Holds the idle level until the first transition; transitions are kept
/// sorted by time.
#[derive(Debug, Clone, Default)]
pub struct SelectWaveform {
    idle_high: bool,
    transitions: Vec<(u64, bool)>,
}

impl SelectWaveform {
    pub fn new(idle_high: bool) -> Self {
        Self {
            idle_high,
            transitions: Vec::new(),
        }
    }

    /// Change the level at `at_ns`
    ///
    /// Transitions must be pushed in time order.
    pub fn push(&mut self, at_ns: u64, high: bool) {
        debug_assert!(
            self.transitions.last().is_none_or(|&(t, _)| t <= at_ns),
            "select transitions must be pushed in order"
        );
        self.transitions.push((at_ns, high));
    }

    /// Level of the line at `t_ns`
    pub fn level_at(&self, t_ns: u64) -> bool {
        let i = self.transitions.partition_point(|&(at, _)| at <= t_ns);
        match i {
            0 => self.idle_high,
            _ => self.transitions[i - 1].1,
        }
    }

    /// Time of the last transition, if any
    pub fn last_transition_ns(&self) -> Option<u64> {
        self.transitions.last().map(|&(at, _)| at)
    }

    /// Add every edge of `poll`
    pub fn add_poll(&mut self, poll: &ConsolePoll) {
        for (at, level) in poll.transitions(self.idle_high) {
            self.push(at, level);
        }
    }
}

/// Kind of per-frame read routine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PollKind {
    /// Two select pulses
    ThreeButton,
    /// Four select pulses
    SixButton,
}

impl PollKind {
    /// Select pulses issued per frame
    pub const fn pulses(self) -> u32 {
        match self {
            PollKind::ThreeButton => 2,
            PollKind::SixButton => 4,
        }
    }
}

/// One frame's burst of select pulses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsolePoll {
    pub kind: PollKind,
    /// Time of the first edge
    pub start_ns: u64,
    /// Time between two edges
    pub half_period_ns: u64,
}

impl ConsolePoll {
    /// Edges of the burst as (time, level)
    pub fn transitions(&self, idle_high: bool) -> Vec<(u64, bool)> {
        let edges = 2 * u64::from(self.kind.pulses());
        (0..edges)
            .map(|k| {
                let level = if k % 2 == 0 { !idle_high } else { idle_high };
                (self.start_ns + k * self.half_period_ns, level)
            })
            .collect()
    }

    /// Times at which the console samples the data lines
    ///
    /// One sample just before the first edge, then one `settle_ns` after each
    /// edge.
    pub fn sample_times(&self, settle_ns: u64) -> Vec<u64> {
        let edges = 2 * u64::from(self.kind.pulses());
        std::iter::once(self.start_ns.saturating_sub(1))
            .chain((0..edges).map(|k| self.start_ns + k * self.half_period_ns + settle_ns))
            .collect()
    }

    /// Time of the last edge
    pub fn end_ns(&self) -> u64 {
        self.start_ns + (2 * u64::from(self.kind.pulses()) - 1) * self.half_period_ns
    }
}

/// Target pad state as decoded by console software
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ConsoleReading {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub a: bool,
    pub b: bool,
    pub c: bool,
    pub start: bool,
    pub x: bool,
    pub y: bool,
    pub z: bool,
    pub mode: bool,
    /// Pad answered the six-button identification
    pub six_button: bool,
}

impl ConsoleReading {
    /// Decode the samples of one poll, `true` meaning pressed
    ///
    /// Needs at least the two samples of the first pulse. The extra buttons are
    /// only decoded when the identification sample (`s5`) shows the all-low
    /// nibble.
    pub fn decode(samples: &[DataLines]) -> Option<Self> {
        let high = *samples.first()?;
        let low = *samples.get(1)?;
        let pressed = |lines: DataLines, line: DataLines| !lines.contains(line);

        let mut reading = ConsoleReading {
            up: pressed(high, DataLines::D0),
            down: pressed(high, DataLines::D1),
            left: pressed(high, DataLines::D2),
            right: pressed(high, DataLines::D3),
            b: pressed(high, DataLines::D4),
            c: pressed(high, DataLines::D5),
            a: pressed(low, DataLines::D4),
            start: pressed(low, DataLines::D5),
            ..ConsoleReading::default()
        };

        if let (Some(&identify), Some(&extra)) = (samples.get(5), samples.get(6)) {
            if identify & DataLines::NIBBLE == DataLines::empty() {
                reading.six_button = true;
                reading.z = pressed(extra, DataLines::D0);
                reading.y = pressed(extra, DataLines::D1);
                reading.x = pressed(extra, DataLines::D2);
                reading.mode = pressed(extra, DataLines::D3);
            }
        }

        Some(reading)
    }

    /// Short label list of the pressed buttons
    pub fn pressed_names(&self) -> Vec<&'static str> {
        [
            (self.up, "Up"),
            (self.down, "Down"),
            (self.left, "Left"),
            (self.right, "Right"),
            (self.a, "A"),
            (self.b, "B"),
            (self.c, "C"),
            (self.x, "X"),
            (self.y, "Y"),
            (self.z, "Z"),
            (self.start, "Start"),
            (self.mode, "Mode"),
        ]
        .into_iter()
        .filter_map(|(held, name)| held.then_some(name))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::controller::{ButtonSnapshot, SfcButtons};
    use crate::core::layout::Layout;
    use crate::core::schedule::build;

    fn six_button_samples(snapshot: ButtonSnapshot, layout: Layout) -> Vec<DataLines> {
        let e = *build(snapshot, layout).entries();
        vec![e[0], e[1], e[2], e[3], e[4], e[5], e[6], e[7], e[0]]
    }

    #[test]
    fn test_waveform_levels() {
        let mut select = SelectWaveform::new(true);
        select.push(100, false);
        select.push(200, true);

        assert!(select.level_at(0));
        assert!(select.level_at(99));
        assert!(!select.level_at(100));
        assert!(!select.level_at(199));
        assert!(select.level_at(200));
        assert_eq!(select.last_transition_ns(), Some(200));
    }

    #[test]
    fn test_poll_edges() {
        let poll = ConsolePoll {
            kind: PollKind::SixButton,
            start_ns: 1_000,
            half_period_ns: 500,
        };
        let edges = poll.transitions(true);
        assert_eq!(edges.len(), 8);
        assert_eq!(edges[0], (1_000, false));
        assert_eq!(edges[1], (1_500, true));
        assert_eq!(edges[7], (4_500, true));
        assert_eq!(poll.end_ns(), 4_500);
        assert_eq!(poll.sample_times(100).len(), 9);

        let inverted = poll.transitions(false);
        assert_eq!(inverted[0], (1_000, true));
    }

    #[test]
    fn test_three_button_poll_has_two_pulses() {
        let poll = ConsolePoll {
            kind: PollKind::ThreeButton,
            start_ns: 0,
            half_period_ns: 10,
        };
        assert_eq!(poll.transitions(true).len(), 4);
        assert_eq!(poll.sample_times(1).len(), 5);
    }

    #[test]
    fn test_decode_released() {
        let samples = six_button_samples(ButtonSnapshot::RELEASED, Layout::Xc);
        let reading = ConsoleReading::decode(&samples).unwrap();
        assert!(reading.six_button);
        assert!(reading.pressed_names().is_empty());
    }

    #[test]
    fn test_decode_face_and_extra_buttons() {
        // Host B/R/Y/L under XC are target A/C/X/Z
        let snapshot = ButtonSnapshot::from_pressed(
            SfcButtons::B | SfcButtons::R | SfcButtons::Y | SfcButtons::L | SfcButtons::UP,
        );
        let reading = ConsoleReading::decode(&six_button_samples(snapshot, Layout::Xc)).unwrap();
        assert_eq!(reading.pressed_names(), vec!["Up", "A", "C", "X", "Z"]);
    }

    #[test]
    fn test_decode_three_button_poll() {
        let samples = six_button_samples(ButtonSnapshot::from_pressed(SfcButtons::START), Layout::Ab);
        let reading = ConsoleReading::decode(&samples[..5]).unwrap();
        assert!(!reading.six_button);
        assert!(reading.start);
    }

    #[test]
    fn test_decode_needs_two_samples() {
        assert!(ConsoleReading::decode(&[DataLines::all()]).is_none());
    }
}
