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

//! Simulated board
//!
//! Implements the board traits against a virtual nanosecond clock. Every GPIO
//! access costs a fixed amount of time and every delay advances the clock by
//! its length, so the engine's busy waits move simulated time forward the same
//! way they would burn cycles on real hardware.
//!
//! ## Watchdog
//!
//! `start_from_zero` sets a deadline `timeout_us` ahead. When the clock passes
//! it, the board plays the overflow interrupt: it stops the timer and calls
//! [`RestartSignal::on_overflow`].
//!
//! ## Horizon
//!
//! The engine waits forever for select edges. With a horizon set, the board
//! raises the restart signal once when the clock passes it and reports
//! [`finished`](SimBoard::finished), so a driver loop can stop cleanly.

use crate::core::config::Config;
use crate::core::controller::SfcButtons;
use crate::core::engine::RestartSignal;
use crate::core::hal::{Delay, Direction, Gpio, Line, WatchdogTimer};
use crate::core::schedule::DataLines;
use crate::sim::console::SelectWaveform;
use crate::sim::pad::ShiftRegisterPad;

/// Default cost of one GPIO access (one instruction at 16 MHz)
pub const DEFAULT_IO_COST_NS: u64 = 63;

/// Default cost of one select poll iteration, flag check included
pub const DEFAULT_POLL_COST_NS: u64 = 250;

/// Target port write as observed on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputWrite {
    pub at_ns: u64,
    pub lines: DataLines,
}

/// Simulated board with a host pad, a console and a watchdog timer
pub struct SimBoard<'s> {
    /// Overflow "interrupt" target
    signal: &'s RestartSignal,

    /// Virtual clock
    now_ns: u64,

    io_cost_ns: u64,
    poll_cost_ns: u64,

    /// Watchdog period
    timeout_ns: u64,

    /// Pending watchdog overflow, `None` while stopped
    deadline_ns: Option<u64>,

    /// Host pad on the latch/clock/data lines
    pad: ShiftRegisterPad,

    /// Console side select line
    select: SelectWaveform,

    /// Current D0-D5 levels
    lines: DataLines,

    /// Every target port write
    writes: Vec<OutputWrite>,

    /// Configured direction of each line
    directions: [Option<Direction>; 10],

    /// Rising latch edges
    host_reads: u32,

    watchdog_overflows: u32,

    horizon_ns: Option<u64>,
    finished: bool,
}

impl<'s> SimBoard<'s> {
    /// Create a board with a released, connected pad and an idle console
    pub fn new(signal: &'s RestartSignal, config: Config) -> Self {
        Self {
            signal,
            now_ns: 0,
            io_cost_ns: DEFAULT_IO_COST_NS,
            poll_cost_ns: DEFAULT_POLL_COST_NS,
            timeout_ns: u64::from(config.watchdog.timeout_us) * 1_000,
            deadline_ns: None,
            pad: ShiftRegisterPad::new(SfcButtons::empty()),
            select: SelectWaveform::new(config.target.select_idle_high),
            lines: DataLines::empty(),
            writes: Vec::new(),
            directions: [None; 10],
            host_reads: 0,
            watchdog_overflows: 0,
            horizon_ns: None,
            finished: false,
        }
    }

    /// Stop the simulation at `horizon_ns`
    pub fn with_horizon(mut self, horizon_ns: u64) -> Self {
        self.horizon_ns = Some(horizon_ns);
        self
    }

    /// Hold `buttons` on the host pad
    pub fn with_held(mut self, buttons: SfcButtons) -> Self {
        self.pad.set_held(buttons);
        self
    }

    pub fn with_select(mut self, select: SelectWaveform) -> Self {
        self.select = select;
        self
    }

    pub fn with_poll_cost(mut self, poll_cost_ns: u64) -> Self {
        self.poll_cost_ns = poll_cost_ns;
        self
    }

    pub fn pad(&self) -> &ShiftRegisterPad {
        &self.pad
    }

    pub fn pad_mut(&mut self) -> &mut ShiftRegisterPad {
        &mut self.pad
    }

    pub fn select(&self) -> &SelectWaveform {
        &self.select
    }

    pub fn select_mut(&mut self) -> &mut SelectWaveform {
        &mut self.select
    }

    /// Current virtual time
    pub fn now_ns(&self) -> u64 {
        self.now_ns
    }

    /// Every target port write so far
    pub fn writes(&self) -> &[OutputWrite] {
        &self.writes
    }

    /// D0-D5 levels on the wire at `t_ns`
    ///
    /// `None` before the first write.
    pub fn lines_at(&self, t_ns: u64) -> Option<DataLines> {
        let i = self.writes.partition_point(|w| w.at_ns <= t_ns);
        i.checked_sub(1).map(|i| self.writes[i].lines)
    }

    /// Current D0-D5 levels
    pub fn lines(&self) -> DataLines {
        self.lines
    }

    /// Host pad reads started so far
    pub fn host_reads(&self) -> u32 {
        self.host_reads
    }

    pub fn watchdog_overflows(&self) -> u32 {
        self.watchdog_overflows
    }

    pub fn watchdog_running(&self) -> bool {
        self.deadline_ns.is_some()
    }

    pub fn direction(&self, line: Line) -> Option<Direction> {
        self.directions[slot(line)]
    }

    /// Horizon reached
    pub fn finished(&self) -> bool {
        self.finished
    }

    /// Move the clock forward and fire whatever fell due
    fn advance(&mut self, ns: u64) {
        self.now_ns += ns;
        self.pad.apply_due(self.now_ns);

        if let Some(deadline) = self.deadline_ns {
            if self.now_ns >= deadline {
                self.deadline_ns = None;
                self.watchdog_overflows += 1;
                log::trace!("Watchdog overflow at {}ns", deadline);
                self.signal.on_overflow();
            }
        }

        if let Some(horizon) = self.horizon_ns {
            if !self.finished && self.now_ns >= horizon {
                self.finished = true;
                log::debug!("Simulation horizon reached at {}ns", self.now_ns);
                self.signal.on_overflow();
            }
        }
    }

    fn drive(&mut self, line: Line, high: bool) {
        self.advance(self.io_cost_ns);
        debug_assert_eq!(
            self.direction(line),
            Some(Direction::Output),
            "{:?} driven before being configured as output",
            line
        );

        match line {
            Line::Latch => {
                if high {
                    self.host_reads += 1;
                }
                self.pad.set_latch(high);
            }
            Line::Clock => self.pad.set_clock(high),
            Line::HostData | Line::Select => {
                log::warn!("Ignoring write to input line {:?}", line);
            }
            data => {
                let bit = DataLines::from_bits_truncate(1 << (slot(data) - 4));
                let mut lines = self.lines;
                lines.set(bit, high);
                self.record(lines);
            }
        }
    }

    fn record(&mut self, lines: DataLines) {
        self.lines = lines;
        self.writes.push(OutputWrite {
            at_ns: self.now_ns,
            lines,
        });
    }
}

fn slot(line: Line) -> usize {
    match line {
        Line::Latch => 0,
        Line::Clock => 1,
        Line::HostData => 2,
        Line::Select => 3,
        Line::D0 => 4,
        Line::D1 => 5,
        Line::D2 => 6,
        Line::D3 => 7,
        Line::D4 => 8,
        Line::D5 => 9,
    }
}

impl Gpio for SimBoard<'_> {
    fn configure(&mut self, line: Line, direction: Direction) {
        self.advance(self.io_cost_ns);
        self.directions[slot(line)] = Some(direction);
    }

    fn set_high(&mut self, line: Line) {
        self.drive(line, true);
    }

    fn set_low(&mut self, line: Line) {
        self.drive(line, false);
    }

    fn read(&mut self, line: Line) -> bool {
        match line {
            Line::Select => {
                self.advance(self.poll_cost_ns);
                self.select.level_at(self.now_ns)
            }
            Line::HostData => {
                self.advance(self.io_cost_ns);
                self.pad.data()
            }
            other => {
                self.advance(self.io_cost_ns);
                self.lines_level(other)
            }
        }
    }

    /// D0-D5 share one port
    fn write_data_lines(&mut self, levels: DataLines) {
        self.advance(self.io_cost_ns);
        self.record(levels);
    }
}

impl SimBoard<'_> {
    fn lines_level(&self, line: Line) -> bool {
        match slot(line) {
            s @ 4..=9 => self.lines.bits() & (1 << (s - 4)) != 0,
            _ => false,
        }
    }
}

impl Delay for SimBoard<'_> {
    fn delay_us(&mut self, us: u32) {
        self.advance(u64::from(us) * 1_000);
    }
}

impl WatchdogTimer for SimBoard<'_> {
    fn stop(&mut self) {
        self.deadline_ns = None;
    }

    fn start_from_zero(&mut self) {
        self.deadline_ns = Some(self.now_ns + self.timeout_ns);
    }
}
