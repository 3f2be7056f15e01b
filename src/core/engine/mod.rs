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

//! Target pad emulation engine
//!
//! Answers the console's select-line edges with the precomputed
//! [`OutputSchedule`], and keeps the schedule fresh by re-sampling the host pad
//! whenever the watchdog reports that the console has gone quiet.
//!
//! ## Phase Cycle
//!
//! ```text
//! select (idle high) ‾‾‾‾|___|‾‾‾|___|‾‾‾|___|‾‾‾|___|‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾
//! phase              0   1   2   3   4   5   6   7   0
//! entry driven       e0  e1  e2  e3  e4  e5  e6  e7  e0
//! watchdog               arm arm arm arm arm arm arm ..(expires)..► resync
//! ```
//!
//! Each phase blocks until the select line reaches the level it expects (even
//! phases: idle level, odd phases: active level), writes its entry, and from
//! phase 1 on restarts the watchdog count from zero.
//!
//! ## Resync
//!
//! When the watchdog overflows, its interrupt raises the [`RestartSignal`].
//! The edge wait polls that flag on every iteration; on seeing it the engine
//!
//! 1. stops the watchdog,
//! 2. clears the flag,
//! 3. reads the host pad and rebuilds the whole schedule,
//! 4. resumes at phase 0.
//!
//! The schedule, phase and snapshot are only ever written here, in the
//! foreground, while the watchdog is stopped. Consoles that poll as a 3-button
//! pad (two pulses) never reach phase 5; the resync after their burst puts the
//! engine back at phase 0 before the next frame.

mod phase;
mod signal;

#[cfg(all(test, feature = "std"))]
mod tests;

pub use phase::PhaseIndex;
pub use signal::RestartSignal;

use crate::core::config::Config;
use crate::core::controller::{ButtonSnapshot, HostReader};
use crate::core::hal::{Board, Direction, Line};
use crate::core::layout::{self, Layout};
use crate::core::schedule::{build, DataLines, OutputSchedule};

/// Outcome of one [`EmulationEngine::step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    /// The awaited select level was seen and `lines` were written
    Driven {
        /// Phase that was completed
        phase: PhaseIndex,
        /// Levels written to D0-D5
        lines: DataLines,
    },
    /// The host pad was re-sampled and the cycle restarted at phase 0
    Resynced {
        /// Fresh host snapshot
        snapshot: ButtonSnapshot,
    },
}

/// Target pad emulation engine
///
/// Owns the board and all mutable adapter state. The only thing shared with
/// interrupt context is the borrowed [`RestartSignal`].
///
/// # Example
///
/// ```no_run
/// # #[cfg(feature = "std")]
/// # {
/// use sixpad::core::config::Config;
/// use sixpad::core::engine::{EmulationEngine, RestartSignal};
/// use sixpad::sim::SimBoard;
///
/// static RESTART: RestartSignal = RestartSignal::new();
///
/// let board = SimBoard::new(&RESTART, Config::default());
/// let mut engine = EmulationEngine::power_on(board, &RESTART, Config::default());
/// engine.run();
/// # }
/// ```
pub struct EmulationEngine<'s, B: Board> {
    /// Board providing GPIO, delay and watchdog timer
    board: B,

    /// Restart request raised by the watchdog interrupt
    signal: &'s RestartSignal,

    /// Host pad reader
    reader: HostReader,

    /// Layout fixed at power-on
    layout: Layout,

    /// Level of the select line between polls
    select_idle_high: bool,

    /// Whether phase 0 also arms the watchdog
    arm_on_phase_zero: bool,

    /// Last host snapshot
    snapshot: ButtonSnapshot,

    /// Live output schedule
    schedule: OutputSchedule,

    /// Phase awaiting its select level
    phase: PhaseIndex,

    /// Entry for `phase`, loaded ahead of the edge
    next: DataLines,

    /// Set until the first resync has run
    resync_pending: bool,

    /// Number of resyncs performed
    resyncs: u32,
}

impl<'s, B: Board> EmulationEngine<'s, B> {
    /// One-time setup at power-on
    ///
    /// Configures all lines, drives the all-released answer, and takes the
    /// single host read that fixes the [`Layout`]. The watchdog stays stopped;
    /// the first [`step`](Self::step) samples the pad again before any phase
    /// is driven.
    ///
    /// `config` is expected to have passed [`Config::validate`].
    pub fn power_on(mut board: B, signal: &'s RestartSignal, config: Config) -> Self {
        board.stop();
        signal.acknowledge();

        let reader = HostReader::new(config.host);
        reader.init(&mut board);

        for line in Line::DATA {
            board.configure(line, Direction::Output);
        }
        board.configure(Line::Select, Direction::Input);

        let schedule = OutputSchedule::idle();
        board.write_data_lines(schedule[PhaseIndex::ZERO]);

        let layout = layout::select(&reader, &mut board);

        log::info!(
            "Adapter powered on: layout {}, select idle {}, watchdog {}us",
            layout,
            if config.target.select_idle_high { "high" } else { "low" },
            config.watchdog.timeout_us
        );

        Self {
            board,
            signal,
            reader,
            layout,
            select_idle_high: config.target.select_idle_high,
            arm_on_phase_zero: config.watchdog.arm_on_phase_zero,
            snapshot: ButtonSnapshot::RELEASED,
            schedule,
            phase: PhaseIndex::ZERO,
            next: schedule[PhaseIndex::ZERO],
            resync_pending: true,
            resyncs: 0,
        }
    }

    /// Run the adapter forever
    pub fn run(&mut self) -> ! {
        loop {
            self.step();
        }
    }

    /// Complete one phase, or one resync
    ///
    /// Blocks while the select line is away from the awaited level. The wait
    /// is abandoned as soon as a restart is requested.
    pub fn step(&mut self) -> PhaseEvent {
        if self.resync_pending {
            return self.resync();
        }

        let phase = self.phase;
        let awaited = phase.awaited_level(self.select_idle_high);

        loop {
            if self.signal.is_requested() {
                return self.resync();
            }
            if self.board.read(Line::Select) == awaited {
                break;
            }
        }

        let lines = self.next;
        self.board.write_data_lines(lines);
        if !phase.is_zero() || self.arm_on_phase_zero {
            self.board.start_from_zero();
        }

        self.phase = phase.next();
        self.next = self.schedule[self.phase];

        log::trace!("Phase {} drove 0x{:02X}", phase, lines.bits());

        PhaseEvent::Driven { phase, lines }
    }

    /// Restart path shared by first entry and watchdog expiry
    fn resync(&mut self) -> PhaseEvent {
        // Stop before clearing, so a late overflow cannot re-raise the flag
        self.board.stop();
        self.signal.acknowledge();
        self.resync_pending = false;

        let snapshot = self.reader.read(&mut self.board);
        self.snapshot = snapshot;
        self.schedule = build(snapshot, self.layout);
        self.phase = PhaseIndex::ZERO;
        self.next = self.schedule[PhaseIndex::ZERO];
        self.resyncs = self.resyncs.wrapping_add(1);

        log::debug!(
            "Resync #{}: host 0x{:04X}, schedule {:02X?}",
            self.resyncs,
            snapshot.raw(),
            self.schedule.to_bytes()
        );

        PhaseEvent::Resynced { snapshot }
    }

    /// Layout chosen at power-on
    #[inline]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Phase awaiting its select level
    #[inline]
    pub fn phase(&self) -> PhaseIndex {
        self.phase
    }

    /// Live output schedule
    #[inline]
    pub fn schedule(&self) -> &OutputSchedule {
        &self.schedule
    }

    /// Snapshot the live schedule was built from
    #[inline]
    pub fn snapshot(&self) -> ButtonSnapshot {
        self.snapshot
    }

    /// Number of resyncs since power-on, including the first entry
    #[inline]
    pub fn resync_count(&self) -> u32 {
        self.resyncs
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    pub fn into_board(self) -> B {
        self.board
    }
}
