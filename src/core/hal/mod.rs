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

//! Hardware collaborator interfaces
//!
//! The adapter core never touches registers directly. A board implements these
//! traits once (for a microcontroller, or [`crate::sim::SimBoard`] on the host)
//! and the same protocol code runs on top of it.
//!
//! # Lines
//!
//! ```text
//!  host pad side                 target port side
//!  ┌──────────┐                  ┌──────────────────┐
//!  │ Latch  ──┼── out            │ D0..D5  ── out   │
//!  │ Clock  ──┼── out            │ Select  ── in    │
//!  │ HostData─┼── in             └──────────────────┘
//!  └──────────┘
//! ```
//!
//! # Watchdog overflow
//!
//! The overflow notification is not part of [`WatchdogTimer`]. The board's
//! overflow interrupt calls [`RestartSignal::on_overflow`] and nothing else.
//!
//! [`RestartSignal::on_overflow`]: crate::core::engine::RestartSignal::on_overflow

use crate::core::schedule::DataLines;

/// Named digital line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Line {
    /// Host pad latch (output)
    Latch,
    /// Host pad clock (output, idles high)
    Clock,
    /// Host pad serial data (input, active low)
    HostData,
    /// Target port select (input, driven by the console)
    Select,
    /// Target port data line 0
    D0,
    /// Target port data line 1
    D1,
    /// Target port data line 2
    D2,
    /// Target port data line 3
    D3,
    /// Target port data line 4
    D4,
    /// Target port data line 5
    D5,
}

impl Line {
    /// Target data lines in bit order of [`DataLines`]
    pub const DATA: [Line; 6] = [Line::D0, Line::D1, Line::D2, Line::D3, Line::D4, Line::D5];
}

/// Pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Line is sampled with [`Gpio::read`]
    Input,
    /// Line is driven with [`Gpio::set_high`] / [`Gpio::set_low`]
    Output,
}

/// GPIO primitives
pub trait Gpio {
    /// Configure a line as input or output
    fn configure(&mut self, line: Line, direction: Direction);

    /// Drive an output line high
    fn set_high(&mut self, line: Line);

    /// Drive an output line low
    fn set_low(&mut self, line: Line);

    /// Sample a line; `true` means high
    fn read(&mut self, line: Line) -> bool;

    /// Drive all six target data lines at once
    ///
    /// Bit *i* of `levels` is the level of line D*i*. The default drives the
    /// lines one by one; boards whose data lines share a port should override
    /// this with a single port write, since the write sits on the edge-to-output
    /// critical path.
    fn write_data_lines(&mut self, levels: DataLines) {
        for (bit, line) in Line::DATA.into_iter().enumerate() {
            if levels.bits() & (1 << bit) != 0 {
                self.set_high(line);
            } else {
                self.set_low(line);
            }
        }
    }
}

/// Microsecond busy delay
///
/// # Example
///
/// ```
/// use sixpad::core::hal::Delay;
///
/// struct CycleCounter(u64);
///
/// impl Delay for CycleCounter {
///     fn delay_us(&mut self, us: u32) {
///         self.0 += u64::from(us) * 16;
///     }
/// }
///
/// let mut delay = CycleCounter(0);
/// delay.delay_us(12);
/// assert_eq!(delay.0, 192);
/// ```
pub trait Delay {
    /// Busy-wait for at least `us` microseconds
    fn delay_us(&mut self, us: u32);
}

/// Watchdog timer control
///
/// The overflow period is fixed by the board (a few milliseconds, see
/// [`WatchdogConfig`](crate::core::config::WatchdogConfig)).
pub trait WatchdogTimer {
    /// Stop counting; no overflow can be raised until the next start
    fn stop(&mut self);

    /// Reset the count to zero and start (or keep) counting
    fn start_from_zero(&mut self);
}

/// Everything the engine needs from a board
pub trait Board: Gpio + Delay + WatchdogTimer {}

impl<T: Gpio + Delay + WatchdogTimer> Board for T {}
