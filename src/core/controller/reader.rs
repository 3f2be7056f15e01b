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

//! Shift-register read protocol
//!
//! The host pad is a 16-bit parallel-in/serial-out register on the end of a
//! cable. A read latches the buttons, then clocks them out one bit at a time:
//!
//! ```text
//! Latch  ___|‾‾‾‾12us‾‾‾|_____________________________________
//! Clock  ‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾|___|‾‾‾|___|‾‾‾ ... (16 cycles)
//!                            ^ sample     ^ sample
//! Data   ---- bit 15 ---------X-- bit 14 --X-- ...
//! ```
//!
//! Data is sampled right after each falling clock edge, most significant bit
//! first. The protocol is open loop: there is no acknowledge and no error
//! path. With no pad attached the data line's pull-up reads 1 on every bit, so
//! a disconnected pad yields [`ButtonSnapshot::RELEASED`].

use super::ButtonSnapshot;
use crate::core::config::HostTiming;
use crate::core::hal::{Delay, Direction, Gpio, Line};

/// Number of bits shifted out per read
const BITS_PER_READ: u32 = 16;

/// Host pad reader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostReader {
    timing: HostTiming,
}

impl HostReader {
    /// Create a reader with the given pulse timings
    pub const fn new(timing: HostTiming) -> Self {
        Self { timing }
    }

    /// Configure the host pad lines
    ///
    /// Latch and clock become outputs, data becomes an input. The clock idles
    /// high and the latch idles low.
    pub fn init<G: Gpio>(&self, gpio: &mut G) {
        gpio.configure(Line::Latch, Direction::Output);
        gpio.configure(Line::Clock, Direction::Output);
        gpio.configure(Line::HostData, Direction::Input);
        gpio.set_low(Line::Latch);
        gpio.set_high(Line::Clock);
    }

    /// Perform one complete read
    ///
    /// Takes about [`read_duration_us`](Self::read_duration_us) microseconds.
    /// Must never run while the watchdog timer is counting.
    pub fn read<B: Gpio + Delay>(&self, board: &mut B) -> ButtonSnapshot {
        let half = self.timing.clock_half_period_us;

        board.set_high(Line::Latch);
        board.delay_us(self.timing.latch_pulse_us);
        board.set_low(Line::Latch);

        let mut raw = 0u16;
        for _ in 0..BITS_PER_READ {
            board.delay_us(half);
            board.set_low(Line::Clock);
            raw = (raw << 1) | u16::from(board.read(Line::HostData));
            board.delay_us(half);
            board.set_high(Line::Clock);
        }

        log::trace!("Host pad read: 0x{:04X}", raw);

        ButtonSnapshot::from_raw(raw)
    }

    /// Nominal duration of one read in microseconds
    ///
    /// ```
    /// use sixpad::core::config::HostTiming;
    /// use sixpad::core::controller::HostReader;
    ///
    /// let reader = HostReader::new(HostTiming::default());
    /// assert_eq!(reader.read_duration_us(), 12 + 32 * 6);
    /// ```
    pub const fn read_duration_us(&self) -> u32 {
        self.timing.latch_pulse_us + 2 * BITS_PER_READ * self.timing.clock_half_period_us
    }
}

impl Default for HostReader {
    fn default() -> Self {
        Self::new(HostTiming::default())
    }
}
