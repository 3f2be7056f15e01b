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

//! Simulated shift-register pad
//!
//! Behaves like the 16-bit parallel-in/serial-out register inside the host
//! pad: while the latch is high the register continuously loads the buttons,
//! each rising clock edge (latch low) shifts it left with a 1 shifted in, and
//! the data line always shows the most significant bit.

use std::collections::VecDeque;

use crate::core::controller::SfcButtons;

/// Simulated host pad
#[derive(Debug, Clone)]
pub struct ShiftRegisterPad {
    /// Buttons currently held
    held: SfcButtons,

    /// Cable plugged in
    connected: bool,

    /// Shift register contents (active low)
    register: u16,

    /// Last latch level
    latch: bool,

    /// Last clock level
    clock: bool,

    /// Pending (time_ns, held) changes, sorted by time
    changes: VecDeque<(u64, SfcButtons)>,
}

impl ShiftRegisterPad {
    pub fn new(held: SfcButtons) -> Self {
        Self {
            held,
            connected: true,
            register: 0xFFFF,
            latch: false,
            clock: true,
            changes: VecDeque::new(),
        }
    }

    /// Buttons currently held
    pub fn held(&self) -> SfcButtons {
        self.held
    }

    /// Change the held buttons immediately
    pub fn set_held(&mut self, held: SfcButtons) {
        self.held = held;
        if self.latch {
            self.load();
        }
    }

    /// Plug or unplug the pad
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    /// Schedule a change of the held buttons at `at_ns`
    ///
    /// Changes must be scheduled in time order.
    pub fn schedule(&mut self, at_ns: u64, held: SfcButtons) {
        debug_assert!(
            self.changes.back().is_none_or(|&(t, _)| t <= at_ns),
            "pad changes must be scheduled in order"
        );
        self.changes.push_back((at_ns, held));
    }

    /// Apply every scheduled change due at `now_ns`
    pub fn apply_due(&mut self, now_ns: u64) {
        while let Some(&(at, held)) = self.changes.front() {
            if at > now_ns {
                break;
            }
            self.changes.pop_front();
            self.set_held(held);
        }
    }

    pub fn set_latch(&mut self, high: bool) {
        self.latch = high;
        if high {
            self.load();
        }
    }

    pub fn set_clock(&mut self, high: bool) {
        let rising = high && !self.clock;
        if rising && !self.latch {
            self.register = (self.register << 1) | 1;
        }
        self.clock = high;
    }

    /// Level of the data line
    ///
    /// An unplugged pad leaves the line to its pull-up.
    pub fn data(&self) -> bool {
        !self.connected || self.register & 0x8000 != 0
    }

    fn load(&mut self) {
        self.register = !self.held.bits();
    }
}
