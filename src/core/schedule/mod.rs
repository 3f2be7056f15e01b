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

//! Output schedule
//!
//! The target pad answers each select-line edge with a different view of its
//! buttons. The 8 views of one poll cycle are precomputed into an
//! [`OutputSchedule`] so that answering an edge is a single port write.
//!
//! ## Entry Layout
//!
//! Each entry holds the wire level of data lines D0-D5 (1 = high = released):
//!
//! ```text
//! entry | D0  D1   D2   D3     D4  D5
//! ------|---------------------------------
//!  0    | Up  Down Left Right  B   C
//!  1    | Up  Down 0    0      A   Start
//!  2    | = entry 0
//!  3    | = entry 1
//!  4    | = entry 0
//!  5    | 0   0    0    0      A   Start    six-button identification
//!  6    | Z   Y    X    Mode   B   C        extra buttons (Mode = Select)
//!  7    | 1   1    1    1      A   Start    idle confirmation
//! ```
//!
//! Entries 0-4 are the ordinary 3-button multiplexed answer, so consoles that
//! only ever issue two pulses never look past them. Some software checks the
//! all-high nibble of entry 7, so it must be reproduced exactly.

use core::ops::Index;

use crate::core::controller::{ButtonSnapshot, SfcButtons};
use crate::core::engine::PhaseIndex;
use crate::core::layout::Layout;

bitflags::bitflags! {
    /// Wire levels of the six target data lines (bit set = line high)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DataLines: u8 {
        const D0 = 1 << 0;
        const D1 = 1 << 1;
        const D2 = 1 << 2;
        const D3 = 1 << 3;
        const D4 = 1 << 4;
        const D5 = 1 << 5;
    }
}

impl DataLines {
    /// Low nibble (D0-D3)
    pub const NIBBLE: DataLines = DataLines::D0
        .union(DataLines::D1)
        .union(DataLines::D2)
        .union(DataLines::D3);

    /// Pack six wire levels, D0 first
    pub fn from_levels(levels: [bool; 6]) -> Self {
        let bits = levels
            .iter()
            .enumerate()
            .fold(0u8, |acc, (bit, &high)| acc | (u8::from(high) << bit));
        Self::from_bits_truncate(bits)
    }

    /// Unpack into six wire levels, D0 first
    pub fn levels(self) -> [bool; 6] {
        core::array::from_fn(|bit| self.bits() & (1 << bit) != 0)
    }
}

/// Number of entries in one poll cycle
pub const SCHEDULE_LEN: usize = 8;

/// The 8 precomputed answers of one poll cycle
///
/// Always replaced as a whole value; the engine never edits an entry in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputSchedule {
    entries: [DataLines; SCHEDULE_LEN],
}

impl OutputSchedule {
    /// Schedule for a pad with every button released
    pub fn idle() -> Self {
        build(ButtonSnapshot::RELEASED, Layout::Xc)
    }

    /// All 8 entries in phase order
    #[inline]
    pub fn entries(&self) -> &[DataLines; SCHEDULE_LEN] {
        &self.entries
    }

    /// Entry driven at `phase`
    #[inline(always)]
    pub fn entry(&self, phase: PhaseIndex) -> DataLines {
        self.entries[phase.index()]
    }

    /// Raw bytes, as they would be written to an 8-bit port with D0 at bit 0
    pub fn to_bytes(&self) -> [u8; SCHEDULE_LEN] {
        self.entries.map(|lines| lines.bits())
    }
}

impl Default for OutputSchedule {
    fn default() -> Self {
        Self::idle()
    }
}

impl Index<PhaseIndex> for OutputSchedule {
    type Output = DataLines;

    #[inline(always)]
    fn index(&self, phase: PhaseIndex) -> &DataLines {
        &self.entries[phase.index()]
    }
}

/// Build the schedule for a snapshot under a layout
///
/// Pure and deterministic.
///
/// # Examples
///
/// ```
/// use sixpad::core::controller::ButtonSnapshot;
/// use sixpad::core::layout::Layout;
/// use sixpad::core::schedule::build;
///
/// let schedule = build(ButtonSnapshot::RELEASED, Layout::Xc);
/// assert_eq!(
///     schedule.to_bytes(),
///     [0x3F, 0x33, 0x3F, 0x33, 0x3F, 0x30, 0x3F, 0x3F]
/// );
/// ```
pub fn build(snapshot: ButtonSnapshot, layout: Layout) -> OutputSchedule {
    let face = layout.resolve(snapshot);
    let held = |button: SfcButtons| snapshot.is_pressed(button);

    // Wire level: a pressed button pulls its line low
    let up = !held(SfcButtons::UP);
    let down = !held(SfcButtons::DOWN);
    let left = !held(SfcButtons::LEFT);
    let right = !held(SfcButtons::RIGHT);
    let start = !held(SfcButtons::START);
    let mode = !held(SfcButtons::SELECT);
    let (a, b, c) = (!face.a, !face.b, !face.c);
    let (x, y, z) = (!face.x, !face.y, !face.z);

    let three_high = DataLines::from_levels([up, down, left, right, b, c]);
    let three_low = DataLines::from_levels([up, down, false, false, a, start]);
    let identify = DataLines::from_levels([false, false, false, false, a, start]);
    let extra = DataLines::from_levels([z, y, x, mode, b, c]);
    let confirm = DataLines::from_levels([true, true, true, true, a, start]);

    OutputSchedule {
        entries: [
            three_high, three_low, three_high, three_low, three_high, identify, extra, confirm,
        ],
    }
}
