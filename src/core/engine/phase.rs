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

//! Phase index

use core::fmt;

use crate::core::error::AdapterError;
use crate::core::schedule::SCHEDULE_LEN;

/// Position in the 8-step poll cycle
///
/// Identifies both the schedule entry driven next and the select-line level
/// awaited before driving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PhaseIndex(u8);

impl PhaseIndex {
    /// First phase of a cycle
    pub const ZERO: PhaseIndex = PhaseIndex(0);

    /// Following phase, wrapping 7 -> 0
    #[inline(always)]
    pub const fn next(self) -> Self {
        PhaseIndex((self.0 + 1) % SCHEDULE_LEN as u8)
    }

    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline(always)]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Select-line level that completes this phase
    ///
    /// Even phases wait for the idle level, odd phases for the active level.
    #[inline(always)]
    pub const fn awaited_level(self, select_idle_high: bool) -> bool {
        if self.0 % 2 == 0 {
            select_idle_high
        } else {
            !select_idle_high
        }
    }
}

impl TryFrom<u8> for PhaseIndex {
    type Error = AdapterError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if usize::from(value) < SCHEDULE_LEN {
            Ok(PhaseIndex(value))
        } else {
            Err(AdapterError::InvalidPhase(value))
        }
    }
}

impl From<PhaseIndex> for u8 {
    fn from(phase: PhaseIndex) -> u8 {
        phase.0
    }
}

impl fmt::Display for PhaseIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
