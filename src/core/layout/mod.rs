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

//! Button layouts
//!
//! The target pad has six face buttons (A, B, C, X, Y, Z); the host pad has
//! six face and shoulder buttons (A, B, X, Y, L, R). A [`Layout`] fixes which
//! host button drives each target button. It is chosen once at power-on from
//! the direction held on the host pad and never changes afterwards.
//!
//! ## Remapping Table
//!
//! ```text
//! target | BC | AB | XC
//! -------|----|----|----
//!   A    | A  | Y  | B
//!   B    | Y  | B  | A
//!   C    | B  | A  | R
//!   X    | L  | L  | Y
//!   Y    | X  | X  | X
//!   Z    | R  | R  | L
//! ```
//!
//! ## Power-on Selection
//!
//! - Left held: `AB`
//! - Right held (Left released): `BC`
//! - Otherwise: `XC`

use core::fmt;
use core::str::FromStr;

use crate::core::controller::{ButtonSnapshot, HostReader, SfcButtons};
use crate::core::error::AdapterError;
use crate::core::hal::{Delay, Gpio};

/// Face button remapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layout {
    /// B and C are the main action buttons
    Bc,
    /// A and B are the main action buttons
    Ab,
    /// Default layout, C on the right shoulder
    Xc,
}

impl Layout {
    /// Every layout, in declaration order
    pub const ALL: [Layout; 3] = [Layout::Bc, Layout::Ab, Layout::Xc];

    /// Host buttons feeding target A, B, C, X, Y, Z (in that order)
    const fn sources(self) -> [SfcButtons; 6] {
        match self {
            Layout::Bc => [
                SfcButtons::A,
                SfcButtons::Y,
                SfcButtons::B,
                SfcButtons::L,
                SfcButtons::X,
                SfcButtons::R,
            ],
            Layout::Ab => [
                SfcButtons::Y,
                SfcButtons::B,
                SfcButtons::A,
                SfcButtons::L,
                SfcButtons::X,
                SfcButtons::R,
            ],
            Layout::Xc => [
                SfcButtons::B,
                SfcButtons::A,
                SfcButtons::R,
                SfcButtons::Y,
                SfcButtons::X,
                SfcButtons::L,
            ],
        }
    }

    /// Resolve the six target face buttons from a host snapshot
    ///
    /// # Examples
    ///
    /// ```
    /// use sixpad::core::controller::{ButtonSnapshot, SfcButtons};
    /// use sixpad::core::layout::Layout;
    ///
    /// let snapshot = ButtonSnapshot::from_pressed(SfcButtons::B);
    /// let face = Layout::Xc.resolve(snapshot);
    /// assert!(face.a);
    /// assert!(!face.c);
    /// ```
    pub fn resolve(self, snapshot: ButtonSnapshot) -> FaceButtons {
        let [a, b, c, x, y, z] = self.sources().map(|button| snapshot.is_pressed(button));
        FaceButtons { a, b, c, x, y, z }
    }

    /// Short name as used on the command line and in logs
    pub const fn name(self) -> &'static str {
        match self {
            Layout::Bc => "BC",
            Layout::Ab => "AB",
            Layout::Xc => "XC",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Layout {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Layout::ALL
            .into_iter()
            .find(|layout| layout.name().eq_ignore_ascii_case(s.trim()))
            .ok_or(AdapterError::UnknownLayout)
    }
}

/// Target face buttons after remapping (`true` = pressed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FaceButtons {
    pub a: bool,
    pub b: bool,
    pub c: bool,
    pub x: bool,
    pub y: bool,
    pub z: bool,
}

/// Choose the layout from a power-on snapshot
///
/// Left wins over Right when both are held.
pub fn choose(snapshot: ButtonSnapshot) -> Layout {
    if snapshot.is_pressed(SfcButtons::LEFT) {
        Layout::Ab
    } else if snapshot.is_pressed(SfcButtons::RIGHT) {
        Layout::Bc
    } else {
        Layout::Xc
    }
}

/// Take one host read and choose the layout for this power cycle
///
/// Called exactly once, before the watchdog is ever started. Whatever the read
/// returns is decisive.
pub fn select<B: Gpio + Delay>(reader: &HostReader, board: &mut B) -> Layout {
    let snapshot = reader.read(board);
    let layout = choose(snapshot);
    log::info!(
        "Layout {} selected (power-on snapshot 0x{:04X})",
        layout,
        snapshot.raw()
    );
    layout
}
