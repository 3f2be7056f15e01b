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

//! Restart request flag
//!
//! The only state shared between the watchdog overflow interrupt and the
//! foreground phase loop.
//!
//! ```text
//!  watchdog ISR                     phase loop
//!  ────────────                     ──────────
//!  on_overflow() ──store(true)──►   is_requested()  (every poll iteration)
//!                                   board.stop()
//!                                   acknowledge()   ──store(false)
//!                                   resample + rebuild schedule
//! ```
//!
//! The interrupt side only ever sets the flag; the foreground side only ever
//! clears it, after the timer is stopped. Plain load/store is enough, so the
//! flag also works on cores without atomic read-modify-write.

use core::sync::atomic::{AtomicBool, Ordering};

/// "Please restart" flag raised by the watchdog
///
/// # Example
///
/// ```
/// use sixpad::core::engine::RestartSignal;
///
/// static RESTART: RestartSignal = RestartSignal::new();
///
/// // In the timer overflow interrupt handler:
/// RESTART.on_overflow();
///
/// assert!(RESTART.is_requested());
/// RESTART.acknowledge();
/// assert!(!RESTART.is_requested());
/// ```
#[derive(Debug, Default)]
pub struct RestartSignal {
    requested: AtomicBool,
}

impl RestartSignal {
    pub const fn new() -> Self {
        Self {
            requested: AtomicBool::new(false),
        }
    }

    /// Overflow handler body: request a restart and do nothing else
    #[inline(always)]
    pub fn on_overflow(&self) {
        self.requested.store(true, Ordering::Release);
    }

    /// Polled by the phase loop on every iteration of an edge wait
    #[inline(always)]
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    /// Clear a pending request
    ///
    /// Only call with the watchdog stopped, so no new request can race in.
    #[inline]
    pub fn acknowledge(&self) {
        self.requested.store(false, Ordering::Release);
    }
}
