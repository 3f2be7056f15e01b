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

//! sixpad: Super Famicom pad to six-button Mega Drive pad adapter
//!
//! Reads a Super Famicom / SNES pad over its latch-clock-data serial protocol
//! and presents it to a Mega Drive / Genesis console as a six-button pad,
//! answering each edge of the console's select line with the right view of
//! the buttons.
//!
//! # Architecture
//!
//! - [`core`]: Adapter logic, `no_std`
//! - `sim`: Host-side board simulation (requires the `std` feature)
//!
//! ```text
//!  SFC pad ──latch/clock/data──► HostReader ──snapshot──► schedule::build
//!                                     ▲                         │
//!                                     │ resync                  ▼
//!  watchdog ISR ──RestartSignal──► EmulationEngine ◄── OutputSchedule
//!                                     │
//!  Mega Drive ◄──────D0-D5───────────┘◄──────select──── Mega Drive
//! ```
//!
//! # Example
//!
//! ```
//! # #[cfg(feature = "std")]
//! # {
//! use sixpad::core::config::Config;
//! use sixpad::core::controller::SfcButtons;
//! use sixpad::sim::{run, Scenario};
//!
//! let scenario = Scenario {
//!     pressed: SfcButtons::B | SfcButtons::UP,
//!     ..Scenario::default()
//! };
//! let report = run(Config::default(), &scenario)?;
//! assert_eq!(report.layout, "XC");
//! assert!(report.frames[0].reading.a);
//! assert!(report.frames[0].reading.up);
//! # }
//! # Ok::<(), sixpad::core::error::AdapterError>(())
//! ```
//!
//! # Porting
//!
//! 1. Implement [`core::hal::Gpio`], [`core::hal::Delay`] and
//!    [`core::hal::WatchdogTimer`] for the board
//! 2. Call [`core::engine::RestartSignal::on_overflow`] from the watchdog
//!    overflow interrupt
//! 3. Hand the board to [`core::engine::EmulationEngine::power_on`] and call
//!    `run`
//!
//! # Error Handling
//!
//! All fallible operations return [`core::error::Result<T>`] which is an alias for
//! `Result<T, AdapterError>`.

#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

pub mod core;

#[cfg(feature = "std")]
pub mod sim;

// Re-export commonly used types
pub use crate::core::error::{AdapterError, Result};
