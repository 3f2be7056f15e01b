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

//! Error types
//!
//! The real-time path (host sampling, schedule building, phase driving) has no
//! error surface: protocol deviations are absorbed by the watchdog restart and
//! a missing pad reads as "all released". Errors only exist at the edges, when
//! configuration is loaded or names are parsed.

use thiserror::Error;

/// Errors produced outside the real-time path
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Phase index outside `0..8`
    #[error("phase index {0} out of range (expected 0..8)")]
    InvalidPhase(u8),

    /// Layout name not one of `BC`, `AB`, `XC`
    #[error("unrecognised layout name (expected BC, AB or XC)")]
    UnknownLayout,

    /// Button name not part of the host pad
    #[error("unrecognised button name")]
    UnknownButton,

    /// A timing constant was configured as zero
    #[error("{field} must be non-zero")]
    ZeroTiming {
        /// Name of the offending field
        field: &'static str,
    },

    /// Watchdog would expire during a single host read
    #[error("watchdog timeout {timeout_us}us must exceed one host read ({read_us}us)")]
    WatchdogTooShort {
        /// Configured timeout
        timeout_us: u32,
        /// Nominal duration of one host read
        read_us: u32,
    },

    /// Config file could not be read
    #[cfg(feature = "std")]
    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        /// Path that was read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Config file could not be written
    #[cfg(feature = "std")]
    #[error("failed to write config file {path}: {source}")]
    ConfigWrite {
        /// Path that was written
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid TOML for [`Config`](crate::core::config::Config)
    #[cfg(feature = "std")]
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Config could not be rendered as TOML
    #[cfg(feature = "std")]
    #[error("failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Simulation timings cannot produce an ordered select waveform
    #[cfg(feature = "std")]
    #[error("invalid scenario: {field} {reason}")]
    InvalidScenario {
        /// Name of the offending field
        field: &'static str,
        /// What the field has to satisfy
        reason: &'static str,
    },
}

/// Result type used across the crate
pub type Result<T> = core::result::Result<T, AdapterError>;
