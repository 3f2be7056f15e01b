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

//! Adapter configuration
//!
//! Timing constants and polarities that depend on the board or on the console
//! software. The defaults reproduce the reference hardware (16 MHz part, 16-bit
//! watchdog timer without prescaler).
//!
//! With the `std` feature the configuration can be loaded from and saved to
//! TOML. Every table and field is optional:
//!
//! ```toml
//! [host]
//! latch_pulse_us = 12
//! clock_half_period_us = 6
//!
//! [target]
//! select_idle_high = true
//!
//! [watchdog]
//! timeout_us = 4096
//! arm_on_phase_zero = false
//! ```

#[cfg(feature = "std")]
use serde::{Deserialize, Serialize};

use crate::core::controller::HostReader;
use crate::core::error::{AdapterError, Result};

/// Host pad read timings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "std", serde(default))]
pub struct HostTiming {
    /// Width of the latch pulse
    pub latch_pulse_us: u32,
    /// Half period of the shift clock
    pub clock_half_period_us: u32,
}

impl Default for HostTiming {
    fn default() -> Self {
        Self {
            latch_pulse_us: 12,
            clock_half_period_us: 6,
        }
    }
}

/// Target port electrical settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "std", serde(default))]
pub struct TargetConfig {
    /// Level of the select line while the console is not polling
    ///
    /// Even phases await this level, odd phases the opposite one.
    pub select_idle_high: bool,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            select_idle_high: true,
        }
    }
}

/// Watchdog settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "std", serde(default))]
pub struct WatchdogConfig {
    /// Time without a select edge after which the phase cycle restarts
    ///
    /// The board programs its timer with this period; the engine itself only
    /// stops and restarts the count.
    pub timeout_us: u32,

    /// Also arm the watchdog when phase 0 is driven
    ///
    /// Off by default, so the watchdog only runs once the console has started
    /// a poll. Turning it on makes the adapter re-sample the pad every timeout
    /// period while the console is idle.
    pub arm_on_phase_zero: bool,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            timeout_us: 4096,
            arm_on_phase_zero: false,
        }
    }
}

/// Complete adapter configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "std", serde(default))]
pub struct Config {
    pub host: HostTiming,
    pub target: TargetConfig,
    pub watchdog: WatchdogConfig,
}

impl Config {
    /// Check the configuration for values the hardware cannot honour
    ///
    /// # Errors
    ///
    /// - [`AdapterError::ZeroTiming`] if any timing is zero
    /// - [`AdapterError::WatchdogTooShort`] if the watchdog would expire
    ///   within a single host read
    pub fn validate(&self) -> Result<()> {
        if self.host.latch_pulse_us == 0 {
            return Err(AdapterError::ZeroTiming {
                field: "host.latch_pulse_us",
            });
        }
        if self.host.clock_half_period_us == 0 {
            return Err(AdapterError::ZeroTiming {
                field: "host.clock_half_period_us",
            });
        }
        if self.watchdog.timeout_us == 0 {
            return Err(AdapterError::ZeroTiming {
                field: "watchdog.timeout_us",
            });
        }

        let read_us = HostReader::new(self.host).read_duration_us();
        if self.watchdog.timeout_us <= read_us {
            return Err(AdapterError::WatchdogTooShort {
                timeout_us: self.watchdog.timeout_us,
                read_us,
            });
        }

        Ok(())
    }
}

#[cfg(feature = "std")]
impl Config {
    /// Parse and validate a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, is not valid TOML, or does not pass
    /// [`validate`](Self::validate).
    pub fn load(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| AdapterError::ConfigRead {
            path: path.to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        log::debug!("Loaded config from {}: {:?}", path, config);
        Ok(config)
    }

    /// Save the configuration as TOML
    pub fn save(&self, path: &str) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents).map_err(|source| AdapterError::ConfigWrite {
            path: path.to_string(),
            source,
        })
    }
}
