// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Engine configuration.
//!
//! School policy that is not stored on courses or monitors: the insurance
//! surcharge, which non-working-day subtypes block a monitor, how many
//! language slots are compared, and the opening hours assumed when no
//! season is active.

use serde::{Deserialize, Serialize};
use skischool_domain::{
    DEFAULT_CANCELLATION_INSURANCE_RATE, MONITOR_LANGUAGE_SLOTS, PricingPolicy,
    TimeRange,
};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Non-working-day subtype that blocks a monitor.
pub const NWD_SUBTYPE_BLOCK: u8 = 2;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for this schema.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A configuration value is out of range.
    #[error("Invalid config value for {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fraction of base plus extras charged for cancellation insurance.
    pub cancellation_insurance_rate: f64,
    /// Non-working-day subtypes that make a monitor unavailable.
    pub blocking_nwd_subtypes: Vec<u8>,
    /// Number of monitor language slots compared against client languages.
    pub max_language_slots: usize,
    /// Opening hours used when no season is active for a date.
    pub default_opening_hours: TimeRange,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cancellation_insurance_rate: DEFAULT_CANCELLATION_INSURANCE_RATE,
            blocking_nwd_subtypes: vec![NWD_SUBTYPE_BLOCK],
            max_language_slots: MONITOR_LANGUAGE_SLOTS,
            default_opening_hours: default_opening_hours(),
        }
    }
}

impl EngineConfig {
    /// Parses and validates a JSON configuration document.
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or a value is out of range.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is malformed, or holds
    /// an out-of-range value.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents: String = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Checks that every value is within range.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.cancellation_insurance_rate) {
            return Err(ConfigError::Invalid {
                field: "cancellation_insurance_rate",
                message: format!(
                    "{} is not between 0 and 1",
                    self.cancellation_insurance_rate
                ),
            });
        }
        if self.max_language_slots > MONITOR_LANGUAGE_SLOTS {
            return Err(ConfigError::Invalid {
                field: "max_language_slots",
                message: format!(
                    "{} exceeds the {MONITOR_LANGUAGE_SLOTS} slots on a monitor profile",
                    self.max_language_slots
                ),
            });
        }
        if self.default_opening_hours.end() < self.default_opening_hours.start() {
            return Err(ConfigError::Invalid {
                field: "default_opening_hours",
                message: format!("{} ends before it starts", self.default_opening_hours),
            });
        }
        Ok(())
    }

    /// Returns whether a non-working-day subtype blocks the monitor.
    #[must_use]
    pub fn is_blocking_subtype(&self, subtype: u8) -> bool {
        self.blocking_nwd_subtypes.contains(&subtype)
    }

    /// Returns the pricing policy derived from this configuration.
    #[must_use]
    pub const fn pricing_policy(&self) -> PricingPolicy {
        PricingPolicy {
            cancellation_insurance_rate: self.cancellation_insurance_rate,
        }
    }
}

fn default_opening_hours() -> TimeRange {
    TimeRange::parse("08:00", "17:00").unwrap_or(TimeRange::EMPTY)
}
