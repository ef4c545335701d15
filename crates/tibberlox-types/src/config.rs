// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of Tibberlox.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Snapshot tunables and destination configuration.

use crate::pricing::PriceUnit;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Value sent for relative slots that hold no real data.
pub const DEFAULT_INVALID_DATA_VALUE: i64 = -1000;

/// Default location of the rolling price history.
pub const DEFAULT_HISTORY_FILE: &str = ".tibberlox_history.json";

const MAX_PRECISION: u8 = 10;
const MAX_CLOCK_OFFSET_SECS: i32 = 3600;

fn default_precision() -> u8 {
    4
}

fn default_invalid_data_value() -> i64 {
    DEFAULT_INVALID_DATA_VALUE
}

fn default_past_hours() -> u32 {
    23
}

fn default_future_hours() -> u32 {
    36
}

fn default_history_length() -> u32 {
    3
}

fn default_clock_offset_seconds() -> i32 {
    60
}

fn default_history_file() -> PathBuf {
    PathBuf::from(DEFAULT_HISTORY_FILE)
}

/// Options controlling how a price snapshot is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Decimal digits every sent price is rounded to
    #[serde(default = "default_precision")]
    pub precision: u8,

    /// Unit the prices are converted to before sending
    #[serde(default)]
    pub price_unit: PriceUnit,

    /// Only send relative slots that hold real data
    #[serde(default)]
    pub no_invalid_fields: bool,

    /// Placeholder sent for relative slots without data
    #[serde(default = "default_invalid_data_value")]
    pub invalid_data_value: i64,

    /// Number of relative hours before now (slots -past..-1)
    #[serde(default = "default_past_hours")]
    pub past_hours: u32,

    /// Number of relative hours from now on (slots 0..future-1)
    #[serde(default = "default_future_hours")]
    pub future_hours: u32,

    /// Days of price history kept in the cache
    #[serde(default = "default_history_length")]
    pub history_length: u32,

    /// Seconds the logical clock runs ahead of the wall clock
    #[serde(default = "default_clock_offset_seconds")]
    pub clock_offset_seconds: i32,

    /// Path of the history cache file
    #[serde(default = "default_history_file")]
    pub history_file: PathBuf,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            precision: default_precision(),
            price_unit: PriceUnit::default(),
            no_invalid_fields: false,
            invalid_data_value: default_invalid_data_value(),
            past_hours: default_past_hours(),
            future_hours: default_future_hours(),
            history_length: default_history_length(),
            clock_offset_seconds: default_clock_offset_seconds(),
            history_file: default_history_file(),
        }
    }
}

impl SnapshotConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.precision > MAX_PRECISION {
            anyhow::bail!(
                "precision must be at most {MAX_PRECISION} digits, got {}",
                self.precision
            );
        }
        if self.past_hours == 0 && self.future_hours == 0 {
            anyhow::bail!("past_hours and future_hours cannot both be 0");
        }
        if self.clock_offset_seconds.abs() > MAX_CLOCK_OFFSET_SECS {
            anyhow::bail!(
                "clock_offset_seconds must be within ±{MAX_CLOCK_OFFSET_SECS}, got {}",
                self.clock_offset_seconds
            );
        }
        if self.history_file.as_os_str().is_empty() {
            anyhow::bail!("history_file cannot be empty");
        }
        Ok(())
    }
}

/// A receiver of the snapshot datagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    /// IP address or hostname
    pub ip: String,
    pub port: u16,
}

impl Destination {
    pub fn new(ip: impl Into<String>, port: u16) -> Self {
        Self {
            ip: ip.into(),
            port,
        }
    }
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}
