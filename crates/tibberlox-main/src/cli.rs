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

//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tibberlox_types::{PriceUnit, SnapshotConfig};

#[derive(Debug, Parser)]
#[command(name = "tibberlox")]
#[command(author, version, about = "Send Tibber electricity prices to a Loxone Miniserver over UDP")]
#[command(
    long_about = "Fetch today's and tomorrow's hourly prices from the Tibber API, derive \
    statistics and a window of prices relative to the current hour, and send them as a \
    single UDP datagram to every configured destination.\n\
    \nMeant to be run once per hour by an external scheduler.\n\
    \nExamples:\n  \
    tibberlox homes                         # List homes of the account\n  \
    tibberlox run                           # One cycle with the configured settings\n  \
    tibberlox run --price-unit Cent --dry-run"
)]
pub struct Cli {
    /// Credentials and settings file (JSON, or TOML with a .toml extension)
    #[arg(long, global = true, default_value = ".tibberlox_config")]
    pub config: PathBuf,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch prices, build the snapshot and send it (default)
    Run(RunArgs),

    /// List the homes of the account with their `home_id`
    Homes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UnitArg {
    #[value(name = "EUR", alias = "eur")]
    Eur,
    #[value(name = "Cent", alias = "cent")]
    Cent,
}

impl From<UnitArg> for PriceUnit {
    fn from(unit: UnitArg) -> Self {
        match unit {
            UnitArg::Eur => PriceUnit::Eur,
            UnitArg::Cent => PriceUnit::Cent,
        }
    }
}

#[derive(Debug, Default, Args)]
pub struct RunArgs {
    /// Unit of every price in the datagram
    #[arg(long, value_enum)]
    pub price_unit: Option<UnitArg>,

    /// Decimal digits kept after conversion
    #[arg(long)]
    pub precision: Option<u8>,

    /// Leave hours without data out of the datagram instead of sending the sentinel
    #[arg(long)]
    pub no_invalid_values: bool,

    /// Hours before the current one included in the relative window
    #[arg(long)]
    pub past_hours: Option<u32>,

    /// Hours from the current one onwards included in the relative window
    #[arg(long)]
    pub future_hours: Option<u32>,

    /// Days of prices kept in the history file
    #[arg(long)]
    pub history_length: Option<u32>,

    /// Seconds the logical clock runs ahead of the wall clock
    #[arg(long, allow_hyphen_values = true)]
    pub clock_offset: Option<i32>,

    /// Path of the history file
    #[arg(long)]
    pub history_file: Option<PathBuf>,

    /// Build the snapshot and print it without sending
    #[arg(long)]
    pub dry_run: bool,
}

impl RunArgs {
    /// Apply the flags that were given on top of the file settings.
    pub fn apply(&self, config: &mut SnapshotConfig) {
        if let Some(unit) = self.price_unit {
            config.price_unit = unit.into();
        }
        if let Some(precision) = self.precision {
            config.precision = precision;
        }
        if self.no_invalid_values {
            config.no_invalid_fields = true;
        }
        if let Some(past) = self.past_hours {
            config.past_hours = past;
        }
        if let Some(future) = self.future_hours {
            config.future_hours = future;
        }
        if let Some(days) = self.history_length {
            config.history_length = days;
        }
        if let Some(offset) = self.clock_offset {
            config.clock_offset_seconds = offset;
        }
        if let Some(path) = &self.history_file {
            config.history_file.clone_from(path);
        }
    }
}
