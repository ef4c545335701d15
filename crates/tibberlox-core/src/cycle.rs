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

//! One poll-compute cycle: fetch prices, update the history, build the snapshot.

use crate::clock::Clock;
use crate::error::{Result, SnapshotError};
use crate::history::HistoryCache;
use crate::snapshot::{Snapshot, assemble, power_map, price_map, time_map};
use crate::statistics::PriceStatistics;
use crate::traits::PriceFeed;
use crate::units::UnitConverter;
use crate::window::{WindowBounds, build_relative_window};
use tibberlox_types::{PriceInfo, SnapshotConfig};
use tracing::{debug, info, warn};

/// Builds snapshots from a feed according to a [`SnapshotConfig`].
#[derive(Debug, Clone)]
pub struct SnapshotCycle {
    config: SnapshotConfig,
    clock: Clock,
    history: HistoryCache,
}

impl SnapshotCycle {
    /// Cycle on the system clock, shifted by the configured offset.
    pub fn new(config: SnapshotConfig) -> Self {
        let clock = Clock::system(config.clock_offset_seconds);
        Self::with_clock(config, clock)
    }

    pub fn with_clock(config: SnapshotConfig, clock: Clock) -> Self {
        let history = HistoryCache::new(config.history_file.clone());
        Self {
            config,
            clock,
            history,
        }
    }

    pub fn config(&self) -> &SnapshotConfig {
        &self.config
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Fetch from `feed` and build the snapshot.
    pub fn run(&self, feed: &dyn PriceFeed) -> Result<Snapshot> {
        debug!("Fetching prices from {}", feed.name());
        let info = feed.fetch().map_err(SnapshotError::Feed)?;
        info!(
            "{}: {} prices today, {} tomorrow",
            feed.name(),
            info.today.len(),
            info.tomorrow.len()
        );
        self.build(&info)
    }

    /// Build the snapshot from already fetched price information.
    ///
    /// History I/O problems are logged and never fail the cycle.
    pub fn build(&self, info: &PriceInfo) -> Result<Snapshot> {
        let converter = UnitConverter::new(self.config.price_unit, self.config.precision);

        let today_prices = converter.convert_series(&info.today);
        let stats = PriceStatistics::summarize(&today_prices, self.config.precision)?;

        let yesterday = self.history.load_yesterday(&self.clock);
        let window = build_relative_window(
            yesterday.iter().chain(&info.today).chain(&info.tomorrow),
            self.clock.now(),
            WindowBounds::new(self.config.past_hours, self.config.future_hours),
            !self.config.no_invalid_fields,
            &converter,
        )?;

        // Only series that made it through validation end up in the history
        if let Err(e) = self.history.store(
            self.clock.calendar_today(),
            &info.today,
            self.config.history_length,
        ) {
            warn!("Failed to update price history: {:#}", e);
        }

        let current = info.current.as_ref().map(|r| converter.convert_record(r));
        if current.is_none() {
            warn!("Feed reported no current price");
        }

        info!("Sending price information in '{}'", self.config.price_unit);
        info!(
            "Overview: {{ current: {}, avg: {}, low: {}, high: {} }}",
            current.map_or_else(|| "n/a".to_owned(), |c| c.to_string()),
            stats.average,
            stats.low,
            stats.high
        );
        debug!(
            "Relative window: {} slots, {} past and {} upcoming with data",
            window.len(),
            window.num_negatives(),
            window.num_positives()
        );

        let price = price_map(&stats, current, self.config.price_unit, &window);
        Ok(assemble(time_map(&self.clock), price, power_map()))
    }
}
