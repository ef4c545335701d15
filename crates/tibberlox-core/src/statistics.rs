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

//! Summary statistics over today's converted prices.

use crate::error::{Result, SnapshotError};
use crate::units::round_to;

/// Statistics of one day of prices, rounded to the configured precision.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceStatistics {
    pub low: f64,
    pub high: f64,
    pub median: f64,
    pub average: f64,
    /// Sample standard deviation
    pub stdev: f64,
    /// All prices ascending, indexed by rank
    pub thresholds: Vec<f64>,
    /// All prices in input order, indexed by hour of day
    pub hourly: Vec<f64>,
}

impl PriceStatistics {
    /// Summarize `prices`. Needs at least two values for the standard deviation.
    pub fn summarize(prices: &[f64], precision: u8) -> Result<Self> {
        if prices.is_empty() {
            return Err(SnapshotError::EmptySeries);
        }
        if prices.len() < 2 {
            return Err(SnapshotError::InsufficientSamples {
                count: prices.len(),
            });
        }

        let mut thresholds = prices.to_vec();
        thresholds.sort_by(f64::total_cmp);

        let count = prices.len() as f64;
        let average = prices.iter().sum::<f64>() / count;
        let variance = prices
            .iter()
            .map(|p| (p - average).powi(2))
            .sum::<f64>()
            / (count - 1.0);

        Ok(Self {
            low: thresholds[0],
            high: thresholds[thresholds.len() - 1],
            median: round_to(median_of_sorted(&thresholds), precision),
            average: round_to(average, precision),
            stdev: round_to(variance.sqrt(), precision),
            thresholds,
            hourly: prices.to_vec(),
        })
    }
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}
