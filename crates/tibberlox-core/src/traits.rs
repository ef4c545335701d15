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

use anyhow::Result;
use tibberlox_types::PriceInfo;

/// Source of the household's price information
pub trait PriceFeed {
    /// Read current, today's and tomorrow's prices
    fn fetch(&self) -> Result<PriceInfo>;

    /// Get data source name for logging
    fn name(&self) -> &str;
}
