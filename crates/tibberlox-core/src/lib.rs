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

//! Price window builder and history cache.
//!
//! Turns the household's price feed into a flat snapshot of statistics and
//! hour-relative prices for a home automation controller.

pub mod clock;
pub mod cycle;
pub mod error;
pub mod history;
pub mod snapshot;
pub mod statistics;
pub mod traits;
pub mod units;
pub mod window;

pub use clock::Clock;
pub use cycle::SnapshotCycle;
pub use error::SnapshotError;
pub use history::{HistoryCache, StoreOutcome};
pub use snapshot::{Snapshot, SnapshotValue, assemble};
pub use statistics::PriceStatistics;
pub use traits::PriceFeed;
pub use units::UnitConverter;
pub use window::{RelativeWindow, WindowBounds, build_relative_window};
