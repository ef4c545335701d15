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

//! Error types for snapshot building

use thiserror::Error;

/// Errors that abort a snapshot cycle.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("today's price series is empty, statistics are undefined")]
    EmptySeries,

    #[error("standard deviation needs at least 2 prices, got {count}")]
    InsufficientSamples { count: usize },

    #[error("invalid timestamp '{value}': {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error(transparent)]
    Feed(anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SnapshotError>;
