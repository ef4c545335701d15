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

//! Price data model shared by the feed, the history cache and the snapshot builder.

use chrono::{DateTime, NaiveDateTime, ParseError};
use serde::{Deserialize, Serialize};

/// One price point: the total price of an hour, its currency and its start time.
///
/// `starts_at` is kept as the raw ISO-8601 text delivered by the feed so it can be
/// written back to the history cache unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub total: f64,
    pub currency: String,
    pub starts_at: String,
}

impl PriceRecord {
    pub fn new(total: f64, currency: impl Into<String>, starts_at: impl Into<String>) -> Self {
        Self {
            total,
            currency: currency.into(),
            starts_at: starts_at.into(),
        }
    }

    /// Start time as naive local time (any UTC offset in the text is dropped).
    pub fn start_time(&self) -> Result<NaiveDateTime, ParseError> {
        parse_starts_at(&self.starts_at)
    }
}

/// Parse an ISO-8601 timestamp and return its wall-clock part.
///
/// The offset, if present, is ignored rather than applied: the feed reports
/// times in the home's local zone and that is the zone we compare against.
pub fn parse_starts_at(value: &str) -> Result<NaiveDateTime, ParseError> {
    let value = value.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(value) {
        return Ok(with_offset.naive_local());
    }
    if let Ok(with_offset) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Ok(with_offset.naive_local());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
}

/// Price information of one home as reported by the feed for the current poll.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceInfo {
    /// The price record the feed marks as current
    pub current: Option<PriceRecord>,
    /// Known prices of today, in feed order
    pub today: Vec<PriceRecord>,
    /// Forecast prices of tomorrow (empty until published)
    pub tomorrow: Vec<PriceRecord>,
}

/// Unit in which prices are sent to the destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PriceUnit {
    /// Full currency unit (EUR family)
    #[default]
    #[serde(rename = "EUR", alias = "eur", alias = "Eur")]
    Eur,
    /// Sub unit (cent family)
    #[serde(rename = "Cent", alias = "cent", alias = "CENT")]
    Cent,
}

impl PriceUnit {
    /// Label written to the `price_unit` field.
    pub fn label(self) -> &'static str {
        match self {
            Self::Eur => "EUR",
            Self::Cent => "Cent",
        }
    }

    /// Whether this unit belongs to the primary (full unit) currency family.
    pub fn is_primary(self) -> bool {
        matches!(self, Self::Eur)
    }

    /// Factor converting an amount in this unit back to EUR.
    pub fn multiplicator_to_eur(self) -> f64 {
        match self {
            Self::Eur => 1.0,
            Self::Cent => 0.01,
        }
    }
}

impl std::fmt::Display for PriceUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
