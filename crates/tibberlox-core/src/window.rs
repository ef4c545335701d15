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

//! Relative hour window: prices keyed by their distance in hours from now.

use crate::error::{Result, SnapshotError};
use crate::units::UnitConverter;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use tibberlox_types::PriceRecord;

const MILLIS_PER_HOUR: i64 = 3_600_000;

/// Horizon of the window: slots `-past_hours ..= -1` and `0 ..= future_hours - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowBounds {
    pub past_hours: u32,
    pub future_hours: u32,
}

impl WindowBounds {
    pub fn new(past_hours: u32, future_hours: u32) -> Self {
        Self {
            past_hours,
            future_hours,
        }
    }

    /// Half open: `-past_hours` is inside, `future_hours` is not.
    pub fn contains(&self, hour: i64) -> bool {
        hour >= -i64::from(self.past_hours) && hour < i64::from(self.future_hours)
    }

    pub fn hours(&self) -> impl Iterator<Item = i64> {
        -i64::from(self.past_hours)..i64::from(self.future_hours)
    }
}

/// Signed number of whole hours from `now` to `start`, rounded up.
///
/// A price that started ten minutes ago is the price of slot 0, a price starting
/// ten minutes from now belongs to slot +1.
pub fn relative_hour(start: NaiveDateTime, now: NaiveDateTime) -> i64 {
    let millis = (start - now).num_milliseconds();
    let hours = millis.div_euclid(MILLIS_PER_HOUR);
    if millis.rem_euclid(MILLIS_PER_HOUR) == 0 {
        hours
    } else {
        hours + 1
    }
}

/// Snapshot key of a relative slot, e.g. `data_price_hour_rel_-03_amount`.
pub fn slot_key(hour: i64) -> String {
    let sign = if hour < 0 { '-' } else { '+' };
    format!("data_price_hour_rel_{sign}{:02}_amount", hour.unsigned_abs())
}

/// Converted prices by relative hour. `None` marks a slot without data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelativeWindow {
    slots: BTreeMap<i64, Option<f64>>,
}

impl RelativeWindow {
    pub fn get(&self, hour: i64) -> Option<Option<f64>> {
        self.slots.get(&hour).copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, Option<f64>)> + '_ {
        self.slots.iter().map(|(hour, value)| (*hour, *value))
    }

    /// Slots before now holding real data.
    pub fn num_negatives(&self) -> usize {
        self.slots
            .iter()
            .filter(|(hour, value)| **hour < 0 && value.is_some())
            .count()
    }

    /// Slots from now on holding real data.
    pub fn num_positives(&self) -> usize {
        self.slots
            .iter()
            .filter(|(hour, value)| **hour >= 0 && value.is_some())
            .count()
    }
}

/// Place every record of `series` into its relative slot.
///
/// `series` is expected in chronological order (yesterday, today, tomorrow);
/// when two records land in the same slot the later one wins. With `prefill`
/// every slot of `bounds` is present, empty ones as `None`.
pub fn build_relative_window<'a>(
    series: impl IntoIterator<Item = &'a PriceRecord>,
    now: NaiveDateTime,
    bounds: WindowBounds,
    prefill: bool,
    converter: &UnitConverter,
) -> Result<RelativeWindow> {
    let mut window = RelativeWindow::default();
    if prefill {
        window.slots.extend(bounds.hours().map(|hour| (hour, None)));
    }

    for record in series {
        let start = record
            .start_time()
            .map_err(|source| SnapshotError::InvalidTimestamp {
                value: record.starts_at.clone(),
                source,
            })?;
        let hour = relative_hour(start, now);
        if !bounds.contains(hour) {
            continue;
        }
        window
            .slots
            .insert(hour, Some(converter.convert_record(record)));
    }

    Ok(window)
}
