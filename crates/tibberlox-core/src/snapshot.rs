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

//! The flat key/value snapshot sent to the destinations.

use crate::clock::Clock;
use crate::statistics::PriceStatistics;
use crate::window::{RelativeWindow, slot_key};
use chrono::{Datelike, Local, NaiveDateTime, TimeZone};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use tibberlox_types::PriceUnit;

/// A single snapshot value.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotValue {
    Integer(i64),
    Number(f64),
    Text(String),
    /// No data available, rendered as the configured placeholder value
    Missing,
}

impl SnapshotValue {
    fn to_json(&self, invalid_data_value: i64) -> Value {
        match self {
            Self::Integer(value) => Value::from(*value),
            Self::Number(value) => Number::from_f64(*value)
                .map_or_else(|| Value::from(invalid_data_value), Value::Number),
            Self::Text(value) => Value::from(value.as_str()),
            Self::Missing => Value::from(invalid_data_value),
        }
    }
}

impl From<i64> for SnapshotValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for SnapshotValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for SnapshotValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<Option<f64>> for SnapshotValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Missing, Self::Number)
    }
}

/// String keyed snapshot, ordered by key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    values: BTreeMap<String, SnapshotValue>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<SnapshotValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&SnapshotValue> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Copy every entry of `other` into `self`, overwriting on collision.
    pub fn merge(&mut self, other: Snapshot) {
        self.values.extend(other.values);
    }

    /// JSON object with `Missing` replaced by `invalid_data_value`.
    pub fn to_json(&self, invalid_data_value: i64) -> Value {
        let map: Map<String, Value> = self
            .values
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json(invalid_data_value)))
            .collect();
        Value::Object(map)
    }

    /// Wire text: JSON with every quote character removed.
    pub fn to_datagram(&self, invalid_data_value: i64, pretty: bool) -> String {
        let json = self.to_json(invalid_data_value);
        let text = if pretty {
            serde_json::to_string_pretty(&json)
        } else {
            serde_json::to_string(&json)
        }
        .unwrap_or_default();
        strip_quotes(&text)
    }
}

fn strip_quotes(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, '"' | '\'')).collect()
}

/// Merge the three partial maps. Later maps win on key collision.
pub fn assemble(time: Snapshot, price: Snapshot, power: Snapshot) -> Snapshot {
    let mut snapshot = Snapshot::new();
    snapshot.merge(time);
    snapshot.merge(price);
    snapshot.merge(power);
    snapshot
}

fn local_epoch_seconds(time: NaiveDateTime) -> Option<i64> {
    Local
        .from_local_datetime(&time)
        .earliest()
        .map(|dt| dt.timestamp())
}

/// Date related entries, derived from the logical clock.
pub fn time_map(clock: &Clock) -> Snapshot {
    let now = clock.now();
    let today = now.date();

    let mut snapshot = Snapshot::new();
    snapshot.insert("date_now", today.format("%Y-%m-%d").to_string().as_str());
    snapshot.insert(
        "date_now_epoch",
        today
            .and_hms_opt(0, 0, 0)
            .and_then(local_epoch_seconds)
            .map_or(SnapshotValue::Missing, SnapshotValue::Integer),
    );
    snapshot.insert(
        "date_now_seconds_since_epoch",
        local_epoch_seconds(now).map_or(SnapshotValue::Missing, SnapshotValue::Integer),
    );
    snapshot.insert("date_now_day", i64::from(today.day()));
    snapshot.insert("date_now_month", i64::from(today.month()));
    snapshot.insert("date_now_year", i64::from(today.year()));
    snapshot
}

/// Price related entries: statistics, both ladders and the relative window.
pub fn price_map(
    stats: &PriceStatistics,
    current: Option<f64>,
    unit: PriceUnit,
    window: &RelativeWindow,
) -> Snapshot {
    let mut snapshot = Snapshot::new();
    snapshot.insert("price_low", stats.low);
    snapshot.insert("price_high", stats.high);
    snapshot.insert("price_median", stats.median);
    snapshot.insert("price_average", stats.average);
    snapshot.insert("price_stdev", stats.stdev);
    snapshot.insert("price_current", current);
    snapshot.insert("price_unit", unit.label());
    snapshot.insert("price_multiplicator_to_eur", unit.multiplicator_to_eur());

    for (rank, price) in stats.thresholds.iter().enumerate() {
        snapshot.insert(format!("price_threshold_{rank:02}"), *price);
    }
    for (hour, price) in stats.hourly.iter().enumerate() {
        snapshot.insert(format!("data_price_hour_abs_{hour:02}_amount"), *price);
    }
    for (hour, price) in window.iter() {
        snapshot.insert(slot_key(hour), price);
    }

    snapshot.insert(
        "data_price_hour_rel_num_negatives",
        i64::try_from(window.num_negatives()).unwrap_or(i64::MAX),
    );
    snapshot.insert(
        "data_price_hour_rel_num_positives",
        i64::try_from(window.num_positives()).unwrap_or(i64::MAX),
    );
    snapshot
}

/// Live power measurements are not collected, the map stays empty.
pub fn power_map() -> Snapshot {
    Snapshot::new()
}
