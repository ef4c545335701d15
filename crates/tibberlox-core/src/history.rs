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

//! Persistence of the rolling price history.
//!
//! The live feed only exposes today and tomorrow. Keeping the last few days on
//! disk lets the relative window reach back into yesterday.
//!
//! On disk the cache is a JSON object mapping `YYYY-MM-DD` to arrays of
//! `[total, currency, starts_at]` triples.

use crate::clock::Clock;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tibberlox_types::PriceRecord;
use tracing::{debug, info, warn};

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Cached price series keyed by calendar day.
pub type PriceHistory = BTreeMap<NaiveDate, Vec<PriceRecord>>;

/// On-disk form of a single price record.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedPrice(f64, String, String);

impl From<&PriceRecord> for CachedPrice {
    fn from(record: &PriceRecord) -> Self {
        Self(
            record.total,
            record.currency.clone(),
            record.starts_at.clone(),
        )
    }
}

impl From<CachedPrice> for PriceRecord {
    fn from(CachedPrice(total, currency, starts_at): CachedPrice) -> Self {
        Self {
            total,
            currency,
            starts_at,
        }
    }
}

/// What a call to [`HistoryCache::store`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOutcome {
    /// Today's series was written, `evicted` old days were dropped
    Stored { evicted: usize },
    /// A series for today already exists, nothing was written
    AlreadyPresent,
    /// The given series was empty, nothing was written
    Empty,
}

/// File backed price history.
#[derive(Debug, Clone)]
pub struct HistoryCache {
    path: PathBuf,
}

impl HistoryCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cache, treating a missing or unreadable file as empty.
    ///
    /// Malformed days or records are skipped individually.
    pub fn load(&self) -> PriceHistory {
        match self.read() {
            Ok(history) => history,
            Err(e) => {
                warn!(
                    "Price history at {} unusable, starting empty: {:#}",
                    self.path.display(),
                    e
                );
                PriceHistory::new()
            }
        }
    }

    fn read(&self) -> Result<PriceHistory> {
        if !self.path.exists() {
            info!(
                "Price history file not found at {}, starting empty",
                self.path.display()
            );
            return Ok(PriceHistory::new());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let value: Value = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;
        let Value::Object(days) = value else {
            anyhow::bail!("expected a JSON object at the top level");
        };

        let mut history = PriceHistory::new();
        for (key, entries) in days {
            let Ok(date) = NaiveDate::parse_from_str(&key, DATE_KEY_FORMAT) else {
                warn!("Skipping history day with invalid date key '{}'", key);
                continue;
            };
            let Value::Array(entries) = entries else {
                warn!("Skipping history day {}: not an array", key);
                continue;
            };

            let mut series = Vec::with_capacity(entries.len());
            for (idx, entry) in entries.into_iter().enumerate() {
                match parse_entry(entry) {
                    Ok(record) => series.push(record),
                    Err(e) => warn!("Skipping history entry {}[{}]: {:#}", key, idx, e),
                }
            }
            history.insert(date, series);
        }

        debug!(
            "Loaded {} days of price history from {}",
            history.len(),
            self.path.display()
        );
        Ok(history)
    }

    /// Insert today's series unless one is already stored, then evict every
    /// day further than `days_to_keep` days from `today` and persist.
    pub fn store(
        &self,
        today: NaiveDate,
        series: &[PriceRecord],
        days_to_keep: u32,
    ) -> Result<StoreOutcome> {
        if series.is_empty() {
            warn!("Not storing an empty price series for {}", today);
            return Ok(StoreOutcome::Empty);
        }

        let mut history = self.load();
        if history.contains_key(&today) {
            debug!("Price history already contains {}", today);
            return Ok(StoreOutcome::AlreadyPresent);
        }

        history.insert(today, series.to_vec());
        let evicted = evict_older_than(&mut history, today, days_to_keep);
        self.save(&history)?;

        info!(
            "Stored {} prices for {} in {} ({} days kept, {} evicted)",
            series.len(),
            today,
            self.path.display(),
            history.len(),
            evicted
        );
        Ok(StoreOutcome::Stored { evicted })
    }

    /// Series stored for `date`, empty if absent.
    pub fn load_day(&self, date: NaiveDate) -> Vec<PriceRecord> {
        match self.load().remove(&date) {
            Some(series) => series,
            None => {
                warn!("No cached prices for {}", date);
                Vec::new()
            }
        }
    }

    /// Series of the calendar day before today (clock offset not applied).
    pub fn load_yesterday(&self, clock: &Clock) -> Vec<PriceRecord> {
        self.load_day(clock.calendar_yesterday())
    }

    /// Write the whole cache atomically (temp file + rename).
    fn save(&self, history: &PriceHistory) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let on_disk: BTreeMap<String, Vec<CachedPrice>> = history
            .iter()
            .map(|(date, series)| {
                (
                    date.format(DATE_KEY_FORMAT).to_string(),
                    series.iter().map(CachedPrice::from).collect(),
                )
            })
            .collect();
        let json =
            serde_json::to_string_pretty(&on_disk).context("Failed to serialize price history")?;

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, &json)
            .with_context(|| format!("Failed to write temp file {}", temp_path.display()))?;
        fs::rename(&temp_path, &self.path)
            .with_context(|| format!("Failed to rename temp file to {}", self.path.display()))?;
        Ok(())
    }
}

fn parse_entry(entry: Value) -> Result<PriceRecord> {
    let cached: CachedPrice =
        serde_json::from_value(entry).context("expected [total, currency, starts_at]")?;
    let record = PriceRecord::from(cached);
    record
        .start_time()
        .with_context(|| format!("invalid starts_at '{}'", record.starts_at))?;
    Ok(record)
}

/// Drop every day with `|today - day| > days_to_keep`. Returns the number of dropped days.
fn evict_older_than(history: &mut PriceHistory, today: NaiveDate, days_to_keep: u32) -> usize {
    let before = history.len();
    history.retain(|day, _| (today - *day).num_days().abs() <= i64::from(days_to_keep));
    before - history.len()
}
