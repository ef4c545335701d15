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

//! Integration tests for a full snapshot cycle
//!
//! Stub feed -> history cache -> statistics -> relative window -> assembled snapshot

use chrono::{NaiveDate, NaiveDateTime};
use std::cell::Cell;
use tempfile::tempdir;
use tibberlox_core::{Clock, HistoryCache, PriceFeed, SnapshotCycle, SnapshotError, SnapshotValue};
use tibberlox_types::{PriceInfo, PriceRecord, PriceUnit, SnapshotConfig};

struct StubFeed {
    info: PriceInfo,
    calls: Cell<usize>,
}

impl StubFeed {
    fn new(info: PriceInfo) -> Self {
        Self {
            info,
            calls: Cell::new(0),
        }
    }
}

impl PriceFeed for StubFeed {
    fn fetch(&self) -> anyhow::Result<PriceInfo> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.info.clone())
    }

    fn name(&self) -> &str {
        "stub"
    }
}

struct FailingFeed;

impl PriceFeed for FailingFeed {
    fn fetch(&self) -> anyhow::Result<PriceInfo> {
        anyhow::bail!("feed unreachable")
    }

    fn name(&self) -> &str {
        "failing"
    }
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
    day(d).and_hms_opt(h, m, 0).unwrap()
}

fn hourly(d: u32, totals: &[f64]) -> Vec<PriceRecord> {
    totals
        .iter()
        .enumerate()
        .map(|(hour, total)| {
            PriceRecord::new(*total, "EUR", format!("2024-03-{d:02}T{hour:02}:00:00.000+01:00"))
        })
        .collect()
}

fn number(value: Option<&SnapshotValue>) -> f64 {
    match value {
        Some(SnapshotValue::Number(n)) => *n,
        other => panic!("expected a number, got {other:?}"),
    }
}

#[test]
fn test_five_hour_example_end_to_end() {
    let dir = tempdir().unwrap();
    let config = SnapshotConfig {
        precision: 2,
        price_unit: PriceUnit::Eur,
        past_hours: 23,
        future_hours: 36,
        history_file: dir.path().join("history.json"),
        ..Default::default()
    };

    let today = hourly(10, &[0.20, 0.25, 0.18, 0.30, 0.22]);
    let info = PriceInfo {
        current: Some(today[2].clone()),
        today: today.clone(),
        tomorrow: Vec::new(),
    };

    // 02:09:20 plus 40s offset lands at 02:10 logically
    let clock = Clock::fixed(day(10).and_hms_opt(2, 9, 20).unwrap(), 40);
    assert_eq!(clock.now(), at(10, 2, 10));

    let cycle = SnapshotCycle::with_clock(config, clock);
    let feed = StubFeed::new(info);
    let snapshot = cycle.run(&feed).unwrap();
    assert_eq!(feed.calls.get(), 1);

    assert_eq!(number(snapshot.get("price_low")), 0.18);
    assert_eq!(number(snapshot.get("price_high")), 0.30);
    assert_eq!(number(snapshot.get("price_median")), 0.22);
    assert_eq!(number(snapshot.get("price_average")), 0.23);
    assert_eq!(number(snapshot.get("price_current")), 0.18);

    let ladder: Vec<f64> = (0..5)
        .map(|rank| number(snapshot.get(&format!("price_threshold_{rank:02}"))))
        .collect();
    assert_eq!(ladder, vec![0.18, 0.20, 0.22, 0.25, 0.30]);

    // 02:00 is the current slot, 00:00 two hours back, 04:00 two hours ahead
    assert_eq!(number(snapshot.get("data_price_hour_rel_+00_amount")), 0.18);
    assert_eq!(number(snapshot.get("data_price_hour_rel_-02_amount")), 0.20);
    assert_eq!(number(snapshot.get("data_price_hour_rel_+02_amount")), 0.22);
    assert_eq!(
        snapshot.get("data_price_hour_rel_+03_amount"),
        Some(&SnapshotValue::Missing)
    );
    assert_eq!(
        snapshot.get("data_price_hour_rel_num_negatives"),
        Some(&SnapshotValue::Integer(2))
    );
    assert_eq!(
        snapshot.get("data_price_hour_rel_num_positives"),
        Some(&SnapshotValue::Integer(3))
    );

    let rel_slots = snapshot
        .keys()
        .filter(|k| k.starts_with("data_price_hour_rel_") && k.ends_with("_amount"))
        .count();
    assert_eq!(rel_slots, 23 + 36);

    assert_eq!(
        snapshot.get("date_now"),
        Some(&SnapshotValue::Text("2024-03-10".to_owned()))
    );

    let wire = snapshot.to_datagram(-1000, false);
    assert!(wire.contains("price_low:0.18"));
    assert!(wire.contains("data_price_hour_rel_+03_amount:-1000"));
    assert!(wire.contains("price_unit:EUR"));
    assert!(!wire.contains('"'));
}

#[test]
fn test_yesterday_from_history_fills_past_slots() {
    let dir = tempdir().unwrap();
    let history_file = dir.path().join("history.json");
    let yesterday = hourly(9, &[0.5; 24]);
    HistoryCache::new(&history_file)
        .store(day(9), &yesterday, 3)
        .unwrap();

    let config = SnapshotConfig {
        precision: 2,
        past_hours: 6,
        future_hours: 4,
        history_file,
        ..Default::default()
    };
    let today = hourly(10, &[0.1, 0.2, 0.3]);
    let info = PriceInfo {
        current: Some(today[1].clone()),
        today,
        tomorrow: Vec::new(),
    };

    let clock = Clock::fixed(at(10, 1, 30), 0);
    let snapshot = SnapshotCycle::with_clock(config, clock).build(&info).unwrap();

    // 01:00 today is slot 0, 00:00 today -1, 23:00..20:00 yesterday -2..-5
    assert_eq!(number(snapshot.get("data_price_hour_rel_+00_amount")), 0.2);
    assert_eq!(number(snapshot.get("data_price_hour_rel_-01_amount")), 0.1);
    for slot in 2..=6 {
        assert_eq!(
            number(snapshot.get(&format!("data_price_hour_rel_-{slot:02}_amount"))),
            0.5
        );
    }
    assert_eq!(
        snapshot.get("data_price_hour_rel_num_negatives"),
        Some(&SnapshotValue::Integer(6))
    );
}

#[test]
fn test_tomorrow_extends_future_slots() {
    let dir = tempdir().unwrap();
    let config = SnapshotConfig {
        precision: 1,
        price_unit: PriceUnit::Cent,
        no_invalid_fields: true,
        past_hours: 1,
        future_hours: 3,
        history_file: dir.path().join("history.json"),
        ..Default::default()
    };
    let mut today = hourly(10, &[0.1; 23]);
    today.push(PriceRecord::new(0.2, "EUR", "2024-03-10T23:00:00.000+01:00"));
    let info = PriceInfo {
        current: Some(today[23].clone()),
        today,
        tomorrow: hourly(11, &[0.3, 0.4, 0.5]),
    };

    let clock = Clock::fixed(at(10, 23, 15), 0);
    let snapshot = SnapshotCycle::with_clock(config, clock).build(&info).unwrap();

    assert_eq!(number(snapshot.get("price_current")), 20.0);
    assert_eq!(number(snapshot.get("data_price_hour_rel_+00_amount")), 20.0);
    assert_eq!(number(snapshot.get("data_price_hour_rel_+01_amount")), 30.0);
    assert_eq!(number(snapshot.get("data_price_hour_rel_+02_amount")), 40.0);
    assert!(!snapshot.contains_key("data_price_hour_rel_+03_amount"));
    assert_eq!(number(snapshot.get("price_multiplicator_to_eur")), 0.01);
}

#[test]
fn test_empty_today_is_fatal_and_stores_nothing() {
    let dir = tempdir().unwrap();
    let history_file = dir.path().join("history.json");
    let config = SnapshotConfig {
        history_file: history_file.clone(),
        ..Default::default()
    };
    let feed = StubFeed::new(PriceInfo::default());

    let cycle = SnapshotCycle::with_clock(config, Clock::fixed(at(10, 12, 0), 60));
    let result = cycle.run(&feed);

    assert!(matches!(result, Err(SnapshotError::EmptySeries)));
    assert!(!history_file.exists());
}

#[test]
fn test_feed_failure_is_fatal() {
    let dir = tempdir().unwrap();
    let config = SnapshotConfig {
        history_file: dir.path().join("history.json"),
        ..Default::default()
    };
    let cycle = SnapshotCycle::with_clock(config, Clock::fixed(at(10, 12, 0), 60));

    let err = cycle.run(&FailingFeed).unwrap_err();
    assert!(matches!(err, SnapshotError::Feed(_)));
    assert!(err.to_string().contains("feed unreachable"));
}

#[test]
fn test_history_keeps_first_series_of_the_day() {
    let dir = tempdir().unwrap();
    let history_file = dir.path().join("history.json");
    let config = SnapshotConfig {
        history_file: history_file.clone(),
        ..Default::default()
    };
    let cycle = SnapshotCycle::with_clock(config, Clock::fixed(at(10, 12, 0), 60));

    let first = hourly(10, &[0.1, 0.2]);
    let second = hourly(10, &[0.7, 0.8]);
    for today in [first.clone(), second] {
        let info = PriceInfo {
            current: None,
            today,
            tomorrow: Vec::new(),
        };
        cycle.build(&info).unwrap();
    }

    assert_eq!(HistoryCache::new(&history_file).load_day(day(10)), first);
}

#[test]
fn test_corrupt_history_does_not_fail_cycle() {
    let dir = tempdir().unwrap();
    let history_file = dir.path().join("history.json");
    std::fs::write(&history_file, "{{{{").unwrap();

    let config = SnapshotConfig {
        history_file,
        ..Default::default()
    };
    let info = PriceInfo {
        current: None,
        today: hourly(10, &[0.1, 0.2]),
        tomorrow: Vec::new(),
    };

    let snapshot = SnapshotCycle::with_clock(config, Clock::fixed(at(10, 0, 30), 0))
        .build(&info)
        .unwrap();
    assert_eq!(snapshot.get("price_current"), Some(&SnapshotValue::Missing));
}

#[test]
fn test_invalid_live_timestamp_is_fatal() {
    let dir = tempdir().unwrap();
    let history_file = dir.path().join("history.json");
    let config = SnapshotConfig {
        history_file: history_file.clone(),
        ..Default::default()
    };
    let mut today = hourly(10, &[0.1, 0.2]);
    today.push(PriceRecord::new(0.3, "EUR", "garbage"));
    let info = PriceInfo {
        current: None,
        today,
        tomorrow: Vec::new(),
    };

    let result = SnapshotCycle::with_clock(config, Clock::fixed(at(10, 0, 30), 0)).build(&info);
    assert!(matches!(result, Err(SnapshotError::InvalidTimestamp { .. })));
    assert!(!history_file.exists());
}
