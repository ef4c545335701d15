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

//! Logical clock used for all time dependent calculations.
//!
//! The controller receiving our datagrams switches on the hour boundary and
//! needs the next hour's price shortly before it. Running the logical clock a
//! few seconds ahead of the wall clock resolves that without touching system time.

use chrono::{Local, NaiveDate, NaiveDateTime, TimeDelta};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    offset: TimeDelta,
    /// Frozen wall clock, `None` reads the system clock
    frozen: Option<NaiveDateTime>,
}

impl Clock {
    /// Clock reading the local system time shifted by `offset_seconds`.
    pub fn system(offset_seconds: i32) -> Self {
        Self {
            offset: TimeDelta::seconds(i64::from(offset_seconds)),
            frozen: None,
        }
    }

    /// Clock frozen at `wall`, shifted by `offset_seconds`.
    pub fn fixed(wall: NaiveDateTime, offset_seconds: i32) -> Self {
        Self {
            offset: TimeDelta::seconds(i64::from(offset_seconds)),
            frozen: Some(wall),
        }
    }

    pub fn offset(&self) -> TimeDelta {
        self.offset
    }

    fn wall_now(&self) -> NaiveDateTime {
        self.frozen.unwrap_or_else(|| Local::now().naive_local())
    }

    /// Logical now: wall clock plus offset.
    pub fn now(&self) -> NaiveDateTime {
        self.wall_now() + self.offset
    }

    /// Date of the logical now.
    pub fn today(&self) -> NaiveDate {
        self.now().date()
    }

    /// Calendar date of the wall clock, offset not applied.
    pub fn calendar_today(&self) -> NaiveDate {
        self.wall_now().date()
    }

    /// Calendar day before [`Clock::calendar_today`].
    pub fn calendar_yesterday(&self) -> NaiveDate {
        let today = self.calendar_today();
        today.pred_opt().unwrap_or(today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_offset_applied_to_now() {
        let clock = Clock::fixed(wall(13, 59, 10), 60);
        assert_eq!(clock.now(), wall(14, 0, 10));
        assert_eq!(clock.offset(), TimeDelta::seconds(60));
    }

    #[test]
    fn test_negative_offset() {
        let clock = Clock::fixed(wall(0, 0, 20), -30);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(
            clock.calendar_today(),
            NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
        );
    }

    #[test]
    fn test_today_crosses_midnight_but_calendar_does_not() {
        let clock = Clock::fixed(wall(23, 59, 30), 60);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
        assert_eq!(
            clock.calendar_today(),
            NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
        );
        assert_eq!(
            clock.calendar_yesterday(),
            NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
        );
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = Clock::system(0);
        let shifted = Clock::system(3600);
        assert!(shifted.now() > clock.now());
    }
}
