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

//! Price unit conversion between the EUR family and the cent family.

use tibberlox_types::{PriceRecord, PriceUnit};

/// Spellings treated as the full unit currency. Matched case-insensitively.
pub const PRIMARY_CURRENCY_SPELLINGS: [&str; 3] = ["EUR", "EURO", "€"];

/// Multipliers indexed by `[source_is_primary][target_is_primary]`.
const MULTIPLIER_TABLE: [[f64; 2]; 2] = [[1.0, 0.01], [100.0, 1.0]];

/// Whether a currency code belongs to the primary (EUR) family.
pub fn is_primary_currency(currency: &str) -> bool {
    let currency = currency.trim();
    PRIMARY_CURRENCY_SPELLINGS
        .iter()
        .any(|spelling| spelling.eq_ignore_ascii_case(currency))
}

/// Round half to even at `precision` decimal digits.
pub fn round_to(value: f64, precision: u8) -> f64 {
    let factor = 10_f64.powi(i32::from(precision));
    (value * factor).round_ties_even() / factor
}

/// Converts feed amounts into the unit sent to the destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitConverter {
    target: PriceUnit,
    precision: u8,
}

impl UnitConverter {
    pub fn new(target: PriceUnit, precision: u8) -> Self {
        Self { target, precision }
    }

    pub fn target(&self) -> PriceUnit {
        self.target
    }

    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// Factor applied to an amount given in `source_currency`.
    pub fn multiplier(&self, source_currency: &str) -> f64 {
        let source = usize::from(is_primary_currency(source_currency));
        let target = usize::from(self.target.is_primary());
        MULTIPLIER_TABLE[source][target]
    }

    pub fn convert(&self, amount: f64, source_currency: &str) -> f64 {
        round_to(amount * self.multiplier(source_currency), self.precision)
    }

    pub fn convert_record(&self, record: &PriceRecord) -> f64 {
        self.convert(record.total, &record.currency)
    }

    /// Convert every record, preserving order.
    pub fn convert_series(&self, records: &[PriceRecord]) -> Vec<f64> {
        records.iter().map(|r| self.convert_record(r)).collect()
    }

    pub fn round(&self, value: f64) -> f64 {
        round_to(value, self.precision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_currency_matching() {
        assert!(is_primary_currency("EUR"));
        assert!(is_primary_currency("eur"));
        assert!(is_primary_currency(" Euro "));
        assert!(is_primary_currency("€"));
        assert!(!is_primary_currency("ct"));
        assert!(!is_primary_currency("NOK"));
        assert!(!is_primary_currency(""));
    }

    #[test]
    fn test_multiplier_table() {
        let to_eur = UnitConverter::new(PriceUnit::Eur, 4);
        let to_cent = UnitConverter::new(PriceUnit::Cent, 4);

        assert_eq!(to_eur.multiplier("EUR"), 1.0);
        assert_eq!(to_eur.multiplier("Cent"), 0.01);
        assert_eq!(to_cent.multiplier("EUR"), 100.0);
        assert_eq!(to_cent.multiplier("ct"), 1.0);
    }

    #[test]
    fn test_convert_rounds() {
        let to_cent = UnitConverter::new(PriceUnit::Cent, 2);
        assert_eq!(to_cent.convert(0.23456, "EUR"), 23.46);

        let to_eur = UnitConverter::new(PriceUnit::Eur, 2);
        assert_eq!(to_eur.convert(23.456, "ct"), 0.23);
    }

    #[test]
    fn test_round_half_to_even() {
        assert_eq!(round_to(2.5, 0), 2.0);
        assert_eq!(round_to(3.5, 0), 4.0);
        assert_eq!(round_to(-0.5, 0), -0.0);
        assert_eq!(round_to(0.125, 2), 0.12);
    }

    #[test]
    fn test_round_trip_within_precision() {
        let to_cent = UnitConverter::new(PriceUnit::Cent, 4);
        let to_eur = UnitConverter::new(PriceUnit::Eur, 4);

        for amount in [0.2012, 0.0, -0.0345, 1.2345, 0.3] {
            let cents = to_cent.convert(amount, "EUR");
            let back = to_eur.convert(cents, "Cent");
            assert!((back - amount).abs() <= 0.5e-4, "{amount} -> {cents} -> {back}");
        }
    }

    #[test]
    fn test_convert_series_preserves_order() {
        let converter = UnitConverter::new(PriceUnit::Cent, 1);
        let records = vec![
            PriceRecord::new(0.30, "EUR", "2024-03-10T00:00:00"),
            PriceRecord::new(0.10, "EUR", "2024-03-10T01:00:00"),
            PriceRecord::new(0.20, "EUR", "2024-03-10T02:00:00"),
        ];
        assert_eq!(converter.convert_series(&records), vec![30.0, 10.0, 20.0]);
    }
}
