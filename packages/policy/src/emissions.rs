//! Per-year emission factor table.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use beps_policy_models::{EmissionFactor, EnergyCarrier};

use crate::PolicyError;

/// Emission factors keyed by year.
///
/// Holds exactly one [`EmissionFactor`] per year, all non-negative.
#[derive(Debug, Clone, Default)]
pub struct EmissionFactorTable {
    by_year: BTreeMap<i32, EmissionFactor>,
}

impl EmissionFactorTable {
    /// Builds the table from raw rows.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::DuplicateEmissionFactor`] if two rows share a
    /// year, or [`PolicyError::InvalidEmissionFactor`] if any factor is
    /// negative or `NaN`.
    pub fn new(rows: impl IntoIterator<Item = EmissionFactor>) -> Result<Self, PolicyError> {
        let mut by_year = BTreeMap::new();

        for row in rows {
            for carrier in EnergyCarrier::all() {
                let value = row.factor(*carrier);
                if value.is_nan() || value < 0.0 {
                    return Err(PolicyError::InvalidEmissionFactor {
                        year: row.year,
                        carrier: *carrier,
                        value,
                    });
                }
            }

            if by_year.insert(row.year, row).is_some() {
                return Err(PolicyError::DuplicateEmissionFactor { year: row.year });
            }
        }

        Ok(Self { by_year })
    }

    /// Returns the factors for `year`.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::MissingEmissionFactor`] if the year is not
    /// covered.
    pub fn get(&self, year: i32) -> Result<&EmissionFactor, PolicyError> {
        self.by_year
            .get(&year)
            .ok_or(PolicyError::MissingEmissionFactor { year })
    }

    /// Returns the first and last covered years, or `None` when empty.
    #[must_use]
    pub fn years(&self) -> Option<RangeInclusive<i32>> {
        let first = *self.by_year.keys().next()?;
        let last = *self.by_year.keys().next_back()?;
        Some(first..=last)
    }

    /// Iterates the rows in year order.
    pub fn iter(&self) -> impl Iterator<Item = &EmissionFactor> {
        self.by_year.values()
    }

    /// Number of years loaded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_year.len()
    }

    /// Whether no years are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_year.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factor(year: i32, electricity: f64) -> EmissionFactor {
        EmissionFactor {
            year,
            electricity_factor: electricity,
            steam_factor: 0.066,
            gas_factor: 0.053,
        }
    }

    #[test]
    fn looks_up_by_year() {
        let table = EmissionFactorTable::new([factor(2030, 0.0005), factor(2031, 0.0004)]).unwrap();
        assert_eq!(table.len(), 2);
        assert!((table.get(2031).unwrap().electricity_factor - 0.0004).abs() < f64::EPSILON);
        assert_eq!(table.years(), Some(2030..=2031));
    }

    #[test]
    fn missing_year_is_an_error() {
        let table = EmissionFactorTable::new([factor(2030, 0.0005)]).unwrap();
        assert!(matches!(
            table.get(2029),
            Err(PolicyError::MissingEmissionFactor { year: 2029 })
        ));
    }

    #[test]
    fn rejects_duplicate_years() {
        let err = EmissionFactorTable::new([factor(2030, 0.1), factor(2030, 0.2)]).unwrap_err();
        assert!(matches!(err, PolicyError::DuplicateEmissionFactor { year: 2030 }));
    }

    #[test]
    fn rejects_negative_and_nan_factors() {
        let err = EmissionFactorTable::new([factor(2030, -0.1)]).unwrap_err();
        assert!(matches!(
            err,
            PolicyError::InvalidEmissionFactor {
                carrier: EnergyCarrier::Electricity,
                ..
            }
        ));
        assert!(EmissionFactorTable::new([factor(2030, f64::NAN)]).is_err());
    }

    #[test]
    fn empty_table_has_no_coverage() {
        let table = EmissionFactorTable::default();
        assert!(table.is_empty());
        assert_eq!(table.years(), None);
    }
}
