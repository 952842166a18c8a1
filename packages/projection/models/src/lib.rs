#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Compliance projection output rows and summary types.
//!
//! A projection is a flat table of [`ProjectionRow`]s, one per building per
//! year. Field names serialize in `snake_case` so that exported CSV headers
//! match the column names downstream analysis notebooks expect.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Whether a building meets its blended GHGI target in a given year.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum ComplianceStatus {
    /// None of the building's use types are regulated yet.
    #[serde(rename = "Not due yet")]
    #[strum(serialize = "Not due yet")]
    NotDueYet,
    /// Baseline GHGI is strictly below the target.
    Yes,
    /// Baseline GHGI is at or above the target.
    No,
}

impl ComplianceStatus {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::NotDueYet, Self::Yes, Self::No]
    }
}

/// One building in one projected year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProjectionRow {
    /// Registry id of the building.
    pub building_id: String,
    /// Building name.
    pub building_name: String,
    /// Total floor area in square feet.
    pub total_sqft: f64,
    /// Size class used for timeline lookups.
    pub size_class: String,
    /// Projected year.
    pub year: i32,
    /// kgCO2e emitted with no changes to the building.
    pub expected_baseline_emissions: f64,
    /// kgCO2e/sqft emitted with no changes (0 for zero-area buildings).
    pub expected_baseline_ghgi: f64,
    /// Floor-area-weighted GHGI target across the building's use types.
    pub city_ghgi_target: f64,
    /// Lower of the baseline GHGI and the target.
    pub compliant_ghgi: f64,
    /// `compliant_ghgi` scaled back to total emissions.
    pub compliant_emissions: f64,
    /// Compliance determination.
    pub compliance_status: ComplianceStatus,
    /// Flat fee assessed this year.
    pub compliance_fees: f64,
}

/// Aggregate outcome of all buildings in one projected year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct YearSummary {
    /// Projected year.
    pub year: i32,
    /// Number of buildings projected.
    pub buildings: u64,
    /// Buildings with status `Yes`.
    pub compliant: u64,
    /// Buildings with status `No`.
    pub non_compliant: u64,
    /// Buildings with status `Not due yet`.
    pub not_due_yet: u64,
    /// Sum of expected baseline emissions (kgCO2e).
    pub total_expected_emissions: f64,
    /// Sum of compliant emissions (kgCO2e).
    pub total_compliant_emissions: f64,
    /// Sum of fees assessed.
    pub total_fees: f64,
}

impl YearSummary {
    /// An empty summary for `year`.
    #[must_use]
    pub const fn new(year: i32) -> Self {
        Self {
            year,
            buildings: 0,
            compliant: 0,
            non_compliant: 0,
            not_due_yet: 0,
            total_expected_emissions: 0.0,
            total_compliant_emissions: 0.0,
            total_fees: 0.0,
        }
    }

    /// Folds one row into the summary.
    pub fn add(&mut self, row: &ProjectionRow) {
        self.buildings += 1;
        match row.compliance_status {
            ComplianceStatus::Yes => self.compliant += 1,
            ComplianceStatus::No => self.non_compliant += 1,
            ComplianceStatus::NotDueYet => self.not_due_yet += 1,
        }
        self.total_expected_emissions += row.expected_baseline_emissions;
        self.total_compliant_emissions += row.compliant_emissions;
        self.total_fees += row.compliance_fees;
    }
}
