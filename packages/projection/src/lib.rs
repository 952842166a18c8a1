#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! BEPS compliance projection engine.
//!
//! [`BaselineProjector`] combines the building registry, the yearly
//! emission factors and the policy timeline into one [`ProjectionRow`] per
//! building per year: expected emissions with no retrofits, the blended
//! GHGI target, the compliance determination and any flat fee due.
//!
//! Alternative policy scenarios plug in through [`ScenarioTransform`] and
//! are driven by [`ScenarioOverride`], which hands the transform a fully
//! computed baseline.
//!
//! [`ProjectionRow`]: beps_projection_models::ProjectionRow

pub mod baseline;
pub mod scenario;
pub mod summary;

use std::collections::BTreeSet;

pub use baseline::BaselineProjector;
pub use scenario::{ScenarioOverride, ScenarioTransform};
pub use summary::summarize_by_year;

use beps_policy::PolicyError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that halt a projection run.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// An input table does not cover the requested year.
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// A timeline lookup for one of a building's use types failed.
    #[error("Timeline lookup failed for building {building_id}: {source}")]
    Timeline {
        /// Registry id of the building being projected.
        building_id: String,
        /// The underlying lookup failure.
        #[source]
        source: PolicyError,
    },

    /// The requested horizon ends before it starts.
    #[error("Invalid year range: {start_year} is after {end_year}")]
    InvalidYearRange {
        /// First requested year.
        start_year: i32,
        /// Last requested year.
        end_year: i32,
    },
}

/// Fee parameters for a projection run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Years in which the flat fee is assessed.
    pub fine_years: BTreeSet<i32>,
    /// Flat fee per square foot of floor area.
    pub fine_per_sqft: f64,
}

impl ProjectionConfig {
    /// Creates a config from fine years and a per-square-foot rate.
    #[must_use]
    pub fn new(fine_years: impl IntoIterator<Item = i32>, fine_per_sqft: f64) -> Self {
        Self {
            fine_years: fine_years.into_iter().collect(),
            fine_per_sqft,
        }
    }

    /// Returns `true` if fees are assessed in `year`.
    #[must_use]
    pub fn is_fine_year(&self, year: i32) -> bool {
        self.fine_years.contains(&year)
    }
}
