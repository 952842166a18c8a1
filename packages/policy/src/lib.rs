#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Emission factor and GHGI policy timeline lookup tables.
//!
//! Both tables are built once from their raw rows, validated on
//! construction, and immutable afterwards. Lookups either succeed or
//! return a [`PolicyError`] describing the coverage gap, which callers
//! treat as a fatal configuration error.

pub mod emissions;
pub mod timeline;

pub use emissions::EmissionFactorTable;
pub use timeline::PolicyTimeline;

use beps_policy_models::EnergyCarrier;
use thiserror::Error;

/// Errors raised while building or querying the policy tables.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The emission factor table has no row for the requested year.
    #[error("No emission factors loaded for year {year}")]
    MissingEmissionFactor {
        /// Requested year.
        year: i32,
    },

    /// Two emission factor rows share a year.
    #[error("Duplicate emission factor row for year {year}")]
    DuplicateEmissionFactor {
        /// Year that appears more than once.
        year: i32,
    },

    /// An emission factor is negative or not a number.
    #[error("Invalid {carrier} emission factor {value} for year {year}")]
    InvalidEmissionFactor {
        /// Year of the offending row.
        year: i32,
        /// Carrier whose factor is invalid.
        carrier: EnergyCarrier,
        /// The rejected value.
        value: f64,
    },

    /// Two timeline rows share a (year, size class, use type) key.
    #[error("Duplicate timeline entry for {year} / {size_class} / {use_type}")]
    DuplicateTimelineEntry {
        /// Year of the duplicated key.
        year: i32,
        /// Size class of the duplicated key.
        size_class: String,
        /// Use type of the duplicated key.
        use_type: String,
    },

    /// A use type that already has a standard in force is missing from the
    /// timeline for a later year.
    #[error(
        "No timeline entry for {year} / {size_class} / {use_type} \
         (standard in force since {launched})"
    )]
    MissingStandard {
        /// Requested year.
        year: i32,
        /// Requested size class.
        size_class: String,
        /// Requested use type.
        use_type: String,
        /// First year with a numeric standard for this combination.
        launched: i32,
    },
}
