#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Input loading for BEPS compliance projections.
//!
//! Reads the emission factor, policy timeline and building benchmarking
//! CSVs into their validated lookup tables, and reads TOML run files that
//! tie those inputs to a fee schedule and projection horizon.

pub mod config;
pub mod tables;

use std::path::PathBuf;

use beps_policy::PolicyError;
use thiserror::Error;

pub use config::{load_projector, load_run_config, parse_run_config, projection_config};
pub use tables::{
    load_buildings, load_emission_factors, load_timeline, read_buildings, read_emission_factors,
    read_timeline,
};

/// Errors that can occur while loading projection inputs.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Reading a file failed.
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A CSV row is malformed, lacks a required column, or holds a value
    /// that does not parse.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The loaded rows violate a table invariant.
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// The run file is not valid TOML for a run configuration.
    #[error("Invalid run configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required input path was given neither in the run file nor on the
    /// command line.
    #[error("No {name} input configured")]
    MissingInput {
        /// Which input is missing (`emissions`, `timeline`, ...).
        name: &'static str,
    },
}
