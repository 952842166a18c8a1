#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Building ownership analysis against the state business registry.
//!
//! Owners of benchmarked buildings are usually LLCs. This crate looks up
//! the principals (governors and officers) registered to those businesses
//! and groups businesses that share a principal, so related owners can be
//! reviewed together:
//!
//! - [`client`] fetches business details and principal searches over HTTP
//! - [`principals`] flattens registry responses into [`PrincipalRow`]s
//! - [`grouping`] finds companies related through a shared principal

pub mod client;
pub mod grouping;
pub mod principals;

pub use beps_owners_models::{BusinessRef, PrincipalRow, RelatedCompany};
pub use client::RegistryClient;
pub use grouping::{companies_with_principal, group_companies_by_principals};
pub use principals::{
    extract_principals, read_business_refs, read_principal_rows, rows_for_business,
};

/// Errors from registry lookups and ownership tables.
#[derive(Debug, thiserror::Error)]
pub enum OwnersError {
    /// An HTTP request failed or the body was not the expected JSON.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The registry answered with a non-success status.
    #[error("Registry returned {status} for {url}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// An I/O operation failed.
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// File being read.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A CSV table could not be parsed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
