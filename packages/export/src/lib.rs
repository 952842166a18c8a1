#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Writers for projection output tables.
//!
//! Any serializable row type can be written; the header row (CSV) or
//! object keys (JSON) come from the row type's serde field names.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Errors that can occur while writing output tables.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Creating or writing the output file failed.
    #[error("I/O error writing {path}: {source}")]
    Io {
        /// Output file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Writing to a stream failed.
    #[error("I/O error: {0}")]
    Stream(#[from] std::io::Error),

    /// A row could not be encoded as CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A row could not be encoded as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ExportFormat {
    /// Comma-separated values with a header row.
    #[default]
    Csv,
    /// A pretty-printed JSON array of objects.
    Json,
}

impl ExportFormat {
    /// Infers the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()?.to_str()?.parse().ok()
    }

    /// Writes `rows` to `writer` in this format.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] if encoding or writing fails.
    pub fn write<T: Serialize>(self, rows: &[T], writer: impl Write) -> Result<(), ExportError> {
        match self {
            Self::Csv => write_csv(rows, writer),
            Self::Json => write_json(rows, writer),
        }
    }

    /// Writes `rows` to a new file at `path` in this format.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] if the file cannot be created or written.
    pub fn write_file<T: Serialize>(self, rows: &[T], path: &Path) -> Result<(), ExportError> {
        match self {
            Self::Csv => write_csv_file(rows, path),
            Self::Json => write_json_file(rows, path),
        }
    }
}

/// Writes `rows` as CSV with a header row. Nothing is written for an empty
/// slice.
///
/// # Errors
///
/// Returns [`ExportError`] if a row cannot be encoded or written.
pub fn write_csv<T: Serialize>(rows: &[T], writer: impl Write) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes `rows` as a pretty-printed JSON array.
///
/// # Errors
///
/// Returns [`ExportError`] if a row cannot be encoded or written.
pub fn write_json<T: Serialize>(rows: &[T], mut writer: impl Write) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(&mut writer, rows)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>, ExportError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|source| ExportError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let file = File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufWriter::new(file))
}

/// Writes `rows` as CSV to a new file at `path`, creating parent
/// directories as needed.
///
/// # Errors
///
/// Returns [`ExportError`] if the file cannot be created or written.
pub fn write_csv_file<T: Serialize>(rows: &[T], path: &Path) -> Result<(), ExportError> {
    write_csv(rows, create(path)?)?;
    log::info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Writes `rows` as JSON to a new file at `path`, creating parent
/// directories as needed.
///
/// # Errors
///
/// Returns [`ExportError`] if the file cannot be created or written.
pub fn write_json_file<T: Serialize>(rows: &[T], path: &Path) -> Result<(), ExportError> {
    write_json(rows, create(path)?)?;
    log::info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}
