//! CSV loaders for the three input tables.
//!
//! Each loader has a `read_*` form over any [`Read`] and a `load_*` form
//! that opens a file. Headers are matched by name, so column order does
//! not matter and extra columns are ignored.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use beps_building_models::{Building, BuildingRegistry};
use beps_ingest_models::{BuildingRecord, EmissionFactorRecord, TimelineRecord};
use beps_policy::{EmissionFactorTable, PolicyTimeline};
use beps_policy_models::{EmissionFactor, TimelineEntry};
use serde::de::DeserializeOwned;

use crate::IngestError;

fn open(path: &Path) -> Result<File, IngestError> {
    File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_records<T: DeserializeOwned>(reader: impl Read) -> Result<Vec<T>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let mut records = Vec::new();
    for result in reader.deserialize::<T>() {
        records.push(result?);
    }

    Ok(records)
}

/// Reads the yearly emission factor table.
///
/// # Errors
///
/// * [`IngestError::Csv`] on a missing column or unparseable number
/// * [`IngestError::Policy`] on a duplicate year or negative factor
pub fn read_emission_factors(reader: impl Read) -> Result<EmissionFactorTable, IngestError> {
    let records: Vec<EmissionFactorRecord> = read_records(reader)?;
    let table = EmissionFactorTable::new(records.into_iter().map(EmissionFactor::from))?;

    if let Some(years) = table.years() {
        log::info!(
            "Loaded emission factors for {} years ({}-{})",
            table.len(),
            years.start(),
            years.end()
        );
    } else {
        log::warn!("Emission factor table is empty");
    }

    Ok(table)
}

/// Opens `path` and reads it with [`read_emission_factors`].
///
/// # Errors
///
/// Same as [`read_emission_factors`], plus [`IngestError::Io`].
pub fn load_emission_factors(path: &Path) -> Result<EmissionFactorTable, IngestError> {
    log::debug!("Reading emission factors from {}", path.display());
    read_emission_factors(open(path)?)
}

/// Reads the GHGI policy timeline.
///
/// # Errors
///
/// * [`IngestError::Csv`] on a missing column or unparseable number
/// * [`IngestError::Policy`] on a duplicated (year, size class, use type)
pub fn read_timeline(reader: impl Read) -> Result<PolicyTimeline, IngestError> {
    let records: Vec<TimelineRecord> = read_records(reader)?;
    let timeline = PolicyTimeline::new(records.into_iter().map(TimelineEntry::from))?;

    log::info!("Loaded {} policy timeline entries", timeline.len());
    if let Some(years) = timeline.years() {
        log::debug!("Timeline covers {}-{}", years.start(), years.end());
    }

    Ok(timeline)
}

/// Opens `path` and reads it with [`read_timeline`].
///
/// # Errors
///
/// Same as [`read_timeline`], plus [`IngestError::Io`].
pub fn load_timeline(path: &Path) -> Result<PolicyTimeline, IngestError> {
    log::debug!("Reading policy timeline from {}", path.display());
    read_timeline(open(path)?)
}

/// Reads the building benchmarking table.
///
/// # Errors
///
/// [`IngestError::Csv`] on a missing column or unparseable number.
pub fn read_buildings(reader: impl Read) -> Result<BuildingRegistry, IngestError> {
    let records: Vec<BuildingRecord> = read_records(reader)?;
    let registry: BuildingRegistry = records.into_iter().map(Building::from).collect();

    let untyped = registry
        .iter()
        .filter(|b| b.primary_use().use_type().is_none())
        .count();
    if untyped > 0 {
        log::warn!("{untyped} buildings have no primary use type and get a zero target");
    }
    log::info!("Loaded {} buildings", registry.len());

    Ok(registry)
}

/// Opens `path` and reads it with [`read_buildings`].
///
/// # Errors
///
/// Same as [`read_buildings`], plus [`IngestError::Io`].
pub fn load_buildings(path: &Path) -> Result<BuildingRegistry, IngestError> {
    log::debug!("Reading buildings from {}", path.display());
    read_buildings(open(path)?)
}
