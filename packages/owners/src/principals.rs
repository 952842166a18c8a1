//! Flattening registry responses into principal rows, and reading the
//! business and principal tables back from CSV.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use beps_owners_models::{BusinessDetails, BusinessRef, PrincipalRow};
use serde::de::DeserializeOwned;

use crate::OwnersError;

/// Returns one row per principal registered to `business`.
///
/// A business with no principals yields no rows.
#[must_use]
pub fn extract_principals(details: &BusinessDetails, business: &BusinessRef) -> Vec<PrincipalRow> {
    let ubi_number = details.ubi_number.as_deref().unwrap_or_default().trim();
    let agent = details.agent_name().trim();
    let address = details.office_address().trim();
    let status = details.business_status.as_deref().unwrap_or_default().trim();

    details
        .principals_list
        .iter()
        .map(|principal| PrincipalRow {
            search_term: business.search_term.clone(),
            ubi_number: ubi_number.to_owned(),
            business_id: business.business_id.clone(),
            business_name: business.business_name.clone(),
            agent: agent.to_owned(),
            entity_type: principal.entity_type(),
            principal_id: principal.principal_id.clone(),
            principal_name: principal.display_name(),
            address: address.to_owned(),
            status: status.to_owned(),
        })
        .collect()
}

/// Like [`extract_principals`], but a business with no principals still
/// yields one row carrying its business fields and a blank principal.
#[must_use]
pub fn rows_for_business(details: &BusinessDetails, business: &BusinessRef) -> Vec<PrincipalRow> {
    let rows = extract_principals(details, business);
    if !rows.is_empty() {
        return rows;
    }

    log::debug!("Business {} has no registered principals", business.business_id);
    vec![PrincipalRow {
        search_term: business.search_term.clone(),
        ubi_number: details.ubi_number.as_deref().unwrap_or_default().trim().to_owned(),
        business_id: business.business_id.clone(),
        business_name: business.business_name.clone(),
        agent: details.agent_name().trim().to_owned(),
        address: details.office_address().trim().to_owned(),
        status: details
            .business_status
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_owned(),
        ..PrincipalRow::default()
    }]
}

fn read_records<T: DeserializeOwned>(reader: impl Read) -> Result<Vec<T>, OwnersError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for result in reader.deserialize::<T>() {
        records.push(result?);
    }

    Ok(records)
}

fn open(path: &Path) -> Result<File, OwnersError> {
    File::open(path).map_err(|source| OwnersError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a list of businesses (`BusinessId`, `BusinessName`, `SearchTerm`)
/// to look up. Rows with a blank id are skipped.
///
/// # Errors
///
/// * [`OwnersError::Io`] if the file cannot be opened
/// * [`OwnersError::Csv`] if the `BusinessId` column is missing
pub fn read_business_refs(path: &Path) -> Result<Vec<BusinessRef>, OwnersError> {
    let mut refs: Vec<BusinessRef> = read_records(open(path)?)?;
    let total = refs.len();
    refs.retain(|r| !r.business_id.is_empty());

    if refs.len() < total {
        log::warn!("Skipped {} businesses with no id", total - refs.len());
    }
    log::info!("Loaded {} businesses from {}", refs.len(), path.display());

    Ok(refs)
}

/// Reads a principal table previously written from [`PrincipalRow`]s.
///
/// # Errors
///
/// * [`OwnersError::Io`] if the file cannot be opened
/// * [`OwnersError::Csv`] if a row does not match [`PrincipalRow`]
pub fn read_principal_rows(path: &Path) -> Result<Vec<PrincipalRow>, OwnersError> {
    let rows: Vec<PrincipalRow> = read_records(open(path)?)?;
    log::info!("Loaded {} principal rows from {}", rows.len(), path.display());
    Ok(rows)
}
