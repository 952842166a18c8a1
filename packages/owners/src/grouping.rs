//! Grouping businesses that share a principal.
//!
//! Input is a principal table with one row per (business, principal), as
//! produced by [`crate::extract_principals`]. For every matched business,
//! each of its principals is looked up across the whole table and every
//! other business listing that principal becomes a [`RelatedCompany`].

use std::collections::{BTreeMap, BTreeSet};

use beps_owners_models::{PrincipalRow, RelatedCompany};

/// Rows are logged at this interval while grouping.
const PROGRESS_INTERVAL: usize = 25;

/// Returns every row whose business lists `principal_name` as a principal,
/// including that business's other principals.
#[must_use]
pub fn companies_with_principal<'a>(
    rows: &'a [PrincipalRow],
    principal_name: &str,
) -> Vec<&'a PrincipalRow> {
    let business_ids: BTreeSet<&str> = rows
        .iter()
        .filter(|r| r.principal_name == principal_name)
        .map(|r| r.business_id.as_str())
        .collect();

    rows.iter()
        .filter(|r| business_ids.contains(r.business_id.as_str()))
        .collect()
}

/// Builds the related-company review table.
///
/// Related businesses are grouped by name, one output row per (matched
/// business, related business name). Each related business appears once,
/// keyed by UBI number, under the first matched row that reaches it.
/// Businesses without a UBI number are left out.
#[must_use]
pub fn group_companies_by_principals(rows: &[PrincipalRow]) -> Vec<RelatedCompany> {
    let mut businesses_by_principal: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    let mut rows_by_business: BTreeMap<&str, Vec<&PrincipalRow>> = BTreeMap::new();

    for row in rows {
        if !row.principal_name.is_empty() {
            businesses_by_principal
                .entry(row.principal_name.as_str())
                .or_default()
                .insert(row.business_id.as_str());
        }
        rows_by_business
            .entry(row.business_id.as_str())
            .or_default()
            .push(row);
    }

    let mut seen_ubi: BTreeSet<&str> = BTreeSet::new();
    let mut results = Vec::new();

    for (idx, row) in rows.iter().enumerate() {
        if idx % PROGRESS_INTERVAL == 0 {
            log::info!(
                "Processing principal row {idx} of {}, {} related companies so far",
                rows.len(),
                results.len()
            );
        }

        let Some(business_ids) = businesses_by_principal.get(row.principal_name.as_str()) else {
            continue;
        };

        let mut by_name: BTreeMap<&str, Vec<&PrincipalRow>> = BTreeMap::new();
        for id in business_ids {
            for &related in rows_by_business.get(id).into_iter().flatten() {
                by_name
                    .entry(related.business_name.as_str())
                    .or_default()
                    .push(related);
            }
        }

        for (name, group) in by_name {
            let first = group[0];
            if first.ubi_number.is_empty() || !seen_ubi.insert(first.ubi_number.as_str()) {
                continue;
            }

            let mut principals: Vec<&str> = group
                .iter()
                .map(|r| r.principal_name.as_str())
                .filter(|n| !n.is_empty())
                .collect();
            principals.sort_unstable();
            principals.dedup();

            results.push(RelatedCompany {
                search_term: row.search_term.clone(),
                business_name: row.business_name.clone(),
                potential_related_company: name.to_owned(),
                ubi_number: first.ubi_number.clone(),
                business_id: first.business_id.clone(),
                address: first.address.clone(),
                status: first.status.clone(),
                agent: first.agent.clone(),
                principals: principals.join("; "),
                is_match: String::new(),
                notes: String::new(),
            });
        }
    }

    log::info!(
        "Found {} related companies across {} principal rows",
        results.len(),
        rows.len()
    );

    results
}
