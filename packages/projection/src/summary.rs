//! Per-year roll-up of a projection table.

use std::collections::BTreeMap;

use beps_projection_models::{ProjectionRow, YearSummary};

/// Aggregates rows into one [`YearSummary`] per year, ascending by year.
#[must_use]
pub fn summarize_by_year(rows: &[ProjectionRow]) -> Vec<YearSummary> {
    let mut by_year: BTreeMap<i32, YearSummary> = BTreeMap::new();

    for row in rows {
        by_year
            .entry(row.year)
            .or_insert_with(|| YearSummary::new(row.year))
            .add(row);
    }

    by_year.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProjectionConfig;
    use crate::baseline::tests::{building, projector};

    #[test]
    fn empty_table_has_no_summaries() {
        assert!(summarize_by_year(&[]).is_empty());
    }

    #[test]
    fn summarizes_each_year_in_order() {
        let p = projector(
            vec![
                building("1", 1000.0, &[("Office", 1.0)]),
                building("2", 1000.0, &[("Retail Store", 1.0)]),
            ],
            ProjectionConfig::new([2030], 0.5),
        );
        let rows = p.project(2029, 2031).unwrap();

        let summaries = summarize_by_year(&rows);
        let years: Vec<i32> = summaries.iter().map(|s| s.year).collect();
        assert_eq!(years, vec![2029, 2030, 2031]);

        let y2029 = &summaries[0];
        assert_eq!(y2029.buildings, 2);
        assert_eq!(y2029.not_due_yet, 2);

        let y2030 = &summaries[1];
        assert_eq!(y2030.not_due_yet, 1);
        assert_eq!(y2030.non_compliant, 1);
        assert!((y2030.total_fees - 1000.0).abs() < 1e-9);

        assert!(summaries[2].total_fees.abs() < f64::EPSILON);
    }
}
