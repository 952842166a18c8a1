//! GHGI standard schedule keyed by (year, size class, use type).
//!
//! A use type is "launched" for a size class once the schedule carries a
//! numeric standard for it in some year. Before launch, a lookup resolves
//! to [`GhgiStandard::NotYetRegulated`] whether or not a row exists. After
//! launch, every later year must have a row; a gap is a
//! [`PolicyError::MissingStandard`].

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use beps_policy_models::{GhgiStandard, TimelineEntry};

use crate::PolicyError;

/// year -> standard, for one (size class, use type) pair
type Schedule = BTreeMap<i32, GhgiStandard>;

/// The policy timeline.
#[derive(Debug, Clone, Default)]
pub struct PolicyTimeline {
    /// size class -> use type -> schedule
    schedules: BTreeMap<String, BTreeMap<String, Schedule>>,
    len: usize,
}

impl PolicyTimeline {
    /// Builds the timeline from raw rows.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::DuplicateTimelineEntry`] if two rows share a
    /// (year, size class, use type) key.
    pub fn new(rows: impl IntoIterator<Item = TimelineEntry>) -> Result<Self, PolicyError> {
        let mut schedules: BTreeMap<String, BTreeMap<String, Schedule>> = BTreeMap::new();
        let mut len = 0;

        for row in rows {
            let schedule = schedules
                .entry(row.size_class.clone())
                .or_default()
                .entry(row.use_type.clone())
                .or_default();

            if schedule.insert(row.year, row.ghgi_standard).is_some() {
                return Err(PolicyError::DuplicateTimelineEntry {
                    year: row.year,
                    size_class: row.size_class,
                    use_type: row.use_type,
                });
            }
            len += 1;
        }

        Ok(Self { schedules, len })
    }

    /// Resolves the standard for one use type of one building size class.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::MissingStandard`] if the use type launched in
    /// or before `year` but the schedule has no row for `year`.
    pub fn standard_for(
        &self,
        year: i32,
        size_class: &str,
        use_type: &str,
    ) -> Result<GhgiStandard, PolicyError> {
        let Some(schedule) = self
            .schedules
            .get(size_class)
            .and_then(|by_use| by_use.get(use_type))
        else {
            return Ok(GhgiStandard::NotYetRegulated);
        };

        if let Some(standard) = schedule.get(&year) {
            return Ok(*standard);
        }

        match launch_year(schedule) {
            Some(launched) if launched <= year => Err(PolicyError::MissingStandard {
                year,
                size_class: size_class.to_owned(),
                use_type: use_type.to_owned(),
                launched,
            }),
            _ => Ok(GhgiStandard::NotYetRegulated),
        }
    }

    /// Returns the first year a numeric standard is in force for the pair.
    #[must_use]
    pub fn launch_year(&self, size_class: &str, use_type: &str) -> Option<i32> {
        self.schedules
            .get(size_class)
            .and_then(|by_use| by_use.get(use_type))
            .and_then(launch_year)
    }

    /// Returns the first and last scheduled years, or `None` when empty.
    #[must_use]
    pub fn years(&self) -> Option<RangeInclusive<i32>> {
        let mut years = self
            .schedules
            .values()
            .flat_map(BTreeMap::values)
            .flat_map(BTreeMap::keys)
            .copied();
        let first = years.next()?;
        let (min, max) = years.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y)));
        Some(min..=max)
    }

    /// Iterates every entry, ordered by size class, use type, then year.
    pub fn entries(&self) -> impl Iterator<Item = TimelineEntry> + '_ {
        self.schedules.iter().flat_map(|(size_class, by_use)| {
            by_use.iter().flat_map(move |(use_type, schedule)| {
                schedule.iter().map(move |(year, standard)| TimelineEntry {
                    year: *year,
                    size_class: size_class.clone(),
                    use_type: use_type.clone(),
                    ghgi_standard: *standard,
                })
            })
        })
    }

    /// Number of scheduled rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the timeline is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

fn launch_year(schedule: &Schedule) -> Option<i32> {
    schedule
        .iter()
        .find(|(_, standard)| standard.is_regulated())
        .map(|(year, _)| *year)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(year: i32, use_type: &str, ghgi: Option<f64>) -> TimelineEntry {
        TimelineEntry {
            year,
            size_class: ">220,000".to_string(),
            use_type: use_type.to_string(),
            ghgi_standard: GhgiStandard::from(ghgi),
        }
    }

    fn sample() -> PolicyTimeline {
        PolicyTimeline::new([
            entry(2030, "Office", None),
            entry(2031, "Office", Some(1.5)),
            entry(2032, "Office", Some(1.2)),
            entry(2034, "Office", Some(1.0)),
            entry(2034, "Hospital", Some(3.0)),
        ])
        .unwrap()
    }

    #[test]
    fn resolves_scheduled_standards() {
        let timeline = sample();
        assert_eq!(
            timeline.standard_for(2032, ">220,000", "Office").unwrap(),
            GhgiStandard::Standard(1.2)
        );
        assert_eq!(timeline.len(), 5);
    }

    #[test]
    fn na_row_is_not_yet_regulated() {
        let timeline = sample();
        assert_eq!(
            timeline.standard_for(2030, ">220,000", "Office").unwrap(),
            GhgiStandard::NotYetRegulated
        );
    }

    #[test]
    fn unknown_combination_is_not_yet_regulated() {
        let timeline = sample();
        assert_eq!(
            timeline.standard_for(2032, ">220,000", "Parking").unwrap(),
            GhgiStandard::NotYetRegulated
        );
        assert_eq!(
            timeline.standard_for(2032, "<20,000", "Office").unwrap(),
            GhgiStandard::NotYetRegulated
        );
    }

    #[test]
    fn gap_before_launch_is_not_yet_regulated() {
        let timeline = sample();
        assert_eq!(
            timeline.standard_for(2028, ">220,000", "Office").unwrap(),
            GhgiStandard::NotYetRegulated
        );
        assert_eq!(
            timeline.standard_for(2033, ">220,000", "Hospital").unwrap(),
            GhgiStandard::NotYetRegulated
        );
    }

    #[test]
    fn gap_after_launch_is_an_error() {
        let timeline = sample();
        let err = timeline
            .standard_for(2033, ">220,000", "Office")
            .unwrap_err();
        assert!(matches!(
            err,
            PolicyError::MissingStandard { year: 2033, launched: 2031, .. }
        ));
        assert!(timeline.standard_for(2040, ">220,000", "Office").is_err());
    }

    #[test]
    fn rejects_duplicate_keys() {
        let err = PolicyTimeline::new([entry(2031, "Office", Some(1.5)), entry(2031, "Office", None)])
            .unwrap_err();
        assert!(matches!(err, PolicyError::DuplicateTimelineEntry { year: 2031, .. }));
    }

    #[test]
    fn reports_coverage_and_launch() {
        let timeline = sample();
        assert_eq!(timeline.years(), Some(2030..=2034));
        assert_eq!(timeline.launch_year(">220,000", "Office"), Some(2031));
        assert_eq!(timeline.launch_year(">220,000", "Parking"), None);
        assert_eq!(timeline.entries().count(), 5);
    }
}
