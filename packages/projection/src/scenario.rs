//! Alternative policy scenarios layered on top of the baseline projection.
//!
//! A scenario is anything implementing [`ScenarioTransform`]: it receives
//! the emission factors, the policy timeline and a fully computed baseline
//! table, and returns its own table. Plain closures with the matching
//! signature implement the trait.
//!
//! [`ScenarioOverride`] owns the plumbing: it computes the baseline on first
//! use (unless one was supplied), caches it, and invokes the transform.
//! Errors from the transform are returned exactly as the transform raised
//! them.

use beps_policy::{EmissionFactorTable, PolicyTimeline};
use beps_projection_models::ProjectionRow;

use crate::{BaselineProjector, ProjectionError};

/// Turns a baseline projection into an alternative projection.
pub trait ScenarioTransform {
    /// Error raised by the transform.
    type Error;

    /// Produces the alternative table.
    ///
    /// # Errors
    ///
    /// Whatever the scenario logic decides to reject.
    fn transform(
        &self,
        emission_factors: &EmissionFactorTable,
        timeline: &PolicyTimeline,
        baseline: &[ProjectionRow],
    ) -> Result<Vec<ProjectionRow>, Self::Error>;
}

impl<F, E> ScenarioTransform for F
where
    F: Fn(&EmissionFactorTable, &PolicyTimeline, &[ProjectionRow]) -> Result<Vec<ProjectionRow>, E>,
{
    type Error = E;

    fn transform(
        &self,
        emission_factors: &EmissionFactorTable,
        timeline: &PolicyTimeline,
        baseline: &[ProjectionRow],
    ) -> Result<Vec<ProjectionRow>, E> {
        self(emission_factors, timeline, baseline)
    }
}

/// Runs a [`ScenarioTransform`] against a projector's baseline.
pub struct ScenarioOverride<'a, T> {
    projector: &'a BaselineProjector,
    transform: T,
    start_year: i32,
    end_year: i32,
    baseline: Option<Vec<ProjectionRow>>,
}

impl<'a, T: ScenarioTransform> ScenarioOverride<'a, T> {
    /// Creates an override whose baseline will be projected over
    /// `start_year..=end_year` on first use.
    #[must_use]
    pub const fn new(
        projector: &'a BaselineProjector,
        transform: T,
        start_year: i32,
        end_year: i32,
    ) -> Self {
        Self {
            projector,
            transform,
            start_year,
            end_year,
            baseline: None,
        }
    }

    /// Supplies a precomputed baseline so it is not projected again.
    #[must_use]
    pub fn with_baseline(mut self, baseline: Vec<ProjectionRow>) -> Self {
        self.baseline = Some(baseline);
        self
    }

    /// Returns `true` once a baseline is available without projecting.
    #[must_use]
    pub const fn has_baseline(&self) -> bool {
        self.baseline.is_some()
    }

    /// Returns the baseline, projecting it first if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError`] if the baseline projection fails.
    pub fn baseline(&mut self) -> Result<&[ProjectionRow], ProjectionError> {
        if self.baseline.is_none() {
            log::info!("No baseline supplied, projecting one for the scenario");
            let rows = self.projector.project(self.start_year, self.end_year)?;
            self.baseline = Some(rows);
        }
        Ok(self.baseline.as_deref().unwrap_or_default())
    }

    /// Runs the transform and returns the alternative table.
    ///
    /// # Errors
    ///
    /// Returns the transform's own error unchanged, or a baseline
    /// projection failure converted into the transform's error type.
    pub fn run(&mut self) -> Result<Vec<ProjectionRow>, T::Error>
    where
        T::Error: From<ProjectionError>,
    {
        let baseline = match self.baseline.take() {
            Some(rows) => rows,
            None => self.projector.project(self.start_year, self.end_year)?,
        };
        let baseline = self.baseline.insert(baseline);

        self.transform.transform(
            self.projector.emission_factors(),
            self.projector.timeline(),
            baseline,
        )
    }

    /// Consumes the override, returning the cached baseline if any.
    #[must_use]
    pub fn into_baseline(self) -> Option<Vec<ProjectionRow>> {
        self.baseline
    }
}
