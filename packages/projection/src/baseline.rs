//! Baseline ("as-is") compliance projection.
//!
//! Each row is computed by [`BaselineProjector::project_row`] in a fixed
//! order, every field depending only on fields computed before it:
//!
//! 1. expected baseline emissions from consumption and the year's factors
//! 2. expected baseline GHGI (0 for zero-area buildings)
//! 3. blended city GHGI target across the three property-use slots
//! 4. compliant GHGI, the lower of (2) and (3)
//! 5. compliant emissions
//! 6. compliance status
//! 7. flat fee, assessed in fine years only

use beps_building_models::{Building, BuildingRegistry, PropertyUse};
use beps_policy::{EmissionFactorTable, PolicyTimeline};
use beps_policy_models::{EmissionFactor, EnergyCarrier, GhgiStandard};
use beps_projection_models::{ComplianceStatus, ProjectionRow};

use crate::{ProjectionConfig, ProjectionError};

/// How one property-use slot resolved against the timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
enum SlotStandard {
    /// No use type recorded for the slot.
    Unset,
    /// The use type has no standard in force this year.
    NotYetRegulated,
    /// The use type has a numeric standard.
    Standard(f64),
}

impl SlotStandard {
    /// GHGI this slot contributes to the blended target, before weighting.
    ///
    /// An unregulated use type is assumed to already meet its future
    /// standard, so it contributes the building's own baseline GHGI.
    const fn contribution(self, baseline_ghgi: f64) -> f64 {
        match self {
            Self::Unset => 0.0,
            Self::NotYetRegulated => baseline_ghgi,
            Self::Standard(ghgi) => ghgi,
        }
    }
}

/// Projects every building in a registry across a range of years.
///
/// Holds its input tables immutably; [`Self::project`] is a pure function
/// of them and can be called repeatedly or from several threads.
#[derive(Debug, Clone)]
pub struct BaselineProjector {
    emission_factors: EmissionFactorTable,
    timeline: PolicyTimeline,
    buildings: BuildingRegistry,
    config: ProjectionConfig,
}

impl BaselineProjector {
    /// Creates a projector over loaded input tables.
    #[must_use]
    pub const fn new(
        emission_factors: EmissionFactorTable,
        timeline: PolicyTimeline,
        buildings: BuildingRegistry,
        config: ProjectionConfig,
    ) -> Self {
        Self {
            emission_factors,
            timeline,
            buildings,
            config,
        }
    }

    /// The loaded emission factors.
    #[must_use]
    pub const fn emission_factors(&self) -> &EmissionFactorTable {
        &self.emission_factors
    }

    /// The loaded policy timeline.
    #[must_use]
    pub const fn timeline(&self) -> &PolicyTimeline {
        &self.timeline
    }

    /// The loaded buildings.
    #[must_use]
    pub const fn buildings(&self) -> &BuildingRegistry {
        &self.buildings
    }

    /// The fee parameters.
    #[must_use]
    pub const fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Projects every building for every year in `start_year..=end_year`.
    ///
    /// Rows are ordered by year, then by registry order. Any lookup failure
    /// aborts the whole run; no partial table is returned.
    ///
    /// # Errors
    ///
    /// * [`ProjectionError::InvalidYearRange`] if `start_year > end_year`
    /// * [`ProjectionError::Policy`] if a year has no emission factors
    /// * [`ProjectionError::Timeline`] if a launched use type has a gap in
    ///   the timeline
    pub fn project(
        &self,
        start_year: i32,
        end_year: i32,
    ) -> Result<Vec<ProjectionRow>, ProjectionError> {
        if start_year > end_year {
            return Err(ProjectionError::InvalidYearRange {
                start_year,
                end_year,
            });
        }

        // Stops at the first uncovered year, so the range is bounded by the
        // table before anything is sized from it.
        let years = (start_year..=end_year)
            .map(|year| self.emission_factors.get(year).map(|factors| (year, factors)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut rows = Vec::with_capacity(self.buildings.len().saturating_mul(years.len()));

        log::info!(
            "Projecting {} buildings over {start_year}-{end_year}",
            self.buildings.len()
        );

        for (year, factors) in years {
            for building in &self.buildings {
                rows.push(self.row_with_factors(building, year, factors)?);
            }
            log::debug!("Projected year {year}");
        }

        log::info!("Projection complete: {} rows", rows.len());

        Ok(rows)
    }

    /// Computes the row for a single building and year.
    ///
    /// # Errors
    ///
    /// Same lookup failures as [`Self::project`].
    pub fn project_row(
        &self,
        building: &Building,
        year: i32,
    ) -> Result<ProjectionRow, ProjectionError> {
        let factors = self.emission_factors.get(year)?;
        self.row_with_factors(building, year, factors)
    }

    fn row_with_factors(
        &self,
        building: &Building,
        year: i32,
        factors: &EmissionFactor,
    ) -> Result<ProjectionRow, ProjectionError> {
        let total_sqft = building.total_sqft;

        let expected_baseline_emissions: f64 = EnergyCarrier::all()
            .iter()
            .map(|carrier| building.consumption(*carrier) * factors.factor(*carrier))
            .sum();

        let expected_baseline_ghgi = if total_sqft == 0.0 {
            0.0
        } else {
            expected_baseline_emissions / total_sqft
        };

        let slots = [
            self.resolve_slot(building, building.primary_use(), year)?,
            self.resolve_slot(building, building.secondary_use(), year)?,
            self.resolve_slot(building, building.tertiary_use(), year)?,
        ];

        let city_ghgi_target: f64 = building
            .uses
            .iter()
            .zip(slots)
            .map(|(slot, standard)| slot.share * standard.contribution(expected_baseline_ghgi))
            .sum();

        let compliant_ghgi = expected_baseline_ghgi.min(city_ghgi_target);
        let compliant_emissions = compliant_ghgi * total_sqft;

        let compliance_status = if slots
            .iter()
            .all(|s| matches!(s, SlotStandard::Unset | SlotStandard::NotYetRegulated))
        {
            ComplianceStatus::NotDueYet
        } else if expected_baseline_ghgi < city_ghgi_target {
            ComplianceStatus::Yes
        } else {
            ComplianceStatus::No
        };

        // TODO: confirm with the policy team whether compliant buildings
        // should be exempt; today every building pays in a fine year.
        let compliance_fees = if self.config.is_fine_year(year) {
            total_sqft * self.config.fine_per_sqft
        } else {
            0.0
        };

        Ok(ProjectionRow {
            building_id: building.id.clone(),
            building_name: building.name.clone(),
            total_sqft,
            size_class: building.size_class.clone(),
            year,
            expected_baseline_emissions,
            expected_baseline_ghgi,
            city_ghgi_target,
            compliant_ghgi,
            compliant_emissions,
            compliance_status,
            compliance_fees,
        })
    }

    fn resolve_slot(
        &self,
        building: &Building,
        slot: &PropertyUse,
        year: i32,
    ) -> Result<SlotStandard, ProjectionError> {
        let Some(use_type) = slot.use_type() else {
            return Ok(SlotStandard::Unset);
        };

        let standard = self
            .timeline
            .standard_for(year, &building.size_class, use_type)
            .map_err(|source| ProjectionError::Timeline {
                building_id: building.id.clone(),
                source,
            })?;

        Ok(match standard {
            GhgiStandard::Standard(ghgi) => SlotStandard::Standard(ghgi),
            GhgiStandard::NotYetRegulated => SlotStandard::NotYetRegulated,
        })
    }
}
