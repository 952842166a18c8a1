#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Benchmarked building records and the building registry.
//!
//! A [`Building`] carries one year of metered energy use by carrier, its
//! floor area and size class, and up to three property uses that split
//! that floor area. Rows come from public benchmarking data, so missing
//! values are expected and normalized here rather than rejected.

use beps_policy_models::EnergyCarrier;
use serde::{Deserialize, Serialize};

/// Use-type strings that mean "no use type recorded".
const UNSET_USE_TYPES: &[&str] = &["", "nan", "none", "null", "n/a"];

/// One property use slot of a building.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyUse {
    /// Use type name, or `None` when the slot is unset.
    pub use_type: Option<String>,
    /// Fraction of the building's floor area in this use (0.0-1.0).
    pub share: f64,
}

impl PropertyUse {
    /// Creates a slot, treating blank or `nan`-like use types as unset and
    /// a `NaN` or missing share as zero.
    #[must_use]
    pub fn new(use_type: Option<&str>, share: Option<f64>) -> Self {
        let use_type = use_type
            .map(str::trim)
            .filter(|t| !UNSET_USE_TYPES.contains(&t.to_lowercase().as_str()))
            .map(str::to_owned);
        let share = share.filter(|s| !s.is_nan()).unwrap_or(0.0);

        Self { use_type, share }
    }

    /// An unset slot.
    #[must_use]
    pub const fn unset() -> Self {
        Self {
            use_type: None,
            share: 0.0,
        }
    }

    /// Returns the use type when the slot is set.
    #[must_use]
    pub fn use_type(&self) -> Option<&str> {
        self.use_type.as_deref()
    }
}

/// A building as loaded from the benchmarking registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    /// Registry identifier.
    pub id: String,
    /// Building name.
    pub name: String,
    /// Total gross floor area in square feet.
    pub total_sqft: f64,
    /// Floor-area bucket used to pick the applicable standard.
    pub size_class: String,
    /// Annual electricity use in kBtu.
    pub electricity_kbtu: Option<f64>,
    /// Annual steam use in kBtu.
    pub steam_kbtu: Option<f64>,
    /// Annual natural gas use in kBtu.
    pub gas_kbtu: Option<f64>,
    /// Largest, second and third largest property uses.
    pub uses: [PropertyUse; 3],
    /// Latitude (WGS84), if known.
    pub latitude: Option<f64>,
    /// Longitude (WGS84), if known.
    pub longitude: Option<f64>,
}

impl Building {
    /// Annual consumption for a carrier in kBtu. Missing or `NaN` readings
    /// count as zero.
    #[must_use]
    pub fn consumption(&self, carrier: EnergyCarrier) -> f64 {
        let reading = match carrier {
            EnergyCarrier::Electricity => self.electricity_kbtu,
            EnergyCarrier::Steam => self.steam_kbtu,
            EnergyCarrier::NaturalGas => self.gas_kbtu,
        };
        reading.filter(|v| !v.is_nan()).unwrap_or(0.0)
    }

    /// The largest property use.
    #[must_use]
    pub const fn primary_use(&self) -> &PropertyUse {
        &self.uses[0]
    }

    /// The second largest property use.
    #[must_use]
    pub const fn secondary_use(&self) -> &PropertyUse {
        &self.uses[1]
    }

    /// The third largest property use.
    #[must_use]
    pub const fn tertiary_use(&self) -> &PropertyUse {
        &self.uses[2]
    }

    /// Returns `(longitude, latitude)` when both are present and non-zero.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let lng = self.longitude.filter(|v| v.is_finite() && *v != 0.0)?;
        let lat = self.latitude.filter(|v| v.is_finite() && *v != 0.0)?;
        Some((lng, lat))
    }
}

/// All buildings under projection, in load order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildingRegistry {
    buildings: Vec<Building>,
}

impl BuildingRegistry {
    /// Wraps loaded buildings.
    #[must_use]
    pub const fn new(buildings: Vec<Building>) -> Self {
        Self { buildings }
    }

    /// Looks up a building by registry id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Building> {
        self.buildings.iter().find(|b| b.id == id)
    }

    /// Iterates buildings in load order.
    pub fn iter(&self) -> std::slice::Iter<'_, Building> {
        self.buildings.iter()
    }

    /// Number of buildings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }
}

impl FromIterator<Building> for BuildingRegistry {
    fn from_iter<T: IntoIterator<Item = Building>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a BuildingRegistry {
    type Item = &'a Building;
    type IntoIter = std::slice::Iter<'a, Building>;

    fn into_iter(self) -> Self::IntoIter {
        self.buildings.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn building() -> Building {
        Building {
            id: "1".to_string(),
            name: "Mayflower Park Hotel".to_string(),
            total_sqft: 88_434.0,
            size_class: "50,001-90,000".to_string(),
            electricity_kbtu: Some(3_946_027.0),
            steam_kbtu: None,
            gas_kbtu: Some(f64::NAN),
            uses: [
                PropertyUse::new(Some("Hotel"), Some(1.0)),
                PropertyUse::unset(),
                PropertyUse::unset(),
            ],
            latitude: Some(47.6122),
            longitude: Some(-122.33799),
        }
    }

    #[test]
    fn missing_consumption_counts_as_zero() {
        let b = building();
        assert!((b.consumption(EnergyCarrier::Electricity) - 3_946_027.0).abs() < f64::EPSILON);
        assert!(b.consumption(EnergyCarrier::Steam).abs() < f64::EPSILON);
        assert!(b.consumption(EnergyCarrier::NaturalGas).abs() < f64::EPSILON);
    }

    #[test]
    fn nan_like_use_types_are_unset() {
        for raw in ["", "nan", "NaN", "  None ", "N/A"] {
            let slot = PropertyUse::new(Some(raw), Some(0.3));
            assert_eq!(slot.use_type(), None, "{raw:?} should be unset");
        }
        assert_eq!(PropertyUse::new(Some(" Office "), None).use_type(), Some("Office"));
        assert!(PropertyUse::new(Some("Office"), Some(f64::NAN)).share.abs() < f64::EPSILON);
    }

    #[test]
    fn coordinates_require_both_non_zero() {
        let mut b = building();
        assert_eq!(b.coordinates(), Some((-122.33799, 47.6122)));
        b.latitude = Some(0.0);
        assert_eq!(b.coordinates(), None);
        b.latitude = None;
        assert_eq!(b.coordinates(), None);
    }

    #[test]
    fn registry_finds_by_id() {
        let registry: BuildingRegistry = [building()].into_iter().collect();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("1").map(|b| b.name.as_str()), Some("Mayflower Park Hotel"));
        assert!(registry.get("2").is_none());
    }
}
