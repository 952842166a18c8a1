#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Emission factor and GHGI policy timeline record types.
//!
//! These are the raw rows behind the two policy lookup tables: one
//! [`EmissionFactor`] per calendar year, and one [`TimelineEntry`] per
//! (year, size class, use type) combination that the building performance
//! standard has scheduled.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// An energy carrier a building consumes, each with its own yearly
/// emission factor.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EnergyCarrier {
    /// Grid electricity
    Electricity,
    /// District steam
    Steam,
    /// Natural gas burned on site
    NaturalGas,
}

impl EnergyCarrier {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Electricity, Self::Steam, Self::NaturalGas]
    }
}

/// Per-year emission factors in kgCO2e per kBtu consumed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionFactor {
    /// Calendar year the factors apply to.
    pub year: i32,
    /// kgCO2e/kBtu for electricity.
    pub electricity_factor: f64,
    /// kgCO2e/kBtu for steam.
    pub steam_factor: f64,
    /// kgCO2e/kBtu for natural gas.
    pub gas_factor: f64,
}

impl EmissionFactor {
    /// Returns the factor for a single carrier.
    #[must_use]
    pub const fn factor(&self, carrier: EnergyCarrier) -> f64 {
        match carrier {
            EnergyCarrier::Electricity => self.electricity_factor,
            EnergyCarrier::Steam => self.steam_factor,
            EnergyCarrier::NaturalGas => self.gas_factor,
        }
    }
}

/// The GHGI standard a timeline entry mandates.
///
/// Timeline rows may exist before a use type is actually regulated; those
/// carry [`GhgiStandard::NotYetRegulated`]. Serialized as a nullable number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum GhgiStandard {
    /// Target intensity in kgCO2e/sqft.
    Standard(f64),
    /// The policy has not reached this use type yet.
    NotYetRegulated,
}

impl GhgiStandard {
    /// Returns the numeric standard, if one is in force.
    #[must_use]
    pub const fn value(self) -> Option<f64> {
        match self {
            Self::Standard(v) => Some(v),
            Self::NotYetRegulated => None,
        }
    }

    /// Returns `true` if a numeric standard is in force.
    #[must_use]
    pub const fn is_regulated(self) -> bool {
        matches!(self, Self::Standard(_))
    }
}

impl From<Option<f64>> for GhgiStandard {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) if !v.is_nan() => Self::Standard(v),
            _ => Self::NotYetRegulated,
        }
    }
}

impl From<GhgiStandard> for Option<f64> {
    fn from(value: GhgiStandard) -> Self {
        value.value()
    }
}

/// One scheduled row of the policy timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    /// Calendar year the standard applies to.
    pub year: i32,
    /// Floor-area bucket (e.g. `"20,001-50,000"`).
    pub size_class: String,
    /// Property use type (e.g. `"Office"`).
    pub use_type: String,
    /// The mandated GHGI for this combination.
    pub ghgi_standard: GhgiStandard,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_standard_is_not_regulated() {
        assert_eq!(GhgiStandard::from(Some(f64::NAN)), GhgiStandard::NotYetRegulated);
        assert_eq!(GhgiStandard::from(None), GhgiStandard::NotYetRegulated);
        assert_eq!(GhgiStandard::from(Some(0.5)), GhgiStandard::Standard(0.5));
    }

    #[test]
    fn factor_selects_carrier() {
        let factor = EmissionFactor {
            year: 2030,
            electricity_factor: 0.1,
            steam_factor: 0.2,
            gas_factor: 0.3,
        };
        let sum: f64 = EnergyCarrier::all().iter().map(|c| factor.factor(*c)).sum();
        assert!((sum - 0.6).abs() < 1e-12);
        assert!((factor.factor(EnergyCarrier::Steam) - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn carrier_names_round_trip_through_strum() {
        assert_eq!(EnergyCarrier::NaturalGas.to_string(), "natural_gas");
        assert_eq!(
            "electricity".parse::<EnergyCarrier>().unwrap(),
            EnergyCarrier::Electricity
        );
    }

    #[test]
    fn standard_serializes_as_nullable_number() {
        let json = serde_json::to_string(&GhgiStandard::NotYetRegulated).unwrap();
        assert_eq!(json, "null");
        let parsed: GhgiStandard = serde_json::from_str("1.25").unwrap();
        assert_eq!(parsed, GhgiStandard::Standard(1.25));
    }
}
