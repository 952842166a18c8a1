#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]
#![warn(missing_docs)]

//! Raw input records and run configuration.
//!
//! The record types mirror the column headers of the published CSV inputs
//! exactly and convert into the domain types with [`From`].

use std::path::PathBuf;

use beps_building_models::{Building, PropertyUse};
use beps_policy_models::{EmissionFactor, GhgiStandard, TimelineEntry};
use serde::{Deserialize, Serialize};

/// One row of the yearly emission factor CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionFactorRecord {
    /// Calendar year the factors apply to.
    #[serde(rename = "Year")]
    pub year: i32,
    /// Grid electricity factor in kgCO2e per kBtu.
    #[serde(rename = "Electricity emission factor (kgCO2e/kBtu)")]
    pub electricity_factor: f64,
    /// District steam factor in kgCO2e per kBtu.
    #[serde(rename = "Steam emission factor (kgCO2e/kBtu)")]
    pub steam_factor: f64,
    /// Natural gas factor in kgCO2e per kBtu.
    #[serde(rename = "Gas emission factor (kgCO2e/kBtu)")]
    pub gas_factor: f64,
}

impl From<EmissionFactorRecord> for EmissionFactor {
    fn from(value: EmissionFactorRecord) -> Self {
        Self {
            year: value.year,
            electricity_factor: value.electricity_factor,
            steam_factor: value.steam_factor,
            gas_factor: value.gas_factor,
        }
    }
}

/// One row of the GHGI policy timeline CSV.
///
/// An empty or `NaN` `ghgi` means the use type is not yet regulated that
/// year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineRecord {
    /// Compliance year.
    pub year: i32,
    /// Floor-area size class label, e.g. `"20,001-50,000"`.
    #[serde(rename = "sq_ft_classification")]
    pub size_class: String,
    /// Property use type the standard applies to.
    #[serde(rename = "building_type")]
    pub use_type: String,
    /// GHGI standard in kgCO2e per square foot, if one is in force.
    #[serde(default)]
    pub ghgi: Option<f64>,
}

impl From<TimelineRecord> for TimelineEntry {
    fn from(value: TimelineRecord) -> Self {
        Self {
            year: value.year,
            size_class: value.size_class.trim().to_owned(),
            use_type: value.use_type.trim().to_owned(),
            ghgi_standard: GhgiStandard::from(value.ghgi),
        }
    }
}

/// One row of the building benchmarking CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingRecord {
    /// Benchmarking building identifier.
    #[serde(rename = "OSEBuildingID")]
    pub id: String,
    /// Display name; may be blank.
    #[serde(rename = "BuildingName", default)]
    pub name: String,
    /// Gross floor area in square feet.
    #[serde(rename = "Total_sqft")]
    pub total_sqft: f64,
    /// Floor-area size class label.
    #[serde(rename = "sq_ft_classification")]
    pub size_class: String,
    /// Annual electricity use in kBtu.
    #[serde(rename = "Electricity(kBtu)", default)]
    pub electricity_kbtu: Option<f64>,
    /// Annual district steam use in kBtu.
    #[serde(rename = "Steam(kBtu)", default)]
    pub steam_kbtu: Option<f64>,
    /// Annual natural gas use in kBtu.
    #[serde(rename = "NaturalGas(kBtu)", default)]
    pub gas_kbtu: Option<f64>,
    /// Use type of the largest share of floor area.
    #[serde(rename = "LargestPropertyUseType OSE", default)]
    pub first_use_type: Option<String>,
    /// Use type of the second largest share.
    #[serde(rename = "SecondLargestPropertyUseType OSE", default)]
    pub second_use_type: Option<String>,
    /// Use type of the third largest share.
    #[serde(rename = "ThirdLargestPropertyUseType OSE", default)]
    pub third_use_type: Option<String>,
    /// Fraction of floor area (0-1) in the largest use.
    #[serde(rename = "percent_sqft_1st", default)]
    pub first_share: Option<f64>,
    /// Fraction of floor area in the second use.
    #[serde(rename = "percent_sqft_2nd", default)]
    pub second_share: Option<f64>,
    /// Fraction of floor area in the third use.
    #[serde(rename = "percent_sqft_3rd", default)]
    pub third_share: Option<f64>,
    /// WGS84 latitude.
    #[serde(rename = "Latitude", default)]
    pub latitude: Option<f64>,
    /// WGS84 longitude.
    #[serde(rename = "Longitude", default)]
    pub longitude: Option<f64>,
}

impl From<BuildingRecord> for Building {
    fn from(value: BuildingRecord) -> Self {
        Self {
            id: value.id.trim().to_owned(),
            name: value.name.trim().to_owned(),
            total_sqft: value.total_sqft,
            size_class: value.size_class.trim().to_owned(),
            electricity_kbtu: value.electricity_kbtu,
            steam_kbtu: value.steam_kbtu,
            gas_kbtu: value.gas_kbtu,
            uses: [
                PropertyUse::new(value.first_use_type.as_deref(), value.first_share),
                PropertyUse::new(value.second_use_type.as_deref(), value.second_share),
                PropertyUse::new(value.third_use_type.as_deref(), value.third_share),
            ],
            latitude: value.latitude,
            longitude: value.longitude,
        }
    }
}

/// Paths to the three input tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct InputsConfig {
    /// Yearly emission factor CSV.
    pub emissions: Option<PathBuf>,
    /// GHGI policy timeline CSV.
    pub timeline: Option<PathBuf>,
    /// Building benchmarking CSV.
    pub buildings: Option<PathBuf>,
    /// Council district boundaries (`GeoJSON`), used by district assignment.
    pub districts: Option<PathBuf>,
}

/// Fee schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PolicyConfig {
    /// Years in which the flat fee is assessed.
    #[serde(default)]
    pub fine_years: Vec<i32>,
    /// Fee per square foot of floor area.
    #[serde(default)]
    pub fine_per_sqft: f64,
}

/// Projection horizon, inclusive on both ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HorizonConfig {
    /// First projected year.
    pub start_year: Option<i32>,
    /// Last projected year.
    pub end_year: Option<i32>,
}

/// Where and how to write results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OutputConfig {
    /// Output file; stdout when omitted.
    pub path: Option<PathBuf>,
    /// `csv` or `json`; inferred from `path` when omitted.
    pub format: Option<String>,
}

/// A projection run as described by a TOML file.
///
/// ```toml
/// [inputs]
/// emissions = "data/emissions.csv"
/// timeline = "data/timeline.csv"
/// buildings = "data/buildings.csv"
///
/// [policy]
/// fine_years = [2030, 2035, 2040, 2045, 2050]
/// fine_per_sqft = 2.5
///
/// [horizon]
/// start_year = 2027
/// end_year = 2050
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunConfig {
    /// `[inputs]` table paths.
    #[serde(default)]
    pub inputs: InputsConfig,
    /// `[policy]` fee schedule.
    #[serde(default)]
    pub policy: PolicyConfig,
    /// `[horizon]` year range.
    #[serde(default)]
    pub horizon: HorizonConfig,
    /// `[output]` destination.
    #[serde(default)]
    pub output: OutputConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn building_record_reads_published_headers() {
        let data = "\
OSEBuildingID,BuildingName,Total_sqft,sq_ft_classification,Electricity(kBtu),Steam(kBtu),NaturalGas(kBtu),LargestPropertyUseType OSE,SecondLargestPropertyUseType OSE,ThirdLargestPropertyUseType OSE,percent_sqft_1st,percent_sqft_2nd,percent_sqft_3rd
1, Mayflower Park Hotel ,88434,\"50,001-90,000\",3946027,,1276453,Hotel,,,1.0,,
";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let record: BuildingRecord = reader.deserialize().next().unwrap().unwrap();
        assert_eq!(record.steam_kbtu, None);
        assert_eq!(record.latitude, None);

        let building = Building::from(record);
        assert_eq!(building.id, "1");
        assert_eq!(building.name, "Mayflower Park Hotel");
        assert_eq!(building.size_class, "50,001-90,000");
        assert_eq!(building.primary_use().use_type(), Some("Hotel"));
        assert_eq!(building.secondary_use().use_type(), None);
        assert!(building.secondary_use().share.abs() < f64::EPSILON);
    }

    #[test]
    fn blank_timeline_ghgi_is_not_yet_regulated() {
        let data = "year,sq_ft_classification,building_type,ghgi\n2029,S,Office,\n2030,S,Office,NaN\n2031,S,Office,1.5\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let entries: Vec<TimelineEntry> = reader
            .deserialize::<TimelineRecord>()
            .map(|r| r.unwrap().into())
            .collect();

        assert_eq!(entries[0].ghgi_standard, GhgiStandard::NotYetRegulated);
        assert_eq!(entries[1].ghgi_standard, GhgiStandard::NotYetRegulated);
        assert_eq!(entries[2].ghgi_standard, GhgiStandard::Standard(1.5));
    }

    #[test]
    fn run_config_sections_are_optional() {
        let config: RunConfig = toml::de::from_str("[horizon]\nstart_year = 2027\n").unwrap();
        assert_eq!(config.horizon.start_year, Some(2027));
        assert_eq!(config.horizon.end_year, None);
        assert!(config.policy.fine_years.is_empty());
        assert_eq!(config.inputs, InputsConfig::default());
    }
}
