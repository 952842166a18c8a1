#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Council district assignment for benchmarked buildings.
//!
//! Loads district polygons from a `GeoJSON` `FeatureCollection`, builds an
//! R-tree over their bounding boxes, and resolves building coordinates to
//! district codes with point-in-polygon tests. Buildings that land outside
//! every polygon (typically piers and marinas on the water) can be resolved
//! by name instead.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use beps_building_models::Building;
use geo::{BoundingRect, Contains, MultiPolygon};
use geojson::{GeoJson, JsonValue};
use rstar::{AABB, RTree, RTreeObject};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Feature property holding the district code in the city's published
/// council district layer.
pub const DEFAULT_DISTRICT_PROPERTY: &str = "C_DISTRICT";

/// Waterfront buildings whose coordinates fall outside every district
/// polygon, keyed by upper-cased building name.
pub const KNOWN_WATERFRONT_BUILDINGS: &[(&str, u8)] = &[
    ("WATERWORKS OFFICE & MARINA", 7),
    ("WATERWORKS OFFICES + MARINA", 7),
    ("NAUTICAL LANDING", 7),
    ("UNION HARBOR CONDOMINIUM", 4),
    ("THE PIER AT LESCHI", 3),
    ("PIER AT LESCHI THE", 3),
];

/// Errors that can occur while loading district boundaries.
#[derive(Debug, Error)]
pub enum DistrictError {
    /// Reading the boundary file failed.
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// Boundary file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The input is not valid `GeoJSON`.
    #[error("Invalid GeoJSON: {0}")]
    InvalidGeoJson(String),

    /// The input is valid `GeoJSON` but not a `FeatureCollection`.
    #[error("District boundaries must be a GeoJSON FeatureCollection")]
    NotFeatureCollection,

    /// A feature lacks the district code property.
    #[error("Feature {index} has no '{property}' property")]
    MissingProperty {
        /// Position of the feature in the collection.
        index: usize,
        /// Property that was expected.
        property: String,
    },

    /// A feature's district code is not a small non-negative integer.
    #[error("Feature {index} has invalid district code {value} in '{property}'")]
    InvalidDistrict {
        /// Position of the feature in the collection.
        index: usize,
        /// Property that was read.
        property: String,
        /// The rejected value.
        value: String,
    },
}

/// A district polygon stored in the R-tree.
struct DistrictEntry {
    district: u8,
    envelope: AABB<[f64; 2]>,
    polygon: MultiPolygon<f64>,
}

impl RTreeObject for DistrictEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// The district a building was assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DistrictAssignment {
    /// Registry id of the building.
    pub building_id: String,
    /// Building name.
    pub building_name: String,
    /// District code, or `None` if the building could not be placed.
    pub district: Option<u8>,
}

/// Spatial index over council district polygons.
pub struct DistrictIndex {
    districts: RTree<DistrictEntry>,
    /// upper-cased building name -> district
    overrides: BTreeMap<String, u8>,
}

impl DistrictIndex {
    /// Builds an index from a `GeoJSON` `FeatureCollection` whose features
    /// carry an integer district code in `property`.
    ///
    /// Features without a polygon geometry are skipped with a warning.
    ///
    /// # Errors
    ///
    /// * [`DistrictError::InvalidGeoJson`] if the text does not parse
    /// * [`DistrictError::NotFeatureCollection`] for any other `GeoJSON` type
    /// * [`DistrictError::MissingProperty`] / [`DistrictError::InvalidDistrict`]
    ///   if a feature's district code is absent or not an integer in `0..=255`
    pub fn from_geojson(geojson_str: &str, property: &str) -> Result<Self, DistrictError> {
        let geojson: GeoJson = geojson_str
            .parse()
            .map_err(|e: geojson::Error| DistrictError::InvalidGeoJson(e.to_string()))?;
        let GeoJson::FeatureCollection(collection) = geojson else {
            return Err(DistrictError::NotFeatureCollection);
        };

        let mut entries = Vec::with_capacity(collection.features.len());

        for (index, feature) in collection.features.into_iter().enumerate() {
            let value = feature
                .property(property)
                .ok_or_else(|| DistrictError::MissingProperty {
                    index,
                    property: property.to_owned(),
                })?;
            let district = district_code(value).ok_or_else(|| DistrictError::InvalidDistrict {
                index,
                property: property.to_owned(),
                value: value.to_string(),
            })?;

            let Some(polygon) = feature.geometry.and_then(to_multipolygon) else {
                log::warn!("Skipping district {district} feature {index}: no polygon geometry");
                continue;
            };

            entries.push(DistrictEntry {
                district,
                envelope: compute_envelope(&polygon),
                polygon,
            });
        }

        log::info!("Loaded {} district polygons into spatial index", entries.len());

        Ok(Self {
            districts: RTree::bulk_load(entries),
            overrides: BTreeMap::new(),
        })
    }

    /// Reads `path` and builds an index with [`Self::from_geojson`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_geojson`], plus [`DistrictError::Io`].
    pub fn from_path(path: &Path, property: &str) -> Result<Self, DistrictError> {
        let text = std::fs::read_to_string(path).map_err(|source| DistrictError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_geojson(&text, property)
    }

    /// Assigns `district` to buildings named `name` (case-insensitive) that
    /// fall outside every polygon.
    #[must_use]
    pub fn with_override(mut self, name: &str, district: u8) -> Self {
        self.overrides.insert(name.trim().to_uppercase(), district);
        self
    }

    /// Adds every entry of [`KNOWN_WATERFRONT_BUILDINGS`] as an override.
    #[must_use]
    pub fn with_known_overrides(self) -> Self {
        KNOWN_WATERFRONT_BUILDINGS
            .iter()
            .fold(self, |index, (name, district)| {
                index.with_override(name, *district)
            })
    }

    /// Number of indexed polygons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.districts.size()
    }

    /// Whether no polygons were indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.districts.size() == 0
    }

    /// Look up the district containing a point.
    ///
    /// Districts tile the city without overlap, so first match wins.
    #[must_use]
    pub fn lookup(&self, lng: f64, lat: f64) -> Option<u8> {
        let point = geo::Point::new(lng, lat);
        let query_env = AABB::from_point([lng, lat]);

        self.districts
            .locate_in_envelope_intersecting(&query_env)
            .find(|entry| entry.polygon.contains(&point))
            .map(|entry| entry.district)
    }

    /// The override district for a building name, if any.
    #[must_use]
    pub fn override_for(&self, name: &str) -> Option<u8> {
        self.overrides.get(&name.trim().to_uppercase()).copied()
    }

    /// Assigns a building to a district by its coordinates, falling back to
    /// the name overrides.
    #[must_use]
    pub fn assign(&self, building: &Building) -> DistrictAssignment {
        let district = building
            .coordinates()
            .and_then(|(lng, lat)| self.lookup(lng, lat))
            .or_else(|| {
                let found = self.override_for(&building.name);
                match found {
                    Some(district) => log::debug!(
                        "Building {} ({}) placed in district {district} by name",
                        building.id,
                        building.name
                    ),
                    None => log::warn!(
                        "Building {} ({}) doesn't have a district {:?}",
                        building.id,
                        building.name,
                        building.coordinates()
                    ),
                }
                found
            });

        DistrictAssignment {
            building_id: building.id.clone(),
            building_name: building.name.clone(),
            district,
        }
    }

    /// Assigns every building, in iteration order.
    pub fn assign_all<'a>(
        &self,
        buildings: impl IntoIterator<Item = &'a Building>,
    ) -> Vec<DistrictAssignment> {
        buildings.into_iter().map(|b| self.assign(b)).collect()
    }
}

fn district_code(value: &JsonValue) -> Option<u8> {
    match value {
        JsonValue::Number(n) => n.as_u64().and_then(|v| u8::try_from(v).ok()),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Converts a `GeoJSON` geometry into a [`MultiPolygon`].
/// Handles both `Polygon` and `MultiPolygon` geometry types.
fn to_multipolygon(geometry: geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geo_geom: geo::Geometry<f64> = geometry.try_into().ok()?;
    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}

fn compute_envelope(mp: &MultiPolygon<f64>) -> AABB<[f64; 2]> {
    mp.bounding_rect().map_or_else(
        || AABB::from_point([0.0, 0.0]),
        |rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
    )
}

#[cfg(test)]
mod tests {
    use beps_building_models::PropertyUse;

    use super::*;

    const DISTRICTS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "C_DISTRICT": 1 },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]
                }
            },
            {
                "type": "Feature",
                "properties": { "C_DISTRICT": "2" },
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [[[[1.0, 0.0], [2.0, 0.0], [2.0, 1.0], [1.0, 1.0], [1.0, 0.0]]]]
                }
            },
            {
                "type": "Feature",
                "properties": { "C_DISTRICT": 3 },
                "geometry": null
            }
        ]
    }"#;

    fn building(name: &str, coords: Option<(f64, f64)>) -> Building {
        Building {
            id: "42".to_string(),
            name: name.to_string(),
            total_sqft: 25_000.0,
            size_class: "20,001-50,000".to_string(),
            electricity_kbtu: None,
            steam_kbtu: None,
            gas_kbtu: None,
            uses: [PropertyUse::unset(), PropertyUse::unset(), PropertyUse::unset()],
            latitude: coords.map(|(_, lat)| lat),
            longitude: coords.map(|(lng, _)| lng),
        }
    }

    #[test]
    fn looks_up_points_inside_polygons() {
        let index = DistrictIndex::from_geojson(DISTRICTS, DEFAULT_DISTRICT_PROPERTY).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.lookup(0.5, 0.5), Some(1));
        assert_eq!(index.lookup(1.5, 0.25), Some(2));
        assert_eq!(index.lookup(5.0, 5.0), None);
    }

    #[test]
    fn name_override_applies_only_outside_polygons() {
        let index = DistrictIndex::from_geojson(DISTRICTS, DEFAULT_DISTRICT_PROPERTY)
            .unwrap()
            .with_known_overrides()
            .with_override("Pier 9", 1);

        let on_water = building("Nautical Landing", Some((5.0, 5.0)));
        assert_eq!(index.assign(&on_water).district, Some(7));

        let on_land = building("Nautical Landing", Some((1.5, 0.5)));
        assert_eq!(index.assign(&on_land).district, Some(2));

        let no_coords = building(" pier 9 ", None);
        assert_eq!(index.assign(&no_coords).district, Some(1));
    }

    #[test]
    fn unplaced_buildings_have_no_district() {
        let index = DistrictIndex::from_geojson(DISTRICTS, DEFAULT_DISTRICT_PROPERTY).unwrap();
        let assignments = index.assign_all(&[
            building("Somewhere Offshore", Some((5.0, 5.0))),
            building("Unknown", None),
        ]);
        assert!(assignments.iter().all(|a| a.district.is_none()));
        assert_eq!(assignments[0].building_id, "42");
    }

    #[test]
    fn rejects_malformed_inputs() {
        assert!(matches!(
            DistrictIndex::from_geojson("not json", DEFAULT_DISTRICT_PROPERTY),
            Err(DistrictError::InvalidGeoJson(_))
        ));
        assert!(matches!(
            DistrictIndex::from_geojson(
                r#"{"type": "Point", "coordinates": [0.0, 0.0]}"#,
                DEFAULT_DISTRICT_PROPERTY
            ),
            Err(DistrictError::NotFeatureCollection)
        ));
        assert!(matches!(
            DistrictIndex::from_geojson(DISTRICTS, "DISTRICT_NUM"),
            Err(DistrictError::MissingProperty { index: 0, .. })
        ));

        let bad = DISTRICTS.replace("\"2\"", "\"two\"");
        assert!(matches!(
            DistrictIndex::from_geojson(&bad, DEFAULT_DISTRICT_PROPERTY),
            Err(DistrictError::InvalidDistrict { index: 1, .. })
        ));
    }
}
