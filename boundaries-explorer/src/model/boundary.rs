//! Boundary datasets and their features.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::geo::{geometry_contains, LngLat};

/// Property keys searched, in order, for a feature's display name.
const NAME_KEYS: [&str; 3] = ["NAME", "NAME10", "name"];

/// Property keys searched, in order, for a feature's geo identifier.
const GEO_ID_KEYS: [&str; 4] = ["GEOID", "GEO_ID", "GEOID10", "geo_id"];

/// Extra properties listed in a feature summary, with their labels.
const SUMMARY_KEYS: [(&str, &str); 3] = [
    ("STUSPS", "State Code"),
    ("ALAND", "Land Area (sq meters)"),
    ("AWATER", "Water Area (sq meters)"),
];

/// Which family of boundaries is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryKind {
    States,
    Counties,
    Regions,
}

impl BoundaryKind {
    /// Every kind, in menu order.
    pub const ALL: [BoundaryKind; 3] = [
        BoundaryKind::States,
        BoundaryKind::Counties,
        BoundaryKind::Regions,
    ];

    /// Identifier used in file names, layer ids and query strings.
    pub fn as_str(self) -> &'static str {
        match self {
            BoundaryKind::States => "states",
            BoundaryKind::Counties => "counties",
            BoundaryKind::Regions => "regions",
        }
    }
}

impl fmt::Display for BoundaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no boundary kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown boundary kind '{0}' (expected states, counties or regions)")]
pub struct ParseBoundaryKindError(pub String);

impl FromStr for BoundaryKind {
    type Err = ParseBoundaryKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "states" | "state" => Ok(BoundaryKind::States),
            "counties" | "county" => Ok(BoundaryKind::Counties),
            "regions" | "region" => Ok(BoundaryKind::Regions),
            _ => Err(ParseBoundaryKindError(s.to_string())),
        }
    }
}

/// A single boundary polygon. Immutable once loaded.
///
/// An empty `geo_identifier` means the source carried none.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoFeature {
    pub id: String,
    pub name: String,
    pub geo_identifier: String,
    pub geometry: Value,
    pub properties: Map<String, Value>,
}

impl GeoFeature {
    /// Returns true if `point` falls inside this feature's geometry.
    pub fn contains(&self, point: LngLat) -> bool {
        geometry_contains(&self.geometry, point)
    }

    /// The geo identifier, if the feature has one.
    pub fn geo_id(&self) -> Option<&str> {
        non_empty(&self.geo_identifier)
    }

    /// Popup text: the name, then the identifier and any known census
    /// properties, one per line.
    pub fn summary(&self) -> String {
        let mut lines = vec![self.name.clone()];
        if let Some(geo_id) = self.geo_id() {
            lines.push(format!("GEOID: {}", geo_id));
        }
        for (key, label) in SUMMARY_KEYS {
            match self.properties.get(key) {
                Some(Value::String(v)) if !v.is_empty() => lines.push(format!("{}: {}", label, v)),
                Some(Value::Number(n)) => lines.push(format!("{}: {}", label, n)),
                _ => {}
            }
        }
        lines.join("\n")
    }

    /// Summary handed to pointer handlers.
    pub fn hit(&self) -> FeatureHit {
        FeatureHit {
            id: Some(self.id.clone()),
            name: self.name.clone(),
            geo_identifier: self.geo_identifier.clone(),
        }
    }

    /// GeoJSON `Feature` with the name and identifier promoted to properties.
    pub fn to_geojson(&self) -> Value {
        let mut properties = self.properties.clone();
        properties.insert("NAME".to_string(), Value::String(self.name.clone()));
        match self.geo_id() {
            Some(geo_id) => properties.insert("GEOID".to_string(), Value::String(geo_id.to_string())),
            None => properties.remove("GEOID"),
        };
        json!({
            "type": "Feature",
            "id": self.id,
            "geometry": self.geometry,
            "properties": properties,
        })
    }
}

/// The feature under the pointer, as reported with a pointer event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureHit {
    pub id: Option<String>,
    pub name: String,
    pub geo_identifier: String,
}

impl FeatureHit {
    /// The geo identifier, if the hit carries one.
    pub fn geo_id(&self) -> Option<&str> {
        non_empty(&self.geo_identifier)
    }
}

/// Errors raised while reading a boundary GeoJSON document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatasetError {
    #[error("expected a GeoJSON FeatureCollection, found {0}")]
    NotFeatureCollection(String),
}

/// The boundary collection currently shown on the map.
///
/// Exactly one dataset is active at a time and it is replaced wholesale when
/// the kind changes.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryDataset {
    kind: BoundaryKind,
    features: Vec<GeoFeature>,
}

impl BoundaryDataset {
    /// Creates a dataset from already-decoded features.
    pub fn new(kind: BoundaryKind, features: Vec<GeoFeature>) -> Self {
        Self { kind, features }
    }

    /// Reads a GeoJSON `FeatureCollection`.
    ///
    /// Names come from `NAME`, `NAME10` or `name`; identifiers from `GEOID`,
    /// `GEO_ID`, `GEOID10` or `geo_id`. Features without a geometry are
    /// skipped.
    pub fn from_geojson(kind: BoundaryKind, document: &Value) -> Result<Self, DatasetError> {
        let doc_type = document["type"].as_str().unwrap_or("nothing");
        if doc_type != "FeatureCollection" {
            return Err(DatasetError::NotFeatureCollection(doc_type.to_string()));
        }

        let features = document["features"]
            .as_array()
            .map(|features| {
                features
                    .iter()
                    .enumerate()
                    .filter_map(|(index, feature)| read_feature(index, feature))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self { kind, features })
    }

    pub fn kind(&self) -> BoundaryKind {
        self.kind
    }

    pub fn features(&self) -> &[GeoFeature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// First feature whose geometry contains `point`.
    pub fn feature_at(&self, point: LngLat) -> Option<&GeoFeature> {
        self.features.iter().find(|f| f.contains(point))
    }

    /// Feature with the given id.
    pub fn find_by_id(&self, id: &str) -> Option<&GeoFeature> {
        self.features.iter().find(|f| f.id == id)
    }

    /// Rebuilds a `FeatureCollection` suitable for a rendering-surface source.
    pub fn to_feature_collection(&self) -> Value {
        let features: Vec<Value> = self.features.iter().map(GeoFeature::to_geojson).collect();
        json!({
            "type": "FeatureCollection",
            "features": features,
        })
    }
}

fn read_feature(index: usize, feature: &Value) -> Option<GeoFeature> {
    let geometry = feature.get("geometry").filter(|g| !g.is_null())?.clone();
    let properties = feature["properties"].as_object().cloned().unwrap_or_default();

    let name = first_string(&properties, &NAME_KEYS).unwrap_or_default();
    let geo_identifier = first_string(&properties, &GEO_ID_KEYS).unwrap_or_default();
    let id = match &feature["id"] {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ if !geo_identifier.is_empty() => geo_identifier.clone(),
        _ => index.to_string(),
    };

    Some(GeoFeature {
        id,
        name,
        geo_identifier,
        geometry,
        properties,
    })
}

fn first_string(properties: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match properties.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn non_empty(value: &str) -> Option<&str> {
    Some(value).filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_document() -> Value {
        json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": { "NAME": "South Dakota", "GEOID": "46" },
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[-104.0, 42.5], [-96.4, 42.5], [-96.4, 45.9], [-104.0, 45.9], [-104.0, 42.5]]]
                    }
                },
                {
                    "type": "Feature",
                    "id": 31,
                    "properties": { "NAME10": "Nebraska", "GEO_ID": "0400000US31" },
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[-104.0, 40.0], [-95.3, 40.0], [-95.3, 42.5], [-104.0, 42.5], [-104.0, 40.0]]]
                    }
                },
                { "type": "Feature", "properties": { "NAME": "No shape" }, "geometry": null }
            ]
        })
    }

    #[test]
    fn test_boundary_kind_round_trips_through_str() {
        for kind in BoundaryKind::ALL {
            assert_eq!(kind.as_str().parse::<BoundaryKind>(), Ok(kind));
        }
        assert_eq!("County".parse::<BoundaryKind>(), Ok(BoundaryKind::Counties));
        assert!("provinces".parse::<BoundaryKind>().is_err());
    }

    #[test]
    fn test_from_geojson_reads_names_and_identifiers() {
        let dataset = BoundaryDataset::from_geojson(BoundaryKind::States, &sample_document())
            .expect("valid collection");

        assert_eq!(dataset.len(), 2, "feature without geometry is skipped");
        let first = &dataset.features()[0];
        assert_eq!(first.name, "South Dakota");
        assert_eq!(first.geo_identifier, "46");
        assert_eq!(first.id, "46");

        let second = &dataset.features()[1];
        assert_eq!(second.name, "Nebraska");
        assert_eq!(second.geo_identifier, "0400000US31");
        assert_eq!(second.id, "31");
    }

    #[test]
    fn test_features_without_identifier_carry_no_geoid() {
        let document = json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": { "NAME": "West", "GEOID": "" },
                    "geometry": { "type": "Point", "coordinates": [0.5, 0.5] }
                },
                {
                    "type": "Feature",
                    "properties": { "NAME": "East", "GEO_ID": "  ", "GEOID10": "02" },
                    "geometry": { "type": "Point", "coordinates": [1.5, 0.5] }
                }
            ]
        });
        let dataset = BoundaryDataset::from_geojson(BoundaryKind::States, &document).unwrap();

        let west = &dataset.features()[0];
        assert_eq!(west.geo_id(), None);
        assert_eq!(west.hit().geo_id(), None);
        assert_eq!(west.id, "0");
        assert!(west.to_geojson()["properties"].get("GEOID").is_none());

        let east = &dataset.features()[1];
        assert_eq!(east.geo_id(), Some("02"), "blank keys fall through");
        assert_eq!(east.to_geojson()["properties"]["GEOID"], "02");
    }

    #[test]
    fn test_summary_lists_known_properties() {
        let mut properties = Map::new();
        properties.insert("STUSPS".to_string(), json!("SD"));
        properties.insert("ALAND".to_string(), json!(196_346_981_786_u64));
        properties.insert("LSAD".to_string(), json!("00"));
        let feature = GeoFeature {
            id: "46".to_string(),
            name: "South Dakota".to_string(),
            geo_identifier: "46".to_string(),
            geometry: Value::Null,
            properties,
        };

        assert_eq!(
            feature.summary(),
            "South Dakota\nGEOID: 46\nState Code: SD\nLand Area (sq meters): 196346981786"
        );
    }

    #[test]
    fn test_from_geojson_rejects_other_documents() {
        let result = BoundaryDataset::from_geojson(BoundaryKind::States, &json!({"type": "Feature"}));
        assert_eq!(
            result,
            Err(DatasetError::NotFeatureCollection("Feature".to_string()))
        );
    }

    #[test]
    fn test_feature_at_resolves_clicked_state() {
        let dataset =
            BoundaryDataset::from_geojson(BoundaryKind::States, &sample_document()).unwrap();

        let hit = dataset.feature_at(LngLat::new(-99.73, 43.41)).unwrap();
        assert_eq!(hit.name, "South Dakota");
        assert!(dataset.feature_at(LngLat::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn test_feature_collection_promotes_name_and_geoid() {
        let dataset =
            BoundaryDataset::from_geojson(BoundaryKind::States, &sample_document()).unwrap();
        let collection = dataset.to_feature_collection();

        assert_eq!(collection["features"].as_array().unwrap().len(), 2);
        assert_eq!(collection["features"][1]["properties"]["GEOID"], "0400000US31");
        assert_eq!(collection["features"][1]["properties"]["NAME"], "Nebraska");
    }
}
