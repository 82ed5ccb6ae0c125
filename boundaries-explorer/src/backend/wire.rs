//! Wire decoding for backend responses.
//!
//! Backend payloads are loosely shaped: demographics arrive either tagged
//! with an entity kind or wrapped in a `state`/`county` key, numbers may be
//! integers or floats, and identifiers may be strings or numbers. Everything
//! is normalised here into the [`crate::model`] types.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use super::error::NetworkError;
use crate::model::{
    BoundaryDataset, BoundaryKind, DemographicRecord, DemographicYear, EntityKind, NearbyPlace,
    SearchHit,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum WireEntityKind {
    State,
    County,
}

impl From<WireEntityKind> for EntityKind {
    fn from(kind: WireEntityKind) -> Self {
        match kind {
            WireEntityKind::State => EntityKind::State,
            WireEntityKind::County => EntityKind::County,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct WireYear {
    #[serde(default)]
    year: Option<u16>,
    #[serde(default, alias = "totalPopulation")]
    total_population: Option<f64>,
    #[serde(default, alias = "femalePopulation")]
    female_population: Option<f64>,
    #[serde(default, alias = "medianGrossRent")]
    median_gross_rent: Option<f64>,
    #[serde(default, alias = "medianHouseholdIncome")]
    median_household_income: Option<f64>,
    #[serde(default, alias = "maleBachelors25Plus")]
    male_bachelors_25_plus: Option<f64>,
    #[serde(default, alias = "femaleBachelors25Plus")]
    female_bachelors_25_plus: Option<f64>,
}

impl WireYear {
    fn into_year(self, year: u16) -> DemographicYear {
        DemographicYear {
            year,
            total_population: self.total_population.map(count),
            female_population: self.female_population.map(count),
            median_gross_rent: self.median_gross_rent,
            median_household_income: self.median_household_income,
            male_bachelors_25_plus: self.male_bachelors_25_plus.map(count),
            female_bachelors_25_plus: self.female_bachelors_25_plus.map(count),
        }
    }
}

/// Years arrive either as a list of entries or keyed by year.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireYears {
    List(Vec<WireYear>),
    Keyed(BTreeMap<String, WireYear>),
}

impl Default for WireYears {
    fn default() -> Self {
        WireYears::List(Vec::new())
    }
}

impl WireYears {
    fn into_years(self) -> Vec<DemographicYear> {
        match self {
            WireYears::List(entries) => entries
                .into_iter()
                .filter_map(|entry| {
                    let year = entry.year?;
                    Some(entry.into_year(year))
                })
                .collect(),
            WireYears::Keyed(entries) => entries
                .into_iter()
                .filter_map(|(key, entry)| {
                    let year = entry.year.or_else(|| key.trim().parse().ok())?;
                    Some(entry.into_year(year))
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireEntity {
    #[serde(alias = "NAME")]
    name: String,
    #[serde(default, alias = "data")]
    years: WireYears,
}

#[derive(Debug, Default, Deserialize)]
struct DemographicsEnvelope {
    #[serde(default, alias = "entityKind")]
    entity_kind: Option<WireEntityKind>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, alias = "yearSeries", alias = "year_series")]
    years: Option<WireYears>,
    #[serde(default)]
    state: Option<WireEntity>,
    #[serde(default)]
    county: Option<WireEntity>,
}

impl DemographicsEnvelope {
    fn into_record(self) -> Option<DemographicRecord> {
        if let (Some(kind), Some(name)) = (self.entity_kind, self.name) {
            let years = self.years.unwrap_or_default().into_years();
            return Some(DemographicRecord::new(kind.into(), name, years));
        }
        // A county is the more specific selection when both are present.
        if let Some(county) = self.county {
            return Some(DemographicRecord::new(
                EntityKind::County,
                county.name,
                county.years.into_years(),
            ));
        }
        self.state.map(|state| {
            DemographicRecord::new(EntityKind::State, state.name, state.years.into_years())
        })
    }
}

#[derive(Debug, Deserialize)]
struct WirePlace {
    #[serde(default)]
    id: Option<Value>,
    name: String,
    #[serde(alias = "latitude")]
    lat: f64,
    #[serde(alias = "lon", alias = "longitude")]
    lng: f64,
    #[serde(default, alias = "distanceKm", alias = "distance")]
    distance_km: f64,
    #[serde(default)]
    geometry: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct NearbyEnvelope {
    #[serde(default)]
    nearby: Vec<WirePlace>,
}

#[derive(Debug, Deserialize)]
struct WireSearchHit {
    name: String,
    #[serde(alias = "geoId", alias = "GEOID")]
    geo_id: Value,
    #[serde(default)]
    geometry: Option<Value>,
}

/// Decodes a demographics body. `null`, `{}` or an unrecognised object
/// decode to `None`.
pub(crate) fn decode_demographics(body: &[u8]) -> Result<Option<DemographicRecord>, NetworkError> {
    let envelope: Option<DemographicsEnvelope> =
        serde_json::from_slice(body).map_err(|e| NetworkError::Decode(e.to_string()))?;
    Ok(envelope.and_then(DemographicsEnvelope::into_record))
}

/// Decodes a `{ "nearby": [...] }` body.
pub(crate) fn decode_nearby(body: &[u8]) -> Result<Vec<NearbyPlace>, NetworkError> {
    let envelope: NearbyEnvelope =
        serde_json::from_slice(body).map_err(|e| NetworkError::Decode(e.to_string()))?;

    Ok(envelope
        .nearby
        .into_iter()
        .enumerate()
        .map(|(index, place)| NearbyPlace {
            id: place
                .id
                .as_ref()
                .and_then(value_to_string)
                .unwrap_or_else(|| index.to_string()),
            name: place.name,
            lat: place.lat,
            lng: place.lng,
            distance_km: place.distance_km,
            geometry: place.geometry.filter(|g| !g.is_null()),
        })
        .collect())
}

/// Decodes a search response array.
pub(crate) fn decode_search(body: &[u8]) -> Result<Vec<SearchHit>, NetworkError> {
    let hits: Vec<WireSearchHit> =
        serde_json::from_slice(body).map_err(|e| NetworkError::Decode(e.to_string()))?;

    Ok(hits
        .into_iter()
        .map(|hit| SearchHit {
            geo_id: value_to_string(&hit.geo_id).unwrap_or_default(),
            name: hit.name,
            geometry: hit.geometry.filter(|g| !g.is_null()),
        })
        .collect())
}

/// Decodes a boundary GeoJSON document.
pub(crate) fn decode_boundaries(
    kind: BoundaryKind,
    body: &[u8],
) -> Result<BoundaryDataset, NetworkError> {
    let document: Value =
        serde_json::from_slice(body).map_err(|e| NetworkError::Decode(e.to_string()))?;
    BoundaryDataset::from_geojson(kind, &document).map_err(|e| NetworkError::Decode(e.to_string()))
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn count(value: f64) -> u64 {
    value.max(0.0).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_demographics() {
        let body = br#"{
            "entity_kind": "county",
            "name": "Hughes County",
            "years": [
                { "year": 2021, "total_population": 17765, "median_gross_rent": 812.0 },
                { "year": 2019, "totalPopulation": 17617.0 }
            ]
        }"#;

        let record = decode_demographics(body).unwrap().unwrap();
        assert_eq!(record.entity_kind, EntityKind::County);
        assert_eq!(record.name, "Hughes County");
        assert_eq!(record.latest_year(), Some(2021));
        assert_eq!(record.year(2021).unwrap().total_population, Some(17765));
        assert_eq!(record.year(2021).unwrap().median_gross_rent, Some(812.0));
        assert_eq!(record.year(2019).unwrap().total_population, Some(17617));
    }

    #[test]
    fn test_legacy_state_shape_with_keyed_years() {
        let body = br#"{
            "state": {
                "name": "South Dakota",
                "years": {
                    "2020": { "totalPopulation": 886667, "femalePopulation": 440000 },
                    "2022": { "totalPopulation": 909824 }
                }
            }
        }"#;

        let record = decode_demographics(body).unwrap().unwrap();
        assert_eq!(record.entity_kind, EntityKind::State);
        assert_eq!(record.years().collect::<Vec<_>>(), vec![2020, 2022]);
        assert_eq!(record.year(2020).unwrap().female_population, Some(440000));
    }

    #[test]
    fn test_county_wins_over_state() {
        let body = br#"{ "state": { "name": "SD" }, "county": { "name": "Hughes" } }"#;
        let record = decode_demographics(body).unwrap().unwrap();
        assert_eq!(record.entity_kind, EntityKind::County);
        assert_eq!(record.name, "Hughes");
    }

    #[test]
    fn test_absent_demographics() {
        assert_eq!(decode_demographics(b"null").unwrap(), None);
        assert_eq!(decode_demographics(b"{}").unwrap(), None);
    }

    #[test]
    fn test_malformed_demographics_is_decode_error() {
        assert!(matches!(
            decode_demographics(b"not json"),
            Err(NetworkError::Decode(_))
        ));
    }

    #[test]
    fn test_nearby_places() {
        let body = br#"{
            "nearby": [
                { "id": 7, "name": "Pierre", "lat": 44.36, "lng": -100.35, "distanceKm": 12.5,
                  "geometry": { "type": "Polygon", "coordinates": [] } },
                { "name": "Fort Pierre", "lat": 44.35, "lon": -100.37, "distance_km": 13.1, "geometry": null }
            ]
        }"#;

        let places = decode_nearby(body).unwrap();
        assert_eq!(places.len(), 2);
        assert_eq!(places[0].id, "7");
        assert_eq!(places[0].distance_km, 12.5);
        assert!(places[0].has_geometry());
        assert_eq!(places[1].id, "1");
        assert_eq!(places[1].lng, -100.37);
        assert!(!places[1].has_geometry());
    }

    #[test]
    fn test_empty_nearby() {
        assert!(decode_nearby(br#"{ "nearby": [] }"#).unwrap().is_empty());
        assert!(decode_nearby(b"{}").unwrap().is_empty());
    }

    #[test]
    fn test_search_hits_accept_numeric_geo_id() {
        let body = br#"[ { "name": "Texas", "geo_id": 48 }, { "name": "Utah", "geoId": "49" } ]"#;
        let hits = decode_search(body).unwrap();
        assert_eq!(hits[0].geo_id, "48");
        assert_eq!(hits[1].geo_id, "49");
    }

    #[test]
    fn test_boundaries_must_be_feature_collection() {
        assert!(decode_boundaries(BoundaryKind::States, br#"{"type":"Point"}"#).is_err());
        let dataset = decode_boundaries(
            BoundaryKind::Counties,
            br#"{"type":"FeatureCollection","features":[]}"#,
        )
        .unwrap();
        assert_eq!(dataset.kind(), BoundaryKind::Counties);
        assert!(dataset.is_empty());
    }
}
