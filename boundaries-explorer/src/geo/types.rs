//! Geographic type definitions

use std::fmt;

use serde_json::{json, Value};
use thiserror::Error;

/// Valid latitude range (exclusive at the poles for circle generation)
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Kilometres per degree of longitude at the equator.
pub const KM_PER_DEGREE_LON: f64 = 111.320;

/// Kilometres per degree of latitude.
pub const KM_PER_DEGREE_LAT: f64 = 110.574;

/// A geographic position in longitude/latitude order, as GeoJSON stores it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LngLat {
    /// Longitude in degrees (-180.0 to 180.0)
    pub lng: f64,
    /// Latitude in degrees (-90.0 to 90.0)
    pub lat: f64,
}

impl LngLat {
    /// Creates a position from longitude and latitude.
    #[inline]
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Returns the position as a GeoJSON `[lng, lat]` pair.
    pub fn to_json(self) -> Value {
        json!([self.lng, self.lat])
    }
}

impl fmt::Display for LngLat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lng, self.lat)
    }
}

/// A closed linear ring: the last vertex repeats the first.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedPolygon {
    ring: Vec<LngLat>,
}

impl ClosedPolygon {
    /// Closes `vertices` into a ring by repeating the first vertex.
    ///
    /// Returns `None` when fewer than three vertices are given.
    pub fn close(mut vertices: Vec<LngLat>) -> Option<Self> {
        if vertices.len() < 3 {
            return None;
        }
        let first = vertices[0];
        vertices.push(first);
        Some(Self { ring: vertices })
    }

    /// All vertices including the closing one.
    pub fn vertices(&self) -> &[LngLat] {
        &self.ring
    }

    /// Number of vertices including the closing one.
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Always false: a ring has at least four vertices.
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// GeoJSON `Polygon` geometry for this ring.
    pub fn to_geometry(&self) -> Value {
        let coordinates: Vec<Value> = self.ring.iter().map(|p| p.to_json()).collect();
        json!({
            "type": "Polygon",
            "coordinates": [coordinates],
        })
    }

    /// GeoJSON `Feature` wrapping this ring, ready to hand to a rendering surface.
    pub fn to_feature(&self) -> Value {
        json!({
            "type": "Feature",
            "geometry": self.to_geometry(),
            "properties": {},
        })
    }
}

/// Errors produced by geometry helpers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    /// The input cannot describe a usable polygon.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
}
