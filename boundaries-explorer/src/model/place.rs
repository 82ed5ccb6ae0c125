//! Selection point, search radius and nearby-place results.

use serde::Serialize;
use serde_json::Value;

use crate::geo::LngLat;

/// The most recent click location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SelectionPoint {
    pub lat: f64,
    pub lng: f64,
}

impl SelectionPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn to_lng_lat(self) -> LngLat {
        LngLat::new(self.lng, self.lat)
    }
}

impl From<LngLat> for SelectionPoint {
    fn from(position: LngLat) -> Self {
        Self {
            lat: position.lat,
            lng: position.lng,
        }
    }
}

/// Search radius in metres. Always strictly positive and finite.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct SearchRadius(f64);

impl SearchRadius {
    /// Returns `None` unless `meters` is finite and greater than zero.
    pub fn from_meters(meters: f64) -> Option<Self> {
        (meters.is_finite() && meters > 0.0).then_some(Self(meters))
    }

    #[inline]
    pub fn meters(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn kilometers(self) -> f64 {
        self.0 / 1000.0
    }
}

/// 30 km.
impl Default for SearchRadius {
    fn default() -> Self {
        Self(30_000.0)
    }
}

/// One result from a nearby-places response.
///
/// A response's list is replaced wholesale by the next one and never mutated
/// in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyPlace {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub distance_km: f64,
    /// Optional boundary polygon drawn as a fill + outline pair.
    pub geometry: Option<Value>,
}

impl NearbyPlace {
    pub fn position(&self) -> LngLat {
        LngLat::new(self.lng, self.lat)
    }

    pub fn has_geometry(&self) -> bool {
        self.geometry.is_some()
    }
}
