//! Geographic helpers
//!
//! Provides the search-radius circle used by the selection overlay and
//! point-in-polygon lookup over GeoJSON geometries.

mod polygon;
mod types;

pub use polygon::geometry_contains;
pub use types::{
    ClosedPolygon, GeoError, LngLat, KM_PER_DEGREE_LAT, KM_PER_DEGREE_LON, MAX_LAT, MAX_LON,
    MIN_LAT, MIN_LON,
};

use std::f64::consts::PI;

/// Default number of samples around a radius circle.
pub const DEFAULT_CIRCLE_POINTS: usize = 64;

/// Generates an approximate circle of `radius_km` around `center`.
///
/// The radius is converted to per-axis degree offsets using the local scale
/// at the centre latitude, then `point_count` angles are sampled evenly over
/// `[0, 2π)`. The returned ring has `point_count + 1` vertices, the last
/// repeating the first.
///
/// # Errors
///
/// Returns [`GeoError::InvalidGeometry`] when the radius is not strictly
/// positive, the centre sits on a pole or outside the valid range, or fewer
/// than three points are requested.
pub fn generate_circle(
    center: LngLat,
    radius_km: f64,
    point_count: usize,
) -> Result<ClosedPolygon, GeoError> {
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return Err(GeoError::InvalidGeometry(format!(
            "radius must be positive, got {} km",
            radius_km
        )));
    }
    if !center.lat.is_finite() || center.lat.abs() >= MAX_LAT {
        return Err(GeoError::InvalidGeometry(format!(
            "latitude {} has no usable longitude scale",
            center.lat
        )));
    }
    if !center.lng.is_finite() || !(MIN_LON..=MAX_LON).contains(&center.lng) {
        return Err(GeoError::InvalidGeometry(format!(
            "longitude {} is out of range",
            center.lng
        )));
    }
    if point_count < 3 {
        return Err(GeoError::InvalidGeometry(format!(
            "a ring needs at least 3 points, got {}",
            point_count
        )));
    }

    let dx = radius_km / (KM_PER_DEGREE_LON * (center.lat * PI / 180.0).cos());
    let dy = radius_km / KM_PER_DEGREE_LAT;

    let vertices = (0..point_count)
        .map(|i| {
            let theta = (i as f64 / point_count as f64) * 2.0 * PI;
            LngLat::new(center.lng + dx * theta.cos(), center.lat + dy * theta.sin())
        })
        .collect();

    ClosedPolygon::close(vertices)
        .ok_or_else(|| GeoError::InvalidGeometry("ring could not be closed".to_string()))
}
