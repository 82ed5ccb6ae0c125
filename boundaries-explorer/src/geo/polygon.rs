//! Point-in-polygon lookup over GeoJSON geometry values.

use serde_json::Value;

use super::types::LngLat;

/// Returns true if `point` lies inside a GeoJSON `Polygon` or `MultiPolygon`.
///
/// Holes are honoured: a point inside an inner ring is outside the polygon.
/// Any other geometry type, or malformed coordinates, yields `false`.
pub fn geometry_contains(geometry: &Value, point: LngLat) -> bool {
    let coordinates = &geometry["coordinates"];
    match geometry["type"].as_str() {
        Some("Polygon") => polygon_contains(coordinates, point),
        Some("MultiPolygon") => coordinates
            .as_array()
            .map(|polygons| polygons.iter().any(|p| polygon_contains(p, point)))
            .unwrap_or(false),
        _ => false,
    }
}

fn polygon_contains(rings: &Value, point: LngLat) -> bool {
    let Some(rings) = rings.as_array() else {
        return false;
    };
    let Some((outer, holes)) = rings.split_first() else {
        return false;
    };
    ring_contains(outer, point) && !holes.iter().any(|hole| ring_contains(hole, point))
}

/// Even-odd ray cast toward +longitude.
fn ring_contains(ring: &Value, point: LngLat) -> bool {
    let Some(vertices) = ring.as_array() else {
        return false;
    };
    let vertices: Vec<(f64, f64)> = vertices.iter().filter_map(position).collect();
    if vertices.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (xi, yi) = vertices[i];
        let (xj, yj) = vertices[j];
        if (yi > point.lat) != (yj > point.lat) {
            let crossing = (xj - xi) * (point.lat - yi) / (yj - yi) + xi;
            if point.lng < crossing {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

fn position(value: &Value) -> Option<(f64, f64)> {
    let pair = value.as_array()?;
    Some((pair.first()?.as_f64()?, pair.get(1)?.as_f64()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn square(min: f64, max: f64) -> Value {
        json!([[min, min], [max, min], [max, max], [min, max], [min, min]])
    }

    #[test]
    fn test_point_inside_polygon() {
        let geometry = json!({ "type": "Polygon", "coordinates": [square(0.0, 10.0)] });
        assert!(geometry_contains(&geometry, LngLat::new(5.0, 5.0)));
    }

    #[test]
    fn test_point_outside_polygon() {
        let geometry = json!({ "type": "Polygon", "coordinates": [square(0.0, 10.0)] });
        assert!(!geometry_contains(&geometry, LngLat::new(15.0, 5.0)));
    }

    #[test]
    fn test_point_in_hole_is_outside() {
        let geometry = json!({
            "type": "Polygon",
            "coordinates": [square(0.0, 10.0), square(4.0, 6.0)],
        });
        assert!(!geometry_contains(&geometry, LngLat::new(5.0, 5.0)));
        assert!(geometry_contains(&geometry, LngLat::new(2.0, 2.0)));
    }

    #[test]
    fn test_multipolygon_matches_any_member() {
        let geometry = json!({
            "type": "MultiPolygon",
            "coordinates": [[square(0.0, 1.0)], [square(20.0, 21.0)]],
        });
        assert!(geometry_contains(&geometry, LngLat::new(20.5, 20.5)));
        assert!(!geometry_contains(&geometry, LngLat::new(10.0, 10.0)));
    }

    #[test]
    fn test_unsupported_geometry_is_never_hit() {
        let geometry = json!({ "type": "Point", "coordinates": [0.0, 0.0] });
        assert!(!geometry_contains(&geometry, LngLat::new(0.0, 0.0)));
        assert!(!geometry_contains(&Value::Null, LngLat::new(0.0, 0.0)));
    }
}
