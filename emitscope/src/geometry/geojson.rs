//! GeoJSON decoding for region boundaries.
//!
//! Only `Polygon` and `MultiPolygon` geometries are accepted. `Feature` and
//! `FeatureCollection` wrappers are unwrapped to their first geometry, which
//! is how the admin boundary endpoint delivers them.

use serde_json::Value;

use super::types::{Coordinate, Geometry, GeometryError, Polygon, Ring};

impl Geometry {
    /// Decode a GeoJSON value into a region geometry.
    pub fn from_geojson(value: &Value) -> Result<Self, GeometryError> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| GeometryError::Malformed("missing \"type\"".to_string()))?;

        match kind {
            "FeatureCollection" => {
                let first = value
                    .get("features")
                    .and_then(Value::as_array)
                    .and_then(|features| features.first())
                    .ok_or_else(|| GeometryError::Malformed("no features".to_string()))?;
                Self::from_geojson(first)
            }
            "Feature" => {
                let geometry = value
                    .get("geometry")
                    .filter(|g| !g.is_null())
                    .ok_or_else(|| GeometryError::Malformed("feature has no geometry".to_string()))?;
                Self::from_geojson(geometry)
            }
            "Polygon" => Ok(Geometry::Polygon(decode_polygon(coordinates(value)?)?)),
            "MultiPolygon" => {
                let members = coordinates(value)?
                    .as_array()
                    .ok_or_else(|| GeometryError::Malformed("coordinates not an array".to_string()))?
                    .iter()
                    .map(decode_polygon)
                    .collect::<Result<Vec<_>, _>>()?;
                if members.is_empty() {
                    return Err(GeometryError::EmptyMultiPolygon);
                }
                Ok(Geometry::MultiPolygon(members))
            }
            other => Err(GeometryError::UnsupportedType(other.to_string())),
        }
    }
}

fn coordinates(value: &Value) -> Result<&Value, GeometryError> {
    value
        .get("coordinates")
        .ok_or_else(|| GeometryError::Malformed("missing \"coordinates\"".to_string()))
}

fn decode_polygon(value: &Value) -> Result<Polygon, GeometryError> {
    let rings = value
        .as_array()
        .ok_or_else(|| GeometryError::Malformed("polygon not an array".to_string()))?;

    let mut decoded = rings.iter().map(decode_ring);
    let outer = decoded.next().ok_or(GeometryError::MissingOuterRing)??;
    let holes = decoded.collect::<Result<Vec<_>, _>>()?;

    Ok(Polygon::new(outer, holes))
}

fn decode_ring(value: &Value) -> Result<Ring, GeometryError> {
    let positions = value
        .as_array()
        .ok_or_else(|| GeometryError::Malformed("ring not an array".to_string()))?;

    let points = positions
        .iter()
        .map(decode_position)
        .collect::<Result<Vec<_>, _>>()?;

    Ring::new(points)
}

/// Positions may carry a third (altitude) axis; only x and y are kept.
fn decode_position(value: &Value) -> Result<Coordinate, GeometryError> {
    let axes = value
        .as_array()
        .filter(|a| a.len() >= 2)
        .ok_or_else(|| GeometryError::InvalidPosition(value.to_string()))?;

    match (axes[0].as_f64(), axes[1].as_f64()) {
        (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Ok(Coordinate::new(x, y)),
        _ => Err(GeometryError::InvalidPosition(value.to_string())),
    }
}
