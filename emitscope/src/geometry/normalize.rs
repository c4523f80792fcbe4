//! Axis-order repair for upstream coordinate pairs.
//!
//! Asset centroids usually arrive as `[lon, lat]`, but some records carry
//! `[lat, lon]`. The region's bounding box decides which reading is usable.
//! A pair that fits neither way is dropped, never guessed.

use super::types::{BoundingBox, Coordinate};

/// Which reading of a raw pair was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// The pair was used as `(x, y)`.
    AsGiven,
    /// The pair was used as `(y, x)`.
    Swapped,
}

/// Resolve a raw pair into a coordinate, or `None` if it fits neither way.
///
/// With a bounding box the accepted reading must be finite and fall within
/// the box; without one, finiteness alone decides.
pub fn normalize(raw: (f64, f64), bbox: Option<&BoundingBox>) -> Option<Coordinate> {
    normalize_oriented(raw, bbox).map(|(coordinate, _)| coordinate)
}

/// Like [`normalize`], also reporting which orientation was accepted.
pub fn normalize_oriented(
    raw: (f64, f64),
    bbox: Option<&BoundingBox>,
) -> Option<(Coordinate, Orientation)> {
    let as_given = Coordinate::new(raw.0, raw.1);
    if acceptable(&as_given, bbox) {
        return Some((as_given, Orientation::AsGiven));
    }

    let swapped = as_given.swapped();
    if acceptable(&swapped, bbox) {
        return Some((swapped, Orientation::Swapped));
    }

    None
}

fn acceptable(point: &Coordinate, bbox: Option<&BoundingBox>) -> bool {
    point.is_finite() && bbox.map_or(true, |b| b.contains(point))
}
