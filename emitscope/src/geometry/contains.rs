//! Ray-casting containment tests.

use super::types::{Coordinate, Geometry, Polygon, Ring};

/// Returns true if the point lies inside the ring.
///
/// Casts a horizontal ray from the point towards +x and counts edge
/// crossings; an odd count means inside. An edge only counts when its
/// endpoints sit strictly on opposite sides of the point's latitude, so
/// horizontal edges never produce a crossing. `f64::EPSILON` in the
/// denominator keeps the intersection finite for near-horizontal edges.
#[inline]
pub fn ring_contains(point: &Coordinate, ring: &Ring) -> bool {
    let points = ring.points();
    let (x, y) = (point.x, point.y);
    let mut inside = false;

    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (xi, yi) = (points[i].x, points[i].y);
        let (xj, yj) = (points[j].x, points[j].y);

        let crosses = (yi > y) != (yj > y)
            && x < (xj - xi) * (y - yi) / (yj - yi + f64::EPSILON) + xi;
        if crosses {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Returns true if the point is inside the outer ring and inside no hole.
#[inline]
pub fn polygon_contains(point: &Coordinate, polygon: &Polygon) -> bool {
    ring_contains(point, &polygon.outer) && !polygon.holes.iter().any(|h| ring_contains(point, h))
}

/// Returns true if the point lies inside the geometry.
#[inline]
pub fn contains(point: &Coordinate, geometry: &Geometry) -> bool {
    geometry.contains(point)
}
