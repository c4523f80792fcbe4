//! Geometry value types.

use serde::Serialize;
use thiserror::Error;

use super::contains::polygon_contains;

/// Minimum number of positions in a ring.
pub const MIN_RING_POSITIONS: usize = 3;

/// Errors raised while building region geometry.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    /// A ring has fewer than three positions.
    #[error("Ring has {0} positions (minimum {MIN_RING_POSITIONS})")]
    DegenerateRing(usize),

    /// A position has fewer than two axes or a non-finite value.
    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    /// A polygon has no outer ring.
    #[error("Polygon has no outer ring")]
    MissingOuterRing,

    /// A multi-polygon has no members.
    #[error("MultiPolygon has no polygons")]
    EmptyMultiPolygon,

    /// The GeoJSON geometry type is not a polygon or multi-polygon.
    #[error("Unsupported geometry type: {0}")]
    UnsupportedType(String),

    /// The GeoJSON document could not be read.
    #[error("Malformed GeoJSON: {0}")]
    Malformed(String),
}

/// A planar point: `x` is longitude, `y` is latitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    /// Create a coordinate from longitude (`x`) and latitude (`y`).
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Longitude in degrees.
    pub fn lon(&self) -> f64 {
        self.x
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.y
    }

    /// Returns true if both axes are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// The same point with its axes exchanged.
    pub fn swapped(&self) -> Self {
        Self::new(self.y, self.x)
    }
}

/// A closed loop of positions. The closing edge (last → first) is implicit.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    points: Vec<Coordinate>,
}

impl Ring {
    /// Create a ring, rejecting loops with fewer than three positions.
    pub fn new(points: Vec<Coordinate>) -> Result<Self, GeometryError> {
        if points.len() < MIN_RING_POSITIONS {
            return Err(GeometryError::DegenerateRing(points.len()));
        }
        Ok(Self { points })
    }

    /// Positions in ring order.
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }
}

/// One outer ring plus zero or more holes.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub outer: Ring,
    pub holes: Vec<Ring>,
}

impl Polygon {
    pub fn new(outer: Ring, holes: Vec<Ring>) -> Self {
        Self { outer, holes }
    }
}

/// Region boundary: a single polygon or a set of disjoint polygons.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Polygon(Polygon),
    MultiPolygon(Vec<Polygon>),
}

impl Geometry {
    /// Returns true if the point lies inside this geometry.
    ///
    /// A multi-polygon contains the point if any member polygon does.
    pub fn contains(&self, point: &Coordinate) -> bool {
        match self {
            Geometry::Polygon(polygon) => polygon_contains(point, polygon),
            Geometry::MultiPolygon(polygons) => {
                polygons.iter().any(|polygon| polygon_contains(point, polygon))
            }
        }
    }

    /// Iterate over the constituent polygons.
    pub fn polygons(&self) -> impl Iterator<Item = &Polygon> {
        match self {
            Geometry::Polygon(polygon) => std::slice::from_ref(polygon).iter(),
            Geometry::MultiPolygon(polygons) => polygons.iter(),
        }
    }

    /// Total vertex count across all rings.
    pub fn vertex_count(&self) -> usize {
        self.polygons()
            .map(|p| {
                p.outer.points().len() + p.holes.iter().map(|h| h.points().len()).sum::<usize>()
            })
            .sum()
    }
}

/// Axis-aligned bounds of a geometry.
///
/// Used only as a pre-filter and as the axis-order oracle for the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Compute the bounds of every outer ring in the geometry.
    ///
    /// Holes lie inside their outer ring and cannot widen the bounds.
    pub fn from_geometry(geometry: &Geometry) -> Self {
        let mut bbox = Self::new(
            f64::INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::NEG_INFINITY,
        );
        for polygon in geometry.polygons() {
            for point in polygon.outer.points() {
                bbox.min_x = bbox.min_x.min(point.x);
                bbox.min_y = bbox.min_y.min(point.y);
                bbox.max_x = bbox.max_x.max(point.x);
                bbox.max_y = bbox.max_y.max(point.y);
            }
        }
        bbox
    }

    /// Inclusive bounds check.
    pub fn contains(&self, point: &Coordinate) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }
}

/// A geometry paired with its precomputed bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    geometry: Geometry,
    bbox: BoundingBox,
}

impl Region {
    /// Wrap a geometry, computing its bounding box once.
    pub fn new(geometry: Geometry) -> Self {
        let bbox = BoundingBox::from_geometry(&geometry);
        Self { geometry, bbox }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    /// Bounding-box pre-filter followed by the exact containment test.
    pub fn contains(&self, point: &Coordinate) -> bool {
        self.bbox.contains(point) && self.geometry.contains(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(points: &[(f64, f64)]) -> Ring {
        Ring::new(points.iter().map(|&(x, y)| Coordinate::new(x, y)).collect()).unwrap()
    }

    #[test]
    fn test_ring_rejects_two_points() {
        let result = Ring::new(vec![Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0)]);
        assert_eq!(result.unwrap_err(), GeometryError::DegenerateRing(2));
    }

    #[test]
    fn test_bbox_from_multipolygon() {
        let a = Polygon::new(ring(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]), vec![]);
        let b = Polygon::new(
            ring(&[(100.0, -5.0), (100.0, -4.0), (101.0, -4.0), (101.0, -5.0)]),
            vec![],
        );
        let bbox = BoundingBox::from_geometry(&Geometry::MultiPolygon(vec![a, b]));

        assert_eq!(bbox, BoundingBox::new(0.0, -5.0, 101.0, 1.0));
    }

    #[test]
    fn test_bbox_contains_is_inclusive() {
        let bbox = BoundingBox::new(-56.0, -28.2, -53.6, -25.5);
        assert!(bbox.contains(&Coordinate::new(-56.0, -25.5)));
        assert!(bbox.contains(&Coordinate::new(-55.0, -27.0)));
        assert!(!bbox.contains(&Coordinate::new(-27.0, -55.0)));
    }

    #[test]
    fn test_vertex_count() {
        let polygon = Polygon::new(
            ring(&[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0)]),
            vec![ring(&[(4.0, 4.0), (4.0, 6.0), (6.0, 6.0)])],
        );
        assert_eq!(Geometry::Polygon(polygon).vertex_count(), 7);
    }

    #[test]
    fn test_coordinate_swapped() {
        let c = Coordinate::new(-55.9, -27.4);
        assert_eq!(c.swapped(), Coordinate::new(-27.4, -55.9));
        assert_eq!(c.lon(), -55.9);
        assert_eq!(c.lat(), -27.4);
    }
}
