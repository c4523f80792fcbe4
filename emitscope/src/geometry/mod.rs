//! Region geometry and point containment.
//!
//! Provides the planar containment test used to restrict emission assets to
//! the footprint of an administrative region, plus the coordinate normalizer
//! that repairs axis-order mistakes in upstream point data.
//!
//! # Supported Shapes
//!
//! - **Polygon**: one outer ring plus zero or more holes
//! - **MultiPolygon**: disjoint polygons (archipelagos, exclaves)
//!
//! Containment uses ray casting over raw longitude/latitude values. That is
//! accurate enough for province- and department-sized regions; it is not a
//! geodetic test.
//!
//! # Example
//!
//! ```
//! use emitscope::geometry::{Coordinate, Geometry, Polygon, Region, Ring};
//!
//! let square = Ring::new(vec![
//!     Coordinate::new(0.0, 0.0),
//!     Coordinate::new(0.0, 10.0),
//!     Coordinate::new(10.0, 10.0),
//!     Coordinate::new(10.0, 0.0),
//! ])
//! .unwrap();
//! let region = Region::new(Geometry::Polygon(Polygon::new(square, vec![])));
//!
//! assert!(region.contains(&Coordinate::new(5.0, 5.0)));
//! assert!(!region.contains(&Coordinate::new(50.0, 50.0)));
//! ```

mod contains;
mod geojson;
mod normalize;
mod types;

pub use contains::{contains, polygon_contains, ring_contains};
pub use normalize::{normalize, normalize_oriented, Orientation};
pub use types::{BoundingBox, Coordinate, Geometry, GeometryError, Polygon, Region, Ring};
