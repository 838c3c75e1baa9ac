//! Static 2D geometry
//!
//! Vectors are `glam::DVec2`; polygons keep their vertices clockwise around a
//! local origin and memoize their edge list and bounding box on construction.

pub mod polygon;
pub mod vector;

pub use polygon::{Bounds, Edge, Polygon, Size};
pub use vector::{Vector2, VectorExt};
