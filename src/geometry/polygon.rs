//! Edges, polygons and arena size

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::vector::VectorExt;

/// Arena or box dimensions
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A directed segment between two consecutive polygon vertices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub start: DVec2,
    pub end: DVec2,
}

impl Edge {
    pub fn new(start: DVec2, end: DVec2) -> Self {
        Self { start, end }
    }

    /// Closest point on the segment, clamped to its endpoints
    pub fn closest_point(&self, point: DVec2) -> DVec2 {
        let direction = self.end - self.start;
        let length_sq = direction.length_squared();
        if length_sq == 0.0 {
            return self.start;
        }

        let offset = (point - self.start).dot(direction) / length_sq;
        if offset <= 0.0 {
            return self.start;
        }
        if offset >= 1.0 {
            return self.end;
        }
        self.start + direction * offset
    }

    #[inline]
    pub fn distance_to(&self, point: DVec2) -> f64 {
        self.closest_point(point).distance(point)
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: DVec2,
    pub max: DVec2,
}

impl Bounds {
    fn of(vertices: &[DVec2]) -> Self {
        let mut bounds = Self {
            min: DVec2::splat(f64::INFINITY),
            max: DVec2::splat(f64::NEG_INFINITY),
        };
        for vertex in vertices {
            bounds.min = bounds.min.min(*vertex);
            bounds.max = bounds.max.max(*vertex);
        }
        bounds
    }

    #[inline]
    pub fn contains(&self, point: DVec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }
}

/// Clockwise polygon relative to a local origin
///
/// Edges and bounds are computed once when the polygon is built; every
/// transform returns a new polygon instead of mutating this one.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<DVec2>,
    edges: Vec<Edge>,
    bounds: Bounds,
}

impl Polygon {
    pub fn new(vertices: Vec<DVec2>) -> Self {
        let edges = (0..vertices.len())
            .map(|i| Edge::new(vertices[i], vertices[(i + 1) % vertices.len()]))
            .collect();
        let bounds = Bounds::of(&vertices);
        Self {
            vertices,
            edges,
            bounds,
        }
    }

    /// Rectangle centred on the origin
    pub fn rectangle(width: f64, height: f64) -> Self {
        let half_width = width / 2.0;
        let half_height = height / 2.0;
        Self::new(vec![
            DVec2::new(-half_width, -half_height),
            DVec2::new(half_width, -half_height),
            DVec2::new(half_width, half_height),
            DVec2::new(-half_width, half_height),
        ])
    }

    #[inline]
    pub fn vertices(&self) -> &[DVec2] {
        &self.vertices
    }

    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[inline]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Fewer than three vertices enclose nothing
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.vertices.len() < 3
    }

    /// Rotate about the local origin
    pub fn rotate(&self, radians: f64) -> Polygon {
        Polygon::new(self.vertices.iter().map(|v| v.rotated(radians)).collect())
    }

    pub fn translate(&self, offset: DVec2) -> Polygon {
        Polygon::new(self.vertices.iter().map(|v| *v + offset).collect())
    }

    /// Even-odd ray cast to the right of `point`
    ///
    /// Points on a left or bottom edge count as inside, points on a right or
    /// top edge as outside, so two polygons sharing an edge never both claim it.
    pub fn contains(&self, point: DVec2) -> bool {
        if self.is_degenerate() || !self.bounds.contains(point) {
            return false;
        }

        let crossings = self
            .edges
            .iter()
            .filter(|edge| {
                let (start, end) = (edge.start, edge.end);
                (start.y > point.y) != (end.y > point.y)
                    && point.x < (end.x - start.x) * (point.y - start.y) / (end.y - start.y) + start.x
            })
            .count();

        crossings % 2 == 1
    }

    /// True if any vertex of `other` lies inside this polygon
    ///
    /// This is vertex containment only: two shapes crossing like a plus sign,
    /// with no vertex inside the other, are reported as not intersecting.
    pub fn intersects(&self, other: &Polygon) -> bool {
        other.vertices.iter().any(|vertex| self.contains(*vertex))
    }
}
