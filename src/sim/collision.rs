//! Colliders and the pairwise collision matrix
//!
//! A collider is the shape an entity uses for contact tests, positioned and
//! rotated in world space. Each unordered pair of collider kinds is tested by
//! exactly one function, so `a.collides_with(b) == b.collides_with(a)`.

use glam::DVec2;

use crate::geometry::{Polygon, Size};

/// Circle around `position`; circles have no rotation
#[derive(Debug, Clone, PartialEq)]
pub struct CircleCollider {
    pub enabled: bool,
    pub position: DVec2,
    pub radius: f64,
}

impl CircleCollider {
    pub fn new(position: DVec2, radius: f64) -> Self {
        Self {
            enabled: true,
            position,
            radius,
        }
    }
}

/// Oriented rectangle centred on `position`
#[derive(Debug, Clone, PartialEq)]
pub struct SquareCollider {
    pub enabled: bool,
    pub position: DVec2,
    /// Rotation in radians
    pub rotation: f64,
    pub size: Size,
}

impl SquareCollider {
    pub fn new(position: DVec2, rotation: f64, size: Size) -> Self {
        Self {
            enabled: true,
            position,
            rotation,
            size,
        }
    }

    #[inline]
    pub fn is_rotated(&self) -> bool {
        self.rotation != 0.0
    }

    /// Rectangle in local space with the rotation applied
    pub fn polygon(&self) -> Polygon {
        let polygon = Polygon::rectangle(self.size.width, self.size.height);
        if self.is_rotated() {
            return polygon.rotate(self.rotation);
        }
        polygon
    }

    /// Rectangle in world space
    pub fn absolute(&self) -> Polygon {
        self.polygon().translate(self.position)
    }
}

/// Arbitrary clockwise polygon placed at `position`
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonCollider {
    pub enabled: bool,
    pub position: DVec2,
    /// Rotation in radians
    pub rotation: f64,
    /// Vertices relative to `position`
    pub polygon: Polygon,
}

impl PolygonCollider {
    pub fn new(position: DVec2, rotation: f64, polygon: Polygon) -> Self {
        Self {
            enabled: true,
            position,
            rotation,
            polygon,
        }
    }

    #[inline]
    pub fn is_rotated(&self) -> bool {
        self.rotation != 0.0
    }

    /// Rotate, then translate into world space
    pub fn absolute(&self) -> Polygon {
        if self.is_rotated() {
            return self.polygon.rotate(self.rotation).translate(self.position);
        }
        self.polygon.translate(self.position)
    }
}

/// Collision shape attached to an entity
#[derive(Debug, Clone, PartialEq)]
pub enum Collider {
    Circle(CircleCollider),
    Square(SquareCollider),
    Polygon(PolygonCollider),
}

impl Collider {
    pub fn circle(position: DVec2, radius: f64) -> Self {
        Self::Circle(CircleCollider::new(position, radius))
    }

    pub fn square(position: DVec2, rotation: f64, size: Size) -> Self {
        Self::Square(SquareCollider::new(position, rotation, size))
    }

    pub fn polygon(position: DVec2, rotation: f64, polygon: Polygon) -> Self {
        Self::Polygon(PolygonCollider::new(position, rotation, polygon))
    }

    pub fn enabled(&self) -> bool {
        match self {
            Self::Circle(c) => c.enabled,
            Self::Square(s) => s.enabled,
            Self::Polygon(p) => p.enabled,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        match self {
            Self::Circle(c) => c.enabled = enabled,
            Self::Square(s) => s.enabled = enabled,
            Self::Polygon(p) => p.enabled = enabled,
        }
    }

    pub fn position(&self) -> DVec2 {
        match self {
            Self::Circle(c) => c.position,
            Self::Square(s) => s.position,
            Self::Polygon(p) => p.position,
        }
    }

    pub fn set_position(&mut self, position: DVec2) {
        match self {
            Self::Circle(c) => c.position = position,
            Self::Square(s) => s.position = position,
            Self::Polygon(p) => p.position = position,
        }
    }

    pub fn rotation(&self) -> f64 {
        match self {
            Self::Circle(_) => 0.0,
            Self::Square(s) => s.rotation,
            Self::Polygon(p) => p.rotation,
        }
    }

    /// Ignored for circles
    pub fn set_rotation(&mut self, rotation: f64) {
        match self {
            Self::Circle(_) => {}
            Self::Square(s) => s.rotation = rotation,
            Self::Polygon(p) => p.rotation = rotation,
        }
    }

    /// Pairwise contact test; the result does not depend on argument order
    pub fn collides_with(&self, other: &Collider) -> bool {
        use Collider::*;

        match (self, other) {
            (Circle(a), Circle(b)) => circle_with_circle(a, b),
            (Square(a), Square(b)) => square_with_square(a, b),
            (Polygon(a), Polygon(b)) => overlap(&a.absolute(), &b.absolute()),
            (Square(square), Circle(circle)) | (Circle(circle), Square(square)) => {
                edges_within_radius(&square.absolute(), circle)
            }
            (Polygon(polygon), Circle(circle)) | (Circle(circle), Polygon(polygon)) => {
                edges_within_radius(&polygon.absolute(), circle)
            }
            (Square(square), Polygon(polygon)) | (Polygon(polygon), Square(square)) => {
                overlap(&square.absolute(), &polygon.absolute())
            }
        }
    }
}

fn circle_with_circle(a: &CircleCollider, b: &CircleCollider) -> bool {
    a.position.distance(b.position) <= a.radius + b.radius
}

fn square_with_square(a: &SquareCollider, b: &SquareCollider) -> bool {
    if a.is_rotated() || b.is_rotated() {
        return overlap(&a.absolute(), &b.absolute());
    }

    // Half-extent interval test; touching edges do not collide
    let half_a = DVec2::new(a.size.width, a.size.height) / 2.0;
    let half_b = DVec2::new(b.size.width, b.size.height) / 2.0;
    !(a.position.x + half_a.x <= b.position.x - half_b.x
        || a.position.x - half_a.x >= b.position.x + half_b.x
        || a.position.y + half_a.y <= b.position.y - half_b.y
        || a.position.y - half_a.y >= b.position.y + half_b.y)
}

/// Circle touches the outline when any edge passes within its radius
fn edges_within_radius(outline: &Polygon, circle: &CircleCollider) -> bool {
    outline
        .edges()
        .iter()
        .any(|edge| edge.distance_to(circle.position) <= circle.radius)
}

/// Vertex containment checked from both sides
fn overlap(a: &Polygon, b: &Polygon) -> bool {
    a.intersects(b) || b.intersects(a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn unit_square() -> Polygon {
        Polygon::rectangle(2.0, 2.0)
    }

    fn assert_symmetric(a: &Collider, b: &Collider, expected: bool) {
        assert_eq!(a.collides_with(b), expected, "{a:?} vs {b:?}");
        assert_eq!(b.collides_with(a), expected, "{b:?} vs {a:?}");
    }

    #[test]
    fn test_circle_with_circle_inclusive() {
        let a = Collider::circle(DVec2::ZERO, 1.0);
        assert_symmetric(&a, &Collider::circle(DVec2::new(3.0, 0.0), 2.0), true);
        assert_symmetric(&a, &Collider::circle(DVec2::new(3.0 + 1e-9, 0.0), 2.0), false);
        assert_symmetric(&a, &Collider::circle(DVec2::new(0.5, 0.5), 0.1), true);
    }

    #[test]
    fn test_square_with_square_axis_aligned() {
        let size = Size::new(2.0, 2.0);
        let a = Collider::square(DVec2::ZERO, 0.0, size);
        assert_symmetric(&a, &Collider::square(DVec2::new(1.0, 1.0), 0.0, size), true);
        // Touching edges are not a collision
        assert_symmetric(&a, &Collider::square(DVec2::new(2.0, 0.0), 0.0, size), false);
        assert_symmetric(&a, &Collider::square(DVec2::new(0.0, -2.0), 0.0, size), false);
        assert_symmetric(&a, &Collider::square(DVec2::new(5.0, 5.0), 0.0, size), false);
    }

    #[test]
    fn test_square_with_square_rotated() {
        let size = Size::new(2.0, 2.0);
        let a = Collider::square(DVec2::ZERO, 0.0, size);
        assert_symmetric(&a, &Collider::square(DVec2::new(1.5, 0.0), PI / 4.0, size), true);
        assert_symmetric(&a, &Collider::square(DVec2::new(2.5, 0.0), PI / 4.0, size), false);
    }

    #[test]
    fn test_square_with_circle() {
        let square = Collider::square(DVec2::ZERO, 0.0, Size::new(2.0, 2.0));
        assert_symmetric(&square, &Collider::circle(DVec2::new(-1.5, 0.0), 1.0), true);
        assert_symmetric(&square, &Collider::circle(DVec2::new(-2.0, 0.0), 1.0), true);
        assert_symmetric(&square, &Collider::circle(DVec2::new(-2.000000001, 0.0), 1.0), false);
        assert_symmetric(&square, &Collider::circle(DVec2::new(-1.70711, -1.70711), 1.0), false);
    }

    #[test]
    fn test_polygon_with_circle() {
        let polygon = Collider::polygon(DVec2::ZERO, 0.0, unit_square());
        assert_symmetric(&polygon, &Collider::circle(DVec2::new(1e-15, 0.0), 1.0), true);
        assert_symmetric(&polygon, &Collider::circle(DVec2::new(-1.0, 0.0), 1.0), true);
        assert_symmetric(&polygon, &Collider::circle(DVec2::new(-1.0, -1.0), 1.0), true);
        assert_symmetric(&polygon, &Collider::circle(DVec2::new(-2.000000000000001, 0.0), 1.0), false);
        assert_symmetric(&polygon, &Collider::circle(DVec2::new(-1.70711, -1.70711), 1.0), false);
    }

    #[test]
    fn test_circle_fully_inside_outline_is_not_detected() {
        // Only edges are tested, so a small circle deep inside misses
        let polygon = Collider::polygon(DVec2::ZERO, 0.0, Polygon::rectangle(20.0, 20.0));
        assert_symmetric(&polygon, &Collider::circle(DVec2::ZERO, 1.0), false);
    }

    #[test]
    fn test_polygon_with_polygon() {
        let polygon = Collider::polygon(DVec2::ZERO, 0.0, unit_square());
        let diamond = unit_square().rotate(PI / 4.0);
        assert_symmetric(&polygon, &Collider::polygon(DVec2::ZERO, 0.0, unit_square()), true);
        assert_symmetric(&polygon, &Collider::polygon(DVec2::new(-1.0, 0.0), 0.0, diamond.clone()), true);
        assert_symmetric(&polygon, &Collider::polygon(DVec2::new(-2.82842712475, 0.0), 0.0, diamond), false);
    }

    #[test]
    fn test_polygon_rotation_applies_before_translation() {
        let bar = Polygon::rectangle(10.0, 1.0);
        let rotated = PolygonCollider::new(DVec2::new(100.0, 100.0), PI / 2.0, bar);
        let bounds = rotated.absolute().bounds();
        assert!((bounds.min.y - 95.0).abs() < 1e-9);
        assert!((bounds.max.x - 100.5).abs() < 1e-9);
    }

    #[test]
    fn test_square_with_polygon() {
        let square = Collider::square(DVec2::ZERO, 0.0, Size::new(2.0, 2.0));
        assert_symmetric(&square, &Collider::polygon(DVec2::new(1.5, 0.0), 0.0, unit_square()), true);
        assert_symmetric(&square, &Collider::polygon(DVec2::new(3.0, 0.0), 0.0, unit_square()), false);
        // A large polygon swallowing the square is caught from the other side
        let big = Polygon::rectangle(20.0, 20.0);
        assert_symmetric(&square, &Collider::polygon(DVec2::ZERO, 0.0, big), true);
    }

    #[test]
    fn test_position_and_rotation_accessors() {
        let mut circle = Collider::circle(DVec2::ZERO, 1.0);
        circle.set_rotation(1.0);
        assert_eq!(circle.rotation(), 0.0);
        circle.set_position(DVec2::new(3.0, 4.0));
        assert_eq!(circle.position(), DVec2::new(3.0, 4.0));

        let mut square = Collider::square(DVec2::ZERO, 0.0, Size::new(1.0, 1.0));
        square.set_rotation(0.5);
        assert_eq!(square.rotation(), 0.5);
        assert!(square.enabled());
        square.set_enabled(false);
        assert!(!square.enabled());
    }
}
