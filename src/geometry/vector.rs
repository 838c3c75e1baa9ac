//! Vector helpers on top of `glam::DVec2`

use glam::DVec2;

/// World-space point or direction
pub type Vector2 = DVec2;

/// Rotation and clamping with the conventions used by the flight model
pub trait VectorExt {
    /// Rotate about the origin by `radians`
    fn rotated(self, radians: f64) -> Self;

    /// Rotate about `origin` by `radians`
    fn rotated_around(self, origin: Self, radians: f64) -> Self;

    /// Limit the magnitude to `max_length`, keeping the direction
    fn clamped(self, max_length: f64) -> Self;
}

impl VectorExt for DVec2 {
    #[inline]
    fn rotated(self, radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        DVec2::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    #[inline]
    fn rotated_around(self, origin: Self, radians: f64) -> Self {
        (self - origin).rotated(radians) + origin
    }

    fn clamped(self, max_length: f64) -> Self {
        let magnitude = self.length();
        if magnitude == 0.0 {
            return self;
        }
        if magnitude > max_length {
            return self * (max_length / magnitude);
        }
        self
    }
}
