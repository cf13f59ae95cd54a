use crate::Vec3;

/// A ray in 3D space with origin and direction.
///
/// Also carries the per-axis reciprocal of the direction for box tests.
/// Zero components give signed infinities there.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    pub inv_direction: Vec3,
}

impl Ray {
    /// Create a new ray.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            inv_direction: direction.recip(),
        }
    }

    /// Get the origin point of the ray.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Get the direction vector of the ray.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Per-axis reciprocal of the direction.
    #[inline]
    pub fn inv_direction(&self) -> Vec3 {
        self.inv_direction
    }

    /// Per-axis sign of the direction, `true` where the component is negative.
    #[inline]
    pub fn dir_is_neg(&self) -> [bool; 3] {
        [
            self.direction.x < 0.0,
            self.direction.y < 0.0,
            self.direction.z < 0.0,
        ]
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}
