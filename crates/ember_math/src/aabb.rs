use crate::{Interval, Ray, Vec3};

/// Axis-Aligned Bounding Box for spatial acceleration structures (BVH).
///
/// Stored as two corner points. Apart from [`Aabb::EMPTY`] the corners
/// satisfy `min <= max` on every axis.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create an AABB from two corner points, in any order.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Zero-volume box around a single point.
    pub fn from_point(p: Vec3) -> Self {
        Self { min: p, max: p }
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn union(a: &Aabb, b: &Aabb) -> Self {
        Self {
            min: a.min.min(b.min),
            max: a.max.max(b.max),
        }
    }

    /// Grow a box so it also contains `p`.
    pub fn union_point(b: &Aabb, p: Vec3) -> Self {
        Self {
            min: b.min.min(p),
            max: b.max.max(p),
        }
    }

    /// Overlap of two boxes. Disjoint boxes give an inverted (empty) result.
    pub fn intersection(a: &Aabb, b: &Aabb) -> Self {
        Self {
            min: a.min.max(b.min),
            max: a.max.min(b.max),
        }
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        Interval::new(self.min[n], self.max[n])
    }

    /// Vector from the min corner to the max corner.
    pub fn diagonal(&self) -> Vec3 {
        self.max - self.min
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        0.5 * self.min + 0.5 * self.max
    }

    pub fn surface_area(&self) -> f32 {
        let d = self.diagonal();
        2.0 * (d.x * d.y + d.x * d.z + d.y * d.z)
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    ///
    /// Ties resolve towards the later axis.
    pub fn max_extent_axis(&self) -> usize {
        let d = self.diagonal();

        if d.x > d.y && d.x > d.z {
            0
        } else if d.y > d.z {
            1
        } else {
            2
        }
    }

    /// Loose ray/box acceptance test used to prune BVH traversal.
    ///
    /// Each of the six face planes is crossed at `t = (plane - origin) * inv_dir`.
    /// The box is accepted as soon as one plane lies ahead of the ray and the
    /// crossing point falls inside the box on at least one of the two other
    /// axes. This never rejects a ray that really enters the box, but it can
    /// accept rays that pass beside it; the leaf primitives make the final call.
    ///
    /// Axes along which the ray does not move never accept: the crossing
    /// parameter is infinite there, so the perpendicular coordinates are not
    /// finite and fail every bounds check.
    pub fn intersect_p(&self, ray: &Ray, inv_dir: Vec3, dir_is_neg: [bool; 3]) -> bool {
        let origin = ray.origin;
        let dir = ray.direction;

        for axis in 0..3 {
            let (a, b) = ((axis + 1) % 3, (axis + 2) % 3);

            for plane in [self.min[axis], self.max[axis]] {
                // The plane is in front when it lies on the side the ray moves towards.
                let ahead = (plane < origin[axis]) == dir_is_neg[axis];
                if !ahead {
                    continue;
                }

                let t = (plane - origin[axis]) * inv_dir[axis];
                let pa = origin[a] + t * dir[a];
                let pb = origin[b] + t * dir[b];

                if self.axis_interval(a).contains(pa) || self.axis_interval(b).contains(pb) {
                    return true;
                }
            }
        }

        false
    }

    /// The union identity: `min = +inf`, `max = -inf` on every axis.
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}
