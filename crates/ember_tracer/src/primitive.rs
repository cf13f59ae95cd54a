//! The capability every piece of scene geometry provides.

use crate::{Color, Intersection};
use ember_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

/// Smallest ray parameter accepted as a hit.
///
/// Keeps secondary rays from immediately re-hitting the surface they start on.
pub const HIT_T_MIN: f32 = 1e-3;

/// Valid ray parameters for primitive hits.
pub(crate) const HIT_RANGE: Interval = Interval::ahead_of(HIT_T_MIN);

/// A point drawn uniformly (by area) from a primitive's surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaSample {
    pub point: Vec3,
    /// Outward geometric normal at `point`
    pub normal: Vec3,
    /// Emitted radiance at `point`
    pub emission: Color,
    /// Density of the sample with respect to surface area
    pub pdf: f32,
}

/// Trait for objects that can be stored in a BVH and hit by rays.
pub trait Primitive: Send + Sync {
    /// Get the axis-aligned bounding box of this object.
    fn bounds(&self) -> Aabb;

    /// Representative point used to sort and bucket primitives during BVH builds.
    fn centroid(&self) -> Vec3 {
        self.bounds().centroid()
    }

    /// Cheap hit/miss query.
    fn intersect(&self, ray: &Ray) -> bool {
        self.intersection(ray).happened
    }

    /// Nearest hit along `ray`, or [`Intersection::miss`].
    fn intersection(&self, ray: &Ray) -> Intersection<'_>;

    /// Whether this primitive is a light source.
    fn has_emit(&self) -> bool;

    /// Total surface area.
    fn area(&self) -> f32;

    /// Draw a point uniformly over the surface.
    fn sample_area_point(&self, rng: &mut dyn RngCore) -> AreaSample;
}
