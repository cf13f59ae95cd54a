//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use crate::primitive::HIT_RANGE;
use crate::sampling::gen_f32;
use crate::{AreaSample, Intersection, Material, Primitive};
use ember_math::{Aabb, Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// A triangle primitive.
pub struct Triangle {
    /// Vertices
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    /// Edges v1 - v0 and v2 - v0
    e1: Vec3,
    e2: Vec3,
    /// Face normal (unit length), oriented by the winding v0 -> v1 -> v2
    normal: Vec3,
    area: f32,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: Arc<dyn Material>) -> Self {
        let e1 = v1 - v0;
        let e2 = v2 - v0;
        let cross = e1.cross(e2);

        Self {
            v0,
            v1,
            v2,
            e1,
            e2,
            normal: cross.normalize_or_zero(),
            area: 0.5 * cross.length(),
            material,
            bbox: Aabb::union_point(&Aabb::from_points(v0, v1), v2),
        }
    }

    /// Ray parameter of the hit, if any.
    fn hit_distance(&self, ray: &Ray) -> Option<f32> {
        let h = ray.direction().cross(self.e2);
        let a = self.e1.dot(h);

        // Ray is parallel to triangle
        if a.abs() < 1e-8 {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin() - self.v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(self.e1);
        let v = f * ray.direction().dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * self.e2.dot(q);
        HIT_RANGE.surrounds(t).then_some(t)
    }
}

impl Primitive for Triangle {
    fn bounds(&self) -> Aabb {
        self.bbox
    }

    fn intersect(&self, ray: &Ray) -> bool {
        self.hit_distance(ray).is_some()
    }

    fn intersection(&self, ray: &Ray) -> Intersection<'_> {
        match self.hit_distance(ray) {
            Some(t) => Intersection::hit(ray, t, self.normal, self, self.material.as_ref()),
            None => Intersection::miss(),
        }
    }

    fn has_emit(&self) -> bool {
        self.material.has_emission()
    }

    fn area(&self) -> f32 {
        self.area
    }

    fn sample_area_point(&self, rng: &mut dyn RngCore) -> AreaSample {
        // Square-root warp gives uniform barycentrics
        let x = gen_f32(rng).sqrt();
        let y = gen_f32(rng);
        let point = self.v0 * (1.0 - x) + self.v1 * (x * (1.0 - y)) + self.v2 * (x * y);

        AreaSample {
            point,
            normal: self.normal,
            emission: self.material.emission(),
            pdf: 1.0 / self.area,
        }
    }
}
