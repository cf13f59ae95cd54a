//! Sphere primitive for ray tracing.

use crate::primitive::HIT_RANGE;
use crate::sampling::uniform_sphere;
use crate::{AreaSample, Intersection, Material, Primitive};
use ember_math::{Aabb, Ray, Vec3};
use rand::RngCore;
use std::f32::consts::PI;
use std::sync::Arc;

/// A sphere primitive.
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32, material: Arc<dyn Material>) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let bbox = Aabb::from_points(center - rvec, center + rvec);

        Self {
            center,
            radius,
            material,
            bbox,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Nearest valid root of the ray/sphere quadratic.
    fn hit_distance(&self, ray: &Ray) -> Option<f32> {
        let oc = self.center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !HIT_RANGE.surrounds(root) {
            root = (h + sqrtd) / a;
            if !HIT_RANGE.surrounds(root) {
                return None;
            }
        }
        Some(root)
    }
}

impl Primitive for Sphere {
    fn bounds(&self) -> Aabb {
        self.bbox
    }

    fn centroid(&self) -> Vec3 {
        self.center
    }

    fn intersect(&self, ray: &Ray) -> bool {
        self.hit_distance(ray).is_some()
    }

    fn intersection(&self, ray: &Ray) -> Intersection<'_> {
        match self.hit_distance(ray) {
            Some(t) => {
                let outward_normal = (ray.at(t) - self.center) / self.radius;
                Intersection::hit(ray, t, outward_normal, self, self.material.as_ref())
            }
            None => Intersection::miss(),
        }
    }

    fn has_emit(&self) -> bool {
        self.material.has_emission()
    }

    fn area(&self) -> f32 {
        4.0 * PI * self.radius * self.radius
    }

    fn sample_area_point(&self, rng: &mut dyn RngCore) -> AreaSample {
        let dir = uniform_sphere(rng);
        AreaSample {
            point: self.center + self.radius * dir,
            normal: dir,
            emission: self.material.emission(),
            pdf: 1.0 / self.area(),
        }
    }
}
