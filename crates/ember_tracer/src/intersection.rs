//! Per-query intersection record.

use crate::{Color, Material, Primitive};
use ember_math::{Ray, Vec3};

/// Result of a ray query against a primitive, a BVH or a scene.
///
/// A miss is not an error: it is the record with `happened == false` and an
/// infinite `distance`, so "closest of two results" never needs special cases.
#[derive(Clone, Copy)]
pub struct Intersection<'a> {
    /// Whether anything was hit at all
    pub happened: bool,
    /// Point of intersection
    pub point: Vec3,
    /// Surface normal at the hit, facing against the incoming ray
    pub normal: Vec3,
    /// Emitted radiance of the hit surface
    pub emission: Color,
    /// Ray parameter of the hit (Euclidean distance for unit-length directions)
    pub distance: f32,
    /// Whether the ray hit the outward-facing side of the surface
    pub front_face: bool,
    /// The primitive that was hit
    pub primitive: Option<&'a dyn Primitive>,
    /// Material at the intersection point
    pub material: Option<&'a dyn Material>,
}

impl<'a> Intersection<'a> {
    /// The "no hit" sentinel.
    pub const fn miss() -> Self {
        Self {
            happened: false,
            point: Vec3::ZERO,
            normal: Vec3::ZERO,
            emission: Color::ZERO,
            distance: f32::INFINITY,
            front_face: false,
            primitive: None,
            material: None,
        }
    }

    /// Build a hit record.
    ///
    /// The stored normal is flipped to face against `ray`, and `front_face`
    /// remembers whether that was necessary.
    pub fn hit(
        ray: &Ray,
        distance: f32,
        outward_normal: Vec3,
        primitive: &'a dyn Primitive,
        material: &'a dyn Material,
    ) -> Self {
        let mut isect = Self {
            happened: true,
            point: ray.at(distance),
            normal: outward_normal,
            emission: material.emission(),
            distance,
            front_face: true,
            primitive: Some(primitive),
            material: Some(material),
        };
        isect.set_face_normal(ray, outward_normal);
        isect
    }

    /// Set the face normal based on ray direction and outward normal.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        // If the ray and normal point in the same direction, we're inside
        self.front_face = ray.direction().dot(outward_normal) < 0.0;

        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }

    /// True when the hit surface is a light source.
    pub fn is_emissive(&self) -> bool {
        self.happened && self.material.is_some_and(|m| m.has_emission())
    }

    /// The closer of two results. Misses never win over hits.
    pub fn closest(a: Self, b: Self) -> Self {
        match (a.happened, b.happened) {
            (true, true) => {
                if a.distance < b.distance {
                    a
                } else {
                    b
                }
            }
            (true, false) => a,
            (false, true) => b,
            (false, false) => Self::miss(),
        }
    }
}

impl Default for Intersection<'_> {
    fn default() -> Self {
        Self::miss()
    }
}

impl std::fmt::Debug for Intersection<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Intersection")
            .field("happened", &self.happened)
            .field("point", &self.point)
            .field("normal", &self.normal)
            .field("emission", &self.emission)
            .field("distance", &self.distance)
            .field("front_face", &self.front_face)
            .finish_non_exhaustive()
    }
}
