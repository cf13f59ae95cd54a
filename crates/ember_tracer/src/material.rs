//! Material trait for surface scattering.

use crate::sampling::uniform_hemisphere;
use ember_math::Vec3;
use rand::RngCore;
use std::f32::consts::{FRAC_1_PI, PI};

/// Color type alias (linear RGB radiance or reflectance)
pub type Color = Vec3;

/// Emission below this magnitude counts as "not a light".
const EMISSION_EPSILON: f32 = 1e-5;

/// Trait for materials that describe how light interacts with surfaces.
///
/// Direction conventions: `wi` is the direction of the ray arriving at the
/// surface (pointing *towards* it), `wo` the scattered direction leaving it,
/// `n` the shading normal on the side the ray arrived from.
pub trait Material: Send + Sync {
    /// Draw an outgoing direction from the material's importance distribution.
    fn sample(&self, wi: Vec3, n: Vec3, rng: &mut dyn RngCore) -> Vec3;

    /// Solid-angle density with which [`Material::sample`] produces `wo`.
    fn pdf(&self, wi: Vec3, wo: Vec3, n: Vec3) -> f32;

    /// BRDF value for the pair of directions.
    fn eval(&self, wi: Vec3, wo: Vec3, n: Vec3) -> Color;

    /// Get emitted light from this material.
    ///
    /// Most materials return black (no emission).
    fn emission(&self) -> Color {
        Color::ZERO
    }

    fn has_emission(&self) -> bool {
        self.emission().length() > EMISSION_EPSILON
    }
}

/// Lambertian (diffuse) material, optionally emissive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lambertian {
    albedo: Color,
    emission: Color,
}

impl Lambertian {
    /// Create a new Lambertian material with the given albedo color.
    pub fn new(albedo: Color) -> Self {
        Self {
            albedo,
            emission: Color::ZERO,
        }
    }

    /// Turn the surface into a diffuse area light.
    pub fn with_emission(mut self, emission: Color) -> Self {
        self.emission = emission;
        self
    }
}

impl Material for Lambertian {
    fn sample(&self, _wi: Vec3, n: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        uniform_hemisphere(n, rng)
    }

    fn pdf(&self, _wi: Vec3, wo: Vec3, n: Vec3) -> f32 {
        if wo.dot(n) > 0.0 {
            0.5 / PI
        } else {
            0.0
        }
    }

    fn eval(&self, _wi: Vec3, wo: Vec3, n: Vec3) -> Color {
        if wo.dot(n) > 0.0 {
            self.albedo * FRAC_1_PI
        } else {
            Color::ZERO
        }
    }

    fn emission(&self) -> Color {
        self.emission
    }
}
