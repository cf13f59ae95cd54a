//! Unbiased path tracing with next-event estimation.
//!
//! Every non-emissive hit gathers light two ways:
//! - direct: one point sampled on the emitters (by area) and a shadow ray
//! - indirect: one bounce sampled from the material, continued with
//!   Russian roulette probability and reweighted by it
//!
//! Emitters radiate from both sides. Bounces that land on an emitter add
//! nothing to the indirect term; the direct term covers them.

use crate::sampling::gen_f32;
use crate::{AreaSample, Color, Intersection, Material, Scene};
use ember_math::{Ray, Vec3};
use rand::RngCore;

/// Distance secondary rays are pushed off the surface along the normal.
pub const RAY_EPSILON: f32 = 1e-4;

/// Densities at or below this contribute nothing.
pub const PDF_EPSILON: f32 = 1e-10;

/// Relative tolerance for a shadow ray to count as reaching its light point.
pub const SHADOW_EPSILON: f32 = 1e-3;

/// Origin for a ray leaving `p` in direction `dir`, moved to the side of the
/// surface the ray travels into.
fn offset_origin(p: Vec3, n: Vec3, dir: Vec3) -> Vec3 {
    if dir.dot(n) > 0.0 {
        p + n * RAY_EPSILON
    } else {
        p - n * RAY_EPSILON
    }
}

impl Scene {
    /// Estimate the radiance arriving along `ray`.
    ///
    /// `depth` counts bounces from the camera; anything deeper than the
    /// scene's `max_depth` is black. Escaping rays see the background.
    pub fn cast_ray(&self, ray: &Ray, depth: u32, rng: &mut dyn RngCore) -> Color {
        if depth > self.max_depth {
            return Color::ZERO;
        }
        self.shade(ray, &self.intersect(ray), depth, rng)
    }

    /// Radiance leaving `hit` back along `ray`.
    fn shade(&self, ray: &Ray, hit: &Intersection<'_>, depth: u32, rng: &mut dyn RngCore) -> Color {
        if !hit.happened {
            return self.background;
        }
        if hit.is_emissive() {
            return hit.emission;
        }
        let Some(material) = hit.material else {
            return Color::ZERO;
        };

        let wi = ray.direction();
        let (p, n) = (hit.point, hit.normal);

        let direct = match self.sample_light(rng) {
            Some(light) => self.direct_light(material, wi, p, n, &light),
            None => Color::ZERO,
        };

        let mut indirect = Color::ZERO;
        let rr = self.russian_roulette;
        if gen_f32(rng) < rr {
            let wo = material.sample(wi, n, rng).normalize();
            let pdf = material.pdf(wi, wo, n);

            if pdf > PDF_EPSILON {
                let bounce = Ray::new(offset_origin(p, n, wo), wo);
                let next = self.intersect(&bounce);
                if !next.is_emissive() && depth < self.max_depth {
                    let f = material.eval(wi, wo, n);
                    let cos_theta = wo.dot(n).max(0.0);
                    indirect = self.shade(&bounce, &next, depth + 1, rng) * f * cos_theta / (pdf * rr);
                }
            }
        }

        direct + indirect
    }

    /// Contribution of one sampled light point to the shading point `p`.
    fn direct_light(
        &self,
        material: &dyn Material,
        wi: Vec3,
        p: Vec3,
        n: Vec3,
        light: &AreaSample,
    ) -> Color {
        let to_light = light.point - p;
        let dist_sq = to_light.length_squared();
        let dist = dist_sq.sqrt();
        if dist <= 0.0 {
            return Color::ZERO;
        }

        let ws = to_light / dist;
        let cos_theta = ws.dot(n);
        let cos_light = (-ws).dot(light.normal).abs();
        if cos_theta <= 0.0 || cos_light <= 0.0 || light.pdf <= PDF_EPSILON {
            return Color::ZERO;
        }

        let shadow_ray = Ray::new(offset_origin(p, n, ws), ws);
        let blocker = self.intersect(&shadow_ray);
        let unoccluded =
            blocker.happened && (blocker.point - light.point).length() <= SHADOW_EPSILON * (1.0 + dist);
        if !unoccluded {
            return Color::ZERO;
        }

        let f = material.eval(wi, ws, n);
        light.emission * f * cos_theta * cos_light / (dist_sq * light.pdf)
    }
}
