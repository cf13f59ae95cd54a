//! Random sampling helpers shared by shapes, materials and the light sampler.

use crate::{AreaSample, Primitive};
use ember_math::Vec3;
use rand::{Rng, RngCore};
use std::f32::consts::PI;
use std::sync::Arc;

/// Uniform random number in `[0, 1)`.
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Uniform direction on the hemisphere around `n` (pdf `1 / 2π`).
pub(crate) fn uniform_hemisphere(n: Vec3, rng: &mut dyn RngCore) -> Vec3 {
    let z = gen_f32(rng);
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * gen_f32(rng);

    let (b, c) = n.any_orthonormal_pair();
    r * phi.cos() * b + r * phi.sin() * c + z * n
}

/// Uniform direction on the unit sphere (pdf `1 / 4π`).
pub(crate) fn uniform_sphere(rng: &mut dyn RngCore) -> Vec3 {
    let z = 1.0 - 2.0 * gen_f32(rng);
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * gen_f32(rng);
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Pick one primitive with probability proportional to its area and sample a
/// point on it.
///
/// The returned pdf is with respect to area over the union of all
/// `primitives`: the primitive's own area pdf times its selection
/// probability. Returns `None` when the total area is zero.
pub(crate) fn sample_by_area(
    primitives: &[Arc<dyn Primitive>],
    rng: &mut dyn RngCore,
) -> Option<AreaSample> {
    let total_area: f32 = primitives.iter().map(|p| p.area()).sum();
    if total_area <= 0.0 {
        return None;
    }

    let target = gen_f32(rng) * total_area;
    let mut running = 0.0;
    let mut chosen = None;
    for primitive in primitives {
        let area = primitive.area();
        if area <= 0.0 {
            continue;
        }
        running += area;
        chosen = Some((primitive, area));
        if target < running {
            break;
        }
    }

    // Rounding in the running sum can overshoot the last bucket; the last
    // primitive with area is kept in that case.
    let (primitive, area) = chosen?;
    let mut sample = primitive.sample_area_point(rng);
    sample.pdf *= area / total_area;
    Some(sample)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, Lambertian, Sphere};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_gen_f32_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let x = gen_f32(&mut rng);
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn test_uniform_hemisphere_stays_above_surface() {
        let mut rng = StdRng::seed_from_u64(1);
        let n = Vec3::new(1.0, 2.0, -0.5).normalize();
        for _ in 0..1000 {
            let d = uniform_hemisphere(n, &mut rng);
            assert!(d.dot(n) >= 0.0);
            assert!((d.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_uniform_sphere_mean_is_near_origin() {
        let mut rng = StdRng::seed_from_u64(3);
        let n = 20_000;
        let mean = (0..n).map(|_| uniform_sphere(&mut rng)).sum::<Vec3>() / n as f32;
        assert!(mean.length() < 0.03, "mean = {mean:?}");
    }

    #[test]
    fn test_sample_by_area_is_proportional() {
        let material = Arc::new(Lambertian::new(Color::ONE).with_emission(Color::ONE));
        // Areas 4π and 16π: the second sphere should be picked 80% of the time.
        let small: Arc<dyn Primitive> = Arc::new(Sphere::new(Vec3::ZERO, 1.0, material.clone()));
        let large: Arc<dyn Primitive> =
            Arc::new(Sphere::new(Vec3::new(10.0, 0.0, 0.0), 2.0, material));
        let primitives = vec![small, large];

        let mut rng = StdRng::seed_from_u64(11);
        let n = 10_000;
        let mut large_hits = 0;
        for _ in 0..n {
            let sample = sample_by_area(&primitives, &mut rng).unwrap();
            // Union pdf is 1 / total area whichever sphere was chosen.
            assert!((sample.pdf - 1.0 / (20.0 * PI)).abs() < 1e-6);
            if sample.point.x > 5.0 {
                large_hits += 1;
            }
        }

        let fraction = large_hits as f32 / n as f32;
        assert!((fraction - 0.8).abs() < 0.02, "fraction = {fraction}");
    }

    #[test]
    fn test_sample_by_area_without_area_is_none() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(sample_by_area(&[], &mut rng).is_none());
    }
}
