//! Compare BVH split methods on a random sphere field.
//!
//! Run with: cargo run --release --example split_methods -- [count]

use ember_tracer::{Bvh, Color, Lambertian, Material, Primitive, Ray, SplitMethod, Sphere, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::env;
use std::sync::Arc;
use std::time::Instant;

const RAYS: usize = 200_000;

fn sphere_field(count: usize, rng: &mut StdRng) -> Vec<Arc<dyn Primitive>> {
    let material: Arc<dyn Material> = Arc::new(Lambertian::new(Color::splat(0.5)));
    (0..count)
        .map(|_| {
            let center = Vec3::new(
                rng.gen_range(-50.0..50.0),
                rng.gen_range(-50.0..50.0),
                rng.gen_range(-50.0..50.0),
            );
            Arc::new(Sphere::new(center, rng.gen_range(0.1..1.5), material.clone())) as Arc<dyn Primitive>
        })
        .collect()
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let count = env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(10_000);

    let mut rng = StdRng::seed_from_u64(1);
    let primitives = sphere_field(count, &mut rng);
    let rays: Vec<Ray> = (0..RAYS)
        .map(|_| {
            let origin = Vec3::new(rng.gen_range(-60.0..60.0), rng.gen_range(-60.0..60.0), -80.0);
            let target = Vec3::new(rng.gen_range(-50.0..50.0), rng.gen_range(-50.0..50.0), 0.0);
            Ray::new(origin, (target - origin).normalize())
        })
        .collect();

    println!("{} spheres, {} rays", count, RAYS);

    for method in [SplitMethod::Median, SplitMethod::Sah] {
        let start = Instant::now();
        let bvh = Bvh::new(primitives.clone(), 4, method);
        let build_time = start.elapsed();

        let start = Instant::now();
        let hits = rays.iter().filter(|ray| bvh.intersect(ray).happened).count();
        let trace_time = start.elapsed();

        println!(
            "{:?}: depth {}, built in {:?}, {} hits traced in {:?}",
            method,
            bvh.root().map_or(0, |root| root.depth()),
            build_time,
            hits,
            trace_time
        );
    }
}
