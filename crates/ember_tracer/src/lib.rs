//! Ember - CPU path tracing over a bounding volume hierarchy.
//!
//! A Monte Carlo path tracer for physically-based rendering:
//! - BVH over arbitrary primitives, built once with a median or SAH split
//! - Next-event estimation towards area lights
//! - Russian roulette path termination
//!
//! The scene is immutable after [`SceneBuilder::build`], so one scene can be
//! shared by reference between any number of render threads.

mod bvh;
mod camera;
mod config;
mod integrator;
mod intersection;
mod material;
mod mesh;
mod primitive;
mod renderer;
mod sampling;
mod scene;
mod sphere;
mod triangle;

pub use bvh::{Bvh, BvhNode, SplitMethod, MAX_PRIMS_IN_NODE_LIMIT};
pub use camera::Camera;
pub use config::{ConfigError, RenderSettings};
pub use integrator::{PDF_EPSILON, RAY_EPSILON, SHADOW_EPSILON};
pub use intersection::Intersection;
pub use material::{Color, Lambertian, Material};
pub use mesh::TriangleMesh;
pub use primitive::{AreaSample, Primitive, HIT_T_MIN};
pub use renderer::{color_to_rgb8, render, render_pixel, ImageBuffer, RenderProgress};
pub use sampling::gen_f32;
pub use scene::{Scene, SceneBuilder};
pub use sphere::Sphere;
pub use triangle::Triangle;

/// Re-export Vec3 and common math types from ember_math
pub use ember_math::{Aabb, Interval, Ray, Vec3};
