//! Triangle meshes with their own acceleration structure.

use crate::sampling::sample_by_area;
use crate::{AreaSample, Bvh, Intersection, Material, Primitive, SplitMethod, Triangle};
use ember_math::{Aabb, Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// Leaf threshold for a mesh's internal tree.
const MESH_MAX_PRIMS_IN_NODE: usize = 4;

/// A set of triangles sharing one material, usable as a single primitive.
///
/// Hits are resolved by an internal BVH; the reported hit primitive is the
/// individual triangle. Area sampling picks a triangle proportionally to its
/// area, so a mesh is a valid area light.
pub struct TriangleMesh {
    triangles: Vec<Arc<dyn Primitive>>,
    bvh: Bvh,
    area: f32,
    bbox: Aabb,
    material: Arc<dyn Material>,
}

impl TriangleMesh {
    /// Build a mesh from an indexed vertex list.
    ///
    /// Faces referencing vertices out of range are skipped with a warning.
    pub fn new(vertices: &[Vec3], faces: &[[usize; 3]], material: Arc<dyn Material>) -> Self {
        let mut triangles: Vec<Arc<dyn Primitive>> = Vec::with_capacity(faces.len());

        for (i, face) in faces.iter().enumerate() {
            let [a, b, c] = *face;
            match (vertices.get(a), vertices.get(b), vertices.get(c)) {
                (Some(&v0), Some(&v1), Some(&v2)) => {
                    triangles.push(Arc::new(Triangle::new(v0, v1, v2, material.clone())));
                }
                _ => log::warn!("Mesh face {} references a missing vertex: {:?}", i, face),
            }
        }

        let area = triangles.iter().map(|t| t.area()).sum();
        let bbox = triangles
            .iter()
            .fold(Aabb::EMPTY, |acc, t| Aabb::union(&acc, &t.bounds()));
        let bvh = Bvh::new(triangles.clone(), MESH_MAX_PRIMS_IN_NODE, SplitMethod::Sah);

        Self {
            triangles,
            bvh,
            area,
            bbox,
            material,
        }
    }

    /// Planar quad `a b c d` as two triangles, wound like the input.
    pub fn quad(a: Vec3, b: Vec3, c: Vec3, d: Vec3, material: Arc<dyn Material>) -> Self {
        Self::new(&[a, b, c, d], &[[0, 1, 2], [0, 2, 3]], material)
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }
}

impl Primitive for TriangleMesh {
    fn bounds(&self) -> Aabb {
        self.bbox
    }

    fn intersection(&self, ray: &Ray) -> Intersection<'_> {
        self.bvh.intersect(ray)
    }

    fn has_emit(&self) -> bool {
        self.material.has_emission()
    }

    fn area(&self) -> f32 {
        self.area
    }

    fn sample_area_point(&self, rng: &mut dyn RngCore) -> AreaSample {
        sample_by_area(&self.triangles, rng).unwrap_or(AreaSample {
            point: self.bbox.centroid(),
            normal: Vec3::ZERO,
            emission: self.material.emission(),
            pdf: 0.0,
        })
    }
}
