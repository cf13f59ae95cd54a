//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree with exactly one primitive per leaf. Built once, top-down,
//! with either a centroid-median split or a bucketed surface area heuristic,
//! and never modified afterwards.

use crate::{Intersection, Primitive};
use ember_math::{Aabb, Ray, Vec3};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Upper bound for the SAH leaf-size threshold.
pub const MAX_PRIMS_IN_NODE_LIMIT: usize = 255;

/// Number of buckets the SAH bins centroids into, per axis.
const SAH_BUCKETS: usize = 12;

/// Cost of visiting an internal node, relative to one primitive test.
const SAH_TRAVERSAL_COST: f32 = 0.125;

/// How a primitive set is partitioned at each internal node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMethod {
    /// Sort by centroid along the widest centroid axis and halve.
    Median,
    /// Bucketed surface area heuristic.
    #[default]
    Sah,
}

/// BVH node - either a branch with two children or a leaf with one primitive.
pub enum BvhNode {
    /// Internal node; `bbox` is the union of both children's boxes.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// Leaf node; `bbox` is exactly the primitive's bounds.
    Leaf {
        primitive: Arc<dyn Primitive>,
        bbox: Aabb,
    },
}

impl BvhNode {
    fn leaf(primitive: Arc<dyn Primitive>) -> Self {
        let bbox = primitive.bounds();
        BvhNode::Leaf { primitive, bbox }
    }

    fn branch(left: BvhNode, right: BvhNode) -> Self {
        let bbox = Aabb::union(&left.bbox(), &right.bbox());
        BvhNode::Branch {
            left: Box::new(left),
            right: Box::new(right),
            bbox,
        }
    }

    pub fn bbox(&self) -> Aabb {
        match self {
            BvhNode::Branch { bbox, .. } | BvhNode::Leaf { bbox, .. } => *bbox,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, BvhNode::Leaf { .. })
    }

    pub fn left(&self) -> Option<&BvhNode> {
        match self {
            BvhNode::Branch { left, .. } => Some(left),
            BvhNode::Leaf { .. } => None,
        }
    }

    pub fn right(&self) -> Option<&BvhNode> {
        match self {
            BvhNode::Branch { right, .. } => Some(right),
            BvhNode::Leaf { .. } => None,
        }
    }

    /// The leaf's primitive, `None` for branches.
    pub fn primitive(&self) -> Option<&Arc<dyn Primitive>> {
        match self {
            BvhNode::Leaf { primitive, .. } => Some(primitive),
            BvhNode::Branch { .. } => None,
        }
    }

    /// Number of primitives below this node.
    pub fn primitive_count(&self) -> usize {
        match self {
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => left.primitive_count() + right.primitive_count(),
        }
    }

    /// Number of nodes in this subtree, including itself.
    pub fn node_count(&self) -> usize {
        match self {
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.node_count() + right.node_count(),
        }
    }

    /// Longest root-to-leaf path, counted in nodes.
    pub fn depth(&self) -> usize {
        match self {
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Nearest-hit search.
    ///
    /// Both children of a branch whose box passes the slab test are always
    /// visited; the closer of the two results wins.
    fn intersect<'a>(&'a self, ray: &Ray, inv_dir: Vec3, dir_is_neg: [bool; 3]) -> Intersection<'a> {
        if !self.bbox().intersect_p(ray, inv_dir, dir_is_neg) {
            return Intersection::miss();
        }

        match self {
            BvhNode::Leaf { primitive, .. } => primitive.intersection(ray),
            BvhNode::Branch { left, right, .. } => {
                let left_hit = left.intersect(ray, inv_dir, dir_is_neg);
                let right_hit = right.intersect(ray, inv_dir, dir_is_neg);
                Intersection::closest(left_hit, right_hit)
            }
        }
    }
}

/// A BVH over shared primitives.
pub struct Bvh {
    root: Option<BvhNode>,
    max_prims_in_node: usize,
    split_method: SplitMethod,
}

impl Bvh {
    /// Build a BVH over `primitives`.
    ///
    /// `max_prims_in_node` is clamped to [`MAX_PRIMS_IN_NODE_LIMIT`]; it only
    /// affects the SAH split, where sets at or below it are halved without
    /// evaluating costs. An empty list yields a tree without a root, which
    /// every query misses.
    pub fn new(
        primitives: Vec<Arc<dyn Primitive>>,
        max_prims_in_node: usize,
        split_method: SplitMethod,
    ) -> Self {
        let max_prims_in_node = max_prims_in_node.min(MAX_PRIMS_IN_NODE_LIMIT);
        let count = primitives.len();
        let start = Instant::now();

        let builder = BvhBuilder {
            max_prims_in_node,
            split_method,
        };
        let root = (!primitives.is_empty()).then(|| builder.build(primitives));

        if let Some(root) = &root {
            log::info!(
                "BVH: {} primitives, {} nodes, depth {}, {:?} split, built in {:?}",
                count,
                root.node_count(),
                root.depth(),
                split_method,
                start.elapsed()
            );
        } else {
            log::debug!("BVH: no primitives, empty tree");
        }

        Self {
            root,
            max_prims_in_node,
            split_method,
        }
    }

    pub fn root(&self) -> Option<&BvhNode> {
        self.root.as_ref()
    }

    pub fn split_method(&self) -> SplitMethod {
        self.split_method
    }

    pub fn max_prims_in_node(&self) -> usize {
        self.max_prims_in_node
    }

    /// Bounds of everything in the tree; [`Aabb::EMPTY`] when empty.
    pub fn bounds(&self) -> Aabb {
        self.root.as_ref().map_or(Aabb::EMPTY, BvhNode::bbox)
    }

    pub fn primitive_count(&self) -> usize {
        self.root.as_ref().map_or(0, BvhNode::primitive_count)
    }

    /// Nearest hit along `ray`, or [`Intersection::miss`].
    pub fn intersect(&self, ray: &Ray) -> Intersection<'_> {
        match &self.root {
            Some(root) => root.intersect(ray, ray.inv_direction(), ray.dir_is_neg()),
            None => Intersection::miss(),
        }
    }
}

type PrimitiveList = Vec<Arc<dyn Primitive>>;

struct BvhBuilder {
    max_prims_in_node: usize,
    split_method: SplitMethod,
}

impl BvhBuilder {
    /// Recursive BVH construction. `primitives` must not be empty.
    fn build(&self, mut primitives: PrimitiveList) -> BvhNode {
        let n = primitives.len();
        if n == 1 {
            if let Some(primitive) = primitives.pop() {
                return BvhNode::leaf(primitive);
            }
        }

        let (left, right) = match self.split_method {
            SplitMethod::Median => median_split(primitives),
            SplitMethod::Sah => self.sah_split(primitives),
        };
        debug_assert_eq!(left.len() + right.len(), n, "BVH split lost primitives");

        BvhNode::branch(self.build(left), self.build(right))
    }

    fn sah_split(&self, primitives: PrimitiveList) -> (PrimitiveList, PrimitiveList) {
        let n = primitives.len();

        // Small sets are halved as they come, without evaluating costs
        if n <= self.max_prims_in_node {
            return midpoint_split(primitives);
        }

        let bounds = primitives
            .iter()
            .fold(Aabb::EMPTY, |acc, p| Aabb::union(&acc, &p.bounds()));
        let centroid_bounds = centroid_bounds(&primitives);

        match find_sah_split(&primitives, &bounds, &centroid_bounds) {
            // Splitting only pays off when it beats testing all n primitives
            Some(split) if split.cost < n as f32 => {
                let extent = centroid_bounds.axis_interval(split.axis);
                let (left, right): (PrimitiveList, PrimitiveList) =
                    primitives.into_iter().partition(|p| {
                        bucket_index(p.centroid()[split.axis], extent.min, extent.max)
                            <= split.boundary
                    });

                // Candidates that leave a side empty are never chosen
                debug_assert!(!left.is_empty() && !right.is_empty(), "one-sided SAH partition");
                (left, right)
            }
            _ => midpoint_split(primitives),
        }
    }
}

/// Bounding box of all primitive centroids.
fn centroid_bounds(primitives: &[Arc<dyn Primitive>]) -> Aabb {
    primitives
        .iter()
        .fold(Aabb::EMPTY, |acc, p| Aabb::union_point(&acc, p.centroid()))
}

/// Split at `n / 2`, lower half to the left, keeping the current order.
fn midpoint_split(mut primitives: PrimitiveList) -> (PrimitiveList, PrimitiveList) {
    let right = primitives.split_off(primitives.len() / 2);
    (primitives, right)
}

fn median_split(mut primitives: PrimitiveList) -> (PrimitiveList, PrimitiveList) {
    if primitives.len() > 2 {
        let axis = centroid_bounds(&primitives).max_extent_axis();

        // Stable sort: equal centroids stay in input order
        primitives.sort_by(|a, b| a.centroid()[axis].total_cmp(&b.centroid()[axis]));
    }
    midpoint_split(primitives)
}

/// Bucket of a centroid coordinate within `[min, max]`.
fn bucket_index(centroid: f32, min: f32, max: f32) -> usize {
    let b = (SAH_BUCKETS as f32 * ((centroid - min) / (max - min))) as usize;
    b.min(SAH_BUCKETS - 1)
}

#[derive(Clone, Copy)]
struct Bucket {
    count: usize,
    bounds: Aabb,
}

impl Bucket {
    const EMPTY: Bucket = Bucket {
        count: 0,
        bounds: Aabb::EMPTY,
    };

    fn merge(a: Bucket, b: &Bucket) -> Bucket {
        Bucket {
            count: a.count + b.count,
            bounds: Aabb::union(&a.bounds, &b.bounds),
        }
    }
}

/// Winning SAH candidate: primitives whose bucket on `axis` is at most
/// `boundary` go left.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SahSplit {
    axis: usize,
    boundary: usize,
    cost: f32,
}

/// Cheapest bucket boundary over all three axes.
///
/// Axes whose centroid extent is degenerate are skipped. Among equal costs
/// the first candidate in (axis, boundary) order wins. Boundaries that leave
/// one side empty are not candidates. `None` if nothing could be evaluated.
fn find_sah_split(
    primitives: &[Arc<dyn Primitive>],
    bounds: &Aabb,
    centroid_bounds: &Aabb,
) -> Option<SahSplit> {
    let parent_area = bounds.surface_area();
    let mut best: Option<SahSplit> = None;
    let mut min_cost = f32::INFINITY;

    for axis in 0..3 {
        let extent = centroid_bounds.axis_interval(axis);
        if extent.is_degenerate() {
            continue;
        }

        let mut buckets = [Bucket::EMPTY; SAH_BUCKETS];
        for p in primitives {
            let b = bucket_index(p.centroid()[axis], extent.min, extent.max);
            buckets[b].count += 1;
            buckets[b].bounds = Aabb::union(&buckets[b].bounds, &p.bounds());
        }

        for boundary in 0..SAH_BUCKETS - 1 {
            let (below, above) = buckets.split_at(boundary + 1);
            let left = below.iter().fold(Bucket::EMPTY, Bucket::merge);
            let right = above.iter().fold(Bucket::EMPTY, Bucket::merge);
            if left.count == 0 || right.count == 0 {
                continue;
            }

            let cost = SAH_TRAVERSAL_COST
                + (left.count as f32 * left.bounds.surface_area()
                    + right.count as f32 * right.bounds.surface_area())
                    / parent_area;

            // Strict comparison keeps the earliest of equal-cost candidates
            if cost < min_cost {
                min_cost = cost;
                best = Some(SahSplit {
                    axis,
                    boundary,
                    cost,
                });
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, Lambertian, Material, Sphere, Triangle};
    use proptest::prelude::*;

    fn grey() -> Arc<dyn Material> {
        Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5)))
    }

    fn sphere(center: Vec3, radius: f32) -> Arc<dyn Primitive> {
        Arc::new(Sphere::new(center, radius, grey()))
    }

    fn sphere_row(n: usize) -> Vec<Arc<dyn Primitive>> {
        (0..n)
            .map(|i| sphere(Vec3::new(i as f32, 0.0, -5.0), 0.5))
            .collect()
    }

    /// Scattered spheres and triangles, deterministic.
    fn mixed_scene(n: usize) -> Vec<Arc<dyn Primitive>> {
        (0..n)
            .map(|i| {
                let f = i as f32;
                let c = Vec3::new((f * 7.3) % 11.0 - 5.5, (f * 3.1) % 7.0 - 3.5, (f * 5.7) % 9.0 - 4.5);
                if i % 3 == 0 {
                    Arc::new(Triangle::new(c, c + Vec3::X, c + Vec3::new(0.2, 0.9, 0.4), grey()))
                        as Arc<dyn Primitive>
                } else {
                    sphere(c, 0.2 + (f * 0.37) % 0.5)
                }
            })
            .collect()
    }

    fn brute_force<'a>(primitives: &'a [Arc<dyn Primitive>], ray: &Ray) -> Intersection<'a> {
        primitives
            .iter()
            .map(|p| p.intersection(ray))
            .fold(Intersection::miss(), Intersection::closest)
    }

    fn same_primitive(a: Option<&dyn Primitive>, b: Option<&dyn Primitive>) -> bool {
        match (a, b) {
            (Some(a), Some(b)) => std::ptr::addr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    /// Walks the tree checking box and count invariants; returns the leaf count.
    fn check_invariants(node: &BvhNode) -> usize {
        match node {
            BvhNode::Leaf { primitive, bbox } => {
                assert_eq!(*bbox, primitive.bounds());
                assert!(node.left().is_none() && node.right().is_none());
                1
            }
            BvhNode::Branch { left, right, bbox } => {
                assert_eq!(*bbox, Aabb::union(&left.bbox(), &right.bbox()));
                let count = check_invariants(left) + check_invariants(right);
                assert_eq!(count, node.primitive_count());
                count
            }
        }
    }

    fn same_structure(a: &BvhNode, b: &BvhNode) -> bool {
        match (a, b) {
            (BvhNode::Leaf { primitive: pa, bbox: ba }, BvhNode::Leaf { primitive: pb, bbox: bb }) => {
                Arc::ptr_eq(pa, pb) && ba == bb
            }
            (
                BvhNode::Branch { left: la, right: ra, bbox: ba },
                BvhNode::Branch { left: lb, right: rb, bbox: bb },
            ) => ba == bb && same_structure(la, lb) && same_structure(ra, rb),
            _ => false,
        }
    }

    /// Leaf primitives in left-to-right order.
    fn leaf_order(node: &BvhNode, out: &mut Vec<Arc<dyn Primitive>>) {
        match node {
            BvhNode::Leaf { primitive, .. } => out.push(primitive.clone()),
            BvhNode::Branch { left, right, .. } => {
                leaf_order(left, out);
                leaf_order(right, out);
            }
        }
    }

    #[test]
    fn test_bvh_empty() {
        let bvh = Bvh::new(vec![], 4, SplitMethod::Sah);
        assert!(bvh.root().is_none());
        assert_eq!(bvh.primitive_count(), 0);
        assert_eq!(bvh.bounds(), Aabb::EMPTY);

        let isect = bvh.intersect(&Ray::new(Vec3::ZERO, Vec3::Z));
        assert!(!isect.happened);
        assert_eq!(isect.distance, f32::INFINITY);
    }

    #[test]
    fn test_bvh_single_sphere() {
        let bvh = Bvh::new(vec![sphere(Vec3::new(0.0, 0.0, -1.0), 0.5)], 4, SplitMethod::Median);

        // Should create a leaf
        assert!(bvh.root().is_some_and(BvhNode::is_leaf));

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let isect = bvh.intersect(&ray);
        assert!(isect.happened);
        assert!((isect.distance - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_bvh_multiple_spheres() {
        for method in [SplitMethod::Median, SplitMethod::Sah] {
            let bvh = Bvh::new(sphere_row(10), 1, method);

            // Test ray that hits sphere at x=5
            let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
            let isect = bvh.intersect(&ray);
            assert!(isect.happened);

            // Hit point should be near z = -4.5 (sphere at z=-5, radius 0.5)
            assert!((isect.point.z - (-4.5)).abs() < 0.01);
            assert!((isect.point.x - 5.0).abs() < 0.01);
        }
    }

    #[test]
    fn test_one_primitive_per_leaf() {
        for method in [SplitMethod::Median, SplitMethod::Sah] {
            let bvh = Bvh::new(mixed_scene(37), 8, method);
            let root = bvh.root().unwrap();
            assert_eq!(check_invariants(root), 37);
            assert_eq!(root.node_count(), 2 * 37 - 1);
        }
    }

    #[test]
    fn test_leaf_threshold_is_clamped() {
        let bvh = Bvh::new(sphere_row(3), 10_000, SplitMethod::Sah);
        assert_eq!(bvh.max_prims_in_node(), MAX_PRIMS_IN_NODE_LIMIT);
        assert_eq!(bvh.primitive_count(), 3);
    }

    #[test]
    fn test_median_two_primitives_become_two_leaves() {
        let prims = sphere_row(2);
        let bvh = Bvh::new(prims.clone(), 1, SplitMethod::Median);
        let root = bvh.root().unwrap();

        let left = root.left().unwrap();
        let right = root.right().unwrap();
        assert!(left.is_leaf() && right.is_leaf());
        assert!(Arc::ptr_eq(left.primitive().unwrap(), &prims[0]));
        assert!(Arc::ptr_eq(right.primitive().unwrap(), &prims[1]));
    }

    #[test]
    fn test_median_sorts_along_widest_axis() {
        // Spread along y, fed in reverse order
        let prims: Vec<_> = (0..5)
            .rev()
            .map(|i| sphere(Vec3::new(0.0, i as f32 * 3.0, 0.0), 0.5))
            .collect();
        let bvh = Bvh::new(prims, 1, SplitMethod::Median);

        let mut leaves = Vec::new();
        leaf_order(bvh.root().unwrap(), &mut leaves);
        let ys: Vec<f32> = leaves.iter().map(|p| p.centroid().y).collect();
        assert_eq!(ys, vec![0.0, 3.0, 6.0, 9.0, 12.0]);

        // Lower half (floor(5 / 2) = 2 primitives) on the left
        assert_eq!(bvh.root().unwrap().left().unwrap().primitive_count(), 2);
    }

    #[test]
    fn test_median_ties_keep_input_order() {
        // Identical centroids: the split must not reorder anything
        let prims: Vec<_> = (0..6).map(|_| sphere(Vec3::ONE, 1.0)).collect();
        let bvh = Bvh::new(prims.clone(), 1, SplitMethod::Median);

        let mut leaves = Vec::new();
        leaf_order(bvh.root().unwrap(), &mut leaves);
        for (a, b) in leaves.iter().zip(&prims) {
            assert!(Arc::ptr_eq(a, b));
        }
    }

    #[test]
    fn test_sah_picks_first_of_equal_costs() {
        // Four spheres on a square in the z = 0 plane: splitting along x or y
        // costs the same for every boundary between the two columns.
        let prims = vec![
            sphere(Vec3::new(0.0, 0.0, 0.0), 0.5),
            sphere(Vec3::new(10.0, 0.0, 0.0), 0.5),
            sphere(Vec3::new(0.0, 10.0, 0.0), 0.5),
            sphere(Vec3::new(10.0, 10.0, 0.0), 0.5),
        ];
        let bounds = prims.iter().fold(Aabb::EMPTY, |acc, p| Aabb::union(&acc, &p.bounds()));
        let split = find_sah_split(&prims, &bounds, &centroid_bounds(&prims)).unwrap();

        assert_eq!(split.axis, 0);
        assert_eq!(split.boundary, 0);
        let expected = SAH_TRAVERSAL_COST + (2.0 * 46.0 + 2.0 * 46.0) / 286.0;
        assert!((split.cost - expected).abs() < 1e-5);
    }

    #[test]
    fn test_sah_prefers_cheaper_axis() {
        // Two tight clusters along z, spread out in x: z gives small children
        let mut prims = Vec::new();
        for i in 0..4 {
            prims.push(sphere(Vec3::new(i as f32 * 0.5, 0.0, 0.0), 0.1));
            prims.push(sphere(Vec3::new(i as f32 * 0.5, 0.0, 20.0), 0.1));
        }
        let bounds = prims.iter().fold(Aabb::EMPTY, |acc, p| Aabb::union(&acc, &p.bounds()));
        let split = find_sah_split(&prims, &bounds, &centroid_bounds(&prims)).unwrap();
        assert_eq!(split.axis, 2);
    }

    #[test]
    fn test_sah_skips_degenerate_axes() {
        // Every centroid shares x = 5 and z = 1
        let prims: Vec<_> = (0..6)
            .map(|i| sphere(Vec3::new(5.0, i as f32, 1.0), 0.25 + i as f32 * 0.1))
            .collect();
        let bounds = prims.iter().fold(Aabb::EMPTY, |acc, p| Aabb::union(&acc, &p.bounds()));
        let split = find_sah_split(&prims, &bounds, &centroid_bounds(&prims)).unwrap();
        assert_eq!(split.axis, 1);
    }

    #[test]
    fn test_sah_all_centroids_equal() {
        let prims: Vec<_> = (0..5).map(|i| sphere(Vec3::ONE, 1.0 + i as f32)).collect();
        let bounds = prims.iter().fold(Aabb::EMPTY, |acc, p| Aabb::union(&acc, &p.bounds()));
        assert!(find_sah_split(&prims, &bounds, &centroid_bounds(&prims)).is_none());

        // Falls back to midpoint splits and still builds a complete tree
        let bvh = Bvh::new(prims, 1, SplitMethod::Sah);
        assert_eq!(check_invariants(bvh.root().unwrap()), 5);
    }

    #[test]
    fn test_sah_below_threshold_halves_input_order() {
        // Cost-driven splits would pair up the near spheres; the small-set
        // path halves the list as given instead.
        let prims: Vec<_> = [0.0, 10.0, 1.0, 11.0, 2.0]
            .into_iter()
            .map(|x| sphere(Vec3::new(x, 0.0, 0.0), 0.5))
            .collect();
        let bvh = Bvh::new(prims.clone(), 8, SplitMethod::Sah);
        let root = bvh.root().unwrap();
        assert_eq!(root.left().unwrap().primitive_count(), 2);

        let mut leaves = Vec::new();
        leaf_order(root, &mut leaves);
        assert_eq!(leaves.len(), prims.len());
        for (a, b) in leaves.iter().zip(&prims) {
            assert!(Arc::ptr_eq(a, b));
        }
    }

    #[test]
    fn test_sah_falls_back_when_no_split_pays_off() {
        // Every candidate keeps one huge sphere on each side, so the best
        // cost is about 0.125 + 5 * 240000 / 240800, above the five
        // primitives themselves.
        let prims = vec![
            sphere(Vec3::new(0.5, 0.0, 0.0), 0.1),
            sphere(Vec3::new(1.0, 0.0, 0.0), 100.0),
            sphere(Vec3::new(0.25, 0.0, 0.0), 0.1),
            sphere(Vec3::new(0.0, 0.0, 0.0), 100.0),
            sphere(Vec3::new(0.75, 0.0, 0.0), 0.1),
        ];
        let bounds = prims.iter().fold(Aabb::EMPTY, |acc, p| Aabb::union(&acc, &p.bounds()));
        let split = find_sah_split(&prims, &bounds, &centroid_bounds(&prims)).unwrap();
        assert!(split.cost >= prims.len() as f32, "cost = {}", split.cost);
        assert!((split.cost - 5.108).abs() < 1e-3);

        // Midpoint of the input order: the first two primitives go left
        let bvh = Bvh::new(prims.clone(), 1, SplitMethod::Sah);
        let left = bvh.root().unwrap().left().unwrap();
        assert_eq!(left.primitive_count(), 2);

        let mut leaves = Vec::new();
        leaf_order(left, &mut leaves);
        for expected in &prims[..2] {
            assert!(leaves.iter().any(|p| Arc::ptr_eq(p, expected)));
        }
    }

    #[test]
    fn test_sah_split_separates_clusters() {
        let mut prims = Vec::new();
        for i in 0..8 {
            prims.push(sphere(Vec3::new(-20.0, i as f32 * 0.1, 0.0), 0.1));
            prims.push(sphere(Vec3::new(20.0, i as f32 * 0.1, 0.0), 0.1));
        }
        let bvh = Bvh::new(prims, 2, SplitMethod::Sah);
        let root = bvh.root().unwrap();

        let left = root.left().unwrap().bbox();
        let right = root.right().unwrap().bbox();
        assert!(left.max.x < 0.0);
        assert!(right.min.x > 0.0);
    }

    #[test]
    fn test_bucket_index_clamps_top() {
        assert_eq!(bucket_index(0.0, 0.0, 1.0), 0);
        assert_eq!(bucket_index(1.0, 0.0, 1.0), SAH_BUCKETS - 1);
        assert_eq!(bucket_index(0.5, 0.0, 1.0), 6);
    }

    #[test]
    fn test_build_is_deterministic() {
        let prims = mixed_scene(50);
        for method in [SplitMethod::Median, SplitMethod::Sah] {
            let a = Bvh::new(prims.clone(), 4, method);
            let b = Bvh::new(prims.clone(), 4, method);
            assert!(same_structure(a.root().unwrap(), b.root().unwrap()));
        }
    }

    #[test]
    fn test_matches_brute_force_on_grid_of_rays() {
        let prims = mixed_scene(60);
        for method in [SplitMethod::Median, SplitMethod::Sah] {
            let bvh = Bvh::new(prims.clone(), 4, method);
            for i in 0..20 {
                for j in 0..20 {
                    let target = Vec3::new(i as f32 * 0.6 - 6.0, j as f32 * 0.4 - 4.0, 0.0);
                    let origin = Vec3::new(0.3, 0.1, -20.0);
                    let ray = Ray::new(origin, (target - origin).normalize());

                    let expected = brute_force(&prims, &ray);
                    let actual = bvh.intersect(&ray);
                    assert_eq!(actual.happened, expected.happened);
                    if expected.happened {
                        assert!((actual.distance - expected.distance).abs() < 1e-4);
                        assert!(same_primitive(actual.primitive, expected.primitive));
                    }
                }
            }
        }
    }

    fn arb_vec3(range: f32) -> impl Strategy<Value = Vec3> {
        (-range..range, -range..range, -range..range).prop_map(|(x, y, z)| Vec3::new(x, y, z))
    }

    fn arb_direction() -> impl Strategy<Value = Vec3> {
        arb_vec3(1.0).prop_filter("non-zero direction", |d| d.length() > 1e-3).prop_map(|d| d.normalize())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_bvh_matches_brute_force(
            centers in prop::collection::vec((arb_vec3(10.0), 0.1f32..1.5), 1..40),
            rays in prop::collection::vec((arb_vec3(15.0), arb_direction()), 1..20),
            sah in any::<bool>(),
            threshold in 1usize..6,
        ) {
            let prims: Vec<Arc<dyn Primitive>> = centers
                .iter()
                .map(|&(c, r)| sphere(c, r))
                .collect();
            let method = if sah { SplitMethod::Sah } else { SplitMethod::Median };
            let bvh = Bvh::new(prims.clone(), threshold, method);
            prop_assert_eq!(check_invariants(bvh.root().unwrap()), prims.len());

            for (origin, direction) in rays {
                let ray = Ray::new(origin, direction);
                let expected = brute_force(&prims, &ray);
                let actual = bvh.intersect(&ray);

                prop_assert_eq!(actual.happened, expected.happened);
                if expected.happened {
                    prop_assert!((actual.distance - expected.distance).abs() < 1e-4);
                }
            }
        }
    }
}
