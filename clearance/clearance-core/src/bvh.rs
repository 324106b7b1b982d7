//! Bounding volume hierarchies over mesh triangles.
//!
//! The hierarchy is built top-down:
//! 1. Bound all primitives
//! 2. Pick the axis with maximum extent
//! 3. Stable-sort primitives by centroid along that axis
//! 4. Split according to the configured [`SplitMethod`] and recurse
//!
//! Two hierarchies can be traversed together, with the second one placed in
//! the first one's frame by an isometry. Pair queries descend only where
//! boxes overlap, and distance queries descend only where the box separation
//! is below the best distance found so far.
//!
//! # Example
//!
//! ```
//! use clearance_core::bvh::{bvh_from_triangle_mesh, Bvh};
//! use clearance_core::geometry::box_mesh;
//! use clearance_types::SplitMethod;
//! use nalgebra::{Isometry3, Point3};
//!
//! let (vertices, faces) = box_mesh(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
//! let bvh = bvh_from_triangle_mesh(&vertices, &faces, SplitMethod::Median);
//! assert_eq!(bvh.primitive_count(), 12);
//!
//! // Same box shifted 5 units along X: box separation bounds the distance
//! let shifted = Isometry3::translation(5.0, 0.0, 0.0);
//! let d = bvh.min_distance(&bvh, &shifted, |_, _| 4.0);
//! assert!((d - 4.0).abs() < 1e-12);
//! ```

use crate::aabb::Aabb;
use crate::geometry::Face;
use clearance_types::SplitMethod;
use nalgebra::{Isometry3, Point3};

/// Leaf size used when none is configured.
pub const DEFAULT_MAX_PRIMITIVES_PER_LEAF: usize = 1;

/// `Mean` and `BoundsCenter` splits must leave at least `1 / MIN_SPLIT_DIVISOR`
/// of the primitives on each side, or the node is split at the median.
const MIN_SPLIT_DIVISOR: usize = 8;

/// A primitive that can be stored in the BVH.
#[derive(Debug, Clone)]
pub struct BvhPrimitive {
    /// Axis-aligned bounding box of this primitive.
    pub aabb: Aabb,
    /// Index into the original primitive array (e.g., triangle index).
    pub index: usize,
}

impl BvhPrimitive {
    /// Create a new primitive.
    #[must_use]
    pub fn new(aabb: Aabb, index: usize) -> Self {
        Self { aabb, index }
    }

    /// Create a primitive from a triangle.
    #[must_use]
    pub fn from_triangle(triangle: &[Point3<f64>; 3], index: usize) -> Self {
        let mut aabb = Aabb::new(triangle[0], triangle[0]);
        aabb.include(&triangle[1]);
        aabb.include(&triangle[2]);
        Self::new(aabb, index)
    }

    /// Get the centroid of this primitive's AABB.
    #[must_use]
    pub fn centroid(&self) -> Point3<f64> {
        self.aabb.center()
    }
}

#[derive(Debug, Clone)]
enum BvhNode {
    Internal {
        aabb: Aabb,
        left: usize,
        right: usize,
    },
    Leaf {
        aabb: Aabb,
        first_primitive: usize,
        primitive_count: usize,
    },
}

impl BvhNode {
    fn aabb(&self) -> &Aabb {
        match self {
            Self::Internal { aabb, .. } | Self::Leaf { aabb, .. } => aabb,
        }
    }

    fn volume(aabb: &Aabb) -> f64 {
        let extent = aabb.max - aabb.min;
        extent.x * extent.y * extent.z
    }
}

/// Bounding Volume Hierarchy for spatial queries.
///
/// Read-only after construction and safe to share between threads.
#[derive(Debug, Clone)]
pub struct Bvh {
    /// The tree nodes (index 0 is the root).
    nodes: Vec<BvhNode>,
    /// The primitives, reordered during construction.
    primitives: Vec<BvhPrimitive>,
    max_primitives_per_leaf: usize,
    split_method: SplitMethod,
}

impl Default for Bvh {
    fn default() -> Self {
        Self::new()
    }
}

impl Bvh {
    /// Create an empty BVH.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            primitives: Vec::new(),
            max_primitives_per_leaf: DEFAULT_MAX_PRIMITIVES_PER_LEAF,
            split_method: SplitMethod::default(),
        }
    }

    /// Set the maximum number of primitives per leaf node (at least 1).
    #[must_use]
    pub fn with_max_primitives_per_leaf(mut self, max: usize) -> Self {
        self.max_primitives_per_leaf = max.max(1);
        self
    }

    /// Set the split method used while building.
    #[must_use]
    pub fn with_split_method(mut self, split_method: SplitMethod) -> Self {
        self.split_method = split_method;
        self
    }

    /// Build a BVH with an explicit split method and leaf size.
    #[must_use]
    pub fn build_with(
        primitives: Vec<BvhPrimitive>,
        split_method: SplitMethod,
        max_primitives_per_leaf: usize,
    ) -> Self {
        Self::new()
            .with_split_method(split_method)
            .with_max_primitives_per_leaf(max_primitives_per_leaf)
            .build_from(primitives)
    }

    /// Build the BVH from primitives, consuming the builder.
    #[must_use]
    pub fn build_from(mut self, mut primitives: Vec<BvhPrimitive>) -> Self {
        self.nodes.clear();
        if primitives.is_empty() {
            self.primitives.clear();
            return self;
        }

        // Upper bound for a binary tree
        self.nodes.reserve(primitives.len() * 2);
        let len = primitives.len();
        self.build_recursive(&mut primitives, 0, len);

        self.primitives = primitives;
        self
    }

    fn build_recursive(&mut self, primitives: &mut [BvhPrimitive], start: usize, end: usize) -> usize {
        let count = end - start;
        let aabb = Self::compute_bounds(&primitives[start..end]);

        if count <= self.max_primitives_per_leaf {
            let node_idx = self.nodes.len();
            self.nodes.push(BvhNode::Leaf {
                aabb,
                first_primitive: start,
                primitive_count: count,
            });
            return node_idx;
        }

        let axis = aabb.longest_axis();
        let slice = &mut primitives[start..end];
        // Stable, so equal centroids keep input order
        slice.sort_by(|a, b| {
            axis.component(&a.centroid().coords)
                .total_cmp(&axis.component(&b.centroid().coords))
        });

        let split = match self.split_method {
            SplitMethod::Median => count / 2,
            SplitMethod::Mean => {
                let sum: f64 = slice
                    .iter()
                    .map(|p| axis.component(&p.centroid().coords))
                    .sum();
                #[allow(clippy::cast_precision_loss)]
                let mean = sum / count as f64;
                Self::partition_point(slice, axis, mean)
            }
            SplitMethod::BoundsCenter => {
                let center = axis.component(&aabb.center().coords);
                Self::partition_point(slice, axis, center)
            }
        };
        let mid = start + split;

        // Children filled in after recursion
        let node_idx = self.nodes.len();
        self.nodes.push(BvhNode::Internal {
            aabb,
            left: 0,
            right: 0,
        });

        let left_idx = self.build_recursive(primitives, start, mid);
        let right_idx = self.build_recursive(primitives, mid, end);

        if let BvhNode::Internal { left, right, .. } = &mut self.nodes[node_idx] {
            *left = left_idx;
            *right = right_idx;
        }

        node_idx
    }

    /// First index whose centroid is at or past `value`. `slice` must be sorted.
    ///
    /// Falls back to the median when either side would get fewer than
    /// `len / MIN_SPLIT_DIVISOR` primitives (and never leaves a side empty).
    fn partition_point(slice: &[BvhPrimitive], axis: crate::aabb::Axis, value: f64) -> usize {
        let len = slice.len();
        let min_side = (len / MIN_SPLIT_DIVISOR).max(1);
        let split = slice.partition_point(|p| axis.component(&p.centroid().coords) < value);
        if split < min_side || len - split < min_side {
            len / 2
        } else {
            split
        }
    }

    fn compute_bounds(primitives: &[BvhPrimitive]) -> Aabb {
        primitives
            .iter()
            .map(|p| p.aabb)
            .reduce(|acc, aabb| acc.merged(&aabb))
            .unwrap_or_default()
    }

    /// Query for potentially overlapping pairs between two BVHs.
    ///
    /// `transform` places `other` in this BVH's frame. Returns pairs of
    /// (`primitive_idx_self`, `primitive_idx_other`) whose boxes overlap.
    #[must_use]
    pub fn query_pairs(&self, other: &Self, transform: &Isometry3<f64>) -> Vec<(usize, usize)> {
        let mut results = Vec::new();
        if self.nodes.is_empty() || other.nodes.is_empty() {
            return results;
        }
        self.query_pairs_recursive(0, other, 0, transform, &mut results);
        results
    }

    #[allow(clippy::similar_names)]
    fn query_pairs_recursive(
        &self,
        node_a_idx: usize,
        other: &Self,
        node_b_idx: usize,
        transform: &Isometry3<f64>,
        results: &mut Vec<(usize, usize)>,
    ) {
        let node_a = &self.nodes[node_a_idx];
        let node_b = &other.nodes[node_b_idx];
        let aabb_b_in_a = node_b.aabb().transformed(transform);

        if !node_a.aabb().overlaps(&aabb_b_in_a) {
            return;
        }

        match (node_a, node_b) {
            (
                BvhNode::Leaf {
                    first_primitive: first_a,
                    primitive_count: count_a,
                    ..
                },
                BvhNode::Leaf {
                    first_primitive: first_b,
                    primitive_count: count_b,
                    ..
                },
            ) => {
                for prim_a in &self.primitives[*first_a..*first_a + *count_a] {
                    for prim_b in &other.primitives[*first_b..*first_b + *count_b] {
                        if prim_a.aabb.overlaps(&prim_b.aabb.transformed(transform)) {
                            results.push((prim_a.index, prim_b.index));
                        }
                    }
                }
            }
            (BvhNode::Internal { left, right, .. }, BvhNode::Leaf { .. }) => {
                self.query_pairs_recursive(*left, other, node_b_idx, transform, results);
                self.query_pairs_recursive(*right, other, node_b_idx, transform, results);
            }
            (BvhNode::Leaf { .. }, BvhNode::Internal { left, right, .. }) => {
                self.query_pairs_recursive(node_a_idx, other, *left, transform, results);
                self.query_pairs_recursive(node_a_idx, other, *right, transform, results);
            }
            (
                BvhNode::Internal {
                    left: left_a,
                    right: right_a,
                    aabb: aabb_a,
                },
                BvhNode::Internal {
                    left: left_b,
                    right: right_b,
                    ..
                },
            ) => {
                // Descend into the larger volume
                if BvhNode::volume(aabb_a) >= BvhNode::volume(&aabb_b_in_a) {
                    self.query_pairs_recursive(*left_a, other, node_b_idx, transform, results);
                    self.query_pairs_recursive(*right_a, other, node_b_idx, transform, results);
                } else {
                    self.query_pairs_recursive(node_a_idx, other, *left_b, transform, results);
                    self.query_pairs_recursive(node_a_idx, other, *right_b, transform, results);
                }
            }
        }
    }

    /// Minimum distance between the primitives of two BVHs.
    ///
    /// `transform` places `other` in this BVH's frame. `leaf_distance` is
    /// called with (`primitive_idx_self`, `primitive_idx_other`) for every
    /// pair whose boxes are closer than the best distance found so far, and
    /// must return the exact distance between those primitives (0 when they
    /// intersect). Traversal stops as soon as a zero distance is found.
    ///
    /// Returns `f64::INFINITY` when either BVH is empty.
    pub fn min_distance<F>(&self, other: &Self, transform: &Isometry3<f64>, mut leaf_distance: F) -> f64
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut best = f64::INFINITY;
        if self.nodes.is_empty() || other.nodes.is_empty() {
            return best;
        }
        self.min_distance_recursive(0, other, 0, transform, &mut leaf_distance, &mut best);
        best
    }

    #[allow(clippy::similar_names)]
    fn min_distance_recursive<F>(
        &self,
        node_a_idx: usize,
        other: &Self,
        node_b_idx: usize,
        transform: &Isometry3<f64>,
        leaf_distance: &mut F,
        best: &mut f64,
    ) where
        F: FnMut(usize, usize) -> f64,
    {
        if *best <= 0.0 {
            return;
        }

        let node_a = &self.nodes[node_a_idx];
        let node_b = &other.nodes[node_b_idx];
        let aabb_b_in_a = node_b.aabb().transformed(transform);

        if node_a.aabb().distance(&aabb_b_in_a) >= *best {
            return;
        }

        match (node_a, node_b) {
            (
                BvhNode::Leaf {
                    first_primitive: first_a,
                    primitive_count: count_a,
                    ..
                },
                BvhNode::Leaf {
                    first_primitive: first_b,
                    primitive_count: count_b,
                    ..
                },
            ) => {
                for prim_a in &self.primitives[*first_a..*first_a + *count_a] {
                    for prim_b in &other.primitives[*first_b..*first_b + *count_b] {
                        if prim_a.aabb.distance(&prim_b.aabb.transformed(transform)) >= *best {
                            continue;
                        }
                        let d = leaf_distance(prim_a.index, prim_b.index);
                        if d < *best {
                            *best = d;
                            if d <= 0.0 {
                                return;
                            }
                        }
                    }
                }
            }
            (BvhNode::Internal { left, right, .. }, BvhNode::Leaf { .. }) => {
                let (near, far) = self.order_children(*left, *right, &aabb_b_in_a);
                self.min_distance_recursive(near, other, node_b_idx, transform, leaf_distance, best);
                self.min_distance_recursive(far, other, node_b_idx, transform, leaf_distance, best);
            }
            (BvhNode::Leaf { .. }, BvhNode::Internal { left, right, .. }) => {
                let (near, far) = other.order_children_transformed(*left, *right, node_a.aabb(), transform);
                self.min_distance_recursive(node_a_idx, other, near, transform, leaf_distance, best);
                self.min_distance_recursive(node_a_idx, other, far, transform, leaf_distance, best);
            }
            (
                BvhNode::Internal {
                    left: left_a,
                    right: right_a,
                    aabb: aabb_a,
                },
                BvhNode::Internal {
                    left: left_b,
                    right: right_b,
                    ..
                },
            ) => {
                if BvhNode::volume(aabb_a) >= BvhNode::volume(&aabb_b_in_a) {
                    let (near, far) = self.order_children(*left_a, *right_a, &aabb_b_in_a);
                    self.min_distance_recursive(near, other, node_b_idx, transform, leaf_distance, best);
                    self.min_distance_recursive(far, other, node_b_idx, transform, leaf_distance, best);
                } else {
                    let (near, far) =
                        other.order_children_transformed(*left_b, *right_b, aabb_a, transform);
                    self.min_distance_recursive(node_a_idx, other, near, transform, leaf_distance, best);
                    self.min_distance_recursive(node_a_idx, other, far, transform, leaf_distance, best);
                }
            }
        }
    }

    /// Order two children of this BVH by box distance to `target`.
    fn order_children(&self, left: usize, right: usize, target: &Aabb) -> (usize, usize) {
        let dl = self.nodes[left].aabb().distance(target);
        let dr = self.nodes[right].aabb().distance(target);
        if dl <= dr {
            (left, right)
        } else {
            (right, left)
        }
    }

    /// Like [`Self::order_children`], with this BVH's boxes moved by `transform`.
    fn order_children_transformed(
        &self,
        left: usize,
        right: usize,
        target: &Aabb,
        transform: &Isometry3<f64>,
    ) -> (usize, usize) {
        let dl = self.nodes[left].aabb().transformed(transform).distance(target);
        let dr = self.nodes[right].aabb().transformed(transform).distance(target);
        if dl <= dr {
            (left, right)
        } else {
            (right, left)
        }
    }

    /// Get the number of nodes in the BVH.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get the number of primitives.
    #[must_use]
    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    /// Check if the BVH is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}

/// One primitive per face, indexed by face position.
///
/// Faces referencing missing vertices are skipped.
#[must_use]
pub fn triangle_primitives(vertices: &[Point3<f64>], faces: &[Face]) -> Vec<BvhPrimitive> {
    faces
        .iter()
        .enumerate()
        .filter_map(|(face_idx, face)| {
            let triangle = [
                *vertices.get(face[0])?,
                *vertices.get(face[1])?,
                *vertices.get(face[2])?,
            ];
            Some(BvhPrimitive::from_triangle(&triangle, face_idx))
        })
        .collect()
}

/// Create a BVH from an indexed triangle mesh, one face per leaf.
#[must_use]
pub fn bvh_from_triangle_mesh(vertices: &[Point3<f64>], faces: &[Face], split_method: SplitMethod) -> Bvh {
    Bvh::build_with(
        triangle_primitives(vertices, faces),
        split_method,
        DEFAULT_MAX_PRIMITIVES_PER_LEAF,
    )
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::similar_names,
    clippy::cast_precision_loss
)]
mod tests {
    use super::*;
    use crate::geometry::box_mesh;
    use crate::triangle::triangle_distance;
    use approx::assert_relative_eq;
    use nalgebra::{Translation3, UnitQuaternion};

    fn cube(center: Point3<f64>, half: f64) -> Aabb {
        let h = nalgebra::Vector3::repeat(half);
        Aabb::new(center - h, center + h)
    }

    fn create_test_primitives() -> Vec<BvhPrimitive> {
        (0..4)
            .map(|i| BvhPrimitive::new(cube(Point3::new(3.0 * f64::from(i), 0.0, 0.0), 1.0), i as usize))
            .collect()
    }

    fn build(primitives: Vec<BvhPrimitive>) -> Bvh {
        Bvh::build_with(primitives, SplitMethod::Median, 1)
    }

    fn sorted_indices(bvh: &Bvh) -> Vec<usize> {
        let mut indices: Vec<usize> = bvh.primitives.iter().map(|p| p.index).collect();
        indices.sort_unstable();
        indices
    }

    fn depth(bvh: &Bvh, node: usize) -> usize {
        match &bvh.nodes[node] {
            BvhNode::Leaf { .. } => 1,
            BvhNode::Internal { left, right, .. } => 1 + depth(bvh, *left).max(depth(bvh, *right)),
        }
    }

    #[test]
    fn test_bvh_build() {
        let bvh = build(create_test_primitives());

        assert_eq!(bvh.primitive_count(), 4);
        assert!(!bvh.is_empty());
        // One primitive per leaf: 4 leaves + 3 internal nodes
        assert_eq!(bvh.node_count(), 7);
        assert_eq!(bvh.nodes[0].aabb().min.x, -1.0);
        assert_eq!(bvh.nodes[0].aabb().max.x, 10.0);
    }

    #[test]
    fn test_bvh_empty() {
        let bvh = build(vec![]);
        assert!(bvh.is_empty());
        assert_eq!(bvh.node_count(), 0);

        let other = build(create_test_primitives());
        assert!(bvh.query_pairs(&other, &Isometry3::identity()).is_empty());
        assert!(other.query_pairs(&bvh, &Isometry3::identity()).is_empty());
        let d = bvh.min_distance(&other, &Isometry3::identity(), |_, _| 0.0);
        assert!(d.is_infinite());
        let d = other.min_distance(&bvh, &Isometry3::identity(), |_, _| 0.0);
        assert!(d.is_infinite());
    }

    #[test]
    fn test_leaf_size() {
        let bvh = Bvh::build_with(create_test_primitives(), SplitMethod::Median, 4);
        assert_eq!(bvh.node_count(), 1);

        // Zero is clamped to one
        let bvh = Bvh::build_with(create_test_primitives(), SplitMethod::Median, 0);
        assert_eq!(bvh.node_count(), 7);
    }

    #[test]
    fn test_split_methods_keep_all_primitives() {
        // Skewed distribution so mean and bounds center differ from the median
        let mut prims: Vec<BvhPrimitive> = (0..9)
            .map(|i| BvhPrimitive::new(cube(Point3::new(f64::from(i) * 0.1, 0.0, 0.0), 0.01), i as usize))
            .collect();
        prims.push(BvhPrimitive::new(cube(Point3::new(100.0, 0.0, 0.0), 0.01), 9));
        let marker = build(vec![BvhPrimitive::new(cube(Point3::origin(), 0.5), 0)]);

        for method in [SplitMethod::Median, SplitMethod::Mean, SplitMethod::BoundsCenter] {
            let bvh = Bvh::build_with(prims.clone(), method, 1);
            assert_eq!(bvh.split_method, method);
            assert_eq!(sorted_indices(&bvh), (0..10).collect::<Vec<_>>());
            // Binary tree with one primitive per leaf
            assert_eq!(bvh.node_count(), 19, "{method}");

            let far = Isometry3::translation(100.0, 0.0, 0.0);
            assert_eq!(bvh.query_pairs(&marker, &far), vec![(9, 0)], "{method}");
        }
    }

    #[test]
    fn test_identical_centroids_fall_back_to_median() {
        let prims: Vec<BvhPrimitive> = (0..5)
            .map(|i| BvhPrimitive::new(cube(Point3::origin(), 1.0), i))
            .collect();
        for method in [SplitMethod::Mean, SplitMethod::BoundsCenter] {
            let bvh = Bvh::build_with(prims.clone(), method, 1);
            assert_eq!(bvh.node_count(), 9);
        }
    }

    #[test]
    fn test_skewed_centroids_keep_depth_bounded() {
        // Centroids at 10^i: the mean and the bounds center both sit above
        // all but the last one or two primitives, so a plain threshold split
        // peels off one or two primitives per level.
        let prims: Vec<BvhPrimitive> = (0..128)
            .map(|i| BvhPrimitive::new(cube(Point3::new(10f64.powi(i), 0.0, 0.0), 0.01), i as usize))
            .collect();

        let median_depth = depth(&build(prims.clone()), 0);
        assert_eq!(median_depth, 8);

        for method in [SplitMethod::Mean, SplitMethod::BoundsCenter] {
            let bvh = Bvh::build_with(prims.clone(), method, 1);
            assert_eq!(bvh.node_count(), 255, "{method}");
            assert_eq!(sorted_indices(&bvh), (0..128).collect::<Vec<_>>());
            let d = depth(&bvh, 0);
            assert!(d <= 24, "{method} depth {d}");
        }
    }

    #[test]
    fn test_build_is_deterministic() {
        let (vertices, faces) = box_mesh(Point3::origin(), Point3::new(2.0, 1.0, 0.5));
        let a = bvh_from_triangle_mesh(&vertices, &faces, SplitMethod::Median);
        let b = bvh_from_triangle_mesh(&vertices, &faces, SplitMethod::Median);
        let order_a: Vec<usize> = a.primitives.iter().map(|p| p.index).collect();
        let order_b: Vec<usize> = b.primitives.iter().map(|p| p.index).collect();
        assert_eq!(order_a, order_b);
    }

    #[test]
    fn test_triangle_primitives_skip_bad_faces() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        let prims = triangle_primitives(&vertices, &[[0, 1, 2], [0, 1, 9], [0, 1, 3]]);
        assert_eq!(prims.len(), 2);
        assert_eq!(prims[1].index, 2);

        let prim = BvhPrimitive::from_triangle(&[vertices[0], vertices[1], vertices[2]], 7);
        assert_eq!(prim.index, 7);
        assert_eq!(prim.aabb.max, Point3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_bvh_query_pairs_with_transform() {
        let bvh_a = build(vec![
            BvhPrimitive::new(cube(Point3::origin(), 1.0), 0),
            BvhPrimitive::new(cube(Point3::new(3.0, 0.0, 0.0), 1.0), 1),
        ]);
        let bvh_b = build(vec![BvhPrimitive::new(cube(Point3::origin(), 0.5), 0)]);

        let pairs = bvh_a.query_pairs(&bvh_b, &Isometry3::identity());
        assert_eq!(pairs, vec![(0, 0)]);

        let pairs = bvh_a.query_pairs(&bvh_b, &Isometry3::translation(3.0, 0.0, 0.0));
        assert_eq!(pairs, vec![(1, 0)]);

        let pairs = bvh_a.query_pairs(&bvh_b, &Isometry3::translation(0.0, 10.0, 0.0));
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_min_distance_matches_brute_force() {
        let (va, fa) = box_mesh(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let (vb, fb) = box_mesh(Point3::new(-0.5, -0.5, -0.5), Point3::new(0.5, 0.5, 0.5));
        let bvh_a = bvh_from_triangle_mesh(&va, &fa, SplitMethod::Median);
        let bvh_b = bvh_from_triangle_mesh(&vb, &fb, SplitMethod::Mean);

        let transform = Isometry3::from_parts(
            Translation3::new(3.0, 0.7, -0.4),
            UnitQuaternion::from_euler_angles(0.4, 0.2, -0.9),
        );
        let tri_a = |i: usize| fa[i].map(|k| va[k]);
        let tri_b = |j: usize| fb[j].map(|k| transform * vb[k]);

        let mut brute = f64::INFINITY;
        for i in 0..fa.len() {
            for j in 0..fb.len() {
                brute = brute.min(triangle_distance(&tri_a(i), &tri_b(j)));
            }
        }

        let mut calls = 0;
        let d = bvh_a.min_distance(&bvh_b, &transform, |i, j| {
            calls += 1;
            triangle_distance(&tri_a(i), &tri_b(j))
        });

        assert_relative_eq!(d, brute, epsilon = 1e-9);
        assert!(calls < fa.len() * fb.len());
    }

    #[test]
    fn test_min_distance_stops_at_contact() {
        let bvh = build(create_test_primitives());
        let mut calls = 0;
        let d = bvh.min_distance(&bvh, &Isometry3::identity(), |_, _| {
            calls += 1;
            0.0
        });
        assert_eq!(d, 0.0);
        assert_eq!(calls, 1);
    }
}
