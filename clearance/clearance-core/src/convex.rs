//! Convex hull representation for the narrow phase.
//!
//! [`ConvexAdapter`] turns a raw vertex/face list into a [`ConvexHull`] whose
//! support function drives GJK and EPA. The input is assumed to be convex (a
//! convex-decomposition piece, or a body treated as its own hull); the
//! support function only looks at vertices, so for non-convex input it
//! answers queries for the convex hull of those vertices.

use std::collections::HashMap;

use crate::aabb::Aabb;
use crate::geometry::{ConvexPiece, Face};
use nalgebra::{Isometry3, Point3, Vector3};

/// Prepared convex shape: deduplicated vertices, faces and a reference center.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexHull {
    vertices: Vec<Point3<f64>>,
    faces: Vec<Face>,
    center: Point3<f64>,
}

impl ConvexHull {
    /// Hull vertices in local coordinates.
    #[must_use]
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// Hull faces, indexing [`Self::vertices`].
    #[must_use]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Reference center used to seed GJK.
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        self.center
    }

    /// Replace the reference center.
    pub fn set_center(&mut self, center: Point3<f64>) {
        self.center = center;
    }

    /// Whether the hull has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Local bounding box, `None` when empty.
    #[must_use]
    pub fn aabb(&self) -> Option<Aabb> {
        Aabb::from_points(&self.vertices)
    }

    /// Vertex furthest along `direction` in local coordinates.
    ///
    /// Ties resolve to the first vertex. An empty hull returns its center.
    #[must_use]
    pub fn local_support(&self, direction: &Vector3<f64>) -> Point3<f64> {
        let mut max_dot = f64::NEG_INFINITY;
        let mut best_vertex = self.center;

        for vertex in &self.vertices {
            let dot = vertex.coords.dot(direction);
            if dot > max_dot {
                max_dot = dot;
                best_vertex = *vertex;
            }
        }

        best_vertex
    }

    /// Support point in world space for the hull placed at `pose`.
    #[must_use]
    pub fn support(&self, pose: &Isometry3<f64>, direction: &Vector3<f64>) -> Point3<f64> {
        // Transform direction to local space
        let local_dir = pose.rotation.inverse() * direction;
        pose * self.local_support(&local_dir)
    }
}

/// Builds [`ConvexHull`]s from raw geometry.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvexAdapter;

impl ConvexAdapter {
    /// Adapt a vertex/face list.
    ///
    /// Bit-identical vertices are merged and faces remapped; faces whose
    /// indices are out of range are dropped. The center is the vertex
    /// centroid (origin when empty).
    #[must_use]
    pub fn adapt(vertices: &[Point3<f64>], faces: &[Face]) -> ConvexHull {
        let mut unique: Vec<Point3<f64>> = Vec::with_capacity(vertices.len());
        let mut seen: HashMap<[u64; 3], usize> = HashMap::with_capacity(vertices.len());
        let mut remap = Vec::with_capacity(vertices.len());

        for v in vertices {
            // `+ 0.0` folds -0.0 into 0.0
            let key = [(v.x + 0.0).to_bits(), (v.y + 0.0).to_bits(), (v.z + 0.0).to_bits()];
            let idx = *seen.entry(key).or_insert_with(|| {
                unique.push(*v);
                unique.len() - 1
            });
            remap.push(idx);
        }

        let faces = faces
            .iter()
            .filter_map(|f| {
                Some([
                    *remap.get(f[0])?,
                    *remap.get(f[1])?,
                    *remap.get(f[2])?,
                ])
            })
            .collect();

        let center = if unique.is_empty() {
            Point3::origin()
        } else {
            #[allow(clippy::cast_precision_loss)]
            let n = unique.len() as f64;
            Point3::from(unique.iter().map(|p| p.coords).sum::<Vector3<f64>>() / n)
        };

        ConvexHull {
            vertices: unique,
            faces,
            center,
        }
    }

    /// Adapt one convex-decomposition piece.
    #[must_use]
    pub fn adapt_piece(piece: &ConvexPiece) -> ConvexHull {
        Self::adapt(piece.vertices(), piece.faces())
    }
}
