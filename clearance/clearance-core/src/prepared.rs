//! Geometry prepared for proximity queries.

use clearance_types::SplitMethod;
use nalgebra::Point3;

use crate::bvh::{triangle_primitives, Bvh};
use crate::convex::{ConvexAdapter, ConvexHull};
use crate::geometry::GeometryModel;
use crate::triangle::TrianglePoints;

/// A [`GeometryModel`] with its hierarchies and convex hulls.
///
/// Built once, then read concurrently by any number of queries.
#[derive(Debug, Clone)]
pub struct PreparedBody {
    model: GeometryModel,
    bvh: Bvh,
    piece_bvhs: Vec<Bvh>,
    hull: ConvexHull,
    piece_hulls: Vec<ConvexHull>,
}

impl PreparedBody {
    /// Build the whole-mesh BVH and hull, plus one of each per convex piece.
    #[must_use]
    pub fn build(model: GeometryModel, split_method: SplitMethod, max_primitives_per_leaf: usize) -> Self {
        let bvh = Bvh::build_with(
            triangle_primitives(model.vertices(), model.faces()),
            split_method,
            max_primitives_per_leaf,
        );
        let piece_bvhs = model
            .pieces()
            .iter()
            .map(|piece| {
                Bvh::build_with(
                    triangle_primitives(piece.vertices(), piece.faces()),
                    split_method,
                    max_primitives_per_leaf,
                )
            })
            .collect();
        let hull = ConvexAdapter::adapt(model.vertices(), model.faces());
        let piece_hulls = model.pieces().iter().map(ConvexAdapter::adapt_piece).collect();

        Self {
            model,
            bvh,
            piece_bvhs,
            hull,
            piece_hulls,
        }
    }

    /// Source geometry.
    #[must_use]
    pub fn model(&self) -> &GeometryModel {
        &self.model
    }

    /// Whole-mesh BVH.
    #[must_use]
    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    /// Per-piece BVHs (empty without a decomposition).
    #[must_use]
    pub fn piece_bvhs(&self) -> &[Bvh] {
        &self.piece_bvhs
    }

    /// Whole-body convex hull.
    #[must_use]
    pub fn hull(&self) -> &ConvexHull {
        &self.hull
    }

    /// Per-piece convex hulls (empty without a decomposition).
    #[must_use]
    pub fn piece_hulls(&self) -> &[ConvexHull] {
        &self.piece_hulls
    }

    /// Override the whole-body hull center.
    pub fn set_hull_center(&mut self, center: Point3<f64>) {
        self.hull.set_center(center);
    }

    /// Triangle `face` of the whole mesh.
    #[must_use]
    pub fn triangle(&self, face: usize) -> Option<TrianglePoints> {
        self.model.triangle(face)
    }

    /// Triangle `face` of convex piece `piece`.
    #[must_use]
    pub fn piece_triangle(&self, piece: usize, face: usize) -> Option<TrianglePoints> {
        let piece = self.model.pieces().get(piece)?;
        let f = piece.faces().get(face)?;
        let v = piece.vertices();
        Some([*v.get(f[0])?, *v.get(f[1])?, *v.get(f[2])?])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{box_mesh, ConvexPiece};

    #[test]
    fn test_build_without_pieces() {
        let (vertices, faces) = box_mesh(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let model = GeometryModel::new(vertices, faces, Point3::new(0.5, 0.5, 0.5)).unwrap();
        let body = PreparedBody::build(model, SplitMethod::Median, 1);

        assert_eq!(body.bvh().primitive_count(), 12);
        assert!(body.piece_bvhs().is_empty());
        assert!(body.piece_hulls().is_empty());
        assert_eq!(body.hull().vertices().len(), 8);
        assert!(body.triangle(11).is_some());
        assert!(body.piece_triangle(0, 0).is_none());
    }

    #[test]
    fn test_build_with_pieces() {
        let (v0, f0) = box_mesh(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let (v1, f1) = box_mesh(Point3::new(2.0, 0.0, 0.0), Point3::new(3.0, 1.0, 1.0));
        let pieces = vec![ConvexPiece::new(v0, f0).unwrap(), ConvexPiece::new(v1, f1).unwrap()];
        let model = GeometryModel::from_pieces(pieces, Point3::origin()).unwrap();
        let mut body = PreparedBody::build(model, SplitMethod::Mean, 2);

        assert_eq!(body.piece_bvhs().len(), 2);
        assert_eq!(body.piece_hulls().len(), 2);
        assert_eq!(body.bvh().primitive_count(), 24);

        let tri = body.piece_triangle(1, 0).unwrap();
        assert!(tri.iter().all(|p| p.x >= 2.0));

        body.set_hull_center(Point3::new(9.0, 9.0, 9.0));
        assert_eq!(body.hull().center(), Point3::new(9.0, 9.0, 9.0));
    }
}
