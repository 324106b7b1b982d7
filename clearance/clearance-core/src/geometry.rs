//! Body geometry supplied by mesh-loading collaborators.
//!
//! A [`GeometryModel`] is an indexed triangle mesh, an optional convex
//! decomposition, and the pivot about which the body rotates. It is validated
//! once at construction and immutable afterwards.

use clearance_types::{ClearanceError, Result};
use nalgebra::Point3;

/// A triangle as three vertex indices.
pub type Face = [usize; 3];

/// One piece of a convex decomposition: its own vertex and face lists.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexPiece {
    vertices: Vec<Point3<f64>>,
    faces: Vec<Face>,
}

impl ConvexPiece {
    /// Create a convex piece, validating face indices.
    pub fn new(vertices: Vec<Point3<f64>>, faces: Vec<Face>) -> Result<Self> {
        validate_faces(&vertices, &faces)?;
        Ok(Self { vertices, faces })
    }

    /// Piece vertices.
    #[must_use]
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// Piece faces.
    #[must_use]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }
}

/// Immutable mesh, decomposition and pivot for one body.
///
/// # Example
///
/// ```
/// use clearance_core::GeometryModel;
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let model = GeometryModel::new(vertices, vec![[0, 1, 2]], Point3::origin()).unwrap();
/// assert_eq!(model.face_count(), 1);
/// assert!(!model.has_decomposition());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryModel {
    vertices: Vec<Point3<f64>>,
    faces: Vec<Face>,
    pieces: Vec<ConvexPiece>,
    center: Point3<f64>,
}

impl GeometryModel {
    /// Create a model without a convex decomposition.
    ///
    /// # Errors
    ///
    /// Returns [`ClearanceError::FaceIndexOutOfRange`] if any face references
    /// a missing vertex, or [`ClearanceError::InvalidGeometry`] for a
    /// non-finite vertex or pivot.
    pub fn new(vertices: Vec<Point3<f64>>, faces: Vec<Face>, center: Point3<f64>) -> Result<Self> {
        validate_faces(&vertices, &faces)?;
        if !center.coords.iter().all(|c| c.is_finite()) {
            return Err(ClearanceError::invalid_geometry("pivot must be finite"));
        }
        Ok(Self {
            vertices,
            faces,
            pieces: Vec::new(),
            center,
        })
    }

    /// Attach a convex decomposition.
    #[must_use]
    pub fn with_pieces(mut self, pieces: Vec<ConvexPiece>) -> Self {
        self.pieces = pieces;
        self
    }

    /// Build a model whose mesh is the union of the given convex pieces.
    ///
    /// Useful when a collaborator only provides a decomposition.
    pub fn from_pieces(pieces: Vec<ConvexPiece>, center: Point3<f64>) -> Result<Self> {
        let mut vertices = Vec::new();
        let mut faces = Vec::new();
        for piece in &pieces {
            let offset = vertices.len();
            vertices.extend_from_slice(piece.vertices());
            faces.extend(
                piece
                    .faces()
                    .iter()
                    .map(|f| [f[0] + offset, f[1] + offset, f[2] + offset]),
            );
        }
        Ok(Self::new(vertices, faces, center)?.with_pieces(pieces))
    }

    /// Mesh vertices.
    #[must_use]
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// Mesh faces.
    #[must_use]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Convex decomposition pieces (empty when none).
    #[must_use]
    pub fn pieces(&self) -> &[ConvexPiece] {
        &self.pieces
    }

    /// Pivot used for rotations.
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        self.center
    }

    /// Number of faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Whether the model carries a convex decomposition.
    #[must_use]
    pub fn has_decomposition(&self) -> bool {
        !self.pieces.is_empty()
    }

    /// Whether the model has no faces at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Triangle `index` as three points.
    #[must_use]
    pub fn triangle(&self, index: usize) -> Option<[Point3<f64>; 3]> {
        let f = self.faces.get(index)?;
        Some([self.vertices[f[0]], self.vertices[f[1]], self.vertices[f[2]]])
    }
}

fn validate_faces(vertices: &[Point3<f64>], faces: &[Face]) -> Result<()> {
    if let Some(v) = vertices
        .iter()
        .find(|v| !v.coords.iter().all(|c| c.is_finite()))
    {
        return Err(ClearanceError::invalid_geometry(format!(
            "non-finite vertex {v:?}"
        )));
    }

    for (face_idx, face) in faces.iter().enumerate() {
        if let Some(&index) = face.iter().find(|&&i| i >= vertices.len()) {
            return Err(ClearanceError::FaceIndexOutOfRange {
                face: face_idx,
                index,
                vertex_count: vertices.len(),
            });
        }
    }
    Ok(())
}

/// Axis-aligned box mesh (8 vertices, 12 outward-wound triangles).
#[must_use]
pub fn box_mesh(min: Point3<f64>, max: Point3<f64>) -> (Vec<Point3<f64>>, Vec<Face>) {
    let vertices = vec![
        Point3::new(min.x, min.y, min.z),
        Point3::new(max.x, min.y, min.z),
        Point3::new(max.x, max.y, min.z),
        Point3::new(min.x, max.y, min.z),
        Point3::new(min.x, min.y, max.z),
        Point3::new(max.x, min.y, max.z),
        Point3::new(max.x, max.y, max.z),
        Point3::new(min.x, max.y, max.z),
    ];
    let faces = vec![
        // Bottom (-Z)
        [0, 2, 1],
        [0, 3, 2],
        // Top (+Z)
        [4, 5, 6],
        [4, 6, 7],
        // Front (-Y)
        [0, 1, 5],
        [0, 5, 4],
        // Back (+Y)
        [2, 3, 7],
        [2, 7, 6],
        // Left (-X)
        [0, 4, 7],
        [0, 7, 3],
        // Right (+X)
        [1, 2, 6],
        [1, 6, 5],
    ];
    (vertices, faces)
}
