//! GJK (Gilbert-Johnson-Keerthi) and EPA (Expanding Polytope Algorithm).
//!
//! Exact narrow-phase depth between two [`ConvexHull`]s placed by isometries.
//!
//! ## GJK
//!
//! GJK works on the Minkowski difference `A - B`. The shapes overlap iff the
//! difference contains the origin; GJK builds a simplex (point, line,
//! triangle, tetrahedron) that tries to enclose it.
//!
//! ## EPA
//!
//! Once GJK encloses the origin, EPA grows the simplex into a polytope until
//! it finds the face of the Minkowski difference closest to the origin. That
//! face's distance is the penetration depth: the length of the shortest
//! translation separating the two shapes.
//!
//! # References
//!
//! - Gilbert, Johnson, Keerthi: "A Fast Procedure for Computing the Distance
//!   Between Complex Objects in Three-Dimensional Space" (1988)
//! - van den Bergen: "Collision Detection in Interactive 3D Environments" (2003)

use nalgebra::{Isometry3, Vector3};

use crate::convex::ConvexHull;

/// Tolerance for numerical comparisons in GJK/EPA.
const EPSILON: f64 = 1e-8;

/// Maximum iterations for GJK before giving up.
const GJK_MAX_ITERATIONS: usize = 64;

/// Maximum iterations for EPA before giving up.
const EPA_MAX_ITERATIONS: usize = 64;

/// Maximum faces in EPA polytope.
const EPA_MAX_FACES: usize = 256;

/// EPA convergence tolerance.
const EPA_TOLERANCE: f64 = 1e-6;

/// Penetration depth between two posed hulls.
///
/// Returns `0` when the hulls are disjoint, only touch, either is empty, or
/// their Minkowski difference is flat.
#[must_use]
pub fn penetration_depth(
    hull_a: &ConvexHull,
    pose_a: &Isometry3<f64>,
    hull_b: &ConvexHull,
    pose_b: &Isometry3<f64>,
) -> f64 {
    if hull_a.is_empty() || hull_b.is_empty() {
        return 0.0;
    }

    let diff = MinkowskiDifference {
        hull_a,
        pose_a,
        hull_b,
        pose_b,
    };
    gjk(&diff)
        .and_then(|simplex| epa(&diff, &simplex))
        .map_or(0.0, |depth| depth.max(0.0))
}

/// `A - B` for two posed hulls, seen through its support function.
#[derive(Clone, Copy)]
struct MinkowskiDifference<'a> {
    hull_a: &'a ConvexHull,
    pose_a: &'a Isometry3<f64>,
    hull_b: &'a ConvexHull,
    pose_b: &'a Isometry3<f64>,
}

impl MinkowskiDifference<'_> {
    fn support(&self, direction: &Vector3<f64>) -> Vector3<f64> {
        self.hull_a.support(self.pose_a, direction) - self.hull_b.support(self.pose_b, &-direction)
    }

    /// From the center of A toward the center of B, or +X when they coincide.
    fn initial_direction(&self) -> Vector3<f64> {
        let offset = self.pose_b * self.hull_b.center() - self.pose_a * self.hull_a.center();
        if offset.norm() < EPSILON {
            Vector3::x()
        } else {
            offset.normalize()
        }
    }
}

// =============================================================================
// GJK
// =============================================================================

/// Up to four points of `A - B`, newest first.
#[derive(Debug, Clone, Copy, Default)]
struct Simplex {
    points: [Vector3<f64>; 4],
    len: usize,
}

impl Simplex {
    fn push(&mut self, point: Vector3<f64>) {
        self.points.copy_within(0..3, 1);
        self.points[0] = point;
        self.len = (self.len + 1).min(4);
    }

    /// Keep only the points at `indices`, in that order.
    fn keep<const N: usize>(&mut self, indices: [usize; N]) {
        let old = self.points;
        for (slot, &i) in indices.iter().enumerate() {
            self.points[slot] = old[i];
        }
        self.len = N;
    }

    fn as_slice(&self) -> &[Vector3<f64>] {
        &self.points[..self.len]
    }

    /// Shrink to the feature nearest the origin and return the next search
    /// direction, or `None` once the simplex encloses the origin.
    fn reduce(&mut self) -> Option<Vector3<f64>> {
        match self.len {
            0 | 1 => Some(-self.points[0]),
            2 => Some(self.reduce_line()),
            3 => Some(self.reduce_triangle()),
            _ => self.reduce_tetrahedron(),
        }
    }

    fn reduce_line(&mut self) -> Vector3<f64> {
        let ab = self.points[1] - self.points[0];
        let ao = -self.points[0];
        self.toward_edge_ab(&ab, &ao)
    }

    fn reduce_triangle(&mut self) -> Vector3<f64> {
        let [a, b, c, _] = self.points;
        let ab = b - a;
        let ac = c - a;
        let ao = -a;
        let abc = ab.cross(&ac);

        if abc.cross(&ac).dot(&ao) > 0.0 {
            if ac.dot(&ao) > 0.0 {
                self.keep([0, 2]);
                triple_product(&ac, &ao, &ac)
            } else {
                self.toward_edge_ab(&ab, &ao)
            }
        } else if ab.cross(&abc).dot(&ao) > 0.0 {
            self.toward_edge_ab(&ab, &ao)
        } else if abc.dot(&ao) > 0.0 {
            abc
        } else {
            // Origin below the triangle: flip the winding
            self.keep([0, 2, 1]);
            -abc
        }
    }

    fn toward_edge_ab(&mut self, ab: &Vector3<f64>, ao: &Vector3<f64>) -> Vector3<f64> {
        if ab.dot(ao) > 0.0 {
            self.keep([0, 1]);
            triple_product(ab, ao, ab)
        } else {
            self.keep([0]);
            *ao
        }
    }

    fn reduce_tetrahedron(&mut self) -> Option<Vector3<f64>> {
        let [a, b, c, d] = self.points;
        let ab = b - a;
        let ac = c - a;
        let ad = d - a;
        let ao = -a;

        let faces = [([0, 1, 2], ab.cross(&ac)), ([0, 2, 3], ac.cross(&ad)), ([0, 3, 1], ad.cross(&ab))];
        for (face, normal) in faces {
            if normal.dot(&ao) > 0.0 {
                self.keep(face);
                return Some(self.reduce_triangle());
            }
        }
        None
    }
}

/// `(a × b) × c`.
#[inline]
fn triple_product(a: &Vector3<f64>, b: &Vector3<f64>, c: &Vector3<f64>) -> Vector3<f64> {
    b * a.dot(c) - a * b.dot(c)
}

/// Final simplex when `A - B` contains the origin, `None` when it does not.
fn gjk(diff: &MinkowskiDifference<'_>) -> Option<Simplex> {
    let mut simplex = Simplex::default();
    let first = diff.support(&diff.initial_direction());
    simplex.push(first);
    let mut direction = -first;

    for _ in 0..GJK_MAX_ITERATIONS {
        if direction.norm_squared() < EPSILON * EPSILON {
            // Origin lies on the simplex
            return Some(simplex);
        }
        direction = direction.normalize();

        let point = diff.support(&direction);
        if point.dot(&direction) < -EPSILON {
            return None;
        }

        simplex.push(point);
        direction = match simplex.reduce() {
            Some(next) => next,
            None => return Some(simplex),
        };
    }

    None
}

// =============================================================================
// EPA
// =============================================================================

#[derive(Debug, Clone)]
struct EpaFace {
    vertices: [usize; 3],
    /// Outward-facing unit normal.
    normal: Vector3<f64>,
    /// Distance from origin to the face plane along `normal`.
    distance: f64,
}

impl EpaFace {
    fn new(points: &[Vector3<f64>], vertices: [usize; 3]) -> Option<Self> {
        let [a, b, c] = vertices.map(|i| points[i]);
        let normal = (b - a).cross(&(c - a));
        let norm = normal.norm();
        if norm < EPSILON {
            return None;
        }

        let normal = normal / norm;
        Some(Self {
            vertices,
            normal,
            distance: a.dot(&normal),
        })
    }
}

/// Convex polytope inside `A - B`, grown toward its boundary.
struct Polytope {
    points: Vec<Vector3<f64>>,
    faces: Vec<EpaFace>,
}

impl Polytope {
    /// Tetrahedron with outward faces, `None` if it is flat.
    fn tetrahedron(points: Vec<Vector3<f64>>) -> Option<Self> {
        let mut faces = Vec::with_capacity(EPA_MAX_FACES);
        faces.extend(
            [[0, 1, 2], [0, 2, 3], [0, 3, 1], [1, 3, 2]]
                .into_iter()
                .filter_map(|vertices| EpaFace::new(&points, vertices)),
        );
        if faces.len() < 4 {
            return None;
        }

        let mut polytope = Self { points, faces };
        polytope.orient_outward();
        Some(polytope)
    }

    /// Flip faces whose normal points toward the centroid.
    fn orient_outward(&mut self) {
        #[allow(clippy::cast_precision_loss)]
        let centroid = self.points.iter().sum::<Vector3<f64>>() / self.points.len() as f64;

        for face in &mut self.faces {
            if face.normal.dot(&(centroid - self.points[face.vertices[0]])) > 0.0 {
                face.normal = -face.normal;
                face.distance = -face.distance;
                face.vertices.swap(1, 2);
            }
        }
    }

    fn closest_face(&self) -> Option<&EpaFace> {
        self.faces
            .iter()
            .min_by(|a, b| a.distance.abs().total_cmp(&b.distance.abs()))
    }

    /// Add `point`, replacing the faces it sees with a fan over their horizon.
    fn expand(&mut self, point: Vector3<f64>) {
        let apex = self.points.len();
        self.points.push(point);

        let mut horizon: Vec<(usize, usize)> = Vec::new();
        let mut i = 0;
        while i < self.faces.len() {
            let face = &self.faces[i];
            if face.normal.dot(&(point - self.points[face.vertices[0]])) > 0.0 {
                let [a, b, c] = face.vertices;
                toggle_edge(&mut horizon, a, b);
                toggle_edge(&mut horizon, b, c);
                toggle_edge(&mut horizon, c, a);
                self.faces.swap_remove(i);
            } else {
                i += 1;
            }
        }

        for (a, b) in horizon {
            if let Some(face) = EpaFace::new(&self.points, [apex, a, b]) {
                self.faces.push(face);
            }
        }
    }
}

/// Edges shared by two removed faces cancel out; the rest form the horizon.
fn toggle_edge(edges: &mut Vec<(usize, usize)>, a: usize, b: usize) {
    match edges
        .iter()
        .position(|&(p, q)| (p == a && q == b) || (p == b && q == a))
    {
        Some(idx) => {
            edges.swap_remove(idx);
        }
        None => edges.push((a, b)),
    }
}

/// Whether `candidate` extends the affine span of `points`.
fn extends_span(points: &[Vector3<f64>], candidate: &Vector3<f64>) -> bool {
    match points {
        [] => true,
        [a] => (candidate - a).norm() > EPSILON,
        [a, b] => (b - a).cross(&(candidate - a)).norm() > EPSILON,
        [a, b, c, ..] => {
            let normal = (b - a).cross(&(c - a));
            let norm = normal.norm();
            if norm < EPSILON {
                // Collinear so far; any off-line point helps
                return (b - a).cross(&(candidate - a)).norm() > EPSILON;
            }
            (normal / norm).dot(&(candidate - a)).abs() > EPSILON
        }
    }
}

/// Grow a short GJK simplex into a tetrahedron with support points along
/// the coordinate axes. `None` when `A - B` is flat.
fn inflate(diff: &MinkowskiDifference<'_>, simplex: &Simplex) -> Option<Simplex> {
    let mut points = simplex.as_slice().to_vec();
    for axis in [
        Vector3::x(),
        Vector3::y(),
        Vector3::z(),
        -Vector3::x(),
        -Vector3::y(),
        -Vector3::z(),
    ] {
        if points.len() >= 4 {
            break;
        }
        let point = diff.support(&axis);
        if extends_span(&points, &point) {
            points.push(point);
        }
    }

    if points.len() < 4 {
        return None;
    }
    let mut grown = Simplex::default();
    for point in points {
        grown.push(point);
    }
    Some(grown)
}

/// Depth of the origin inside `A - B`, starting from a GJK simplex that
/// encloses it.
fn epa(diff: &MinkowskiDifference<'_>, simplex: &Simplex) -> Option<f64> {
    let simplex = if simplex.len < 4 { inflate(diff, simplex)? } else { *simplex };
    let mut polytope = Polytope::tetrahedron(simplex.as_slice().to_vec())?;

    for _ in 0..EPA_MAX_ITERATIONS {
        let closest = polytope.closest_face()?;
        let (normal, distance) = (closest.normal, closest.distance);

        let point = diff.support(&normal);
        if point.dot(&normal) - distance < EPA_TOLERANCE {
            return Some(distance);
        }

        polytope.expand(point);
        if polytope.faces.len() > EPA_MAX_FACES {
            break;
        }
    }

    polytope.closest_face().map(|face| face.distance)
}
