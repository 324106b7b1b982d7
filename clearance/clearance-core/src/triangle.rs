//! Triangle primitives for BVH leaf queries.
//!
//! Leaf-level work for both BVH query paths:
//!
//! - [`triangle_distance`] - exact separation of two triangles (distance query)
//! - [`triangles_intersect`] - SAT contact test (which environment pieces
//!   touch the robot surface)

use nalgebra::{Point3, Vector3};

/// Small epsilon for numerical comparisons.
const EPSILON: f64 = 1e-10;

/// A triangle as three points.
pub type TrianglePoints = [Point3<f64>; 3];

/// Whether two triangles intersect or touch, by the Separating Axis Theorem.
///
/// Tests the two face normals and the nine edge-edge cross products. When the
/// triangles are coplanar the in-plane edge normals are tested as well, since
/// every edge cross product then collapses onto the shared normal.
#[must_use]
pub fn triangles_intersect(tri_a: &TrianglePoints, tri_b: &TrianglePoints) -> bool {
    if !triangle_aabbs_overlap(tri_a, tri_b) {
        return false;
    }

    let edges_a = [
        tri_a[1] - tri_a[0],
        tri_a[2] - tri_a[1],
        tri_a[0] - tri_a[2],
    ];
    let edges_b = [
        tri_b[1] - tri_b[0],
        tri_b[2] - tri_b[1],
        tri_b[0] - tri_b[2],
    ];

    let normal_a = edges_a[0].cross(&edges_a[1]);
    let normal_b = edges_b[0].cross(&edges_b[1]);

    if separates(&normal_a, tri_a, tri_b) || separates(&normal_b, tri_a, tri_b) {
        return false;
    }

    let edge_axes = edges_a
        .iter()
        .flat_map(|edge_a| edges_b.iter().map(move |edge_b| edge_a.cross(edge_b)));
    for axis in edge_axes {
        if separates(&axis, tri_a, tri_b) {
            return false;
        }
    }

    let coplanar = normal_a.cross(&normal_b).norm_squared()
        <= EPSILON * normal_a.norm_squared() * normal_b.norm_squared();
    if coplanar {
        return !edges_a
            .iter()
            .chain(edges_b.iter())
            .any(|edge| separates(&normal_a.cross(edge), tri_a, tri_b));
    }

    true
}

/// Test if the AABBs of two triangles overlap.
fn triangle_aabbs_overlap(tri_a: &TrianglePoints, tri_b: &TrianglePoints) -> bool {
    let min_a = tri_a[0].inf(&tri_a[1]).inf(&tri_a[2]);
    let max_a = tri_a[0].sup(&tri_a[1]).sup(&tri_a[2]);
    let min_b = tri_b[0].inf(&tri_b[1]).inf(&tri_b[2]);
    let max_b = tri_b[0].sup(&tri_b[1]).sup(&tri_b[2]);

    !(max_a.x < min_b.x - EPSILON
        || min_a.x > max_b.x + EPSILON
        || max_a.y < min_b.y - EPSILON
        || min_a.y > max_b.y + EPSILON
        || max_a.z < min_b.z - EPSILON
        || min_a.z > max_b.z + EPSILON)
}

/// Whether the projections of the triangles onto `axis` are disjoint.
///
/// Near-zero axes never separate.
fn separates(axis: &Vector3<f64>, tri_a: &TrianglePoints, tri_b: &TrianglePoints) -> bool {
    let axis_len = axis.norm();
    if axis_len < EPSILON {
        return false;
    }
    let axis = axis / axis_len;

    let project = |tri: &TrianglePoints| {
        tri.iter().map(|p| axis.dot(&p.coords)).fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(lo, hi), d| (lo.min(d), hi.max(d)),
        )
    };
    let (min_a, max_a) = project(tri_a);
    let (min_b, max_b) = project(tri_b);

    max_a < min_b - EPSILON || max_b < min_a - EPSILON
}

/// Minimum distance between two triangles.
///
/// Returns `0.0` when the triangles intersect or touch.
#[must_use]
pub fn triangle_distance(tri_a: &TrianglePoints, tri_b: &TrianglePoints) -> f64 {
    if triangles_intersect(tri_a, tri_b) {
        return 0.0;
    }

    // For disjoint triangles the closest pair is vertex-face or edge-edge
    let mut best_sq = f64::INFINITY;

    for p in tri_a {
        let q = closest_point_on_triangle(tri_b[0], tri_b[1], tri_b[2], *p);
        best_sq = best_sq.min((p - q).norm_squared());
    }
    for p in tri_b {
        let q = closest_point_on_triangle(tri_a[0], tri_a[1], tri_a[2], *p);
        best_sq = best_sq.min((p - q).norm_squared());
    }

    for i in 0..3 {
        let start_a = tri_a[i];
        let dir_a = tri_a[(i + 1) % 3] - start_a;
        for j in 0..3 {
            let start_b = tri_b[j];
            let dir_b = tri_b[(j + 1) % 3] - start_b;
            let (pa, pb) = closest_points_on_segments(start_a, dir_a, start_b, dir_b);
            best_sq = best_sq.min((pa - pb).norm_squared());
        }
    }

    best_sq.sqrt()
}

/// Find the closest point on a triangle to a given point.
///
/// Uses barycentric region tests ("Real-Time Collision Detection", Ericson).
#[must_use]
pub fn closest_point_on_triangle(
    v0: Point3<f64>,
    v1: Point3<f64>,
    v2: Point3<f64>,
    p: Point3<f64>,
) -> Point3<f64> {
    let ab = v1 - v0;
    let ac = v2 - v0;
    let ap = p - v0;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return v0;
    }

    let bp = p - v1;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return v1;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let denom = d1 - d3;
        let v = if denom.abs() > EPSILON { d1 / denom } else { 0.5 };
        return v0 + ab * v;
    }

    let cp = p - v2;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return v2;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let denom = d2 - d6;
        let w = if denom.abs() > EPSILON { d2 / denom } else { 0.5 };
        return v0 + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let num = d4 - d3;
        let denom = num + (d5 - d6);
        let w = if denom.abs() > EPSILON { num / denom } else { 0.5 };
        return v1 + (v2 - v1) * w;
    }

    let total = va + vb + vc;
    // Zero-area triangle
    if total.abs() < EPSILON {
        return v0;
    }
    let denom = 1.0 / total;
    let v = vb * denom;
    let w = vc * denom;
    v0 + ab * v + ac * w
}

/// Find the closest points between two line segments.
///
/// Segment A: `start_a + s * dir_a` for s in [0, 1]
/// Segment B: `start_b + t * dir_b` for t in [0, 1]
///
/// Returns the closest points (`point_on_a`, `point_on_b`).
#[allow(clippy::many_single_char_names, clippy::suspicious_operation_groupings)]
#[must_use]
pub fn closest_points_on_segments(
    start_a: Point3<f64>,
    dir_a: Vector3<f64>,
    start_b: Point3<f64>,
    dir_b: Vector3<f64>,
) -> (Point3<f64>, Point3<f64>) {
    let r = start_a - start_b;
    let a = dir_a.dot(&dir_a);
    let e = dir_b.dot(&dir_b);
    let f = dir_b.dot(&r);

    if a < EPSILON && e < EPSILON {
        return (start_a, start_b);
    }

    let (s, t);
    if a < EPSILON {
        s = 0.0;
        t = (f / e).clamp(0.0, 1.0);
    } else {
        let c = dir_a.dot(&r);
        if e < EPSILON {
            t = 0.0;
            s = (-c / a).clamp(0.0, 1.0);
        } else {
            let b = dir_a.dot(&dir_b);
            let denom = a * e - b * b;

            s = if denom.abs() > EPSILON {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                // Parallel segments
                0.0
            };

            let t_num = b * s + f;
            if t_num < 0.0 {
                let s_new = (-c / a).clamp(0.0, 1.0);
                return (start_a + dir_a * s_new, start_b);
            }
            if t_num > e {
                let s_new = ((b - c) / a).clamp(0.0, 1.0);
                return (start_a + dir_a * s_new, start_b + dir_b);
            }
            t = t_num / e;
        }
    }

    (start_a + dir_a * s, start_b + dir_b * t)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tri(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> TrianglePoints {
        [
            Point3::new(a[0], a[1], a[2]),
            Point3::new(b[0], b[1], b[2]),
            Point3::new(c[0], c[1], c[2]),
        ]
    }

    #[test]
    fn test_coplanar_overlapping() {
        let a = tri([0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [1.0, 2.0, 0.0]);
        let b = tri([0.5, 0.5, 0.0], [2.5, 0.5, 0.0], [1.5, 2.5, 0.0]);
        assert!(triangles_intersect(&a, &b));
        assert_eq!(triangle_distance(&a, &b), 0.0);
    }

    #[test]
    fn test_coplanar_separate_with_overlapping_bounds() {
        // AABBs overlap but the triangles are split by the diagonal x + y = 1
        let a = tri([0.0, 0.0, 0.0], [0.9, 0.0, 0.0], [0.0, 0.9, 0.0]);
        let b = tri([1.0, 1.0, 0.0], [0.1, 1.0, 0.0], [1.0, 0.1, 0.0]);
        assert!(!triangles_intersect(&a, &b));
        assert!(triangle_distance(&a, &b) > 0.0);
    }

    #[test]
    fn test_crossing_triangles() {
        let a = tri([-1.0, -1.0, 0.0], [1.0, -1.0, 0.0], [0.0, 1.0, 0.0]);
        let b = tri([0.0, 0.0, -1.0], [0.0, 0.2, 1.0], [0.1, -0.2, 1.0]);
        assert!(triangles_intersect(&a, &b));
        assert!(triangles_intersect(&b, &a));
        assert_eq!(triangle_distance(&a, &b), 0.0);

        // Lifted just clear of A's plane
        let lifted = b.map(|p| p + Vector3::new(0.0, 0.0, 1.01));
        assert!(!triangles_intersect(&a, &lifted));
    }

    #[test]
    fn test_touching_counts_as_intersecting() {
        // Shared edge, triangles at right angles
        let a = tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let b = tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]);
        assert!(triangles_intersect(&a, &b));

        // Vertex resting on the face
        let c = tri([0.2, 0.2, 0.0], [0.2, 0.2, 1.0], [0.5, 0.2, 1.0]);
        assert!(triangles_intersect(&a, &c));
    }

    #[test]
    fn test_parallel_distance() {
        let a = tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let b = tri([0.0, 0.0, 2.0], [1.0, 0.0, 2.0], [0.0, 1.0, 2.0]);
        assert_relative_eq!(triangle_distance(&a, &b), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_edge_edge_distance() {
        // Edge of A along X at z=0, edge of B along Y at z=1, crossing above
        let a = tri([-1.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]);
        let b = tri([0.0, -1.0, 1.0], [0.0, 1.0, 1.0], [0.0, 0.0, 2.0]);
        assert_relative_eq!(triangle_distance(&a, &b), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = tri([0.0, 0.0, 0.0], [1.0, 0.2, 0.0], [0.3, 1.0, 0.4]);
        let b = tri([2.0, 1.0, 1.0], [3.0, 0.5, 0.0], [2.5, 2.0, -1.0]);
        assert_relative_eq!(
            triangle_distance(&a, &b),
            triangle_distance(&b, &a),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_closest_point_on_triangle_regions() {
        let v0 = Point3::new(0.0, 0.0, 0.0);
        let v1 = Point3::new(1.0, 0.0, 0.0);
        let v2 = Point3::new(0.0, 1.0, 0.0);

        // Vertex region
        let q = closest_point_on_triangle(v0, v1, v2, Point3::new(-1.0, -1.0, 0.0));
        assert_relative_eq!(q, v0, epsilon = 1e-12);

        // Edge region
        let q = closest_point_on_triangle(v0, v1, v2, Point3::new(0.5, -1.0, 0.0));
        assert_relative_eq!(q, Point3::new(0.5, 0.0, 0.0), epsilon = 1e-12);

        // Face region
        let q = closest_point_on_triangle(v0, v1, v2, Point3::new(0.2, 0.2, 3.0));
        assert_relative_eq!(q, Point3::new(0.2, 0.2, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_closest_points_on_segments() {
        let (pa, pb) = closest_points_on_segments(
            Point3::new(-1.0, 0.0, 0.0),
            Vector3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, -1.0, 1.0),
            Vector3::new(0.0, 2.0, 0.0),
        );
        assert_relative_eq!(pa, Point3::new(0.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(pb, Point3::new(0.0, 0.0, 1.0), epsilon = 1e-12);
    }
}
