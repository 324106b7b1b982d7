//! Minimum distance between a posed robot and the environment.

use nalgebra::Isometry3;

use crate::penetration::{PenetrationEngine, PenetrationReport};
use crate::prepared::PreparedBody;
use crate::triangle::triangle_distance;

/// Result of a distance query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceReport {
    /// Raw BVH minimum distance (`0` when triangles intersect, `+∞` when
    /// either body is empty).
    pub distance: f64,
    /// Clearance magnitude: `distance` when free, otherwise the penetration depth.
    pub value: f64,
    /// Whether the raw distance is positive.
    pub is_free: bool,
    /// Deepest environment piece, when the penetration scan reported one.
    pub piece: Option<usize>,
}

/// BVH-vs-BVH distance with penetration fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistanceEngine {
    penetration: PenetrationEngine,
}

impl DistanceEngine {
    /// Create an engine that falls back to `penetration` on contact.
    #[must_use]
    pub const fn new(penetration: PenetrationEngine) -> Self {
        Self { penetration }
    }

    /// Penetration engine used on contact.
    #[must_use]
    pub const fn penetration(&self) -> &PenetrationEngine {
        &self.penetration
    }

    /// Minimum triangle distance between the whole-mesh hierarchies.
    #[must_use]
    pub fn raw_distance(robot: &PreparedBody, env: &PreparedBody, transform: &Isometry3<f64>) -> f64 {
        env.bvh().min_distance(robot.bvh(), transform, |env_face, robot_face| {
            match (env.triangle(env_face), robot.triangle(robot_face)) {
                (Some(env_tri), Some(robot_tri)) => {
                    triangle_distance(&env_tri, &robot_tri.map(|p| transform * p))
                }
                _ => f64::INFINITY,
            }
        })
    }

    /// Distance of `robot` placed at `transform` from `env`, or its
    /// penetration depth when the meshes touch.
    #[must_use]
    pub fn min_distance(&self, robot: &PreparedBody, env: &PreparedBody, transform: &Isometry3<f64>) -> DistanceReport {
        let distance = Self::raw_distance(robot, env, transform);

        if distance > 0.0 {
            return DistanceReport {
                distance,
                value: distance,
                is_free: true,
                piece: None,
            };
        }

        let PenetrationReport { depth, piece } = self.penetration.penetration_depth(robot, env, transform);
        DistanceReport {
            distance,
            value: depth,
            is_free: false,
            piece,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::geometry::{box_mesh, GeometryModel};
    use approx::assert_relative_eq;
    use clearance_types::SplitMethod;
    use nalgebra::{Point3, Translation3, UnitQuaternion};

    fn unit_cube() -> PreparedBody {
        let (vertices, faces) = box_mesh(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let model = GeometryModel::new(vertices, faces, Point3::new(0.5, 0.5, 0.5)).unwrap();
        PreparedBody::build(model, SplitMethod::Median, 1)
    }

    #[test]
    fn test_separated_cubes() {
        let cube = unit_cube();
        let engine = DistanceEngine::default();

        let report = engine.min_distance(&cube, &cube, &Isometry3::translation(3.5, 0.0, 0.0));
        assert!(report.is_free);
        assert_relative_eq!(report.distance, 2.5, epsilon = 1e-12);
        assert_eq!(report.value, report.distance);
        assert_eq!(report.piece, None);
    }

    #[test]
    fn test_rotated_distance() {
        let cube = unit_cube();
        // Quarter turn about Z around the cube's own corner, then shifted past it
        let transform = Isometry3::from_parts(
            Translation3::new(3.0, 0.0, 0.0),
            UnitQuaternion::from_euler_angles(0.0, 0.0, std::f64::consts::FRAC_PI_2),
        );
        // Rotated cube spans x in [2, 3]
        let d = DistanceEngine::raw_distance(&cube, &cube, &transform);
        assert_relative_eq!(d, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_overlapping_cubes_use_penetration() {
        let cube = unit_cube();
        let engine = DistanceEngine::default();

        let report = engine.min_distance(&cube, &cube, &Isometry3::translation(0.5, 0.0, 0.0));
        assert!(!report.is_free);
        assert_eq!(report.distance, 0.0);
        assert_relative_eq!(report.value, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_empty_body_is_infinitely_far() {
        let cube = unit_cube();
        let empty = PreparedBody::build(
            GeometryModel::new(vec![], vec![], Point3::origin()).unwrap(),
            SplitMethod::Median,
            1,
        );
        let engine = DistanceEngine::default();

        let report = engine.min_distance(&cube, &empty, &Isometry3::identity());
        assert!(report.is_free);
        assert!(report.distance.is_infinite());

        let report = engine.min_distance(&empty, &cube, &Isometry3::identity());
        assert!(report.is_free);
    }
}
