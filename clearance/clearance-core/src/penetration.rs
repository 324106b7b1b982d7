//! Penetration depth between a posed robot and the environment.
//!
//! With the default [`PenetrationStrategy::PiecewiseGjk`], the robot's convex
//! hull is tested against every environment convex piece with GJK/EPA and the
//! deepest piece wins. Convex decomposition can make pieces of two colliding
//! bodies individually disjoint, so a zero depth is a valid answer even when
//! the meshes touch.
//!
//! [`PenetrationStrategy::PieceBvh`] first walks the robot mesh BVH against
//! each environment piece BVH with exact triangle-triangle tests, and only
//! measures (with GJK/EPA) the pieces whose surfaces actually touch the robot
//! mesh. Pieces that only overlap the robot's hull, such as a piece sitting in
//! a concavity of the robot, report no penetration. Triangles alone cannot
//! measure depth: a flat triangle has zero extent along its own normal.

use clearance_types::PenetrationStrategy;
use nalgebra::Isometry3;
use tracing::debug;

use crate::bvh::Bvh;
use crate::gjk_epa;
use crate::prepared::PreparedBody;
use crate::triangle::{triangles_intersect, TrianglePoints};

/// Result of a penetration query.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PenetrationReport {
    /// Penetration depth, `0` when nothing overlaps.
    pub depth: f64,
    /// Environment convex piece with the deepest overlap, if pieces were scanned
    /// and one overlapped.
    pub piece: Option<usize>,
}

impl PenetrationReport {
    /// A report with no overlap.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            depth: 0.0,
            piece: None,
        }
    }

    /// Whether any overlap was found.
    #[must_use]
    pub fn is_penetrating(&self) -> bool {
        self.depth > 0.0
    }
}

/// Narrow-phase penetration engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct PenetrationEngine {
    strategy: PenetrationStrategy,
}

impl PenetrationEngine {
    /// Create an engine using `strategy`.
    #[must_use]
    pub const fn new(strategy: PenetrationStrategy) -> Self {
        Self { strategy }
    }

    /// Strategy in use.
    #[must_use]
    pub const fn strategy(&self) -> PenetrationStrategy {
        self.strategy
    }

    /// Penetration depth of `robot` placed at `transform` against `env`.
    ///
    /// The environment is at the identity.
    #[must_use]
    pub fn penetration_depth(
        &self,
        robot: &PreparedBody,
        env: &PreparedBody,
        transform: &Isometry3<f64>,
    ) -> PenetrationReport {
        match self.strategy {
            PenetrationStrategy::PiecewiseGjk => Self::piecewise_gjk(robot, env, transform),
            PenetrationStrategy::PieceBvh => Self::piece_bvh(robot, env, transform),
        }
    }

    fn piecewise_gjk(robot: &PreparedBody, env: &PreparedBody, transform: &Isometry3<f64>) -> PenetrationReport {
        let identity = Isometry3::identity();

        if env.piece_hulls().is_empty() {
            let depth = gjk_epa::penetration_depth(robot.hull(), transform, env.hull(), &identity);
            return PenetrationReport { depth, piece: None };
        }

        let report = deepest(env.piece_hulls().iter().map(|piece| {
            gjk_epa::penetration_depth(robot.hull(), transform, piece, &identity)
        }));
        debug!(piece = ?report.piece, depth = report.depth, "deepest penetration");
        report
    }

    fn piece_bvh(robot: &PreparedBody, env: &PreparedBody, transform: &Isometry3<f64>) -> PenetrationReport {
        let identity = Isometry3::identity();

        if env.piece_bvhs().is_empty() {
            if !surfaces_touch(env.bvh(), robot, transform, |face| env.triangle(face)) {
                return PenetrationReport::none();
            }
            let depth = gjk_epa::penetration_depth(robot.hull(), transform, env.hull(), &identity);
            return PenetrationReport { depth, piece: None };
        }

        let report = deepest(env.piece_bvhs().iter().zip(env.piece_hulls()).enumerate().map(
            |(i, (piece_bvh, piece_hull))| {
                if surfaces_touch(piece_bvh, robot, transform, |face| env.piece_triangle(i, face)) {
                    gjk_epa::penetration_depth(robot.hull(), transform, piece_hull, &identity)
                } else {
                    0.0
                }
            },
        ));
        debug!(piece = ?report.piece, depth = report.depth, "deepest penetration");
        report
    }
}

/// Deepest of a sequence of per-piece depths. Ties keep the earlier piece.
fn deepest(depths: impl Iterator<Item = f64>) -> PenetrationReport {
    depths
        .enumerate()
        .fold(PenetrationReport::none(), |best, (i, depth)| {
            if depth > best.depth {
                PenetrationReport {
                    depth,
                    piece: Some(i),
                }
            } else {
                best
            }
        })
}

/// Whether any triangle of `env_bvh` intersects the posed robot mesh.
fn surfaces_touch<F>(env_bvh: &Bvh, robot: &PreparedBody, transform: &Isometry3<f64>, env_triangle: F) -> bool
where
    F: Fn(usize) -> Option<TrianglePoints>,
{
    env_bvh
        .query_pairs(robot.bvh(), transform)
        .into_iter()
        .any(|(env_face, robot_face)| {
            match (env_triangle(env_face), robot.triangle(robot_face)) {
                (Some(env_tri), Some(robot_tri)) => {
                    triangles_intersect(&env_tri, &robot_tri.map(|p| transform * p))
                }
                _ => false,
            }
        })
}
