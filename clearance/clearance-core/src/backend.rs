//! Pluggable proximity backends.
//!
//! A [`ProximityBackend`] prepares geometry once and then answers distance
//! and penetration queries for a posed robot against a fixed environment.
//! [`BvhBackend`] is the AABB-tree implementation used by default.

use clearance_types::{ClearanceConfig, ClearanceError, Result, RobotDecompositionPolicy};
use nalgebra::Isometry3;
use tracing::{debug, warn};

use crate::distance::{DistanceEngine, DistanceReport};
use crate::geometry::GeometryModel;
use crate::penetration::{PenetrationEngine, PenetrationReport};
use crate::prepared::PreparedBody;

/// Which side of a query a body is prepared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyRole {
    /// The moving body.
    Robot,
    /// The static obstacles.
    Environment,
}

/// Geometry preparation plus distance and penetration queries.
pub trait ProximityBackend: Send + Sync {
    /// Prepared per-body geometry.
    type Prepared: Send + Sync;

    /// Prepare `model` for queries in the given role.
    ///
    /// # Errors
    ///
    /// Implementations reject configurations they cannot serve.
    fn prepare(&self, model: GeometryModel, role: BodyRole, config: &ClearanceConfig) -> Result<Self::Prepared>;

    /// Source geometry of a prepared body.
    fn model<'a>(&self, prepared: &'a Self::Prepared) -> &'a GeometryModel;

    /// Distance of `robot` at `transform` from `env`, with penetration fallback.
    fn distance(&self, robot: &Self::Prepared, env: &Self::Prepared, transform: &Isometry3<f64>) -> DistanceReport;

    /// Penetration depth of `robot` at `transform` against `env`.
    fn penetration(
        &self,
        robot: &Self::Prepared,
        env: &Self::Prepared,
        transform: &Isometry3<f64>,
    ) -> PenetrationReport;
}

/// AABB-tree backend with GJK/EPA penetration.
#[derive(Debug, Clone, Copy, Default)]
pub struct BvhBackend {
    distance: DistanceEngine,
}

impl BvhBackend {
    /// Backend whose penetration strategy comes from `config`.
    #[must_use]
    pub fn from_config(config: &ClearanceConfig) -> Self {
        Self {
            distance: DistanceEngine::new(PenetrationEngine::new(config.penetration_strategy)),
        }
    }

    /// Distance engine in use.
    #[must_use]
    pub const fn distance_engine(&self) -> &DistanceEngine {
        &self.distance
    }
}

impl ProximityBackend for BvhBackend {
    type Prepared = PreparedBody;

    fn prepare(&self, model: GeometryModel, role: BodyRole, config: &ClearanceConfig) -> Result<PreparedBody> {
        if role == BodyRole::Robot && model.has_decomposition() {
            match config.robot_decomposition {
                RobotDecompositionPolicy::Reject => {
                    return Err(ClearanceError::unsupported(format!(
                        "robot convex decomposition with {} pieces",
                        model.pieces().len()
                    )));
                }
                RobotDecompositionPolicy::WarnAndUseHull => {
                    warn!(
                        pieces = model.pieces().len(),
                        "robot convex decomposition is not supported; using its whole convex hull"
                    );
                }
            }
        }

        let pivot = model.center();
        let mut body = PreparedBody::build(model, config.split_method, config.max_primitives_per_leaf);

        if role == BodyRole::Robot {
            let computed = body.hull().center();
            body.set_hull_center(pivot);
            debug!(computed = ?computed, pivot = ?pivot, "robot hull center moved to pivot");
        }

        debug!(
            role = ?role,
            faces = body.model().face_count(),
            pieces = body.piece_bvhs().len(),
            nodes = body.bvh().node_count(),
            "prepared body"
        );
        Ok(body)
    }

    fn model<'a>(&self, prepared: &'a PreparedBody) -> &'a GeometryModel {
        prepared.model()
    }

    fn distance(&self, robot: &PreparedBody, env: &PreparedBody, transform: &Isometry3<f64>) -> DistanceReport {
        self.distance.min_distance(robot, env, transform)
    }

    fn penetration(&self, robot: &PreparedBody, env: &PreparedBody, transform: &Isometry3<f64>) -> PenetrationReport {
        self.distance.penetration().penetration_depth(robot, env, transform)
    }
}
