//! Certified free-space cubes for a robot among obstacles.
//!
//! [`ClearanceCalculator`] owns the prepared robot and environment and turns
//! a configuration [`State`] into a [`CertifiedCube`]:
//!
//! 1. the state becomes a rigid transform about the robot pivot;
//! 2. the backend measures clearance (distance when free, penetration depth
//!    otherwise);
//! 3. [`CubeBoundSolver`] scales the configured steps so that no robot vertex
//!    can move further than that clearance.

use clearance_types::{CertifiedCube, ClearanceConfig, ClearanceError, Result, State};
use nalgebra::Isometry3;
use tracing::{info, warn};

use crate::backend::{BodyRole, BvhBackend, ProximityBackend};
use crate::bound::CubeBoundSolver;
use crate::geometry::GeometryModel;
use crate::penetration::PenetrationReport;

/// Outcome of [`ClearanceCalculator::certain_cube`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearanceQuery {
    /// Certified half-widths around the queried state.
    pub cube: CertifiedCube,
    /// Whether the robot is collision-free at the queried state.
    pub is_free: bool,
    /// Distance when free, penetration depth otherwise.
    pub value: f64,
    /// Environment piece the penetration depth came from, if any.
    pub piece: Option<usize>,
}

impl ClearanceQuery {
    /// Penetration depth when the robot is in collision.
    #[must_use]
    pub fn penetration_depth(&self) -> Option<f64> {
        (!self.is_free).then_some(self.value)
    }

    /// Whether any region was certified.
    #[must_use]
    pub fn has_certified_region(&self) -> bool {
        !self.cube.is_degenerate()
    }
}

/// Clearance and certified-cube queries for one robot and one environment.
///
/// Geometry is prepared once at construction. Queries take `&self` and can
/// run concurrently; changing tunables takes `&mut self`.
///
/// # Example
///
/// ```
/// use clearance_core::{geometry::box_mesh, ClearanceCalculator, GeometryModel};
/// use clearance_types::{ClearanceConfig, State};
/// use nalgebra::Point3;
///
/// let (v, f) = box_mesh(Point3::new(-0.5, -0.5, -0.5), Point3::new(0.5, 0.5, 0.5));
/// let robot = GeometryModel::new(v.clone(), f.clone(), Point3::origin()).unwrap();
/// let env = GeometryModel::new(v, f, Point3::origin()).unwrap();
///
/// let calc = ClearanceCalculator::new(robot, env, ClearanceConfig::default()).unwrap();
/// let query = calc.certain_cube(&State::new(3.0, 0.0, 0.0, 0.0, 0.0, 0.0));
/// assert!(query.is_free);
/// assert!(query.has_certified_region());
/// ```
pub struct ClearanceCalculator<B: ProximityBackend = BvhBackend> {
    backend: B,
    robot: B::Prepared,
    env: B::Prepared,
    config: ClearanceConfig,
    solver: CubeBoundSolver,
}

impl<B> std::fmt::Debug for ClearanceCalculator<B>
where
    B: ProximityBackend + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClearanceCalculator")
            .field("backend", &self.backend)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ClearanceCalculator<BvhBackend> {
    /// Build a calculator with the default BVH backend.
    ///
    /// # Errors
    ///
    /// Returns [`ClearanceError::InvalidConfig`] for an invalid `config`, or
    /// [`ClearanceError::UnsupportedConfiguration`] when the robot carries a
    /// convex decomposition under [`RobotDecompositionPolicy::Reject`].
    ///
    /// [`RobotDecompositionPolicy::Reject`]: clearance_types::RobotDecompositionPolicy::Reject
    pub fn new(robot: GeometryModel, env: GeometryModel, config: ClearanceConfig) -> Result<Self> {
        let backend = BvhBackend::from_config(&config);
        Self::with_backend(backend, robot, env, config)
    }
}

impl<B: ProximityBackend> ClearanceCalculator<B> {
    /// Build a calculator on a custom backend.
    ///
    /// # Errors
    ///
    /// Fails if `config` is invalid or the backend rejects either body.
    pub fn with_backend(backend: B, robot: GeometryModel, env: GeometryModel, config: ClearanceConfig) -> Result<Self> {
        config.validate()?;

        let robot_faces = robot.face_count();
        let env_faces = env.face_count();
        let env_pieces = env.pieces().len();

        let robot = backend.prepare(robot, BodyRole::Robot, &config)?;
        let env = backend.prepare(env, BodyRole::Environment, &config)?;

        info!(
            robot_faces,
            env_faces,
            env_pieces,
            dtr = config.dtr(),
            dalpha = config.dalpha,
            "clearance calculator ready"
        );

        Ok(Self {
            backend,
            robot,
            env,
            solver: CubeBoundSolver::from_config(&config),
            config,
        })
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &ClearanceConfig {
        &self.config
    }

    /// Backend in use.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Robot geometry.
    #[must_use]
    pub fn robot(&self) -> &GeometryModel {
        self.backend.model(&self.robot)
    }

    /// Environment geometry.
    #[must_use]
    pub fn environment(&self) -> &GeometryModel {
        self.backend.model(&self.env)
    }

    /// Rigid transform of the robot at `state`, rotating about its pivot.
    #[must_use]
    pub fn transform(&self, state: &State) -> Isometry3<f64> {
        state.to_transform(&self.robot().center())
    }

    /// Certified cube around `state`.
    ///
    /// A non-positive clearance (contact without measurable penetration)
    /// yields a degenerate cube: no region is certified there.
    #[must_use]
    pub fn certain_cube(&self, state: &State) -> ClearanceQuery {
        let transform = self.transform(state);
        let report = self.backend.distance(&self.robot, &self.env, &transform);

        let cube = if report.value <= 0.0 {
            warn!(
                state = ?state.as_vector().as_slice(),
                distance = report.distance,
                "distance and penetration queries both failed"
            );
            CertifiedCube::degenerate()
        } else {
            self.solver.bound(report.value, self.robot(), &transform)
        };

        ClearanceQuery {
            cube,
            is_free: report.is_free,
            value: report.value,
            piece: report.piece,
        }
    }

    /// Penetration depth of the robot at `state`, without a distance query.
    #[must_use]
    pub fn penetration_depth(&self, state: &State) -> PenetrationReport {
        let transform = self.transform(state);
        self.backend.penetration(&self.robot, &self.env, &transform)
    }

    /// Certified cube for a known clearance `d` at `transform`.
    #[must_use]
    pub fn bound(&self, d: f64, transform: &Isometry3<f64>) -> CertifiedCube {
        self.solver.bound(d, self.robot(), transform)
    }

    /// Change the translation range; the half-width becomes `(max - min) / 2`.
    ///
    /// # Errors
    ///
    /// Returns [`ClearanceError::InvalidConfig`] and leaves the calculator
    /// unchanged if the range is invalid.
    pub fn set_translation_range(&mut self, min: f64, max: f64) -> Result<()> {
        let config = self.config.clone().translation_range(min, max);
        self.reconfigure(config)
    }

    /// Change the maximum rotation half-width.
    ///
    /// # Errors
    ///
    /// Returns [`ClearanceError::InvalidConfig`] for a negative or non-finite value.
    pub fn set_dalpha(&mut self, dalpha: f64) -> Result<()> {
        let config = self.config.clone().dalpha(dalpha);
        self.reconfigure(config)
    }

    /// Replace the configuration for subsequent queries.
    ///
    /// # Errors
    ///
    /// Returns [`ClearanceError::InvalidConfig`] for an invalid configuration,
    /// or one that changes how geometry was prepared (split method, leaf
    /// size, penetration strategy, robot decomposition policy).
    pub fn reconfigure(&mut self, config: ClearanceConfig) -> Result<()> {
        config.validate()?;
        if !self.config.same_preparation(&config) {
            return Err(ClearanceError::invalid_config(
                "split method, leaf size, penetration strategy and robot decomposition \
                 are fixed at construction",
            ));
        }

        self.solver = CubeBoundSolver::from_config(&config);
        self.config = config;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::geometry::box_mesh;
    use approx::assert_relative_eq;
    use clearance_types::SplitMethod;
    use nalgebra::Point3;
    use std::f64::consts::PI;

    fn centered_cube() -> GeometryModel {
        let (v, f) = box_mesh(Point3::new(-0.5, -0.5, -0.5), Point3::new(0.5, 0.5, 0.5));
        GeometryModel::new(v, f, Point3::origin()).unwrap()
    }

    fn calculator() -> ClearanceCalculator {
        ClearanceCalculator::new(centered_cube(), centered_cube(), ClearanceConfig::default()).unwrap()
    }

    #[test]
    fn test_free_query() {
        let calc = calculator();
        let query = calc.certain_cube(&State::new(3.0, 0.0, 0.0, 0.0, 0.0, 0.0));

        assert!(query.is_free);
        assert_relative_eq!(query.value, 2.0, epsilon = 1e-9);
        assert_eq!(query.penetration_depth(), None);
        assert!(query.has_certified_region());
    }

    #[test]
    fn test_colliding_query() {
        let calc = calculator();
        let query = calc.certain_cube(&State::new(0.25, 0.0, 0.0, 0.0, 0.0, 0.0));

        assert!(!query.is_free);
        assert_relative_eq!(query.penetration_depth().unwrap(), 0.75, epsilon = 1e-6);

        let report = calc.penetration_depth(&State::new(0.25, 0.0, 0.0, 0.0, 0.0, 0.0));
        assert_relative_eq!(report.depth, 0.75, epsilon = 1e-6);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ClearanceConfig::default().dalpha(-1.0);
        let err = ClearanceCalculator::new(centered_cube(), centered_cube(), config).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_set_translation_range() {
        let mut calc = calculator();
        let state = State::new(3.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        let before = calc.certain_cube(&state);

        calc.set_translation_range(-0.1, 0.1).unwrap();
        assert_relative_eq!(calc.config().dtr(), 0.1);
        let after = calc.certain_cube(&state);
        assert!(after.cube.as_vector()[0] <= 0.1);
        assert!(after.cube.as_vector()[3] >= before.cube.as_vector()[3]);

        assert!(calc.set_translation_range(1.0, 1.0).is_err());
        // Failed update keeps the previous range
        assert_relative_eq!(calc.config().dtr(), 0.1);
    }

    #[test]
    fn test_set_dalpha() {
        let mut calc = calculator();
        calc.set_dalpha(PI / 4.0).unwrap();
        assert_eq!(calc.config().dalpha, PI / 4.0);

        let query = calc.certain_cube(&State::new(3.0, 0.0, 0.0, 0.0, 0.0, 0.0));
        assert!(query.cube.as_vector()[3] <= PI / 4.0);
        assert!(calc.set_dalpha(f64::NAN).is_err());
    }

    #[test]
    fn test_reconfigure_rejects_rebuild() {
        let mut calc = calculator();
        let config = calc.config().clone().split_method(SplitMethod::Mean);
        let err = calc.reconfigure(config).unwrap_err();
        assert!(err.is_config_error());

        let config = calc.config().clone().translation_range(0.0, 4.0);
        calc.reconfigure(config).unwrap();
        assert_relative_eq!(calc.config().dtr(), 2.0);
    }

    #[test]
    fn test_bound_matches_query() {
        let calc = calculator();
        let state = State::new(0.0, 4.0, 0.0, 0.3, -0.2, 0.1);
        let query = calc.certain_cube(&state);
        let cube = calc.bound(query.value, &calc.transform(&state));
        assert_eq!(cube, query.cube);
    }
}
