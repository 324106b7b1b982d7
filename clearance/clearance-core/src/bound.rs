//! Conversion of a clearance magnitude into a certified cube.
//!
//! A vertex at distance `r` from the pivot moves at most
//! `2.5·r·dα + √3·dx` when the body is translated by at most `dx` per axis
//! and rotated by at most `dα` per Euler angle. The solver scales both steps
//! by a common factor `s ∈ [0, 1]` and finds, by bisection, the largest `s`
//! for which every robot vertex stays within the clearance `d`.

use clearance_types::{CertifiedCube, ClearanceConfig};
use nalgebra::Isometry3;

use crate::geometry::GeometryModel;

/// Bisection stops once the bracket is this narrow.
pub const BISECTION_TOLERANCE: f64 = 1e-6;

/// Arc-length factor of the rotation term.
pub const ROTATION_FACTOR: f64 = 2.5;

/// `√3`, the diagonal factor of the translation term.
pub const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Bisection solver for the certified scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeBoundSolver {
    dtr: f64,
    dalpha: f64,
}

impl CubeBoundSolver {
    /// Solver for a maximum translation half-width `dtr` and rotation half-width `dalpha`.
    #[must_use]
    pub const fn new(dtr: f64, dalpha: f64) -> Self {
        Self { dtr, dalpha }
    }

    /// Solver for the steps in `config`.
    #[must_use]
    pub fn from_config(config: &ClearanceConfig) -> Self {
        Self::new(config.dtr(), config.dalpha)
    }

    /// Maximum translation half-width.
    #[must_use]
    pub const fn dtr(&self) -> f64 {
        self.dtr
    }

    /// Maximum rotation half-width.
    #[must_use]
    pub const fn dalpha(&self) -> f64 {
        self.dalpha
    }

    /// Worst-case displacement of a point at radius `r` for steps `dx`, `dalpha`.
    #[must_use]
    pub fn displacement_bound(r: f64, dx: f64, dalpha: f64) -> f64 {
        ROTATION_FACTOR * r * dalpha + SQRT_3 * dx
    }

    /// Largest `s ∈ [0, 1]` with `displacement_bound(r, s·max_dx, s·max_dalpha) ≤ d`.
    ///
    /// Returns `0` for `d ≤ 0`. An exact hit on a midpoint returns that
    /// midpoint; otherwise the lower end of the converged bracket is
    /// returned, so the result never overshoots.
    #[must_use]
    pub fn binsolve(max_dx: f64, max_dalpha: f64, r: f64, d: f64) -> f64 {
        if d <= 0.0 {
            return 0.0;
        }

        let mut lower = 0.0;
        let mut upper = 1.0;
        while upper - lower > BISECTION_TOLERANCE {
            let mid = (upper + lower) / 2.0;
            let value = Self::displacement_bound(r, max_dx * mid, max_dalpha * mid);
            if value > d {
                upper = mid;
            } else if value < d {
                lower = mid;
            } else {
                return mid;
            }
        }
        lower
    }

    /// Certified scaling for the robot at `transform`: the minimum over all
    /// vertices, starting from `1`.
    #[must_use]
    pub fn scale(&self, d: f64, robot: &GeometryModel, transform: &Isometry3<f64>) -> f64 {
        let pivot = transform * robot.center();
        robot.vertices().iter().fold(1.0, |scale: f64, v| {
            let r = (transform * v - pivot).norm();
            scale.min(Self::binsolve(self.dtr, self.dalpha, r, d))
        })
    }

    /// Certified cube for clearance `d` with the robot at `transform`.
    #[must_use]
    pub fn bound(&self, d: f64, robot: &GeometryModel, transform: &Isometry3<f64>) -> CertifiedCube {
        CertifiedCube::from_scale(self.scale(d, robot, transform), self.dtr, self.dalpha)
    }
}
