//! Configuration-space state and certified cube types.
//!
//! Both types are 6-vectors laid out as three translation components followed
//! by three rotation components `(roll, pitch, yaw)`.

use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion, Vector3, Vector6};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A robot configuration: translation plus Euler rotation.
///
/// The rotation is applied about the robot's pivot, then the translation:
/// `p' = R·(p − c) + c + t`, where `R` is built from `(roll, pitch, yaw)` with
/// [`UnitQuaternion::from_euler_angles`].
///
/// # Example
///
/// ```
/// use clearance_types::State;
/// use nalgebra::Point3;
///
/// let state = State::new(1.0, 0.0, 0.0, 0.0, 0.0, std::f64::consts::FRAC_PI_2);
/// let pivot = Point3::new(1.0, 0.0, 0.0);
/// let tf = state.to_transform(&pivot);
///
/// // The pivot itself is only translated.
/// let moved = tf * pivot;
/// assert!((moved.x - 2.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct State(pub Vector6<f64>);

impl Default for State {
    fn default() -> Self {
        Self::identity()
    }
}

impl State {
    /// Create a state from its six components.
    #[must_use]
    pub fn new(tx: f64, ty: f64, tz: f64, roll: f64, pitch: f64, yaw: f64) -> Self {
        Self(Vector6::new(tx, ty, tz, roll, pitch, yaw))
    }

    /// The identity state (no translation, no rotation).
    #[must_use]
    pub fn identity() -> Self {
        Self(Vector6::zeros())
    }

    /// Create a pure translation.
    #[must_use]
    pub fn from_translation(translation: Vector3<f64>) -> Self {
        Self::new(translation.x, translation.y, translation.z, 0.0, 0.0, 0.0)
    }

    /// Translation component.
    #[must_use]
    pub fn translation(&self) -> Vector3<f64> {
        Vector3::new(self.0[0], self.0[1], self.0[2])
    }

    /// Euler angles `(roll, pitch, yaw)`.
    #[must_use]
    pub fn euler_angles(&self) -> (f64, f64, f64) {
        (self.0[3], self.0[4], self.0[5])
    }

    /// Rotation component as a unit quaternion.
    #[must_use]
    pub fn rotation(&self) -> UnitQuaternion<f64> {
        let (roll, pitch, yaw) = self.euler_angles();
        UnitQuaternion::from_euler_angles(roll, pitch, yaw)
    }

    /// Rigid transform of the robot for this state, rotating about `pivot`.
    #[must_use]
    pub fn to_transform(&self, pivot: &Point3<f64>) -> Isometry3<f64> {
        let rotation = self.rotation();
        let offset = pivot.coords + self.translation() - rotation * pivot.coords;
        Isometry3::from_parts(Translation3::from(offset), rotation)
    }

    /// Raw components.
    #[must_use]
    pub fn as_vector(&self) -> &Vector6<f64> {
        &self.0
    }
}

impl From<[f64; 6]> for State {
    fn from(v: [f64; 6]) -> Self {
        Self(Vector6::from(v))
    }
}

impl From<Vector6<f64>> for State {
    fn from(v: Vector6<f64>) -> Self {
        Self(v)
    }
}

/// Half-widths of a configuration-space box centered at a queried state.
///
/// Every component is non-negative. The pitch half-width is always half of
/// the roll/yaw half-width.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CertifiedCube(pub Vector6<f64>);

impl CertifiedCube {
    /// A cube with all half-widths zero (no certified region).
    #[must_use]
    pub fn degenerate() -> Self {
        Self(Vector6::zeros())
    }

    /// Build the cube for a joint scaling of the step maxima.
    ///
    /// Produces `(s·dtr, s·dtr, s·dtr, s·dalpha, s·dalpha/2, s·dalpha)`.
    #[must_use]
    pub fn from_scale(scale: f64, dtr: f64, dalpha: f64) -> Self {
        Self(Vector6::new(
            dtr * scale,
            dtr * scale,
            dtr * scale,
            dalpha * scale,
            dalpha / 2.0 * scale,
            dalpha * scale,
        ))
    }

    /// Translation half-widths.
    #[must_use]
    pub fn translation(&self) -> Vector3<f64> {
        Vector3::new(self.0[0], self.0[1], self.0[2])
    }

    /// Rotation half-widths `(roll, pitch, yaw)`.
    #[must_use]
    pub fn rotation(&self) -> Vector3<f64> {
        Vector3::new(self.0[3], self.0[4], self.0[5])
    }

    /// Check whether every half-width is zero.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.0.iter().all(|&w| w == 0.0)
    }

    /// Check whether `state` lies inside the box centered at `center`.
    #[must_use]
    pub fn contains(&self, center: &State, state: &State) -> bool {
        (state.0 - center.0)
            .iter()
            .zip(self.0.iter())
            .all(|(delta, half)| delta.abs() <= *half)
    }

    /// Raw components.
    #[must_use]
    pub fn as_vector(&self) -> &Vector6<f64> {
        &self.0
    }
}

impl Default for CertifiedCube {
    fn default() -> Self {
        Self::degenerate()
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_identity_transform() {
        let tf = State::identity().to_transform(&Point3::new(3.0, -1.0, 2.0));
        let p = Point3::new(0.5, 0.25, -4.0);
        let q = tf * p;
        assert_relative_eq!(q, p, epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_about_pivot() {
        let pivot = Point3::new(1.0, 0.0, 0.0);
        let state = State::new(0.0, 0.0, 0.0, 0.0, 0.0, FRAC_PI_2);
        let tf = state.to_transform(&pivot);

        // Pivot is fixed under pure rotation
        assert_relative_eq!(tf * pivot, pivot, epsilon = 1e-12);

        // (2,0,0) is one unit along +X from the pivot; yaw 90° sends it to +Y
        let q = tf * Point3::new(2.0, 0.0, 0.0);
        assert_relative_eq!(q, Point3::new(1.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_translation_then_rotation() {
        let pivot = Point3::origin();
        let state = State::new(0.0, 0.0, 5.0, PI, 0.0, 0.0);
        let tf = state.to_transform(&pivot);
        let q = tf * Point3::new(0.0, 1.0, 0.0);
        assert_relative_eq!(q, Point3::new(0.0, -1.0, 5.0), epsilon = 1e-12);
    }

    #[test]
    fn test_state_accessors() {
        let state = State::from([1.0, 2.0, 3.0, 0.1, 0.2, 0.3]);
        assert_eq!(state.translation(), Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(state.euler_angles(), (0.1, 0.2, 0.3));
        assert_eq!(State::default(), State::identity());
    }

    #[test]
    fn test_cube_from_scale() {
        let cube = CertifiedCube::from_scale(0.5, 2.0, PI);
        assert_eq!(cube.translation(), Vector3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(cube.0[3], PI / 2.0, epsilon = 1e-15);
        assert_relative_eq!(cube.0[4], PI / 4.0, epsilon = 1e-15);
        assert_relative_eq!(cube.0[5], PI / 2.0, epsilon = 1e-15);
    }

    #[test]
    fn test_cube_pitch_is_half() {
        for scale in [0.0, 0.1, 0.37, 1.0] {
            let cube = CertifiedCube::from_scale(scale, 1.0, 0.8);
            assert_eq!(cube.0[4] * 2.0, cube.0[3]);
        }
    }

    #[test]
    fn test_degenerate_cube() {
        assert!(CertifiedCube::degenerate().is_degenerate());
        assert!(CertifiedCube::from_scale(0.0, 1.0, 1.0).is_degenerate());
        assert!(!CertifiedCube::from_scale(1e-9, 1.0, 1.0).is_degenerate());
    }

    #[test]
    fn test_cube_contains() {
        let cube = CertifiedCube::from_scale(1.0, 0.5, 0.2);
        let center = State::new(1.0, 1.0, 1.0, 0.0, 0.0, 0.0);

        assert!(cube.contains(&center, &center));
        assert!(cube.contains(&center, &State::new(1.4, 0.6, 1.0, 0.2, -0.1, 0.0)));
        assert!(!cube.contains(&center, &State::new(1.6, 1.0, 1.0, 0.0, 0.0, 0.0)));
        // Pitch half-width is 0.1
        assert!(!cube.contains(&center, &State::new(1.0, 1.0, 1.0, 0.0, 0.15, 0.0)));
    }
}
