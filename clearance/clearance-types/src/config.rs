//! Configuration types for clearance certification.
//!
//! A [`ClearanceConfig`] is an immutable snapshot of the tunables a calculator
//! reads on every query (translation/rotation step maxima) plus the settings
//! that are resolved once at construction (BVH split strategy, penetration
//! strategy, robot decomposition policy).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for a clearance calculator.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClearanceConfig {
    /// Lower end of the translation range.
    pub translation_min: f64,
    /// Upper end of the translation range.
    pub translation_max: f64,
    /// Maximum rotation half-width (radians).
    pub dalpha: f64,
    /// How BVH nodes are partitioned during construction.
    pub split_method: SplitMethod,
    /// Which narrow-phase path measures penetration depth.
    pub penetration_strategy: PenetrationStrategy,
    /// What to do when the robot carries a convex decomposition.
    pub robot_decomposition: RobotDecompositionPolicy,
    /// Maximum number of faces stored in one BVH leaf.
    pub max_primitives_per_leaf: usize,
}

impl Default for ClearanceConfig {
    fn default() -> Self {
        Self {
            translation_min: -1.0,
            translation_max: 1.0,
            dalpha: std::f64::consts::PI,
            split_method: SplitMethod::default(),
            penetration_strategy: PenetrationStrategy::default(),
            robot_decomposition: RobotDecompositionPolicy::default(),
            max_primitives_per_leaf: 1,
        }
    }
}

impl ClearanceConfig {
    /// Create a configuration with the given translation range.
    ///
    /// The translation half-width becomes `(max - min) / 2`.
    #[must_use]
    pub fn with_translation_range(min: f64, max: f64) -> Self {
        Self {
            translation_min: min,
            translation_max: max,
            ..Default::default()
        }
    }

    /// Set the translation range.
    #[must_use]
    pub fn translation_range(mut self, min: f64, max: f64) -> Self {
        self.translation_min = min;
        self.translation_max = max;
        self
    }

    /// Set the rotation half-range.
    #[must_use]
    pub fn dalpha(mut self, dalpha: f64) -> Self {
        self.dalpha = dalpha;
        self
    }

    /// Set the BVH split method.
    #[must_use]
    pub fn split_method(mut self, method: SplitMethod) -> Self {
        self.split_method = method;
        self
    }

    /// Set the penetration strategy.
    #[must_use]
    pub fn penetration_strategy(mut self, strategy: PenetrationStrategy) -> Self {
        self.penetration_strategy = strategy;
        self
    }

    /// Set the robot decomposition policy.
    #[must_use]
    pub fn robot_decomposition(mut self, policy: RobotDecompositionPolicy) -> Self {
        self.robot_decomposition = policy;
        self
    }

    /// Set the maximum number of faces per BVH leaf.
    #[must_use]
    pub fn max_primitives_per_leaf(mut self, max: usize) -> Self {
        self.max_primitives_per_leaf = max;
        self
    }

    /// Translation half-width, `(max - min) / 2`.
    #[must_use]
    pub fn dtr(&self) -> f64 {
        (self.translation_max - self.translation_min) / 2.0
    }

    /// Check whether `other` can replace `self` without rebuilding geometry.
    ///
    /// Only the translation range and `dalpha` are read per query; every
    /// other field is baked into the prepared BVHs and hulls.
    #[must_use]
    pub fn same_preparation(&self, other: &Self) -> bool {
        self.split_method == other.split_method
            && self.penetration_strategy == other.penetration_strategy
            && self.robot_decomposition == other.robot_decomposition
            && self.max_primitives_per_leaf == other.max_primitives_per_leaf
    }

    /// Validate the configuration.
    pub fn validate(&self) -> crate::Result<()> {
        if !self.translation_min.is_finite() || !self.translation_max.is_finite() {
            return Err(crate::ClearanceError::invalid_config(
                "translation range must be finite",
            ));
        }

        if self.translation_max <= self.translation_min {
            return Err(crate::ClearanceError::invalid_config(format!(
                "translation max ({}) must exceed min ({})",
                self.translation_max, self.translation_min
            )));
        }

        if !self.dalpha.is_finite() || self.dalpha < 0.0 {
            return Err(crate::ClearanceError::invalid_config(
                "dalpha must be finite and non-negative",
            ));
        }

        if self.max_primitives_per_leaf == 0 {
            return Err(crate::ClearanceError::invalid_config(
                "max_primitives_per_leaf must be at least 1",
            ));
        }

        Ok(())
    }
}

/// Strategy for partitioning primitives when building a BVH node.
///
/// All strategies split along the longest axis of the node bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SplitMethod {
    /// Split at the median centroid (balanced tree).
    #[default]
    Median,
    /// Split at the mean centroid coordinate.
    Mean,
    /// Split at the midpoint of the node's bounds.
    BoundsCenter,
}

impl std::fmt::Display for SplitMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Median => write!(f, "median"),
            Self::Mean => write!(f, "mean"),
            Self::BoundsCenter => write!(f, "bounds-center"),
        }
    }
}

/// How penetration depth is measured once bodies are known to overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PenetrationStrategy {
    /// GJK/EPA between the robot hull and each environment convex piece.
    #[default]
    PiecewiseGjk,
    /// GJK/EPA only for pieces whose mesh touches the robot mesh, found by
    /// walking the robot mesh BVH against each piece BVH.
    PieceBvh,
}

impl std::fmt::Display for PenetrationStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PiecewiseGjk => write!(f, "piecewise GJK"),
            Self::PieceBvh => write!(f, "piece BVH"),
        }
    }
}

/// Policy for a robot that carries its own convex decomposition.
///
/// Penetration queries only ever use the robot's single convex hull.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RobotDecompositionPolicy {
    /// Accept the robot, log a warning, and query its whole hull.
    #[default]
    WarnAndUseHull,
    /// Refuse to build a calculator for such a robot.
    Reject,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_config() {
        let config = ClearanceConfig::default();
        assert!(config.validate().is_ok());
        assert_relative_eq!(config.dtr(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(config.dalpha, std::f64::consts::PI, epsilon = 1e-12);
        assert_eq!(config.split_method, SplitMethod::Median);
        assert_eq!(config.penetration_strategy, PenetrationStrategy::PiecewiseGjk);
    }

    #[test]
    fn test_dtr_from_range() {
        let config = ClearanceConfig::with_translation_range(2.0, 5.0);
        assert_relative_eq!(config.dtr(), 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_config_builder() {
        let config = ClearanceConfig::default()
            .translation_range(0.0, 0.5)
            .dalpha(0.25)
            .split_method(SplitMethod::Mean)
            .penetration_strategy(PenetrationStrategy::PieceBvh)
            .robot_decomposition(RobotDecompositionPolicy::Reject)
            .max_primitives_per_leaf(4);

        assert_relative_eq!(config.dtr(), 0.25, epsilon = 1e-12);
        assert_relative_eq!(config.dalpha, 0.25, epsilon = 1e-12);
        assert_eq!(config.split_method, SplitMethod::Mean);
        assert_eq!(config.max_primitives_per_leaf, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ClearanceConfig::default();
        assert!(config.validate().is_ok());

        config.translation_max = config.translation_min;
        assert!(config.validate().is_err());

        config = ClearanceConfig::default().dalpha(f64::NAN);
        assert!(config.validate().is_err());

        config = ClearanceConfig::default().dalpha(-0.1);
        assert!(config.validate().is_err());

        config = ClearanceConfig::default().max_primitives_per_leaf(0);
        let err = config.validate().unwrap_err();
        assert!(err.is_config_error());

        config = ClearanceConfig::default().translation_range(f64::NEG_INFINITY, 0.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_same_preparation() {
        let base = ClearanceConfig::default();
        let retuned = base.clone().translation_range(0.0, 4.0).dalpha(0.1);
        assert!(base.same_preparation(&retuned));

        let rebuilt = base.clone().split_method(SplitMethod::BoundsCenter);
        assert!(!base.same_preparation(&rebuilt));
    }
}
