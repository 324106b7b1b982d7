//! Core types for clearance certification.
//!
//! This crate provides the data shared between the certification engine and
//! its callers (typically a sampling-based motion planner):
//!
//! - [`State`] - A 6-DoF robot configuration (translation + Euler rotation)
//! - [`CertifiedCube`] - Half-widths of a certified configuration-space box
//! - [`ClearanceConfig`] - Step maxima and construction-time strategies
//! - [`ClearanceError`] - Construction and configuration errors
//!
//! # Design Philosophy
//!
//! These types are **pure data**. Geometry, distance queries and the bound
//! solver live in `clearance-core`.
//!
//! # Example
//!
//! ```
//! use clearance_types::{CertifiedCube, ClearanceConfig, State};
//!
//! let config = ClearanceConfig::with_translation_range(-2.0, 2.0).dalpha(0.5);
//! assert!(config.validate().is_ok());
//!
//! let cube = CertifiedCube::from_scale(0.5, config.dtr(), config.dalpha);
//! let center = State::identity();
//! assert!(cube.contains(&center, &State::new(0.9, 0.0, 0.0, 0.0, 0.0, 0.0)));
//! ```

#![doc(html_root_url = "https://docs.rs/clearance-types/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,     // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,          // mul_add style changes aren't always clearer
    clippy::missing_errors_doc,        // Error docs added where non-obvious
)]

mod config;
mod error;
mod state;

pub use config::{ClearanceConfig, PenetrationStrategy, RobotDecompositionPolicy, SplitMethod};
pub use error::ClearanceError;
pub use state::{CertifiedCube, State};

// Re-export math types for convenience
pub use nalgebra::{Isometry3, Point3, UnitQuaternion, Vector3, Vector6};

/// Result type for clearance operations.
pub type Result<T> = std::result::Result<T, ClearanceError>;
