//! Clearance certification engine.
//!
//! Given a rigid robot and a static environment, this crate certifies a box
//! of configurations around a sampled pose: either a region guaranteed to be
//! collision-free, or, when the robot already overlaps the environment, a
//! region sized by how deep it penetrates. It builds on [`clearance_types`]
//! for the data structures.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   ClearanceCalculator                        │
//! │  State → transform → clearance → CertifiedCube              │
//! └──────────────┬──────────────────────────────┬───────────────┘
//!                │                              │
//!                ▼                              ▼
//! ┌─────────────────────────────┐ ┌─────────────────────────────┐
//! │  ProximityBackend (BVH)     │ │  CubeBoundSolver             │
//! │  DistanceEngine             │ │  bisection on               │
//! │   └─ PenetrationEngine      │ │  2.5·r·dα + √3·dx ≤ d        │
//! │       (GJK/EPA)             │ │                              │
//! └─────────────────────────────┘ └─────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use clearance_core::{geometry::box_mesh, ClearanceCalculator, GeometryModel};
//! use clearance_types::{ClearanceConfig, State};
//! use nalgebra::Point3;
//!
//! // Unit cube robot rotating about its center
//! let (v, f) = box_mesh(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
//! let robot = GeometryModel::new(v.clone(), f.clone(), Point3::new(0.5, 0.5, 0.5)).unwrap();
//! let env = GeometryModel::new(v, f, Point3::new(0.5, 0.5, 0.5)).unwrap();
//!
//! let calc = ClearanceCalculator::new(robot, env, ClearanceConfig::default()).unwrap();
//!
//! // Ten units away: free, with a positive certified cube
//! let free = calc.certain_cube(&State::new(10.0, 0.0, 0.0, 0.0, 0.0, 0.0));
//! assert!(free.is_free);
//! assert!(free.cube.as_vector().iter().all(|&w| w > 0.0));
//!
//! // Same pose: overlapping by one unit
//! let hit = calc.certain_cube(&State::identity());
//! assert!(!hit.is_free);
//! assert!((hit.penetration_depth().unwrap() - 1.0).abs() < 1e-3);
//! ```
//!
//! # Concurrency
//!
//! Geometry is prepared once at construction. [`ClearanceCalculator`] is
//! `Send + Sync`; `certain_cube` takes `&self` and allocates its scratch
//! state per call. Tunables change through `&mut self` only.

#![doc(html_root_url = "https://docs.rs/clearance-core/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,     // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,          // mul_add style changes aren't always clearer
    clippy::missing_errors_doc,        // Error docs added where non-obvious
)]

pub mod aabb;
pub mod backend;
pub mod bound;
pub mod bvh;
mod calculator;
pub mod convex;
pub mod distance;
pub mod geometry;
pub mod gjk_epa;
pub mod penetration;
mod prepared;
pub mod triangle;

pub use aabb::{Aabb, Axis};
pub use backend::{BodyRole, BvhBackend, ProximityBackend};
pub use bound::CubeBoundSolver;
pub use bvh::{bvh_from_triangle_mesh, Bvh, BvhPrimitive};
pub use calculator::{ClearanceCalculator, ClearanceQuery};
pub use convex::{ConvexAdapter, ConvexHull};
pub use distance::{DistanceEngine, DistanceReport};
pub use geometry::{ConvexPiece, Face, GeometryModel};
pub use penetration::{PenetrationEngine, PenetrationReport};
pub use prepared::PreparedBody;

// Re-export key types from clearance-types for convenience
pub use clearance_types::{
    CertifiedCube, ClearanceConfig, ClearanceError, PenetrationStrategy, Result,
    RobotDecompositionPolicy, SplitMethod, State,
};
