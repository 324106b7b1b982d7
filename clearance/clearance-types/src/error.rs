//! Error types for clearance certification.

use thiserror::Error;

/// Errors that can occur while preparing geometry or configuring a calculator.
///
/// Queries themselves never fail: degenerate inputs produce degenerate cubes.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClearanceError {
    /// Malformed geometry (e.g. a face referencing a missing vertex).
    #[error("invalid geometry: {reason}")]
    InvalidGeometry {
        /// Description of what's wrong.
        reason: String,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error.
        reason: String,
    },

    /// A known, permanent limitation of the engine.
    #[error("unsupported configuration: {reason}")]
    UnsupportedConfiguration {
        /// Which limitation was hit.
        reason: String,
    },

    /// Face index out of range for its vertex list.
    #[error("face {face} references vertex {index}, but only {vertex_count} vertices exist")]
    FaceIndexOutOfRange {
        /// Face position in the face list.
        face: usize,
        /// The offending vertex index.
        index: usize,
        /// Number of vertices available.
        vertex_count: usize,
    },
}

impl ClearanceError {
    /// Create an invalid geometry error.
    #[must_use]
    pub fn invalid_geometry(reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create an unsupported configuration error.
    #[must_use]
    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self::UnsupportedConfiguration {
            reason: reason.into(),
        }
    }

    /// Check if this is a configuration error.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidConfig { .. })
    }

    /// Check if this is a geometry error.
    #[must_use]
    pub fn is_geometry_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidGeometry { .. } | Self::FaceIndexOutOfRange { .. }
        )
    }

    /// Check if this error reports an unsupported configuration.
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedConfiguration { .. })
    }
}
