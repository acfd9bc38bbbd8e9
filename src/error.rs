//! Error types for geodex.
//!
//! A single error enum covers mesh construction and geodesic queries.

use thiserror::Error;

/// Result type alias using [`GeodesicError`].
pub type Result<T> = std::result::Result<T, GeodesicError>;

/// Errors that can occur while building meshes or tracing geodesics.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeodesicError {
    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face has duplicate vertex indices.
    #[error("face {face} is degenerate (has duplicate vertices)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// A directed edge is used by more than one face.
    #[error("edge ({v0}, {v1}) has more than two incident faces or inconsistent orientation")]
    NonManifoldEdge {
        /// First vertex of the edge.
        v0: usize,
        /// Second vertex of the edge.
        v1: usize,
    },

    /// A triangle could not be unfolded into the plane (zero area).
    #[error("face {face} cannot be unfolded: degenerate triangle")]
    GeometryDegenerate {
        /// The face being unfolded.
        face: usize,
    },

    /// A face location is out of range or has invalid barycentric coordinates.
    #[error("invalid face location on face {face}: {reason}")]
    InvalidFaceLocation {
        /// The face index of the location.
        face: usize,
        /// Why the location was rejected.
        reason: &'static str,
    },

    /// The target face cannot be reached from the source face.
    #[error("face {to} is not reachable from face {from}")]
    DisconnectedMesh {
        /// Source face index.
        from: usize,
        /// Target face index.
        to: usize,
    },

    /// Path straightening did not reach a fixed point.
    #[error("path straightening did not converge after {iterations} iterations")]
    NonConvergent {
        /// Number of iterations attempted.
        iterations: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl GeodesicError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        GeodesicError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Create an invalid face location error.
    pub(crate) fn location(face: usize, reason: &'static str) -> Self {
        GeodesicError::InvalidFaceLocation { face, reason }
    }
}
