//! Error types for the bound engine.

use std::fmt;

use phd_math::MeshError;
use thiserror::Error;

/// Which augmented-mesh ceiling was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Vertex rows.
    Vertices,
    /// Face rows.
    Faces,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Vertices => write!(f, "vertices"),
            ResourceKind::Faces => write!(f, "faces"),
        }
    }
}

/// Errors that abort a bound computation.
///
/// Every variant is fatal: no partial result is produced. Running out of
/// queue entries before reaching the tolerance is not an error; it is
/// reported through [`crate::ConvergenceStatus::QueueExhausted`].
#[derive(Error, Debug)]
pub enum BoundsError {
    /// Settings or inputs are unusable.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// One of the two meshes failed validation.
    #[error("invalid mesh {mesh}: {source}")]
    InvalidMesh {
        /// `"A"` (source) or `"B"` (target).
        mesh: &'static str,
        /// Validation failure.
        #[source]
        source: MeshError,
    },

    /// A bisector construction could not be carried out.
    #[error("geometry failure: {0}")]
    Geometry(String),

    /// The refined mesh would outgrow its `max_factor` ceiling.
    #[error("exceeded maximum number of {kind}: {requested} requested, limit is {limit}")]
    ResourceExceeded {
        /// Vertices or faces.
        kind: ResourceKind,
        /// Row count that was requested.
        requested: usize,
        /// Ceiling derived from `max_factor`.
        limit: usize,
    },
}

impl BoundsError {
    /// Create a geometry failure.
    pub fn geometry(message: impl Into<String>) -> Self {
        Self::Geometry(message.into())
    }

    /// Create an invalid-input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

/// Result type for bound computations.
pub type Result<T> = std::result::Result<T, BoundsError>;
