//! Error types for mesh loading.

use std::path::PathBuf;

use phd_math::MeshError;
use thiserror::Error;

/// Result type for mesh loading.
pub type IoResult<T> = Result<T, IoError>;

/// Errors that can occur while loading a mesh.
#[derive(Debug, Error)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// The OBJ reader rejected the input.
    #[error("OBJ error: {0}")]
    Obj(#[from] tobj::LoadError),

    /// A face with other than three corners.
    #[error("face {face} has {corners} corners; only triangles are supported")]
    NotTriangulated {
        /// Face index (0-based, in file order).
        face: usize,
        /// Corner count found.
        corners: usize,
    },

    /// The loaded mesh is empty or inconsistent.
    #[error("invalid mesh: {0}")]
    Mesh(#[from] MeshError),
}
