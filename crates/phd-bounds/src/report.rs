//! Result record of a bound computation.

use serde::{Deserialize, Serialize};

use crate::cascade::CascadeStats;
use crate::lower::LowerWitness;

/// How the refinement loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvergenceStatus {
    /// `upper - lower` fell to the tolerance.
    Converged,
    /// No queued face remained while the gap was still above tolerance.
    /// The bounds are valid but looser than requested.
    QueueExhausted,
}

/// Bounds on the one-sided Hausdorff distance `h(A, B)` plus statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundsReport {
    /// Lower bound, the largest exact vertex distance found.
    pub lower: f64,
    /// Upper bound.
    pub upper: f64,
    /// Diagonal of the source bounding box, or `1` without normalisation.
    pub diagonal: f64,
    /// How the loop ended.
    pub status: ConvergenceStatus,
    /// Faces subdivided.
    pub iterations: usize,
    /// Popped entries whose bound had fallen below the lower bound.
    pub stale_discarded: usize,
    /// Vertex rows in the refined source mesh.
    pub vertex_count: usize,
    /// Face rows in the refined source mesh.
    pub face_count: usize,
    /// Time spent building the nearest-point structure (ms).
    pub bvh_build_ms: f64,
    /// Time spent computing bounds (ms).
    pub bounds_ms: f64,
    /// Vertex that realises the lower bound.
    pub witness: Option<LowerWitness>,
    /// Terminating cascade stage of every bounded triangle.
    pub cascade: CascadeStats,
}

impl BoundsReport {
    /// `upper - lower`.
    pub fn gap(&self) -> f64 {
        self.upper - self.lower
    }

    /// Lower bound divided by the diagonal.
    pub fn normalized_lower(&self) -> f64 {
        self.lower / self.diagonal
    }

    /// Upper bound divided by the diagonal.
    pub fn normalized_upper(&self) -> f64 {
        self.upper / self.diagonal
    }

    /// Whether the requested tolerance was reached.
    pub fn is_converged(&self) -> bool {
        self.status == ConvergenceStatus::Converged
    }
}
