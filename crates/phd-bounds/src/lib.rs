#![warn(missing_docs)]

//! Guaranteed bounds on the one-sided Pompeiu-Hausdorff distance between
//! two triangle meshes.
//!
//! `h(A, B) = max over a in A of min over b in B of |a - b|`, taken over the
//! continuous surfaces. The lower bound is the largest exact distance of any
//! source vertex; the upper bound comes from a cascade of per-triangle bounds.
//! Faces of A whose upper bound can still exceed the lower bound are split
//! 1-to-4 until the gap falls to `tolerance`, measured relative to the
//! diagonal of A's bounding box unless normalisation is off.
//!
//! # Example
//!
//! ```
//! use phd_bounds::{compute_bounds, BoundSettings};
//! use phd_math::TriMesh;
//!
//! let a = TriMesh::from_rows(
//!     &[[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0]],
//!     &[[0, 1, 2]],
//! );
//! let b = TriMesh::from_rows(
//!     &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
//!     &[[0, 1, 2]],
//! );
//! let report = compute_bounds(&a, &b, &BoundSettings::default()).unwrap();
//! assert!(report.is_converged());
//! assert!(report.lower <= 1.0 && 1.0 <= report.upper);
//! ```

pub mod bisector;
pub mod cascade;
pub mod engine;
pub mod error;
pub mod kang;
pub mod lower;
pub mod mesh;
pub mod queue;
pub mod report;
pub mod subdivide;

pub use cascade::{bound_faces, bound_triangle, BoundTag, CascadeStats, TriangleBound};
pub use engine::{BoundsEngine, StepOutcome};
pub use error::{BoundsError, ResourceKind, Result};
pub use lower::{LowerBound, LowerWitness};
pub use mesh::{midpoint_split, AugmentedMesh, Ceilings, TriangleSample};
pub use queue::{QueueEntry, RefinementQueue};
pub use report::{BoundsReport, ConvergenceStatus};
pub use subdivide::{subdivide, Subdivision};

use std::time::Instant;

use phd_math::TriMesh;
use phd_oracle::AabbTree;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Parameters of a bound computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundSettings {
    /// Stop once `upper - lower <= tolerance * diagonal`.
    pub tolerance: f64,
    /// Ceiling on refined-mesh growth, as a multiple of A's row counts.
    pub max_factor: f64,
    /// Measure `tolerance` against A's bounding-box diagonal instead of 1.
    pub normalize: bool,
}

impl Default for BoundSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-8,
            max_factor: 1e6,
            normalize: true,
        }
    }
}

impl BoundSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance >= 0.0) || !self.tolerance.is_finite() {
            return Err(BoundsError::invalid_input(
                "tolerance must be finite and non-negative",
            ));
        }
        if !(self.max_factor > 0.0) {
            return Err(BoundsError::invalid_input("max_factor must be positive"));
        }
        Ok(())
    }
}

/// Bound `h(A, B)` for source mesh `a` and target mesh `b`.
///
/// Builds an [`AabbTree`] over `b` and runs a [`BoundsEngine`] to
/// completion.
pub fn compute_bounds(a: &TriMesh, b: &TriMesh, settings: &BoundSettings) -> Result<BoundsReport> {
    settings.validate()?;

    let (tree, bvh_build_ms) = build_target_tree(b.clone())?;

    let mut engine = BoundsEngine::new(a, tree, settings)?;
    let mut report = engine.run()?;
    report.bvh_build_ms = bvh_build_ms;
    Ok(report)
}

/// Build the target tree, returning it with the build time in ms.
fn build_target_tree(target: TriMesh) -> Result<(AabbTree, f64)> {
    let started = Instant::now();
    let tree = AabbTree::build(target)
        .map_err(|source| BoundsError::InvalidMesh { mesh: "B", source })?;
    let bvh_build_ms = started.elapsed().as_secs_f64() * 1000.0;
    debug!("Target tree ready in {:.3} ms", bvh_build_ms);
    Ok((tree, bvh_build_ms))
}
