//! Running lower bound: the largest exact vertex distance seen so far.

use phd_math::Point3;
use phd_oracle::NearestHit;
use serde::{Deserialize, Serialize};

/// The source vertex that realises the lower bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LowerWitness {
    /// Vertex row in the augmented mesh.
    pub vertex: usize,
    /// Vertex position.
    pub position: [f64; 3],
    /// Nearest target face.
    pub face: usize,
    /// Nearest point on that face.
    pub nearest: [f64; 3],
}

/// Monotone lower bound on the one-sided Hausdorff distance.
#[derive(Debug, Clone, Default)]
pub struct LowerBound {
    value: f64,
    witness: Option<LowerWitness>,
}

impl LowerBound {
    /// Bound with no vertex observed yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value; `0` before any vertex is observed.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Vertex realising the current value.
    pub fn witness(&self) -> Option<&LowerWitness> {
        self.witness.as_ref()
    }

    /// Account for a newly measured vertex. Returns whether the bound rose.
    pub fn observe(&mut self, vertex: usize, position: &Point3, hit: &NearestHit) -> bool {
        let d = hit.distance();
        if self.witness.is_some() && !(d > self.value) {
            return false;
        }
        self.value = d;
        self.witness = Some(LowerWitness {
            vertex,
            position: [position.x, position.y, position.z],
            face: hit.face,
            nearest: [hit.point.x, hit.point.y, hit.point.z],
        });
        true
    }
}
