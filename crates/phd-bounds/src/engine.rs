//! Refinement loop driving the lower and upper bounds together.

use std::time::Instant;

use phd_math::TriMesh;
use phd_oracle::DistanceOracle;
use tracing::{debug, info, trace, warn};

use crate::cascade::{bound_faces, CascadeStats};
use crate::error::{BoundsError, Result};
use crate::lower::LowerBound;
use crate::mesh::{AugmentedMesh, Ceilings};
use crate::queue::RefinementQueue;
use crate::report::{BoundsReport, ConvergenceStatus};
use crate::subdivide::subdivide;
use crate::BoundSettings;

/// Result of a single [`BoundsEngine::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The gap is within tolerance; nothing was done.
    Converged,
    /// The queue is empty; nothing was done.
    QueueExhausted,
    /// A face was split into four children.
    Refined {
        /// The split face.
        face: usize,
        /// Its children.
        children: [usize; 4],
    },
    /// A popped face had fallen below the lower bound and was dropped.
    Discarded {
        /// The dropped face.
        face: usize,
    },
}

/// Incremental Hausdorff bound computation from source mesh A to the
/// target behind `oracle`.
///
/// After construction every source vertex is measured and every source face
/// bounded. Each [`step`](Self::step) then refines the face with the largest
/// upper bound. `lower` never decreases and `lower <= upper` always holds.
pub struct BoundsEngine<O> {
    oracle: O,
    mesh: AugmentedMesh,
    queue: RefinementQueue,
    lower: LowerBound,
    upper: f64,
    diagonal: f64,
    target_gap: f64,
    iterations: usize,
    stale_discarded: usize,
    cascade: CascadeStats,
    started: Instant,
}

impl<O: DistanceOracle> BoundsEngine<O> {
    /// Measure and bound the source mesh.
    pub fn new(source: &TriMesh, oracle: O, settings: &BoundSettings) -> Result<Self> {
        let started = Instant::now();
        settings.validate()?;
        source
            .validate()
            .map_err(|source| BoundsError::InvalidMesh { mesh: "A", source })?;

        let diagonal = if settings.normalize {
            source.bounds().diagonal()
        } else {
            1.0
        };

        let hits = oracle.query(&source.vertices);
        let mut lower = LowerBound::new();
        for (v, (p, hit)) in source.vertices.iter().zip(&hits).enumerate() {
            lower.observe(v, p, hit);
        }

        let ceilings = Ceilings::from_factor(
            settings.max_factor,
            source.num_vertices(),
            source.num_faces(),
        );
        let mut mesh = AugmentedMesh::new(source, &hits, ceilings)?;

        let mut queue = RefinementQueue::new();
        let mut cascade = CascadeStats::default();
        let mut upper = lower.value();
        let samples: Vec<_> = (0..mesh.face_count()).map(|f| mesh.sample(f)).collect();
        let bounds = bound_faces(&samples, &oracle, lower.value())?;
        for (f, bound) in bounds.into_iter().enumerate() {
            mesh.set_bound(f, bound);
            cascade.record(bound.tag);
            upper = upper.max(bound.value);
            queue.push_if_at_least(bound.value, f, lower.value());
        }

        debug!(
            "Seeded {} vertices, {} faces: lower {:.6}, upper {:.6}, {} queued",
            mesh.vertex_count(),
            mesh.face_count(),
            lower.value(),
            upper,
            queue.len()
        );

        Ok(Self {
            oracle,
            mesh,
            queue,
            lower,
            upper,
            diagonal,
            target_gap: settings.tolerance * diagonal,
            iterations: 0,
            stale_discarded: 0,
            cascade,
            started,
        })
    }

    /// Current lower bound.
    pub fn lower(&self) -> f64 {
        self.lower.value()
    }

    /// Current upper bound.
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Normalisation diagonal.
    pub fn diagonal(&self) -> f64 {
        self.diagonal
    }

    /// Faces subdivided so far.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// The refined source mesh.
    pub fn mesh(&self) -> &AugmentedMesh {
        &self.mesh
    }

    /// Faces waiting for refinement.
    pub fn queue(&self) -> &RefinementQueue {
        &self.queue
    }

    /// Whether the gap is within tolerance.
    pub fn is_converged(&self) -> bool {
        self.upper - self.lower.value() <= self.target_gap
    }

    /// Perform one refinement step.
    pub fn step(&mut self) -> Result<StepOutcome> {
        if self.is_converged() {
            return Ok(StepOutcome::Converged);
        }
        let Some(entry) = self.queue.pop() else {
            return Ok(StepOutcome::QueueExhausted);
        };

        let lower = self.lower.value();
        if entry.bound < lower {
            self.stale_discarded += 1;
            self.refresh_upper(f64::NEG_INFINITY);
            trace!("Dropped stale face {} ({:.6} < {:.6})", entry.face, entry.bound, lower);
            return Ok(StepOutcome::Discarded { face: entry.face });
        }

        let sub = subdivide(&mut self.mesh, &self.oracle, entry.face, &mut self.lower)?;
        self.iterations += 1;

        let lower = self.lower.value();
        let mut children_max = f64::NEG_INFINITY;
        for (&child, bound) in sub.children.iter().zip(&sub.bounds) {
            self.cascade.record(bound.tag);
            children_max = children_max.max(bound.value);
            self.queue.push_if_at_least(bound.value, child, lower);
        }
        self.refresh_upper(children_max);

        trace!(
            "Split face {} (bound {:.6}): lower {:.6}, upper {:.6}",
            entry.face,
            entry.bound,
            lower,
            self.upper
        );
        Ok(StepOutcome::Refined {
            face: entry.face,
            children: sub.children,
        })
    }

    /// Refine until converged or out of queued faces.
    pub fn run(&mut self) -> Result<BoundsReport> {
        let status = loop {
            match self.step()? {
                StepOutcome::Converged => break ConvergenceStatus::Converged,
                StepOutcome::QueueExhausted => {
                    warn!(
                        "Refinement queue exhausted with gap {:.3e} above tolerance {:.3e}",
                        self.upper - self.lower.value(),
                        self.target_gap
                    );
                    break ConvergenceStatus::QueueExhausted;
                }
                StepOutcome::Refined { .. } | StepOutcome::Discarded { .. } => {}
            }
        };

        let report = BoundsReport {
            lower: self.lower.value(),
            upper: self.upper,
            diagonal: self.diagonal,
            status,
            iterations: self.iterations,
            stale_discarded: self.stale_discarded,
            vertex_count: self.mesh.vertex_count(),
            face_count: self.mesh.face_count(),
            bvh_build_ms: 0.0,
            bounds_ms: self.started.elapsed().as_secs_f64() * 1000.0,
            witness: self.lower.witness().copied(),
            cascade: self.cascade,
        };
        info!(
            "Bounds [{:.6}, {:.6}] after {} iterations, {} stale ({} vertices, {} faces)",
            report.lower,
            report.upper,
            report.iterations,
            report.stale_discarded,
            report.vertex_count,
            report.face_count
        );
        Ok(report)
    }

    /// `upper = max(candidate, best queued bound, lower)`.
    fn refresh_upper(&mut self, candidate: f64) {
        let queued = self.queue.peek().map_or(f64::NEG_INFINITY, |e| e.bound);
        self.upper = candidate.max(queued).max(self.lower.value());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cascade::BoundTag;
    use approx::assert_relative_eq;
    use phd_oracle::{AabbTree, LinearScan};

    /// A long flat triangle over two small target triangles at its ends.
    /// The farthest source point is the apex `(2, 1, 0)`, at distance
    /// `sqrt(3.25)` from both targets.
    fn bridge() -> (TriMesh, TriMesh) {
        let source = TriMesh::from_rows(
            &[[0.0, 0.0, 0.0], [4.0, 0.0, 0.0], [2.0, 1.0, 0.0]],
            &[[0, 1, 2]],
        );
        let target = TriMesh::from_rows(
            &[
                [0.0, 0.0, 0.0],
                [0.5, 0.0, 0.0],
                [0.0, 0.5, 0.0],
                [4.0, 0.0, 0.0],
                [3.5, 0.0, 0.0],
                [4.0, 0.5, 0.0],
            ],
            &[[0, 1, 2], [3, 4, 5]],
        );
        (source, target)
    }

    fn settings(tolerance: f64) -> BoundSettings {
        BoundSettings {
            tolerance,
            ..BoundSettings::default()
        }
    }

    #[test]
    fn test_seed_state() {
        let (source, target) = bridge();
        let oracle = LinearScan::new(target).unwrap();
        let engine = BoundsEngine::new(&source, oracle, &settings(1e-3)).unwrap();
        assert_relative_eq!(engine.lower(), 3.25_f64.sqrt(), epsilon = 1e-12);
        assert!(engine.upper() > engine.lower());
        assert_eq!(engine.iterations(), 0);
        assert_eq!(engine.queue().len(), 1);
        assert_eq!(engine.mesh().face_tag(0), BoundTag::Unresolved);
        assert_relative_eq!(engine.diagonal(), 17.0_f64.sqrt(), epsilon = 1e-12);
        assert!(!engine.is_converged());
    }

    #[test]
    fn test_steps_keep_bounds_ordered_and_monotone() {
        let (source, target) = bridge();
        let oracle = AabbTree::build(target).unwrap();
        let mut engine = BoundsEngine::new(&source, oracle, &settings(1e-3)).unwrap();

        let mut last_lower = engine.lower();
        let mut refined = 0;
        loop {
            let outcome = engine.step().unwrap();
            assert!(engine.lower() >= last_lower);
            assert!(engine.lower() <= engine.upper());
            last_lower = engine.lower();
            match outcome {
                StepOutcome::Converged => break,
                StepOutcome::QueueExhausted => panic!("queue exhausted"),
                StepOutcome::Refined { .. } => refined += 1,
                StepOutcome::Discarded { .. } => {}
            }
        }
        assert!(refined > 0);
        assert_eq!(engine.iterations(), refined);
        assert!(engine.upper() - engine.lower() <= 1e-3 * engine.diagonal());
        assert!(engine.upper() >= 3.25_f64.sqrt() - 1e-12);
    }

    #[test]
    fn test_tighter_tolerance_follows_the_same_gaps() {
        let (source, target) = bridge();
        let gap = |e: &BoundsEngine<AabbTree>| e.upper() - e.lower();
        let mut loose =
            BoundsEngine::new(&source, AabbTree::build(target.clone()).unwrap(), &settings(1e-2))
                .unwrap();
        let mut tight =
            BoundsEngine::new(&source, AabbTree::build(target).unwrap(), &settings(1e-4)).unwrap();
        assert_eq!(gap(&loose), gap(&tight));

        loop {
            match loose.step().unwrap() {
                StepOutcome::Converged => break,
                StepOutcome::QueueExhausted => panic!("queue exhausted"),
                outcome => assert_eq!(tight.step().unwrap(), outcome),
            }
            assert_eq!(loose.iterations(), tight.iterations());
            assert_eq!(gap(&loose), gap(&tight));
        }

        let report = tight.run().unwrap();
        assert!(report.is_converged());
        assert!(report.iterations >= loose.iterations());
        assert!(report.gap() <= gap(&loose));
        assert!(report.gap() <= 1e-4 * report.diagonal);
    }

    #[test]
    fn test_converged_engine_stays_put() {
        let (source, target) = bridge();
        let oracle = AabbTree::build(target).unwrap();
        let mut engine = BoundsEngine::new(&source, oracle, &settings(1e-2)).unwrap();
        let report = engine.run().unwrap();
        assert!(report.is_converged());

        let faces = engine.mesh().face_count();
        assert_eq!(engine.step().unwrap(), StepOutcome::Converged);
        assert_eq!(engine.mesh().face_count(), faces);
    }

    #[test]
    fn test_identical_soup_converges_without_refinement() {
        // Two far-apart triangles compared against themselves.
        let mesh = TriMesh::from_rows(
            &[
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [10.0, 0.0, 0.0],
                [11.0, 0.0, 1.0],
                [10.0, 1.0, 0.0],
            ],
            &[[0, 1, 2], [3, 4, 5]],
        );
        let oracle = AabbTree::build(mesh.clone()).unwrap();
        let mut engine = BoundsEngine::new(&mesh, oracle, &settings(1e-8)).unwrap();
        let report = engine.run().unwrap();

        assert_eq!(report.lower, 0.0);
        assert_eq!(report.upper, 0.0);
        assert_eq!(report.iterations, 0);
        assert_eq!(report.status, ConvergenceStatus::Converged);
        assert_eq!(report.cascade.exact, 2);
    }

    #[test]
    fn test_rejects_invalid_source() {
        let (_, target) = bridge();
        let oracle = LinearScan::new(target).unwrap();
        let bad = TriMesh::from_rows(&[[0.0, 0.0, 0.0]], &[[0, 1, 2]]);
        let err = BoundsEngine::new(&bad, oracle, &settings(1e-3)).err();
        assert!(matches!(err, Some(BoundsError::InvalidMesh { mesh: "A", .. })));
    }

    #[test]
    fn test_rejects_negative_tolerance() {
        let (source, target) = bridge();
        let oracle = LinearScan::new(target).unwrap();
        let err = BoundsEngine::new(&source, oracle, &settings(-1.0)).err();
        assert!(matches!(err, Some(BoundsError::InvalidInput(_))));
    }
}
