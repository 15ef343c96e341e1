//! Per-triangle upper bound cascade.
//!
//! Bounds are tried from cheapest to most expensive and the cascade stops
//! as soon as the running minimum drops strictly below the global lower
//! bound: such a triangle cannot contain the maximiser and is discarded.

use phd_math::triangle::opposite_edge_lengths;
use phd_oracle::DistanceOracle;
use serde::{Deserialize, Serialize};

use crate::bisector::point_bisector;
use crate::error::Result;
use crate::kang::kang_bound;
use crate::mesh::TriangleSample;

/// Which cascade stage produced a triangle's final bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundTag {
    /// All corners project onto one face; the bound is exact.
    Exact,
    /// Triangle inequality through the corners.
    TriangleInequality,
    /// Circumradius/inradius enclosing-ball bound.
    Circumradius,
    /// Projection-pattern bound.
    Kang,
    /// Bisector plane of two corner projections.
    BisectorPlane,
    /// No stage fell below the lower bound.
    Unresolved,
}

/// Upper bound of one triangle and where it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleBound {
    /// Upper bound on the distance of any point in the triangle.
    pub value: f64,
    /// Cascade stage that produced `value`.
    pub tag: BoundTag,
}

impl TriangleBound {
    /// Whether the triangle is settled: exact, or provably below `lower`.
    pub fn is_resolved(&self) -> bool {
        self.tag != BoundTag::Unresolved
    }
}

/// Count of triangles per terminating cascade stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeStats {
    /// Exact triangles.
    pub exact: usize,
    /// Discarded by the triangle inequality.
    pub triangle_inequality: usize,
    /// Discarded by the circumradius bound.
    pub circumradius: usize,
    /// Discarded by the projection bound.
    pub kang: usize,
    /// Discarded by the bisector-plane bound.
    pub bisector_plane: usize,
    /// Sent on for refinement.
    pub unresolved: usize,
}

impl CascadeStats {
    /// Count one triangle.
    pub fn record(&mut self, tag: BoundTag) {
        match tag {
            BoundTag::Exact => self.exact += 1,
            BoundTag::TriangleInequality => self.triangle_inequality += 1,
            BoundTag::Circumradius => self.circumradius += 1,
            BoundTag::Kang => self.kang += 1,
            BoundTag::BisectorPlane => self.bisector_plane += 1,
            BoundTag::Unresolved => self.unresolved += 1,
        }
    }

    /// Total number of triangles counted.
    pub fn total(&self) -> usize {
        self.exact
            + self.triangle_inequality
            + self.circumradius
            + self.kang
            + self.bisector_plane
            + self.unresolved
    }
}

/// Run the cascade on one triangle against the current lower bound.
pub fn bound_triangle<O>(sample: &TriangleSample, oracle: &O, lower: f64) -> Result<TriangleBound>
where
    O: DistanceOracle + ?Sized,
{
    if sample.is_single_face() {
        return Ok(TriangleBound {
            value: sample.max_distance(),
            tag: BoundTag::Exact,
        });
    }

    let e = opposite_edge_lengths(&sample.corners);

    let mut value = triangle_inequality_bound(&sample.distances, &e);
    if value < lower {
        return Ok(settled(value, BoundTag::TriangleInequality));
    }

    value = value.min(circumradius_bound(&sample.distances, &e));
    if value < lower {
        return Ok(settled(value, BoundTag::Circumradius));
    }

    value = value.min(kang_bound(sample, oracle)?);
    if value < lower {
        return Ok(settled(value, BoundTag::Kang));
    }

    value = value.min(bisector_plane_bound(sample, &e)?);
    if value < lower {
        return Ok(settled(value, BoundTag::BisectorPlane));
    }

    Ok(settled(value, BoundTag::Unresolved))
}

/// Run the cascade on a batch of triangles with a fixed lower bound.
pub fn bound_faces<O>(samples: &[TriangleSample], oracle: &O, lower: f64) -> Result<Vec<TriangleBound>>
where
    O: DistanceOracle + ?Sized,
{
    samples
        .iter()
        .map(|sample| bound_triangle(sample, oracle, lower))
        .collect()
}

fn settled(value: f64, tag: BoundTag) -> TriangleBound {
    TriangleBound { value, tag }
}

/// `min_c (d[c] + longest edge incident to corner c)`.
///
/// `e[c]` is the length of the edge opposite corner `c`, so the edges
/// incident to `c` are `e[c+1]` and `e[c+2]`.
pub fn triangle_inequality_bound(d: &[f64; 3], e: &[f64; 3]) -> f64 {
    (0..3)
        .map(|c| d[c] + e[(c + 1) % 3].max(e[(c + 2) % 3]))
        .fold(f64::INFINITY, f64::min)
}

/// Largest corner distance plus the radius of a ball enclosing the triangle.
///
/// Uses the circumradius when `s - r > 2R` and half the longest edge
/// otherwise. Degenerate triangles produce a NaN or infinite circumradius,
/// fail the comparison and take the half-edge radius.
pub fn circumradius_bound(d: &[f64; 3], e: &[f64; 3]) -> f64 {
    let s = (e[0] + e[1] + e[2]) / 2.0;
    let area = (s * (s - e[0]) * (s - e[1]) * (s - e[2])).max(0.0).sqrt();
    let circumradius = e[0] * e[1] * e[2] / (4.0 * area);
    let inradius = area / s;

    let radius = if s - inradius > 2.0 * circumradius {
        circumradius
    } else {
        e[0].max(e[1]).max(e[2]) / 2.0
    };
    d[0].max(d[1]).max(d[2]) + radius
}

/// Bound from the bisector plane of the nearest points of the shortest
/// edge's opposite corner and one other corner.
///
/// Every triangle point is at most `min(|x - q1|, |x - q2|)` from the
/// target. That function peaks at a corner or where an edge crosses the
/// bisector of `q1` and `q2`. Both choices of second corner are tried and
/// the smaller result kept.
pub fn bisector_plane_bound(sample: &TriangleSample, e: &[f64; 3]) -> Result<f64> {
    let shortest = shortest_edge(e);
    let q1 = sample.nearest[shortest];

    let mut best = f64::INFINITY;
    for step in 1..=2 {
        let q2 = sample.nearest[(shortest + step) % 3];

        let mut partial = sample
            .corners
            .iter()
            .map(|v| (*v - q1).norm().min((*v - q2).norm()))
            .fold(0.0, f64::max);

        if q1 != q2 {
            let plane = point_bisector(&q1, &q2)?;
            for b in 0..3 {
                let p1 = sample.corners[(b + 1) % 3];
                let p2 = sample.corners[(b + 2) % 3];
                let t = plane.segment_parameter(&p1, &p2);
                if t > 0.0 && t < 1.0 {
                    let x = p1 + (p2 - p1) * t;
                    partial = partial.max((x - q1).norm().max((x - q2).norm()));
                }
            }
        }
        best = best.min(partial);
    }
    Ok(best)
}

/// Index of the shortest edge; ties go to the later index.
fn shortest_edge(e: &[f64; 3]) -> usize {
    if e[0] < e[1] && e[0] < e[2] {
        0
    } else if e[1] < e[0] && e[1] < e[2] {
        1
    } else {
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use phd_math::{Point3, TriMesh};
    use phd_oracle::LinearScan;

    /// Unit square in z=0 split along its diagonal.
    fn square() -> LinearScan {
        let mesh = TriMesh::from_rows(
            &[
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            &[[0, 1, 2], [0, 2, 3]],
        );
        LinearScan::new(mesh).unwrap()
    }

    fn sample_of(corners: [Point3; 3], oracle: &LinearScan) -> TriangleSample {
        let hits = oracle.query(&corners);
        TriangleSample {
            corners,
            distances: [hits[0].distance(), hits[1].distance(), hits[2].distance()],
            nearest: [hits[0].point, hits[1].point, hits[2].point],
            faces: [hits[0].face, hits[1].face, hits[2].face],
        }
    }

    /// Triangle at height 0.5 whose corners hit both faces of the square.
    fn straddling(oracle: &LinearScan) -> TriangleSample {
        sample_of(
            [
                Point3::new(0.9, 0.1, 0.5),
                Point3::new(0.9, 0.6, 0.5),
                Point3::new(0.1, 0.9, 0.5),
            ],
            oracle,
        )
    }

    #[test]
    fn test_triangle_inequality_bound() {
        // Corner 0 with distance 1 and incident edges 3 and 4 gives 5.
        let d = [1.0, 2.0, 10.0];
        let e = [5.0, 4.0, 3.0];
        assert_eq!(triangle_inequality_bound(&d, &e), 5.0);
    }

    #[test]
    fn test_circumradius_bound_acute_and_obtuse() {
        // Equilateral triangle of side 1: R = 1/sqrt(3).
        let e = [1.0, 1.0, 1.0];
        let d = [0.5, 0.25, 0.0];
        assert_relative_eq!(
            circumradius_bound(&d, &e),
            0.5 + 1.0 / 3.0_f64.sqrt(),
            epsilon = 1e-12
        );

        // Flat triangle: half the longest edge.
        let flat = [1.0, 1.0, 2.0];
        assert_relative_eq!(circumradius_bound(&d, &flat), 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_circumradius_bound_degenerate_point() {
        let e = [0.0, 0.0, 0.0];
        assert_eq!(circumradius_bound(&[0.3, 0.2, 0.1], &e), 0.3);
    }

    #[test]
    fn test_shortest_edge_ties() {
        assert_eq!(shortest_edge(&[1.0, 2.0, 3.0]), 0);
        assert_eq!(shortest_edge(&[2.0, 1.0, 3.0]), 1);
        assert_eq!(shortest_edge(&[1.0, 1.0, 3.0]), 2);
        assert_eq!(shortest_edge(&[2.0, 2.0, 2.0]), 2);
    }

    #[test]
    fn test_exact_when_single_face() {
        let oracle = square();
        let sample = sample_of(
            [
                Point3::new(0.5, 0.1, 1.0),
                Point3::new(0.9, 0.1, 2.0),
                Point3::new(0.9, 0.5, 3.0),
            ],
            &oracle,
        );
        let bound = bound_triangle(&sample, &oracle, 10.0).unwrap();
        assert_eq!(bound.tag, BoundTag::Exact);
        assert_eq!(bound.value, 3.0);
        assert!(bound.is_resolved());
    }

    #[test]
    fn test_high_lower_bound_discards_early() {
        let oracle = square();
        let sample = straddling(&oracle);
        let bound = bound_triangle(&sample, &oracle, 100.0).unwrap();
        assert_eq!(bound.tag, BoundTag::TriangleInequality);
        assert!(bound.value < 100.0);
    }

    #[test]
    fn test_zero_lower_bound_is_unresolved() {
        let oracle = square();
        let sample = straddling(&oracle);
        assert!(!sample.is_single_face());
        let bound = bound_triangle(&sample, &oracle, 0.0).unwrap();
        assert_eq!(bound.tag, BoundTag::Unresolved);
        assert!(!bound.is_resolved());
        // The triangle floats at constant height 0.5 over the square.
        assert!(bound.value >= 0.5);
    }

    #[test]
    fn test_cascade_never_exceeds_first_stage() {
        let oracle = square();
        let sample = straddling(&oracle);
        let e = opposite_edge_lengths(&sample.corners);
        let u1 = triangle_inequality_bound(&sample.distances, &e);
        let bound = bound_triangle(&sample, &oracle, 0.0).unwrap();
        assert!(bound.value <= u1);
    }

    #[test]
    fn test_bisector_plane_bound_covers_interior() {
        let oracle = square();
        let sample = straddling(&oracle);
        let e = opposite_edge_lengths(&sample.corners);
        let bound = bisector_plane_bound(&sample, &e).unwrap();
        // Every point of the triangle is exactly 0.5 above the square.
        assert!(bound >= 0.5 - 1e-12);
    }

    #[test]
    fn test_bisector_plane_bound_coincident_projections() {
        let oracle = square();
        // Corners stacked over a single target point.
        let sample = sample_of(
            [
                Point3::new(2.0, 2.0, 0.0),
                Point3::new(3.0, 2.0, 0.0),
                Point3::new(2.0, 3.0, 0.0),
            ],
            &oracle,
        );
        let e = opposite_edge_lengths(&sample.corners);
        let bound = bisector_plane_bound(&sample, &e).unwrap();
        assert_relative_eq!(bound, sample.max_distance(), epsilon = 1e-12);
    }

    #[test]
    fn test_stats_record() {
        let mut stats = CascadeStats::default();
        stats.record(BoundTag::Exact);
        stats.record(BoundTag::Kang);
        stats.record(BoundTag::Kang);
        assert_eq!(stats.exact, 1);
        assert_eq!(stats.kang, 2);
        assert_eq!(stats.total(), 3);
    }

    #[test]
    fn test_bound_faces_batch() {
        let oracle = square();
        let samples = [straddling(&oracle), straddling(&oracle)];
        let bounds = bound_faces(&samples, &oracle, 0.0).unwrap();
        assert_eq!(bounds.len(), 2);
        assert_eq!(bounds[0], bounds[1]);
    }
}
