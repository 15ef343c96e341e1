//! Projection bound after Kang et al.
//!
//! Classifies a source triangle by how its corners project onto the target
//! and bounds the distance of its interior accordingly.

use phd_math::{barycenter, Point3, TriMesh};
use phd_oracle::DistanceOracle;

use crate::bisector::face_bisector_edge_intersection;
use crate::error::Result;
use crate::mesh::TriangleSample;

/// How the three corners of a source triangle project onto the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionCase {
    /// All corners share one nearest face.
    SameFace {
        /// The shared target face.
        face: usize,
    },
    /// Two corners share a face, the third projects onto a different face,
    /// and the two faces share exactly one edge.
    AdjacentFaces {
        /// Corner whose face differs from the other two.
        lone: usize,
        /// Nearest face of the lone corner.
        lone_face: usize,
        /// Nearest face of the other two corners.
        shared_face: usize,
    },
    /// Anything else.
    Scattered,
}

/// Classify the nearest faces `faces` of a triangle's corners against the
/// target connectivity.
///
/// Adjacency is decided from vertex indices only: the two faces must have
/// four distinct vertex indices between them.
pub fn classify(faces: [usize; 3], target: &TriMesh) -> ProjectionCase {
    let [f0, f1, f2] = faces;
    if f0 == f1 && f1 == f2 {
        return ProjectionCase::SameFace { face: f0 };
    }

    let lone = if f0 == f1 {
        Some(2)
    } else if f0 == f2 {
        Some(1)
    } else if f1 == f2 {
        Some(0)
    } else {
        None
    };

    if let Some(lone) = lone {
        let lone_face = faces[lone];
        let shared_face = faces[(lone + 1) % 3];
        if distinct_vertices(target.faces[lone_face], target.faces[shared_face]) == 4 {
            return ProjectionCase::AdjacentFaces {
                lone,
                lone_face,
                shared_face,
            };
        }
    }
    ProjectionCase::Scattered
}

fn distinct_vertices(a: [usize; 3], b: [usize; 3]) -> usize {
    let mut all = [a[0], a[1], a[2], b[0], b[1], b[2]];
    all.sort_unstable();
    1 + all.windows(2).filter(|w| w[0] != w[1]).count()
}

/// Upper bound on the distance from any point of the sampled triangle to
/// the target, based on where its corners project.
pub fn kang_bound<O>(sample: &TriangleSample, oracle: &O) -> Result<f64>
where
    O: DistanceOracle + ?Sized,
{
    let target = oracle.target();
    match classify(sample.faces, target) {
        ProjectionCase::SameFace { .. } => Ok(sample.max_distance()),
        ProjectionCase::AdjacentFaces {
            lone,
            lone_face,
            shared_face,
        } => adjacent_bound(sample, oracle, lone, lone_face, shared_face),
        ProjectionCase::Scattered => Ok(scattered_bound(sample, oracle)),
    }
}

/// Corner distances together with the distance of each bisector crossing
/// on the two edges leaving the lone corner to both faces.
fn adjacent_bound<O>(
    sample: &TriangleSample,
    oracle: &O,
    lone: usize,
    lone_face: usize,
    shared_face: usize,
) -> Result<f64>
where
    O: DistanceOracle + ?Sized,
{
    let target = oracle.target();
    let u = target.triangle(lone_face);
    let v = target.triangle(shared_face);

    let p1 = sample.corners[lone];
    let mut bound = sample.max_distance();
    for other in [(lone + 1) % 3, (lone + 2) % 3] {
        let b = face_bisector_edge_intersection(&p1, &sample.corners[other], &u, &v)?;
        let to_lone = oracle.squared_distance_to_face(&b, lone_face);
        let to_shared = oracle.squared_distance_to_face(&b, shared_face);
        bound = bound.max(to_lone.max(to_shared).sqrt());
    }
    Ok(bound)
}

/// Minimum of two per-corner strategies: the corner-face sample maximum
/// and the worst distance of the whole triangle to a single corner's face.
fn scattered_bound<O>(sample: &TriangleSample, oracle: &O) -> f64
where
    O: DistanceOracle + ?Sized,
{
    let [a, b, c] = sample.corners;
    let center = barycenter(&a, &b, &c);

    let mut hc: f64 = 0.0;
    let mut ha = f64::INFINITY;
    for i in 0..3 {
        let face = sample.faces[i];
        let here = sample.corners[i];
        let next = sample.corners[(i + 1) % 3];
        let prev = sample.corners[(i + 2) % 3];
        let dist = |p: &Point3| oracle.squared_distance_to_face(p, face).sqrt();

        hc = hc
            .max(sample.distances[i])
            .max(dist(&center))
            .max(dist(&half(&here, &next)))
            .max(dist(&half(&here, &prev)));

        let partial = (0..3)
            .map(|j| {
                if j == i {
                    sample.distances[i]
                } else {
                    dist(&sample.corners[j])
                }
            })
            .fold(0.0, f64::max);
        ha = ha.min(partial);
    }
    hc.min(ha)
}

fn half(a: &Point3, b: &Point3) -> Point3 {
    Point3::from((a.coords + b.coords) / 2.0)
}
