#![warn(missing_docs)]

//! Nearest-point distance oracles over a static triangle mesh.
//!
//! The bound engine never searches the target surface itself; it asks a
//! [`DistanceOracle`] for nearest points and for point-to-single-face
//! distances.
//!
//! - [`AabbTree`] - SAH bounding volume hierarchy, the default oracle
//! - [`LinearScan`] - brute-force reference, useful for tests and tiny meshes
//!
//! # Example
//!
//! ```
//! use phd_math::{Point3, TriMesh};
//! use phd_oracle::{AabbTree, DistanceOracle};
//!
//! let mesh = TriMesh::from_rows(
//!     &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
//!     &[[0, 1, 2]],
//! );
//! let tree = AabbTree::build(mesh).unwrap();
//! let hit = tree.nearest(&Point3::new(0.2, 0.2, 1.0));
//! assert_eq!(hit.face, 0);
//! assert!((hit.distance() - 1.0).abs() < 1e-12);
//! ```

pub mod aabb_tree;

pub use aabb_tree::AabbTree;

use phd_math::triangle::{closest_point_on_triangle, point_triangle_squared_distance};
use phd_math::{MeshError, Point3, TriMesh};

/// Result of a nearest-point query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestHit {
    /// Squared distance from the query point to the target surface.
    pub squared_distance: f64,
    /// Index of the nearest target face.
    pub face: usize,
    /// Nearest point on the target surface.
    pub point: Point3,
}

impl NearestHit {
    /// Unsquared distance.
    pub fn distance(&self) -> f64 {
        self.squared_distance.sqrt()
    }
}

/// Exact nearest-point queries against a static target mesh.
///
/// Implementations must return exact results. Among equidistant faces any
/// may be reported.
pub trait DistanceOracle {
    /// The target mesh the oracle was built over.
    fn target(&self) -> &TriMesh;

    /// Nearest point on the target to `point`.
    fn nearest(&self, point: &Point3) -> NearestHit;

    /// Nearest points for a batch of query points.
    fn query(&self, points: &[Point3]) -> Vec<NearestHit> {
        points.iter().map(|p| self.nearest(p)).collect()
    }

    /// Squared distance from `point` to the single target face `face`.
    fn squared_distance_to_face(&self, point: &Point3, face: usize) -> f64 {
        point_triangle_squared_distance(point, &self.target().triangle(face))
    }
}

/// Brute-force oracle that tests every face.
#[derive(Debug, Clone)]
pub struct LinearScan {
    mesh: TriMesh,
}

impl LinearScan {
    /// Wrap a validated mesh.
    pub fn new(mesh: TriMesh) -> Result<Self, MeshError> {
        mesh.validate()?;
        Ok(Self { mesh })
    }
}

impl DistanceOracle for LinearScan {
    fn target(&self) -> &TriMesh {
        &self.mesh
    }

    fn nearest(&self, point: &Point3) -> NearestHit {
        let mut best = NearestHit {
            squared_distance: f64::INFINITY,
            face: usize::MAX,
            point: *point,
        };
        for f in 0..self.mesh.num_faces() {
            let q = closest_point_on_triangle(point, &self.mesh.triangle(f));
            let sq = (q - point).norm_squared();
            if sq < best.squared_distance {
                best = NearestHit {
                    squared_distance: sq,
                    face: f,
                    point: q,
                };
            }
        }
        best
    }
}
