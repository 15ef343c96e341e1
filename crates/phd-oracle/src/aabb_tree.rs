//! Bounding volume hierarchy for exact nearest-point queries.
//!
//! Uses binned Surface Area Heuristic (SAH) construction and a
//! branch-and-bound descent that visits the nearer child first.

use phd_math::triangle::{closest_point_on_triangle, point_triangle_squared_distance};
use phd_math::{Aabb3, MeshError, Point3, TriMesh};
use tracing::debug;

use crate::{DistanceOracle, NearestHit};

/// Faces per leaf before a node is split.
const MAX_LEAF_FACES: usize = 4;

/// A tree node: either a leaf holding faces or an internal node with children.
#[derive(Debug, Clone)]
pub enum AabbNode {
    /// Leaf node containing face indices.
    Leaf {
        /// Bounds of all faces in the leaf.
        aabb: Aabb3,
        /// Face indices into the target mesh.
        faces: Vec<usize>,
    },
    /// Internal node with two children.
    Internal {
        /// Bounds of both children.
        aabb: Aabb3,
        /// Left child node.
        left: Box<AabbNode>,
        /// Right child node.
        right: Box<AabbNode>,
    },
}

impl AabbNode {
    /// Bounds of this node.
    pub fn aabb(&self) -> &Aabb3 {
        match self {
            AabbNode::Leaf { aabb, .. } => aabb,
            AabbNode::Internal { aabb, .. } => aabb,
        }
    }

    fn depth(&self) -> usize {
        match self {
            AabbNode::Leaf { .. } => 1,
            AabbNode::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Exact nearest-point oracle over a static triangle soup.
#[derive(Debug, Clone)]
pub struct AabbTree {
    mesh: TriMesh,
    triangles: Vec<[Point3; 3]>,
    root: AabbNode,
}

/// Per-face build record: index, bounds, bounds center.
type FaceRecord = (usize, Aabb3, Point3);

impl AabbTree {
    /// Build the tree over `mesh`.
    ///
    /// The mesh is validated first; an empty or inconsistent mesh cannot
    /// answer nearest queries.
    pub fn build(mesh: TriMesh) -> Result<Self, MeshError> {
        mesh.validate()?;

        let triangles: Vec<[Point3; 3]> = (0..mesh.num_faces()).map(|f| mesh.triangle(f)).collect();
        let mut records: Vec<FaceRecord> = triangles
            .iter()
            .enumerate()
            .map(|(f, tri)| {
                let aabb = Aabb3::from_triangle(tri);
                (f, aabb, aabb.center())
            })
            .collect();

        let root = build_node(&mut records);
        debug!(
            "Built AABB tree over {} faces (depth {})",
            triangles.len(),
            root.depth()
        );

        Ok(Self {
            mesh,
            triangles,
            root,
        })
    }

    /// Root node of the hierarchy.
    pub fn root(&self) -> &AabbNode {
        &self.root
    }

    fn nearest_in(&self, p: &Point3, node: &AabbNode, best: &mut NearestHit) {
        match node {
            AabbNode::Leaf { faces, .. } => {
                for &f in faces {
                    let q = closest_point_on_triangle(p, &self.triangles[f]);
                    let sq = (q - p).norm_squared();
                    if sq < best.squared_distance
                        || (sq == best.squared_distance && f < best.face)
                    {
                        *best = NearestHit {
                            squared_distance: sq,
                            face: f,
                            point: q,
                        };
                    }
                }
            }
            AabbNode::Internal { left, right, .. } => {
                let dl = left.aabb().squared_distance_to(p);
                let dr = right.aabb().squared_distance_to(p);
                let (first, d_first, second, d_second) = if dl <= dr {
                    (left, dl, right, dr)
                } else {
                    (right, dr, left, dl)
                };
                // Ties are explored so the lowest face index wins regardless
                // of traversal order.
                if d_first <= best.squared_distance {
                    self.nearest_in(p, first, best);
                }
                if d_second <= best.squared_distance {
                    self.nearest_in(p, second, best);
                }
            }
        }
    }
}

impl DistanceOracle for AabbTree {
    fn target(&self) -> &TriMesh {
        &self.mesh
    }

    fn nearest(&self, point: &Point3) -> NearestHit {
        let mut best = NearestHit {
            squared_distance: f64::INFINITY,
            face: usize::MAX,
            point: *point,
        };
        self.nearest_in(point, &self.root, &mut best);
        best
    }

    fn squared_distance_to_face(&self, point: &Point3, face: usize) -> f64 {
        point_triangle_squared_distance(point, &self.triangles[face])
    }
}

/// Build a node recursively using SAH.
fn build_node(records: &mut [FaceRecord]) -> AabbNode {
    let mut bounds = Aabb3::empty();
    for (_, aabb, _) in records.iter() {
        bounds.include_box(aabb);
    }

    if records.len() <= MAX_LEAF_FACES {
        return AabbNode::Leaf {
            aabb: bounds,
            faces: records.iter().map(|(f, _, _)| *f).collect(),
        };
    }

    let mid = match find_best_split(records) {
        Some((axis, pos)) => partition_records(records, axis, pos),
        None => 0,
    };

    // Fall back to a median split when the SAH partition is one-sided.
    let mid = if mid == 0 || mid == records.len() {
        let mut centroids = Aabb3::empty();
        for (_, _, c) in records.iter() {
            centroids.include_point(c);
        }
        let axis = longest_axis(&centroids);
        records.sort_by(|a, b| a.2[axis].total_cmp(&b.2[axis]));
        records.len() / 2
    } else {
        mid
    };

    let (left, right) = records.split_at_mut(mid);
    AabbNode::Internal {
        aabb: bounds,
        left: Box::new(build_node(left)),
        right: Box::new(build_node(right)),
    }
}

fn longest_axis(aabb: &Aabb3) -> usize {
    let e = aabb.extent();
    if e.x >= e.y && e.x >= e.z {
        0
    } else if e.y >= e.z {
        1
    } else {
        2
    }
}

/// Find the best split axis and position over centroid buckets.
fn find_best_split(records: &[FaceRecord]) -> Option<(usize, f64)> {
    const NUM_BUCKETS: usize = 12;

    let mut centroids = Aabb3::empty();
    for (_, _, c) in records {
        centroids.include_point(c);
    }
    let extent = centroids.extent();

    let mut best: Option<(usize, f64)> = None;
    let mut best_cost = f64::INFINITY;

    for axis in 0..3 {
        let axis_extent = extent[axis];
        if axis_extent < 1e-12 {
            continue;
        }
        let axis_min = centroids.min[axis];

        let mut bucket_counts = [0usize; NUM_BUCKETS];
        let mut bucket_bounds = [Aabb3::empty(); NUM_BUCKETS];
        for (_, aabb, c) in records {
            let b = ((c[axis] - axis_min) / axis_extent * NUM_BUCKETS as f64) as usize;
            let b = b.min(NUM_BUCKETS - 1);
            bucket_counts[b] += 1;
            bucket_bounds[b].include_box(aabb);
        }

        for split in 1..NUM_BUCKETS {
            let mut left_count = 0;
            let mut left_bounds = Aabb3::empty();
            for i in 0..split {
                left_count += bucket_counts[i];
                left_bounds.include_box(&bucket_bounds[i]);
            }

            let mut right_count = 0;
            let mut right_bounds = Aabb3::empty();
            for i in split..NUM_BUCKETS {
                right_count += bucket_counts[i];
                right_bounds.include_box(&bucket_bounds[i]);
            }

            if left_count == 0 || right_count == 0 {
                continue;
            }

            let cost = left_bounds.surface_area() * left_count as f64
                + right_bounds.surface_area() * right_count as f64;
            if cost < best_cost {
                best_cost = cost;
                best = Some((
                    axis,
                    axis_min + (split as f64 / NUM_BUCKETS as f64) * axis_extent,
                ));
            }
        }
    }

    best
}

/// Partition records by centroid along an axis; returns the split index.
fn partition_records(records: &mut [FaceRecord], axis: usize, pos: f64) -> usize {
    let mut left = 0;
    let mut right = records.len();

    while left < right {
        if records[left].2[axis] < pos {
            left += 1;
        } else {
            right -= 1;
            records.swap(left, right);
        }
    }

    left
}
