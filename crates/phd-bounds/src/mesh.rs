//! Augmented source mesh that grows as faces are subdivided.
//!
//! Every vertex row carries its exact distance to the target, the nearest
//! target point and the nearest target face. Every face row carries its
//! current upper bound and the cascade stage that produced it. Rows are
//! append-only: a subdivided parent stays in place but is no longer
//! referenced by the queue.

use phd_math::{Point3, TriMesh};
use phd_oracle::NearestHit;
use tracing::debug;

use crate::cascade::{BoundTag, TriangleBound};
use crate::error::{BoundsError, ResourceKind, Result};

/// Row ceilings derived from `max_factor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ceilings {
    /// Maximum number of vertex rows.
    pub max_vertices: usize,
    /// Maximum number of face rows.
    pub max_faces: usize,
}

impl Ceilings {
    /// `floor(max_factor * count)` for both row kinds, saturating at `usize::MAX`.
    pub fn from_factor(max_factor: f64, vertices: usize, faces: usize) -> Self {
        Self {
            max_vertices: scaled(max_factor, vertices),
            max_faces: scaled(max_factor, faces),
        }
    }
}

fn scaled(factor: f64, count: usize) -> usize {
    // `as` saturates on overflow and maps NaN to 0.
    (factor * count as f64) as usize
}

/// The three corners of one face with their per-vertex distance data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleSample {
    /// Corner positions.
    pub corners: [Point3; 3],
    /// Exact distance of each corner to the target.
    pub distances: [f64; 3],
    /// Nearest target point of each corner.
    pub nearest: [Point3; 3],
    /// Nearest target face of each corner.
    pub faces: [usize; 3],
}

impl TriangleSample {
    /// Largest corner distance.
    pub fn max_distance(&self) -> f64 {
        self.distances[0].max(self.distances[1]).max(self.distances[2])
    }

    /// Whether all three corners project onto the same target face.
    pub fn is_single_face(&self) -> bool {
        self.faces[0] == self.faces[1] && self.faces[1] == self.faces[2]
    }
}

/// Source mesh plus per-row distance and bound data.
#[derive(Debug, Clone)]
pub struct AugmentedMesh {
    positions: Vec<Point3>,
    distances: Vec<f64>,
    nearest_points: Vec<Point3>,
    nearest_faces: Vec<usize>,
    faces: Vec<[usize; 3]>,
    bounds: Vec<f64>,
    tags: Vec<BoundTag>,
    vertex_capacity: usize,
    face_capacity: usize,
    ceilings: Ceilings,
}

impl AugmentedMesh {
    /// Seed the augmented mesh from the source mesh and the oracle hits of
    /// its vertices.
    ///
    /// Face bounds start out as `+inf` / [`BoundTag::Unresolved`] until
    /// [`AugmentedMesh::set_bound`] fills them in.
    pub fn new(mesh: &TriMesh, hits: &[NearestHit], ceilings: Ceilings) -> Result<Self> {
        let n_vertices = mesh.num_vertices();
        let n_faces = mesh.num_faces();
        if hits.len() != n_vertices {
            return Err(BoundsError::invalid_input(format!(
                "{} nearest hits for {} vertices",
                hits.len(),
                n_vertices
            )));
        }
        check_ceiling(ResourceKind::Vertices, n_vertices, ceilings.max_vertices)?;
        check_ceiling(ResourceKind::Faces, n_faces, ceilings.max_faces)?;

        let vertex_capacity = initial_capacity(n_vertices, ceilings.max_vertices);
        let face_capacity = initial_capacity(n_faces, ceilings.max_faces);

        let mut out = Self {
            positions: Vec::with_capacity(vertex_capacity),
            distances: Vec::with_capacity(vertex_capacity),
            nearest_points: Vec::with_capacity(vertex_capacity),
            nearest_faces: Vec::with_capacity(vertex_capacity),
            faces: Vec::with_capacity(face_capacity),
            bounds: Vec::with_capacity(face_capacity),
            tags: Vec::with_capacity(face_capacity),
            vertex_capacity,
            face_capacity,
            ceilings,
        };

        for (p, hit) in mesh.vertices.iter().zip(hits) {
            out.append_vertex(*p, hit);
        }
        for &face in &mesh.faces {
            out.faces.push(face);
            out.bounds.push(f64::INFINITY);
            out.tags.push(BoundTag::Unresolved);
        }
        Ok(out)
    }

    /// Make sure `extra_vertices` and `extra_faces` more rows fit.
    ///
    /// Fails without touching the mesh when either ceiling would be
    /// exceeded. Otherwise grows the reserved storage by doubling, clamped
    /// to the ceiling.
    pub fn ensure_room(&mut self, extra_vertices: usize, extra_faces: usize) -> Result<()> {
        let want_vertices = self.vertex_count().saturating_add(extra_vertices);
        let want_faces = self.face_count().saturating_add(extra_faces);
        check_ceiling(ResourceKind::Vertices, want_vertices, self.ceilings.max_vertices)?;
        check_ceiling(ResourceKind::Faces, want_faces, self.ceilings.max_faces)?;

        if want_vertices > self.vertex_capacity {
            let cap = grown_capacity(self.vertex_capacity, want_vertices, self.ceilings.max_vertices);
            let extra = cap - self.positions.len();
            self.positions.reserve_exact(extra);
            self.distances.reserve_exact(extra);
            self.nearest_points.reserve_exact(extra);
            self.nearest_faces.reserve_exact(extra);
            debug!("Vertex capacity {} -> {}", self.vertex_capacity, cap);
            self.vertex_capacity = cap;
        }
        if want_faces > self.face_capacity {
            let cap = grown_capacity(self.face_capacity, want_faces, self.ceilings.max_faces);
            let extra = cap - self.faces.len();
            self.faces.reserve_exact(extra);
            self.bounds.reserve_exact(extra);
            self.tags.reserve_exact(extra);
            debug!("Face capacity {} -> {}", self.face_capacity, cap);
            self.face_capacity = cap;
        }
        Ok(())
    }

    /// Append a vertex with its nearest-point data; returns its row index.
    pub fn push_vertex(&mut self, position: Point3, hit: &NearestHit) -> Result<usize> {
        self.ensure_room(1, 0)?;
        Ok(self.append_vertex(position, hit))
    }

    /// Append a face with its bound; returns its row index.
    pub fn push_face(&mut self, face: [usize; 3], bound: TriangleBound) -> Result<usize> {
        self.ensure_room(0, 1)?;
        let index = self.faces.len();
        self.faces.push(face);
        self.bounds.push(bound.value);
        self.tags.push(bound.tag);
        Ok(index)
    }

    /// Overwrite the bound of face `f`.
    pub fn set_bound(&mut self, f: usize, bound: TriangleBound) {
        self.bounds[f] = bound.value;
        self.tags[f] = bound.tag;
    }

    fn append_vertex(&mut self, position: Point3, hit: &NearestHit) -> usize {
        let index = self.positions.len();
        self.positions.push(position);
        self.distances.push(hit.distance());
        self.nearest_points.push(hit.point);
        self.nearest_faces.push(hit.face);
        index
    }

    /// Number of vertex rows.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of face rows, including subdivided parents.
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Reserved vertex rows.
    pub fn vertex_capacity(&self) -> usize {
        self.vertex_capacity
    }

    /// Reserved face rows.
    pub fn face_capacity(&self) -> usize {
        self.face_capacity
    }

    /// Position of vertex `v`.
    pub fn position(&self, v: usize) -> Point3 {
        self.positions[v]
    }

    /// Exact distance of vertex `v` to the target.
    pub fn distance(&self, v: usize) -> f64 {
        self.distances[v]
    }

    /// Nearest target point of vertex `v`.
    pub fn nearest_point(&self, v: usize) -> Point3 {
        self.nearest_points[v]
    }

    /// Nearest target face of vertex `v`.
    pub fn nearest_face(&self, v: usize) -> usize {
        self.nearest_faces[v]
    }

    /// Vertex indices of face `f`.
    pub fn face(&self, f: usize) -> [usize; 3] {
        self.faces[f]
    }

    /// Current upper bound of face `f`.
    pub fn face_bound(&self, f: usize) -> f64 {
        self.bounds[f]
    }

    /// Cascade stage that produced the bound of face `f`.
    pub fn face_tag(&self, f: usize) -> BoundTag {
        self.tags[f]
    }

    /// Corner data of face `f`.
    pub fn sample(&self, f: usize) -> TriangleSample {
        self.sample_corners(self.faces[f])
    }

    /// Corner data of an arbitrary vertex triple.
    pub fn sample_corners(&self, tri: [usize; 3]) -> TriangleSample {
        TriangleSample {
            corners: tri.map(|v| self.positions[v]),
            distances: tri.map(|v| self.distances[v]),
            nearest: tri.map(|v| self.nearest_points[v]),
            faces: tri.map(|v| self.nearest_faces[v]),
        }
    }
}

/// Children of a 1-to-4 midpoint split.
///
/// `mids` holds the vertex rows of the midpoints of edges `(v0,v1)`,
/// `(v1,v2)` and `(v2,v0)` in that order. The three corner children keep
/// the parent's orientation; the fourth is the central triangle.
pub fn midpoint_split(parent: [usize; 3], mids: [usize; 3]) -> [[usize; 3]; 4] {
    let [v0, v1, v2] = parent;
    let [m01, m12, m20] = mids;
    [
        [v0, m01, m20],
        [v1, m12, m01],
        [v2, m20, m12],
        [m01, m12, m20],
    ]
}

fn check_ceiling(kind: ResourceKind, requested: usize, limit: usize) -> Result<()> {
    if requested > limit {
        return Err(BoundsError::ResourceExceeded {
            kind,
            requested,
            limit,
        });
    }
    Ok(())
}

fn initial_capacity(count: usize, ceiling: usize) -> usize {
    count.saturating_add(1).saturating_mul(16).min(ceiling)
}

fn grown_capacity(current: usize, needed: usize, ceiling: usize) -> usize {
    current.saturating_mul(2).max(needed).min(ceiling)
}
