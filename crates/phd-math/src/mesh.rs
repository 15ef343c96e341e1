//! Indexed triangle soup.

use crate::bbox::Aabb3;
use crate::error::{MeshError, Result};
use crate::{is_finite, Point3};

/// A triangle soup: vertex positions and 0-based corner indices.
///
/// No connectivity or manifoldness is assumed. Faces are triangles by
/// construction; loaders reject anything else before building one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Triangle corner indices into `vertices`.
    pub faces: Vec<[usize; 3]>,
}

impl TriMesh {
    /// Create a mesh from positions and faces.
    pub fn new(vertices: Vec<Point3>, faces: Vec<[usize; 3]>) -> Self {
        Self { vertices, faces }
    }

    /// Create a mesh from row arrays, the layout most loaders produce.
    pub fn from_rows(vertices: &[[f64; 3]], faces: &[[usize; 3]]) -> Self {
        Self {
            vertices: vertices
                .iter()
                .map(|v| Point3::new(v[0], v[1], v[2]))
                .collect(),
            faces: faces.to_vec(),
        }
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Corner positions of face `f`.
    ///
    /// Panics if `f` or one of its indices is out of range; call
    /// [`TriMesh::validate`] first on untrusted input.
    pub fn triangle(&self, f: usize) -> [Point3; 3] {
        let [a, b, c] = self.faces[f];
        [self.vertices[a], self.vertices[b], self.vertices[c]]
    }

    /// Axis-aligned bounds of the vertex set.
    pub fn bounds(&self) -> Aabb3 {
        let mut aabb = Aabb3::empty();
        for v in &self.vertices {
            aabb.include_point(v);
        }
        aabb
    }

    /// Check that the mesh is non-empty, every index is in range and every
    /// coordinate is finite.
    pub fn validate(&self) -> Result<()> {
        if self.vertices.is_empty() || self.faces.is_empty() {
            return Err(MeshError::Empty {
                vertices: self.vertices.len(),
                faces: self.faces.len(),
            });
        }
        if let Some(i) = self.vertices.iter().position(|v| !is_finite(v)) {
            return Err(MeshError::NonFinite(i));
        }
        let vertex_count = self.vertices.len();
        for (face, tri) in self.faces.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i >= vertex_count) {
                return Err(MeshError::IndexOutOfRange {
                    face,
                    index,
                    vertex_count,
                });
            }
        }
        Ok(())
    }
}
