//! One refinement step: split a face into four and bound the children.

use phd_math::midpoint;
use phd_oracle::DistanceOracle;

use crate::cascade::{bound_triangle, BoundTag, TriangleBound};
use crate::error::Result;
use crate::lower::LowerBound;
use crate::mesh::{midpoint_split, AugmentedMesh};

/// Outcome of splitting one face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Subdivision {
    /// Face that was split.
    pub parent: usize,
    /// Vertex rows of the three new edge midpoints.
    pub vertices: [usize; 3],
    /// Face rows of the four children.
    pub children: [usize; 4],
    /// Bounds of the four children.
    pub bounds: [TriangleBound; 4],
}

/// Split `face` at its edge midpoints and bound the four children.
///
/// Room for three vertices and four faces is checked before anything is
/// written, so a ceiling failure leaves the mesh untouched. The midpoints
/// are measured against the target and fed to `lower` before any child is
/// bounded. Midpoints are not shared with neighbouring faces.
pub fn subdivide<O>(
    mesh: &mut AugmentedMesh,
    oracle: &O,
    face: usize,
    lower: &mut LowerBound,
) -> Result<Subdivision>
where
    O: DistanceOracle + ?Sized,
{
    mesh.ensure_room(3, 4)?;

    let parent = mesh.face(face);
    let [a, b, c] = parent.map(|v| mesh.position(v));
    let points = [midpoint(&a, &b), midpoint(&b, &c), midpoint(&c, &a)];
    let hits = oracle.query(&points);

    let mut vertices = [0; 3];
    for (k, (p, hit)) in points.iter().zip(&hits).enumerate() {
        let v = mesh.push_vertex(*p, hit)?;
        lower.observe(v, p, hit);
        vertices[k] = v;
    }

    let triples = midpoint_split(parent, vertices);
    let mut bounds = [TriangleBound {
        value: f64::INFINITY,
        tag: BoundTag::Unresolved,
    }; 4];
    for (bound, tri) in bounds.iter_mut().zip(&triples) {
        *bound = bound_triangle(&mesh.sample_corners(*tri), oracle, lower.value())?;
    }

    let mut children = [0; 4];
    for (k, (tri, bound)) in triples.iter().zip(&bounds).enumerate() {
        children[k] = mesh.push_face(*tri, *bound)?;
    }

    Ok(Subdivision {
        parent: face,
        vertices,
        children,
        bounds,
    })
}
