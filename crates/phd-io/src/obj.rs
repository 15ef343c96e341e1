//! Wavefront OBJ loading through `tobj`.

use std::io::{BufReader, Read};
use std::path::Path;

use phd_math::{Point3, TriMesh};
use tobj::{LoadError, LoadOptions, Model};
use tracing::debug;

use crate::error::{IoError, IoResult};

/// Faces keep their corner count so non-triangles can be rejected.
fn load_options() -> LoadOptions {
    LoadOptions {
        single_index: true,
        triangulate: false,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    }
}

/// Load a triangle mesh from an OBJ file.
///
/// Every object and group in the file is merged into one mesh. Material
/// libraries are not needed and a missing one is ignored.
pub fn load_obj<P: AsRef<Path>>(path: P) -> IoResult<TriMesh> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let (models, _) = tobj::load_obj(path, &load_options())?;
    let mesh = merge_models(&models)?;
    debug!(
        "Loaded {}: {} objects, {} vertices, {} faces",
        path.display(),
        models.len(),
        mesh.num_vertices(),
        mesh.num_faces()
    );
    Ok(mesh)
}

/// Parse OBJ text into a validated triangle mesh.
///
/// Face corners may be written `v`, `v/vt`, `v//vn` or `v/vt/vn`, with
/// negative indices counting back from the latest vertex. `mtllib` records
/// are skipped.
pub fn parse_obj<R: Read>(reader: R) -> IoResult<TriMesh> {
    let mut reader = BufReader::new(reader);
    let (models, _) = tobj::load_obj_buf(&mut reader, &load_options(), |_| {
        Err(LoadError::OpenFileFailed)
    })?;
    merge_models(&models)
}

fn merge_models(models: &[Model]) -> IoResult<TriMesh> {
    let mut vertices = Vec::new();
    let mut faces = Vec::new();

    for model in models {
        let mesh = &model.mesh;
        // Empty arities means every face is a triangle.
        if let Some((i, &corners)) = mesh.face_arities.iter().enumerate().find(|&(_, &n)| n != 3) {
            return Err(IoError::NotTriangulated {
                face: faces.len() + i,
                corners: corners as usize,
            });
        }

        let base = vertices.len();
        vertices.extend(
            mesh.positions
                .chunks_exact(3)
                .map(|p| Point3::new(f64::from(p[0]), f64::from(p[1]), f64::from(p[2]))),
        );
        faces.extend(mesh.indices.chunks_exact(3).map(|t| {
            [
                base + t[0] as usize,
                base + t[1] as usize,
                base + t[2] as usize,
            ]
        }));
    }

    let mesh = TriMesh::new(vertices, faces);
    mesh.validate()?;
    Ok(mesh)
}
