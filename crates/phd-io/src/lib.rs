#![warn(missing_docs)]

//! Triangle mesh loading for the Hausdorff bound tools.
//!
//! Only Wavefront OBJ is supported, read with `tobj`. Vertex positions and
//! triangular faces are kept and all objects are merged into one mesh;
//! texture coordinates, normals and materials are skipped.
//!
//! # Example
//!
//! ```
//! use phd_io::parse_obj;
//!
//! let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
//! let mesh = parse_obj(src.as_bytes()).unwrap();
//! assert_eq!(mesh.num_faces(), 1);
//! ```

mod error;
mod obj;

pub use error::{IoError, IoResult};
pub use obj::{load_obj, parse_obj};
