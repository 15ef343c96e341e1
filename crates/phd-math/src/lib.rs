#![warn(missing_docs)]

//! Math types for the phd distance-bound crates.
//!
//! Thin wrappers around nalgebra providing the handful of geometric types
//! the bound engine needs: points, vectors, implicit planes, bounding boxes,
//! point-triangle distance, and the indexed triangle soup both meshes are
//! stored as.

use nalgebra::Vector3;

pub mod bbox;
mod error;
mod mesh;
mod plane;
pub mod triangle;

pub use bbox::Aabb3;
pub use error::{MeshError, Result};
pub use mesh::TriMesh;
pub use plane::Plane;

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// Midpoint of the segment `a`-`b`, computed as `a/2 + b/2`.
///
/// Splitting the halves keeps the result finite for coordinates near the
/// representable range.
pub fn midpoint(a: &Point3, b: &Point3) -> Point3 {
    Point3::from(a.coords / 2.0 + b.coords / 2.0)
}

/// Barycenter of a triangle.
pub fn barycenter(a: &Point3, b: &Point3, c: &Point3) -> Point3 {
    Point3::from((a.coords + b.coords + c.coords) / 3.0)
}

/// Whether all three coordinates are finite.
pub fn is_finite(p: &Point3) -> bool {
    p.x.is_finite() && p.y.is_finite() && p.z.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midpoint() {
        let m = midpoint(&Point3::new(0.0, 0.0, 0.0), &Point3::new(2.0, 4.0, -6.0));
        assert!((m - Point3::new(1.0, 2.0, -3.0)).norm() < 1e-12);
    }

    #[test]
    fn test_midpoint_large_coordinates() {
        let big = f64::MAX;
        let m = midpoint(&Point3::new(big, 0.0, 0.0), &Point3::new(big, 0.0, 0.0));
        assert!(m.x.is_finite());
        assert_eq!(m.x, big);
    }

    #[test]
    fn test_barycenter() {
        let c = barycenter(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(3.0, 0.0, 0.0),
            &Point3::new(0.0, 3.0, 0.0),
        );
        assert!((c - Point3::new(1.0, 1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_is_finite() {
        assert!(is_finite(&Point3::new(1.0, 2.0, 3.0)));
        assert!(!is_finite(&Point3::new(f64::NAN, 2.0, 3.0)));
        assert!(!is_finite(&Point3::new(1.0, f64::INFINITY, 3.0)));
    }
}
