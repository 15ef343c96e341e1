//! Bisector planes and their intersections with triangle edges.

use phd_math::triangle::supporting_plane;
use phd_math::{is_finite, Plane, Point3};

use crate::error::{BoundsError, Result};

/// Crossings closer than this (in edge parameter) to either endpoint are
/// treated as missing.
pub const EDGE_PARAMETER_EPSILON: f64 = 1e-6;

/// Perpendicular bisector plane of two points.
///
/// Every point `x` with `|x - q1| == |x - q2|` satisfies `plane.eval(x) == 0`.
/// The normal is `q2 - q1`, so it is non-zero for distinct points.
pub fn point_bisector(q1: &Point3, q2: &Point3) -> Result<Plane> {
    if !is_finite(q1) || !is_finite(q2) {
        return Err(BoundsError::geometry(
            "point bisector of a non-finite point",
        ));
    }
    let n = q2 - q1;
    if n.x == 0.0 && n.y == 0.0 && n.z == 0.0 {
        return Err(BoundsError::geometry(
            "point bisector of two coincident points",
        ));
    }
    let mid = Point3::from((q1.coords + q2.coords) / 2.0);
    Ok(Plane::from_normal_and_point(n, &mid))
}

/// Angle bisector of the supporting planes of two triangles.
///
/// Each supporting plane is normalised by its normal's magnitude and the
/// bisector is their coefficient-wise difference. A degenerate triangle
/// yields non-finite coefficients.
pub fn face_bisector(u: &[Point3; 3], v: &[Point3; 3]) -> Plane {
    supporting_plane(u)
        .normalized()
        .minus(&supporting_plane(v).normalized())
}

/// Intersection of the edge `p1`-`p2` with the face bisector of `u` and `v`.
///
/// Returns the edge midpoint `(p1 + p2) / 2` when both endpoints lie
/// strictly on the same side of the bisector, when the crossing is within
/// [`EDGE_PARAMETER_EPSILON`] of an endpoint, or when the bisector is
/// undefined.
pub fn face_bisector_edge_intersection(
    p1: &Point3,
    p2: &Point3,
    u: &[Point3; 3],
    v: &[Point3; 3],
) -> Result<Point3> {
    if !is_finite(p1) || !is_finite(p2) {
        return Err(BoundsError::geometry(
            "edge-bisector intersection with a non-finite edge",
        ));
    }

    let midpoint = Point3::from((p1.coords + p2.coords) / 2.0);
    let plane = face_bisector(u, v);

    if plane.eval(p1) * plane.eval(p2) > 0.0 {
        return Ok(midpoint);
    }

    let t = plane.segment_parameter(p1, p2);
    if t > EDGE_PARAMETER_EPSILON && t < 1.0 - EDGE_PARAMETER_EPSILON {
        Ok(p1 + (p2 - p1) * t)
    } else {
        Ok(midpoint)
    }
}
