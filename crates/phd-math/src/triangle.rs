//! Triangle measurements and point-triangle proximity.

use crate::{Plane, Point3};

/// Closest point on the segment `a`-`b` to `p`.
pub fn closest_point_on_segment(p: &Point3, a: &Point3, b: &Point3) -> Point3 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq == 0.0 {
        return *a;
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Closest point on triangle `tri` to `p`.
///
/// Region classification after Ericson, "Real-Time Collision Detection".
/// Degenerate (zero-area) triangles fall back to the nearest of the three
/// edge segments.
pub fn closest_point_on_triangle(p: &Point3, tri: &[Point3; 3]) -> Point3 {
    let [v0, v1, v2] = tri;
    let ab = v1 - v0;
    let ac = v2 - v0;
    if ab.cross(&ac).norm_squared() == 0.0 {
        return closest_on_edges(p, tri);
    }
    let ap = p - v0;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return *v0;
    }

    let bp = p - v1;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return *v1;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let Some(v) = edge_ratio(d1, d1 - d3) else {
            return closest_on_edges(p, tri);
        };
        return v0 + ab * v;
    }

    let cp = p - v2;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return *v2;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let Some(w) = edge_ratio(d2, d2 - d6) else {
            return closest_on_edges(p, tri);
        };
        return v0 + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let Some(w) = edge_ratio(d4 - d3, (d4 - d3) + (d5 - d6)) else {
            return closest_on_edges(p, tri);
        };
        return v1 + (v2 - v1) * w;
    }

    let sum = va + vb + vc;
    if sum == 0.0 || !sum.is_finite() {
        return closest_on_edges(p, tri);
    }
    let denom = 1.0 / sum;
    v0 + ab * (vb * denom) + ac * (vc * denom)
}

/// `num / den` for an edge-region parameter, `None` when the edge has
/// collapsed and the ratio is undefined.
fn edge_ratio(num: f64, den: f64) -> Option<f64> {
    let t = num / den;
    (den > 0.0 && t.is_finite()).then(|| t.clamp(0.0, 1.0))
}

fn closest_on_edges(p: &Point3, tri: &[Point3; 3]) -> Point3 {
    let candidates = [
        closest_point_on_segment(p, &tri[0], &tri[1]),
        closest_point_on_segment(p, &tri[1], &tri[2]),
        closest_point_on_segment(p, &tri[2], &tri[0]),
    ];
    let mut best = candidates[0];
    let mut best_sq = (best - p).norm_squared();
    for c in &candidates[1..] {
        let sq = (c - p).norm_squared();
        if sq < best_sq {
            best_sq = sq;
            best = *c;
        }
    }
    best
}

/// Squared distance from `p` to triangle `tri`.
pub fn point_triangle_squared_distance(p: &Point3, tri: &[Point3; 3]) -> f64 {
    (closest_point_on_triangle(p, tri) - p).norm_squared()
}

/// Edge lengths indexed by the opposite corner: `e[c] = |v[c+1] - v[c+2]|`.
pub fn opposite_edge_lengths(tri: &[Point3; 3]) -> [f64; 3] {
    [
        (tri[1] - tri[2]).norm(),
        (tri[2] - tri[0]).norm(),
        (tri[0] - tri[1]).norm(),
    ]
}

/// Supporting plane of a triangle with normal `(v2 - v0) x (v1 - v0)`,
/// anchored at `v2`.
///
/// The normal is zero for a degenerate triangle.
pub fn supporting_plane(tri: &[Point3; 3]) -> Plane {
    let n = (tri[2] - tri[0]).cross(&(tri[1] - tri[0]));
    Plane::from_normal_and_point(n, &tri[2])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri() -> [Point3; 3] {
        [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(0.0, 4.0, 0.0),
        ]
    }

    #[test]
    fn test_closest_point_interior() {
        let q = closest_point_on_triangle(&Point3::new(1.0, 1.0, 5.0), &tri());
        assert!((q - Point3::new(1.0, 1.0, 0.0)).norm() < 1e-12);
        assert!((point_triangle_squared_distance(&Point3::new(1.0, 1.0, 5.0), &tri()) - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_closest_point_vertex_region() {
        let q = closest_point_on_triangle(&Point3::new(-1.0, -1.0, 0.0), &tri());
        assert_eq!(q, Point3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_closest_point_edge_region() {
        let q = closest_point_on_triangle(&Point3::new(3.0, 3.0, 0.0), &tri());
        assert!((q - Point3::new(2.0, 2.0, 0.0)).norm() < 1e-12);
        let q = closest_point_on_triangle(&Point3::new(2.0, -3.0, 1.0), &tri());
        assert!((q - Point3::new(2.0, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_degenerate_triangle_uses_edges() {
        let line = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        let q = closest_point_on_triangle(&Point3::new(1.5, 2.0, 0.0), &line);
        assert!((q - Point3::new(1.5, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_repeated_corner_is_a_segment() {
        let o = Point3::new(0.0, 0.0, 0.0);
        let x = Point3::new(1.0, 0.0, 0.0);
        let p = Point3::new(0.5, 1.0, 0.0);
        for t in [[o, o, x], [o, x, x], [x, o, x], [x, o, o], [o, x, o]] {
            let q = closest_point_on_triangle(&p, &t);
            assert!((q - Point3::new(0.5, 0.0, 0.0)).norm() < 1e-12, "{:?}", t);
            assert!((point_triangle_squared_distance(&p, &t) - 1.0).abs() < 1e-12);
        }

        // All three corners on one point.
        let q = closest_point_on_triangle(&p, &[x, x, x]);
        assert_eq!(q, x);
    }

    #[test]
    fn test_opposite_edge_lengths() {
        let e = opposite_edge_lengths(&tri());
        assert!((e[0] - 32f64.sqrt()).abs() < 1e-12);
        assert!((e[1] - 4.0).abs() < 1e-12);
        assert!((e[2] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_supporting_plane_contains_corners() {
        let t = [
            Point3::new(1.0, 0.0, 2.0),
            Point3::new(0.0, 3.0, 1.0),
            Point3::new(2.0, 2.0, -1.0),
        ];
        let plane = supporting_plane(&t);
        for p in &t {
            assert!(plane.eval(p).abs() < 1e-10);
        }
    }

    #[test]
    fn test_segment_zero_length() {
        let a = Point3::new(1.0, 1.0, 1.0);
        assert_eq!(closest_point_on_segment(&Point3::origin(), &a, &a), a);
    }
}
