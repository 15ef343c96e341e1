use crate::{Point3, Vec3};

/// Implicit plane `a*x + b*y + c*z + d = 0`.
///
/// The normal `(a, b, c)` is not required to be unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// x coefficient.
    pub a: f64,
    /// y coefficient.
    pub b: f64,
    /// z coefficient.
    pub c: f64,
    /// Constant term.
    pub d: f64,
}

impl Plane {
    /// Create a plane from its four coefficients.
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { a, b, c, d }
    }

    /// Plane with normal `n` passing through `p`.
    pub fn from_normal_and_point(n: Vec3, p: &Point3) -> Self {
        Self::new(n.x, n.y, n.z, -n.dot(&p.coords))
    }

    /// The (unnormalised) normal vector.
    pub fn normal(&self) -> Vec3 {
        Vec3::new(self.a, self.b, self.c)
    }

    /// Signed evaluation `a*x + b*y + c*z + d`.
    pub fn eval(&self, p: &Point3) -> f64 {
        self.a * p.x + self.b * p.y + self.c * p.z + self.d
    }

    /// Divide all four coefficients by the normal's magnitude.
    ///
    /// A zero normal produces non-finite coefficients.
    pub fn normalized(&self) -> Self {
        let r = self.normal().norm();
        Self::new(self.a / r, self.b / r, self.c / r, self.d / r)
    }

    /// Coefficient-wise difference `self - other`.
    pub fn minus(&self, other: &Plane) -> Self {
        Self::new(
            self.a - other.a,
            self.b - other.b,
            self.c - other.c,
            self.d - other.d,
        )
    }

    /// Whether all four coefficients are finite.
    pub fn is_finite(&self) -> bool {
        self.a.is_finite() && self.b.is_finite() && self.c.is_finite() && self.d.is_finite()
    }

    /// Parameter `t` at which the segment `p1 + t (p2 - p1)` meets the plane.
    ///
    /// Not clamped to `[0, 1]`. Non-finite when the segment is parallel to
    /// the plane.
    pub fn segment_parameter(&self, p1: &Point3, p2: &Point3) -> f64 {
        -self.eval(p1) / self.normal().dot(&(p2 - p1))
    }
}
