//! Axis-aligned bounding boxes.
//!
//! Used for the normalisation diagonal of the source mesh and as the node
//! volume of the nearest-point tree over the target mesh.

use crate::{Point3, Vec3};

/// Axis-aligned bounding box in 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb3 {
    /// Create an AABB from min and max corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Create an empty (inverted) AABB suitable for expansion.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Smallest box containing the three corners of a triangle.
    pub fn from_triangle(tri: &[Point3; 3]) -> Self {
        let mut aabb = Self::empty();
        for p in tri {
            aabb.include_point(p);
        }
        aabb
    }

    /// True until at least one point has been included.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand this AABB to include a point.
    pub fn include_point(&mut self, p: &Point3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Expand this AABB to include another box.
    pub fn include_box(&mut self, other: &Aabb3) {
        if other.is_empty() {
            return;
        }
        self.include_point(&other.min);
        self.include_point(&other.max);
    }

    /// Edge lengths along x, y, z. Zero for an empty box.
    pub fn extent(&self) -> Vec3 {
        if self.is_empty() {
            return Vec3::zeros();
        }
        self.max - self.min
    }

    /// Center of the box.
    pub fn center(&self) -> Point3 {
        crate::midpoint(&self.min, &self.max)
    }

    /// Length of the box diagonal. Zero for an empty box.
    pub fn diagonal(&self) -> f64 {
        self.extent().norm()
    }

    /// Surface area of the box.
    pub fn surface_area(&self) -> f64 {
        let d = self.extent();
        2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
    }

    /// Squared distance from `p` to the box, zero when `p` is inside.
    pub fn squared_distance_to(&self, p: &Point3) -> f64 {
        let mut sq = 0.0;
        for axis in 0..3 {
            let v = p[axis];
            if v < self.min[axis] {
                sq += (self.min[axis] - v).powi(2);
            } else if v > self.max[axis] {
                sq += (v - self.max[axis]).powi(2);
            }
        }
        sq
    }
}
