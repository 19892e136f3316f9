//! This module defines a Triangle, the only primitive stored in a [`Bvh`].
//!
//! [`Bvh`]: ../bvh/struct.Bvh.html

use crate::aabb::{Aabb, Bounded};
use crate::ray::Ray;
use crate::{Point3, Real};

/// A triangle struct. Three vertices, no winding requirement.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Triangle {
    /// First point on the triangle
    pub a: Point3,
    /// Second point on the triangle
    pub b: Point3,
    /// Third point on the triangle
    pub c: Point3,
}

impl Triangle {
    /// Creates a new triangle from three points.
    pub fn new(a: Point3, b: Point3, c: Point3) -> Triangle {
        Triangle { a, b, c }
    }

    /// Returns the vertices as an array, in `a`, `b`, `c` order.
    pub fn vertices(&self) -> [Point3; 3] {
        [self.a, self.b, self.c]
    }

    /// Returns the centroid, the mean of the three vertices.
    pub fn centroid(&self) -> Point3 {
        Point3::from((self.a.coords + self.b.coords + self.c.coords) / 3.0)
    }

    /// Returns the distance along `ray` at which it hits this triangle, if it does.
    ///
    /// The ray's current best distance is not consulted.
    pub fn intersect(&self, ray: &Ray) -> Option<Real> {
        ray.intersects_triangle(&self.a, &self.b, &self.c)
    }
}

impl Bounded for Triangle {
    fn aabb(&self) -> Aabb {
        Aabb::empty().grow(&self.a).grow(&self.b).grow(&self.c)
    }
}
