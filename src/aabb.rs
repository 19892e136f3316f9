//! Axis Aligned Bounding Boxes.

use std::fmt;

use crate::{Point3, Real, Vector3};

/// [`Aabb`] struct.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    /// Minimum coordinates
    pub min: Point3,

    /// Maximum coordinates
    pub max: Point3,
}

impl fmt::Display for Aabb {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Min bound: {}; Max bound: {}", self.min, self.max)
    }
}

/// Things which can be bounded by an [`Aabb`]. The builder grows node bounds through it.
pub trait Bounded {
    /// Returns the tightest [`Aabb`] around this object.
    ///
    /// # Examples
    /// ```
    /// use tribvh::aabb::Bounded;
    /// use tribvh::triangle::Triangle;
    /// use tribvh::Point3;
    ///
    /// let triangle = Triangle::new(
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(2.0, 0.0, 0.0),
    ///     Point3::new(0.0, 1.0, -1.0),
    /// );
    /// let aabb = triangle.aabb();
    ///
    /// assert_eq!(aabb.min, Point3::new(0.0, 0.0, -1.0));
    /// assert_eq!(aabb.max, Point3::new(2.0, 1.0, 0.0));
    /// ```
    fn aabb(&self) -> Aabb;
}

impl Aabb {
    /// Creates a new [`Aabb`] with the given bounds.
    pub fn with_bounds(min: Point3, max: Point3) -> Aabb {
        Aabb { min, max }
    }

    /// Creates a new empty [`Aabb`].
    ///
    /// The bounds are inverted (`min = +inf`, `max = -inf`) so that growing it by any point
    /// yields exactly that point.
    pub fn empty() -> Aabb {
        Aabb {
            min: Point3::new(Real::INFINITY, Real::INFINITY, Real::INFINITY),
            max: Point3::new(Real::NEG_INFINITY, Real::NEG_INFINITY, Real::NEG_INFINITY),
        }
    }

    /// Returns true if the [`Point3`] is inside the [`Aabb`]. Points on the boundary
    /// count as inside.
    pub fn contains(&self, p: &Point3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Returns a new minimal [`Aabb`] which contains both this [`Aabb`] and `other`.
    pub fn join(&self, other: &Aabb) -> Aabb {
        Aabb::with_bounds(self.min.inf(&other.min), self.max.sup(&other.max))
    }

    /// Returns a new minimal [`Aabb`] which contains both this [`Aabb`] and the
    /// [`Point3`] `other`.
    ///
    /// # Examples
    /// ```
    /// use tribvh::aabb::Aabb;
    /// use tribvh::Point3;
    ///
    /// let point1 = Point3::new(0.0, 0.0, 0.0);
    /// let point2 = Point3::new(1.0, 1.0, 1.0);
    /// let point3 = Point3::new(2.0, 2.0, 2.0);
    ///
    /// let aabb = Aabb::empty();
    /// assert!(!aabb.contains(&point1));
    ///
    /// let aabb1 = aabb.grow(&point1);
    /// assert!(aabb1.contains(&point1));
    ///
    /// let aabb2 = aabb.grow(&point2);
    /// assert!(aabb2.contains(&point2));
    /// assert!(!aabb2.contains(&point3));
    /// ```
    pub fn grow(&self, other: &Point3) -> Aabb {
        Aabb::with_bounds(self.min.inf(other), self.max.sup(other))
    }

    /// Returns a copy of this [`Aabb`] pushed outward by `margin` on every axis.
    ///
    /// Node bounds are expanded this way so that rays tangent to a box face are not lost
    /// to floating point rounding in the slab test.
    pub fn expanded(&self, margin: Real) -> Aabb {
        let margin = Vector3::new(margin, margin, margin);
        Aabb::with_bounds(self.min - margin, self.max + margin)
    }
}
