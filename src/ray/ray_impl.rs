//! This module defines a Ray structure and intersection algorithms
//! for axis aligned bounding boxes and triangles.

use crate::aabb::Aabb;
use crate::{Point3, Real, Vector3, DETERMINANT_EPSILON, EPSILON};

use super::intersect_default::RayIntersection;

/// A struct which defines a ray, its cached reciprocal direction and the distance of the
/// closest hit found so far.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// The ray origin.
    pub origin: Point3,

    /// The ray direction. Not normalized, so distances are measured in multiples of its length.
    pub direction: Vector3,

    /// Inverse (1/x) ray direction. Cached for use in [`Aabb`] intersections.
    /// A zero component yields an infinite entry here.
    pub inv_direction: Vector3,

    /// Distance to the closest hit so far, `+inf` while nothing has been hit.
    pub t: Real,
}

impl Ray {
    /// Creates a new [`Ray`] from an `origin` and a `direction`.
    /// `direction` is taken as is, it is **not** normalized.
    ///
    /// # Examples
    /// ```
    /// use tribvh::ray::Ray;
    /// use tribvh::{Point3, Vector3};
    ///
    /// let origin = Point3::new(0.0, 0.0, 0.0);
    /// let direction = Vector3::new(2.0, 0.0, 0.0);
    /// let ray = Ray::new(origin, direction);
    ///
    /// assert_eq!(ray.origin, origin);
    /// assert_eq!(ray.direction, direction);
    /// assert_eq!(ray.inv_direction.x, 0.5);
    /// assert!(ray.inv_direction.y.is_infinite());
    /// assert_eq!(ray.t, f32::INFINITY);
    /// ```
    pub fn new(origin: Point3, direction: Vector3) -> Ray {
        Ray::with_limit(origin, direction, Real::INFINITY)
    }

    /// Creates a new [`Ray`] which ignores everything at or beyond distance `t`.
    pub fn with_limit(origin: Point3, direction: Vector3, t: Real) -> Ray {
        Ray {
            origin,
            direction,
            inv_direction: direction.map(|x| 1.0 / x),
            t,
        }
    }

    /// Returns true once a hit has been recorded.
    pub fn is_hit(&self) -> bool {
        self.t < Real::INFINITY
    }

    /// Returns the point at distance `t` along the ray.
    pub fn at(&self, t: Real) -> Point3 {
        self.origin + self.direction * t
    }

    /// Records `distance` as the new closest hit if it is closer than the current one.
    /// Returns whether the ray was tightened.
    pub fn tighten(&mut self, distance: Real) -> bool {
        if distance < self.t {
            self.t = distance;
            true
        } else {
            false
        }
    }

    /// Slab test of this [`Ray`] against an [`Aabb`].
    ///
    /// Returns the entry distance when the box is hit in front of the origin and before the
    /// current closest hit `t`. The entry distance is negative when the origin lies inside
    /// the box. Touching a face or edge counts as a hit.
    ///
    /// # Examples
    /// ```
    /// use tribvh::aabb::Aabb;
    /// use tribvh::ray::Ray;
    /// use tribvh::{Point3, Vector3};
    ///
    /// let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
    ///
    /// let point1 = Point3::new(99.9, -1.0, -1.0);
    /// let point2 = Point3::new(100.1, 1.0, 1.0);
    /// let aabb = Aabb::with_bounds(point1, point2);
    ///
    /// let entry = ray.intersect_aabb(&aabb).unwrap();
    /// assert!((entry - 99.9).abs() < 1e-4);
    /// ```
    pub fn intersect_aabb(&self, aabb: &Aabb) -> Option<Real> {
        self.ray_aabb_entry(aabb)
    }

    /// Returns true if [`Ray::intersect_aabb`] reports a hit.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        self.ray_aabb_entry(aabb).is_some()
    }

    /// Implementation of the
    /// [Möller-Trumbore triangle/ray intersection algorithm](https://en.wikipedia.org/wiki/M%C3%B6ller%E2%80%93Trumbore_intersection_algorithm).
    ///
    /// Both faces are hit. Returns the distance to the intersection, or `None` if the ray
    /// is parallel to the triangle, misses it, or hits it no further than [`EPSILON`] from
    /// the origin. The ray's current closest hit is not consulted.
    #[allow(clippy::many_single_char_names)]
    pub fn intersects_triangle(&self, a: &Point3, b: &Point3, c: &Point3) -> Option<Real> {
        let a_to_b = *b - *a;
        let a_to_c = *c - *a;

        // u_vec lies in the view plane
        let u_vec = self.direction.cross(&a_to_c);

        // det = 0 => [dir, a_to_b, a_to_c] not linearly independent
        let det = a_to_b.dot(&u_vec);
        if det.abs() < DETERMINANT_EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let a_to_origin = self.origin - *a;

        let u = a_to_origin.dot(&u_vec) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let v_vec = a_to_origin.cross(&a_to_b);
        let v = self.direction.dot(&v_vec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let dist = a_to_c.dot(&v_vec) * inv_det;
        if dist > EPSILON {
            Some(dist)
        } else {
            None
        }
    }
}
