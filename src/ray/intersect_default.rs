//! This file contains the scalar implementation of [`RayIntersection`]

use super::Ray;
use crate::aabb::Aabb;
use crate::axis::Axis;
use crate::utils::{fast_max, fast_min};
use crate::Real;

/// The [`RayIntersection`] trait allows swapping the slab test for a SIMD version
/// behind the `simd` feature.
pub trait RayIntersection {
    /// Returns the entry distance of the ray into `aabb`, or `None` on a miss.
    fn ray_aabb_entry(&self, aabb: &Aabb) -> Option<Real>;
}

#[cfg(not(feature = "simd"))]
impl RayIntersection for Ray {
    #[inline(always)]
    fn ray_aabb_entry(&self, aabb: &Aabb) -> Option<Real> {
        slab_entry(self, aabb)
    }
}

/// Per-axis slab test.
///
/// An axis whose reciprocal direction is infinite is parallel to that slab: the ray is
/// either inside it for every distance or never.
#[inline(always)]
pub(crate) fn slab_entry(ray: &Ray, aabb: &Aabb) -> Option<Real> {
    let mut entry = Real::NEG_INFINITY;
    let mut exit = Real::INFINITY;

    for axis in Axis::ALL {
        let origin = ray.origin[axis];
        let inv = ray.inv_direction[axis];

        if inv.is_infinite() {
            if origin < aabb.min[axis] || origin > aabb.max[axis] {
                return None;
            }
            continue;
        }

        let t0 = (aabb.min[axis] - origin) * inv;
        let t1 = (aabb.max[axis] - origin) * inv;
        entry = fast_max(entry, fast_min(t0, t1));
        exit = fast_min(exit, fast_max(t0, t1));
    }

    accept(entry, exit, ray.t)
}

/// A box counts as hit when the slab interval is non-empty, starts before the current
/// best hit and ends in front of the origin. NaN in either bound is a miss.
#[inline(always)]
pub(crate) fn accept(entry: Real, exit: Real, t_limit: Real) -> Option<Real> {
    if exit >= entry && entry < t_limit && exit > 0.0 {
        Some(entry)
    } else {
        None
    }
}
