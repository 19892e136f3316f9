//! This file contains the `wide` implementation of [`RayIntersection`].

use wide::f32x4;

use crate::aabb::Aabb;
use crate::utils::{fast_max, fast_min, has_nan};
use crate::{Real, Vector3};

use super::intersect_default::{accept, slab_entry, RayIntersection};
use super::Ray;

trait ToRegisterType {
    type Register;

    fn to_register(&self) -> Self::Register;
}

impl ToRegisterType for Vector3 {
    type Register = f32x4;

    #[inline(always)]
    fn to_register(&self) -> Self::Register {
        f32x4::new([self.z, self.z, self.y, self.x])
    }
}

/// Compute the horizontal maximum of the SIMD vector
#[inline(always)]
fn max_elem_f32x4(v: f32x4) -> Real {
    let a = v.to_array();
    fast_max(fast_max(a[0], a[1]), fast_max(a[2], a[3]))
}

/// Compute the horizontal minimum of the SIMD vector
#[inline(always)]
fn min_elem_f32x4(v: f32x4) -> Real {
    let a = v.to_array();
    fast_min(fast_min(a[0], a[1]), fast_min(a[2], a[3]))
}

#[inline(always)]
fn has_nan_f32x4(v: f32x4) -> bool {
    has_nan(&v.to_array())
}

impl RayIntersection for Ray {
    #[inline(always)]
    fn ray_aabb_entry(&self, aabb: &Aabb) -> Option<Real> {
        let ro = self.origin.coords.to_register();
        let ri = self.inv_direction.to_register();
        let aabb_0 = aabb.min.coords.to_register();
        let aabb_1 = aabb.max.coords.to_register();

        let v1 = (aabb_0 - ro) * ri;
        let v2 = (aabb_1 - ro) * ri;

        // 0 * inf on a face the ray is parallel to.
        if has_nan_f32x4(v1) | has_nan_f32x4(v2) {
            return slab_entry(self, aabb);
        }

        let inf = v1.fast_min(v2);
        let sup = v1.fast_max(v2);

        accept(max_elem_f32x4(inf), min_elem_f32x4(sup), self.t)
    }
}
