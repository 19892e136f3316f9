#![no_main]
use std::fmt::{self, Debug, Formatter};

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use ordered_float::NotNan;
use tribvh::bvh::Bvh;
use tribvh::ray::Ray;
use tribvh::triangle::Triangle;
use tribvh::{Point3, Real, DEFAULT_AABB_EXPANSION};

const LIMIT: Real = 1_000.0;

fuzz_target!(|workload: Workload| {
    workload.fuzz();
});

#[derive(Arbitrary)]
struct ArbitraryPoint {
    coordinates: [NotNan<Real>; 3],
}

impl ArbitraryPoint {
    fn point(&self) -> Point3 {
        let [x, y, z] = self.coordinates.map(|f| f.into_inner().clamp(-LIMIT, LIMIT));
        Point3::new(x, y, z)
    }
}

#[derive(Arbitrary)]
struct ArbitraryTriangle {
    a: ArbitraryPoint,
    b: ArbitraryPoint,
    c: ArbitraryPoint,
}

impl ArbitraryTriangle {
    fn triangle(&self) -> Triangle {
        Triangle::new(self.a.point(), self.b.point(), self.c.point())
    }
}

impl Debug for ArbitraryTriangle {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Debug::fmt(&self.triangle(), f)
    }
}

#[derive(Arbitrary)]
struct ArbitraryRay {
    origin: ArbitraryPoint,
    destination: ArbitraryPoint,
}

impl ArbitraryRay {
    fn ray(&self) -> Ray {
        let origin = self.origin.point();
        Ray::new(origin, self.destination.point() - origin)
    }
}

impl Debug for ArbitraryRay {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Debug::fmt(&self.ray(), f)
    }
}

#[derive(Debug, Arbitrary)]
struct Workload {
    triangles: Vec<ArbitraryTriangle>,
    rays: Vec<ArbitraryRay>,
}

impl Workload {
    fn fuzz(self) {
        let triangles = self
            .triangles
            .iter()
            .map(ArbitraryTriangle::triangle)
            .collect::<Vec<_>>();
        let bvh = Bvh::build(triangles.clone(), DEFAULT_AABB_EXPANSION);

        bvh.assert_consistent();
        assert_eq!(bvh.leaf_triangle_count(), triangles.len());
        assert!(bvh.node_count() <= (2 * triangles.len()).saturating_sub(1));

        for ray in self.rays.iter().map(ArbitraryRay::ray) {
            let brute_force = triangles
                .iter()
                .filter_map(|triangle| triangle.intersect(&ray))
                .fold(None, |closest: Option<Real>, d| match closest {
                    Some(c) if c <= d => Some(c),
                    _ => Some(d),
                });

            let hit = bvh.intersect(ray.origin, ray.direction);
            assert_eq!(hit, brute_force, "{:?}", ray);
            assert_eq!(
                bvh.occluded(ray.origin, ray.direction, Real::INFINITY),
                hit.is_some()
            );
        }
    }
}
