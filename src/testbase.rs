//! Common utilities shared by unit tests.
#![cfg(test)]

use num::{FromPrimitive, Integer};
use obj::raw::object::Polygon;
use obj::{load_obj, FromRawVertex, Obj, ObjResult};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::Rng;

use crate::triangle::Triangle;
use crate::{Point3, Real, Vector3};

/// A vector represented as a tuple
pub type TupleVec = (f32, f32, f32);

/// Generate a `TupleVec` for [`proptest::strategy::Strategy`] from -10e10 to 10e10
/// A small enough range to prevent most fp32 errors from breaking certain tests
pub fn tuplevec_small_strategy() -> impl Strategy<Value = TupleVec> {
    (
        -10e10_f32..10e10_f32,
        -10e10_f32..10e10_f32,
        -10e10_f32..10e10_f32,
    )
}

/// Generate a `TupleVec` inside a cube of half size `extent` around the origin.
pub fn tuplevec_scene_strategy(extent: f32) -> impl Strategy<Value = TupleVec> {
    (-extent..extent, -extent..extent, -extent..extent)
}

/// Convert a `TupleVec` to a [`Point3`].
pub fn tuple_to_point(tpl: &TupleVec) -> Point3 {
    Point3::new(tpl.0, tpl.1, tpl.2)
}

/// Convert a `TupleVec` to a [`Vector3`].
pub fn tuple_to_vector(tpl: &TupleVec) -> Vector3 {
    Vector3::new(tpl.0, tpl.1, tpl.2)
}

/// Two triangles forming a unit square in the z=0 plane, centered at the origin.
pub fn unit_square() -> Vec<Triangle> {
    vec![
        Triangle::new(
            Point3::new(-0.5, -0.5, 0.0),
            Point3::new(0.5, -0.5, 0.0),
            Point3::new(0.5, 0.5, 0.0),
        ),
        Triangle::new(
            Point3::new(-0.5, -0.5, 0.0),
            Point3::new(0.5, 0.5, 0.0),
            Point3::new(-0.5, 0.5, 0.0),
        ),
    ]
}

/// Creates a unit size cube centered at `pos` and pushes its twelve triangles to `shapes`.
pub fn push_cube(pos: Point3, shapes: &mut Vec<Triangle>) {
    let corner = |x: Real, y: Real, z: Real| pos + Vector3::new(x, y, z) * 0.5;
    let top_front_right = corner(1.0, 1.0, -1.0);
    let top_back_right = corner(1.0, 1.0, 1.0);
    let top_back_left = corner(-1.0, 1.0, 1.0);
    let top_front_left = corner(-1.0, 1.0, -1.0);
    let bottom_front_right = corner(1.0, -1.0, -1.0);
    let bottom_back_right = corner(1.0, -1.0, 1.0);
    let bottom_back_left = corner(-1.0, -1.0, 1.0);
    let bottom_front_left = corner(-1.0, -1.0, -1.0);

    let faces = [
        (top_back_right, top_front_right, top_front_left),
        (top_front_left, top_back_left, top_back_right),
        (bottom_front_left, bottom_front_right, bottom_back_right),
        (bottom_back_right, bottom_back_left, bottom_front_left),
        (top_back_left, top_front_left, bottom_front_left),
        (bottom_front_left, bottom_back_left, top_back_left),
        (bottom_front_right, top_front_right, top_back_right),
        (top_back_right, bottom_back_right, bottom_front_right),
        (top_front_left, top_front_right, bottom_front_right),
        (bottom_front_right, bottom_front_left, top_front_left),
        (bottom_back_right, top_back_right, top_back_left),
        (top_back_left, bottom_back_left, bottom_back_right),
    ];
    shapes.extend(faces.iter().map(|&(a, b, c)| Triangle::new(a, b, c)));
}

/// Returns a point with every coordinate drawn uniformly from `[-extent, extent)`.
pub fn random_point(rng: &mut StdRng, extent: Real) -> Point3 {
    Point3::new(
        rng.random_range(-extent..extent),
        rng.random_range(-extent..extent),
        rng.random_range(-extent..extent),
    )
}

/// Creates `n` unit cubes at random positions. Returns the `Vec` of surface `Triangle`s.
pub fn create_n_cubes(n: usize, extent: Real, rng: &mut StdRng) -> Vec<Triangle> {
    let mut triangles = Vec::with_capacity(n * 12);
    for _ in 0..n {
        push_cube(random_point(rng, extent), &mut triangles);
    }
    triangles
}

/// Creates `n` triangles with random vertices, including slivers and degenerate ones.
pub fn create_n_random_triangles(n: usize, extent: Real, rng: &mut StdRng) -> Vec<Triangle> {
    (0..n)
        .map(|_| {
            Triangle::new(
                random_point(rng, extent),
                random_point(rng, extent),
                random_point(rng, extent),
            )
        })
        .collect()
}

/// Closest hit by testing every triangle, the reference result for traversal tests.
pub fn brute_force_closest(triangles: &[Triangle], origin: Point3, direction: Vector3) -> Option<Real> {
    let ray = crate::ray::Ray::new(origin, direction);
    triangles
        .iter()
        .filter_map(|triangle| triangle.intersect(&ray))
        .fold(None, |closest: Option<Real>, d| match closest {
            Some(c) if c <= d => Some(c),
            _ => Some(d),
        })
}

/// A cube spanning `[-1, 1]` on every axis, written with quad faces.
pub const CUBE_OBJ: &str = "\
# cube
v -1.0 -1.0 -1.0
v 1.0 -1.0 -1.0
v 1.0 1.0 -1.0
v -1.0 1.0 -1.0
v -1.0 -1.0 1.0
v 1.0 -1.0 1.0
v 1.0 1.0 1.0
v -1.0 1.0 1.0
f 1 2 3 4
f 5 8 7 6
f 1 5 6 2
f 2 6 7 3
f 3 7 8 4
f 5 1 4 8
";

/// Loads [`CUBE_OBJ`] through `obj-rs`, triangulating each face.
pub fn load_cube_obj() -> Vec<Triangle> {
    let cube_obj: Obj<Triangle> = load_obj(CUBE_OBJ.as_bytes()).expect("Failed to decode .obj file data.");
    cube_obj.vertices
}

impl<I: FromPrimitive + Integer> FromRawVertex<I> for Triangle {
    fn process(
        vertices: Vec<(f32, f32, f32, f32)>,
        _: Vec<(f32, f32, f32)>,
        _: Vec<(f32, f32, f32)>,
        polygons: Vec<Polygon>,
    ) -> ObjResult<(Vec<Self>, Vec<I>)> {
        let points = vertices
            .into_iter()
            .map(|v| Point3::new(v.0, v.1, v.2))
            .collect::<Vec<_>>();

        let mut triangles = Vec::with_capacity(polygons.len());
        {
            // Fan triangulation around the first vertex.
            let mut push_fan = |indices: &[usize]| {
                let anchor = points[indices[0]];
                for pair in indices[1..].windows(2) {
                    triangles.push(Triangle::new(anchor, points[pair[0]], points[pair[1]]));
                }
            };

            for polygon in polygons {
                match polygon {
                    Polygon::P(ref vec) => push_fan(vec),
                    Polygon::PT(ref vec) | Polygon::PN(ref vec) => {
                        push_fan(&vec.iter().map(|vertex| vertex.0).collect::<Vec<_>>())
                    }
                    Polygon::PTN(ref vec) => {
                        push_fan(&vec.iter().map(|vertex| vertex.0).collect::<Vec<_>>())
                    }
                }
            }
        }
        Ok((triangles, Vec::new()))
    }
}
