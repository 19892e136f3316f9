//! A crate which builds a bounding volume hierarchy over a triangle mesh and answers
//! ray intersection queries against it.
//!
//! ## About
//!
//! The hierarchy is built once from static geometry. Each node covers a contiguous range
//! of the tree-owned triangle array and is split at the centroid mean of the axis with the
//! largest centroid variance, which keeps the tree balanced even for meshes made of long,
//! thin triangles. Queries walk the tree with an explicit stack, visit the nearer child
//! first and test leaf triangles exactly with the Möller-Trumbore algorithm.
//!
//! ## Example
//!
//! ```
//! use tribvh::bvh::Bvh;
//! use tribvh::triangle::Triangle;
//! use tribvh::{Point3, Vector3};
//!
//! // A unit square in the z=0 plane.
//! let triangles = vec![
//!     Triangle::new(
//!         Point3::new(-0.5, -0.5, 0.0),
//!         Point3::new(0.5, -0.5, 0.0),
//!         Point3::new(0.5, 0.5, 0.0),
//!     ),
//!     Triangle::new(
//!         Point3::new(-0.5, -0.5, 0.0),
//!         Point3::new(0.5, 0.5, 0.0),
//!         Point3::new(-0.5, 0.5, 0.0),
//!     ),
//! ];
//!
//! let bvh = Bvh::build(triangles, tribvh::DEFAULT_AABB_EXPANSION);
//! let hit = bvh.intersect(Point3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
//! assert_eq!(hit, Some(5.0));
//!
//! let miss = bvh.intersect(Point3::new(10.0, 10.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
//! assert_eq!(miss, None);
//! ```
//!
//! ## Features
//!
//! - `rayon` (default **enabled**) - answers batches of independent rays in parallel
//! - `simd` (default **disabled**) - evaluates the slab test with `wide` registers
//! - `serde` (default **disabled**) - adds `Serialize` and `Deserialize` implementations
//!   for the geometry types
//!

/// Point math type used by this crate. Type alias for [`nalgebra::Point3`].
pub type Point3 = nalgebra::Point3<Real>;

/// Vector math type used by this crate. Type alias for [`nalgebra::Vector3`].
pub type Vector3 = nalgebra::Vector3<Real>;

/// Float type used by this crate
pub type Real = f32;

/// A minimal floating value used as a lower bound for hit distances.
/// Hits closer than this to the ray origin are discarded to avoid self-intersection.
pub const EPSILON: Real = 0.00001;

/// Determinants with a smaller magnitude mark a ray as parallel to a triangle.
pub const DETERMINANT_EPSILON: Real = 1e-10;

/// Margin by which node bounding boxes are grown when no other value is configured.
pub const DEFAULT_AABB_EXPANSION: Real = 0.001;

pub mod aabb;
pub mod axis;
pub mod bvh;
pub mod camera;
pub mod mesh;
pub mod ray;
pub mod render;
pub mod triangle;
mod utils;

#[cfg(test)]
mod testbase;
