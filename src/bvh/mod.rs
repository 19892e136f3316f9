//! This module defines a [`Bvh`] over triangles, its [`BvhNode`]s and the traversal
//! queries answered against it.

mod bvh_impl;
mod bvh_node;
mod traverse;

pub use self::bvh_impl::*;
pub use self::bvh_node::*;
