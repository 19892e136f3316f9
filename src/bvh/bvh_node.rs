use std::ops::Range;

use crate::aabb::Aabb;
use crate::axis::Axis;

/// A node of a [`Bvh`].
///
/// Every node covers the contiguous range `offset..offset + len` of the triangles owned by
/// the [`Bvh`]. A node is a leaf iff it has no children, and an inner node always has
/// exactly two, which split its range at one point.
///
/// [`Bvh`]: struct.Bvh.html
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BvhNode {
    /// Bounds of every triangle in range, expanded by the build margin.
    pub aabb: Aabb,

    /// Index of the first triangle of this node.
    pub offset: usize,

    /// Number of triangles covered by this node.
    pub len: usize,

    /// The node's parent. The root is its own parent.
    pub parent_index: usize,

    /// Axis of largest centroid variance, along which the range was (or would have been) split.
    pub split_axis: Axis,

    /// Indices of the left and right child nodes.
    pub children: Option<(usize, usize)>,
}

impl BvhNode {
    /// Creates a leaf for the given range. Bounds and axis are filled in by the builder.
    pub(crate) fn leaf(offset: usize, len: usize, parent_index: usize) -> BvhNode {
        BvhNode {
            aabb: Aabb::empty(),
            offset,
            len,
            parent_index,
            split_axis: Axis::X,
            children: None,
        }
    }

    /// Returns true if this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Returns the range of triangle indices covered by this node.
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.len
    }

    /// Returns the index of the parent node.
    pub fn parent(&self) -> usize {
        self.parent_index
    }
}
