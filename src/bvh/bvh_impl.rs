//! This module defines [`Bvh`], its construction and the public query and diagnostic
//! interface.

use std::fmt;

use log::{debug, info};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::aabb::{Aabb, Bounded};
use crate::axis::Axis;
use crate::bvh::BvhNode;
use crate::ray::Ray;
use crate::triangle::Triangle;
use crate::utils::partition_in_place;
use crate::{Point3, Real, Vector3, DEFAULT_AABB_EXPANSION};

/// Settings for [`Bvh::with_options`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildOptions {
    /// Margin by which every node [`Aabb`] is grown on each axis. Negative values are
    /// treated as zero.
    pub aabb_expansion: Real,
}

impl Default for BuildOptions {
    fn default() -> BuildOptions {
        BuildOptions {
            aabb_expansion: DEFAULT_AABB_EXPANSION,
        }
    }
}

/// Bounds and centroid statistics of a range of triangles, gathered in one pass.
struct RangeSummary {
    aabb: Aabb,
    centroid_mean: Vector3,
    centroid_variance: Vector3,
}

impl RangeSummary {
    fn of(triangles: &[Triangle]) -> RangeSummary {
        let mut aabb = Aabb::empty();
        let mut sum = Vector3::zeros();
        let mut sum_sq = Vector3::zeros();

        for triangle in triangles {
            aabb = aabb.join(&triangle.aabb());
            let centroid = triangle.centroid().coords;
            sum += centroid;
            sum_sq += centroid.component_mul(&centroid);
        }

        let n = triangles.len() as Real;
        let centroid_mean = sum / n;
        let centroid_variance = sum_sq / n - centroid_mean.component_mul(&centroid_mean);

        RangeSummary {
            aabb,
            centroid_mean,
            centroid_variance,
        }
    }

    fn split_axis(&self) -> Axis {
        Axis::of_max_component(&self.centroid_variance)
    }
}

/// The [`Bvh`] data structure. Owns the triangles and a flat arena of [`BvhNode`]s whose
/// first entry is the root.
///
/// [`Bvh`]: struct.Bvh.html
///
#[derive(Debug, Clone)]
pub struct Bvh {
    pub(crate) nodes: Vec<BvhNode>,
    pub(crate) triangles: Vec<Triangle>,
}

/// Summary of the shape of a [`Bvh`], as returned by [`Bvh::stats`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BvhStats {
    /// Number of nodes, leaves included.
    pub node_count: usize,
    /// Number of leaves.
    pub leaf_count: usize,
    /// Number of triangles the tree was built from.
    pub triangle_count: usize,
    /// Sum of the triangle counts of all leaves.
    pub leaf_triangle_count: usize,
    /// Largest number of triangles in a single leaf.
    pub max_leaf_size: usize,
    /// Number of edges on the longest root to leaf path.
    pub depth: usize,
    /// Leaves per triangle.
    pub quality: Real,
}

impl fmt::Display for BvhStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "nodes: {}, leaves: {}, triangles: {} ({} in leaves), largest leaf: {}, depth: {}, quality: {:.4}",
            self.node_count,
            self.leaf_count,
            self.triangle_count,
            self.leaf_triangle_count,
            self.max_leaf_size,
            self.depth,
            self.quality
        )
    }
}

impl Bvh {
    /// Creates a new [`Bvh`] from `triangles`, growing every node box by `aabb_expansion`.
    ///
    /// The triangles are reordered so that every node covers a contiguous range of them.
    ///
    /// # Panics
    ///
    /// Panics if the finished leaves do not hold exactly the input triangles.
    pub fn build(triangles: Vec<Triangle>, aabb_expansion: Real) -> Bvh {
        Bvh::with_options(triangles, &BuildOptions { aabb_expansion })
    }

    /// Creates a new [`Bvh`] from `triangles` with the given [`BuildOptions`].
    ///
    /// Each range is split at the centroid mean of the axis with the largest centroid
    /// variance. A range stays a leaf when it holds a single triangle or when the split
    /// leaves one side empty.
    pub fn with_options(mut triangles: Vec<Triangle>, options: &BuildOptions) -> Bvh {
        let margin = options.aabb_expansion.max(0.0);

        if triangles.is_empty() {
            debug!("Built empty BVH");
            return Bvh {
                nodes: Vec::new(),
                triangles,
            };
        }

        let expected_node_count = triangles.len() * 2 - 1;
        let mut nodes = Vec::with_capacity(expected_node_count);
        nodes.push(BvhNode::leaf(0, triangles.len(), 0));

        let mut work = vec![0];
        while let Some(node_index) = work.pop() {
            let BvhNode { offset, len, .. } = nodes[node_index];
            let range = &mut triangles[offset..offset + len];

            let summary = RangeSummary::of(range);
            let split_axis = summary.split_axis();
            nodes[node_index].aabb = summary.aabb.expanded(margin);
            nodes[node_index].split_axis = split_axis;

            if len == 1 {
                continue;
            }

            let mean = summary.centroid_mean[split_axis];
            let middle = partition_in_place(range, |t| t.centroid()[split_axis] < mean);
            if middle == 0 || middle == len {
                continue;
            }

            let child_l_index = nodes.len();
            let child_r_index = child_l_index + 1;
            nodes.push(BvhNode::leaf(offset, middle, node_index));
            nodes.push(BvhNode::leaf(offset + middle, len - middle, node_index));
            nodes[node_index].children = Some((child_l_index, child_r_index));

            work.push(child_r_index);
            work.push(child_l_index);
        }

        let bvh = Bvh { nodes, triangles };
        assert_eq!(
            bvh.leaf_triangle_count(),
            bvh.triangles.len(),
            "BVH leaves do not hold every input triangle exactly once"
        );
        debug!(
            "Built BVH with {} nodes over {} triangles",
            bvh.nodes.len(),
            bvh.triangles.len()
        );
        bvh
    }

    /// Returns the node arena. The root is at index 0.
    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    /// Returns the triangles in tree order. Every node covers a contiguous range of them.
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Returns the bounds of the whole tree, `None` when it is empty.
    pub fn root_aabb(&self) -> Option<Aabb> {
        self.nodes.first().map(|node| node.aabb)
    }

    /// Shoots a ray from `origin` along `direction` and returns the distance to the closest
    /// hit, if any.
    ///
    /// `direction` is not normalized, so distances are in units of its length. Pass a unit
    /// vector to get metric distances.
    pub fn intersect(&self, origin: Point3, direction: Vector3) -> Option<Real> {
        self.intersect_with_stats(origin, direction).0
    }

    /// Like [`Bvh::intersect`], but also returns the number of nodes visited.
    pub fn intersect_with_stats(&self, origin: Point3, direction: Vector3) -> (Option<Real>, usize) {
        let mut ray = Ray::new(origin, direction);
        let visited = self.traverse(&mut ray);
        let hit = if ray.is_hit() { Some(ray.t) } else { None };
        (hit, visited)
    }

    /// Returns true if anything is hit from `origin` along `direction` closer than `t_limit`.
    pub fn occluded(&self, origin: Point3, direction: Vector3, t_limit: Real) -> bool {
        self.traverse_any(&Ray::new(origin, direction), t_limit)
    }

    /// Runs [`Bvh::traverse`] for every ray, in parallel with the `rayon` feature.
    /// Returns the total number of visited nodes.
    pub fn intersect_batch(&self, rays: &mut [Ray]) -> usize {
        #[cfg(feature = "rayon")]
        {
            rays.par_iter_mut().map(|ray| self.traverse(ray)).sum()
        }
        #[cfg(not(feature = "rayon"))]
        {
            rays.iter_mut().map(|ray| self.traverse(ray)).sum()
        }
    }

    /// Returns the number of nodes, leaves included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_leaf()).count()
    }

    /// Returns the number of triangles referenced by leaves.
    /// Equals the number of input triangles for every successfully built tree.
    pub fn leaf_triangle_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| node.is_leaf())
            .map(|node| node.len)
            .sum()
    }

    /// Returns leaves per triangle. `1.0` means every triangle got a leaf of its own,
    /// `0.0` is reported for an empty tree.
    pub fn tree_quality(&self) -> Real {
        if self.triangles.is_empty() {
            0.0
        } else {
            self.leaf_count() as Real / self.triangles.len() as Real
        }
    }

    /// Returns the number of edges on the longest path from the root to a leaf.
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        self.for_each_node(|_, _, depth| max_depth = max_depth.max(depth));
        max_depth
    }

    /// Collects [`BvhStats`].
    pub fn stats(&self) -> BvhStats {
        BvhStats {
            node_count: self.node_count(),
            leaf_count: self.leaf_count(),
            triangle_count: self.triangles.len(),
            leaf_triangle_count: self.leaf_triangle_count(),
            max_leaf_size: self
                .nodes
                .iter()
                .filter(|node| node.is_leaf())
                .map(|node| node.len)
                .max()
                .unwrap_or(0),
            depth: self.depth(),
            quality: self.tree_quality(),
        }
    }

    /// Logs [`BvhStats`] at info level.
    pub fn log_stats(&self) {
        let stats = self.stats();
        info!("BVH node count: {}", stats.node_count);
        info!("BVH leaf count: {}", stats.leaf_count);
        info!(
            "BVH triangle count: {} ({} in leaves, at most {} per leaf)",
            stats.triangle_count, stats.leaf_triangle_count, stats.max_leaf_size
        );
        info!("BVH depth: {}", stats.depth);
        info!("BVH quality: {:.4}", stats.quality);
    }

    /// Prints the [`Bvh`] in a tree-like visualization.
    pub fn pretty_print(&self) {
        self.for_each_node(|node_index, node, depth| {
            let padding = " ".repeat(depth);
            match node.children {
                Some((child_l_index, child_r_index)) => println!(
                    "{}node={} parent={} split={} children=({}, {}) {}",
                    padding,
                    node_index,
                    node.parent(),
                    node.split_axis,
                    child_l_index,
                    child_r_index,
                    node.aabb
                ),
                None => println!(
                    "{}leaf={} parent={} triangles={:?} {}",
                    padding,
                    node_index,
                    node.parent(),
                    node.range(),
                    node.aabb
                ),
            }
        });
    }

    /// Calls `f` with index, node and depth of every node reachable from the root,
    /// parents before children and left subtrees before right ones.
    fn for_each_node<F: FnMut(usize, &BvhNode, usize)>(&self, mut f: F) {
        if self.nodes.is_empty() {
            return;
        }
        let mut stack = vec![(0, 0)];
        while let Some((node_index, depth)) = stack.pop() {
            let node = &self.nodes[node_index];
            f(node_index, node, depth);
            if let Some((child_l_index, child_r_index)) = node.children {
                stack.push((child_r_index, depth + 1));
                stack.push((child_l_index, depth + 1));
            }
        }
    }

    /// Verifies the structure of the tree: parent links, child ranges splitting their
    /// parent's range exactly, every node reachable from the root, and every triangle
    /// vertex inside the box of its leaf and of all the leaf's ancestors.
    fn check_consistency(&self) -> Result<(), String> {
        let Some(root) = self.nodes.first() else {
            return if self.triangles.is_empty() {
                Ok(())
            } else {
                Err(format!("no nodes for {} triangles", self.triangles.len()))
            };
        };

        if root.parent_index != 0 || root.range() != (0..self.triangles.len()) {
            return Err(format!(
                "root has parent {} and range {:?}, expected 0 and 0..{}",
                root.parent_index,
                root.range(),
                self.triangles.len()
            ));
        }

        let mut reached = 0;
        let mut error = None;
        self.for_each_node(|node_index, node, _| {
            reached += 1;
            if error.is_some() {
                return;
            }
            error = match node.children {
                Some((child_l_index, child_r_index)) => {
                    self.check_children(node_index, node, child_l_index, child_r_index)
                }
                None => self.check_leaf(node_index, node),
            }
            .err();
        });

        if let Some(error) = error {
            return Err(error);
        }
        if reached != self.nodes.len() {
            return Err(format!(
                "{} of {} nodes are reachable from the root",
                reached,
                self.nodes.len()
            ));
        }
        Ok(())
    }

    fn check_children(
        &self,
        node_index: usize,
        node: &BvhNode,
        child_l_index: usize,
        child_r_index: usize,
    ) -> Result<(), String> {
        let (Some(child_l), Some(child_r)) =
            (self.nodes.get(child_l_index), self.nodes.get(child_r_index))
        else {
            return Err(format!("node {} has a child out of bounds", node_index));
        };
        if child_l.parent_index != node_index || child_r.parent_index != node_index {
            return Err(format!("children of node {} have wrong parents", node_index));
        }
        let splits_range = child_l.len > 0
            && child_r.len > 0
            && child_l.offset == node.offset
            && child_r.offset == child_l.offset + child_l.len
            && child_l.len + child_r.len == node.len;
        if !splits_range {
            return Err(format!(
                "children {:?} and {:?} do not split range {:?} of node {}",
                child_l.range(),
                child_r.range(),
                node.range(),
                node_index
            ));
        }
        Ok(())
    }

    fn check_leaf(&self, node_index: usize, node: &BvhNode) -> Result<(), String> {
        let Some(triangles) = self.triangles.get(node.range()) else {
            return Err(format!("leaf {} range {:?} is out of bounds", node_index, node.range()));
        };
        for vertex in triangles.iter().flat_map(|triangle| triangle.vertices()) {
            let mut index = node_index;
            loop {
                if !self.nodes[index].aabb.contains(&vertex) {
                    return Err(format!(
                        "vertex {} of leaf {} lies outside node {}",
                        vertex, node_index, index
                    ));
                }
                if index == 0 {
                    break;
                }
                index = self.nodes[index].parent_index;
            }
        }
        Ok(())
    }

    /// Checks if all children of a node have the correct parent index, that there is no
    /// detached subtree, and that every triangle lies inside the boxes of its leaf and
    /// all the leaf's ancestors.
    pub fn is_consistent(&self) -> bool {
        self.check_consistency().is_ok()
    }

    /// Assert version of [`Bvh::is_consistent`].
    ///
    /// # Panics
    ///
    /// Panics with a description of the first inconsistency found.
    pub fn assert_consistent(&self) {
        if let Err(message) = self.check_consistency() {
            panic!("Inconsistent BVH: {}", message);
        }
    }
}
