//! Stack based front-to-back traversal of a [`Bvh`].

use std::ops::ControlFlow;

use crate::bvh::Bvh;
use crate::ray::Ray;
use crate::triangle::Triangle;
use crate::Real;

/// Initial size of the traversal stack. It grows when a deeper tree needs more.
const INITIAL_STACK_CAPACITY: usize = 64;

impl Bvh {
    /// Finds the closest triangle hit by `ray`, tightening `ray.t` to its distance.
    /// Returns the number of nodes visited.
    ///
    /// The root is entered without testing its bounds.
    pub fn traverse(&self, ray: &mut Ray) -> usize {
        let (visited, _) = self.walk(ray, |triangles, ray| {
            for triangle in triangles {
                if let Some(distance) = triangle.intersect(ray) {
                    ray.tighten(distance);
                }
            }
            ControlFlow::Continue(())
        });
        visited
    }

    /// Returns true as soon as any triangle is hit by `ray` closer than `t_limit`.
    /// The closest hit recorded in `ray` is neither read nor changed.
    pub fn traverse_any(&self, ray: &Ray, t_limit: Real) -> bool {
        let mut ray = Ray::with_limit(ray.origin, ray.direction, t_limit);
        let (_, found) = self.walk(&mut ray, |triangles, ray| {
            let hit = triangles
                .iter()
                .filter_map(|triangle| triangle.intersect(ray))
                .any(|distance| distance < ray.t);
            if hit {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        found
    }

    /// Walks the tree, nearer child first, calling `visit_leaf` with the triangles of every
    /// leaf whose bounds `ray` reaches. Returns the number of visited nodes and whether
    /// `visit_leaf` stopped the walk.
    fn walk<F>(&self, ray: &mut Ray, mut visit_leaf: F) -> (usize, bool)
    where
        F: FnMut(&[Triangle], &mut Ray) -> ControlFlow<()>,
    {
        if self.nodes.is_empty() {
            return (0, false);
        }

        let mut stack: Vec<usize> = Vec::with_capacity(INITIAL_STACK_CAPACITY);
        let mut node_index = 0;
        let mut visited = 0;

        loop {
            visited += 1;
            let node = &self.nodes[node_index];

            match node.children {
                None => {
                    if visit_leaf(&self.triangles[node.range()], ray).is_break() {
                        return (visited, true);
                    }
                }
                Some((child_l_index, child_r_index)) => {
                    let hit_l = ray.intersect_aabb(&self.nodes[child_l_index].aabb);
                    let hit_r = ray.intersect_aabb(&self.nodes[child_r_index].aabb);

                    match (hit_l, hit_r) {
                        (Some(entry_l), Some(entry_r)) => {
                            let (near, far) = if entry_l <= entry_r {
                                (child_l_index, child_r_index)
                            } else {
                                (child_r_index, child_l_index)
                            };
                            stack.push(far);
                            node_index = near;
                            continue;
                        }
                        (Some(_), None) => {
                            node_index = child_l_index;
                            continue;
                        }
                        (None, Some(_)) => {
                            node_index = child_r_index;
                            continue;
                        }
                        (None, None) => {}
                    }
                }
            }

            match stack.pop() {
                Some(next) => node_index = next,
                None => return (visited, false),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::bvh::Bvh;
    use crate::ray::Ray;
    use crate::testbase::{push_cube, unit_square};
    use crate::{Point3, Vector3};

    /// A row of cubes along x, so a ray along x passes through all of them.
    fn cube_row(n: usize) -> Vec<crate::triangle::Triangle> {
        let mut triangles = Vec::new();
        for i in 0..n {
            push_cube(Point3::new(i as f32 * 3.0, 0.0, 0.0), &mut triangles);
        }
        triangles
    }

    #[test]
    fn test_traverse_finds_front_cube() {
        let bvh = Bvh::build(cube_row(16), 0.001);
        let mut ray = Ray::new(Point3::new(-10.0, 0.1, 0.2), Vector3::new(1.0, 0.0, 0.0));
        let visited = bvh.traverse(&mut ray);
        assert!((ray.t - 9.5).abs() < 1e-4);
        assert!(visited > 0);
        assert!(visited <= bvh.node_count());
    }

    #[test]
    fn test_near_child_first_prunes_far_cubes() {
        let bvh = Bvh::build(cube_row(16), 0.001);
        let mut ray = Ray::new(Point3::new(-10.0, 0.1, 0.2), Vector3::new(1.0, 0.0, 0.0));
        let visited = bvh.traverse(&mut ray);

        // Once the first cube is hit, every box further down the row starts behind it.
        assert!((ray.t - 9.5).abs() < 1e-4);
        assert!(
            visited < bvh.node_count() / 4,
            "visited {} of {} nodes",
            visited,
            bvh.node_count()
        );
    }

    #[test]
    fn test_traverse_from_behind_finds_back_cube() {
        let bvh = Bvh::build(cube_row(16), 0.001);
        let mut ray = Ray::new(Point3::new(100.0, 0.1, 0.2), Vector3::new(-1.0, 0.0, 0.0));
        bvh.traverse(&mut ray);
        // The last cube is centered at x = 45.
        assert!((ray.t - 54.5).abs() < 1e-4);
    }

    #[test]
    fn test_traverse_respects_existing_hit() {
        let bvh = Bvh::build(unit_square(), 0.001);
        let mut ray = Ray::with_limit(Point3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0), 2.0);
        bvh.traverse(&mut ray);
        assert_eq!(ray.t, 2.0);
    }

    #[test]
    fn test_traverse_any_limit() {
        let bvh = Bvh::build(unit_square(), 0.001);
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(bvh.traverse_any(&ray, 6.0));
        assert!(!bvh.traverse_any(&ray, 5.0));
        assert!(!bvh.traverse_any(&ray, 1.0));
        assert_eq!(ray.t, f32::INFINITY);
    }

    #[test]
    fn test_skewed_tree() {
        // Exponentially spaced triangles split unevenly, deeper than a balanced tree.
        let triangles = (0..100)
            .map(|i| {
                let x = 1.5_f32.powi(i);
                crate::triangle::Triangle::new(
                    Point3::new(x, -1.0, -1.0),
                    Point3::new(x, 1.0, -1.0),
                    Point3::new(x, 0.0, 1.0),
                )
            })
            .collect::<Vec<_>>();
        let bvh = Bvh::build(triangles, 0.0);
        bvh.assert_consistent();
        assert!(bvh.depth() > 10);

        let mut ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
        bvh.traverse(&mut ray);
        assert_eq!(ray.t, 1.0);
    }
}
