//! Axis enum for indexing three-dimensional structures.

use crate::{Point3, Real, Vector3};
use std::fmt::{Display, Formatter, Result};
use std::ops::{Index, IndexMut};

/// An `Axis` in a three-dimensional coordinate system.
/// Used to access `Vector3`/`Point3` structs via index.
///
/// # Examples
/// ```
/// use tribvh::axis::Axis;
/// use tribvh::Point3;
///
/// let mut position = Point3::new(1.0, 0.5, 42.0);
/// position[Axis::Y] *= 4.0;
///
/// assert_eq!(position[Axis::Y], 2.0);
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Index of the X axis.
    X = 0,

    /// Index of the Y axis.
    Y = 1,

    /// Index of the Z axis.
    Z = 2,
}

impl Axis {
    /// All three axes in index order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Returns the axis whose component of `v` is the largest.
    /// Ties resolve toward the lower axis, so `X` wins over `Y` and `Y` over `Z`.
    pub fn of_max_component(v: &Vector3) -> Axis {
        let mut axis = Axis::X;
        if v[Axis::Y] > v[axis] {
            axis = Axis::Y;
        }
        if v[Axis::Z] > v[axis] {
            axis = Axis::Z;
        }
        axis
    }
}

/// Display implementation for `Axis`.
impl Display for Axis {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(
            f,
            "{}",
            match *self {
                Axis::X => "x",
                Axis::Y => "y",
                Axis::Z => "z",
            }
        )
    }
}

/// Make `Point3` indexable by `Axis`.
impl Index<Axis> for Point3 {
    type Output = Real;

    fn index(&self, axis: Axis) -> &Real {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }
}

/// Make `Vector3` indexable by `Axis`.
impl Index<Axis> for Vector3 {
    type Output = Real;

    fn index(&self, axis: Axis) -> &Real {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }
}

/// Make `Point3` mutably accessible by `Axis`.
impl IndexMut<Axis> for Point3 {
    fn index_mut(&mut self, axis: Axis) -> &mut Real {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        }
    }
}

/// Make `Vector3` mutably accessible by `Axis`.
impl IndexMut<Axis> for Vector3 {
    fn index_mut(&mut self, axis: Axis) -> &mut Real {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        }
    }
}

#[cfg(test)]
mod test {
    use crate::axis::Axis;
    use crate::{Point3, Vector3};
    use proptest::prelude::*;

    #[test]
    fn test_max_component_prefers_lower_axis_on_ties() {
        assert_eq!(Axis::of_max_component(&Vector3::new(1.0, 1.0, 1.0)), Axis::X);
        assert_eq!(Axis::of_max_component(&Vector3::new(0.0, 2.0, 2.0)), Axis::Y);
        assert_eq!(Axis::of_max_component(&Vector3::new(0.0, 1.0, 2.0)), Axis::Z);
    }

    #[test]
    fn test_display_axis() {
        let names = Axis::ALL.iter().map(|a| a.to_string()).collect::<Vec<_>>();
        assert_eq!(names, vec!["x", "y", "z"]);
    }

    proptest! {
        // Test whether accessing points by index is the same as accessing them by `Axis`.
        #[test]
        fn test_index_by_axis(tpl: (f32, f32, f32)) {
            let p = Point3::new(tpl.0, tpl.1, tpl.2);

            assert!(p[0].to_bits() == p[Axis::X].to_bits()
                && p[1].to_bits() == p[Axis::Y].to_bits()
                && p[2].to_bits() == p[Axis::Z].to_bits());
        }

        // Test whether vectors can be mutably set, by indexing via `Axis`.
        #[test]
        fn test_set_by_axis(tpl: (f32, f32, f32)) {
            let mut v = Vector3::zeros();

            v[Axis::X] = tpl.0;
            v[Axis::Y] = tpl.1;
            v[Axis::Z] = tpl.2;

            assert!(v.x.to_bits() == tpl.0.to_bits()
                && v.y.to_bits() == tpl.1.to_bits()
                && v.z.to_bits() == tpl.2.to_bits());
        }
    }
}
