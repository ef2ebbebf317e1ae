use enum_map::Enum;
use enumset::{EnumSet, EnumSetType};
use glam::Vec3;

use crate::math_enums::{Axes3, Axis3};

macro_rules! impl_from_for_vec {
    { $enum_type:ident for $value_type:ident {
        $( $variant:ident => ( $( $value:expr ),* ), )*
    } } => {
        impl From<$enum_type> for $value_type {
            fn from(value: $enum_type) -> Self {
                match value {
                    $( <$enum_type>::$variant => Self::new( $( $value as _ ),* ), )*
                }
            }
        }
    };
    { $enum_type:ident for [ $( $value_type:ident ),* ] $values:tt } => { $(
        impl_from_for_vec! {
            $enum_type for $value_type
            $values
        }
    )* };
}

/// One of the 8 equally sized sub-cubes of a cubic region.
///
/// Variants are declared in index order, where the x-digit has weight `1`, the z-digit weight `2`
/// and the y-digit weight `4`:
///
/// ```text
/// lower half (y0):   upper half (y1):
///   z1 | 2 3           z1 | 6 7
///   z0 | 0 1           z0 | 4 5
///      +----              +----
///       x0 x1              x0 x1
/// ```
///
/// Hosts rely on this exact numbering, so it must not be changed to e.g. Morton order.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Enum, EnumSetType)]
#[enumset(no_super_impls)]
pub enum Octant {
    X0Y0Z0,
    X1Y0Z0,
    X0Y0Z1,
    X1Y0Z1,
    X0Y1Z0,
    X1Y1Z0,
    X0Y1Z1,
    X1Y1Z1,
}

/// A set of octants.
pub type Octants = EnumSet<Octant>;

impl Octant {
    /// The number of octants a region is split into.
    pub const COUNT: usize = 8;

    /// Returns the index of the octant in `0..8`.
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Returns the octant with the given index, or [`None`] if `index` is not in `0..8`.
    pub fn from_index(index: u8) -> Option<Self> {
        (usize::from(index) < Self::COUNT).then(|| Self::from_usize(index.into()))
    }

    /// Builds the octant that lies in the upper half along exactly the given `axes`.
    pub fn from_upper_axes(axes: Axes3) -> Self {
        Self::from_usize(axes.iter().map(axis_weight).sum::<usize>())
    }

    /// The axes along which the octant lies in the upper half of its parent region.
    pub fn upper_axes(self) -> Axes3 {
        Axes3::all()
            .iter()
            .filter(|&axis| self.into_usize() & axis_weight(axis) != 0)
            .collect()
    }

    /// Determines the octant of a region with half side length `extent` that contains `point`.
    ///
    /// Returns the octant along with `point` translated into the local frame of that octant, which
    /// is a region with half side length `extent / 2`.
    ///
    /// `point` is expected to lie within `[0, 2 * extent)` on every axis. This is not checked; any
    /// other point still maps to some octant according to the per-axis `coord >= extent` test.
    pub fn locate(extent: f32, point: Vec3) -> (Self, Vec3) {
        let upper = Axes3::all()
            .iter()
            .filter(|&axis| point[axis] >= extent)
            .collect();
        let octant = Self::from_upper_axes(upper);
        (octant, point - Vec3::from(octant) * extent)
    }
}

fn axis_weight(axis: Axis3) -> usize {
    match axis {
        Axis3::X => 1,
        Axis3::Z => 2,
        Axis3::Y => 4,
    }
}

impl_from_for_vec! {
    Octant for [Vec3] {
        X0Y0Z0 => (0, 0, 0),
        X1Y0Z0 => (1, 0, 0),
        X0Y0Z1 => (0, 0, 1),
        X1Y0Z1 => (1, 0, 1),
        X0Y1Z0 => (0, 1, 0),
        X1Y1Z0 => (1, 1, 0),
        X0Y1Z1 => (0, 1, 1),
        X1Y1Z1 => (1, 1, 1),
    }
}
