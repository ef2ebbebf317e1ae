use enum_map::EnumMap;
use glam::Vec3;
use itertools::Itertools;
use replace_with::replace_with_or_abort;

use super::octant::Octant;

/// Regions with an extent below this are the smallest addressable cells and are never subdivided.
pub const MIN_EXTENT: f32 = 1.0;

/// A compressed octree node storing one value of type `T` per point of a cubic region.
///
/// A node is either [`Uniform`](Self::Uniform), holding a single value for its entire region, or
/// [`Internal`](Self::Internal), split into 8 octants which are nodes themselves. Writes subdivide
/// uniform nodes lazily and collapse internal nodes as soon as all 8 children are uniform and equal,
/// so memory scales with how heterogeneous the data is rather than with the volume.
///
/// A node does not know its own size or position. Every call takes the `extent` of the region,
/// i.e. half of its side length, so that the region spans `[0, 2 * extent)` along each axis. The
/// same extent must be passed on every call for a given tree. Points are neither validated against
/// the extent nor against the region; [`Octree`](crate::Octree) offers a checked wrapper.
///
/// Mutation goes through `&mut self`. Sharing a tree between threads that write to it requires
/// external synchronization, e.g. a [`RwLock`](std::sync::RwLock).
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum SparseVoxelOctree<T> {
    /// The entire region holds this value.
    Uniform(T),
    /// The region is split into 8 octants.
    Internal(Children<T>),
}

/// The 8 children of an [internal](SparseVoxelOctree::Internal) node, indexed by [`Octant`].
pub type Children<T> = Box<EnumMap<Octant, SparseVoxelOctree<T>>>;

impl<T: Default> Default for SparseVoxelOctree<T> {
    fn default() -> Self {
        Self::Uniform(Default::default())
    }
}

impl<T> SparseVoxelOctree<T> {
    /// Creates a uniform node holding `value` for its entire region.
    pub fn new(value: T) -> Self {
        Self::Uniform(value)
    }

    /// Returns the value at `point` within a region of the given `extent`.
    ///
    /// Uniform nodes return their value without looking at `point` at all.
    pub fn get(&self, extent: f32, point: impl Into<Vec3>) -> &T {
        let mut extent = extent;
        let mut point = point.into();
        let mut current = self;
        loop {
            match current {
                Self::Uniform(value) => break value,
                Self::Internal(children) => {
                    debug_assert!(extent > 0.0, "extent should be positive, got {extent}");
                    let (octant, local) = Octant::locate(extent, point);
                    current = &children[octant];
                    point = local;
                    extent /= 2.0;
                }
            }
        }
    }

    /// Sets the value at `point` within a region of the given `extent`.
    ///
    /// Values must be [`Clone`], since a uniform node copies its value into all 8 children when it
    /// is subdivided.
    ///
    /// Values must be [`PartialEq`], since writing a value that is already present is a no-op and
    /// nodes collapse back together once all of their children hold the same value.
    ///
    /// Uniformity is decided by [`PartialEq`] alone. Values that are not equal to themselves, such
    /// as an [`f32::NAN`] density, never count as already present: writing one subdivides down to
    /// the unit cell, and nodes holding one never collapse.
    pub fn set(&mut self, extent: f32, point: impl Into<Vec3>, value: T)
    where
        T: Clone + PartialEq,
    {
        debug_assert!(extent > 0.0, "extent should be positive, got {extent}");

        if let Self::Uniform(existing) = self {
            if *existing == value {
                return;
            }
            if extent < MIN_EXTENT {
                *existing = value;
                return;
            }
            self.subdivide();
            #[cfg(feature = "tracing")]
            tracing::trace!(extent, "subdivided uniform node");
        }

        let Self::Internal(children) = self else {
            unreachable!("node should be subdivided")
        };
        let (octant, local) = Octant::locate(extent, point.into());
        children[octant].set(extent / 2.0, local, value);

        // runs on every level of the unwind, even if the write itself was a no-op
        if self.try_collapse() {
            #[cfg(feature = "tracing")]
            tracing::trace!(extent, "collapsed equal children");
        }
    }

    /// Overwrites the entire region with `value`, discarding all children.
    pub fn fill(&mut self, value: T) {
        *self = Self::Uniform(value);
    }

    /// Whether the entire region holds a single value.
    pub fn is_uniform(&self) -> bool {
        matches!(self, Self::Uniform(_))
    }

    /// Returns the value of a uniform node or [`None`] if the node is subdivided.
    pub fn uniform_value(&self) -> Option<&T> {
        if let Self::Uniform(value) = self {
            Some(value)
        } else {
            None
        }
    }

    /// Returns the child at the given `octant` or [`None`] if the node is uniform.
    pub fn child(&self, octant: Octant) -> Option<&Self> {
        if let Self::Internal(children) = self {
            Some(&children[octant])
        } else {
            None
        }
    }

    /// The number of edges on the longest path from this node down to a uniform node.
    pub fn depth(&self) -> u32 {
        match self {
            Self::Uniform(_) => 0,
            Self::Internal(children) => 1 + children.values().map(Self::depth).max().unwrap_or(0),
        }
    }

    /// The total number of nodes, including this one.
    pub fn node_count(&self) -> usize {
        match self {
            Self::Uniform(_) => 1,
            Self::Internal(children) => 1 + children.values().map(Self::node_count).sum::<usize>(),
        }
    }

    /// Splits a uniform node into 8 uniform children that all hold the original value.
    ///
    /// # Panics
    ///
    /// Panics if the node is already subdivided.
    fn subdivide(&mut self)
    where
        T: Clone,
    {
        assert!(self.is_uniform(), "node already subdivided");
        replace_with_or_abort(self, |node| {
            let Self::Uniform(value) = node else {
                unreachable!()
            };
            Self::Internal(Box::new(EnumMap::from_fn(|_| Self::Uniform(value.clone()))))
        });
    }

    /// Turns an internal node into a uniform one if [`Self::should_collapse`] holds.
    ///
    /// Returns whether the node was collapsed.
    fn try_collapse(&mut self) -> bool
    where
        T: Clone + PartialEq,
    {
        let Some(value) = self.collapsed_value().cloned() else {
            return false;
        };
        *self = Self::Uniform(value);
        true
    }

    /// Whether this is an internal node whose children are all uniform and hold equal values.
    pub fn should_collapse(&self) -> bool
    where
        T: PartialEq,
    {
        self.collapsed_value().is_some()
    }

    /// The common value of all children, if they are all uniform and equal.
    fn collapsed_value(&self) -> Option<&T>
    where
        T: PartialEq,
    {
        match self {
            Self::Uniform(_) => None,
            Self::Internal(children) => children
                .values()
                .map(Self::uniform_value)
                .all_equal_value()
                .ok()
                .flatten(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::octree::octant::Octants;

    const A: u8 = 1;
    const B: u8 = 2;

    fn internal<T>(children: impl Fn(Octant) -> SparseVoxelOctree<T>) -> SparseVoxelOctree<T> {
        SparseVoxelOctree::Internal(Box::new(EnumMap::from_fn(children)))
    }

    #[test]
    fn new_is_uniform() {
        let node = SparseVoxelOctree::new(A);
        assert!(node.is_uniform());
        assert_eq!(node.uniform_value(), Some(&A));
        assert_eq!(node.child(Octant::X0Y0Z0), None);
        assert_eq!(node.depth(), 0);
        assert_eq!(node.node_count(), 1);
    }

    #[test]
    fn default_is_uniform() {
        assert_eq!(SparseVoxelOctree::<u8>::default(), SparseVoxelOctree::Uniform(0));
    }

    #[test]
    fn get_uniform_ignores_point() {
        let node = SparseVoxelOctree::new(A);
        assert_eq!(node.get(8.0, (1000.0, -1.0, f32::NAN)), &A);
    }

    #[test]
    fn set_same_value_is_noop() {
        let mut node = SparseVoxelOctree::new(A);
        node.set(8.0, (3.0, 3.0, 3.0), A);
        assert!(matches!(node, SparseVoxelOctree::Uniform(A)));
        assert_eq!(node.node_count(), 1);
    }

    #[test]
    fn set_subdivides_down_to_unit_cell() {
        let mut node = SparseVoxelOctree::new(A);
        node.set(8.0, (5.0, 5.0, 5.0), B);

        assert_eq!(node.get(8.0, (5.0, 5.0, 5.0)), &B);
        // same unit cell
        assert_eq!(node.get(8.0, (5.5, 5.9, 5.1)), &B);
        assert_eq!(node.get(8.0, (0.0, 0.0, 0.0)), &A);
        assert_eq!(node.get(8.0, (6.0, 5.0, 5.0)), &A);
        assert_eq!(node.get(8.0, (15.0, 15.0, 15.0)), &A);

        assert!(!node.is_uniform());
        // extents 8, 4, 2 and 1 are subdivided, the unit cell sits at extent 0.5
        assert_eq!(node.depth(), 4);
        assert_eq!(node.node_count(), 1 + 4 * 8);

        // (5, 5, 5) lies in the lower octant on every axis of the root
        for octant in Octants::all() {
            let child = node.child(octant).unwrap();
            assert_eq!(child.is_uniform(), octant != Octant::X0Y0Z0, "{octant:?}");
        }
    }

    #[test]
    fn set_back_collapses_to_root() {
        let mut node = SparseVoxelOctree::new(A);
        node.set(8.0, (5.0, 5.0, 5.0), B);
        node.set(8.0, (5.0, 5.0, 5.0), A);
        // make sure the tree was actually collapsed; just checking the value is not enough
        assert_eq!(node, SparseVoxelOctree::new(A));
    }

    #[test]
    fn overwrite_keeps_latest_value() {
        let mut node = SparseVoxelOctree::new(A);
        node.set(4.0, (1.0, 2.0, 3.0), B);
        node.set(4.0, (1.0, 2.0, 3.0), 3);
        assert_eq!(node.get(4.0, (1.0, 2.0, 3.0)), &3);
        assert_eq!(node.get(4.0, (2.0, 2.0, 3.0)), &A);
    }

    #[test]
    fn collapse_after_filling_all_octants() {
        let mut node = SparseVoxelOctree::new(A);
        let corners: Vec<_> = Octants::all().iter().collect();
        let (last, rest) = corners.split_last().unwrap();

        for &octant in rest {
            node.set(1.0, Vec3::from(octant), B);
            assert!(!node.is_uniform(), "{octant:?}");
        }
        assert_eq!(node.node_count(), 9);

        node.set(1.0, Vec3::from(*last), B);
        assert_eq!(node, SparseVoxelOctree::new(B));
    }

    #[test]
    fn min_unit_floor_overwrites_in_place() {
        for extent in [0.5, 0.25, 0.999] {
            let mut node = SparseVoxelOctree::new(A);
            node.set(extent, (0.2, 0.3, 0.1), B);
            assert_eq!(node, SparseVoxelOctree::new(B), "{extent}");
        }
    }

    #[test]
    fn checkerboard_reaches_full_depth() {
        let extent = 4.0;
        let size = 8;
        let mut node = SparseVoxelOctree::new(0u8);
        for x in 0..size {
            for y in 0..size {
                for z in 0..size {
                    let point = Vec3::new(x as f32, y as f32, z as f32);
                    node.set(extent, point, ((x + y + z) % 2) as u8);
                }
            }
        }

        assert_eq!(node.depth(), 3);
        assert_eq!(node.node_count(), 1 + 8 + 64 + 512);
        assert_eq!(node.get(extent, (3.0, 4.0, 6.0)), &1);
        assert_eq!(node.get(extent, (3.0, 4.0, 5.0)), &0);

        for x in 0..size {
            for y in 0..size {
                for z in 0..size {
                    node.set(extent, (x as f32, y as f32, z as f32), 0);
                }
            }
        }
        assert_eq!(node, SparseVoxelOctree::new(0));
    }

    #[test]
    fn depth_bound() {
        let extent = 8.0_f32;
        let bound = extent.log2().ceil() as u32 + 1;
        let mut node = SparseVoxelOctree::new(A);
        let points = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(15.5, 0.0, 3.0),
            Vec3::new(7.0, 7.0, 7.0),
            Vec3::new(9.0, 14.0, 1.0),
        ];
        for (index, point) in points.into_iter().enumerate() {
            node.set(extent, point, B + index as u8);
            assert!(node.depth() <= bound);
        }
    }

    #[test]
    fn out_of_range_point_is_not_an_error() {
        let mut node = SparseVoxelOctree::new(A);
        node.set(1.0, (-5.0, 9.0, 0.5), B);
        assert_eq!(node.get(1.0, (-5.0, 9.0, 0.5)), &B);
        // both land in the upper y octant
        assert_eq!(node.get(1.0, (0.5, 1.5, 0.5)), &B);
    }

    #[test]
    fn density_values() {
        let mut node = SparseVoxelOctree::new(0.0_f32);
        node.set(2.0, (3.0, 0.0, 0.0), 0.75);
        assert_eq!(node.get(2.0, (3.0, 0.0, 0.0)), &0.75);
        assert_eq!(node.get(2.0, (2.0, 0.0, 0.0)), &0.0);
    }

    #[test]
    fn fill_discards_children() {
        let mut node = SparseVoxelOctree::new(A);
        node.set(8.0, (1.0, 1.0, 1.0), B);
        node.fill(B);
        assert_eq!(node, SparseVoxelOctree::new(B));
    }

    #[test]
    fn write_into_equal_children_collapses() {
        // children are all uniform and equal, but the node was never collapsed
        let mut node = internal(|_| SparseVoxelOctree::new(A));
        node.set(8.0, (1.0, 1.0, 1.0), A);
        assert_eq!(node, SparseVoxelOctree::new(A));
    }

    #[test]
    fn write_below_equal_children_collapses_ancestors() {
        let mut node = internal(|octant| {
            if octant == Octant::X0Y0Z0 {
                internal(|_| SparseVoxelOctree::new(A))
            } else {
                SparseVoxelOctree::new(A)
            }
        });
        node.set(8.0, (1.0, 1.0, 1.0), A);
        assert_eq!(node, SparseVoxelOctree::new(A));
    }

    #[test]
    fn nan_is_never_already_present() {
        let mut node = SparseVoxelOctree::new(f32::NAN);
        node.set(8.0, (1.0, 1.0, 1.0), f32::NAN);
        assert_eq!(node.depth(), 4);
        assert_eq!(node.node_count(), 1 + 4 * 8);
        assert!(node.get(8.0, (1.0, 1.0, 1.0)).is_nan());

        node.fill(0.5);
        node.set(8.0, (1.0, 1.0, 1.0), 0.5);
        assert!(node.is_uniform());
    }

    #[test]
    fn should_collapse() {
        assert!(!SparseVoxelOctree::new(A).should_collapse());
        assert!(internal(|_| SparseVoxelOctree::new(A)).should_collapse());
        assert!(!internal(|octant| SparseVoxelOctree::new(octant.index())).should_collapse());
        // equal values are not enough, all children must be uniform
        let nested = internal(|octant| {
            if octant == Octant::X1Y1Z1 {
                internal(|_| SparseVoxelOctree::new(A))
            } else {
                SparseVoxelOctree::new(A)
            }
        });
        assert!(!nested.should_collapse());
    }
}
