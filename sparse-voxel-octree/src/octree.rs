pub mod extent;
pub mod node;
pub mod octant;

use extent::Extent;
use glam::Vec3;
use node::SparseVoxelOctree;

use crate::error::OctreeError;

/// A [`SparseVoxelOctree`] bundled with the [`Extent`] of its root region.
///
/// Since the extent is stored alongside the root, it can no longer be mismatched between calls.
/// Besides the unchecked [`Octree::get`] and [`Octree::set`], which trust the caller to stay within
/// the region just like the raw node does, [`Octree::try_get`] and [`Octree::try_set`] reject
/// points outside of `[0, 2 * extent)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Octree<T> {
    root: SparseVoxelOctree<T>,
    extent: Extent,
}

impl<T> Octree<T> {
    /// Creates an [`Octree`] of the given `extent` holding `value` everywhere.
    pub fn new(extent: Extent, value: T) -> Self {
        Self {
            root: SparseVoxelOctree::new(value),
            extent,
        }
    }

    /// The extent of the root region.
    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// The root node of the octree.
    pub fn root(&self) -> &SparseVoxelOctree<T> {
        &self.root
    }

    /// Consumes the [`Octree`] and returns its root node.
    pub fn into_root(self) -> SparseVoxelOctree<T> {
        self.root
    }

    /// Whether `point` lies within the region covered by the octree.
    pub fn contains(&self, point: impl Into<Vec3>) -> bool {
        self.extent.contains(point.into())
    }

    /// Returns the value at `point`.
    ///
    /// `point` is not validated; see [`Octree::try_get`] for a checked version.
    pub fn get(&self, point: impl Into<Vec3>) -> &T {
        self.root.get(self.extent.get(), point)
    }

    /// Sets the value at `point`.
    ///
    /// `point` is not validated; see [`Octree::try_set`] for a checked version.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "octree::set"))]
    pub fn set(&mut self, point: impl Into<Vec3>, value: T)
    where
        T: Clone + PartialEq,
    {
        self.root.set(self.extent.get(), point, value);
    }

    /// Returns the value at `point` or [`OctreeError::OutOfBounds`] if it lies outside the octree.
    pub fn try_get(&self, point: impl Into<Vec3>) -> Result<&T, OctreeError> {
        let point = self.check_bounds(point.into())?;
        Ok(self.get(point))
    }

    /// Sets the value at `point` or returns [`OctreeError::OutOfBounds`] if it lies outside the
    /// octree, leaving the octree untouched.
    pub fn try_set(&mut self, point: impl Into<Vec3>, value: T) -> Result<(), OctreeError>
    where
        T: Clone + PartialEq,
    {
        let point = self.check_bounds(point.into())?;
        self.set(point, value);
        Ok(())
    }

    /// Overwrites the entire octree with `value`.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "octree::fill"))]
    pub fn fill(&mut self, value: T) {
        self.root.fill(value);
    }

    fn check_bounds(&self, point: Vec3) -> Result<Vec3, OctreeError> {
        if self.extent.contains(point) {
            Ok(point)
        } else {
            Err(OctreeError::OutOfBounds {
                point,
                side_length: self.extent.side_length(),
            })
        }
    }
}
