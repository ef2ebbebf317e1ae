//! A compressed, sparse octree storing one value per point of a cubic volume.
//!
//! Any sub-volume holding a single value is collapsed into one node, so memory usage is
//! proportional to how heterogeneous the data is rather than to the size of the volume. See
//! [`SparseVoxelOctree`] for the raw node and [`Octree`] for a wrapper that keeps track of the
//! extent of the root region.

pub mod error;
pub mod math_enums;
pub mod octree;

pub use error::OctreeError;
pub use octree::{
    extent::Extent,
    node::{SparseVoxelOctree, MIN_EXTENT},
    octant::Octant,
    Octree,
};
