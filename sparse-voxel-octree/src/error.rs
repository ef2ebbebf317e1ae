use glam::Vec3;
use thiserror::Error;

/// Errors reported by the checked [`Octree`](crate::Octree) surface.
///
/// The raw [`SparseVoxelOctree`](crate::SparseVoxelOctree) operations never fail.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum OctreeError {
    #[error("extent must be finite and positive, got {0}")]
    InvalidExtent(f32),
    #[error("point {point} lies outside of the octree spanning [0, {side_length}) on each axis")]
    OutOfBounds { point: Vec3, side_length: f32 },
}
