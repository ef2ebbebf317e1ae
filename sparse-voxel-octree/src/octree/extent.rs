use glam::Vec3;

use crate::error::OctreeError;

use super::node::MIN_EXTENT;

/// Half the side length of the cubic region covered by the root of an octree.
///
/// A region with extent `e` spans `[0, 2 * e)` along every axis. Each level of the octree halves
/// the extent until it drops below [`MIN_EXTENT`].
#[derive(Clone, Copy, PartialEq, PartialOrd)]
pub struct Extent(f32);

impl Extent {
    /// Returns [`OctreeError::InvalidExtent`] if `extent` is not a finite, positive number.
    pub fn new(extent: f32) -> Result<Self, OctreeError> {
        if extent.is_finite() && extent > 0.0 {
            Ok(Self(extent))
        } else {
            Err(OctreeError::InvalidExtent(extent))
        }
    }

    /// Creates an [`Extent`] for a cube with the given full `side_length`.
    pub fn from_side_length(side_length: f32) -> Result<Self, OctreeError> {
        Self::new(side_length / 2.0).map_err(|_| OctreeError::InvalidExtent(side_length))
    }

    /// Returns the extent as a plain [`f32`].
    pub fn get(self) -> f32 {
        self.0
    }

    /// Returns the full side length of the cube.
    pub fn side_length(self) -> f32 {
        self.0 * 2.0
    }

    /// Whether `point` lies within `[0, 2 * extent)` on every axis.
    pub fn contains(self, point: Vec3) -> bool {
        point.cmpge(Vec3::ZERO).all() && point.cmplt(Vec3::splat(self.side_length())).all()
    }

    /// The maximum number of subdivisions between the root and the deepest possible node.
    ///
    /// Equals `floor(log2(extent)) + 1` for extents of at least [`MIN_EXTENT`] and `0` otherwise.
    pub fn max_depth(self) -> u32 {
        let mut extent = self.0;
        let mut depth = 0;
        while extent >= MIN_EXTENT {
            extent /= 2.0;
            depth += 1;
        }
        depth
    }
}

impl std::fmt::Debug for Extent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extent")
            .field("extent", &self.0)
            .field("side_length", &self.side_length())
            .finish()
    }
}

impl TryFrom<f32> for Extent {
    type Error = OctreeError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Extent> for f32 {
    fn from(value: Extent) -> Self {
        value.0
    }
}
