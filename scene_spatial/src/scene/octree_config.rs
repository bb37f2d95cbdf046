/// Octree tuning parameters.

use glam::Vec3;
use crate::error::{Error, Result};
use crate::geometry::AABB;

/// Deepest level accepted by validation (root = 0).
pub const MAX_SUPPORTED_DEPTH: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OctreeConfig {
    /// Root node bound. Objects that do not fit go to the overflow list.
    pub world_bound: AABB,
    /// Scale applied to a node bound (about its center) when testing
    /// whether an object's box fits the node.
    pub looseness: f32,
    /// A leaf holding more elements than this is split.
    pub node_capacity: usize,
    /// Leaves at this depth are never split (root = 0).
    pub max_depth: u32,
    /// `rearrange` compacts storage once this many element moves have accumulated.
    pub rearrange_threshold: usize,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            world_bound: AABB::new(Vec3::splat(-1024.0), Vec3::splat(1024.0)),
            looseness: 1.2,
            node_capacity: 32,
            max_depth: 8,
            rearrange_threshold: 100,
        }
    }
}

impl OctreeConfig {
    /// Default tuning with a different root bound.
    pub fn with_world_bound(world_bound: AABB) -> Self {
        Self { world_bound, ..Self::default() }
    }

    /// # Errors
    ///
    /// `InvalidConfig` for an invalid or non-finite world bound, looseness
    /// below 1, zero node capacity, or a max depth above `MAX_SUPPORTED_DEPTH`.
    pub fn validate(&self) -> Result<()> {
        let b = &self.world_bound;
        if !b.is_valid() || !b.min.is_finite() || !b.max.is_finite() {
            return Err(Error::InvalidConfig(format!("world bound {:?} is not a finite box", b)));
        }
        if !(self.looseness >= 1.0) || !self.looseness.is_finite() {
            return Err(Error::InvalidConfig(format!("looseness {} must be >= 1", self.looseness)));
        }
        if self.node_capacity == 0 {
            return Err(Error::InvalidConfig("node capacity must be at least 1".to_string()));
        }
        if self.max_depth > MAX_SUPPORTED_DEPTH {
            return Err(Error::InvalidConfig(format!(
                "max depth {} exceeds {}",
                self.max_depth, MAX_SUPPORTED_DEPTH
            )));
        }
        Ok(())
    }
}
