//! Scene spatial indexing
//!
//! Provides the scene index abstraction, the loose octree, a brute-force
//! reference index and culling strategies built on top of them.

mod spatial_primitive;
mod scene_index;
mod linear_scene_index;
mod octree_config;
mod octree;
mod culler;

pub use spatial_primitive::{SpatialPrimitive, BoundsPrimitive};
pub use scene_index::{ElementKey, SceneIndex};
pub use linear_scene_index::LinearSceneIndex;
pub use octree_config::{OctreeConfig, MAX_SUPPORTED_DEPTH};
pub use octree::{Octree, ElementLocation};
pub use culler::{CameraCuller, FrustumCuller, OcclusionCuller};
