/*!
# Scene Spatial

Spatial acceleration and visibility for a real-time 3D scene.

Everything the frame loop needs to answer "what is under this ray?" and
"what is visible from this camera?" without touching every object.

## Architecture

- **Octree**: dynamic loose octree over `SpatialPrimitive` objects
  (frustum culling, nearest-object ray picking), addressed by
  generation-checked `ElementKey`s
- **CollisionTree**: immutable binned-SAH BVH over a triangle mesh
  (narrow-phase ray picking)
- **OcclusionBuffer**: software tile rasterizer that proves bounding
  boxes hidden behind opaque occluders
- **CameraCuller**: frustum and frustum+occlusion culling strategies

All structures are single-writer and owned by the caller; the logger slot
in `log` is the only process-wide state.
*/

// Internal modules
mod error;
pub mod log;
pub mod geometry;
pub mod camera;
pub mod collision;
pub mod scene;
pub mod occlusion;

// Main spatial namespace module
pub mod spatial {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    pub use crate::geometry::{Ray, AABB};

    pub use crate::camera::{Camera, Frustum, FrustumTest, Viewport};

    pub use crate::collision::{CollisionTree, TriangleHit};

    pub use crate::scene::{
        SpatialPrimitive, BoundsPrimitive, ElementKey, SceneIndex,
        Octree, OctreeConfig, ElementLocation, LinearSceneIndex,
        CameraCuller, FrustumCuller, OcclusionCuller,
    };

    pub use crate::occlusion::{OcclusionBuffer, OcclusionStats, Tile};
}

// Re-export math library at crate root
pub use glam;
