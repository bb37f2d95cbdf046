//! Camera module — viewport, frustum and low-level camera.
//!
//! Passive data consumed by the octree frustum query and the occlusion
//! buffer. Cameras are owned and driven by the caller.

mod camera;
mod frustum;
mod viewport;

pub use camera::Camera;
pub use frustum::{
    Frustum, FrustumTest,
    PLANE_LEFT, PLANE_RIGHT, PLANE_BOTTOM, PLANE_TOP, PLANE_NEAR, PLANE_FAR,
};
pub use viewport::Viewport;
