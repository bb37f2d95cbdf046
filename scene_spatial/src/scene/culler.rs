/// Camera culling strategies.
///
/// A CameraCuller determines which objects of a SceneIndex are visible
/// from a given camera. Implementations range from a pure frustum query
/// to a frustum query refined by a software occlusion buffer.

use crate::camera::Camera;
use crate::occlusion::OcclusionBuffer;
use super::scene_index::{ElementKey, SceneIndex};
use super::spatial_primitive::SpatialPrimitive;

/// Strategy for determining visible objects from a camera.
///
/// Called once per frame. `&mut self` allows stateful implementations
/// (scratch buffers, occlusion state) to persist across frames.
pub trait CameraCuller<P: SpatialPrimitive> {
    /// Replace `visible` with the keys of the objects visible from `camera`.
    fn cull(&mut self, index: &dyn SceneIndex<P>, camera: &Camera, visible: &mut Vec<ElementKey>);
}

/// Frustum culler — spatial frustum query on the scene index.
#[derive(Debug, Default)]
pub struct FrustumCuller;

impl FrustumCuller {
    pub fn new() -> Self {
        Self
    }
}

impl<P: SpatialPrimitive> CameraCuller<P> for FrustumCuller {
    fn cull(&mut self, index: &dyn SceneIndex<P>, camera: &Camera, visible: &mut Vec<ElementKey>) {
        visible.clear();
        index.query_frustum(camera.frustum(), visible);
    }
}

/// Frustum query followed by an occlusion test of every candidate.
///
/// The culler owns the occlusion buffer. Each frame the caller runs
/// `buffer_mut().begin_frame(..)` and rasterizes its occluders before
/// calling `cull`.
pub struct OcclusionCuller {
    buffer: OcclusionBuffer,
    candidates: Vec<ElementKey>,
}

impl OcclusionCuller {
    pub fn new(buffer: OcclusionBuffer) -> Self {
        Self { buffer, candidates: Vec::new() }
    }

    pub fn buffer(&self) -> &OcclusionBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut OcclusionBuffer {
        &mut self.buffer
    }

    /// Objects that passed the frustum test in the last `cull`.
    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }
}

impl<P: SpatialPrimitive> CameraCuller<P> for OcclusionCuller {
    fn cull(&mut self, index: &dyn SceneIndex<P>, camera: &Camera, visible: &mut Vec<ElementKey>) {
        self.candidates.clear();
        index.query_frustum(camera.frustum(), &mut self.candidates);

        visible.clear();
        for &key in &self.candidates {
            let Some(primitive) = index.get(key) else {
                continue;
            };
            if !self.buffer.test_aabb(&primitive.world_aabb()) {
                visible.push(key);
            }
        }
    }
}
