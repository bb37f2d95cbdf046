/// Camera — low-level passive data container.
///
/// Holds the view and projection matrices, the frustum used by octree
/// queries and the viewport used by the occlusion buffer. The caller
/// computes view/projection from high-level parameters (position,
/// rotation, FOV, ...) and stores the results here.

use glam::Mat4;
use super::frustum::Frustum;
use super::viewport::Viewport;

#[derive(Debug, Clone)]
pub struct Camera {
    view_matrix: Mat4,
    projection_matrix: Mat4,
    frustum: Frustum,
    viewport: Viewport,
}

impl Camera {
    /// Create a camera from explicit parts. The frustum is stored as given.
    pub fn new(view: Mat4, projection: Mat4, frustum: Frustum, viewport: Viewport) -> Self {
        Self {
            view_matrix: view,
            projection_matrix: projection,
            frustum,
            viewport,
        }
    }

    /// Create a camera whose frustum is extracted from `projection * view`.
    pub fn from_matrices(view: Mat4, projection: Mat4, viewport: Viewport) -> Self {
        let frustum = Frustum::from_view_projection(&(projection * view));
        Self::new(view, projection, frustum, viewport)
    }

    // ===== GETTERS =====

    /// View matrix (inverse of the camera's world transform).
    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    /// Projection matrix (perspective or orthographic, [0, 1] depth).
    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    /// Combined view-projection matrix (projection * view).
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix
    }

    /// Frustum planes for culling.
    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    /// Viewport dimensions and depth range.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    // ===== SETTERS — store, compute nothing =====

    pub fn set_view(&mut self, matrix: Mat4) {
        self.view_matrix = matrix;
    }

    pub fn set_projection(&mut self, matrix: Mat4) {
        self.projection_matrix = matrix;
    }

    pub fn set_frustum(&mut self, frustum: Frustum) {
        self.frustum = frustum;
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }
}
