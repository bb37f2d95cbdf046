/// Spatial acceleration structures for scene queries.
///
/// A SceneIndex owns `SpatialPrimitive` objects and answers frustum and
/// nearest-ray queries over them. Implementations: `Octree` (dynamic
/// loose octree) and `LinearSceneIndex` (brute force, reference).
///
/// Ownership: the caller creates and owns the SceneIndex. Objects are
/// addressed by `ElementKey`; a key of a removed object is rejected by
/// every method instead of aliasing a newer object.

use slotmap::new_key_type;
use crate::camera::Frustum;
use crate::geometry::Ray;
use super::spatial_primitive::SpatialPrimitive;

new_key_type! {
    /// Generation-checked handle of an object inside a scene index.
    pub struct ElementKey;
}

pub trait SceneIndex<P: SpatialPrimitive> {
    /// Insert an object using its current world bound and position.
    fn insert(&mut self, primitive: P) -> ElementKey;

    /// Remove an object, handing it back. `None` for a stale key.
    fn remove(&mut self, key: ElementKey) -> Option<P>;

    /// Re-read the object's bound after it moved. `false` for a stale key.
    fn update(&mut self, key: ElementKey) -> bool;

    fn get(&self, key: ElementKey) -> Option<&P>;

    fn get_mut(&mut self, key: ElementKey) -> Option<&mut P>;

    /// Append every object whose world bound overlaps the frustum.
    fn query_frustum(&self, frustum: &Frustum, results: &mut Vec<ElementKey>);

    /// Nearest object hit by the ray and the hit distance.
    fn query_ray(&self, ray: &Ray) -> Option<(ElementKey, f32)>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all objects. Previously issued keys become stale.
    fn clear(&mut self);
}
