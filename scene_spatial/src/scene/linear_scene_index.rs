/// Brute-force scene index — every query visits every object.
///
/// Suitable for small scenes, and used as the reference result when
/// validating the octree.

use slotmap::SlotMap;
use crate::camera::Frustum;
use crate::geometry::Ray;
use super::scene_index::{ElementKey, SceneIndex};
use super::spatial_primitive::SpatialPrimitive;

pub struct LinearSceneIndex<P> {
    elements: SlotMap<ElementKey, P>,
}

impl<P: SpatialPrimitive> LinearSceneIndex<P> {
    pub fn new() -> Self {
        Self { elements: SlotMap::with_key() }
    }
}

impl<P: SpatialPrimitive> Default for LinearSceneIndex<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: SpatialPrimitive> SceneIndex<P> for LinearSceneIndex<P> {
    fn insert(&mut self, primitive: P) -> ElementKey {
        self.elements.insert(primitive)
    }

    fn remove(&mut self, key: ElementKey) -> Option<P> {
        self.elements.remove(key)
    }

    fn update(&mut self, key: ElementKey) -> bool {
        self.elements.contains_key(key)
    }

    fn get(&self, key: ElementKey) -> Option<&P> {
        self.elements.get(key)
    }

    fn get_mut(&mut self, key: ElementKey) -> Option<&mut P> {
        self.elements.get_mut(key)
    }

    fn query_frustum(&self, frustum: &Frustum, results: &mut Vec<ElementKey>) {
        results.extend(
            self.elements
                .iter()
                .filter(|(_, p)| frustum.intersects_aabb(&p.world_aabb()))
                .map(|(key, _)| key),
        );
    }

    fn query_ray(&self, ray: &Ray) -> Option<(ElementKey, f32)> {
        if ray.is_degenerate() {
            return None;
        }
        let mut best: Option<(ElementKey, f32)> = None;
        for (key, primitive) in &self.elements {
            if let Some(t) = primitive.ray_hit(ray) {
                if t >= 0.0 && best.map_or(true, |(_, d)| t < d) {
                    best = Some((key, t));
                }
            }
        }
        best
    }

    fn len(&self) -> usize {
        self.elements.len()
    }

    fn clear(&mut self) {
        self.elements.clear();
    }
}
