/// Capability interface for objects indexed by a scene index.
///
/// Scene objects (actors, mesh instances, markers, ...) implement this
/// trait; the spatial structures only ever see objects through it.
/// Placement bookkeeping lives inside the index and is addressed by
/// generation-checked `ElementKey`s, so objects carry no node index.

use std::rc::Rc;
use std::sync::Arc;
use glam::Vec3;
use crate::geometry::{Ray, AABB};

pub trait SpatialPrimitive {
    /// Current world-space bound.
    ///
    /// Must enclose every hit `ray_hit` can report: ray queries skip an
    /// object whose bound the ray misses.
    fn world_aabb(&self) -> AABB;

    /// Reference point used to pick an octant (the object's pivot).
    fn position(&self) -> Vec3;

    /// Narrow-phase ray test: distance along `ray` to the nearest hit.
    fn ray_hit(&self, ray: &Ray) -> Option<f32>;
}

impl<T: SpatialPrimitive + ?Sized> SpatialPrimitive for &T {
    fn world_aabb(&self) -> AABB {
        (**self).world_aabb()
    }
    fn position(&self) -> Vec3 {
        (**self).position()
    }
    fn ray_hit(&self, ray: &Ray) -> Option<f32> {
        (**self).ray_hit(ray)
    }
}

impl<T: SpatialPrimitive + ?Sized> SpatialPrimitive for Box<T> {
    fn world_aabb(&self) -> AABB {
        (**self).world_aabb()
    }
    fn position(&self) -> Vec3 {
        (**self).position()
    }
    fn ray_hit(&self, ray: &Ray) -> Option<f32> {
        (**self).ray_hit(ray)
    }
}

impl<T: SpatialPrimitive + ?Sized> SpatialPrimitive for Rc<T> {
    fn world_aabb(&self) -> AABB {
        (**self).world_aabb()
    }
    fn position(&self) -> Vec3 {
        (**self).position()
    }
    fn ray_hit(&self, ray: &Ray) -> Option<f32> {
        (**self).ray_hit(ray)
    }
}

impl<T: SpatialPrimitive + ?Sized> SpatialPrimitive for Arc<T> {
    fn world_aabb(&self) -> AABB {
        (**self).world_aabb()
    }
    fn position(&self) -> Vec3 {
        (**self).position()
    }
    fn ray_hit(&self, ray: &Ray) -> Option<f32> {
        (**self).ray_hit(ray)
    }
}

/// Object represented only by its bound (markers, lights, volumes).
///
/// Ray hits report the entry distance into the box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsPrimitive {
    pub aabb: AABB,
}

impl BoundsPrimitive {
    pub fn new(aabb: AABB) -> Self {
        Self { aabb }
    }
}

impl SpatialPrimitive for BoundsPrimitive {
    fn world_aabb(&self) -> AABB {
        self.aabb
    }

    fn position(&self) -> Vec3 {
        self.aabb.center()
    }

    fn ray_hit(&self, ray: &Ray) -> Option<f32> {
        ray.intersect_aabb(&self.aabb)
    }
}
