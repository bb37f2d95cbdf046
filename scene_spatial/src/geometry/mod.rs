//! Geometry primitives shared by the octree, the collision tree and the
//! occlusion buffer.

mod aabb;
mod ray;

pub use aabb::AABB;
pub use ray::Ray;
