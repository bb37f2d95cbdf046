/// Ray with a normalized direction, plus the two intersection kernels
/// used by every query in the crate: the slab test against an `AABB`
/// and the determinant (Cramer's rule) test against a triangle.
///
/// Distances are measured along the normalized direction, so they are
/// world-space lengths whenever the ray is in world space.
///
/// A ray whose direction has zero length (or is not finite) is degenerate:
/// it hits nothing.

use glam::{Mat4, Vec3};
use super::AABB;

/// Below this |determinant| the ray is treated as parallel to the triangle.
const DETERMINANT_EPSILON: f32 = 1e-10;

/// Hits closer than this to the origin are rejected (self-intersection guard).
const MIN_HIT_DISTANCE: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length, or zero for a degenerate ray
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray; `direction` is normalized.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.try_normalize().unwrap_or(Vec3::ZERO),
        }
    }

    /// Ray from `from` through `to`.
    pub fn between(from: Vec3, to: Vec3) -> Self {
        Self::new(from, to - from)
    }

    pub fn is_degenerate(&self) -> bool {
        self.direction == Vec3::ZERO
    }

    /// Point at distance `t` along the ray.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Same ray expressed in another space (e.g. world → model space with
    /// the inverse world matrix). The direction is renormalized.
    pub fn transformed(&self, matrix: &Mat4) -> Ray {
        Ray::new(
            matrix.transform_point3(self.origin),
            matrix.transform_vector3(self.direction),
        )
    }

    /// Slab test. Returns the entry distance (0 when the origin is inside
    /// the box), or `None` if the ray misses or the box is invalid.
    pub fn intersect_aabb(&self, aabb: &AABB) -> Option<f32> {
        if self.is_degenerate() || !aabb.is_valid() {
            return None;
        }

        let mut t_enter = 0.0f32;
        let mut t_exit = f32::INFINITY;

        for axis in 0..3 {
            let origin = self.origin[axis];
            let dir = self.direction[axis];
            let (lo, hi) = (aabb.min[axis], aabb.max[axis]);

            if dir == 0.0 {
                // Parallel to this slab: inside it or never
                if origin < lo || origin > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / dir;
            let mut t0 = (lo - origin) * inv;
            let mut t1 = (hi - origin) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }

            t_enter = t_enter.max(t0);
            t_exit = t_exit.min(t1);
            if t_enter > t_exit {
                return None;
            }
        }

        Some(t_enter)
    }

    /// Two-sided ray/triangle test solved with Cramer's rule.
    ///
    /// Returns the hit distance if it is positive. Degenerate (zero-area)
    /// triangles and rays parallel to the triangle plane never hit.
    pub fn intersect_triangle(&self, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
        let edge1 = b - a;
        let edge2 = c - a;

        let p = self.direction.cross(edge2);
        let det = edge1.dot(p);
        if det.abs() < DETERMINANT_EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;

        let s = self.origin - a;
        let u = s.dot(p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = self.direction.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = edge2.dot(q) * inv_det;
        (t > MIN_HIT_DISTANCE).then_some(t)
    }
}

#[cfg(test)]
#[path = "ray_tests.rs"]
mod tests;
