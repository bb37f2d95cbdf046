/// Axis-aligned bounding box.
///
/// A box is valid when `min <= max` on every axis. `AABB::EMPTY`
/// (`min = +inf`, `max = -inf`) is the identity for union: adding any
/// point or valid box to it yields exactly that point or box.
///
/// Every operation is total. An invalid box reports zero size, contains
/// nothing, intersects nothing and stays invalid under transforms.

use glam::{Mat4, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner (x, y, z)
    pub min: Vec3,
    /// Maximum corner (x, y, z)
    pub max: Vec3,
}

impl Default for AABB {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl AABB {
    /// Empty box, identity for `add_point` / `add_aabb`.
    pub const EMPTY: AABB = AABB {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Degenerate box around a single point.
    pub fn from_point(point: Vec3) -> Self {
        Self { min: point, max: point }
    }

    /// Smallest box enclosing all points (EMPTY for no points).
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Self {
        let mut aabb = Self::EMPTY;
        for p in points {
            aabb.add_point(p);
        }
        aabb
    }

    /// Box centered on `center` with half size `extent`.
    pub fn from_center_extent(center: Vec3, extent: Vec3) -> Self {
        Self { min: center - extent, max: center + extent }
    }

    /// `min <= max` on every axis.
    pub fn is_valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }

    /// The 8 corners. Bit layout of the index: bit0 = X, bit1 = Y, bit2 = Z
    /// (0 = min, 1 = max).
    pub fn corners(&self) -> [Vec3; 8] {
        std::array::from_fn(|i| {
            Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            )
        })
    }

    // ===== UNION =====

    /// Grow the box to include `point`.
    pub fn add_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Grow the box to include `other`. No-op if `other` is invalid.
    pub fn add_aabb(&mut self, other: &AABB) {
        if !other.is_valid() {
            return;
        }
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Union of two boxes.
    pub fn union(&self, other: &AABB) -> AABB {
        let mut out = *self;
        out.add_aabb(other);
        out
    }

    // ===== TESTS =====

    /// Point inside or on the boundary.
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.min.cmple(point).all() && point.cmple(self.max).all()
    }

    /// Test if this AABB fully contains another AABB.
    ///
    /// An invalid box neither contains nor is contained.
    pub fn contains(&self, other: &AABB) -> bool {
        self.is_valid()
            && other.is_valid()
            && self.min.cmple(other.min).all()
            && other.max.cmple(self.max).all()
    }

    /// Test if this AABB intersects (overlaps or touches) another AABB.
    ///
    /// Per-axis separating test; false as soon as one axis separates.
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x
        && self.min.y <= other.max.y && self.max.y >= other.min.y
        && self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    // ===== TRANSFORMS =====

    /// Transform by a matrix, re-deriving the box from the 8 transformed
    /// corners. Conservative (not tight) under rotation.
    pub fn transformed(&self, matrix: &Mat4) -> AABB {
        if !self.is_valid() {
            return AABB::EMPTY;
        }
        AABB::from_points(self.corners().iter().map(|&c| matrix.transform_point3(c)))
    }

    /// Grow every face outward by `amount` (shrink if negative).
    pub fn expanded_by(&self, amount: f32) -> AABB {
        if !self.is_valid() {
            return *self;
        }
        AABB { min: self.min - Vec3::splat(amount), max: self.max + Vec3::splat(amount) }
    }

    /// Scale about the center by `factor`.
    pub fn scaled_by(&self, factor: f32) -> AABB {
        if !self.is_valid() {
            return *self;
        }
        AABB::from_center_extent(self.center(), self.extent() * factor)
    }

    // ===== MEASURES =====

    /// Center point (origin for an invalid box).
    pub fn center(&self) -> Vec3 {
        if !self.is_valid() {
            return Vec3::ZERO;
        }
        (self.min + self.max) * 0.5
    }

    /// Half size.
    pub fn extent(&self) -> Vec3 {
        self.size() * 0.5
    }

    /// Full size per axis (zero for an invalid box).
    pub fn size(&self) -> Vec3 {
        if !self.is_valid() {
            return Vec3::ZERO;
        }
        self.max - self.min
    }

    pub fn volume(&self) -> f32 {
        let s = self.size();
        s.x * s.y * s.z
    }

    pub fn surface_area(&self) -> f32 {
        let s = self.size();
        2.0 * (s.x * s.y + s.y * s.z + s.z * s.x)
    }

    /// Axis (0 = X, 1 = Y, 2 = Z) with the largest size.
    pub fn largest_axis(&self) -> usize {
        let s = self.size();
        if s.x >= s.y && s.x >= s.z {
            0
        } else if s.y >= s.z {
            1
        } else {
            2
        }
    }
}

#[cfg(test)]
#[path = "aabb_tests.rs"]
mod tests;
