/// CollisionTree — immutable bounding volume hierarchy over a triangle mesh.
///
/// Built once at mesh load from a position array and a triangle index
/// array, then only queried. Vertex and index data are kept in their
/// input order; leaves address triangles through a permutation array
/// (`triangle_order`), so `TriangleHit::triangle` is always an index into
/// the input triangle list.
///
/// Construction is top-down binned SAH:
/// - split axis = largest extent of the node box
/// - 16 bins along that axis, cost = SA(left) * n_left + SA(right) * n_right
/// - a range that cannot be split into two non-empty sides becomes a leaf
///
/// Nodes live in one flat array, root at index 0.

use glam::{Mat4, Vec3};
use crate::error::{Error, Result};
use crate::geometry::{Ray, AABB};
use crate::{spatial_debug, spatial_error};

/// Ranges with at most this many triangles become leaves.
pub const LEAF_TRIANGLE_THRESHOLD: usize = 4;

/// Number of SAH bins evaluated along the split axis.
pub const SAH_BIN_COUNT: usize = 16;

const ROOT: u32 = 0;

/// Payload of a BVH node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BvhNodeKind {
    /// Two children in the node array
    Interior { left: u32, right: u32 },
    /// Range into `triangle_order`
    Leaf { start: u32, count: u32 },
}

/// A single node of the hierarchy.
#[derive(Debug, Clone, Copy)]
pub struct BvhNode {
    /// Union of the bounds of every triangle below this node
    pub bound: AABB,
    pub kind: BvhNodeKind,
}

impl BvhNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, BvhNodeKind::Leaf { .. })
    }
}

/// Nearest triangle hit along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    /// Distance along the (normalized) ray
    pub distance: f32,
    /// Index of the triangle in the input index array (indices[3t..3t+3])
    pub triangle: u32,
}

pub struct CollisionTree {
    positions: Vec<Vec3>,
    indices: Vec<u32>,
    nodes: Vec<BvhNode>,
    triangle_order: Vec<u32>,
    depth: u32,
}

impl CollisionTree {
    /// Build the hierarchy over `indices.len() / 3` triangles.
    ///
    /// # Errors
    ///
    /// `InvalidGeometry` if the index count is not a multiple of 3 or an
    /// index points past the end of `positions`.
    pub fn new(positions: &[Vec3], indices: &[u32]) -> Result<Self> {
        if indices.len() % 3 != 0 {
            let err = Error::InvalidGeometry(format!(
                "index count {} is not a multiple of 3",
                indices.len()
            ));
            spatial_error!("spatial::CollisionTree", "{}", err);
            return Err(err);
        }
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            let err = Error::InvalidGeometry(format!(
                "index {} out of range for {} positions",
                bad,
                positions.len()
            ));
            spatial_error!("spatial::CollisionTree", "{}", err);
            return Err(err);
        }

        let triangle_count = indices.len() / 3;
        let mut tree = Self {
            positions: positions.to_vec(),
            indices: indices.to_vec(),
            nodes: Vec::with_capacity(triangle_count.max(1) * 2),
            triangle_order: (0..triangle_count as u32).collect(),
            depth: 0,
        };

        if triangle_count > 0 {
            let bounds: Vec<AABB> = (0..triangle_count as u32)
                .map(|t| AABB::from_points(tree.triangle(t)))
                .collect();
            let centroids: Vec<Vec3> = bounds.iter().map(AABB::center).collect();

            let mut builder = Builder {
                bounds: &bounds,
                centroids: &centroids,
                order: &mut tree.triangle_order,
                nodes: &mut tree.nodes,
                depth: 0,
            };
            builder.build(0, triangle_count, 0);
            tree.depth = builder.depth;
        }

        spatial_debug!(
            "spatial::CollisionTree",
            "Built {} nodes over {} triangles (depth {})",
            tree.nodes.len(),
            triangle_count,
            tree.depth
        );

        Ok(tree)
    }

    /// Build from packed `[x, y, z, x, y, z, ...]` positions.
    pub fn from_flat(positions: &[f32], indices: &[u32]) -> Result<Self> {
        let packed: &[[f32; 3]] = bytemuck::try_cast_slice(positions).map_err(|_| {
            let err = Error::InvalidGeometry(format!(
                "position component count {} is not a multiple of 3",
                positions.len()
            ));
            spatial_error!("spatial::CollisionTree", "{}", err);
            err
        })?;
        let vertices: Vec<Vec3> = packed.iter().copied().map(Vec3::from_array).collect();
        Self::new(&vertices, indices)
    }

    // ===== QUERIES =====

    /// Nearest hit distance, if the ray hits any triangle.
    pub fn is_ray_collided(&self, ray: &Ray) -> Option<f32> {
        self.closest_hit(ray).map(|hit| hit.distance)
    }

    /// Nearest hit along the ray.
    ///
    /// Stack-based descent. A child is pruned when the ray misses its box or
    /// enters it no closer than the best hit so far; when both children are
    /// hit, the nearer one is visited first.
    pub fn closest_hit(&self, ray: &Ray) -> Option<TriangleHit> {
        let root_entry = self.root_entry(ray)?;

        let mut best: Option<TriangleHit> = None;
        let mut best_distance = f32::INFINITY;
        let mut stack: Vec<(u32, f32)> = Vec::with_capacity(self.depth as usize * 2 + 2);
        stack.push((ROOT, root_entry));

        while let Some((node_index, entry)) = stack.pop() {
            if entry >= best_distance {
                continue;
            }

            match self.nodes[node_index as usize].kind {
                BvhNodeKind::Leaf { start, count } => {
                    for &triangle in self.leaf_triangles(start, count) {
                        let [a, b, c] = self.triangle(triangle);
                        if let Some(t) = ray.intersect_triangle(a, b, c) {
                            if t < best_distance {
                                best_distance = t;
                                best = Some(TriangleHit { distance: t, triangle });
                            }
                        }
                    }
                }
                BvhNodeKind::Interior { left, right } => {
                    let left_entry = self.child_entry(ray, left, best_distance);
                    let right_entry = self.child_entry(ray, right, best_distance);

                    // Push the farther child first so the nearer one pops next
                    match (left_entry, right_entry) {
                        (Some(l), Some(r)) if l <= r => {
                            stack.push((right, r));
                            stack.push((left, l));
                        }
                        (Some(l), Some(r)) => {
                            stack.push((left, l));
                            stack.push((right, r));
                        }
                        (Some(l), None) => stack.push((left, l)),
                        (None, Some(r)) => stack.push((right, r)),
                        (None, None) => {}
                    }
                }
            }
        }

        best
    }

    /// True if any triangle is hit closer than `max_distance`.
    ///
    /// Stops at the first qualifying hit (no nearest-first ordering).
    pub fn any_hit(&self, ray: &Ray, max_distance: f32) -> bool {
        let Some(root_entry) = self.root_entry(ray) else {
            return false;
        };
        if root_entry >= max_distance {
            return false;
        }

        let mut stack = vec![ROOT];
        while let Some(node_index) = stack.pop() {
            match self.nodes[node_index as usize].kind {
                BvhNodeKind::Leaf { start, count } => {
                    for &triangle in self.leaf_triangles(start, count) {
                        let [a, b, c] = self.triangle(triangle);
                        if ray.intersect_triangle(a, b, c).is_some_and(|t| t < max_distance) {
                            return true;
                        }
                    }
                }
                BvhNodeKind::Interior { left, right } => {
                    for child in [left, right] {
                        if self.child_entry(ray, child, max_distance).is_some() {
                            stack.push(child);
                        }
                    }
                }
            }
        }

        false
    }

    /// Nearest hit for a world-space ray against this mesh placed at `world`.
    ///
    /// The ray is moved into model space with the inverse world matrix and
    /// the hit point is mapped back, so the returned distance is measured
    /// in world space. A singular world matrix never hits.
    pub fn ray_hit_world(&self, ray: &Ray, world: &Mat4) -> Option<f32> {
        if world.determinant() == 0.0 {
            return None;
        }
        let inverse = world.inverse();
        if !inverse.is_finite() {
            return None;
        }
        let local_ray = ray.transformed(&inverse);
        let hit = self.closest_hit(&local_ray)?;
        let world_point = world.transform_point3(local_ray.at(hit.distance));
        Some((world_point - ray.origin).length())
    }

    // ===== ACCESSORS =====

    /// Bound of the whole mesh (EMPTY for a mesh without triangles).
    pub fn bound(&self) -> AABB {
        self.nodes.first().map(|n| n.bound).unwrap_or(AABB::EMPTY)
    }

    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Depth of the deepest leaf (root = 0).
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Triangle indices (into the input triangle list) stored in a leaf range.
    pub fn leaf_triangles(&self, start: u32, count: u32) -> &[u32] {
        &self.triangle_order[start as usize..(start + count) as usize]
    }

    /// The three vertices of triangle `t`.
    pub fn triangle(&self, t: u32) -> [Vec3; 3] {
        let base = t as usize * 3;
        [
            self.positions[self.indices[base] as usize],
            self.positions[self.indices[base + 1] as usize],
            self.positions[self.indices[base + 2] as usize],
        ]
    }

    // ===== INTERNAL =====

    fn root_entry(&self, ray: &Ray) -> Option<f32> {
        let root = self.nodes.first()?;
        ray.intersect_aabb(&root.bound)
    }

    fn child_entry(&self, ray: &Ray, child: u32, limit: f32) -> Option<f32> {
        ray.intersect_aabb(&self.nodes[child as usize].bound)
            .filter(|&t| t < limit)
    }
}

// ===== BUILDER =====

/// Chosen split: triangles whose centroid falls in a bin below `bin` go left.
struct SplitPlane {
    axis: usize,
    bin: usize,
    origin: f32,
    extent: f32,
}

impl SplitPlane {
    fn goes_left(&self, centroid: Vec3) -> bool {
        bin_of(centroid[self.axis], self.origin, self.extent) < self.bin
    }
}

fn bin_of(value: f32, origin: f32, extent: f32) -> usize {
    let scaled = (value - origin) / extent * SAH_BIN_COUNT as f32;
    (scaled.max(0.0) as usize).min(SAH_BIN_COUNT - 1)
}

struct Builder<'a> {
    bounds: &'a [AABB],
    centroids: &'a [Vec3],
    order: &'a mut Vec<u32>,
    nodes: &'a mut Vec<BvhNode>,
    depth: u32,
}

impl Builder<'_> {
    /// Build the subtree over `order[start..end]`, returning its node index.
    fn build(&mut self, start: usize, end: usize, depth: u32) -> u32 {
        let mut bound = AABB::EMPTY;
        for &t in &self.order[start..end] {
            bound.add_aabb(&self.bounds[t as usize]);
        }

        let node_index = self.nodes.len() as u32;
        self.nodes.push(BvhNode {
            bound,
            kind: BvhNodeKind::Leaf { start: start as u32, count: (end - start) as u32 },
        });
        self.depth = self.depth.max(depth);

        if end - start <= LEAF_TRIANGLE_THRESHOLD {
            return node_index;
        }
        let Some(split) = self.find_split(start, end, &bound) else {
            return node_index;
        };

        let mid = self.partition(start, end, &split);
        if mid == start || mid == end {
            // No progress: keep the whole range as one leaf
            return node_index;
        }

        let left = self.build(start, mid, depth + 1);
        let right = self.build(mid, end, depth + 1);
        self.nodes[node_index as usize].kind = BvhNodeKind::Interior { left, right };
        node_index
    }

    /// Lowest-cost bin boundary along the largest axis of `bound`, if any
    /// boundary leaves triangles on both sides.
    fn find_split(&self, start: usize, end: usize, bound: &AABB) -> Option<SplitPlane> {
        let axis = bound.largest_axis();
        let origin = bound.min[axis];
        let extent = bound.size()[axis];
        if extent <= 0.0 || !extent.is_finite() {
            return None;
        }

        let mut bin_counts = [0usize; SAH_BIN_COUNT];
        let mut bin_bounds = [AABB::EMPTY; SAH_BIN_COUNT];
        for &t in &self.order[start..end] {
            let b = bin_of(self.centroids[t as usize][axis], origin, extent);
            bin_counts[b] += 1;
            bin_bounds[b].add_aabb(&self.bounds[t as usize]);
        }

        // right_area[i] / right_count[i]: bins i..SAH_BIN_COUNT
        let mut right_area = [0.0f32; SAH_BIN_COUNT];
        let mut right_count = [0usize; SAH_BIN_COUNT];
        let mut acc_bound = AABB::EMPTY;
        let mut acc_count = 0;
        for i in (1..SAH_BIN_COUNT).rev() {
            acc_bound.add_aabb(&bin_bounds[i]);
            acc_count += bin_counts[i];
            right_area[i] = acc_bound.surface_area();
            right_count[i] = acc_count;
        }

        let mut best: Option<(usize, f32)> = None;
        let mut left_bound = AABB::EMPTY;
        let mut left_count = 0;
        for i in 1..SAH_BIN_COUNT {
            left_bound.add_aabb(&bin_bounds[i - 1]);
            left_count += bin_counts[i - 1];
            if left_count == 0 || right_count[i] == 0 {
                continue;
            }
            let cost = left_bound.surface_area() * left_count as f32
                + right_area[i] * right_count[i] as f32;
            if best.map_or(true, |(_, best_cost)| cost < best_cost) {
                best = Some((i, cost));
            }
        }

        best.map(|(bin, _)| SplitPlane { axis, bin, origin, extent })
    }

    /// Reorder `order[start..end]` so left-side triangles come first.
    /// Returns the first index of the right side.
    fn partition(&mut self, start: usize, end: usize, split: &SplitPlane) -> usize {
        let mut i = start;
        let mut j = end;
        while i < j {
            if split.goes_left(self.centroids[self.order[i] as usize]) {
                i += 1;
            } else {
                j -= 1;
                self.order.swap(i, j);
            }
        }
        i
    }
}

#[cfg(test)]
#[path = "collision_tree_tests.rs"]
mod tests;
