/// Octree — dynamic loose octree over scene objects.
///
/// Each object lives in exactly one node: the deepest node that accepts
/// it. A node accepts an object when the node bound, scaled by
/// `looseness` about its center, contains the object's box AND the
/// un-scaled node bound contains the object's reference point. The
/// point picks the octant, so descent never tests more than one child.
///
/// Storage:
/// - nodes live in a flat arena, the 8 children of a node contiguous
/// - committed elements of every node form one contiguous range of the
///   shared `committed` array
/// - newly placed elements go to the node's temporal buffer until the
///   next `rearrange` merges them into the committed array
/// - objects the root does not accept go to the overflow list and are
///   tested first by every query
///
/// Queries traverse loose node bounds.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};
use glam::Vec3;
use slotmap::SlotMap;
use crate::camera::{Camera, Frustum, FrustumTest};
use crate::error::Result;
use crate::geometry::{Ray, AABB};
use crate::{spatial_debug, spatial_error, spatial_trace};
use super::octree_config::OctreeConfig;
use super::scene_index::{ElementKey, SceneIndex};
use super::spatial_primitive::SpatialPrimitive;

const ROOT: u32 = 0;

/// A single node in the octree arena.
struct OctreeNode {
    bound: AABB,
    /// `bound` scaled by the looseness factor; used by queries.
    loose_bound: AABB,
    parent: Option<u32>,
    /// Index of the first of 8 contiguous children (None = leaf)
    first_child: Option<u32>,
    depth: u32,
    committed_start: u32,
    committed_count: u32,
    temporal: Vec<ElementKey>,
}

impl OctreeNode {
    fn new(bound: AABB, looseness: f32, parent: Option<u32>, depth: u32) -> Self {
        Self {
            bound,
            loose_bound: bound.scaled_by(looseness),
            parent,
            first_child: None,
            depth,
            committed_start: 0,
            committed_count: 0,
            temporal: Vec::new(),
        }
    }

    fn element_count(&self) -> usize {
        self.committed_count as usize + self.temporal.len()
    }

    fn is_leaf(&self) -> bool {
        self.first_child.is_none()
    }
}

/// Where an element is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Committed { node: u32, index: u32 },
    Temporal { node: u32, index: u32 },
    Overflow { index: u32 },
    /// Transient state while an element is being moved.
    Detached,
}

struct OctreeEntry<P> {
    primitive: P,
    slot: Slot,
}

/// Public view of an element's placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementLocation {
    /// Node index (root = 0), see `node_bound` / `node_elements`.
    Node(usize),
    /// Outside the world bound.
    Overflow,
}

/// Node waiting in the nearest-first ray traversal heap.
#[derive(Debug, Clone, Copy)]
struct NodeCandidate {
    distance: f32,
    node: u32,
}

impl PartialEq for NodeCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for NodeCandidate {}

impl PartialOrd for NodeCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NodeCandidate {
    // Reversed: BinaryHeap pops the nearest node first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Dynamic loose octree.
pub struct Octree<P> {
    config: OctreeConfig,
    nodes: Vec<OctreeNode>,
    /// Committed elements, grouped per node (depth-first after `rearrange`)
    committed: Vec<ElementKey>,
    entries: SlotMap<ElementKey, OctreeEntry<P>>,
    overflow: Vec<ElementKey>,
    /// Element moves since the last rearrange
    dirty_count: usize,
}

impl<P: SpatialPrimitive> Octree<P> {
    /// Create an empty octree (a single root leaf).
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the configuration does not validate.
    pub fn new(config: OctreeConfig) -> Result<Self> {
        if let Err(err) = config.validate() {
            spatial_error!("spatial::Octree", "{}", err);
            return Err(err);
        }
        Ok(Self {
            config,
            nodes: vec![OctreeNode::new(config.world_bound, config.looseness, None, 0)],
            committed: Vec::new(),
            entries: SlotMap::with_key(),
            overflow: Vec::new(),
            dirty_count: 0,
        })
    }

    /// Default tuning with the given root bound.
    pub fn with_world_bound(world_bound: AABB) -> Result<Self> {
        Self::new(OctreeConfig::with_world_bound(world_bound))
    }

    // ===== MUTATION =====

    /// Insert an object into the deepest node that accepts it.
    ///
    /// The element lands in the node's temporal buffer; a leaf that grows
    /// past `node_capacity` is split (unless at `max_depth`).
    pub fn add_element(&mut self, primitive: P) -> ElementKey {
        let (aabb, point) = placement_of(&primitive);
        let key = self.entries.insert(OctreeEntry { primitive, slot: Slot::Detached });
        if self.accepts(ROOT, &aabb, point) {
            self.insert_from(ROOT, key, &aabb, point);
        } else {
            spatial_debug!("spatial::Octree", "element {:?} outside world bound, stored in overflow", key);
            self.push_overflow(key);
        }
        key
    }

    /// Re-place an object after its bound or position changed.
    ///
    /// An object still accepted by its current node stays there. Otherwise
    /// it moves to the first accepting ancestor and descends from it, or to
    /// the overflow list when even the root rejects it. Overflow objects
    /// return to the tree once the root accepts them.
    ///
    /// Returns `false` for a stale key.
    pub fn update_element(&mut self, key: ElementKey) -> bool {
        let Some(entry) = self.entries.get(key) else {
            return false;
        };
        let (aabb, point) = placement_of(&entry.primitive);
        let current = match entry.slot {
            Slot::Committed { node, .. } | Slot::Temporal { node, .. } => Some(node),
            Slot::Overflow { .. } | Slot::Detached => None,
        };

        match current {
            Some(node) => {
                if self.accepts(node, &aabb, point) {
                    return true;
                }
                self.detach(key);
                let mut ancestor = self.nodes[node as usize].parent;
                while let Some(candidate) = ancestor {
                    if self.accepts(candidate, &aabb, point) {
                        self.insert_from(candidate, key, &aabb, point);
                        return true;
                    }
                    ancestor = self.nodes[candidate as usize].parent;
                }
                spatial_debug!("spatial::Octree", "element {:?} left world bound, moved to overflow", key);
                self.push_overflow(key);
            }
            None => {
                if self.accepts(ROOT, &aabb, point) {
                    self.detach(key);
                    self.insert_from(ROOT, key, &aabb, point);
                }
            }
        }
        true
    }

    /// Remove an object and hand it back. `None` for a stale key.
    pub fn remove_element(&mut self, key: ElementKey) -> Option<P> {
        if !self.entries.contains_key(key) {
            return None;
        }
        self.detach(key);
        self.entries.remove(key).map(|entry| entry.primitive)
    }

    /// Compact storage if at least `rearrange_threshold` moves accumulated.
    ///
    /// Returns whether a rearrange ran.
    pub fn rearrange(&mut self) -> bool {
        if self.dirty_count < self.config.rearrange_threshold {
            return false;
        }
        self.force_rearrange();
        true
    }

    /// Rebuild the committed array depth-first, merging every temporal
    /// buffer into its node's committed range.
    pub fn force_rearrange(&mut self) {
        let mut compacted = Vec::with_capacity(self.entries.len());
        let mut stack = vec![ROOT];

        while let Some(node_index) = stack.pop() {
            let node = &mut self.nodes[node_index as usize];
            let old_start = node.committed_start as usize;
            let old_end = old_start + node.committed_count as usize;
            let new_start = compacted.len();

            compacted.extend_from_slice(&self.committed[old_start..old_end]);
            compacted.append(&mut node.temporal);

            node.committed_start = new_start as u32;
            node.committed_count = (compacted.len() - new_start) as u32;
            for (offset, &key) in compacted[new_start..].iter().enumerate() {
                self.entries[key].slot = Slot::Committed {
                    node: node_index,
                    index: (new_start + offset) as u32,
                };
            }

            if let Some(first_child) = node.first_child {
                for octant in (0..8).rev() {
                    stack.push(first_child + octant);
                }
            }
        }

        spatial_debug!(
            "spatial::Octree",
            "rearranged {} elements across {} nodes ({} moves)",
            compacted.len(), self.nodes.len(), self.dirty_count
        );
        self.committed = compacted;
        self.dirty_count = 0;
    }

    /// Remove every object and collapse the tree to a single root.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.nodes.push(OctreeNode::new(self.config.world_bound, self.config.looseness, None, 0));
        self.committed.clear();
        self.entries.clear();
        self.overflow.clear();
        self.dirty_count = 0;
    }

    // ===== QUERIES =====

    /// Nearest object hit by the ray, with the hit distance.
    ///
    /// Overflow objects are tested first. Nodes are visited nearest
    /// loose-bound entry first; traversal stops once the next node starts
    /// beyond the best hit.
    pub fn collided_element(&self, ray: &Ray) -> Option<(ElementKey, f32)> {
        if ray.is_degenerate() {
            return None;
        }
        let mut best: Option<(ElementKey, f32)> = None;
        for &key in &self.overflow {
            self.test_element(ray, key, &mut best);
        }

        let mut heap = BinaryHeap::new();
        if let Some(distance) = ray.intersect_aabb(&self.nodes[ROOT as usize].loose_bound) {
            heap.push(NodeCandidate { distance, node: ROOT });
        }

        while let Some(NodeCandidate { distance, node }) = heap.pop() {
            if best.is_some_and(|(_, d)| distance > d) {
                break;
            }
            for key in self.elements_of(node) {
                self.test_element(ray, key, &mut best);
            }
            if let Some(first_child) = self.nodes[node as usize].first_child {
                for child in first_child..first_child + 8 {
                    let Some(t) = ray.intersect_aabb(&self.nodes[child as usize].loose_bound) else {
                        continue;
                    };
                    if best.map_or(true, |(_, d)| t <= d) {
                        heap.push(NodeCandidate { distance: t, node: child });
                    }
                }
            }
        }
        best
    }

    /// Append every object whose world bound overlaps the camera frustum.
    pub fn frustum_culling(&self, camera: &Camera, results: &mut Vec<ElementKey>) {
        self.query_frustum(camera.frustum(), results);
    }

    /// Breadth-first frustum query.
    ///
    /// 3-way classification of loose node bounds:
    /// - `Outside` → skip entire subtree
    /// - `Inside` → collect all elements of the subtree without testing
    /// - `Partial` → test elements individually, classify children
    pub fn query_frustum(&self, frustum: &Frustum, results: &mut Vec<ElementKey>) {
        for &key in &self.overflow {
            if frustum.intersects_aabb(&self.element_aabb(key)) {
                results.push(key);
            }
        }

        let mut queue = VecDeque::new();
        queue.push_back((ROOT, frustum.classify_aabb(&self.nodes[ROOT as usize].loose_bound)));

        while let Some((node_index, class)) = queue.pop_front() {
            let node = &self.nodes[node_index as usize];
            match class {
                FrustumTest::Outside => continue,
                FrustumTest::Inside => {
                    results.extend(self.elements_of(node_index));
                    if let Some(first_child) = node.first_child {
                        for child in first_child..first_child + 8 {
                            queue.push_back((child, FrustumTest::Inside));
                        }
                    }
                }
                FrustumTest::Partial => {
                    results.extend(
                        self.elements_of(node_index)
                            .filter(|&key| frustum.intersects_aabb(&self.element_aabb(key))),
                    );
                    if let Some(first_child) = node.first_child {
                        for child in first_child..first_child + 8 {
                            let child_class = frustum.classify_aabb(&self.nodes[child as usize].loose_bound);
                            queue.push_back((child, child_class));
                        }
                    }
                }
            }
        }
    }

    // ===== ACCESSORS =====

    pub fn get(&self, key: ElementKey) -> Option<&P> {
        self.entries.get(key).map(|entry| &entry.primitive)
    }

    /// Mutable access. Call `update_element` after moving the object.
    pub fn get_mut(&mut self, key: ElementKey) -> Option<&mut P> {
        self.entries.get_mut(key).map(|entry| &mut entry.primitive)
    }

    pub fn contains(&self, key: ElementKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ElementKey, &P)> + '_ {
        self.entries.iter().map(|(key, entry)| (key, &entry.primitive))
    }

    /// Where the element is stored, `None` for a stale key.
    pub fn location(&self, key: ElementKey) -> Option<ElementLocation> {
        match self.entries.get(key)?.slot {
            Slot::Committed { node, .. } | Slot::Temporal { node, .. } => {
                Some(ElementLocation::Node(node as usize))
            }
            Slot::Overflow { .. } => Some(ElementLocation::Overflow),
            Slot::Detached => None,
        }
    }

    /// Exact (un-scaled) bound of a node.
    pub fn node_bound(&self, node: usize) -> Option<AABB> {
        self.nodes.get(node).map(|n| n.bound)
    }

    /// Loose bound of a node, as used by queries.
    pub fn node_loose_bound(&self, node: usize) -> Option<AABB> {
        self.nodes.get(node).map(|n| n.loose_bound)
    }

    pub fn node_depth(&self, node: usize) -> Option<u32> {
        self.nodes.get(node).map(|n| n.depth)
    }

    /// Elements stored directly in a node (committed, then temporal).
    /// Empty for an unknown node index.
    pub fn node_elements(&self, node: usize) -> impl Iterator<Item = ElementKey> + '_ {
        let (committed, temporal): (&[ElementKey], &[ElementKey]) = match self.nodes.get(node) {
            Some(n) => {
                let start = n.committed_start as usize;
                (&self.committed[start..start + n.committed_count as usize], n.temporal.as_slice())
            }
            None => (&[][..], &[][..]),
        };
        committed.iter().chain(temporal.iter()).copied()
    }

    pub fn config(&self) -> &OctreeConfig {
        &self.config
    }

    pub fn world_bound(&self) -> AABB {
        self.config.world_bound
    }

    /// Number of objects, overflow included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of elements in committed node ranges.
    pub fn committed_len(&self) -> usize {
        self.nodes.iter().map(|n| n.committed_count as usize).sum()
    }

    /// Number of elements waiting in temporal buffers.
    pub fn temporal_len(&self) -> usize {
        self.nodes.iter().map(|n| n.temporal.len()).sum()
    }

    pub fn overflow_len(&self) -> usize {
        self.overflow.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Element moves accumulated since the last rearrange.
    pub fn dirty_count(&self) -> usize {
        self.dirty_count
    }

    // ===== PLACEMENT (internal) =====

    fn accepts(&self, node: u32, aabb: &AABB, point: Vec3) -> bool {
        let node = &self.nodes[node as usize];
        node.loose_bound.contains(aabb) && node.bound.contains_point(point)
    }

    /// Deepest node under `start` (which must accept) that accepts the element.
    fn descend(&self, start: u32, aabb: &AABB, point: Vec3) -> u32 {
        let mut node_index = start;
        loop {
            let node = &self.nodes[node_index as usize];
            let Some(first_child) = node.first_child else {
                return node_index;
            };
            let child = first_child + point_octant(&node.bound.center(), &point) as u32;
            if !self.accepts(child, aabb, point) {
                return node_index;
            }
            node_index = child;
        }
    }

    fn insert_from(&mut self, start: u32, key: ElementKey, aabb: &AABB, point: Vec3) {
        let target = self.descend(start, aabb, point);
        self.push_temporal(target, key);
        self.split_if_needed(target);
    }

    fn push_temporal(&mut self, node: u32, key: ElementKey) {
        let temporal = &mut self.nodes[node as usize].temporal;
        let index = temporal.len() as u32;
        temporal.push(key);
        self.entries[key].slot = Slot::Temporal { node, index };
        self.dirty_count += 1;
    }

    fn push_overflow(&mut self, key: ElementKey) {
        let index = self.overflow.len() as u32;
        self.overflow.push(key);
        self.entries[key].slot = Slot::Overflow { index };
    }

    /// Take the element out of whatever container holds it (swap-remove,
    /// fixing the slot of the element moved into the hole).
    fn detach(&mut self, key: ElementKey) {
        match self.entries[key].slot {
            Slot::Committed { node, index } => {
                let n = &mut self.nodes[node as usize];
                let last = n.committed_start + n.committed_count - 1;
                if index != last {
                    let moved = self.committed[last as usize];
                    self.committed[index as usize] = moved;
                    self.entries[moved].slot = Slot::Committed { node, index };
                }
                n.committed_count -= 1;
                self.dirty_count += 1;
            }
            Slot::Temporal { node, index } => {
                let temporal = &mut self.nodes[node as usize].temporal;
                temporal.swap_remove(index as usize);
                if let Some(&moved) = temporal.get(index as usize) {
                    self.entries[moved].slot = Slot::Temporal { node, index };
                }
            }
            Slot::Overflow { index } => {
                self.overflow.swap_remove(index as usize);
                if let Some(&moved) = self.overflow.get(index as usize) {
                    self.entries[moved].slot = Slot::Overflow { index };
                }
            }
            Slot::Detached => {}
        }
        self.entries[key].slot = Slot::Detached;
    }

    fn split_if_needed(&mut self, node_index: u32) {
        let node = &self.nodes[node_index as usize];
        if node.is_leaf()
            && node.element_count() > self.config.node_capacity
            && node.depth < self.config.max_depth
        {
            self.split(node_index);
        }
    }

    /// Create the 8 children of a leaf and push its elements down.
    fn split(&mut self, node_index: u32) {
        let (bound, depth) = {
            let node = &self.nodes[node_index as usize];
            (node.bound, node.depth)
        };
        let center = bound.center();
        let first_child = self.nodes.len() as u32;
        for octant in 0..8u8 {
            let child_bound = octant_aabb(&bound, &center, octant);
            self.nodes.push(OctreeNode::new(child_bound, self.config.looseness, Some(node_index), depth + 1));
        }

        let node = &mut self.nodes[node_index as usize];
        node.first_child = Some(first_child);
        let start = node.committed_start as usize;
        let count = node.committed_count as usize;
        let mut moving = self.committed[start..start + count].to_vec();
        moving.append(&mut node.temporal);
        // Committed slots left behind become holes until the next rearrange.
        // Each moved element is counted once, by `push_temporal`.
        node.committed_count = 0;

        for &key in &moving {
            self.entries[key].slot = Slot::Detached;
            let (aabb, point) = placement_of(&self.entries[key].primitive);
            let target = self.descend(node_index, &aabb, point);
            self.push_temporal(target, key);
        }

        spatial_trace!(
            "spatial::Octree",
            "split node {} at depth {} ({} elements redistributed)",
            node_index, depth, moving.len()
        );

        for child in first_child..first_child + 8 {
            self.split_if_needed(child);
        }
    }

    fn elements_of(&self, node: u32) -> impl Iterator<Item = ElementKey> + '_ {
        self.node_elements(node as usize)
    }

    fn element_aabb(&self, key: ElementKey) -> AABB {
        placement_of(&self.entries[key].primitive).0
    }

    /// Narrow-phase test of one element, keeping the strictly nearer hit.
    fn test_element(&self, ray: &Ray, key: ElementKey, best: &mut Option<(ElementKey, f32)>) {
        let primitive = &self.entries[key].primitive;
        let Some(entry) = ray.intersect_aabb(&placement_of(primitive).0) else {
            return;
        };
        if best.is_some_and(|(_, d)| entry > d) {
            return;
        }
        if let Some(t) = primitive.ray_hit(ray) {
            if t >= 0.0 && best.map_or(true, |(_, d)| t < d) {
                *best = Some((key, t));
            }
        }
    }
}

impl<P: SpatialPrimitive> SceneIndex<P> for Octree<P> {
    fn insert(&mut self, primitive: P) -> ElementKey {
        self.add_element(primitive)
    }

    fn remove(&mut self, key: ElementKey) -> Option<P> {
        self.remove_element(key)
    }

    fn update(&mut self, key: ElementKey) -> bool {
        self.update_element(key)
    }

    fn get(&self, key: ElementKey) -> Option<&P> {
        Octree::get(self, key)
    }

    fn get_mut(&mut self, key: ElementKey) -> Option<&mut P> {
        Octree::get_mut(self, key)
    }

    fn query_frustum(&self, frustum: &Frustum, results: &mut Vec<ElementKey>) {
        Octree::query_frustum(self, frustum, results);
    }

    fn query_ray(&self, ray: &Ray) -> Option<(ElementKey, f32)> {
        self.collided_element(ray)
    }

    fn len(&self) -> usize {
        Octree::len(self)
    }

    fn clear(&mut self) {
        Octree::clear(self);
    }
}

/// Box and reference point used for placement. An invalid box is
/// replaced by a point box at the object's position.
fn placement_of<P: SpatialPrimitive>(primitive: &P) -> (AABB, Vec3) {
    let point = primitive.position();
    let aabb = primitive.world_aabb();
    if aabb.is_valid() {
        (aabb, point)
    } else {
        (AABB::from_point(point), point)
    }
}

/// AABB of octant `octant` (bit0 = X, bit1 = Y, bit2 = Z; 0 = low half).
fn octant_aabb(parent: &AABB, center: &Vec3, octant: u8) -> AABB {
    AABB {
        min: Vec3::new(
            if octant & 1 == 0 { parent.min.x } else { center.x },
            if octant & 2 == 0 { parent.min.y } else { center.y },
            if octant & 4 == 0 { parent.min.z } else { center.z },
        ),
        max: Vec3::new(
            if octant & 1 == 0 { center.x } else { parent.max.x },
            if octant & 2 == 0 { center.y } else { parent.max.y },
            if octant & 4 == 0 { center.z } else { parent.max.z },
        ),
    }
}

/// Octant of `point` relative to `center`; points on a split plane go high.
fn point_octant(center: &Vec3, point: &Vec3) -> u8 {
    ((point.x >= center.x) as u8)
        | (((point.y >= center.y) as u8) << 1)
        | (((point.z >= center.z) as u8) << 2)
}

#[cfg(test)]
#[path = "octree_tests.rs"]
mod tests;
