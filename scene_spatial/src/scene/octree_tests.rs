use glam::{Mat4, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashSet;
use crate::camera::{Camera, Viewport};
use crate::error::Error;
use crate::scene::linear_scene_index::LinearSceneIndex;
use super::*;

/// Box-shaped object tagged with a stable id, so results from two indexes
/// can be compared.
#[derive(Debug, Clone, Copy, PartialEq)]
struct TestObject {
    id: usize,
    aabb: AABB,
}

impl TestObject {
    fn cube(id: usize, center: Vec3, half: f32) -> Self {
        Self { id, aabb: AABB::from_center_extent(center, Vec3::splat(half)) }
    }
}

impl SpatialPrimitive for TestObject {
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

fn world() -> AABB {
    AABB::new(Vec3::splat(-50.0), Vec3::splat(50.0))
}

fn octree_with(config: OctreeConfig) -> Octree<TestObject> {
    Octree::new(config).unwrap()
}

fn small_octree(node_capacity: usize) -> Octree<TestObject> {
    octree_with(OctreeConfig { node_capacity, ..OctreeConfig::with_world_bound(world()) })
}

fn random_object(rng: &mut StdRng, id: usize, range: f32) -> TestObject {
    let center = Vec3::new(
        rng.random_range(-range..range),
        rng.random_range(-range..range),
        rng.random_range(-range..range),
    );
    TestObject::cube(id, center, rng.random_range(0.05..1.0))
}

/// Every element's slot matches the container that holds it, and every
/// tree element is accepted by its node.
fn assert_consistent(octree: &Octree<TestObject>) {
    let mut seen = 0;
    for (node_index, node) in octree.nodes.iter().enumerate() {
        let start = node.committed_start as usize;
        for offset in 0..node.committed_count as usize {
            let key = octree.committed[start + offset];
            assert_eq!(
                octree.entries[key].slot,
                Slot::Committed { node: node_index as u32, index: (start + offset) as u32 }
            );
            seen += 1;
        }
        for (index, &key) in node.temporal.iter().enumerate() {
            assert_eq!(
                octree.entries[key].slot,
                Slot::Temporal { node: node_index as u32, index: index as u32 }
            );
            seen += 1;
        }
        for key in octree.node_elements(node_index) {
            let object = octree.get(key).unwrap();
            assert!(node.loose_bound.contains(&object.aabb));
            assert!(node.bound.contains_point(object.position()));
        }
    }
    for (index, &key) in octree.overflow.iter().enumerate() {
        assert_eq!(octree.entries[key].slot, Slot::Overflow { index: index as u32 });
        seen += 1;
    }
    assert_eq!(seen, octree.len());
}

fn looking_down_negative_z() -> Camera {
    let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 40.0), Vec3::ZERO, Vec3::Y);
    let projection = Mat4::perspective_rh(std::f32::consts::FRAC_PI_4, 1.0, 0.1, 200.0);
    Camera::from_matrices(view, projection, Viewport::new(256.0, 256.0))
}

fn ids<P: SpatialPrimitive>(
    index: &dyn SceneIndex<P>,
    keys: &[ElementKey],
    id_of: impl Fn(&P) -> usize,
) -> FxHashSet<usize> {
    keys.iter().map(|&key| id_of(index.get(key).unwrap())).collect()
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_new_rejects_invalid_config() {
    let config = OctreeConfig { looseness: 0.9, ..OctreeConfig::default() };
    assert!(matches!(Octree::<TestObject>::new(config), Err(Error::InvalidConfig(_))));
}

#[test]
fn test_new_octree_is_single_root() {
    let octree = small_octree(32);
    assert_eq!(octree.node_count(), 1);
    assert_eq!(octree.node_bound(0), Some(world()));
    assert_eq!(octree.node_loose_bound(0), Some(world().scaled_by(1.2)));
    assert!(octree.is_empty());
    assert_eq!(octree.node_bound(1), None);
    assert_eq!(octree.node_elements(5).count(), 0);
}

// ============================================================================
// Insert / split
// ============================================================================

#[test]
fn test_insert_goes_to_temporal_buffer() {
    let mut octree = small_octree(32);
    let key = octree.add_element(TestObject::cube(0, Vec3::new(1.0, 2.0, 3.0), 0.5));

    assert_eq!(octree.location(key), Some(ElementLocation::Node(0)));
    assert_eq!(octree.temporal_len(), 1);
    assert_eq!(octree.committed_len(), 0);
    assert_eq!(octree.dirty_count(), 1);
    assert_consistent(&octree);
}

#[test]
fn test_leaf_splits_past_capacity() {
    let mut octree = small_octree(4);
    let corners = [
        Vec3::new(-20.0, -20.0, -20.0),
        Vec3::new(20.0, -20.0, -20.0),
        Vec3::new(-20.0, 20.0, -20.0),
        Vec3::new(20.0, 20.0, -20.0),
        Vec3::new(-20.0, -20.0, 20.0),
    ];
    for (id, &c) in corners.iter().enumerate().take(4) {
        octree.add_element(TestObject::cube(id, c, 1.0));
    }
    assert_eq!(octree.node_count(), 1);

    octree.add_element(TestObject::cube(4, corners[4], 1.0));
    assert_eq!(octree.node_count(), 9);
    assert_eq!(octree.node_elements(0).count(), 0, "every cube fits an octant");
    for node in 1..9 {
        assert_eq!(octree.node_depth(node), Some(1));
        assert!(octree.node_elements(node).count() <= 1);
    }
    assert_consistent(&octree);
}

#[test]
fn test_split_counts_each_moved_element_once() {
    let mut octree = small_octree(4);
    for (id, x) in [-20.0, -10.0, 10.0, 20.0].into_iter().enumerate() {
        octree.add_element(TestObject::cube(id, Vec3::new(x, 20.0, 20.0), 1.0));
    }
    octree.force_rearrange();
    assert_eq!(octree.committed_len(), 4);
    assert_eq!(octree.dirty_count(), 0);

    // 1 temporal insert, then 5 elements pushed down by the split
    octree.add_element(TestObject::cube(4, Vec3::new(20.0, -20.0, -20.0), 1.0));
    assert_eq!(octree.node_count(), 9);
    assert_eq!(octree.temporal_len(), 5);
    assert_eq!(octree.dirty_count(), 6);
    assert_consistent(&octree);
}

#[test]
fn test_straddling_object_stays_in_parent() {
    let mut octree = small_octree(1);
    octree.add_element(TestObject::cube(0, Vec3::splat(20.0), 1.0));
    // Larger than any child's loose bound
    let big = octree.add_element(TestObject::cube(1, Vec3::splat(0.5), 20.0));

    assert_eq!(octree.node_count(), 9);
    assert_eq!(octree.location(big), Some(ElementLocation::Node(0)));
    assert_consistent(&octree);
}

#[test]
fn test_split_stops_at_max_depth() {
    let config = OctreeConfig {
        node_capacity: 1,
        max_depth: 3,
        ..OctreeConfig::with_world_bound(world())
    };
    let mut octree = octree_with(config);
    let keys: Vec<_> = (0..6)
        .map(|id| octree.add_element(TestObject::cube(id, Vec3::splat(10.0), 0.01)))
        .collect();

    assert_eq!(octree.node_count(), 1 + 8 * 3);
    for key in keys {
        let Some(ElementLocation::Node(node)) = octree.location(key) else {
            panic!("element should be in the tree");
        };
        assert_eq!(octree.node_depth(node), Some(3));
    }
    assert_consistent(&octree);
}

#[test]
fn test_invalid_bound_is_placed_at_position() {
    struct PointOnly(Vec3);
    impl SpatialPrimitive for PointOnly {
        fn world_aabb(&self) -> AABB {
            AABB::EMPTY
        }
        fn position(&self) -> Vec3 {
            self.0
        }
        fn ray_hit(&self, _ray: &Ray) -> Option<f32> {
            None
        }
    }

    let mut octree = Octree::with_world_bound(world()).unwrap();
    let key = octree.add_element(PointOnly(Vec3::new(3.0, 4.0, 5.0)));
    assert_eq!(octree.location(key), Some(ElementLocation::Node(0)));
}

// ============================================================================
// Overflow
// ============================================================================

#[test]
fn test_object_outside_world_goes_to_overflow() {
    let mut octree = small_octree(32);
    let key = octree.add_element(TestObject::cube(0, Vec3::new(200.0, 0.0, 0.0), 1.0));

    assert_eq!(octree.location(key), Some(ElementLocation::Overflow));
    assert_eq!(octree.overflow_len(), 1);
    assert_eq!(octree.dirty_count(), 0);

    let ray = Ray::new(Vec3::new(100.0, 0.0, 0.0), Vec3::X);
    let (hit, distance) = octree.collided_element(&ray).unwrap();
    assert_eq!(hit, key);
    assert!((distance - 99.0).abs() < 1e-4);

    let mut visible = Vec::new();
    let camera = Camera::from_matrices(
        Mat4::look_at_rh(Vec3::new(200.0, 0.0, 20.0), Vec3::new(200.0, 0.0, 0.0), Vec3::Y),
        Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0),
        Viewport::new(64.0, 64.0),
    );
    octree.frustum_culling(&camera, &mut visible);
    assert_eq!(visible, vec![key]);
}

#[test]
fn test_overflow_object_returns_to_tree_on_update() {
    let mut octree = small_octree(32);
    let key = octree.add_element(TestObject::cube(0, Vec3::new(200.0, 0.0, 0.0), 1.0));

    // Still outside: stays in overflow
    octree.get_mut(key).unwrap().aabb = AABB::from_center_extent(Vec3::new(60.0, 0.0, 0.0), Vec3::ONE);
    assert!(octree.update_element(key));
    assert_eq!(octree.location(key), Some(ElementLocation::Overflow));

    octree.get_mut(key).unwrap().aabb = AABB::from_center_extent(Vec3::new(10.0, 0.0, 0.0), Vec3::ONE);
    assert!(octree.update_element(key));
    assert_eq!(octree.location(key), Some(ElementLocation::Node(0)));
    assert_eq!(octree.overflow_len(), 0);
    assert_consistent(&octree);
}

#[test]
fn test_object_leaving_world_moves_to_overflow() {
    let mut octree = small_octree(1);
    octree.add_element(TestObject::cube(0, Vec3::splat(-20.0), 1.0));
    let key = octree.add_element(TestObject::cube(1, Vec3::splat(20.0), 1.0));
    assert_ne!(octree.location(key), Some(ElementLocation::Node(0)));

    octree.get_mut(key).unwrap().aabb = AABB::from_center_extent(Vec3::splat(300.0), Vec3::ONE);
    assert!(octree.update_element(key));
    assert_eq!(octree.location(key), Some(ElementLocation::Overflow));
    assert_consistent(&octree);
}

// ============================================================================
// Update
// ============================================================================

#[test]
fn test_update_within_looseness_keeps_node() {
    let mut octree = small_octree(1);
    octree.add_element(TestObject::cube(0, Vec3::splat(-10.0), 0.5));
    let key = octree.add_element(TestObject::cube(1, Vec3::splat(10.0), 0.5));

    let Some(ElementLocation::Node(node)) = octree.location(key) else {
        panic!("element should be in the tree");
    };
    assert_ne!(node, 0);
    let dirty_before = octree.dirty_count();

    // Box now crosses x = 0, but the loose bound still holds it and the
    // center stays in the same octant.
    octree.get_mut(key).unwrap().aabb =
        AABB::from_center_extent(Vec3::new(0.2, 10.0, 10.0), Vec3::splat(0.5));
    assert!(octree.update_element(key));
    assert_eq!(octree.location(key), Some(ElementLocation::Node(node)));
    assert_eq!(octree.dirty_count(), dirty_before);
}

#[test]
fn test_update_moves_to_new_octant() {
    let mut octree = small_octree(1);
    octree.add_element(TestObject::cube(0, Vec3::splat(-10.0), 0.5));
    let key = octree.add_element(TestObject::cube(1, Vec3::splat(10.0), 0.5));
    let old = octree.location(key);

    let moved_center = Vec3::new(-1.0, 10.0, 10.0);
    octree.get_mut(key).unwrap().aabb = AABB::from_center_extent(moved_center, Vec3::splat(0.5));
    assert!(octree.update_element(key));

    let Some(ElementLocation::Node(node)) = octree.location(key) else {
        panic!("element should be in the tree");
    };
    assert_ne!(Some(ElementLocation::Node(node)), old);
    assert_ne!(node, 0);
    assert!(octree.node_bound(node).unwrap().contains_point(moved_center));
    assert_consistent(&octree);
}

#[test]
fn test_update_after_rearrange_counts_move() {
    let mut octree = small_octree(32);
    let a = octree.add_element(TestObject::cube(0, Vec3::splat(1.0), 0.5));
    let b = octree.add_element(TestObject::cube(1, Vec3::splat(2.0), 0.5));
    octree.force_rearrange();
    assert_eq!(octree.dirty_count(), 0);

    octree.get_mut(a).unwrap().aabb = AABB::from_center_extent(Vec3::splat(400.0), Vec3::ONE);
    assert!(octree.update_element(a));
    assert_eq!(octree.dirty_count(), 1, "leaving a committed range is a move");
    assert_eq!(octree.location(b), Some(ElementLocation::Node(0)));
    assert_consistent(&octree);
}

// ============================================================================
// Remove / stale keys
// ============================================================================

#[test]
fn test_stale_key_is_rejected() {
    let mut octree = small_octree(32);
    let key = octree.add_element(TestObject::cube(7, Vec3::ZERO, 1.0));

    let removed = octree.remove_element(key).unwrap();
    assert_eq!(removed.id, 7);

    assert!(octree.get(key).is_none());
    assert!(!octree.contains(key));
    assert!(!octree.update_element(key));
    assert!(octree.remove_element(key).is_none());
    assert_eq!(octree.location(key), None);

    let fresh = octree.add_element(TestObject::cube(8, Vec3::ZERO, 1.0));
    assert_ne!(fresh, key);
    assert!(octree.get(key).is_none());
    assert_eq!(octree.get(fresh).unwrap().id, 8);
}

#[test]
fn test_remove_from_committed_range_keeps_others() {
    let mut octree = small_octree(32);
    let keys: Vec<_> = (0..10)
        .map(|id| octree.add_element(TestObject::cube(id, Vec3::splat(id as f32), 0.25)))
        .collect();
    octree.force_rearrange();
    assert_eq!(octree.committed_len(), 10);

    for &key in &keys[2..5] {
        assert!(octree.remove_element(key).is_some());
    }
    assert_eq!(octree.len(), 7);
    assert_eq!(octree.committed_len(), 7);
    assert_eq!(octree.dirty_count(), 3);

    let remaining: FxHashSet<_> = octree.node_elements(0).collect();
    for &key in keys[..2].iter().chain(&keys[5..]) {
        assert!(remaining.contains(&key));
    }
    assert_consistent(&octree);
}

#[test]
fn test_clear_invalidates_keys() {
    let mut octree = small_octree(2);
    let keys: Vec<_> = (0..20)
        .map(|id| octree.add_element(TestObject::cube(id, Vec3::splat(id as f32 - 10.0), 0.25)))
        .collect();
    assert!(octree.node_count() > 1);

    octree.clear();
    assert_eq!(octree.len(), 0);
    assert_eq!(octree.node_count(), 1);
    assert_eq!(octree.dirty_count(), 0);
    for key in keys {
        assert!(octree.get(key).is_none());
    }
}

// ============================================================================
// Rearrange
// ============================================================================

#[test]
fn test_rearrange_waits_for_threshold() {
    let config = OctreeConfig { node_capacity: 1000, ..OctreeConfig::with_world_bound(world()) };
    let mut octree = octree_with(config);
    for id in 0..99 {
        octree.add_element(TestObject::cube(id, Vec3::ZERO, 1.0));
    }
    assert!(!octree.rearrange());
    assert_eq!(octree.temporal_len(), 99);

    octree.add_element(TestObject::cube(99, Vec3::ZERO, 1.0));
    assert!(octree.rearrange());
    assert_eq!(octree.dirty_count(), 0);
    assert_eq!(octree.temporal_len(), 0);
    assert_eq!(octree.committed_len(), 100);
    assert!(!octree.rearrange());
}

#[test]
fn test_rearrange_random_scene() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut octree = small_octree(32);
    let keys: Vec<_> = (0..1000)
        .map(|id| octree.add_element(random_object(&mut rng, id, 45.0)))
        .collect();
    assert!(octree.node_count() > 1);

    assert!(octree.rearrange());
    assert_eq!(octree.committed_len(), 1000);
    assert_eq!(octree.temporal_len(), 0);
    assert_consistent(&octree);

    // Committed ranges are disjoint and cover the array
    let mut ranges: Vec<_> = octree
        .nodes
        .iter()
        .filter(|n| n.committed_count > 0)
        .map(|n| (n.committed_start, n.committed_start + n.committed_count))
        .collect();
    ranges.sort();
    assert_eq!(ranges.first().map(|r| r.0), Some(0));
    for pair in ranges.windows(2) {
        assert_eq!(pair[0].1, pair[1].0);
    }
    assert_eq!(ranges.last().map(|r| r.1), Some(1000));

    for key in keys {
        let object = *octree.get(key).unwrap();
        let Some(ElementLocation::Node(node)) = octree.location(key) else {
            panic!("every object lies inside the world bound");
        };
        assert!(octree.node_loose_bound(node).unwrap().contains(&object.aabb));
        assert!(octree.node_elements(node).any(|k| k == key));
        assert_eq!(octree.remove_element(key), Some(object));
    }
    assert_eq!(octree.committed_len(), 0);
    assert!(octree.is_empty());
}

// ============================================================================
// Ray queries
// ============================================================================

#[test]
fn test_ray_picks_nearest_of_three_cubes() {
    let mut octree = small_octree(1);
    let cubes: Vec<_> = [0.0, 5.0, 10.0]
        .iter()
        .enumerate()
        .map(|(id, &x)| octree.add_element(TestObject::cube(id, Vec3::new(x, 0.0, 0.0), 0.5)))
        .collect();

    let from_left = Ray::new(Vec3::new(-10.0, 0.0, 0.0), Vec3::X);
    let (key, distance) = octree.collided_element(&from_left).unwrap();
    assert_eq!(key, cubes[0]);
    assert!((distance - 9.5).abs() < 1e-4);

    let from_right = Ray::new(Vec3::new(20.0, 0.0, 0.0), Vec3::NEG_X);
    let (key, distance) = octree.collided_element(&from_right).unwrap();
    assert_eq!(key, cubes[2]);
    assert!((distance - 9.5).abs() < 1e-4);

    let from_above = Ray::new(Vec3::new(5.0, 10.0, 0.0), Vec3::NEG_Y);
    let (key, distance) = octree.collided_element(&from_above).unwrap();
    assert_eq!(key, cubes[1]);
    assert!((distance - 9.5).abs() < 1e-4);

    let miss = Ray::new(Vec3::new(-10.0, 5.0, 0.0), Vec3::X);
    assert!(octree.collided_element(&miss).is_none());

    let degenerate = Ray::new(Vec3::ZERO, Vec3::ZERO);
    assert!(octree.collided_element(&degenerate).is_none());
}

#[test]
fn test_ray_matches_linear_index() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut octree = small_octree(8);
    let mut linear = LinearSceneIndex::new();
    for id in 0..400 {
        let object = random_object(&mut rng, id, 60.0);
        octree.add_element(object);
        linear.insert(object);
    }
    octree.force_rearrange();

    for _ in 0..200 {
        let origin = Vec3::new(
            rng.random_range(-70.0..70.0),
            rng.random_range(-70.0..70.0),
            rng.random_range(-70.0..70.0),
        );
        let target = Vec3::new(
            rng.random_range(-40.0..40.0),
            rng.random_range(-40.0..40.0),
            rng.random_range(-40.0..40.0),
        );
        let ray = Ray::between(origin, target);

        match (octree.collided_element(&ray), linear.query_ray(&ray)) {
            (None, None) => {}
            (Some((_, a)), Some((_, b))) => assert!((a - b).abs() < 1e-4, "{} vs {}", a, b),
            (a, b) => panic!("octree {:?} vs linear {:?}", a, b),
        }
    }
}

/// Reports a fixed narrow-phase distance whenever the ray reaches its box.
struct FixedHit {
    aabb: AABB,
    distance: f32,
}

impl SpatialPrimitive for FixedHit {
    fn world_aabb(&self) -> AABB {
        self.aabb
    }
    fn position(&self) -> Vec3 {
        self.aabb.center()
    }
    fn ray_hit(&self, ray: &Ray) -> Option<f32> {
        ray.intersect_aabb(&self.aabb).map(|_| self.distance)
    }
}

#[test]
fn test_hits_behind_origin_are_ignored_by_both_indexes() {
    let around_origin = || FixedHit {
        aabb: AABB::from_center_extent(Vec3::ZERO, Vec3::ONE),
        distance: -0.5,
    };
    let ahead = || FixedHit {
        aabb: AABB::from_center_extent(Vec3::new(0.0, 0.0, -10.0), Vec3::ONE),
        distance: 9.0,
    };

    let mut octree = Octree::new(OctreeConfig::with_world_bound(world())).unwrap();
    octree.add_element(around_origin());
    let octree_ahead = octree.add_element(ahead());

    let mut linear = LinearSceneIndex::new();
    linear.insert(around_origin());
    let linear_ahead = linear.insert(ahead());

    let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
    assert_eq!(octree.collided_element(&ray), Some((octree_ahead, 9.0)));
    assert_eq!(linear.query_ray(&ray), Some((linear_ahead, 9.0)));
}

// ============================================================================
// Frustum queries
// ============================================================================

#[test]
fn test_frustum_matches_linear_index() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut octree = small_octree(16);
    let mut linear = LinearSceneIndex::new();
    let mut octree_keys = Vec::new();
    let mut linear_keys = Vec::new();
    // Some objects fall outside the world bound and land in overflow
    for id in 0..600 {
        let object = random_object(&mut rng, id, 55.0);
        octree_keys.push(octree.add_element(object));
        linear_keys.push(linear.insert(object));
    }
    assert!(octree.overflow_len() > 0);

    // Move a third of the scene
    for i in (0..600).step_by(3) {
        let offset = Vec3::new(rng.random_range(-5.0..5.0), 0.0, rng.random_range(-5.0..5.0));
        let moved = AABB::new(
            octree.get(octree_keys[i]).unwrap().aabb.min + offset,
            octree.get(octree_keys[i]).unwrap().aabb.max + offset,
        );
        octree.get_mut(octree_keys[i]).unwrap().aabb = moved;
        assert!(octree.update_element(octree_keys[i]));
        linear.get_mut(linear_keys[i]).unwrap().aabb = moved;
    }
    octree.rearrange();
    assert_consistent(&octree);

    let camera = looking_down_negative_z();
    let mut from_octree = Vec::new();
    octree.frustum_culling(&camera, &mut from_octree);
    let mut from_linear = Vec::new();
    linear.query_frustum(camera.frustum(), &mut from_linear);

    let octree_ids = ids::<TestObject>(&octree, &from_octree, |o: &TestObject| o.id);
    let linear_ids = ids::<TestObject>(&linear, &from_linear, |o: &TestObject| o.id);
    assert_eq!(from_octree.len(), octree_ids.len(), "no duplicates");
    assert!(!octree_ids.is_empty());
    assert!(octree_ids.len() < 600);
    assert_eq!(octree_ids, linear_ids);
}

#[test]
fn test_frustum_query_through_scene_index_trait() {
    let mut index: Box<dyn SceneIndex<TestObject>> = Box::new(small_octree(4));
    let near = index.insert(TestObject::cube(0, Vec3::new(0.0, 0.0, 0.0), 1.0));
    let behind = index.insert(TestObject::cube(1, Vec3::new(0.0, 0.0, 45.0), 1.0));
    let far_left = index.insert(TestObject::cube(2, Vec3::new(-45.0, 0.0, -10.0), 1.0));

    let mut visible = Vec::new();
    index.query_frustum(looking_down_negative_z().frustum(), &mut visible);
    assert_eq!(visible, vec![near]);
    assert!(!visible.contains(&behind));
    assert!(!visible.contains(&far_left));
    assert_eq!(index.len(), 3);

    index.clear();
    assert!(index.is_empty());
}
