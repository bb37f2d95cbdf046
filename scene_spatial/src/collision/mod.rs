//! Static per-mesh ray collision (narrow phase for picking).

mod collision_tree;

pub use collision_tree::{
    BvhNode, BvhNodeKind, CollisionTree, TriangleHit,
    LEAF_TRIANGLE_THRESHOLD, SAH_BIN_COUNT,
};
