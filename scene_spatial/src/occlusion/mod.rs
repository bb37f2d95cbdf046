//! Software occlusion culling.
//!
//! A coarse CPU rasterizer writes known opaque geometry into 32x8 pixel
//! tiles (coverage bitmask + two depth layers) and proves bounding boxes
//! hidden behind it.

mod occlusion_buffer;
mod tile;

pub use occlusion_buffer::{OcclusionBuffer, OcclusionStats};
pub use tile::{span_mask, Tile, FULL_ROW, TILE_HEIGHT, TILE_WIDTH};
