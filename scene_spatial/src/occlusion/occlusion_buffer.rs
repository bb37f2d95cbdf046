/// OcclusionBuffer — software tile occlusion culler.
///
/// Per frame:
/// 1. `begin_frame` clears every tile and stores the view-projection
/// 2. `rasterize_occluder_*` absorbs known opaque geometry
/// 3. `test_aabb` answers "is this box provably hidden?"
///
/// `test_aabb` may report a hidden box as visible, never the reverse.
///
/// Screen space: x right, y down, pixel centers at +0.5. Depth is z/w in
/// [0, 1] (smaller = nearer). Front faces have positive signed area in
/// screen space, which is clockwise in NDC. Back faces and degenerate
/// triangles never occlude.

use glam::{Mat4, Vec3};
use crate::error::{Error, Result};
use crate::geometry::AABB;
use crate::camera::Viewport;
use crate::{spatial_error, spatial_info};
use super::tile::{span_mask, Tile, FULL_ROW, TILE_HEIGHT, TILE_WIDTH};

/// Vertices with clip w at or below this are behind the eye.
const W_EPSILON: f32 = 1e-6;

/// Per-frame counters, reset by `begin_frame`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OcclusionStats {
    pub triangles_submitted: u32,
    /// Behind the eye, back-facing or degenerate
    pub triangles_rejected: u32,
    /// Tile merges that changed a tile
    pub tiles_updated: u32,
    pub boxes_tested: u32,
    pub boxes_occluded: u32,
}

/// Triangle relation to a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TileCoverage {
    Full,
    Miss,
    Partial,
}

/// Edge function `(b - a) x (p - a)` in screen space.
///
/// Anchored on the lexicographically smaller endpoint, so the two
/// triangles sharing an edge evaluate exact negations of each other and
/// every pixel center on the edge is covered by at least one of them.
#[derive(Debug, Clone, Copy)]
struct Edge {
    anchor: Vec3,
    dx: f32,
    dy: f32,
    sign: f32,
}

impl Edge {
    fn new(a: Vec3, b: Vec3) -> Self {
        if (a.x, a.y) <= (b.x, b.y) {
            Self { anchor: a, dx: b.x - a.x, dy: b.y - a.y, sign: 1.0 }
        } else {
            Self { anchor: b, dx: a.x - b.x, dy: a.y - b.y, sign: -1.0 }
        }
    }

    fn eval(&self, x: f32, y: f32) -> f32 {
        self.sign * (self.dx * (y - self.anchor.y) - self.dy * (x - self.anchor.x))
    }
}

/// Outcome of projecting one occluder triangle.
enum TriangleSetup {
    /// Behind the eye, back-facing or degenerate
    Rejected,
    /// Front-facing but touches no pixel
    Offscreen,
    Visible(ScreenTriangle),
}

/// Screen-space triangle ready for tile binning.
struct ScreenTriangle {
    edges: [Edge; 3],
    /// Farthest vertex depth
    depth: f32,
    min: (u32, u32),
    max: (u32, u32),
}

pub struct OcclusionBuffer {
    width: u32,
    height: u32,
    tiles_x: u32,
    tiles_y: u32,
    tiles: Vec<Tile>,
    view_projection: Mat4,
    stats: OcclusionStats,
}

impl OcclusionBuffer {
    /// Allocate a cleared buffer sized to the viewport.
    ///
    /// # Errors
    ///
    /// `InvalidViewport` if the viewport has no pixels.
    pub fn new(viewport: &Viewport) -> Result<Self> {
        let mut buffer = Self {
            width: 0,
            height: 0,
            tiles_x: 0,
            tiles_y: 0,
            tiles: Vec::new(),
            view_projection: Mat4::IDENTITY,
            stats: OcclusionStats::default(),
        };
        buffer.resize(viewport)?;
        Ok(buffer)
    }

    /// Reallocate the tile grid for a new viewport size. Clears all tiles.
    pub fn resize(&mut self, viewport: &Viewport) -> Result<()> {
        let Some((width, height)) = viewport.pixel_size() else {
            let err = Error::InvalidViewport(format!(
                "{}x{} viewport has no pixels",
                viewport.width, viewport.height
            ));
            spatial_error!("spatial::OcclusionBuffer", "{}", err);
            return Err(err);
        };
        self.width = width;
        self.height = height;
        self.tiles_x = width.div_ceil(TILE_WIDTH);
        self.tiles_y = height.div_ceil(TILE_HEIGHT);
        self.tiles = vec![Tile::CLEARED; (self.tiles_x * self.tiles_y) as usize];
        spatial_info!(
            "spatial::OcclusionBuffer",
            "allocated {}x{} tiles for {}x{} pixels",
            self.tiles_x, self.tiles_y, width, height
        );
        Ok(())
    }

    /// Start a frame: clear every tile and the stats, adopt the camera.
    ///
    /// Reallocates when the viewport size changed.
    pub fn begin_frame(&mut self, view_projection: &Mat4, viewport: &Viewport) -> Result<()> {
        if viewport.pixel_size() != Some((self.width, self.height)) {
            self.resize(viewport)?;
        } else {
            self.tiles.fill(Tile::CLEARED);
        }
        self.view_projection = *view_projection;
        self.stats = OcclusionStats::default();
        Ok(())
    }

    /// Rasterize a world-space triangle list (3 vertices per triangle).
    ///
    /// # Errors
    ///
    /// `InvalidGeometry` if the vertex count is not a multiple of 3.
    pub fn rasterize_occluder_triangles(&mut self, vertices: &[Vec3]) -> Result<()> {
        if vertices.len() % 3 != 0 {
            let err = Error::InvalidGeometry(format!(
                "occluder triangle list has {} vertices (not a multiple of 3)",
                vertices.len()
            ));
            spatial_error!("spatial::OcclusionBuffer", "{}", err);
            return Err(err);
        }
        let view_projection = self.view_projection;
        for triangle in vertices.chunks_exact(3) {
            self.rasterize_triangle(&view_projection, [triangle[0], triangle[1], triangle[2]]);
        }
        Ok(())
    }

    /// Rasterize an indexed mesh placed in the world by `model`.
    ///
    /// # Errors
    ///
    /// `InvalidGeometry` if the index count is not a multiple of 3 or an
    /// index is out of range. Nothing is rasterized in that case.
    pub fn rasterize_occluder_mesh(&mut self, positions: &[Vec3], indices: &[u32], model: &Mat4) -> Result<()> {
        if indices.len() % 3 != 0 {
            let err = Error::InvalidGeometry(format!(
                "occluder index count {} is not a multiple of 3",
                indices.len()
            ));
            spatial_error!("spatial::OcclusionBuffer", "{}", err);
            return Err(err);
        }
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            let err = Error::InvalidGeometry(format!(
                "occluder index {} out of range ({} positions)",
                bad,
                positions.len()
            ));
            spatial_error!("spatial::OcclusionBuffer", "{}", err);
            return Err(err);
        }
        let model_view_projection = self.view_projection * *model;
        for triangle in indices.chunks_exact(3) {
            let corners = [
                positions[triangle[0] as usize],
                positions[triangle[1] as usize],
                positions[triangle[2] as usize],
            ];
            self.rasterize_triangle(&model_view_projection, corners);
        }
        Ok(())
    }

    /// Test a world-space box against the occluders of this frame.
    ///
    /// `true` only if the box is provably hidden. Updates the stats.
    pub fn test_aabb(&mut self, aabb: &AABB) -> bool {
        self.stats.boxes_tested += 1;
        let occluded = self.is_occluded(aabb);
        if occluded {
            self.stats.boxes_occluded += 1;
        }
        occluded
    }

    /// Side-effect free form of `test_aabb`.
    pub fn is_occluded(&self, aabb: &AABB) -> bool {
        if !aabb.is_valid() {
            return false;
        }

        // Conservative screen rectangle and nearest depth of the 8 corners
        let mut min_x = f32::INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut max_y = f32::NEG_INFINITY;
        let mut min_depth = f32::INFINITY;
        for corner in aabb.corners() {
            let Some(p) = self.project(&self.view_projection, corner) else {
                return false;
            };
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
            min_depth = min_depth.min(p.z);
        }
        if !(min_depth >= 0.0) {
            return false;
        }

        let Some((px0, py0, px1, py1)) = self.pixel_rect(min_x, min_y, max_x, max_y) else {
            return false;
        };

        for ty in py0 / TILE_HEIGHT..=py1 / TILE_HEIGHT {
            for tx in px0 / TILE_WIDTH..=px1 / TILE_WIDTH {
                let tile = &self.tiles[(ty * self.tiles_x + tx) as usize];
                let tile_x0 = tx * TILE_WIDTH;
                let tile_y0 = ty * TILE_HEIGHT;
                let tile_x1 = tile_x0 + TILE_WIDTH - 1;
                let tile_y1 = tile_y0 + TILE_HEIGHT - 1;

                let covers_tile = px0 <= tile_x0 && px1 >= tile_x1 && py0 <= tile_y0 && py1 >= tile_y1;
                let hidden = if covers_tile {
                    min_depth > tile.max_depth()
                } else if tile.is_fully_covered() {
                    min_depth > tile.z0()
                } else {
                    let required = span_mask(px0.max(tile_x0) - tile_x0, px1.min(tile_x1) - tile_x0);
                    let rows = (py0.max(tile_y0) - tile_y0)..=(py1.min(tile_y1) - tile_y0);
                    let rows_covered = rows
                        .map(|row| tile.mask()[row as usize])
                        .all(|bits| bits & required == required);
                    rows_covered && min_depth > tile.z1()
                };
                if !hidden {
                    return false;
                }
            }
        }
        true
    }

    // ===== ACCESSORS =====

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Tile grid size (columns, rows).
    pub fn tile_count(&self) -> (u32, u32) {
        (self.tiles_x, self.tiles_y)
    }

    pub fn tile(&self, tx: u32, ty: u32) -> Option<&Tile> {
        if tx >= self.tiles_x || ty >= self.tiles_y {
            return None;
        }
        self.tiles.get((ty * self.tiles_x + tx) as usize)
    }

    /// All tiles, row-major.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn view_projection(&self) -> &Mat4 {
        &self.view_projection
    }

    pub fn stats(&self) -> OcclusionStats {
        self.stats
    }

    // ===== RASTERIZATION (internal) =====

    /// Clip-space projection to screen (x, y in pixels, z = depth).
    /// `None` when the point is behind the eye.
    fn project(&self, matrix: &Mat4, point: Vec3) -> Option<Vec3> {
        let clip = *matrix * point.extend(1.0);
        if clip.w <= W_EPSILON {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Vec3::new(
            (ndc.x * 0.5 + 0.5) * self.width as f32,
            (0.5 - ndc.y * 0.5) * self.height as f32,
            ndc.z,
        ))
    }

    /// Pixels whose area the rectangle touches, clamped to the screen.
    fn pixel_rect(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Option<(u32, u32, u32, u32)> {
        let x0 = min_x.floor().max(0.0);
        let y0 = min_y.floor().max(0.0);
        let x1 = (max_x.ceil() - 1.0).min(self.width as f32 - 1.0);
        let y1 = (max_y.ceil() - 1.0).min(self.height as f32 - 1.0);
        if !(x0 <= x1 && y0 <= y1) {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }

    fn setup_triangle(&self, matrix: &Mat4, corners: [Vec3; 3]) -> TriangleSetup {
        let (Some(v0), Some(v1), Some(v2)) = (
            self.project(matrix, corners[0]),
            self.project(matrix, corners[1]),
            self.project(matrix, corners[2]),
        ) else {
            return TriangleSetup::Rejected;
        };

        let edges = [Edge::new(v0, v1), Edge::new(v1, v2), Edge::new(v2, v0)];
        let area = edges[0].eval(v2.x, v2.y);
        if !(area > 0.0) {
            return TriangleSetup::Rejected;
        }

        let Some((px0, py0, px1, py1)) = self.pixel_rect(
            v0.x.min(v1.x).min(v2.x),
            v0.y.min(v1.y).min(v2.y),
            v0.x.max(v1.x).max(v2.x),
            v0.y.max(v1.y).max(v2.y),
        ) else {
            return TriangleSetup::Offscreen;
        };
        TriangleSetup::Visible(ScreenTriangle {
            edges,
            depth: v0.z.max(v1.z).max(v2.z),
            min: (px0, py0),
            max: (px1, py1),
        })
    }

    fn rasterize_triangle(&mut self, matrix: &Mat4, corners: [Vec3; 3]) {
        self.stats.triangles_submitted += 1;
        let triangle = match self.setup_triangle(matrix, corners) {
            TriangleSetup::Visible(triangle) => triangle,
            TriangleSetup::Offscreen => return,
            TriangleSetup::Rejected => {
                self.stats.triangles_rejected += 1;
                return;
            }
        };

        for ty in triangle.min.1 / TILE_HEIGHT..=triangle.max.1 / TILE_HEIGHT {
            for tx in triangle.min.0 / TILE_WIDTH..=triangle.max.0 / TILE_WIDTH {
                let tile_x0 = (tx * TILE_WIDTH) as f32;
                let tile_y0 = (ty * TILE_HEIGHT) as f32;
                let index = (ty * self.tiles_x + tx) as usize;

                let changed = match classify_tile(&triangle.edges, tile_x0, tile_y0) {
                    TileCoverage::Miss => false,
                    TileCoverage::Full => self.tiles[index].apply_full(triangle.depth),
                    TileCoverage::Partial => {
                        let coverage = tile_coverage(&triangle.edges, tile_x0, tile_y0);
                        if coverage.iter().all(|&row| row == 0) {
                            false
                        } else if coverage.iter().all(|&row| row == FULL_ROW) {
                            self.tiles[index].apply_full(triangle.depth)
                        } else {
                            self.tiles[index].merge_partial(&coverage, triangle.depth)
                        }
                    }
                };
                if changed {
                    self.stats.tiles_updated += 1;
                }
            }
        }
    }
}

/// Classify a triangle against the pixel centers at the 4 tile corners.
///
/// Edge functions are linear, so the corners bound every pixel center
/// of the tile.
fn classify_tile(edges: &[Edge; 3], tile_x0: f32, tile_y0: f32) -> TileCoverage {
    let xs = [tile_x0 + 0.5, tile_x0 + TILE_WIDTH as f32 - 0.5];
    let ys = [tile_y0 + 0.5, tile_y0 + TILE_HEIGHT as f32 - 0.5];
    let mut all_inside = true;
    for edge in edges {
        let mut inside = 0;
        for &x in &xs {
            for &y in &ys {
                if edge.eval(x, y) >= 0.0 {
                    inside += 1;
                }
            }
        }
        if inside == 0 {
            return TileCoverage::Miss;
        }
        if inside < 4 {
            all_inside = false;
        }
    }
    if all_inside {
        TileCoverage::Full
    } else {
        TileCoverage::Partial
    }
}

/// Exact per-pixel-center coverage of a triangle inside one tile.
fn tile_coverage(edges: &[Edge; 3], tile_x0: f32, tile_y0: f32) -> [u32; TILE_HEIGHT as usize] {
    let mut coverage = [0u32; TILE_HEIGHT as usize];
    for (row, bits) in coverage.iter_mut().enumerate() {
        let y = tile_y0 + row as f32 + 0.5;
        for column in 0..TILE_WIDTH {
            let x = tile_x0 + column as f32 + 0.5;
            if edges.iter().all(|e| e.eval(x, y) >= 0.0) {
                *bits |= 1 << column;
            }
        }
    }
    coverage
}

#[cfg(test)]
#[path = "occlusion_buffer_tests.rs"]
mod tests;
