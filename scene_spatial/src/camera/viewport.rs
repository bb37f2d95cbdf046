/// Viewport rectangle and depth range.
///
/// The occlusion buffer rasterizes into a grid sized from `width` x
/// `height`; `x`/`y` only place that grid on the render target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Viewport at the origin with the full [0, 1] depth range.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }

    /// Pixel dimensions, rounded up. `None` if either side is empty or not finite.
    pub fn pixel_size(&self) -> Option<(u32, u32)> {
        if !self.width.is_finite() || !self.height.is_finite() {
            return None;
        }
        let w = self.width.ceil();
        let h = self.height.ceil();
        if w < 1.0 || h < 1.0 {
            return None;
        }
        Some((w as u32, h as u32))
    }
}
