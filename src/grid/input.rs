use glam::Vec2;

/// Pixel-space bounds of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Viewport anchored at the window origin.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, width as f32, height as f32)
    }

    /// Maps a pointer position to NDC. Screen Y grows down, NDC Y grows up.
    pub fn to_ndc(&self, x: f32, y: f32) -> Option<Vec2> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        let nx = (x - self.left) / self.width * 2.0 - 1.0;
        let ny = -((y - self.top) / self.height * 2.0 - 1.0);
        Some(Vec2::new(nx, ny))
    }
}

/// Axis-aligned box test around `center`. Edges are exclusive.
pub fn hit_test(center: Vec2, point: Vec2, half_extent: f32) -> bool {
    (point.x - center.x).abs() < half_extent && (point.y - center.y).abs() < half_extent
}

/// Pointer position as the grid sees it. `None` while an overlay covers the pointer.
pub fn grid_pointer(viewport: &Viewport, x: f32, y: f32, over_overlay: bool) -> Option<Vec2> {
    if over_overlay {
        return None;
    }
    viewport.to_ndc(x, y)
}
