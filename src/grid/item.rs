use std::path::PathBuf;

use glam::Vec2;

use super::input;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureStatus {
    /// Slot holds the checker placeholder; decode still in flight.
    Pending,
    Ready { width: u32, height: u32 },
    Failed,
}

/// One selectable quad.
#[derive(Debug, Clone)]
pub struct Item {
    pub position: Vec2,
    pub selected: bool,
    pub hovered: bool,
    pub current_scale: f32,
    pub image_source: PathBuf,
    pub texture: TextureStatus,
}

impl Item {
    pub fn new(position: Vec2, image_source: impl Into<PathBuf>) -> Self {
        Self {
            position,
            selected: false,
            hovered: false,
            current_scale: 1.0,
            image_source: image_source.into(),
            texture: TextureStatus::Pending,
        }
    }

    pub fn contains(&self, point: Vec2, half_extent: f32) -> bool {
        input::hit_test(self.position, point, half_extent)
    }
}
