use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Placement of the item grid in normalized device coordinates.
///
/// Items are enumerated row-major. Column `c` of row `r` sits at
/// `(start_x + (c + 1) * spacing_x, start_y - r * spacing_y)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridLayout {
    pub rows: usize,
    pub cols: usize,
    pub spacing_x: f32,
    pub spacing_y: f32,
    pub start_x: f32,
    pub start_y: f32,
    /// Half side of each quad. Drives both the vertex data and hit testing.
    pub item_half_extent: f32,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            rows: 2,
            cols: 3,
            spacing_x: 0.5,
            spacing_y: 0.5,
            start_x: -0.5,
            start_y: 0.25,
            item_half_extent: 0.2,
        }
    }
}

impl GridLayout {
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn position(&self, row: usize, col: usize) -> Vec2 {
        Vec2::new(
            self.start_x + (col as f32 + 1.0) * self.spacing_x,
            self.start_y - row as f32 * self.spacing_y,
        )
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec2> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| self.position(row, col)))
    }
}
