//! Food pellet.

use super::cell::{Cell, CellData, Color};
use glam::Vec2;

/// A food pellet that can be eaten by players.
#[derive(Debug, Clone)]
pub struct Food {
    data: CellData,
}

impl Food {
    pub fn new(node_id: u32, position: Vec2, size: f32) -> Self {
        Self {
            data: CellData::new(node_id, position, size),
        }
    }

    pub fn set_color(&mut self, color: Color) {
        self.data.color = color;
    }
}

impl Cell for Food {
    fn data(&self) -> &CellData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut CellData {
        &mut self.data
    }
}
