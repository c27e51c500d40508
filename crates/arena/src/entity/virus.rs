//! Virus.

use super::cell::{Cell, CellData, Color};
use glam::Vec2;

/// Default virus color (green).
pub const VIRUS_COLOR: Color = Color::new(51, 255, 51);

/// A virus that can pop player cells.
#[derive(Debug, Clone)]
pub struct Virus {
    data: CellData,
}

impl Virus {
    pub fn new(node_id: u32, position: Vec2, size: f32) -> Self {
        let mut data = CellData::new(node_id, position, size);
        data.color = VIRUS_COLOR;
        Self { data }
    }
}

impl Cell for Virus {
    fn data(&self) -> &CellData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut CellData {
        &mut self.data
    }
}
