//! Ejected mass fragment.

use super::cell::{Cell, CellData, Color};
use glam::Vec2;

/// Mass ejected by a player.
#[derive(Debug, Clone)]
pub struct EjectedMass {
    data: CellData,
}

impl EjectedMass {
    pub fn new(node_id: u32, position: Vec2, size: f32) -> Self {
        Self {
            data: CellData::new(node_id, position, size),
        }
    }

    /// Set the color (usually inherits from the ejecting player).
    pub fn set_color(&mut self, color: Color) {
        self.data.color = color;
    }
}

impl Cell for EjectedMass {
    fn data(&self) -> &CellData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut CellData {
        &mut self.data
    }
}
