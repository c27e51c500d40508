//! Base cell data shared by every entity on the map.

use glam::Vec2;

/// RGB color carried by cells so the serialization layer can forward it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Common cell data shared by all cell types.
#[derive(Debug, Clone)]
pub struct CellData {
    /// Stable node ID.
    pub node_id: u32,
    /// Position in world coordinates.
    pub position: Vec2,
    /// Cell size (radius).
    pub size: f32,
    /// Cell color.
    pub color: Color,
}

impl CellData {
    pub fn new(node_id: u32, position: Vec2, size: f32) -> Self {
        Self {
            node_id,
            position,
            size,
            color: Color::default(),
        }
    }

    /// Clamp position to the border, keeping half the cell inside.
    #[inline]
    pub fn check_border(&mut self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) {
        let half_size = (self.size / 2.0).min((max_x - min_x) / 2.0).min((max_y - min_y) / 2.0);
        self.position.x = self.position.x.clamp(min_x + half_size, max_x - half_size);
        self.position.y = self.position.y.clamp(min_y + half_size, max_y - half_size);
    }
}

/// Access to the common data of a single-circle entity.
pub trait Cell {
    fn data(&self) -> &CellData;

    fn data_mut(&mut self) -> &mut CellData;
}
