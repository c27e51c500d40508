//! Players and their cells.

use super::cell::{Cell, CellData, Color};
use glam::Vec2;

/// One sub-circle of a player's body.
#[derive(Debug, Clone)]
pub struct PlayerCell {
    /// Cell data (public for direct access).
    pub cell_data: CellData,
    /// Owning player ID.
    pub owner_id: u32,
}

impl PlayerCell {
    pub fn new(node_id: u32, owner_id: u32, position: Vec2, size: f32) -> Self {
        Self {
            cell_data: CellData::new(node_id, position, size),
            owner_id,
        }
    }
}

impl Cell for PlayerCell {
    fn data(&self) -> &CellData {
        &self.cell_data
    }

    fn data_mut(&mut self) -> &mut CellData {
        &mut self.cell_data
    }
}

/// A player: one or more cells under a single owner.
///
/// A player with no cells is dead or spectating; it is indexed nowhere and
/// has no view window.
#[derive(Debug, Clone)]
pub struct Player {
    /// Unique player ID.
    pub id: u32,
    /// Player name.
    pub name: String,
    /// Player color, shared by all of its cells.
    pub color: Color,
    /// Cells owned by this player.
    pub cells: Vec<PlayerCell>,
}

impl Player {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color: Color::default(),
            cells: Vec::new(),
        }
    }

    /// Add a cell, taking ownership and the player's color.
    pub fn add_cell(&mut self, mut cell: PlayerCell) {
        cell.owner_id = self.id;
        cell.cell_data.color = self.color;
        self.cells.push(cell);
    }

    /// The largest cell; ties resolve to the first one added.
    pub fn largest_cell(&self) -> Option<&PlayerCell> {
        self.cells.iter().fold(None, |best: Option<&PlayerCell>, cell| match best {
            Some(b) if b.cell_data.size >= cell.cell_data.size => Some(b),
            _ => Some(cell),
        })
    }

    /// Position the player's view is centered on.
    #[inline]
    pub fn representative_position(&self) -> Option<Vec2> {
        self.largest_cell().map(|c| c.cell_data.position)
    }

    /// Sum of cell sizes.
    #[inline]
    pub fn total_size(&self) -> f32 {
        self.cells.iter().map(|c| c.cell_data.size).sum()
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        !self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_largest_cell_is_representative() {
        let mut player = Player::new(1, "big");
        player.add_cell(PlayerCell::new(10, 0, Vec2::new(50.0, 50.0), 30.0));
        player.add_cell(PlayerCell::new(11, 0, Vec2::new(900.0, 900.0), 80.0));
        player.add_cell(PlayerCell::new(12, 0, Vec2::new(400.0, 400.0), 80.0));

        assert_eq!(player.representative_position(), Some(Vec2::new(900.0, 900.0)));
        assert_eq!(player.total_size(), 190.0);
        assert!(player.cells.iter().all(|c| c.owner_id == 1));
    }

    #[test]
    fn test_dead_player_has_no_position() {
        let player = Player::new(2, "ghost");
        assert!(!player.is_alive());
        assert_eq!(player.representative_position(), None);
        assert_eq!(player.total_size(), 0.0);
    }
}
