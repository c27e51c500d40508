//! Game entities.
//!
//! Four categories are indexed per tick: food, viruses, ejected mass and
//! players. The first three are point entities; a player is a body of one or
//! more sub-circles, each occupying its own grid cell.

mod cell;
mod ejected_mass;
mod food;
mod player;
mod virus;

pub use cell::{Cell, CellData, Color};
pub use ejected_mass::EjectedMass;
pub use food::Food;
pub use player::{Player, PlayerCell};
pub use virus::Virus;

use glam::Vec2;

/// Entity category discriminant.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityKind {
    Food = 0,
    Virus = 1,
    Mass = 2,
    Player = 3,
}

impl EntityKind {
    /// All categories in index order.
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Food,
        EntityKind::Virus,
        EntityKind::Mass,
        EntityKind::Player,
    ];
}

/// Anything the partition index can place on the grid.
pub trait Spatial {
    /// Category this entity is indexed under.
    const KIND: EntityKind;

    /// Stable node ID. Only used to track what a client has seen across ticks,
    /// never to look entities up in the index.
    fn node_id(&self) -> u32;

    /// Every world position this entity occupies. Point entities yield one,
    /// players yield one per sub-circle.
    fn points(&self) -> impl Iterator<Item = Vec2> + '_;
}

impl Spatial for Food {
    const KIND: EntityKind = EntityKind::Food;

    #[inline]
    fn node_id(&self) -> u32 {
        self.data().node_id
    }

    #[inline]
    fn points(&self) -> impl Iterator<Item = Vec2> + '_ {
        std::iter::once(self.data().position)
    }
}

impl Spatial for Virus {
    const KIND: EntityKind = EntityKind::Virus;

    #[inline]
    fn node_id(&self) -> u32 {
        self.data().node_id
    }

    #[inline]
    fn points(&self) -> impl Iterator<Item = Vec2> + '_ {
        std::iter::once(self.data().position)
    }
}

impl Spatial for EjectedMass {
    const KIND: EntityKind = EntityKind::Mass;

    #[inline]
    fn node_id(&self) -> u32 {
        self.data().node_id
    }

    #[inline]
    fn points(&self) -> impl Iterator<Item = Vec2> + '_ {
        std::iter::once(self.data().position)
    }
}

impl Spatial for Player {
    const KIND: EntityKind = EntityKind::Player;

    #[inline]
    fn node_id(&self) -> u32 {
        self.id
    }

    #[inline]
    fn points(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.cells.iter().map(|c| c.data().position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_entities_yield_one_point() {
        let food = Food::new(7, Vec2::new(10.0, 20.0), 10.0);
        let points: Vec<Vec2> = food.points().collect();
        assert_eq!(points, vec![Vec2::new(10.0, 20.0)]);
        assert_eq!(food.node_id(), 7);
        assert_eq!(<Food as Spatial>::KIND, EntityKind::Food);
    }

    #[test]
    fn test_player_yields_point_per_cell() {
        let mut player = Player::new(3, "p");
        player.add_cell(PlayerCell::new(10, 3, Vec2::new(50.0, 50.0), 40.0));
        player.add_cell(PlayerCell::new(11, 3, Vec2::new(900.0, 900.0), 30.0));

        let points: Vec<Vec2> = player.points().collect();
        assert_eq!(points.len(), 2);
        assert_eq!(player.node_id(), 3);
    }
}
