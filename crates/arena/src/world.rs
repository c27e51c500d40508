//! World state management.
//!
//! Owns this tick's entity lists and the partition index built from them.
//! Movement here is a random drift so the engine can be driven headless;
//! real physics and collision live outside this crate.

use crate::config::Config;
use crate::entity::{Cell, Color, EjectedMass, Food, Player, PlayerCell, Virus};
use crate::error::ArenaError;
use crate::spatial::{PartitionIndex, RebuildStats};
use crate::visibility::{EntityLists, VisibilityResolver, VisibleSet};
use glam::Vec2;
use rand::Rng;
use tracing::debug;

/// World border bounds, `[0, width] x [0, height]`.
#[derive(Debug, Clone, Copy)]
pub struct WorldBorder {
    pub width: f32,
    pub height: f32,
}

impl WorldBorder {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Get a random position within the border.
    #[inline]
    pub fn random_position(&self) -> Vec2 {
        let mut rng = rand::rng();
        Vec2::new(rng.random_range(0.0..self.width), rng.random_range(0.0..self.height))
    }

    /// Keep a cell inside the border.
    #[inline]
    pub fn clamp_cell<C: Cell>(&self, cell: &mut C) {
        cell.data_mut().check_border(0.0, 0.0, self.width, self.height);
    }
}

/// The game world: per-tick entity lists plus their spatial index.
#[derive(Debug)]
pub struct World {
    /// Next node ID to assign.
    next_node_id: u32,
    /// Number of completed rebuilds.
    tick: u64,

    pub food: Vec<Food>,
    pub viruses: Vec<Virus>,
    pub ejected: Vec<EjectedMass>,
    pub players: Vec<Player>,

    pub border: WorldBorder,
    partition: PartitionIndex,
}

impl World {
    /// Create an empty world sized by the `[world]` and `[grid]` sections.
    pub fn new(config: &Config) -> Result<Self, ArenaError> {
        let partition = PartitionIndex::from_config(config)?;
        let border = WorldBorder::new(partition.world().width(), partition.world().height());
        Ok(Self {
            next_node_id: 1,
            tick: 0,
            food: Vec::with_capacity(1024),
            viruses: Vec::with_capacity(64),
            ejected: Vec::with_capacity(256),
            players: Vec::with_capacity(64),
            border,
            partition,
        })
    }

    /// Get the next node ID.
    pub fn next_id(&mut self) -> u32 {
        let id = self.next_node_id;
        self.next_node_id = self.next_node_id.wrapping_add(1);
        if self.next_node_id == 0 {
            self.next_node_id = 1; // Skip 0
        }
        id
    }

    #[inline]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// The index as of the last [`rebuild`](Self::rebuild).
    #[inline]
    pub fn partition(&self) -> &PartitionIndex {
        &self.partition
    }

    /// Borrow the entity lists the index refers to.
    #[inline]
    pub fn lists(&self) -> EntityLists<'_> {
        EntityLists {
            food: &self.food,
            viruses: &self.viruses,
            mass: &self.ejected,
            players: &self.players,
        }
    }

    /// Generate a random color.
    #[inline]
    pub fn random_color() -> Color {
        let mut rng = rand::rng();
        Color::new(
            rng.random_range(50..=255),
            rng.random_range(50..=255),
            rng.random_range(50..=255),
        )
    }

    /// Top food up to `target`.
    pub fn spawn_food(&mut self, target: usize, size: f32) {
        while self.food.len() < target {
            let pos = self.border.random_position();
            let id = self.next_id();
            let mut food = Food::new(id, pos, size);
            food.set_color(Self::random_color());
            self.food.push(food);
        }
    }

    /// Top viruses up to `target`.
    pub fn spawn_viruses(&mut self, target: usize, size: f32) {
        while self.viruses.len() < target {
            let pos = self.border.random_position();
            let id = self.next_id();
            self.viruses.push(Virus::new(id, pos, size));
        }
    }

    /// Top ejected mass up to `target`.
    pub fn spawn_ejected(&mut self, target: usize, size: f32) {
        while self.ejected.len() < target {
            let pos = self.border.random_position();
            let id = self.next_id();
            let mut mass = EjectedMass::new(id, pos, size);
            mass.set_color(Self::random_color());
            self.ejected.push(mass);
        }
    }

    /// Spawn a player with `cells` cells scattered around a random point.
    pub fn spawn_player(&mut self, name: &str, cells: usize, size: f32) -> u32 {
        let player_id = self.next_id();
        let mut player = Player::new(player_id, name);
        player.color = Self::random_color();

        let center = self.border.random_position();
        let mut rng = rand::rng();
        for _ in 0..cells.max(1) {
            let offset = Vec2::new(rng.random_range(-size..=size), rng.random_range(-size..=size)) * 2.0;
            let id = self.next_id();
            let mut cell = PlayerCell::new(id, player_id, center + offset, size);
            self.border.clamp_cell(&mut cell);
            player.add_cell(cell);
        }

        self.players.push(player);
        player_id
    }

    /// Remove a food pellet. Invalidates indices until the next rebuild.
    pub fn remove_food(&mut self, index: usize) -> Option<Food> {
        (index < self.food.len()).then(|| self.food.swap_remove(index))
    }

    /// Remove an ejected mass fragment. Invalidates indices until the next rebuild.
    pub fn remove_ejected(&mut self, index: usize) -> Option<EjectedMass> {
        (index < self.ejected.len()).then(|| self.ejected.swap_remove(index))
    }

    /// Move every player cell and mass fragment by up to `max_step`, staying
    /// inside the border.
    pub fn drift(&mut self, max_step: f32) {
        if max_step <= 0.0 {
            return;
        }
        let mut rng = rand::rng();
        let border = self.border;

        for cell in self.players.iter_mut().flat_map(|p| p.cells.iter_mut()) {
            cell.data_mut().position += Vec2::new(
                rng.random_range(-max_step..=max_step),
                rng.random_range(-max_step..=max_step),
            );
            border.clamp_cell(cell);
        }
        for mass in &mut self.ejected {
            mass.data_mut().position += Vec2::new(
                rng.random_range(-max_step..=max_step),
                rng.random_range(-max_step..=max_step),
            );
            border.clamp_cell(mass);
        }
    }

    /// Rebuild the partition index from the current lists.
    pub fn rebuild(&mut self) -> RebuildStats {
        self.partition.rebuild(&self.food, &self.viruses, &self.ejected, &self.players);
        self.tick += 1;
        self.partition.stats()
    }

    /// Resolve the visible set of every living player against the last
    /// rebuild, in player order.
    pub fn visible_sets<'a>(&'a self, resolver: &mut VisibilityResolver) -> Vec<(u32, VisibleSet<'a>)> {
        let lists = self.lists();
        let sets: Vec<_> = self
            .players
            .iter()
            .filter(|p| p.is_alive())
            .map(|p| (p.id, resolver.resolve(p, &self.partition, &lists)))
            .collect();
        debug!("Resolved {} visible sets for tick {}", sets.len(), self.tick);
        sets
    }

    /// Get the count of each entity type.
    #[inline]
    pub fn cell_counts(&self) -> CellCounts {
        let player_cells: usize = self.players.iter().map(|p| p.cells.len()).sum();
        CellCounts {
            players: self.players.len(),
            player_cells,
            food: self.food.len(),
            viruses: self.viruses.len(),
            ejected: self.ejected.len(),
            total: player_cells + self.food.len() + self.viruses.len() + self.ejected.len(),
        }
    }
}

/// Entity count statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellCounts {
    pub players: usize,
    pub player_cells: usize,
    pub food: usize,
    pub viruses: usize,
    pub ejected: usize,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewConfig;
    use crate::entity::EntityKind;

    fn small_config() -> Config {
        let mut config = Config::default();
        config.world.width = 2000.0;
        config.world.height = 2000.0;
        config
    }

    #[test]
    fn test_new_rejects_invalid_world() {
        let mut config = small_config();
        config.world.height = 0.0;
        assert!(matches!(World::new(&config), Err(ArenaError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_spawn_and_counts() {
        let mut world = World::new(&small_config()).unwrap();
        world.spawn_food(100, 10.0);
        world.spawn_viruses(5, 100.0);
        world.spawn_ejected(7, 36.0);
        let id = world.spawn_player("bot", 3, 32.0);

        let counts = world.cell_counts();
        assert_eq!(counts.food, 100);
        assert_eq!(counts.viruses, 5);
        assert_eq!(counts.ejected, 7);
        assert_eq!(counts.players, 1);
        assert_eq!(counts.player_cells, 3);
        assert_eq!(counts.total, 115);
        assert_eq!(world.players[0].id, id);
    }

    #[test]
    fn test_drift_stays_inside_border() {
        let mut world = World::new(&small_config()).unwrap();
        world.spawn_player("a", 4, 32.0);
        world.spawn_ejected(20, 36.0);
        for _ in 0..200 {
            world.drift(150.0);
        }

        let stats = world.rebuild();
        assert_eq!(stats.clamped, 0);
        assert_eq!(stats.entries(EntityKind::Player), 4);
    }

    #[test]
    fn test_tick_visible_sets_after_churn() {
        let mut config = small_config();
        config.view = ViewConfig {
            screen_width: 4000.0,
            screen_height: 4000.0,
            margin: 0.0,
            scale_with_size: false,
        };
        let mut world = World::new(&config).unwrap();
        world.spawn_food(50, 10.0);
        world.spawn_player("a", 2, 32.0);
        world.spawn_player("b", 1, 32.0);
        world.rebuild();
        assert_eq!(world.tick(), 1);

        let mut resolver = VisibilityResolver::new(config.view.clone());
        let sets = world.visible_sets(&mut resolver);
        assert_eq!(sets.len(), 2);
        // The window covers the whole world.
        assert_eq!(sets[0].1.food.len(), 50);
        assert_eq!(sets[0].1.players.len(), 2);
        drop(sets);

        for _ in 0..10 {
            world.remove_food(0);
        }
        assert!(world.remove_food(1000).is_none());
        world.rebuild();

        let sets = world.visible_sets(&mut resolver);
        assert_eq!(sets[1].1.food.len(), 40);
    }
}
