//! Per-player visibility.
//!
//! Each tick, after the partition index has been rebuilt, every connected
//! player gets the set of entities inside a square window around its largest
//! cell. The window is resolved at grid-cell granularity: anything indexed in
//! a cell the window touches is visible.

use crate::config::ViewConfig;
use crate::entity::{EjectedMass, EntityKind, Food, Player, Spatial, Virus};
use crate::spatial::{Bounds, PartitionIndex, QueryResult};
use std::collections::HashSet;

/// Borrowed view of this tick's entity lists.
///
/// Indices returned by the partition index point into these slices.
#[derive(Debug, Clone, Copy)]
pub struct EntityLists<'a> {
    pub food: &'a [Food],
    pub viruses: &'a [Virus],
    pub mass: &'a [EjectedMass],
    pub players: &'a [Player],
}

/// Entities one player must receive this tick. Each entity appears at most
/// once per category; order is unspecified.
#[derive(Debug, Clone, Default)]
pub struct VisibleSet<'a> {
    pub food: Vec<&'a Food>,
    pub viruses: Vec<&'a Virus>,
    pub mass: Vec<&'a EjectedMass>,
    pub players: Vec<&'a Player>,
}

impl<'a> VisibleSet<'a> {
    pub fn len(&self) -> usize {
        self.food.len() + self.viruses.len() + self.mass.len() + self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stable identity of every visible entity.
    pub fn node_ids(&self) -> impl Iterator<Item = (EntityKind, u32)> + '_ {
        fn tagged<'s, T: Spatial>(list: &'s [&'s T]) -> impl Iterator<Item = (EntityKind, u32)> + 's {
            list.iter().map(|e| (T::KIND, e.node_id()))
        }
        tagged(self.food.as_slice())
            .chain(tagged(self.viruses.as_slice()))
            .chain(tagged(self.mass.as_slice()))
            .chain(tagged(self.players.as_slice()))
    }
}

/// Client zoom for a body of the given total size.
/// Matches the client: `min(64 / size, 1) ^ 0.4`.
#[inline]
pub fn view_scale(total_size: f32) -> f32 {
    if total_size <= 0.0 {
        1.0
    } else {
        (64.0 / total_size).min(1.0).powf(0.4)
    }
}

/// Square window centered on the player's largest cell, or `None` for a
/// player without cells.
pub fn view_window(player: &Player, view: &ViewConfig) -> Option<Bounds> {
    let center = player.representative_position()?;
    let mut half = view.screen_width.max(view.screen_height) as f32 / 2.0;
    if view.scale_with_size {
        half /= view_scale(player.total_size());
    }
    Some(Bounds::from_center(center, half + view.margin as f32))
}

/// Resolve the visible set for one player against a freshly rebuilt index.
///
/// Indices that no longer resolve into `lists` are skipped.
pub fn visible_set_for<'a>(
    player: &Player,
    index: &PartitionIndex,
    lists: &EntityLists<'a>,
    view: &ViewConfig,
) -> VisibleSet<'a> {
    VisibilityResolver::new(view.clone()).resolve(player, index, lists)
}

/// Reusable resolver. Keeps its query buffers between calls, so one resolver
/// per worker thread avoids per-player allocation inside the index.
#[derive(Debug, Clone, Default)]
pub struct VisibilityResolver {
    view: ViewConfig,
    scratch: QueryResult,
}

impl VisibilityResolver {
    pub fn new(view: ViewConfig) -> Self {
        Self {
            view,
            scratch: QueryResult::new(),
        }
    }

    #[inline]
    pub fn view(&self) -> &ViewConfig {
        &self.view
    }

    pub fn resolve<'a>(&mut self, player: &Player, index: &PartitionIndex, lists: &EntityLists<'a>) -> VisibleSet<'a> {
        let Some(window) = view_window(player, &self.view) else {
            return VisibleSet::default();
        };
        index.query_into(&window, &mut self.scratch);

        VisibleSet {
            food: resolve_indices(self.scratch.food(), lists.food),
            viruses: resolve_indices(self.scratch.viruses(), lists.viruses),
            mass: resolve_indices(self.scratch.mass(), lists.mass),
            players: resolve_indices(self.scratch.players(), lists.players),
        }
    }
}

#[inline]
fn resolve_indices<'a, T>(indices: &[usize], list: &'a [T]) -> Vec<&'a T> {
    indices.iter().filter_map(|&i| list.get(i)).collect()
}

/// Entities that came into or went out of a client's view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewDelta {
    pub entered: Vec<(EntityKind, u32)>,
    pub left: Vec<(EntityKind, u32)>,
}

impl ViewDelta {
    pub fn is_empty(&self) -> bool {
        self.entered.is_empty() && self.left.is_empty()
    }
}

/// What one client was sent last tick, keyed by node ID.
#[derive(Debug, Clone, Default)]
pub struct ViewTracker {
    sent: HashSet<(EntityKind, u32)>,
}

impl ViewTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entities the client currently knows about.
    pub fn len(&self) -> usize {
        self.sent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.is_empty()
    }

    pub fn contains(&self, kind: EntityKind, node_id: u32) -> bool {
        self.sent.contains(&(kind, node_id))
    }

    /// Replace the remembered set with `visible` and report the difference.
    pub fn update(&mut self, visible: &VisibleSet<'_>) -> ViewDelta {
        let current: HashSet<(EntityKind, u32)> = visible.node_ids().collect();

        let mut entered: Vec<_> = current.difference(&self.sent).copied().collect();
        let mut left: Vec<_> = self.sent.difference(&current).copied().collect();
        entered.sort_unstable();
        left.sort_unstable();

        self.sent = current;
        ViewDelta { entered, left }
    }

    /// Forget everything, e.g. after the client respawns.
    pub fn clear(&mut self) {
        self.sent.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::PlayerCell;
    use glam::Vec2;

    fn small_view() -> ViewConfig {
        // half extent = 400 / 2 + 100 = 300
        ViewConfig {
            screen_width: 400.0,
            screen_height: 200.0,
            margin: 100.0,
            scale_with_size: false,
        }
    }

    fn player_at(id: u32, points: &[(f32, f32)]) -> Player {
        let mut player = Player::new(id, format!("player {id}"));
        for (i, &(x, y)) in points.iter().enumerate() {
            player.add_cell(PlayerCell::new(id * 100 + i as u32, id, Vec2::new(x, y), 32.0));
        }
        player
    }

    fn food_at(id: u32, x: f32, y: f32) -> Food {
        Food::new(id, Vec2::new(x, y), 10.0)
    }

    #[test]
    fn test_view_window_uses_largest_cell() {
        let mut player = Player::new(1, "p");
        player.add_cell(PlayerCell::new(1, 1, Vec2::new(100.0, 100.0), 20.0));
        player.add_cell(PlayerCell::new(2, 1, Vec2::new(1000.0, 1000.0), 60.0));

        let window = view_window(&player, &small_view()).unwrap();
        assert_eq!(window, Bounds::new(700.0, 700.0, 1300.0, 1300.0));
    }

    #[test]
    fn test_view_window_scales_with_size() {
        let mut view = small_view();
        view.scale_with_size = true;

        let mut player = Player::new(1, "p");
        player.add_cell(PlayerCell::new(1, 1, Vec2::new(1000.0, 1000.0), 64.0));
        // Size 64 gives scale 1: no widening.
        assert_eq!(view_window(&player, &view).unwrap().width(), 600.0);

        player.add_cell(PlayerCell::new(2, 1, Vec2::new(1000.0, 1000.0), 960.0));
        let wide = view_window(&player, &view).unwrap();
        assert!(wide.width() > 600.0);
        assert!((view_scale(1024.0) - 0.5f32.powf(1.6)).abs() < 1e-6);
    }

    #[test]
    fn test_dead_player_sees_nothing() {
        let mut index = PartitionIndex::configure(2000.0, 2000.0, 250.0).unwrap();
        let food = vec![food_at(1, 10.0, 10.0)];
        index.rebuild(&food, &[], &[], &[]);

        let lists = EntityLists { food: &food, viruses: &[], mass: &[], players: &[] };
        let ghost = Player::new(9, "ghost");
        assert!(view_window(&ghost, &small_view()).is_none());
        assert!(visible_set_for(&ghost, &index, &lists, &small_view()).is_empty());
    }

    #[test]
    fn test_visible_set_resolves_nearby_entities() {
        let mut index = PartitionIndex::configure(2000.0, 2000.0, 250.0).unwrap();
        let food = vec![food_at(1, 1000.0, 1000.0), food_at(2, 1900.0, 100.0)];
        let viruses = vec![Virus::new(3, Vec2::new(1100.0, 900.0), 100.0)];
        let mass = vec![EjectedMass::new(4, Vec2::new(50.0, 1950.0), 36.0)];
        let players = vec![player_at(1, &[(1000.0, 1000.0)]), player_at(2, &[(1200.0, 1200.0)])];
        index.rebuild(&food, &viruses, &mass, &players);

        let lists = EntityLists { food: &food, viruses: &viruses, mass: &mass, players: &players };
        let visible = visible_set_for(&players[0], &index, &lists, &small_view());

        assert_eq!(visible.food.len(), 1);
        assert_eq!(visible.food[0].node_id(), 1);
        assert_eq!(visible.viruses.len(), 1);
        assert!(visible.mass.is_empty());

        let mut seen: Vec<u32> = visible.players.iter().map(|p| p.id).collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn test_multi_cell_player_visible_once() {
        let mut index = PartitionIndex::configure(2000.0, 2000.0, 250.0).unwrap();
        let players = vec![
            player_at(1, &[(1000.0, 1000.0)]),
            player_at(2, &[(900.0, 900.0), (1100.0, 1100.0), (1010.0, 990.0), (800.0, 1200.0)]),
        ];
        index.rebuild(&[], &[], &[], &players);

        let lists = EntityLists { food: &[], viruses: &[], mass: &[], players: &players };
        let visible = visible_set_for(&players[0], &index, &lists, &small_view());

        assert_eq!(visible.players.len(), 2);
        assert_eq!(visible.players.iter().filter(|p| p.id == 2).count(), 1);
    }

    #[test]
    fn test_stale_indices_are_skipped() {
        let mut index = PartitionIndex::configure(2000.0, 2000.0, 250.0).unwrap();
        let food = vec![food_at(1, 1000.0, 1000.0), food_at(2, 1010.0, 1000.0), food_at(3, 1020.0, 1000.0)];
        let players = vec![player_at(1, &[(1000.0, 1000.0)])];
        index.rebuild(&food, &[], &[], &players);

        // The food list shrank after the rebuild.
        let lists = EntityLists { food: &food[..1], viruses: &[], mass: &[], players: &players };
        let visible = visible_set_for(&players[0], &index, &lists, &small_view());
        assert_eq!(visible.food.len(), 1);
        assert_eq!(visible.food[0].node_id(), 1);
    }

    #[test]
    fn test_resolver_reuse_and_parallel_queries() {
        let mut index = PartitionIndex::configure(2000.0, 2000.0, 250.0).unwrap();
        let food: Vec<Food> = (0..200).map(|i| food_at(i, (i * 10) as f32, (i * 10) as f32)).collect();
        let players: Vec<Player> = (0..4).map(|i| player_at(i, &[(i as f32 * 500.0 + 100.0, i as f32 * 500.0 + 100.0)])).collect();
        index.rebuild(&food, &[], &[], &players);
        let lists = EntityLists { food: &food, viruses: &[], mass: &[], players: &players };

        let mut resolver = VisibilityResolver::new(small_view());
        let sequential: Vec<usize> = players.iter().map(|p| resolver.resolve(p, &index, &lists).len()).collect();

        let parallel: Vec<usize> = std::thread::scope(|s| {
            let handles: Vec<_> = players
                .iter()
                .map(|p| {
                    let index = &index;
                    s.spawn(move || visible_set_for(p, index, &lists, &small_view()).len())
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(sequential, parallel);
        assert!(sequential.iter().all(|&n| n > 0));
    }

    #[test]
    fn test_view_tracker_reports_deltas() {
        let food = vec![food_at(10, 0.0, 0.0), food_at(11, 0.0, 0.0)];
        let players = vec![player_at(1, &[(0.0, 0.0)])];

        let mut tracker = ViewTracker::new();
        let first = VisibleSet { food: vec![&food[0]], players: vec![&players[0]], ..Default::default() };
        let delta = tracker.update(&first);
        assert_eq!(delta.entered, vec![(EntityKind::Food, 10), (EntityKind::Player, 1)]);
        assert!(delta.left.is_empty());

        let second = VisibleSet { food: vec![&food[1]], players: vec![&players[0]], ..Default::default() };
        let delta = tracker.update(&second);
        assert_eq!(delta.entered, vec![(EntityKind::Food, 11)]);
        assert_eq!(delta.left, vec![(EntityKind::Food, 10)]);
        assert!(tracker.contains(EntityKind::Player, 1));
        assert_eq!(tracker.len(), 2);

        assert!(tracker.update(&second).is_empty());
        tracker.clear();
        assert!(tracker.is_empty());
    }
}
