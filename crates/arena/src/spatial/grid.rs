//! Uniform grid partition of the world, rebuilt every tick.
//!
//! Entities are stored by their index into the per-tick lists, never by
//! reference or ID. Those indices are only meaningful until the lists change,
//! so an index must never be queried across a tick boundary: rebuild first.

use super::bounds::Bounds;
use crate::config::Config;
use crate::entity::{EjectedMass, EntityKind, Food, Player, Spatial, Virus};
use crate::error::ArenaError;
use fixedbitset::FixedBitSet;
use glam::Vec2;
use tracing::{debug, trace};

const KINDS: usize = EntityKind::ALL.len();

/// Upper bound on `cols * rows`. Each cell owns four vectors, so a grid past
/// this is a misconfigured cell size, not a tuning choice.
pub const MAX_GRID_CELLS: usize = 1 << 22;

/// Grid cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCoord {
    pub row: usize,
    pub col: usize,
}

impl GridCoord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// One grid cell: a list of entity indices per category.
///
/// Insertion is append-only. A multi-cell player can appear in the same
/// bucket more than once; queries deduplicate.
#[derive(Debug, Default, Clone)]
struct GridCell {
    buckets: [Vec<usize>; KINDS],
}

impl GridCell {
    #[inline]
    fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }
}

/// Counters from the most recent rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildStats {
    /// List length per category.
    pub entities: [usize; KINDS],
    /// Indices written per category (players write one per cell).
    pub entries: [usize; KINDS],
    /// Points that fell outside the world and were clamped onto the border.
    pub clamped: usize,
}

impl RebuildStats {
    #[inline]
    pub fn entities(&self, kind: EntityKind) -> usize {
        self.entities[kind as usize]
    }

    #[inline]
    pub fn entries(&self, kind: EntityKind) -> usize {
        self.entries[kind as usize]
    }
}

/// Deduplicated per-category indices returned by a range query.
///
/// Holds its own dedup bitsets so a caller can keep one around and reuse it
/// with [`PartitionIndex::query_into`] without allocating each tick.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    indices: [Vec<usize>; KINDS],
    seen: [FixedBitSet; KINDS],
}

impl QueryResult {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, kind: EntityKind) -> &[usize] {
        &self.indices[kind as usize]
    }

    #[inline]
    pub fn food(&self) -> &[usize] {
        self.get(EntityKind::Food)
    }

    #[inline]
    pub fn viruses(&self) -> &[usize] {
        self.get(EntityKind::Virus)
    }

    #[inline]
    pub fn mass(&self) -> &[usize] {
        self.get(EntityKind::Mass)
    }

    #[inline]
    pub fn players(&self) -> &[usize] {
        self.get(EntityKind::Player)
    }

    /// Total indices across all categories.
    pub fn len(&self) -> usize {
        self.indices.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.iter().all(Vec::is_empty)
    }

    fn clear(&mut self) {
        for list in &mut self.indices {
            list.clear();
        }
    }
}

/// Uniform grid over `[0, width] x [0, height]`.
pub struct PartitionIndex {
    world: Bounds,
    cell_size: f32,
    cols: usize,
    rows: usize,
    /// Row-major: `row * cols + col`.
    cells: Vec<GridCell>,
    stats: RebuildStats,
}

impl PartitionIndex {
    /// Create an index for a `width x height` world split into square cells.
    pub fn configure(width: f32, height: f32, cell_size: f32) -> Result<Self, ArenaError> {
        let invalid = ArenaError::InvalidConfiguration {
            width,
            height,
            cell_size,
        };
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !(valid(width) && valid(height) && valid(cell_size)) {
            return Err(invalid);
        }

        // `as usize` saturates, so a tiny cell size shows up as an overflow here.
        let cols = ((width / cell_size).ceil() as usize).max(1);
        let rows = ((height / cell_size).ceil() as usize).max(1);
        let cell_count = match cols.checked_mul(rows) {
            Some(count) if count <= MAX_GRID_CELLS => count,
            _ => return Err(invalid),
        };
        debug!("Partition index: {}x{} world, cell size {} -> {} cols x {} rows", width, height, cell_size, cols, rows);

        Ok(Self {
            world: Bounds::new(0.0, 0.0, width, height),
            cell_size,
            cols,
            rows,
            cells: vec![GridCell::default(); cell_count],
            stats: RebuildStats::default(),
        })
    }

    /// Create an index from the `[world]` and `[grid]` config sections.
    pub fn from_config(config: &Config) -> Result<Self, ArenaError> {
        Self::configure(
            config.world.width as f32,
            config.world.height as f32,
            config.grid.cell_size as f32,
        )
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// World rectangle covered by the grid.
    #[inline]
    pub fn world(&self) -> Bounds {
        self.world
    }

    /// Statistics from the last rebuild.
    #[inline]
    pub fn stats(&self) -> RebuildStats {
        self.stats
    }

    /// Map a world position to its grid cell. Positions outside the world
    /// (including NaN) are clamped to the nearest border cell.
    #[inline]
    pub fn cell_for(&self, x: f32, y: f32) -> GridCoord {
        GridCoord {
            row: Self::axis_cell(y, self.cell_size, self.rows),
            col: Self::axis_cell(x, self.cell_size, self.cols),
        }
    }

    #[inline]
    fn axis_cell(v: f32, cell_size: f32, count: usize) -> usize {
        // `as i64` saturates and maps NaN to 0.
        let cell = (v / cell_size).floor() as i64;
        cell.clamp(0, count as i64 - 1) as usize
    }

    /// World rectangle covered by one cell.
    pub fn cell_bounds(&self, coord: GridCoord) -> Bounds {
        let min_x = coord.col as f32 * self.cell_size;
        let min_y = coord.row as f32 * self.cell_size;
        Bounds::new(
            min_x,
            min_y,
            (min_x + self.cell_size).min(self.world.max_x),
            (min_y + self.cell_size).min(self.world.max_y),
        )
    }

    #[inline]
    fn flat_index(&self, coord: GridCoord) -> usize {
        coord.row * self.cols + coord.col
    }

    /// Clear every cell and re-insert all entities from this tick's lists.
    #[inline(never)]
    pub fn rebuild(&mut self, food: &[Food], viruses: &[Virus], mass: &[EjectedMass], players: &[Player]) {
        // Clear without releasing capacity.
        for cell in &mut self.cells {
            cell.clear();
        }
        self.stats = RebuildStats::default();

        self.insert_all(food);
        self.insert_all(viruses);
        self.insert_all(mass);
        self.insert_all(players);

        trace!(
            "Rebuilt partition: {} food, {} viruses, {} mass, {} players ({} player entries)",
            self.stats.entities(EntityKind::Food),
            self.stats.entities(EntityKind::Virus),
            self.stats.entities(EntityKind::Mass),
            self.stats.entities(EntityKind::Player),
            self.stats.entries(EntityKind::Player),
        );
        if self.stats.clamped > 0 {
            debug!("{} entity positions outside the world were clamped to the border", self.stats.clamped);
        }
    }

    fn insert_all<T: Spatial>(&mut self, list: &[T]) {
        let kind = T::KIND as usize;
        self.stats.entities[kind] = list.len();

        for (index, entity) in list.iter().enumerate() {
            for point in entity.points() {
                self.insert_point(kind, index, point);
            }
        }
    }

    #[inline]
    fn insert_point(&mut self, kind: usize, index: usize, point: Vec2) {
        if !self.world.contains(point) {
            self.stats.clamped += 1;
        }
        let cell = self.flat_index(self.cell_for(point.x, point.y));
        self.cells[cell].buckets[kind].push(index);
        self.stats.entries[kind] += 1;
    }

    /// Inclusive range of cells a rectangle touches, clamped to the grid.
    #[inline]
    pub fn cell_range(&self, bound: &Bounds) -> (GridCoord, GridCoord) {
        let bound = bound.normalized();
        (
            self.cell_for(bound.min_x, bound.min_y),
            self.cell_for(bound.max_x, bound.max_y),
        )
    }

    /// Indices of every entity indexed in the cells intersecting the
    /// rectangle, deduplicated per category.
    pub fn query(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> QueryResult {
        self.query_bounds(&Bounds::new(min_x, min_y, max_x, max_y))
    }

    pub fn query_bounds(&self, bound: &Bounds) -> QueryResult {
        let mut result = QueryResult::new();
        self.query_into(bound, &mut result);
        result
    }

    /// Like [`query_bounds`](Self::query_bounds) but writes into a reusable
    /// result. Previous contents are discarded.
    pub fn query_into(&self, bound: &Bounds, result: &mut QueryResult) {
        result.clear();
        for (seen, &len) in result.seen.iter_mut().zip(&self.stats.entities) {
            seen.grow(len);
        }

        let (lo, hi) = self.cell_range(bound);
        for row in lo.row..=hi.row {
            let row_start = row * self.cols;
            for cell in &self.cells[row_start + lo.col..=row_start + hi.col] {
                for (kind, bucket) in cell.buckets.iter().enumerate() {
                    let seen = &mut result.seen[kind];
                    let out = &mut result.indices[kind];
                    for &index in bucket {
                        if !seen.put(index) {
                            out.push(index);
                        }
                    }
                }
            }
        }

        // Reset only the bits we set so the next query starts clean in O(k).
        for (seen, out) in result.seen.iter_mut().zip(&result.indices) {
            for &index in out {
                seen.set(index, false);
            }
        }
    }
}

impl std::fmt::Debug for PartitionIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartitionIndex")
            .field("world", &self.world)
            .field("cell_size", &self.cell_size)
            .field("cols", &self.cols)
            .field("rows", &self.rows)
            .field("stats", &self.stats)
            .finish()
    }
}
