//! Spatial indexing.
//!
//! A uniform grid rebuilt from scratch every tick. Insertion is O(1) per
//! entity point and a range query touches only the cells under the window.

mod bounds;
mod grid;

pub use bounds::Bounds;
pub use grid::{GridCoord, MAX_GRID_CELLS, PartitionIndex, QueryResult, RebuildStats};
