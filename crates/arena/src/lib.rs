//! Arena visibility engine.
//!
//! Each tick the simulation rebuilds a [`PartitionIndex`] from its entity
//! lists, then resolves one [`VisibleSet`] per connected player. Indices
//! handed out by the partition are only valid until the next rebuild.

pub mod config;
pub mod entity;
pub mod error;
pub mod spatial;
pub mod visibility;
pub mod world;

// Re-export commonly used types
pub use config::Config;
pub use error::ArenaError;
pub use spatial::{Bounds, GridCoord, PartitionIndex, QueryResult, RebuildStats};
pub use visibility::{
    visible_set_for, view_window, EntityLists, ViewDelta, ViewTracker, VisibilityResolver, VisibleSet,
};
pub use world::World;
