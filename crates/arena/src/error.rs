//! Error types for the visibility engine.

use thiserror::Error;

/// Errors raised while constructing the engine.
///
/// Everything past construction (rebuild, query, resolve) is infallible.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ArenaError {
    #[error("Invalid configuration: world {width}x{height}, cell size {cell_size} (all must be positive and yield a bounded grid)")]
    InvalidConfiguration {
        width: f32,
        height: f32,
        cell_size: f32,
    },
}
