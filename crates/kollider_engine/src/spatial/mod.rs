//! Spatial partitioning data structures
//!
//! Provides broad-phase spatial indexing for 2D collision detection.

mod uniform_grid;

pub use uniform_grid::{aabb_intersects, UniformGrid, DEFAULT_CELL_SIZE};
