//! # Game Configuration
//!
//! Dimensions of the playable area and render surface plus a few loop
//! tuning knobs. Loadable from TOML or RON through [`Config`].

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use crate::config::{Config, ConfigError};
use crate::spatial::DEFAULT_CELL_SIZE;

/// Playable area in world space; `origin_x`/`origin_y` is the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    /// Horizontal extent
    pub width: f32,
    /// Vertical extent
    pub height: f32,
    /// Left edge
    pub origin_x: f32,
    /// Top edge
    pub origin_y: f32,
}

impl WorldBounds {
    /// Bounds anchored at the origin
    pub const fn new(width: f32, height: f32) -> Self {
        Self::with_origin(width, height, 0.0, 0.0)
    }

    /// Bounds anchored at an arbitrary top-left corner
    pub const fn with_origin(width: f32, height: f32, origin_x: f32, origin_y: f32) -> Self {
        Self { width, height, origin_x, origin_y }
    }

    /// Left edge
    pub fn left(&self) -> f32 {
        self.origin_x
    }

    /// Top edge
    pub fn top(&self) -> f32 {
        self.origin_y
    }

    /// Right edge
    pub fn right(&self) -> f32 {
        self.origin_x + self.width
    }

    /// Bottom edge
    pub fn bottom(&self) -> f32 {
        self.origin_y + self.height
    }
}

/// # Game Configuration
///
/// ```
/// use kollider_engine::core::GameConfig;
///
/// let config = GameConfig { width: 1280, height: 720, ..GameConfig::default() };
/// assert_eq!(config.world_bounds().right(), 1280.0);
/// assert_eq!(config.render_width(), 1280);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Logical width in pixels
    pub width: u32,
    /// Logical height in pixels
    pub height: u32,
    /// Window or page title
    pub title: String,
    /// Render surface width when it differs from `width`
    pub render_width_override: Option<u32>,
    /// Render surface height when it differs from `height`
    pub render_height_override: Option<u32>,
    /// Cooperative sleep between two frames of the background loop
    pub frame_yield_micros: u64,
    /// Edge length of a broad-phase grid cell
    pub collision_cell_size: f32,
}

impl GameConfig {
    /// Width used by renderers
    pub fn render_width(&self) -> u32 {
        self.render_width_override.unwrap_or(self.width)
    }

    /// Height used by renderers
    pub fn render_height(&self) -> u32 {
        self.render_height_override.unwrap_or(self.height)
    }

    /// Playable area spanning `width` x `height` from the origin
    pub fn world_bounds(&self) -> WorldBounds {
        WorldBounds::new(self.width as f32, self.height as f32)
    }

    /// Sleep between two loop iterations
    pub fn frame_yield(&self) -> Duration {
        Duration::from_micros(self.frame_yield_micros)
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "world dimensions must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.render_width_override == Some(0) || self.render_height_override == Some(0) {
            return Err(ConfigError::Invalid("render overrides must be non-zero".to_string()));
        }
        if !(self.collision_cell_size > 0.0 && self.collision_cell_size.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "collision cell size must be positive, got {}",
                self.collision_cell_size
            )));
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: "Kollider Game".to_string(),
            render_width_override: None,
            render_height_override: None,
            frame_yield_micros: 1_000,
            collision_cell_size: DEFAULT_CELL_SIZE,
        }
    }
}

impl Config for GameConfig {}
