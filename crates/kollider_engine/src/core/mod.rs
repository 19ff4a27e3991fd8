//! # Core Game Module
//!
//! Session-level pieces that sit between the ECS and a running game:
//!
//! - **Config**: window/world dimensions and loop tuning
//! - **Context**: services handed to scenes (config, engine handle, storage)
//! - **Storage**: small key-value persistence abstraction
//! - **Builder**: assembles world, default systems and engine in one go

pub mod config;
pub mod context;
pub mod storage;
pub mod builder;

pub use config::{GameConfig, WorldBounds};
pub use context::GameContext;
pub use storage::{InMemoryStorage, KeyValueStorage};
pub use builder::GameBuilder;
pub use crate::config::{Config, ConfigError};
