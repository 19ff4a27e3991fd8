//! # Kollider Engine
//!
//! A lightweight 2D game engine core: an entity-component-system with live
//! cached views, a scene stack driven by a frame loop, and uniform-grid
//! collision detection. Rendering, input and persistence backends are
//! supplied by the host as systems and trait implementations.
//!
//! ## Features
//!
//! - **ECS**: type-indexed components, cached views kept in sync on every
//!   add/remove, deferred entity and system removal
//! - **Scenes**: push/pop/replace/clear queued from anywhere and applied once
//!   per frame; scene-owned entities and systems are cleaned up on exit
//! - **Collision**: uniform grid broad phase, exact AABB narrow phase and
//!   world boundary events
//! - **Config**: TOML or RON game configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kollider_engine::prelude::*;
//!
//! struct Title;
//!
//! impl Scene for Title {
//!     fn on_enter(&mut self, scope: &mut SceneScope<'_>) {
//!         scope.create_entity(|logo| {
//!             logo.add(Position::new(100.0, 80.0)).add(Velocity::new(40.0, 0.0));
//!         });
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     kollider_engine::foundation::logging::init();
//!
//!     let mut engine = GameBuilder::new(GameConfig::default()).launch()?;
//!     engine.push_scene(Title);
//!     std::thread::sleep(std::time::Duration::from_secs(1));
//!     engine.stop();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod core;

pub mod foundation;
pub mod config;
pub mod ecs;
pub mod spatial;
pub mod scene;

mod engine;

pub use engine::{EngineError, EngineHandle, GameEngine, SceneId, DEFAULT_FRAME_YIELD};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        EngineError, EngineHandle, GameEngine, SceneId,
        core::{Config, GameBuilder, GameConfig, GameContext, InMemoryStorage, KeyValueStorage, WorldBounds},
        ecs::{Component, Entity, EntityMut, EntityRef, System, SystemHandle, World},
        ecs::components::{Collider, CollisionEvent, CollisionType, InputComponent, Position, Velocity},
        ecs::systems::{CollisionSystem, PhysicsSystem},
        foundation::math::{Aabb, Vec2},
        foundation::time::{Clock, ManualClock, MonotonicClock},
        scene::{Scene, SceneScope},
    };
}
