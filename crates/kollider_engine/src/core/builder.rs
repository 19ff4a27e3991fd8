//! Game assembly
//!
//! [`GameBuilder`] wires a [`World`] with the default core systems, runs
//! user registrations and hands back an engine with its [`GameContext`]
//! attached:
//!
//! ```
//! use kollider_engine::core::{GameBuilder, GameConfig};
//! use kollider_engine::ecs::components::{Position, Velocity};
//!
//! let engine = GameBuilder::new(GameConfig { title: "Pong".into(), ..GameConfig::default() })
//!     .entity(|world, config| {
//!         world.spawn(|ball| {
//!             ball.add(Position::new(config.width as f32 / 2.0, config.height as f32 / 2.0))
//!                 .add(Velocity::new(120.0, 80.0));
//!         });
//!     })
//!     .build()
//!     .unwrap();
//! assert!(engine.step());
//! ```

use super::{GameConfig, GameContext, InMemoryStorage, KeyValueStorage};
use crate::ecs::systems::{CollisionSystem, PhysicsSystem};
use crate::ecs::{System, World};
use crate::engine::{EngineError, GameEngine};
use crate::foundation::time::{Clock, MonotonicClock};
use std::sync::Arc;

type SystemFactory = Box<dyn FnOnce(&GameConfig, &mut World)>;
type EntityRegistration = Box<dyn FnOnce(&mut World, &GameConfig)>;

/// Fluent builder composing config, world, systems and engine
pub struct GameBuilder {
    config: GameConfig,
    systems: Vec<SystemFactory>,
    entities: Vec<EntityRegistration>,
    storage: Option<Arc<dyn KeyValueStorage>>,
    clock: Option<Box<dyn Clock>>,
}

impl GameBuilder {
    /// Start from a configuration
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            systems: Vec::new(),
            entities: Vec::new(),
            storage: None,
            clock: None,
        }
    }

    /// Register a system built from the final configuration
    ///
    /// Custom systems are added after the core physics and collision systems,
    /// in registration order.
    pub fn system<S, F>(mut self, factory: F) -> Self
    where
        S: System,
        F: FnOnce(&GameConfig) -> S + 'static,
    {
        self.systems.push(Box::new(move |config: &GameConfig, world: &mut World| {
            world.add_system(factory(config));
        }));
        self
    }

    /// Register an entity factory that runs right after the world is created
    pub fn entity(mut self, registration: impl FnOnce(&mut World, &GameConfig) + 'static) -> Self {
        self.entities.push(Box::new(registration));
        self
    }

    /// Persist through `storage` instead of the in-memory default
    pub fn storage(mut self, storage: Arc<dyn KeyValueStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Time frames with `clock` instead of the system monotonic clock
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    /// Configuration the game will be built with
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Create the world and engine and attach the context, without starting
    /// the background loop
    pub fn build(self) -> Result<GameEngine, EngineError> {
        self.config.validate()?;
        let config = Arc::new(self.config);

        let mut world = World::new();
        world.add_system(PhysicsSystem::new());
        world.add_system(CollisionSystem::with_cell_size(config.world_bounds(), config.collision_cell_size));

        for registration in self.entities {
            registration(&mut world, &config);
        }
        for factory in self.systems {
            factory(&config, &mut world);
        }

        let clock = self.clock.unwrap_or_else(|| Box::new(MonotonicClock::new()));
        let mut engine = GameEngine::with_clock(world, clock);
        engine.set_frame_yield(config.frame_yield());

        let storage = self.storage.unwrap_or_else(|| Arc::new(InMemoryStorage::new()));
        log::info!("built '{}' ({}x{})", config.title, config.width, config.height);
        engine.attach_context(GameContext::new(config, engine.handle(), storage));
        Ok(engine)
    }

    /// [`build`](Self::build) and start the background loop
    pub fn launch(self) -> Result<GameEngine, EngineError> {
        let mut engine = self.build()?;
        engine.start()?;
        Ok(engine)
    }
}

impl Default for GameBuilder {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}
