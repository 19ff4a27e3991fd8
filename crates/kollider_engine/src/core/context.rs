//! Services handed to scenes and gameplay code

use super::{GameConfig, KeyValueStorage};
use crate::engine::EngineHandle;
use std::fmt;
use std::sync::Arc;

/// Aggregates the engine services a running game needs
///
/// Cheap to clone. The world itself is not part of the context: scenes reach
/// it through their [`SceneScope`](crate::scene::SceneScope), systems through
/// their `update` argument.
#[derive(Clone)]
pub struct GameContext {
    /// Session configuration
    pub config: Arc<GameConfig>,
    /// Scene stack control
    pub engine: EngineHandle,
    /// Persistent key-value data
    pub storage: Arc<dyn KeyValueStorage>,
}

impl GameContext {
    /// Bundle the services
    pub fn new(config: Arc<GameConfig>, engine: EngineHandle, storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { config, engine, storage }
    }
}

impl fmt::Debug for GameContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameContext")
            .field("config", &self.config)
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

/// Context wired to a stand-alone scene queue and in-memory storage
#[cfg(test)]
pub(crate) fn test_context() -> GameContext {
    GameContext::new(
        Arc::new(GameConfig::default()),
        EngineHandle::detached(),
        Arc::new(super::InMemoryStorage::new()),
    )
}
