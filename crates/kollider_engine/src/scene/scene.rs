//! Scene trait

use super::SceneScope;

/// A gameplay or UI state managed by the engine's scene stack
///
/// Callbacks run on the frame loop with the world locked for the frame. They
/// may queue further scene operations through
/// [`GameContext::engine`](crate::core::GameContext::engine); those apply at
/// the start of the next frame.
///
/// `on_update` keeps running while the world is paused, so a pause menu can
/// stay responsive over frozen gameplay.
#[allow(unused_variables)]
pub trait Scene: Send + 'static {
    /// The scene became part of the stack
    fn on_enter(&mut self, scope: &mut SceneScope<'_>) {}

    /// The scene is leaving the stack; its scope is disposed right after
    fn on_exit(&mut self, scope: &mut SceneScope<'_>) {}

    /// Once per frame while the scene is on top of the stack
    fn on_update(&mut self, delta_time: f32, scope: &mut SceneScope<'_>) {}

    /// Human readable name used in logs
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
