//! Scene management
//!
//! A scene is a stacked gameplay or UI state. The [`GameEngine`](crate::GameEngine)
//! keeps the stack and drives each scene's lifecycle; the scene creates its
//! entities and systems through a [`SceneScope`] so they are released when
//! it leaves the stack.
//!
//! ```text
//! push ──> on_enter ──> on_update (every frame while on top) ──> on_exit ──> scope disposed
//! ```

mod scene;
mod scope;

pub use scene::Scene;
pub use scope::{SceneResources, SceneScope};
