//! ECS Components module
//!
//! Data components the core systems read and write.

pub mod movement;
pub mod collision;
pub mod input;

pub use movement::{Position, Velocity};
pub use collision::{Collider, CollisionEvent, CollisionType};
pub use input::InputComponent;
