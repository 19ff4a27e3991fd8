//! Built-in ECS systems

pub mod physics_system;
pub mod collision_system;

pub use physics_system::PhysicsSystem;
pub use collision_system::CollisionSystem;
