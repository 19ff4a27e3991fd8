//! Entity-Component-System implementation
//!
//! Dynamic, type-indexed component storage with live cached views and
//! deferred removal.

pub mod world;
pub mod entity;
pub mod component;
pub mod system;
pub mod view;
pub mod components;
pub mod systems;

#[cfg(test)]
mod tests;

pub use world::World;
pub use entity::{Entity, EntityMut, EntityRef};
pub use component::{Component, ComponentSet, ComponentType};
pub use system::{System, SystemHandle, SystemId, WorldId};
pub use view::{EntityView, ViewId};
