//! Entity implementation
//!
//! An [`Entity`] is only an identifier. Its components live in the
//! [`World`], which is reached through the borrowing accessors [`EntityRef`]
//! and [`EntityMut`]. Because `EntityMut` holds the world mutably, adding or
//! removing a component updates every cached view before the call returns.

use super::{Component, ComponentType, World};
use std::fmt;

/// Entity identifier
///
/// Ids come from a per-world counter and are never reused within that
/// world's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    id: u64,
}

impl Entity {
    /// Create a new entity with the given ID
    pub(crate) fn new(id: u64) -> Self {
        Self { id }
    }

    /// Get the entity ID
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity {}", self.id)
    }
}

/// Read-only access to one live entity
#[derive(Clone, Copy)]
pub struct EntityRef<'w> {
    world: &'w World,
    entity: Entity,
}

impl<'w> EntityRef<'w> {
    pub(super) fn new(world: &'w World, entity: Entity) -> Self {
        Self { world, entity }
    }

    /// The entity this accessor points at
    pub fn id(&self) -> Entity {
        self.entity
    }

    /// Component of type `T`, if present
    pub fn get<T: Component>(&self) -> Option<&'w T> {
        self.world.get::<T>(self.entity)
    }

    /// Component of type `T`; panics when missing
    pub fn require<T: Component>(&self) -> &'w T {
        self.get::<T>().unwrap_or_else(|| missing_component::<T>(self.entity))
    }

    /// Whether a component of type `T` is attached
    pub fn has<T: Component>(&self) -> bool {
        self.world.has_component_type(self.entity, ComponentType::of::<T>())
    }

    /// Whether a component with the given tag is attached
    pub fn has_type(&self, component_type: ComponentType) -> bool {
        self.world.has_component_type(self.entity, component_type)
    }
}

/// Mutable access to one live entity
///
/// ```
/// use kollider_engine::ecs::World;
/// use kollider_engine::ecs::components::{Position, Velocity};
///
/// let mut world = World::new();
/// let player = world.create_entity();
/// world
///     .entity_mut(player)
///     .add(Position::new(10.0, 20.0))
///     .add(Velocity::new(0.0, 0.0));
/// assert!(world.entity(player).has::<Velocity>());
/// ```
pub struct EntityMut<'w> {
    world: &'w mut World,
    entity: Entity,
}

impl<'w> EntityMut<'w> {
    pub(super) fn new(world: &'w mut World, entity: Entity) -> Self {
        Self { world, entity }
    }

    /// The entity this accessor points at
    pub fn id(&self) -> Entity {
        self.entity
    }

    /// Attach `component`, replacing any existing component of the same type
    pub fn add<T: Component>(&mut self, component: T) -> &mut Self {
        self.world.add_component(self.entity, component);
        self
    }

    /// Component of type `T`, if present
    pub fn get<T: Component>(&self) -> Option<&T> {
        self.world.get::<T>(self.entity)
    }

    /// Mutable component of type `T`, if present
    pub fn get_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.world.get_mut::<T>(self.entity)
    }

    /// Component of type `T`; panics when missing
    pub fn require<T: Component>(&self) -> &T {
        let entity = self.entity;
        self.get::<T>().unwrap_or_else(|| missing_component::<T>(entity))
    }

    /// Mutable component of type `T`; panics when missing
    pub fn require_mut<T: Component>(&mut self) -> &mut T {
        let entity = self.entity;
        self.get_mut::<T>().unwrap_or_else(|| missing_component::<T>(entity))
    }

    /// Detach the component of type `T`. No-op when absent.
    pub fn remove<T: Component>(&mut self) -> Option<T> {
        self.world.remove_component::<T>(self.entity)
    }

    /// Whether a component of type `T` is attached
    pub fn has<T: Component>(&self) -> bool {
        self.world.has_component_type(self.entity, ComponentType::of::<T>())
    }

    /// Whether a component with the given tag is attached
    pub fn has_type(&self, component_type: ComponentType) -> bool {
        self.world.has_component_type(self.entity, component_type)
    }

    /// The world the entity lives in
    pub fn world(&mut self) -> &mut World {
        self.world
    }
}

#[cold]
#[track_caller]
pub(super) fn missing_component<T: Component>(entity: Entity) -> ! {
    panic!(
        "{entity} is missing {}",
        ComponentType::of::<T>().short_name()
    )
}
