//! Component trait, runtime type tags and per-entity storage

use super::Entity;
use std::any::{Any, TypeId};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Marker trait for components
///
/// Components are plain data. At most one component of each concrete type can
/// live on an entity; adding a second one replaces the first.
pub trait Component: Any + Send + Sync {
    /// Called by the world right before the component is stored on `owner`.
    ///
    /// Lets engine components remember their owner without exposing a setter
    /// to gameplay code.
    fn on_attach(&mut self, _owner: Entity) {}
}

/// Runtime tag identifying a concrete component type
///
/// Equality, ordering and hashing only look at the [`TypeId`]; the name is
/// kept for diagnostics.
#[derive(Clone, Copy)]
pub struct ComponentType {
    id: TypeId,
    name: &'static str,
}

impl ComponentType {
    /// Tag for `T`
    pub fn of<T: Component>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Underlying type id
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without its module path
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit("::").next().unwrap_or(self.name)
    }
}

impl PartialEq for ComponentType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ComponentType {}

impl Hash for ComponentType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for ComponentType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ComponentType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// A statically known set of component types, implemented for tuples
///
/// ```
/// use kollider_engine::ecs::components::{Position, Velocity};
/// use kollider_engine::ecs::ComponentSet;
///
/// assert_eq!(<(Position, Velocity)>::component_types().len(), 2);
/// ```
pub trait ComponentSet {
    /// Tags of every member of the set
    fn component_types() -> Vec<ComponentType>;
}

macro_rules! impl_component_set {
    ($($name:ident),+) => {
        impl<$($name: Component),+> ComponentSet for ($($name,)+) {
            fn component_types() -> Vec<ComponentType> {
                vec![$(ComponentType::of::<$name>()),+]
            }
        }
    };
}

impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
impl_component_set!(A, B, C, D, E);
impl_component_set!(A, B, C, D, E, F);

/// Type-indexed component slots of one entity
#[derive(Default)]
pub(crate) struct ComponentMap {
    slots: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl ComponentMap {
    /// Store `component`, returning the previous value of the same type
    pub(crate) fn insert<T: Component>(&mut self, component: T) -> Option<T> {
        self.slots
            .insert(TypeId::of::<T>(), Box::new(component))
            .and_then(|old| old.downcast::<T>().ok())
            .map(|old| *old)
    }

    pub(crate) fn get<T: Component>(&self) -> Option<&T> {
        self.slots
            .get(&TypeId::of::<T>())
            .and_then(|slot| slot.downcast_ref::<T>())
    }

    pub(crate) fn get_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.slots
            .get_mut(&TypeId::of::<T>())
            .and_then(|slot| slot.downcast_mut::<T>())
    }

    pub(crate) fn remove<T: Component>(&mut self) -> Option<T> {
        self.slots
            .remove(&TypeId::of::<T>())
            .and_then(|old| old.downcast::<T>().ok())
            .map(|old| *old)
    }

    pub(crate) fn contains(&self, component_type: ComponentType) -> bool {
        self.slots.contains_key(&component_type.type_id())
    }

    pub(crate) fn contains_all(&self, component_types: &[ComponentType]) -> bool {
        component_types.iter().all(|ty| self.contains(*ty))
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }
}
