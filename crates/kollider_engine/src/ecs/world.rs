//! ECS World implementation
//!
//! The world owns entities and their components, the attached systems and the
//! cache of [`EntityView`]s. Entity and system removals are deferred to a
//! fixed point at the end of [`World::update`] so systems can iterate freely
//! while requesting them.

use super::component::ComponentMap;
use super::entity::{missing_component, EntityMut, EntityRef};
use super::system::WorldId;
use super::{Component, ComponentSet, ComponentType, Entity, EntityView, System, SystemHandle, SystemId, ViewId};
use slotmap::SlotMap;
use std::collections::HashMap;

/// ECS World containing all entities, components and systems
pub struct World {
    id: WorldId,
    next_entity_id: u64,
    entities: Vec<Entity>,
    components: HashMap<Entity, ComponentMap>,
    systems: Vec<SystemHandle<dyn System>>,
    views: SlotMap<ViewId, EntityView>,
    view_cache: HashMap<Vec<ComponentType>, ViewId>,
    pending_entity_removals: Vec<Entity>,
    pending_system_removals: Vec<SystemId>,
    deferred_hooks: Vec<(SystemId, Hook)>,
    paused: bool,
    updating: bool,
    disposed: bool,
}

impl World {
    /// Create a new world
    pub fn new() -> Self {
        Self {
            id: WorldId::next(),
            next_entity_id: 0,
            entities: Vec::new(),
            components: HashMap::new(),
            systems: Vec::new(),
            views: SlotMap::with_key(),
            view_cache: HashMap::new(),
            pending_entity_removals: Vec::new(),
            pending_system_removals: Vec::new(),
            deferred_hooks: Vec::new(),
            paused: false,
            updating: false,
            disposed: false,
        }
    }

    /// Identifier of this world
    pub fn id(&self) -> WorldId {
        self.id
    }

    // ---------------------------------------------------------------------
    // Entities
    // ---------------------------------------------------------------------

    /// Create a new entity
    pub fn create_entity(&mut self) -> Entity {
        self.assert_alive();
        let entity = Entity::new(self.next_entity_id);
        self.next_entity_id += 1;
        self.entities.push(entity);
        let components = self.components.entry(entity).or_default();

        // Component-less entities never match, checked anyway so no view
        // can miss a member.
        for view in self.views.values_mut() {
            if components.contains_all(view.component_types()) {
                view.insert(entity);
            }
        }
        entity
    }

    /// Create an entity and populate it through `build`
    pub fn spawn(&mut self, build: impl FnOnce(&mut EntityMut<'_>)) -> Entity {
        let entity = self.create_entity();
        build(&mut EntityMut::new(self, entity));
        entity
    }

    /// Request removal of an entity
    ///
    /// The entity stays in the entity list and in every view until the
    /// current (or next) [`update`](Self::update) finishes running systems.
    pub fn remove_entity(&mut self, entity: Entity) {
        if self.contains(entity) {
            self.pending_entity_removals.push(entity);
        }
    }

    /// Whether `entity` belongs to this world (pending removals included)
    pub fn contains(&self, entity: Entity) -> bool {
        self.components.contains_key(&entity)
    }

    /// Whether `entity` has a removal queued
    pub fn is_pending_removal(&self, entity: Entity) -> bool {
        self.pending_entity_removals.contains(&entity)
    }

    /// Live entity list in creation order
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Number of live entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Read access to an entity; panics if it does not exist
    #[track_caller]
    pub fn entity(&self, entity: Entity) -> EntityRef<'_> {
        self.get_entity(entity)
            .unwrap_or_else(|| panic!("{entity} does not exist in {}", self.id))
    }

    /// Read access to an entity, if it exists
    pub fn get_entity(&self, entity: Entity) -> Option<EntityRef<'_>> {
        self.contains(entity).then(|| EntityRef::new(self, entity))
    }

    /// Write access to an entity; panics if it does not exist
    #[track_caller]
    pub fn entity_mut(&mut self, entity: Entity) -> EntityMut<'_> {
        if !self.contains(entity) {
            panic!("{entity} does not exist in {}", self.id);
        }
        EntityMut::new(self, entity)
    }

    /// Write access to an entity, if it exists
    pub fn get_entity_mut(&mut self, entity: Entity) -> Option<EntityMut<'_>> {
        if self.contains(entity) {
            Some(EntityMut::new(self, entity))
        } else {
            None
        }
    }

    // ---------------------------------------------------------------------
    // Components
    // ---------------------------------------------------------------------

    /// Add a component to an entity, replacing one of the same type
    ///
    /// Views are brought up to date before this returns.
    #[track_caller]
    pub fn add_component<T: Component>(&mut self, entity: Entity, mut component: T) -> Option<T> {
        let Some(components) = self.components.get_mut(&entity) else {
            panic!("cannot add {} to {entity}: it does not exist", ComponentType::of::<T>());
        };
        component.on_attach(entity);
        let previous = components.insert(component);
        self.on_component_added(entity, ComponentType::of::<T>());
        previous
    }

    /// Remove a component from an entity
    ///
    /// Returns `None` without touching views when the component is absent.
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Option<T> {
        let removed = self.components.get_mut(&entity)?.remove::<T>()?;
        self.on_component_removed(entity, ComponentType::of::<T>());
        Some(removed)
    }

    /// Get a component from an entity
    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.components.get(&entity)?.get::<T>()
    }

    /// Get a mutable component from an entity
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.components.get_mut(&entity)?.get_mut::<T>()
    }

    /// Get a component that must be present; panics otherwise
    #[track_caller]
    pub fn require<T: Component>(&self, entity: Entity) -> &T {
        self.get::<T>(entity).unwrap_or_else(|| missing_component::<T>(entity))
    }

    /// Mutable variant of [`require`](Self::require)
    #[track_caller]
    pub fn require_mut<T: Component>(&mut self, entity: Entity) -> &mut T {
        self.get_mut::<T>(entity).unwrap_or_else(|| missing_component::<T>(entity))
    }

    /// Check whether an entity has a component of type `T`
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.has_component_type(entity, ComponentType::of::<T>())
    }

    /// Check whether an entity has a component with the given tag
    pub fn has_component_type(&self, entity: Entity, component_type: ComponentType) -> bool {
        self.components
            .get(&entity)
            .is_some_and(|components| components.contains(component_type))
    }

    /// Number of components attached to `entity` (zero for unknown entities)
    pub fn component_count(&self, entity: Entity) -> usize {
        self.components.get(&entity).map_or(0, ComponentMap::len)
    }

    fn on_component_added(&mut self, entity: Entity, component_type: ComponentType) {
        let Some(components) = self.components.get(&entity) else {
            return;
        };
        for view in self.views.values_mut() {
            if view.requires(component_type) && components.contains_all(view.component_types()) {
                view.insert(entity);
            }
        }
    }

    fn on_component_removed(&mut self, entity: Entity, component_type: ComponentType) {
        for view in self.views.values_mut() {
            if view.requires(component_type) {
                view.remove(entity);
            }
        }
    }

    // ---------------------------------------------------------------------
    // Views
    // ---------------------------------------------------------------------

    /// Cached view of every entity carrying all of `types`
    ///
    /// The key is the set of types, so order and duplicates do not matter.
    /// A new view is backfilled from the current entities.
    ///
    /// # Panics
    ///
    /// Panics when `types` is empty.
    #[track_caller]
    pub fn view(&mut self, types: &[ComponentType]) -> ViewId {
        assert!(!types.is_empty(), "at least one component type required");
        self.assert_alive();

        let mut key = types.to_vec();
        key.sort_unstable();
        key.dedup();

        if let Some(&id) = self.view_cache.get(&key) {
            return id;
        }

        let mut view = EntityView::new(key.clone());
        for &entity in &self.entities {
            if self.components.get(&entity).is_some_and(|c| c.contains_all(&key)) {
                view.insert(entity);
            }
        }
        let id = self.views.insert(view);
        self.view_cache.insert(key, id);
        log::trace!("{} cached view {:?}", self.id, self.views[id].component_types());
        id
    }

    /// Typed shorthand for [`view`](Self::view)
    ///
    /// ```
    /// use kollider_engine::ecs::World;
    /// use kollider_engine::ecs::components::{Position, Velocity};
    ///
    /// let mut world = World::new();
    /// let moving = world.view_of::<(Position, Velocity)>();
    /// assert!(world.entity_view(moving).is_empty());
    /// ```
    pub fn view_of<S: ComponentSet>(&mut self) -> ViewId {
        self.view(&S::component_types())
    }

    /// Borrow a cached view
    ///
    /// # Panics
    ///
    /// Panics for ids that do not come from this world (or after dispose).
    #[track_caller]
    pub fn entity_view(&self, id: ViewId) -> &EntityView {
        self.views
            .get(id)
            .unwrap_or_else(|| panic!("unknown view {id:?} in {}", self.id))
    }

    /// Number of distinct cached views
    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    // ---------------------------------------------------------------------
    // Systems
    // ---------------------------------------------------------------------

    /// Add a system and attach it right away
    ///
    /// When called from inside another system's update the new system first
    /// ticks on the next frame, but its views are ready immediately.
    pub fn add_system<S: System>(&mut self, system: S) -> SystemHandle<S> {
        let handle = SystemHandle::new(system);
        self.attach_system(&handle);
        handle
    }

    /// Attach a detached system through an existing handle
    ///
    /// # Panics
    ///
    /// Panics if the system is already attached to a world.
    #[track_caller]
    pub fn attach_system<S: System>(&mut self, handle: &SystemHandle<S>) {
        self.assert_alive();
        handle.bind_world(self.id);
        self.systems.push(handle.erase());
        handle.lock().on_attach(self);
    }

    /// Request removal of a system
    ///
    /// Applied after systems have run: the system is disposed, then detached.
    pub fn remove_system<S: ?Sized>(&mut self, handle: &SystemHandle<S>) {
        self.pending_system_removals.push(handle.id());
    }

    /// Whether a system with `id` is currently attached
    pub fn has_system(&self, id: SystemId) -> bool {
        self.systems.iter().any(|system| system.id() == id)
    }

    /// Number of attached systems
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    // ---------------------------------------------------------------------
    // Frame
    // ---------------------------------------------------------------------

    /// Run one frame
    ///
    /// Systems run in attach order over a snapshot of the system list; paused
    /// worlds only tick systems that opt in via
    /// [`System::runs_while_paused`]. Queued removals are applied afterwards.
    pub fn update(&mut self, delta_time: f32) {
        self.assert_alive();
        let snapshot = self.systems.clone();

        self.updating = true;
        for handle in &snapshot {
            let mut system = handle.lock();
            if !self.paused || system.runs_while_paused() {
                system.update(self, delta_time);
                self.deliver_deferred_hooks(handle.id(), &mut *system);
            }
        }
        self.updating = false;

        self.flush_entity_removals();
        self.flush_system_removals();
    }

    fn flush_entity_removals(&mut self) {
        if self.pending_entity_removals.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.pending_entity_removals);
        log::trace!("{} removing {} entities", self.id, pending.len());

        for entity in &pending {
            if self.components.remove(entity).is_none() {
                continue;
            }
            for view in self.views.values_mut() {
                view.remove(*entity);
            }
        }
        let components = &self.components;
        self.entities.retain(|entity| components.contains_key(entity));
    }

    fn flush_system_removals(&mut self) {
        if self.pending_system_removals.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.pending_system_removals);
        for id in pending {
            let Some(position) = self.systems.iter().position(|system| system.id() == id) else {
                continue;
            };
            let handle = self.systems.remove(position);
            self.release_system(&handle);
        }
    }

    fn release_system(&mut self, handle: &SystemHandle<dyn System>) {
        self.deferred_hooks.retain(|(target, _)| *target != handle.id());
        {
            let mut system = handle.lock();
            log::trace!("{} releasing {}", self.id, system.name());
            system.dispose();
            system.on_detach(self);
        }
        handle.unbind_world();
    }

    /// Tear the world down: dispose and detach every system, drop all views
    /// and entities. Terminal; calling it again does nothing.
    ///
    /// # Panics
    ///
    /// Panics when called from inside a system update.
    pub fn dispose(&mut self) {
        assert!(!self.updating, "{} disposed from inside its own update", self.id);
        if self.disposed {
            return;
        }
        log::debug!("{} disposing {} systems", self.id, self.systems.len());

        let systems = std::mem::take(&mut self.systems);
        for handle in &systems {
            self.release_system(handle);
        }
        self.views.clear();
        self.view_cache.clear();
        self.pending_entity_removals.clear();
        self.pending_system_removals.clear();
        self.deferred_hooks.clear();
        self.entities.clear();
        self.components.clear();
        self.disposed = true;
    }

    /// Whether [`dispose`](Self::dispose) has run
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Forward a surface resize to every system
    pub fn resize(&mut self, width: u32, height: u32) {
        self.broadcast(Hook::Resize { width, height });
    }

    /// Pause the world; only systems that run while paused keep ticking
    pub fn pause(&mut self) {
        self.paused = true;
        self.broadcast(Hook::Pause);
    }

    /// Resume a paused world
    pub fn resume(&mut self) {
        self.paused = false;
        self.broadcast(Hook::Resume);
    }

    /// Whether the world is paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Hooks reach every attached system in order, paused or not. A system
    /// that triggers the broadcast from its own update holds its lock, so its
    /// hook is queued and delivered as soon as that update returns.
    fn broadcast(&mut self, hook: Hook) {
        for handle in &self.systems {
            match handle.try_lock() {
                Some(mut system) => hook.apply(&mut *system),
                None => {
                    log::debug!("{} deferred {hook:?} for busy {}", self.id, handle.id());
                    self.deferred_hooks.push((handle.id(), hook));
                }
            }
        }
    }

    fn deliver_deferred_hooks(&mut self, id: SystemId, system: &mut dyn System) {
        if self.deferred_hooks.is_empty() {
            return;
        }
        let mut remaining = Vec::new();
        for (target, hook) in std::mem::take(&mut self.deferred_hooks) {
            if target == id {
                hook.apply(system);
            } else {
                remaining.push((target, hook));
            }
        }
        self.deferred_hooks = remaining;
    }

    #[track_caller]
    fn assert_alive(&self) {
        assert!(!self.disposed, "{} used after dispose", self.id);
    }
}

/// Broadcast system hook
#[derive(Debug, Clone, Copy)]
enum Hook {
    Resize { width: u32, height: u32 },
    Pause,
    Resume,
}

impl Hook {
    fn apply(self, system: &mut dyn System) {
        match self {
            Self::Resize { width, height } => system.resize(width, height),
            Self::Pause => system.pause(),
            Self::Resume => system.resume(),
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("id", &self.id)
            .field("entities", &self.entities.len())
            .field("systems", &self.systems.len())
            .field("views", &self.views.len())
            .field("paused", &self.paused)
            .finish_non_exhaustive()
    }
}
