//! Scoped resource ownership for scenes

use crate::core::GameContext;
use crate::ecs::{Entity, EntityMut, System, SystemHandle, SystemId, World};
use crate::engine::EngineHandle;

/// Systems and entities a scene created through its [`SceneScope`]
///
/// Owned by the engine next to the scene and released when the scene exits.
#[derive(Debug, Default)]
pub struct SceneResources {
    systems: Vec<SystemHandle<dyn System>>,
    entities: Vec<Entity>,
}

impl SceneResources {
    /// Entities that will be removed with the scene
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Ids of the systems that will be removed with the scene
    pub fn system_ids(&self) -> impl Iterator<Item = SystemId> + '_ {
        self.systems.iter().map(SystemHandle::id)
    }

    /// Whether nothing is tracked
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty() && self.entities.is_empty()
    }

    /// Queue removal of everything tracked and forget it
    ///
    /// Removals go through the world's deferred path and land at the end of
    /// the next [`World::update`]. Calling this on an empty set is a no-op.
    pub(crate) fn dispose(&mut self, world: &mut World) {
        for system in self.systems.drain(..) {
            world.remove_system(&system);
        }
        for entity in self.entities.drain(..) {
            world.remove_entity(entity);
        }
    }
}

/// Handle given to scene callbacks for creating scene-owned resources
///
/// Everything added through the scope is tracked and removed from the world
/// when the scene exits. Direct [`world`](Self::world) access is untracked;
/// use [`track`](Self::track) to hand such entities over to the scene.
pub struct SceneScope<'a> {
    world: &'a mut World,
    context: &'a GameContext,
    resources: &'a mut SceneResources,
}

impl<'a> SceneScope<'a> {
    pub(crate) fn new(world: &'a mut World, context: &'a GameContext, resources: &'a mut SceneResources) -> Self {
        Self { world, context, resources }
    }

    /// Add a system to the world, owned by this scene
    pub fn add_system<S: System>(&mut self, system: S) -> SystemHandle<S> {
        let handle = self.world.add_system(system);
        self.resources.systems.push(handle.erase());
        handle
    }

    /// Remove a system from the world and stop tracking it
    pub fn remove_system<S: ?Sized>(&mut self, handle: &SystemHandle<S>) {
        let id = handle.id();
        self.resources.systems.retain(|tracked| tracked.id() != id);
        self.world.remove_system(handle);
    }

    /// Create an entity owned by this scene
    pub fn create_entity(&mut self, build: impl FnOnce(&mut EntityMut<'_>)) -> Entity {
        let entity = self.world.spawn(build);
        self.resources.entities.push(entity);
        entity
    }

    /// Make the scene responsible for an entity created elsewhere
    pub fn track(&mut self, entity: Entity) {
        if !self.resources.entities.contains(&entity) {
            self.resources.entities.push(entity);
        }
    }

    /// The world, for reads and untracked changes
    pub fn world(&mut self) -> &mut World {
        self.world
    }

    /// Engine services
    pub fn context(&self) -> &GameContext {
        self.context
    }

    /// Shortcut for `context().engine`
    pub fn engine(&self) -> &EngineHandle {
        &self.context.engine
    }

    /// What this scope currently tracks
    pub fn resources(&self) -> &SceneResources {
        self.resources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::test_context;
    use crate::ecs::components::{Position, Velocity};
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Tracking {
        ticks: Arc<AtomicU32>,
        detached: Arc<AtomicBool>,
    }

    impl System for Tracking {
        fn update(&mut self, _world: &mut World, _delta_time: f32) {
            self.ticks.fetch_add(1, Ordering::SeqCst);
        }

        fn on_detach(&mut self, _world: &mut World) {
            self.detached.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_dispose_removes_tracked_entities_and_systems() {
        let mut world = World::new();
        let context = test_context();
        let mut resources = SceneResources::default();
        let positioned = world.view_of::<(Position,)>();

        let system = Tracking::default();
        let (ticks, detached) = (system.ticks.clone(), system.detached.clone());
        let handle = {
            let mut scope = SceneScope::new(&mut world, &context, &mut resources);
            scope.create_entity(|e| {
                e.add(Position::new(1.0, 2.0));
            });
            scope.add_system(system)
        };
        assert_eq!(world.entity_view(positioned).len(), 1);

        resources.dispose(&mut world);
        assert!(resources.is_empty());
        world.update(0.0);

        assert!(detached.load(Ordering::SeqCst));
        assert!(!world.has_system(handle.id()));
        assert!(world.entity_view(positioned).is_empty());

        let ticks_after_flush = ticks.load(Ordering::SeqCst);
        world.update(0.0);
        assert_eq!(ticks.load(Ordering::SeqCst), ticks_after_flush);
    }

    #[test]
    fn test_untracked_entities_survive_dispose() {
        let mut world = World::new();
        let context = test_context();
        let mut resources = SceneResources::default();

        let outsider = world.spawn(|e| {
            e.add(Velocity::new(1.0, 0.0));
        });
        let adopted = world.create_entity();
        {
            let mut scope = SceneScope::new(&mut world, &context, &mut resources);
            scope.track(adopted);
            scope.track(adopted);
        }
        assert_eq!(resources.entities(), &[adopted]);

        resources.dispose(&mut world);
        world.update(0.0);
        assert!(world.contains(outsider));
        assert!(!world.contains(adopted));
    }

    #[test]
    fn test_removed_system_is_no_longer_tracked() {
        let mut world = World::new();
        let context = test_context();
        let mut resources = SceneResources::default();

        let mut scope = SceneScope::new(&mut world, &context, &mut resources);
        let handle = scope.add_system(Tracking::default());
        scope.remove_system(&handle);
        assert_eq!(scope.resources().system_ids().count(), 0);

        world.update(0.0);
        assert!(!world.has_system(handle.id()));
        assert!(!handle.is_attached());
    }

    #[test]
    fn test_dispose_twice_is_noop() {
        let mut world = World::new();
        let mut resources = SceneResources::default();
        resources.dispose(&mut world);
        resources.dispose(&mut world);
        world.update(0.0);
        assert_eq!(world.entity_count(), 0);
    }
}
