//! System trait and implementations
//!
//! A system is a unit of per-frame behaviour. The world owns a shared
//! [`SystemHandle`] to every attached system and drives the lifecycle:
//!
//! ```text
//! Detached --attach_system--> Attached --(deferred) remove_system--> Detached
//!                 on_attach                     dispose, on_detach
//! ```

use super::World;
use parking_lot::{Mutex, MutexGuard};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// System trait for processing entities and components
#[allow(unused_variables)]
pub trait System: Send + 'static {
    /// Run one frame of logic. `world.entities()` is the live entity list.
    fn update(&mut self, world: &mut World, delta_time: f32);

    /// Keep ticking while the world is paused
    fn runs_while_paused(&self) -> bool {
        false
    }

    /// Called once when bound to a world; prepare views here
    fn on_attach(&mut self, world: &mut World) {}

    /// Called once right before being unbound from a world
    fn on_detach(&mut self, world: &mut World) {}

    /// The rendering surface changed size
    fn resize(&mut self, width: u32, height: u32) {}

    /// The world was paused
    fn pause(&mut self) {}

    /// The world was resumed
    fn resume(&mut self) {}

    /// Release owned resources; terminal for the current attach cycle
    fn dispose(&mut self) {}

    /// Human readable name used in logs
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Unique identifier for systems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SystemId(u64);

impl SystemId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "system {}", self.0)
    }
}

/// Identifier of a [`World`] instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorldId(u64);

impl WorldId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "world {}", self.0)
    }
}

struct SystemCell<S: ?Sized> {
    id: SystemId,
    world: Mutex<Option<WorldId>>,
    system: Mutex<S>,
}

/// Shared handle to a system
///
/// The world keeps one clone while the system is attached; callers may keep
/// another to inspect or tweak the system between frames. Locking a handle
/// from inside that same system's `update` would deadlock.
pub struct SystemHandle<S: ?Sized> {
    cell: Arc<SystemCell<S>>,
}

impl<S: System> SystemHandle<S> {
    /// Wrap a detached system
    pub fn new(system: S) -> Self {
        Self {
            cell: Arc::new(SystemCell {
                id: SystemId::next(),
                world: Mutex::new(None),
                system: Mutex::new(system),
            }),
        }
    }

    /// Type-erased clone of this handle
    pub fn erase(&self) -> SystemHandle<dyn System> {
        let cell: Arc<SystemCell<dyn System>> = self.cell.clone();
        SystemHandle { cell }
    }
}

impl<S: ?Sized> SystemHandle<S> {
    /// Identifier of the wrapped system
    pub fn id(&self) -> SystemId {
        self.cell.id
    }

    /// Lock the system for direct access
    pub fn lock(&self) -> MutexGuard<'_, S> {
        self.cell.system.lock()
    }

    /// Lock the system unless someone else holds it
    pub fn try_lock(&self) -> Option<MutexGuard<'_, S>> {
        self.cell.system.try_lock()
    }

    /// World the system is attached to, if any
    pub fn world(&self) -> Option<WorldId> {
        *self.cell.world.lock()
    }

    /// Whether the system is bound to a world
    pub fn is_attached(&self) -> bool {
        self.world().is_some()
    }

    /// World the system is attached to; panics when detached
    #[track_caller]
    pub fn expect_world(&self) -> WorldId {
        self.world()
            .unwrap_or_else(|| panic!("{} accessed its world before being attached", self.cell.id))
    }

    pub(super) fn bind_world(&self, world: WorldId) {
        let mut slot = self.cell.world.lock();
        if let Some(current) = *slot {
            panic!("{} is already attached to {current}", self.cell.id);
        }
        *slot = Some(world);
    }

    pub(super) fn unbind_world(&self) {
        *self.cell.world.lock() = None;
    }
}

impl<S: ?Sized> Clone for SystemHandle<S> {
    fn clone(&self) -> Self {
        Self { cell: Arc::clone(&self.cell) }
    }
}

impl<S: ?Sized> fmt::Debug for SystemHandle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemHandle")
            .field("id", &self.cell.id)
            .field("world", &self.world())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Idle;
    impl System for Idle {
        fn update(&mut self, _world: &mut World, _delta_time: f32) {}
    }

    #[test]
    fn test_handles_get_distinct_ids() {
        let a = SystemHandle::new(Idle);
        let b = SystemHandle::new(Idle);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.erase().id(), a.id());
    }

    #[test]
    fn test_detached_handle_has_no_world() {
        let handle = SystemHandle::new(Idle);
        assert!(!handle.is_attached());
        assert_eq!(handle.world(), None);
    }

    #[test]
    #[should_panic(expected = "accessed its world before being attached")]
    fn test_expect_world_before_attach_panics() {
        SystemHandle::new(Idle).expect_world();
    }

    #[test]
    #[should_panic(expected = "is already attached")]
    fn test_double_bind_panics() {
        let handle = SystemHandle::new(Idle);
        handle.bind_world(WorldId::next());
        handle.bind_world(WorldId::next());
    }

    #[test]
    fn test_default_name_is_type_name() {
        assert!(Idle.name().ends_with("Idle"));
    }
}
