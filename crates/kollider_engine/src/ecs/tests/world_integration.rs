//! Integration tests for world bookkeeping
//!
//! View membership under random mutation, deferred removal, pause handling
//! and the system lifecycle.

use crate::ecs::components::InputComponent;
use crate::ecs::{Component, ComponentType, Entity, System, ViewId, World};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Health(i32);
impl Component for Health {}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Armor(i32);
impl Component for Armor {}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Tag;
impl Component for Tag {}

type Journal = Arc<Mutex<Vec<String>>>;

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_views_consistent(world: &World, views: &[ViewId]) {
        for &id in views {
            let view = world.entity_view(id);
            let mut expected = 0;
            for &entity in world.entities() {
                let matches = view
                    .component_types()
                    .iter()
                    .all(|&component_type| world.has_component_type(entity, component_type));
                assert_eq!(view.contains(entity), matches, "{entity} in view {:?}", view.component_types());
                expected += usize::from(matches);
            }
            assert_eq!(view.len(), expected);
            assert!(view.iter().all(|entity| world.contains(entity)));
        }
    }

    #[test]
    fn test_view_membership_under_random_mutation() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut world = World::new();
        let views = vec![
            world.view_of::<(Health,)>(),
            world.view_of::<(Health, Armor)>(),
            world.view_of::<(Armor, Tag)>(),
            world.view_of::<(Health, Armor, Tag)>(),
        ];
        let mut removed = Vec::new();

        for round in 0..200 {
            for _ in 0..10 {
                let live = world.entities().to_vec();
                let target = (!live.is_empty()).then(|| live[rng.gen_range(0..live.len())]);
                match (rng.gen_range(0..8), target) {
                    (0, _) | (_, None) => {
                        world.create_entity();
                    }
                    (1, Some(e)) => {
                        world.add_component(e, Health(round));
                    }
                    (2, Some(e)) => {
                        world.add_component(e, Armor(round));
                    }
                    (3, Some(e)) => {
                        world.add_component(e, Tag);
                    }
                    (4, Some(e)) => {
                        world.remove_component::<Health>(e);
                    }
                    (5, Some(e)) => {
                        world.remove_component::<Armor>(e);
                    }
                    (6, Some(e)) => {
                        world.remove_component::<Tag>(e);
                    }
                    (_, Some(e)) => {
                        world.remove_entity(e);
                        removed.push(e);
                    }
                }
            }
            world.update(0.016);

            assert_views_consistent(&world, &views);
            for &entity in &removed {
                assert!(!world.contains(entity));
                assert!(views.iter().all(|&id| !world.entity_view(id).contains(entity)));
            }
        }
    }

    #[test]
    fn test_view_keys_ignore_order_and_duplicates() {
        let mut world = World::new();
        let a = world.view_of::<(Health, Armor)>();
        let b = world.view(&[ComponentType::of::<Armor>(), ComponentType::of::<Health>(), ComponentType::of::<Armor>()]);
        assert_eq!(a, b);
        assert_eq!(world.view_count(), 1);
    }

    #[test]
    fn test_new_view_is_backfilled() {
        let mut world = World::new();
        let tank = world.spawn(|e| {
            e.add(Health(10)).add(Armor(5));
        });
        world.spawn(|e| {
            e.add(Health(3));
        });

        let armored = world.view_of::<(Health, Armor)>();
        assert_eq!(world.entity_view(armored).to_vec(), vec![tank]);
        assert_eq!(world.component_count(tank), 2);
        assert_eq!(world.require::<Health>(tank).0 + world.require::<Armor>(tank).0, 15);
    }

    #[test]
    fn test_component_changes_are_visible_in_the_same_frame() {
        let mut world = World::new();
        let tagged = world.view_of::<(Tag,)>();
        let e = world.create_entity();

        world.entity_mut(e).add(Tag);
        assert!(world.entity_view(tagged).contains(e));
        assert_eq!(world.entity_mut(e).remove::<Tag>(), Some(Tag));
        assert!(!world.entity_view(tagged).contains(e));
        assert_eq!(world.entity_mut(e).remove::<Tag>(), None);
    }

    #[test]
    #[should_panic(expected = "at least one component type required")]
    fn test_empty_view_is_a_wiring_bug() {
        World::new().view(&[]);
    }

    #[test]
    #[should_panic(expected = "is missing")]
    fn test_require_missing_component_panics() {
        let mut world = World::new();
        let e = world.create_entity();
        world.require::<Health>(e);
    }

    #[test]
    fn test_input_component_records_owner() {
        let mut world = World::new();
        let player = world.create_entity();
        assert_eq!(InputComponent::new().owner(), None);

        world.add_component(player, InputComponent::new());
        assert_eq!(world.require::<InputComponent>(player).owner(), Some(player));
    }

    struct Reaper {
        victim: Entity,
        watched: ViewId,
        observations: Arc<Mutex<Vec<(bool, bool)>>>,
    }

    impl System for Reaper {
        fn update(&mut self, world: &mut World, _delta_time: f32) {
            world.remove_entity(self.victim);
            let in_list = world.entities().contains(&self.victim);
            let in_view = world.entity_view(self.watched).contains(self.victim);
            self.observations.lock().push((in_list, in_view));
        }
    }

    #[test]
    fn test_removal_during_update_is_deferred() {
        let mut world = World::new();
        let watched = world.view_of::<(Health,)>();
        let victim = world.spawn(|e| {
            e.add(Health(1));
        });
        let observations = Arc::new(Mutex::new(Vec::new()));
        let reaper = world.add_system(Reaper { victim, watched, observations: observations.clone() });

        world.update(0.016);
        assert_eq!(*observations.lock(), vec![(true, true)]);
        assert!(!world.contains(victim));
        assert!(world.entity_view(watched).is_empty());

        world.remove_system(&reaper);
        world.update(0.016);
        assert_eq!(world.system_count(), 0);
    }

    #[test]
    fn test_removal_outside_update_waits_for_next_update() {
        let mut world = World::new();
        let e = world.spawn(|e| {
            e.add(Tag);
        });
        world.remove_entity(e);
        assert!(world.contains(e));
        assert!(world.is_pending_removal(e));

        world.update(0.0);
        assert!(!world.contains(e));
        assert_eq!(world.entity_count(), 0);
    }

    struct Ticker {
        ticks: Arc<AtomicU32>,
        keep_alive: bool,
    }

    impl System for Ticker {
        fn update(&mut self, _world: &mut World, _delta_time: f32) {
            self.ticks.fetch_add(1, Ordering::SeqCst);
        }

        fn runs_while_paused(&self) -> bool {
            self.keep_alive
        }
    }

    #[test]
    fn test_pause_only_freezes_systems_that_do_not_opt_in() {
        let mut world = World::new();
        let normal = Arc::new(AtomicU32::new(0));
        let keep_alive = Arc::new(AtomicU32::new(0));
        world.add_system(Ticker { ticks: normal.clone(), keep_alive: false });
        world.add_system(Ticker { ticks: keep_alive.clone(), keep_alive: true });
        let counts = || (normal.load(Ordering::SeqCst), keep_alive.load(Ordering::SeqCst));

        world.update(0.0);
        assert_eq!(counts(), (1, 1));

        world.pause();
        world.update(0.0);
        assert_eq!(counts(), (1, 2));

        world.resume();
        world.update(0.0);
        assert_eq!(counts(), (2, 3));
    }

    struct Lifecycle {
        journal: Journal,
    }

    impl System for Lifecycle {
        fn update(&mut self, _world: &mut World, _delta_time: f32) {
            self.journal.lock().push("update".into());
        }

        fn on_attach(&mut self, _world: &mut World) {
            self.journal.lock().push("attach".into());
        }

        fn on_detach(&mut self, _world: &mut World) {
            self.journal.lock().push("detach".into());
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.journal.lock().push(format!("resize {width}x{height}"));
        }

        fn pause(&mut self) {
            self.journal.lock().push("pause".into());
        }

        fn resume(&mut self) {
            self.journal.lock().push("resume".into());
        }

        fn dispose(&mut self) {
            self.journal.lock().push("dispose".into());
        }
    }

    #[test]
    fn test_system_lifecycle_order() {
        let journal = Journal::default();
        let mut world = World::new();
        let handle = world.add_system(Lifecycle { journal: journal.clone() });
        assert_eq!(handle.world(), Some(world.id()));

        world.resize(640, 480);
        world.pause();
        world.resume();
        world.update(0.0);
        world.remove_system(&handle);
        assert!(world.has_system(handle.id()));
        world.update(0.0);

        assert!(!world.has_system(handle.id()));
        assert!(!handle.is_attached());
        assert_eq!(
            *journal.lock(),
            ["attach", "resize 640x480", "pause", "resume", "update", "update", "dispose", "detach"]
        );
    }

    #[test]
    fn test_detached_system_can_be_reattached() {
        let journal = Journal::default();
        let mut first = World::new();
        let handle = first.add_system(Lifecycle { journal: journal.clone() });
        first.remove_system(&handle);
        first.update(0.0);

        let mut second = World::new();
        second.attach_system(&handle);
        assert_eq!(handle.world(), Some(second.id()));
    }

    #[test]
    #[should_panic(expected = "is already attached")]
    fn test_attaching_twice_panics() {
        let mut world = World::new();
        let handle = world.add_system(Ticker { ticks: Arc::default(), keep_alive: false });
        World::new().attach_system(&handle);
    }

    struct Spawner {
        spawned: Option<Arc<AtomicU32>>,
    }

    impl System for Spawner {
        fn update(&mut self, world: &mut World, _delta_time: f32) {
            if self.spawned.is_none() {
                let ticks = Arc::new(AtomicU32::new(0));
                world.add_system(Ticker { ticks: ticks.clone(), keep_alive: false });
                self.spawned = Some(ticks);
            }
        }
    }

    #[test]
    fn test_system_added_mid_update_ticks_next_frame() {
        let mut world = World::new();
        let spawner = world.add_system(Spawner { spawned: None });

        world.update(0.0);
        let ticks = spawner.lock().spawned.clone().unwrap();
        assert_eq!(world.system_count(), 2);
        assert_eq!(ticks.load(Ordering::SeqCst), 0);

        world.update(0.0);
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
    }

    struct SelfPauser {
        journal: Journal,
    }

    impl System for SelfPauser {
        fn update(&mut self, world: &mut World, _delta_time: f32) {
            world.pause();
        }

        fn pause(&mut self) {
            self.journal.lock().push("self".into());
        }
    }

    #[test]
    fn test_broadcast_from_update_reaches_the_busy_system_after_its_update() {
        let journal = Journal::default();
        let mut world = World::new();
        world.add_system(SelfPauser { journal: journal.clone() });
        world.add_system(Lifecycle { journal: journal.clone() });

        world.update(0.0);
        assert!(world.is_paused());
        assert_eq!(*journal.lock(), ["attach", "pause", "self"]);
    }

    struct Toggler {
        hooks: Journal,
        in_update: bool,
    }

    impl System for Toggler {
        fn update(&mut self, world: &mut World, _delta_time: f32) {
            self.in_update = true;
            world.pause();
            world.resize(320, 200);
            world.resume();
            self.in_update = false;
        }

        fn resize(&mut self, width: u32, height: u32) {
            assert!(!self.in_update);
            self.hooks.lock().push(format!("resize {width}x{height}"));
        }

        fn pause(&mut self) {
            assert!(!self.in_update);
            self.hooks.lock().push("pause".into());
        }

        fn resume(&mut self) {
            assert!(!self.in_update);
            self.hooks.lock().push("resume".into());
        }
    }

    #[test]
    fn test_deferred_hooks_keep_their_order() {
        let hooks = Journal::default();
        let mut world = World::new();
        world.add_system(Toggler { hooks: hooks.clone(), in_update: false });

        world.update(0.0);
        assert!(!world.is_paused());
        assert_eq!(*hooks.lock(), ["pause", "resize 320x200", "resume"]);

        world.update(0.0);
        assert_eq!(hooks.lock().len(), 6);
    }

    #[test]
    fn test_dispose_releases_every_system_once() {
        let journal = Journal::default();
        let mut world = World::new();
        world.add_system(Lifecycle { journal: journal.clone() });
        world.spawn(|e| {
            e.add(Tag);
        });

        world.dispose();
        world.dispose();
        assert!(world.is_disposed());
        assert_eq!(world.entity_count(), 0);
        assert_eq!(world.system_count(), 0);
        assert_eq!(*journal.lock(), ["attach", "dispose", "detach"]);
    }

    #[test]
    #[should_panic(expected = "used after dispose")]
    fn test_disposed_world_rejects_updates() {
        let mut world = World::new();
        world.dispose();
        world.update(0.0);
    }

    struct Suicidal;

    impl System for Suicidal {
        fn update(&mut self, world: &mut World, _delta_time: f32) {
            world.dispose();
        }
    }

    #[test]
    #[should_panic(expected = "disposed from inside its own update")]
    fn test_dispose_inside_update_panics() {
        let mut world = World::new();
        world.add_system(Suicidal);
        world.update(0.0);
    }
}
