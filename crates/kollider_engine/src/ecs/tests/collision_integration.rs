//! Integration tests for the physics and collision pipeline
//!
//! Broad phase pruning, event directionality and per-frame event lifetime.

use crate::core::WorldBounds;
use crate::ecs::components::{Collider, CollisionEvent, CollisionType, Position, Velocity};
use crate::ecs::systems::{CollisionSystem, PhysicsSystem};
use crate::ecs::{Entity, World};
use crate::spatial::UniformGrid;

#[cfg(test)]
mod tests {
    use super::*;

    fn arena() -> World {
        let mut world = World::new();
        world.add_system(PhysicsSystem::new());
        world.add_system(CollisionSystem::new(WorldBounds::new(1000.0, 1000.0)));
        world
    }

    fn spawn(world: &mut World, x: f32, y: f32, size: f32) -> Entity {
        world.spawn(|e| {
            e.add(Position::new(x, y)).add(Collider::new(size, size));
        })
    }

    fn entity_events(collider: &Collider) -> Vec<Entity> {
        collider
            .collisions
            .iter()
            .filter(|event| event.kind == CollisionType::Entity)
            .filter_map(|event| event.other)
            .collect()
    }

    #[test]
    fn test_spread_out_entities_produce_no_pairs() {
        let mut world = World::new();
        let mut grid = UniformGrid::new(64.0);
        for i in 0..20u8 {
            let e = world.create_entity();
            grid.insert(e, f32::from(i) * 200.0 + 10.0, f32::from(i % 4) * 300.0 + 10.0, 8.0, 8.0);
        }

        let mut pairs = 0;
        grid.for_each_potential_pair(|_, _| pairs += 1);
        assert_eq!(pairs, 0);
    }

    #[test]
    fn test_overlapping_entities_share_a_bucket() {
        let mut world = World::new();
        let mut grid = UniformGrid::new(64.0);
        let a = world.create_entity();
        let b = world.create_entity();
        grid.insert(a, 60.0, 60.0, 10.0, 10.0);
        grid.insert(b, 65.0, 65.0, 10.0, 10.0);

        let mut seen = Vec::new();
        grid.for_each_potential_pair(|x, y| seen.push((x, y)));
        assert!(!seen.is_empty());
        assert!(seen.iter().all(|&(x, y)| (x, y) == (a, b) || (x, y) == (b, a)));
    }

    #[test]
    fn test_overlap_inside_one_cell_records_exactly_one_event_each() {
        let mut world = arena();
        let a = spawn(&mut world, 10.0, 10.0, 10.0);
        let b = spawn(&mut world, 15.0, 15.0, 10.0);

        world.update(0.016);

        assert_eq!(entity_events(world.require::<Collider>(a)), vec![b]);
        assert_eq!(entity_events(world.require::<Collider>(b)), vec![a]);
    }

    #[test]
    fn test_overlap_across_cells_is_detected() {
        let mut world = arena();
        let a = spawn(&mut world, 50.0, 50.0, 40.0);
        let b = spawn(&mut world, 70.0, 70.0, 40.0);

        world.update(0.016);

        assert!(world.require::<Collider>(a).touched(b));
        assert!(world.require::<Collider>(b).touched(a));
    }

    #[test]
    fn test_events_live_for_one_frame() {
        let mut world = arena();
        let a = spawn(&mut world, 100.0, 100.0, 20.0);
        let b = world.spawn(|e| {
            e.add(Position::new(110.0, 100.0))
                .add(Velocity::new(1000.0, 0.0))
                .add(Collider::new(20.0, 20.0));
        });

        world.update(0.0);
        assert!(world.require::<Collider>(a).touched(b));

        world.update(0.5);
        assert!(world.require::<Collider>(a).collisions.is_empty());
        assert!(world.require::<Collider>(b).collisions.is_empty());
    }

    #[test]
    fn test_drained_events_are_not_replayed() {
        let mut world = arena();
        let a = spawn(&mut world, 100.0, 100.0, 20.0);
        let b = spawn(&mut world, 105.0, 100.0, 20.0);

        world.update(0.016);
        let drained = world.require_mut::<Collider>(a).drain_events();
        assert!(drained.contains(&CollisionEvent::entity(b)));
        assert!(world.require::<Collider>(a).collisions.is_empty());

        world.update(0.016);
        assert!(world.require::<Collider>(a).touched(b));
    }

    #[test]
    fn test_removed_entity_stops_colliding_after_flush() {
        let mut world = arena();
        let a = spawn(&mut world, 100.0, 100.0, 20.0);
        let b = spawn(&mut world, 105.0, 100.0, 20.0);

        world.remove_entity(b);
        world.update(0.016);
        assert!(world.require::<Collider>(a).touched(b));

        world.update(0.016);
        assert!(world.require::<Collider>(a).collisions.is_empty());
    }

    #[test]
    fn test_leaving_through_a_corner() {
        let mut world = arena();
        let ball = world.spawn(|e| {
            e.add(Position::new(990.0, 5.0))
                .add(Velocity::new(100.0, -100.0))
                .add(Collider::new(8.0, 8.0));
        });

        world.update(0.1);

        let collider = world.require::<Collider>(ball);
        assert!(collider.has_boundary(CollisionType::BoundaryRight));
        assert!(collider.has_boundary(CollisionType::BoundaryTop));
        assert_eq!(collider.collisions.iter().filter(|event| event.kind.is_boundary()).count(), 2);
    }
}
