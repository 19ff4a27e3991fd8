//! ECS collision system
//!
//! Each frame:
//! 1. wipe the event list of every collidable (`Position` + `Collider`),
//! 2. rebuild the uniform grid from current boxes,
//! 3. run the exact AABB test on every potential pair and record an
//!    [`CollisionType::Entity`] event on both sides,
//! 4. test each box against the world bounds, one event per crossed edge.
//!
//! The grid may report the same pair once per shared cell, in which case the
//! same event is recorded more than once for that frame.

use crate::core::WorldBounds;
use crate::ecs::components::{Collider, CollisionEvent, CollisionType, Position};
use crate::ecs::{Entity, System, ViewId, World};
use crate::foundation::math::Aabb;
use crate::spatial::{UniformGrid, DEFAULT_CELL_SIZE};

/// Broad-phase grid plus narrow-phase AABB collision detection
#[derive(Debug)]
pub struct CollisionSystem {
    world_bounds: WorldBounds,
    grid: UniformGrid,
    collidable_view: Option<ViewId>,
}

impl CollisionSystem {
    /// Create a collision system for the given playable area
    pub fn new(world_bounds: WorldBounds) -> Self {
        Self::with_cell_size(world_bounds, DEFAULT_CELL_SIZE)
    }

    /// Create a collision system with a custom grid cell size
    pub fn with_cell_size(world_bounds: WorldBounds, cell_size: f32) -> Self {
        Self {
            world_bounds,
            grid: UniformGrid::new(cell_size),
            collidable_view: None,
        }
    }

    /// The playable area boundary events are measured against
    pub fn world_bounds(&self) -> WorldBounds {
        self.world_bounds
    }

    /// Change the playable area, e.g. after a resize
    pub fn set_world_bounds(&mut self, world_bounds: WorldBounds) {
        self.world_bounds = world_bounds;
    }

    fn bounds_of(world: &World, entity: Entity) -> Option<Aabb> {
        let position = world.get::<Position>(entity)?;
        let collider = world.get::<Collider>(entity)?;
        Some(collider.bounds_at(position.x, position.y))
    }

    fn record(world: &mut World, entity: Entity, event: CollisionEvent) {
        if let Some(collider) = world.get_mut::<Collider>(entity) {
            collider.collisions.push(event);
        }
    }

    fn boundary_events(&self, bounds: &Aabb) -> impl Iterator<Item = CollisionEvent> {
        let edges = [
            (bounds.left() < self.world_bounds.left(), CollisionType::BoundaryLeft),
            (bounds.right() > self.world_bounds.right(), CollisionType::BoundaryRight),
            (bounds.top() < self.world_bounds.top(), CollisionType::BoundaryTop),
            (bounds.bottom() > self.world_bounds.bottom(), CollisionType::BoundaryBottom),
        ];
        edges
            .into_iter()
            .filter_map(|(crossed, kind)| crossed.then(|| CollisionEvent::boundary(kind)))
    }
}

impl System for CollisionSystem {
    fn on_attach(&mut self, world: &mut World) {
        self.collidable_view = Some(world.view_of::<(Position, Collider)>());
    }

    fn on_detach(&mut self, _world: &mut World) {
        self.collidable_view = None;
    }

    fn dispose(&mut self) {
        self.grid.clear();
    }

    fn update(&mut self, world: &mut World, _delta_time: f32) {
        let view = self.collidable_view.expect("CollisionSystem updated before attach");
        let collidables = world.entity_view(view).to_vec();

        for &entity in &collidables {
            if let Some(collider) = world.get_mut::<Collider>(entity) {
                collider.collisions.clear();
            }
        }

        self.grid.clear();
        for &entity in &collidables {
            if let Some(bounds) = Self::bounds_of(world, entity) {
                self.grid.insert_aabb(entity, bounds);
            }
        }

        self.grid.for_each_potential_pair(|a, b| {
            let (Some(box_a), Some(box_b)) = (Self::bounds_of(world, a), Self::bounds_of(world, b)) else {
                return;
            };
            if box_a.intersects(&box_b) {
                Self::record(world, a, CollisionEvent::entity(b));
                Self::record(world, b, CollisionEvent::entity(a));
            }
        });

        for &entity in &collidables {
            let Some(bounds) = Self::bounds_of(world, entity) else {
                continue;
            };
            for event in self.boundary_events(&bounds) {
                Self::record(world, entity, event);
            }
        }
    }
}
