//! Velocity integration

use crate::ecs::components::{Position, Velocity};
use crate::ecs::{System, ViewId, World};

/// Applies [`Velocity`] to [`Position`] every frame (semi-implicit Euler)
///
/// Add it before the [`CollisionSystem`](super::CollisionSystem) so collision
/// sees this frame's positions.
#[derive(Debug, Default)]
pub struct PhysicsSystem {
    dynamic_view: Option<ViewId>,
}

impl PhysicsSystem {
    /// Create a detached physics system
    pub fn new() -> Self {
        Self::default()
    }
}

impl System for PhysicsSystem {
    fn on_attach(&mut self, world: &mut World) {
        self.dynamic_view = Some(world.view_of::<(Position, Velocity)>());
    }

    fn on_detach(&mut self, _world: &mut World) {
        self.dynamic_view = None;
    }

    fn update(&mut self, world: &mut World, delta_time: f32) {
        let view = self.dynamic_view.expect("PhysicsSystem updated before attach");

        for entity in world.entity_view(view).to_vec() {
            let Some(&velocity) = world.get::<Velocity>(entity) else {
                continue;
            };
            if let Some(position) = world.get_mut::<Position>(entity) {
                position.x += velocity.vx * delta_time;
                position.y += velocity.vy * delta_time;
            }
        }
    }
}
