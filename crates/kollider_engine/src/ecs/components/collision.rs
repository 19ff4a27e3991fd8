//! Collision components for ECS
//!
//! A [`Collider`] is an axis-aligned box anchored at the entity's
//! [`Position`](super::Position). The collision system wipes and refills its
//! event list every frame, so consumers must handle events during the frame
//! they are produced.

use crate::ecs::{Component, Entity};
use crate::foundation::math::Aabb;

/// What a collision event was caused by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionType {
    /// Crossed the top edge of the world bounds
    BoundaryTop,
    /// Crossed the bottom edge of the world bounds
    BoundaryBottom,
    /// Crossed the left edge of the world bounds
    BoundaryLeft,
    /// Crossed the right edge of the world bounds
    BoundaryRight,
    /// Overlapped another collider
    Entity,
}

impl CollisionType {
    /// Whether this is one of the four boundary kinds
    pub fn is_boundary(self) -> bool {
        !matches!(self, Self::Entity)
    }
}

/// Describes a collision detected during the last collision pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionEvent {
    /// Cause of the event
    pub kind: CollisionType,
    /// The other entity for [`CollisionType::Entity`]; `None` for boundaries
    pub other: Option<Entity>,
}

impl CollisionEvent {
    /// Overlap with `other`
    pub fn entity(other: Entity) -> Self {
        Self {
            kind: CollisionType::Entity,
            other: Some(other),
        }
    }

    /// Boundary crossing
    pub fn boundary(kind: CollisionType) -> Self {
        debug_assert!(kind.is_boundary(), "{kind:?} is not a boundary");
        Self { kind, other: None }
    }
}

/// Axis-aligned collision bounds attached to an entity
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Collider {
    /// Box width
    pub width: f32,
    /// Box height
    pub height: f32,
    /// Events recorded by the most recent collision pass
    pub collisions: Vec<CollisionEvent>,
}

impl Collider {
    /// Create a collider with an empty event list
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            collisions: Vec::new(),
        }
    }

    /// Box covered by this collider when anchored at `(x, y)`
    pub fn bounds_at(&self, x: f32, y: f32) -> Aabb {
        Aabb::new(x, y, self.width, self.height)
    }

    /// Take every recorded event, leaving the list empty
    pub fn drain_events(&mut self) -> Vec<CollisionEvent> {
        std::mem::take(&mut self.collisions)
    }

    /// Whether a boundary event of `kind` was recorded
    pub fn has_boundary(&self, kind: CollisionType) -> bool {
        self.collisions.iter().any(|event| event.kind == kind)
    }

    /// Whether an overlap with `other` was recorded
    pub fn touched(&self, other: Entity) -> bool {
        self.collisions
            .iter()
            .any(|event| event.kind == CollisionType::Entity && event.other == Some(other))
    }
}

impl Component for Collider {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_empties_list() {
        let mut collider = Collider::new(4.0, 4.0);
        collider.collisions.push(CollisionEvent::boundary(CollisionType::BoundaryTop));
        let drained = collider.drain_events();
        assert_eq!(drained.len(), 1);
        assert!(collider.collisions.is_empty());
    }

    #[test]
    fn test_queries() {
        let mut collider = Collider::new(4.0, 4.0);
        collider.collisions.push(CollisionEvent::boundary(CollisionType::BoundaryLeft));
        assert!(collider.has_boundary(CollisionType::BoundaryLeft));
        assert!(!collider.has_boundary(CollisionType::BoundaryRight));
        assert!(CollisionType::BoundaryLeft.is_boundary());
        assert!(!CollisionType::Entity.is_boundary());
    }
}
