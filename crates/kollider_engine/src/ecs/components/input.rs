//! Input state component
//!
//! Platform input handlers write into this component; gameplay systems read
//! it. The owning entity is recorded by the world when the component is
//! attached and cannot be set from outside the engine.

use crate::ecs::{Component, Entity};
use crate::foundation::math::Vec2;

/// Component that holds the latest input state for an entity
#[derive(Debug, Clone, PartialEq)]
pub struct InputComponent {
    /// Analog movement, usually within the unit circle
    pub movement: Vec2,
    /// Fire/action button held
    pub shoot: bool,
    /// Pause toggle requested
    pub paused: bool,
    /// Whether shared analog movement should be applied to this entity
    pub movement_enabled: bool,
    owner: Option<Entity>,
}

impl InputComponent {
    /// Create an idle input component
    pub fn new() -> Self {
        Self {
            movement: Vec2::zeros(),
            shoot: false,
            paused: false,
            movement_enabled: true,
            owner: None,
        }
    }

    /// Entity this component is attached to
    pub fn owner(&self) -> Option<Entity> {
        self.owner
    }

    /// Reset transient button state, keeping movement configuration
    pub fn clear_buttons(&mut self) {
        self.shoot = false;
        self.paused = false;
    }
}

impl Default for InputComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for InputComponent {
    fn on_attach(&mut self, owner: Entity) {
        self.owner = Some(owner);
    }
}
