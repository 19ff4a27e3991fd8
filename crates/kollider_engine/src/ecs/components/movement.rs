//! Position and velocity components integrated by the physics system

use crate::ecs::Component;
use crate::foundation::math::Vec2;

/// Top-left corner of an entity in world space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    /// Horizontal coordinate
    pub x: f32,
    /// Vertical coordinate (grows downwards)
    pub y: f32,
}

impl Position {
    /// Create a position
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// As a math vector
    pub fn to_vec(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Move by `delta`
    pub fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }
}

impl From<Vec2> for Position {
    fn from(v: Vec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl Component for Position {}

/// Rate of change applied to [`Position`] every frame, in units per second
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocity {
    /// Horizontal speed
    pub vx: f32,
    /// Vertical speed
    pub vy: f32,
}

impl Velocity {
    /// Create a velocity
    pub const fn new(vx: f32, vy: f32) -> Self {
        Self { vx, vy }
    }

    /// As a math vector
    pub fn to_vec(self) -> Vec2 {
        Vec2::new(self.vx, self.vy)
    }

    /// Speed magnitude
    pub fn speed(self) -> f32 {
        self.to_vec().norm()
    }
}

impl From<Vec2> for Velocity {
    fn from(v: Vec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl Component for Velocity {}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_translate() {
        let mut position = Position::new(1.0, 2.0);
        position.translate(Vec2::new(0.5, -1.0));
        assert_eq!(position, Position::new(1.5, 1.0));
    }

    #[test]
    fn test_speed() {
        assert_relative_eq!(Velocity::new(3.0, 4.0).speed(), 5.0);
    }
}
