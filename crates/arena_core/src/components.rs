//! Kinematic and status components of an arena combatant.
//!
//! Components are pure data. The physics host owns integration; the AI
//! core reads `position`, `velocity`, `max_speed` and `center`, and writes
//! `acceleration` and the agent's rotation.

use serde::{Deserialize, Serialize};

use crate::math::Vec2;

/// Unique identifier for agents.
pub type AgentId = u32;

/// Default edge length of a combatant's square body.
pub const DEFAULT_BODY_SIZE: f32 = 42.0;

/// Default maximum speed in world units per second.
pub const DEFAULT_MAX_SPEED: f32 = 320.0;

/// Arcade-style physics body.
///
/// `position` is the top-left corner of the body's bounding box, matching
/// the host physics engine; [`Body::center`] is what ranges and aiming use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Top-left corner in world space.
    pub position: Vec2,
    /// Current velocity (units per second).
    pub velocity: Vec2,
    /// Acceleration requested for the next integration step.
    pub acceleration: Vec2,
    /// Speed cap (units per second).
    pub max_speed: f32,
    /// Width and height of the bounding box.
    pub size: Vec2,
}

impl Body {
    /// Create a stationary body at `position` with default size.
    #[must_use]
    pub fn new(position: Vec2, max_speed: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            max_speed,
            size: Vec2::new(DEFAULT_BODY_SIZE, DEFAULT_BODY_SIZE),
        }
    }

    /// Create a stationary body whose center sits at `center`.
    #[must_use]
    pub fn centered_at(center: Vec2, max_speed: f32) -> Self {
        let mut body = Self::new(Vec2::ZERO, max_speed);
        body.set_center(center);
        body
    }

    /// Builder method to set velocity.
    #[must_use]
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Builder method to set the bounding box size.
    #[must_use]
    pub fn with_size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }

    /// Center of the bounding box.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.position + self.size.scale(0.5)
    }

    /// Move the body so its center lands on `center`.
    pub fn set_center(&mut self, center: Vec2) {
        self.position = center - self.size.scale(0.5);
    }

    /// Stop all motion.
    pub fn halt(&mut self) {
        self.velocity = Vec2::ZERO;
        self.acceleration = Vec2::ZERO;
    }
}

/// Crowd-control flags set by gameplay effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusFlags {
    /// Cannot move.
    pub paralyzed: bool,
    /// Cannot move.
    pub stunned: bool,
}

impl StatusFlags {
    /// Check if any effect pins the agent in place.
    #[must_use]
    pub const fn is_immobilized(&self) -> bool {
        self.paralyzed || self.stunned
    }
}
