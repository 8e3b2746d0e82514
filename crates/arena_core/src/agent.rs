//! Arena combatants as seen by the decision core.

use serde::{Deserialize, Serialize};

use crate::actions::ActionRegistry;
use crate::components::{AgentId, Body, StatusFlags};
use crate::math::Vec2;

/// A combatant: body, facing, crowd-control flags and loadout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Unique identifier.
    pub id: AgentId,
    /// Display name.
    pub name: String,
    /// Physics body.
    pub body: Body,
    /// Sprite rotation in radians (see [`facing`](crate::steering::facing)).
    pub rotation: f32,
    /// Crowd-control flags.
    pub status: StatusFlags,
    /// Bound weapons and abilities.
    pub actions: ActionRegistry,
}

impl Agent {
    /// Create an agent with an empty loadout.
    #[must_use]
    pub fn new(id: AgentId, name: impl Into<String>, body: Body) -> Self {
        Self {
            id,
            name: name.into(),
            body,
            rotation: 0.0,
            status: StatusFlags::default(),
            actions: ActionRegistry::new(),
        }
    }

    /// Builder method to set the loadout.
    #[must_use]
    pub fn with_actions(mut self, actions: ActionRegistry) -> Self {
        self.actions = actions;
        self
    }

    /// Center of the agent's body.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.body.center()
    }

    /// Read-only kinematic view for other agents' perception.
    #[must_use]
    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id,
            body: self.body,
        }
    }
}

/// Kinematics of an agent frozen at the start of a tick.
///
/// Perception and aiming read other combatants only through snapshots, so
/// one agent's update never observes another's half-applied tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    /// Agent identifier.
    pub id: AgentId,
    /// Body at snapshot time.
    pub body: Body,
}

impl AgentSnapshot {
    /// Center of the snapshotted body.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.body.center()
    }
}
