//! What an agent can see and hit this tick.
//!
//! Perception is rebuilt from scratch every tick. Nothing here persists:
//! the view set and hittable set are returned by value and dropped at the
//! end of the agent's update.

use serde::{Deserialize, Serialize};

use crate::actions::ActionSlot;
use crate::agent::{Agent, AgentSnapshot};
use crate::components::AgentId;
use crate::math::Vec2;

/// Default view width, matching a 1280x720 viewport.
pub const DEFAULT_VIEW_WIDTH: f32 = 1280.0;

/// Default view height, matching a 1280x720 viewport.
pub const DEFAULT_VIEW_HEIGHT: f32 = 720.0;

/// Axis-aligned vision rectangle centered on the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewRect {
    /// Full width.
    pub width: f32,
    /// Full height.
    pub height: f32,
}

impl ViewRect {
    /// Create a view rectangle.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Check if `point` lies inside the rectangle centered on `origin`.
    ///
    /// Edges count as inside.
    #[must_use]
    pub fn contains(&self, origin: Vec2, point: Vec2) -> bool {
        let left = origin.x - self.width / 2.0;
        let top = origin.y - self.height / 2.0;
        point.x >= left
            && point.x <= left + self.width
            && point.y >= top
            && point.y <= top + self.height
    }
}

impl Default for ViewRect {
    fn default() -> Self {
        Self::new(DEFAULT_VIEW_WIDTH, DEFAULT_VIEW_HEIGHT)
    }
}

/// An opponent in view plus the viewer's actions that can reach it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerceivedOpponent {
    /// Opponent kinematics at the start of the tick.
    pub opponent: AgentSnapshot,
    /// Ready slots whose range circle contains the opponent.
    ///
    /// May be empty: the opponent is close enough to react to but nothing
    /// can reach it, which calls for repositioning.
    pub hittable: Vec<ActionSlot>,
}

impl PerceivedOpponent {
    /// Opponent identifier.
    #[must_use]
    pub fn id(&self) -> AgentId {
        self.opponent.id
    }
}

/// Everything perceived during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Perception {
    /// Opponents inside the view rectangle.
    pub in_view: Vec<AgentSnapshot>,
    /// Per-opponent hittable actions.
    pub hittable: Vec<PerceivedOpponent>,
}

impl Perception {
    /// Check if nothing was seen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.in_view.is_empty() && self.hittable.is_empty()
    }
}

/// Opponents whose position falls inside `view` centered on the viewer.
#[must_use]
pub fn compute_view_set(viewer: &Agent, world: &[AgentSnapshot], view: ViewRect) -> Vec<AgentSnapshot> {
    world
        .iter()
        .filter(|other| other.id != viewer.id)
        .filter(|other| view.contains(viewer.body.position, other.body.position))
        .copied()
        .collect()
}

/// For each opponent in view, the viewer's ready actions that reach it.
#[must_use]
pub fn compute_hittable_set(viewer: &Agent, view_set: &[AgentSnapshot]) -> Vec<PerceivedOpponent> {
    let ready = viewer.actions.ready_slots();
    let origin = viewer.center();

    view_set
        .iter()
        .filter(|other| other.id != viewer.id)
        .map(|other| {
            let distance = origin.distance(other.center());
            let hittable = ready
                .iter()
                .copied()
                .filter(|slot| {
                    viewer
                        .actions
                        .get(*slot)
                        .is_some_and(|action| action.in_range(distance))
                })
                .collect();
            PerceivedOpponent {
                opponent: *other,
                hittable,
            }
        })
        .collect()
}

/// Run both perception passes.
#[must_use]
pub fn perceive(viewer: &Agent, world: &[AgentSnapshot], view: ViewRect) -> Perception {
    let in_view = compute_view_set(viewer, world, view);
    let hittable = compute_hittable_set(viewer, &in_view);
    Perception { in_view, hittable }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{Action, ActionRegistry};
    use crate::components::Body;

    fn agent(id: AgentId, center: Vec2) -> Agent {
        Agent::new(id, format!("bot-{id}"), Body::centered_at(center, 300.0))
    }

    fn viewer() -> Agent {
        agent(1, Vec2::new(0.0, 0.0)).with_actions(
            ActionRegistry::new()
                .with(ActionSlot::WeaponPrimary, Action::weapon("pistol", 400.0, 0.4))
                .with(ActionSlot::WeaponSecondary, Action::weapon("ak47", 600.0, 0.1))
                .with(
                    ActionSlot::Ability1,
                    Action::weapon("sniper", 1000.0, 2.0).with_ready(false),
                ),
        )
    }

    #[test]
    fn test_view_rect_edges_inclusive() {
        let view = ViewRect::new(100.0, 50.0);
        let origin = Vec2::new(0.0, 0.0);
        assert!(view.contains(origin, Vec2::new(50.0, 25.0)));
        assert!(view.contains(origin, Vec2::new(-50.0, -25.0)));
        assert!(!view.contains(origin, Vec2::new(50.1, 0.0)));
        assert!(!view.contains(origin, Vec2::new(0.0, -25.1)));
    }

    #[test]
    fn test_view_set_excludes_self_and_outsiders() {
        let me = viewer();
        let world = vec![
            me.snapshot(),
            agent(2, Vec2::new(100.0, 100.0)).snapshot(),
            agent(3, Vec2::new(5000.0, 0.0)).snapshot(),
        ];
        let seen = compute_view_set(&me, &world, ViewRect::default());
        let ids: Vec<AgentId> = seen.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_hittable_uses_ready_actions_in_range() {
        let me = viewer();
        let near = agent(2, Vec2::new(300.0, 0.0)).snapshot();
        let mid = agent(3, Vec2::new(500.0, 0.0)).snapshot();
        let far = agent(4, Vec2::new(900.0, 0.0)).snapshot();

        let hittable = compute_hittable_set(&me, &[near, mid, far]);
        assert_eq!(hittable.len(), 3);
        assert_eq!(
            hittable[0].hittable,
            vec![ActionSlot::WeaponPrimary, ActionSlot::WeaponSecondary]
        );
        assert_eq!(hittable[1].hittable, vec![ActionSlot::WeaponSecondary]);
        // Out of every ready range, but still reported
        assert!(hittable[2].hittable.is_empty());
    }

    #[test]
    fn test_hittable_boundary_distance() {
        let me = viewer();
        let edge = agent(2, Vec2::new(400.0, 0.0)).snapshot();
        let hittable = compute_hittable_set(&me, &[edge]);
        assert!(hittable[0].hittable.contains(&ActionSlot::WeaponPrimary));
    }

    #[test]
    fn test_perceive_empty_world() {
        let me = viewer();
        let perception = perceive(&me, &[me.snapshot()], ViewRect::default());
        assert!(perception.is_empty());
    }
}
