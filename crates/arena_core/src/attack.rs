//! Intercept prediction and fire/cast dispatch.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::actions::{AbilityEffect, ActionKind, ActionSlot, Travel};
use crate::agent::{Agent, AgentSnapshot};
use crate::components::AgentId;
use crate::math::Vec2;
use crate::rng::CombatRng;
use crate::steering::facing;

/// A fire or cast request issued by the decision core.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Dispatch {
    /// Weapon fired at an aim point.
    Fire {
        /// Shooter.
        agent: AgentId,
        /// Weapon slot.
        slot: ActionSlot,
        /// World-space aim point.
        aim: Vec2,
    },
    /// Ability cast at a point.
    Cast {
        /// Caster.
        agent: AgentId,
        /// Ability slot.
        slot: ActionSlot,
        /// World-space target point (blink destination for blinks).
        target: Vec2,
    },
}

impl Dispatch {
    /// Agent that issued the request.
    #[must_use]
    pub fn agent(&self) -> AgentId {
        match self {
            Dispatch::Fire { agent, .. } | Dispatch::Cast { agent, .. } => *agent,
        }
    }

    /// Slot that was used.
    #[must_use]
    pub fn slot(&self) -> ActionSlot {
        match self {
            Dispatch::Fire { slot, .. } | Dispatch::Cast { slot, .. } => *slot,
        }
    }

    /// Point the request was aimed at.
    #[must_use]
    pub fn point(&self) -> Vec2 {
        match self {
            Dispatch::Fire { aim, .. } => *aim,
            Dispatch::Cast { target, .. } => *target,
        }
    }
}

/// Host-side sink for fire and cast requests.
///
/// The host owns cooldowns, projectiles and damage. The AI core only
/// announces intent through this trait.
pub trait ActionDispatcher {
    /// Fire the weapon in `slot` at `aim`.
    fn fire_weapon(&mut self, agent: AgentId, slot: ActionSlot, aim: Vec2);

    /// Cast the ability in `slot` toward `target`.
    fn cast_ability(&mut self, agent: AgentId, slot: ActionSlot, target: Vec2);
}

/// Dispatcher that records every request in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchLog {
    entries: Vec<Dispatch>,
}

impl DispatchLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded requests.
    #[must_use]
    pub fn entries(&self) -> &[Dispatch] {
        &self.entries
    }

    /// Take all recorded requests, leaving the log empty.
    pub fn drain(&mut self) -> Vec<Dispatch> {
        std::mem::take(&mut self.entries)
    }

    /// Number of recorded requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ActionDispatcher for DispatchLog {
    fn fire_weapon(&mut self, agent: AgentId, slot: ActionSlot, aim: Vec2) {
        self.entries.push(Dispatch::Fire { agent, slot, aim });
    }

    fn cast_ability(&mut self, agent: AgentId, slot: ActionSlot, target: Vec2) {
        self.entries.push(Dispatch::Cast {
            agent,
            slot,
            target,
        });
    }
}

/// Lead prediction for one shot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Intercept {
    /// Seconds for the action to reach the target's current distance.
    pub travel_time: f32,
    /// Target center advanced by its velocity over `travel_time`.
    pub predicted: Vec2,
}

/// Predict where `target` will be when an action with `travel` arrives.
#[must_use]
pub fn predict_intercept(shooter_center: Vec2, target: &AgentSnapshot, travel: Travel) -> Intercept {
    let target_center = target.center();
    let travel_time = travel.time_to_reach(shooter_center.distance(target_center));
    Intercept {
        travel_time,
        predicted: target_center + target.body.velocity.scale(travel_time),
    }
}

/// Rotate `point` around `pivot` by a normally distributed error.
///
/// The angle is `N(0,1) * PI * (handicap_degrees / 360)`. A zero handicap
/// still consumes the draw and returns `point` untouched.
pub fn apply_handicap(point: Vec2, pivot: Vec2, handicap_degrees: f32, rng: &mut CombatRng) -> Vec2 {
    let angle = rng.normal() * PI * (handicap_degrees / 360.0);
    if angle == 0.0 {
        return point;
    }
    point.rotate_around(pivot, angle)
}

/// Blink destination: a random direction from `center`, `range` away.
pub fn blink_destination(center: Vec2, range: f32, rng: &mut CombatRng) -> Vec2 {
    center + Vec2::UP.rotate(rng.normal() * PI).scale(range)
}

/// What an executed attack did.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackOutcome {
    /// Request handed to the dispatcher.
    pub dispatch: Dispatch,
    /// Lead prediction before the handicap.
    pub intercept: Intercept,
    /// Rotation the shooter should take this tick (weapons only).
    pub facing: Option<f32>,
}

/// Predict, aim and dispatch `slot` against `target`.
///
/// Returns `None` if `slot` is not bound on the shooter.
pub fn execute_attack(
    shooter: &Agent,
    target: &AgentSnapshot,
    slot: ActionSlot,
    handicap_degrees: f32,
    rng: &mut CombatRng,
    dispatcher: &mut dyn ActionDispatcher,
) -> Option<AttackOutcome> {
    let action = shooter.actions.get(slot)?;
    let origin = shooter.center();

    let intercept = predict_intercept(origin, target, action.travel);
    let aim = apply_handicap(intercept.predicted, origin, handicap_degrees, rng);

    let (dispatch, facing_angle) = match action.kind {
        ActionKind::Weapon => {
            dispatcher.fire_weapon(shooter.id, slot, aim);
            let dispatch = Dispatch::Fire {
                agent: shooter.id,
                slot,
                aim,
            };
            (dispatch, Some(facing(aim - origin)))
        }
        ActionKind::Ability(AbilityEffect::Blink) => {
            let destination = blink_destination(origin, action.range_distance, rng);
            dispatcher.cast_ability(shooter.id, slot, destination);
            let dispatch = Dispatch::Cast {
                agent: shooter.id,
                slot,
                target: destination,
            };
            (dispatch, None)
        }
        ActionKind::Ability(AbilityEffect::Projectile | AbilityEffect::ProjectileWithRotation) => {
            dispatcher.cast_ability(shooter.id, slot, aim);
            let dispatch = Dispatch::Cast {
                agent: shooter.id,
                slot,
                target: aim,
            };
            (dispatch, None)
        }
    };

    tracing::trace!(
        agent = shooter.id,
        target = target.id,
        action = %action.name,
        travel_time = intercept.travel_time,
        "Attack dispatched"
    );

    Some(AttackOutcome {
        dispatch,
        intercept,
        facing: facing_angle,
    })
}
