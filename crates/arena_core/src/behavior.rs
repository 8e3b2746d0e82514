//! Decision tree evaluated once per tick.
//!
//! The tree is a priority selector over two guarded leaves:
//!
//! 1. [`EngageNode`]: something is in hittable range. Attack it if the
//!    trigger gate fires, otherwise reposition around it.
//! 2. [`WanderNode`]: nothing is in view. Roam.
//!
//! Every leaf finishes within the tick, so nodes are stateless and no
//! "running" status exists. What a leaf decides is written to the
//! [`TickContext`]; the controller turns it into movement afterwards.
//!
//! Every in-view opponent is perceived, reachable or not, so engage covers
//! any tick with company and wander covers the rest. Idle is the fallback
//! when nothing can run: the selector fails or the picked slot turns out
//! not to be bound. No force is pushed on an idle tick.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::actions::ActionSlot;
use crate::agent::{Agent, AgentSnapshot};
use crate::attack::{execute_attack, ActionDispatcher};
use crate::components::AgentId;
use crate::math::deg_to_rad;
use crate::perception::Perception;
use crate::rng::{CombatRng, UniformRange};
use crate::steering::{evade, limit, wander, SteeringAccumulator, SteeringBehaviour, WanderState};
use crate::targeting::select_engagement;
use crate::timing::{should_trigger, FleeWindow};

/// The result of evaluating a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// The node handled the tick.
    Success,
    /// The node's guard did not hold.
    Failure,
}

impl Status {
    /// Returns `true` if this status is `Success`.
    #[inline]
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, Status::Success)
    }

    /// Returns `true` if this status is `Failure`.
    #[inline]
    #[must_use]
    pub fn is_failure(self) -> bool {
        matches!(self, Status::Failure)
    }
}

/// What the tree chose this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Decision {
    /// Fired or cast `slot` at `target`.
    Attack {
        /// Opponent attacked.
        target: AgentId,
        /// Action used.
        slot: ActionSlot,
    },
    /// Maneuvered around `target` instead of attacking.
    Reposition {
        /// Opponent maneuvered around.
        target: AgentId,
        /// Evading rather than orbiting.
        fleeing: bool,
    },
    /// Roamed with nobody in view.
    Wander,
    /// Nothing ran: the selector failed or the picked slot was unbound.
    /// No force this tick.
    #[default]
    Idle,
}

/// Per-tick blackboard handed to every node.
pub struct TickContext<'a> {
    /// The agent being driven. Read-only; movement is applied afterwards.
    pub agent: &'a Agent,
    /// This tick's perception.
    pub perception: &'a Perception,
    /// Precision handicap in degrees.
    pub handicap_degrees: f32,
    /// Repositioning angle range in degrees.
    pub reposition_angle: UniformRange,
    /// Frame delta in seconds.
    pub frame_delta_secs: f32,
    /// Agent clock in seconds.
    pub now: f64,
    /// Persistent wander state.
    pub wander: &'a mut WanderState,
    /// Persistent flee state.
    pub flee: &'a mut FleeWindow,
    /// Random source.
    pub rng: &'a mut CombatRng,
    /// Host sink for fire and cast requests.
    pub dispatcher: &'a mut dyn ActionDispatcher,
    /// Forces pushed this tick.
    pub steering: SteeringAccumulator,
    /// Leaf outcome.
    pub decision: Decision,
    /// Rotation requested by an attack, overriding velocity facing.
    pub facing: Option<f32>,
}

/// A node in the decision tree.
pub trait Behavior: Send + Sync {
    /// Short name for logs and debug output.
    fn name(&self) -> &'static str;

    /// Evaluate the node.
    fn tick(&self, ctx: &mut TickContext<'_>) -> Status;
}

/// Runs children in order until one succeeds.
pub struct Selector {
    children: Vec<Box<dyn Behavior>>,
}

impl Selector {
    /// Create a selector. An empty selector always fails.
    #[must_use]
    pub fn new(children: Vec<Box<dyn Behavior>>) -> Self {
        Self { children }
    }

    /// Child names in priority order.
    #[must_use]
    pub fn child_names(&self) -> Vec<&'static str> {
        self.children.iter().map(|child| child.name()).collect()
    }
}

impl Behavior for Selector {
    fn name(&self) -> &'static str {
        "selector"
    }

    fn tick(&self, ctx: &mut TickContext<'_>) -> Status {
        for child in &self.children {
            if child.tick(ctx).is_success() {
                return Status::Success;
            }
        }
        Status::Failure
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selector")
            .field("children", &self.child_names())
            .finish()
    }
}

/// Attack or reposition around a reachable opponent.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngageNode;

impl Behavior for EngageNode {
    fn name(&self) -> &'static str {
        "engage"
    }

    fn tick(&self, ctx: &mut TickContext<'_>) -> Status {
        let Some(engagement) = select_engagement(&ctx.perception.hittable, ctx.rng) else {
            return Status::Failure;
        };

        let slot = match engagement.action {
            Some(slot) => {
                let fire = match ctx.agent.actions.get(slot) {
                    Some(action) => should_trigger(action, ctx.frame_delta_secs, ctx.rng),
                    None => false,
                };
                fire.then_some(slot)
            }
            None => None,
        };

        match slot {
            Some(slot) => attack(ctx, &engagement.target, slot),
            None => reposition(ctx, &engagement.target),
        }
        Status::Success
    }
}

/// Roam when nobody is in view.
#[derive(Debug, Clone, Copy, Default)]
pub struct WanderNode;

impl Behavior for WanderNode {
    fn name(&self) -> &'static str {
        "wander"
    }

    fn tick(&self, ctx: &mut TickContext<'_>) -> Status {
        if !ctx.perception.in_view.is_empty() || !ctx.perception.hittable.is_empty() {
            return Status::Failure;
        }

        let body = &ctx.agent.body;
        let force = limit(wander(body, ctx.wander), body.max_speed);
        ctx.steering.push(SteeringBehaviour::Wander, force);
        ctx.wander.angle += ctx.rng.signed(ctx.wander.variance);
        ctx.decision = Decision::Wander;
        Status::Success
    }
}

fn attack(ctx: &mut TickContext<'_>, target: &AgentSnapshot, slot: ActionSlot) {
    let outcome = execute_attack(
        ctx.agent,
        target,
        slot,
        ctx.handicap_degrees,
        ctx.rng,
        ctx.dispatcher,
    );

    match outcome {
        Some(outcome) => {
            ctx.facing = outcome.facing;
            ctx.decision = Decision::Attack {
                target: target.id,
                slot,
            };
        }
        None => {
            tracing::warn!(agent = ctx.agent.id, ?slot, "Picked action is not bound");
            ctx.decision = Decision::Idle;
        }
    }
}

/// Orbit the target at the longest ready range, or evade it while fleeing.
fn reposition(ctx: &mut TickContext<'_>, target: &AgentSnapshot) {
    let ranked = ctx.agent.actions.ready_by_range();
    ctx.flee
        .update(!ranked.is_empty(), ctx.frame_delta_secs, ctx.now, ctx.rng);

    let body = &ctx.agent.body;
    let fleeing = ctx.flee.is_fleeing();
    if fleeing {
        ctx.steering
            .push(SteeringBehaviour::Flee, evade(body, &target.body));
    } else if let Some(&(_, longest)) = ranked.first() {
        let angle = deg_to_rad(ctx.reposition_angle.sample(ctx.rng));
        let goal = (target.center() - ctx.agent.center())
            .normalize()
            .rotate(angle)
            .scale(longest);
        ctx.steering
            .push(SteeringBehaviour::Orbit, limit(goal, body.max_speed));
    }

    ctx.decision = Decision::Reposition {
        target: target.id,
        fleeing,
    };
}

/// Root of the per-tick decision tree.
#[derive(Debug)]
pub struct DecisionSelector {
    root: Selector,
}

impl DecisionSelector {
    /// Engage first, wander otherwise.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            root: Selector::new(vec![Box::new(EngageNode), Box::new(WanderNode)]),
        }
    }

    /// Evaluate the tree. `Failure` means the tick is idle.
    pub fn evaluate(&self, ctx: &mut TickContext<'_>) -> Status {
        let status = self.root.tick(ctx);
        if status.is_failure() {
            ctx.decision = Decision::Idle;
        }
        status
    }

    /// Leaf names in priority order.
    #[must_use]
    pub fn leaf_names(&self) -> Vec<&'static str> {
        self.root.child_names()
    }
}

impl Default for DecisionSelector {
    fn default() -> Self {
        Self::standard()
    }
}
