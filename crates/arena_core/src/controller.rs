//! Per-agent AI controller.
//!
//! [`AiController::update`] is the whole tick: advance the clock, expire a
//! finished flee, perceive, run the decision tree, then write acceleration
//! and facing to the agent. The controller owns the only state that outlives
//! a tick (wander angle, flee window, clock, random stream).

use serde::{Deserialize, Serialize};

use crate::agent::{Agent, AgentSnapshot};
use crate::attack::ActionDispatcher;
use crate::behavior::{Decision, DecisionSelector, TickContext};
use crate::data::AiProfile;
use crate::error::Result;
use crate::math::Vec2;
use crate::movement::apply_steering;
use crate::perception::{perceive, ViewRect};
use crate::rng::CombatRng;
use crate::steering::{SteeringAccumulator, SteeringBehaviour, WanderState};
use crate::timing::FleeWindow;

/// What one tick did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Leaf outcome.
    pub decision: Decision,
    /// Labels of the forces pushed, in push order.
    pub behaviours: Vec<SteeringBehaviour>,
    /// Acceleration written to the body.
    pub acceleration: Vec2,
    /// Opponents in view.
    pub in_view: usize,
    /// Opponents reported by the hittable pass.
    pub hittable: usize,
    /// A flee expired at the start of this tick.
    pub flee_ended: bool,
}

/// Serializable view of a controller's internal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrainSnapshot {
    /// Profile driving the agent.
    pub profile_id: String,
    /// Agent clock (seconds).
    pub clock: f64,
    /// Ticks processed.
    pub ticks: u64,
    /// Fleeing in combat.
    pub fleeing: bool,
    /// Pending flee expiry on the agent clock.
    pub flee_expires_at: Option<f64>,
    /// Current wander angle (radians).
    pub wander_angle: f32,
    /// Most recent decision.
    pub last_decision: Decision,
    /// Opponents in view last tick.
    pub in_view: usize,
    /// Opponents in the hittable pass last tick.
    pub hittable: usize,
}

/// Drives one agent.
#[derive(Debug, Serialize, Deserialize)]
pub struct AiController {
    profile: AiProfile,
    wander: WanderState,
    flee: FleeWindow,
    clock: f64,
    ticks: u64,
    rng: CombatRng,
    last_decision: Decision,
    last_in_view: usize,
    last_hittable: usize,
    #[serde(skip)]
    tree: DecisionSelector,
}

impl AiController {
    /// Create a controller for `profile` with its own random stream.
    ///
    /// Fails if the profile does not validate.
    pub fn new(profile: AiProfile, seed: u64) -> Result<Self> {
        profile.ensure_valid()?;
        Ok(Self {
            wander: profile.wander.state(),
            flee: FleeWindow::new(profile.flee_duration, profile.flee_trigger),
            profile,
            clock: 0.0,
            ticks: 0,
            rng: CombatRng::seed_from_u64(seed),
            last_decision: Decision::Idle,
            last_in_view: 0,
            last_hittable: 0,
            tree: DecisionSelector::standard(),
        })
    }

    /// Profile driving this controller.
    #[must_use]
    pub fn profile(&self) -> &AiProfile {
        &self.profile
    }

    /// Fleeing in combat.
    #[must_use]
    pub fn is_fleeing(&self) -> bool {
        self.flee.is_fleeing()
    }

    /// Current wander state.
    #[must_use]
    pub fn wander(&self) -> &WanderState {
        &self.wander
    }

    /// Agent clock (seconds).
    #[must_use]
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Run one tick for `agent`.
    ///
    /// `world` holds every combatant's start-of-tick snapshot and may
    /// include the agent itself. `delta_ms` is the frame delta in
    /// milliseconds; negative or non-finite deltas are treated as zero.
    pub fn update(
        &mut self,
        agent: &mut Agent,
        world: &[AgentSnapshot],
        view: ViewRect,
        delta_ms: f32,
        dispatcher: &mut dyn ActionDispatcher,
    ) -> TickReport {
        let frame_delta_secs = if delta_ms.is_finite() && delta_ms >= 0.0 {
            delta_ms / 1000.0
        } else {
            tracing::warn!(agent = agent.id, delta_ms, "Ignoring invalid frame delta");
            0.0
        };

        self.clock += f64::from(frame_delta_secs);
        self.ticks += 1;
        let flee_ended = self.flee.expire(self.clock);

        let perception = perceive(agent, world, view);

        let mut ctx = TickContext {
            agent,
            perception: &perception,
            handicap_degrees: self.profile.precision_handicap,
            reposition_angle: self.profile.reposition_angle,
            frame_delta_secs,
            now: self.clock,
            wander: &mut self.wander,
            flee: &mut self.flee,
            rng: &mut self.rng,
            dispatcher,
            steering: SteeringAccumulator::new(),
            decision: Decision::Idle,
            facing: None,
        };
        self.tree.evaluate(&mut ctx);
        let TickContext {
            steering,
            decision,
            facing,
            ..
        } = ctx;

        let acceleration = apply_steering(agent, &steering, facing);

        self.last_decision = decision;
        self.last_in_view = perception.in_view.len();
        self.last_hittable = perception.hittable.len();

        tracing::debug!(
            agent = agent.id,
            ?decision,
            in_view = self.last_in_view,
            fleeing = self.flee.is_fleeing(),
            "AI tick"
        );

        TickReport {
            decision,
            behaviours: steering.behaviours(),
            acceleration,
            in_view: self.last_in_view,
            hittable: self.last_hittable,
            flee_ended,
        }
    }

    /// Internal state for debugging.
    #[must_use]
    pub fn snapshot(&self) -> BrainSnapshot {
        BrainSnapshot {
            profile_id: self.profile.id.clone(),
            clock: self.clock,
            ticks: self.ticks,
            fleeing: self.flee.is_fleeing(),
            flee_expires_at: self.flee.expires_at(),
            wander_angle: self.wander.angle,
            last_decision: self.last_decision,
            in_view: self.last_in_view,
            hittable: self.last_hittable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{Action, ActionRegistry, ActionSlot};
    use crate::attack::{Dispatch, DispatchLog};
    use crate::components::Body;
    use crate::data::WanderConfig;
    use crate::rng::UniformRange;

    fn profile() -> AiProfile {
        AiProfile::new(
            "test",
            WanderConfig {
                radial_mag: 100.0,
                distance_extension: 50.0,
                variance: 0.2,
            },
            0.0,
        )
        // Random flee roll effectively disabled
        .with_flee(UniformRange::fixed(1.0), UniformRange::fixed(1.0e9))
    }

    fn agent(id: u32, center: Vec2, actions: ActionRegistry) -> Agent {
        Agent::new(id, format!("bot-{id}"), Body::centered_at(center, 320.0)).with_actions(actions)
    }

    #[test]
    fn test_rejects_invalid_profile() {
        let mut bad = profile();
        bad.precision_handicap = f32::NAN;
        assert!(AiController::new(bad, 1).is_err());
    }

    #[test]
    fn test_wander_tick_writes_acceleration() {
        let mut controller = AiController::new(profile(), 1).expect("valid profile");
        let mut me = agent(1, Vec2::new(500.0, 500.0), ActionRegistry::new());
        let world = vec![me.snapshot()];
        let mut log = DispatchLog::new();

        let report = controller.update(&mut me, &world, ViewRect::default(), 16.0, &mut log);

        assert_eq!(report.decision, Decision::Wander);
        assert_eq!(report.behaviours, vec![SteeringBehaviour::Wander]);
        assert_eq!(me.body.acceleration, report.acceleration);
        assert!(report.acceleration.length() > 0.0);
        assert!((controller.clock() - 0.016).abs() < 1e-6);
    }

    #[test]
    fn test_flee_lasts_until_expiry() {
        let mut controller = AiController::new(profile(), 1).expect("valid profile");
        let mut me = agent(
            1,
            Vec2::ZERO,
            ActionRegistry::new().with(
                ActionSlot::WeaponPrimary,
                Action::weapon("pistol", 400.0, 0.4).with_ready(false),
            ),
        );
        let foe = agent(2, Vec2::new(200.0, 0.0), ActionRegistry::new());
        let mut log = DispatchLog::new();

        let world = [me.snapshot(), foe.snapshot()];

        let report = controller.update(&mut me, &world, ViewRect::default(), 100.0, &mut log);
        assert!(controller.is_fleeing());
        assert_eq!(report.behaviours, vec![SteeringBehaviour::Flee]);

        // Give the agent a ready weapon so the forced branch cannot re-fire
        me.actions.set_ready(ActionSlot::WeaponPrimary, true);
        me.actions
            .get_mut(ActionSlot::WeaponPrimary)
            .expect("bound")
            .cooldown_delay = 1.0e9;

        for _ in 0..9 {
            let world = [me.snapshot(), foe.snapshot()];
            controller.update(&mut me, &world, ViewRect::default(), 100.0, &mut log);
            assert!(controller.is_fleeing());
        }
        // Triggered at t=0.1 with a fixed 1.0s duration
        let world = [me.snapshot(), foe.snapshot()];
        let report = controller.update(&mut me, &world, ViewRect::default(), 100.0, &mut log);
        assert!(report.flee_ended);
        assert!(!controller.is_fleeing());
        assert!(log.is_empty());
    }

    #[test]
    fn test_attack_dispatches_and_faces_target() {
        let mut controller = AiController::new(profile(), 9).expect("valid profile");
        let mut me = agent(
            1,
            Vec2::ZERO,
            ActionRegistry::new().with(ActionSlot::WeaponPrimary, Action::weapon("laser", 400.0, 0.0)),
        );
        let foe = agent(2, Vec2::new(0.0, -300.0), ActionRegistry::new());
        let mut log = DispatchLog::new();

        let world = [me.snapshot(), foe.snapshot()];

        let report = controller.update(&mut me, &world, ViewRect::default(), 16.0, &mut log);

        assert!(matches!(report.decision, Decision::Attack { target: 2, .. }));
        assert!(matches!(log.entries(), [Dispatch::Fire { agent: 1, .. }]));
        assert!(me.rotation.abs() < 1e-4);
    }

    #[test]
    fn test_stunned_agent_still_decides() {
        let mut controller = AiController::new(profile(), 9).expect("valid profile");
        let mut me = agent(
            1,
            Vec2::ZERO,
            ActionRegistry::new().with(ActionSlot::WeaponPrimary, Action::weapon("laser", 400.0, 0.0)),
        );
        me.body.velocity = Vec2::new(100.0, 0.0);
        me.status.paralyzed = true;
        let foe = agent(2, Vec2::new(300.0, 0.0), ActionRegistry::new());
        let mut log = DispatchLog::new();

        let world = [me.snapshot(), foe.snapshot()];

        let report = controller.update(&mut me, &world, ViewRect::default(), 16.0, &mut log);

        assert!(matches!(report.decision, Decision::Attack { .. }));
        assert_eq!(log.len(), 1);
        assert_eq!(me.body.velocity, Vec2::ZERO);
        assert_eq!(report.acceleration, Vec2::ZERO);
    }

    #[test]
    fn test_invalid_delta_is_ignored() {
        let mut controller = AiController::new(profile(), 1).expect("valid profile");
        let mut me = agent(1, Vec2::ZERO, ActionRegistry::new());
        let mut log = DispatchLog::new();
        controller.update(&mut me, &[], ViewRect::default(), f32::NAN, &mut log);
        controller.update(&mut me, &[], ViewRect::default(), -5.0, &mut log);
        assert_eq!(controller.clock(), 0.0);
        assert_eq!(controller.snapshot().ticks, 2);
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut controller = AiController::new(profile(), 1).expect("valid profile");
        let mut me = agent(1, Vec2::ZERO, ActionRegistry::new());
        let mut log = DispatchLog::new();
        controller.update(&mut me, &[], ViewRect::default(), 16.0, &mut log);

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.profile_id, "test");
        assert_eq!(snapshot.last_decision, Decision::Wander);
        assert_eq!(snapshot.wander_angle, controller.wander().angle);
        assert!(!snapshot.fleeing);
        assert_eq!(snapshot.flee_expires_at, None);
    }
}
