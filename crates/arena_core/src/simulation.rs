//! Headless arena loop.
//!
//! [`ArenaSimulation`] plays the part of the game host: it owns the
//! combatants, runs every controller once per tick, honours the fire/cast
//! requests (cooldowns and blink teleports) and integrates bodies.
//! Projectile flight and damage are not modelled.
//!
//! # Determinism
//!
//! - Combatants are processed in ascending id order
//! - Every controller draws from its own seeded stream
//! - All controllers perceive the same start-of-tick snapshot
//!
//! # Example
//!
//! ```
//! use arena_core::math::Vec2;
//! use arena_core::simulation::ArenaSimulation;
//!
//! let mut sim = ArenaSimulation::new(42);
//! sim.spawn_preset("bot_1", Vec2::new(400.0, 400.0)).unwrap();
//! sim.spawn_preset("bot_2", Vec2::new(700.0, 400.0)).unwrap();
//!
//! let events = sim.tick();
//! assert_eq!(events.tick, 1);
//! assert_eq!(events.decisions.len(), 2);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::actions::ActionSlot;
use crate::agent::{Agent, AgentSnapshot};
use crate::attack::{Dispatch, DispatchLog};
use crate::behavior::Decision;
use crate::components::{AgentId, Body, StatusFlags, DEFAULT_MAX_SPEED};
use crate::controller::{AiController, BrainSnapshot};
use crate::data::{ActionCatalog, AiProfile};
use crate::error::{ArenaError, Result};
use crate::math::Vec2;
use crate::movement::integrate_body;
use crate::perception::ViewRect;

/// Ticks per second.
pub const TICK_RATE: u32 = 60;

/// Duration of one tick in milliseconds.
pub const TICK_DURATION_MS: f32 = 1000.0 / TICK_RATE as f32;

/// Default arena width and height.
pub const DEFAULT_ARENA_SIZE: Vec2 = Vec2::new(3200.0, 3200.0);

/// Parameters for spawning a combatant.
#[derive(Debug, Clone)]
pub struct AgentSpawnParams {
    /// Display name. Defaults to the profile id.
    pub name: Option<String>,
    /// AI tuning and loadout.
    pub profile: AiProfile,
    /// Initial body center.
    pub center: Vec2,
    /// Speed cap.
    pub max_speed: f32,
}

impl AgentSpawnParams {
    /// Spawn `profile` centered at `center` with the default speed cap.
    #[must_use]
    pub fn new(profile: AiProfile, center: Vec2) -> Self {
        Self {
            name: None,
            profile,
            center,
            max_speed: DEFAULT_MAX_SPEED,
        }
    }

    /// Builder method to set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder method to set the speed cap.
    #[must_use]
    pub fn with_max_speed(mut self, max_speed: f32) -> Self {
        self.max_speed = max_speed;
        self
    }
}

/// An agent, its brain and its running cooldowns.
#[derive(Debug, Serialize, Deserialize)]
pub struct Combatant {
    /// The agent's body and loadout.
    pub agent: Agent,
    controller: AiController,
    cooldowns: BTreeMap<ActionSlot, f32>,
}

impl Combatant {
    /// The controller driving this agent.
    #[must_use]
    pub fn controller(&self) -> &AiController {
        &self.controller
    }

    /// Seconds left on each cooling slot.
    #[must_use]
    pub fn cooldowns(&self) -> &BTreeMap<ActionSlot, f32> {
        &self.cooldowns
    }

    /// Put `slot` on cooldown, or leave it ready if the delay is zero.
    fn start_cooldown(&mut self, slot: ActionSlot) {
        let Some(action) = self.agent.actions.get(slot) else {
            return;
        };
        let delay = action.cooldown_delay;
        if delay > 0.0 {
            self.agent.actions.set_ready(slot, false);
            self.cooldowns.insert(slot, delay);
        }
    }

    /// Count down cooldowns, restoring readiness as they finish.
    fn tick_cooldowns(&mut self, dt_secs: f32) {
        let mut finished = Vec::new();
        for (slot, remaining) in &mut self.cooldowns {
            *remaining -= dt_secs;
            if *remaining <= 0.0 {
                finished.push(*slot);
            }
        }
        for slot in finished {
            self.cooldowns.remove(&slot);
            self.agent.actions.set_ready(slot, true);
        }
    }
}

/// Events generated during a tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickEvents {
    /// Tick number after the step.
    pub tick: u64,
    /// Fire and cast requests, in processing order.
    pub dispatches: Vec<Dispatch>,
    /// Agents that blinked and where they landed (body center).
    pub blinks: Vec<(AgentId, Vec2)>,
    /// Each agent's decision.
    pub decisions: Vec<(AgentId, Decision)>,
    /// Agents whose flee ended this tick.
    pub flee_ended: Vec<AgentId>,
}

/// The arena host.
#[derive(Debug, Serialize, Deserialize)]
pub struct ArenaSimulation {
    tick: u64,
    seed: u64,
    next_id: AgentId,
    arena_size: Vec2,
    view: ViewRect,
    tick_delta_ms: f32,
    catalog: ActionCatalog,
    combatants: BTreeMap<AgentId, Combatant>,
}

impl ArenaSimulation {
    /// Create an empty arena with the stock catalog.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            tick: 0,
            seed,
            next_id: 1,
            arena_size: DEFAULT_ARENA_SIZE,
            view: ViewRect::default(),
            tick_delta_ms: TICK_DURATION_MS,
            catalog: ActionCatalog::standard(),
            combatants: BTreeMap::new(),
        }
    }

    /// Builder method to set the arena size.
    #[must_use]
    pub fn with_arena_size(mut self, size: Vec2) -> Self {
        self.arena_size = size;
        self
    }

    /// Builder method to set the view rectangle.
    #[must_use]
    pub fn with_view(mut self, view: ViewRect) -> Self {
        self.view = view;
        self
    }

    /// Builder method to set the frame delta fed to controllers.
    #[must_use]
    pub fn with_tick_delta_ms(mut self, delta_ms: f32) -> Self {
        self.tick_delta_ms = delta_ms;
        self
    }

    /// Builder method to replace the action catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: ActionCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Current tick number.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Match seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Arena width and height.
    #[must_use]
    pub fn arena_size(&self) -> Vec2 {
        self.arena_size
    }

    /// View rectangle used for every agent.
    #[must_use]
    pub fn view(&self) -> ViewRect {
        self.view
    }

    /// Number of combatants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.combatants.len()
    }

    /// Check if the arena is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.combatants.is_empty()
    }

    /// Combatant ids in processing order.
    #[must_use]
    pub fn agent_ids(&self) -> Vec<AgentId> {
        self.combatants.keys().copied().collect()
    }

    /// Look up a combatant.
    #[must_use]
    pub fn combatant(&self, id: AgentId) -> Option<&Combatant> {
        self.combatants.get(&id)
    }

    /// Look up an agent.
    #[must_use]
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.combatants.get(&id).map(|c| &c.agent)
    }

    /// Look up an agent mutably.
    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.combatants.get_mut(&id).map(|c| &mut c.agent)
    }

    /// Iterate over agents in id order.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.combatants.values().map(|c| &c.agent)
    }

    /// Spawn a combatant.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile is invalid or its loadout names an
    /// action missing from the catalog.
    pub fn spawn(&mut self, params: AgentSpawnParams) -> Result<AgentId> {
        let id = self.next_id;
        let actions = params.profile.build_actions(&self.catalog)?;
        let controller = AiController::new(params.profile, self.controller_seed(id))?;

        let name = params
            .name
            .unwrap_or_else(|| controller.profile().id.clone());
        let agent = Agent::new(id, name, Body::centered_at(params.center, params.max_speed))
            .with_actions(actions);

        tracing::info!(
            agent = id,
            profile = %controller.profile().id,
            x = params.center.x,
            y = params.center.y,
            "Spawned combatant"
        );

        self.combatants.insert(
            id,
            Combatant {
                agent,
                controller,
                cooldowns: BTreeMap::new(),
            },
        );
        self.next_id += 1;
        Ok(id)
    }

    /// Spawn a built-in preset at `center`.
    ///
    /// # Errors
    ///
    /// Returns an error if the preset is unknown.
    pub fn spawn_preset(&mut self, preset: &str, center: Vec2) -> Result<AgentId> {
        let profile = AiProfile::preset(preset)?;
        self.spawn(AgentSpawnParams::new(profile, center))
    }

    /// Remove a combatant.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is unknown.
    pub fn despawn(&mut self, id: AgentId) -> Result<()> {
        self.combatants
            .remove(&id)
            .map(|_| ())
            .ok_or(ArenaError::AgentNotFound(id))
    }

    /// Replace an agent's crowd-control flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is unknown.
    pub fn set_status(&mut self, id: AgentId, status: StatusFlags) -> Result<()> {
        let agent = self.agent_mut(id).ok_or(ArenaError::AgentNotFound(id))?;
        agent.status = status;
        Ok(())
    }

    /// Advance the arena by one tick.
    ///
    /// Order: snapshot, controllers, dispatches, cooldowns, integration.
    pub fn tick(&mut self) -> TickEvents {
        let mut events = TickEvents::default();
        let dt_secs = self.tick_delta_ms / 1000.0;

        let world: Vec<AgentSnapshot> = self.combatants.values().map(|c| c.agent.snapshot()).collect();

        for (id, combatant) in &mut self.combatants {
            let mut log = DispatchLog::new();
            let report = combatant.controller.update(
                &mut combatant.agent,
                &world,
                self.view,
                self.tick_delta_ms,
                &mut log,
            );

            events.decisions.push((*id, report.decision));
            if report.flee_ended {
                events.flee_ended.push(*id);
            }

            for dispatch in log.drain() {
                if let Dispatch::Cast { slot, target, .. } = dispatch {
                    let is_blink = combatant
                        .agent
                        .actions
                        .get(slot)
                        .is_some_and(|action| action.kind.is_blink());
                    if is_blink {
                        let landed = clamp_center(&combatant.agent.body, target, self.arena_size);
                        combatant.agent.body.set_center(landed);
                        events.blinks.push((*id, landed));
                    }
                }
                combatant.start_cooldown(dispatch.slot());
                events.dispatches.push(dispatch);
            }
        }

        for combatant in self.combatants.values_mut() {
            combatant.tick_cooldowns(dt_secs);
            integrate_body(&mut combatant.agent.body, dt_secs, self.arena_size);
        }

        #[cfg(feature = "debug-validation")]
        for agent in self.agents() {
            if !(agent.body.position.is_finite() && agent.body.velocity.is_finite()) {
                tracing::warn!(agent = agent.id, body = ?agent.body, "Non-finite body state");
            }
        }

        self.tick += 1;
        events.tick = self.tick;

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::trace!(tick = self.tick, state_hash = hash, "Arena state hash");
        }

        events
    }

    /// Controller state of every agent, keyed by id.
    #[must_use]
    pub fn debug_snapshots(&self) -> BTreeMap<AgentId, BrainSnapshot> {
        self.combatants
            .iter()
            .map(|(id, c)| (*id, c.controller.snapshot()))
            .collect()
    }

    /// Hash of the observable arena state.
    ///
    /// Two arenas with identical state produce identical hashes.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.tick.hash(&mut hasher);
        self.combatants.len().hash(&mut hasher);

        for (id, combatant) in &self.combatants {
            id.hash(&mut hasher);

            let body = &combatant.agent.body;
            for value in [
                body.position.x,
                body.position.y,
                body.velocity.x,
                body.velocity.y,
                body.acceleration.x,
                body.acceleration.y,
                combatant.agent.rotation,
            ] {
                value.to_bits().hash(&mut hasher);
            }

            for (slot, action) in combatant.agent.actions.iter() {
                slot.hash(&mut hasher);
                action.ready.hash(&mut hasher);
            }

            let brain = combatant.controller.snapshot();
            brain.fleeing.hash(&mut hasher);
            brain.wander_angle.to_bits().hash(&mut hasher);
            brain.last_decision.hash(&mut hasher);
        }

        hasher.finish()
    }

    /// Serialize the arena for snapshots.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| ArenaError::InvalidState(format!("Failed to serialize arena: {e}")))
    }

    /// Restore an arena from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data)
            .map_err(|e| ArenaError::InvalidState(format!("Failed to deserialize arena: {e}")))
    }

    /// Per-agent seed: the match seed mixed with the agent id.
    fn controller_seed(&self, id: AgentId) -> u64 {
        self.seed ^ u64::from(id).wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }
}

/// Center that keeps `body` inside the arena when placed at `center`.
fn clamp_center(body: &Body, center: Vec2, arena_size: Vec2) -> Vec2 {
    let half = body.size.scale(0.5);
    Vec2::new(
        center.x.clamp(half.x, (arena_size.x - half.x).max(half.x)),
        center.y.clamp(half.y, (arena_size.y - half.y).max(half.y)),
    )
}
