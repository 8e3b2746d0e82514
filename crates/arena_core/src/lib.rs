//! # Arena Core
//!
//! Combat decision and steering core for arena shooter bots.
//!
//! Each tick a bot perceives nearby opponents, picks between attacking,
//! repositioning, fleeing and wandering, predicts an intercept point and
//! issues a fire or cast request. This crate contains only that logic:
//! - No rendering
//! - No IO
//! - No system randomness (every draw goes through a seeded [`rng::CombatRng`])
//!
//! Fire/cast requests leave the core through [`attack::ActionDispatcher`];
//! movement leaves it as an acceleration and a rotation on the agent's body.
//!
//! ## Crate Structure
//!
//! - [`steering`] - Seek, flee, pursuit, evade, wander, arrival, limiter
//! - [`perception`] - View set and hittable set
//! - [`timing`] - Stochastic trigger and flee gates
//! - [`targeting`] - Uniform target and action sampling
//! - [`behavior`] - Per-tick decision tree
//! - [`attack`] - Intercept prediction and dispatch
//! - [`movement`] - Force accumulation and body integration
//! - [`controller`] - Per-agent AI tick
//! - [`data`] - Action catalog and AI profiles (RON)
//! - [`simulation`] - Headless arena host

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod actions;
pub mod agent;
pub mod attack;
pub mod behavior;
pub mod components;
pub mod controller;
pub mod data;
pub mod error;
pub mod math;
pub mod movement;
pub mod perception;
pub mod rng;
pub mod simulation;
pub mod steering;
pub mod targeting;
pub mod timing;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::actions::{
        AbilityEffect, Action, ActionKind, ActionRegistry, ActionSlot, Travel,
    };
    pub use crate::agent::{Agent, AgentSnapshot};
    pub use crate::attack::{ActionDispatcher, Dispatch, DispatchLog};
    pub use crate::behavior::{Decision, DecisionSelector};
    pub use crate::components::{AgentId, Body, StatusFlags};
    pub use crate::controller::{AiController, BrainSnapshot, TickReport};
    pub use crate::data::{ActionCatalog, AiProfile, Loadout, WanderConfig, PRESET_NAMES};
    pub use crate::error::{ArenaError, Result};
    pub use crate::math::Vec2;
    pub use crate::perception::{PerceivedOpponent, ViewRect};
    pub use crate::rng::{CombatRng, UniformRange};
    pub use crate::simulation::{AgentSpawnParams, ArenaSimulation, TickEvents};
    pub use crate::steering::{
        arrival_steer, evade, facing, flee, limit, pursuit, seek, wander, SteeringAccumulator,
        SteeringBehaviour, WanderState,
    };
}
