//! Test fixtures and helpers.
//!
//! Pre-built agents, loadouts and arenas for consistent testing.

use arena_core::actions::{AbilityEffect, Action, ActionRegistry, ActionSlot, Travel};
use arena_core::agent::{Agent, AgentSnapshot};
use arena_core::components::{AgentId, Body, DEFAULT_MAX_SPEED};
use arena_core::data::{AiProfile, Loadout, WanderConfig};
use arena_core::math::Vec2;
use arena_core::rng::UniformRange;
use arena_core::simulation::{AgentSpawnParams, ArenaSimulation};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Range of [`pistol`]: 800 units/s for half a second.
pub const PISTOL_RANGE: f32 = 400.0;

/// A ready 400-unit weapon with an 800 units/s projectile.
#[must_use]
pub fn pistol() -> Action {
    Action::weapon("pistol", PISTOL_RANGE, 0.4).with_travel(Travel::Speed(800.0))
}

/// A ready weapon that always passes its trigger check.
#[must_use]
pub fn hair_trigger(name: &str, range: f32, travel: Travel) -> Action {
    Action::weapon(name, range, 0.1)
        .with_travel(travel)
        .with_trigger_window(UniformRange::fixed(0.0))
}

/// A ready blink ability.
#[must_use]
pub fn blink(range: f32) -> Action {
    Action::ability("blink", AbilityEffect::Blink, range, 10.0)
}

/// An agent centered at `center` with no loadout.
#[must_use]
pub fn agent_at(id: AgentId, center: Vec2) -> Agent {
    Agent::new(id, format!("agent_{id}"), Body::centered_at(center, DEFAULT_MAX_SPEED))
}

/// An agent centered at `center` carrying `weapon` in its primary slot.
#[must_use]
pub fn armed_agent(id: AgentId, center: Vec2, weapon: Action) -> Agent {
    agent_at(id, center).with_actions(ActionRegistry::new().with(ActionSlot::WeaponPrimary, weapon))
}

/// A stationary opponent snapshot centered at `center`.
#[must_use]
pub fn snapshot_at(id: AgentId, center: Vec2) -> AgentSnapshot {
    agent_at(id, center).snapshot()
}

/// An opponent snapshot centered at `center` moving with `velocity`.
#[must_use]
pub fn moving_snapshot(id: AgentId, center: Vec2, velocity: Vec2) -> AgentSnapshot {
    AgentSnapshot {
        id,
        body: Body::centered_at(center, DEFAULT_MAX_SPEED).with_velocity(velocity),
    }
}

/// Wander settings shared by fixture profiles.
pub const FIXTURE_WANDER: WanderConfig = WanderConfig {
    radial_mag: 150.0,
    distance_extension: 100.0,
    variance: 0.1,
};

/// A pistol/ak47 profile with no aiming error.
#[must_use]
pub fn sharpshooter(id: &str) -> AiProfile {
    AiProfile::new(id, FIXTURE_WANDER, 0.0).with_loadout(Loadout::standard("pistol", "ak47"))
}

/// Place each preset on a ring around the arena center.
///
/// # Panics
///
/// Panics if a preset name is unknown.
#[must_use]
pub fn preset_ring(seed: u64, presets: &[&str], radius: f32) -> ArenaSimulation {
    let mut sim = ArenaSimulation::new(seed);
    let middle = sim.arena_size().scale(0.5);
    let count = presets.len().max(1) as f32;

    for (index, preset) in presets.iter().enumerate() {
        let angle = std::f32::consts::TAU * index as f32 / count;
        let center = middle + Vec2::from_angle(angle).scale(radius);
        let profile = AiProfile::preset(preset).unwrap_or_else(|e| panic!("fixture preset {preset}: {e}"));
        sim.spawn(AgentSpawnParams::new(profile, center))
            .unwrap_or_else(|e| panic!("fixture spawn {preset}: {e}"));
    }

    sim
}

/// Round-trip a value through RON and return the parsed copy.
///
/// # Panics
///
/// Panics if either direction fails.
#[must_use]
pub fn ron_roundtrip<T: Serialize + DeserializeOwned>(value: &T) -> T {
    let text = ron::to_string(value).unwrap_or_else(|e| panic!("RON serialize: {e}"));
    ron::from_str(&text).unwrap_or_else(|e| panic!("RON parse of {text}: {e}"))
}
