//! Scenario loading and configuration.
//!
//! Scenarios define the starting arena for headless runs: arena size, view
//! rectangle, frame delta and the combatants with their AI profiles.

use std::path::Path;

use arena_core::data::{ActionCatalog, AiProfile};
use arena_core::error::ArenaError;
use arena_core::math::Vec2;
use arena_core::perception::{ViewRect, DEFAULT_VIEW_HEIGHT, DEFAULT_VIEW_WIDTH};
use arena_core::simulation::{AgentSpawnParams, ArenaSimulation, DEFAULT_ARENA_SIZE, TICK_DURATION_MS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// A combatant names neither a preset nor an inline profile.
    #[error("Combatant {index} has no preset or profile")]
    MissingProfile {
        /// Position in the combatant list.
        index: usize,
    },
    /// The arena rejected the setup.
    #[error("Invalid scenario: {0}")]
    Invalid(#[from] ArenaError),
}

/// One bot placed in the arena.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatantSetup {
    /// Display name. Defaults to the profile id.
    #[serde(default)]
    pub name: Option<String>,
    /// Stock preset (`bot_1` ... `bot_9`).
    #[serde(default)]
    pub preset: Option<String>,
    /// Inline profile. Wins over `preset` when both are set.
    #[serde(default)]
    pub profile: Option<AiProfile>,
    /// Spawn center in world units.
    pub position: (f32, f32),
    /// Speed cap override.
    #[serde(default)]
    pub max_speed: Option<f32>,
}

impl CombatantSetup {
    /// Place a stock preset at `(x, y)`.
    #[must_use]
    pub fn preset(preset: &str, x: f32, y: f32) -> Self {
        Self {
            name: None,
            preset: Some(preset.to_string()),
            profile: None,
            position: (x, y),
            max_speed: None,
        }
    }

    fn resolve_profile(&self, index: usize) -> Result<AiProfile, ScenarioError> {
        match (&self.profile, &self.preset) {
            (Some(profile), _) => Ok(profile.clone()),
            (None, Some(preset)) => Ok(AiProfile::preset(preset)?),
            (None, None) => Err(ScenarioError::MissingProfile { index }),
        }
    }
}

fn default_tick_delta_ms() -> f32 {
    TICK_DURATION_MS
}

fn default_max_ticks() -> u64 {
    3600
}

/// A complete scenario configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArenaScenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Arena dimensions (width, height) in world units.
    pub arena_size: (f32, f32),
    /// View rectangle (width, height) every bot perceives through.
    pub view: (f32, f32),
    /// Frame delta fed to the controllers (milliseconds).
    #[serde(default = "default_tick_delta_ms")]
    pub tick_delta_ms: f32,
    /// Ticks a run lasts unless overridden on the command line.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,
    /// Replacement action catalog. The stock arsenal when absent.
    #[serde(default)]
    pub catalog: Option<ActionCatalog>,
    /// Bots to spawn, in id order.
    pub combatants: Vec<CombatantSetup>,
}

impl Default for ArenaScenario {
    fn default() -> Self {
        Self::duel()
    }
}

impl ArenaScenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let scenario: ArenaScenario = ron::from_str(&contents)?;
        Ok(scenario)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: ArenaScenario = ron::from_str(ron)?;
        Ok(scenario)
    }

    /// Resolve a built-in scenario by name, or load `name` as a file path.
    pub fn resolve(name: &str) -> Result<Self, ScenarioError> {
        match name {
            "duel" => Ok(Self::duel()),
            "free_for_all" | "ffa" => Ok(Self::free_for_all()),
            path => Self::load(path),
        }
    }

    /// Two bots a pistol shot apart.
    #[must_use]
    pub fn duel() -> Self {
        Self {
            name: "duel".to_string(),
            description: "Two presets starting within weapon range".to_string(),
            arena_size: (DEFAULT_ARENA_SIZE.x, DEFAULT_ARENA_SIZE.y),
            view: (DEFAULT_VIEW_WIDTH, DEFAULT_VIEW_HEIGHT),
            tick_delta_ms: TICK_DURATION_MS,
            max_ticks: default_max_ticks(),
            catalog: None,
            combatants: vec![
                CombatantSetup::preset("bot_1", 1400.0, 1600.0),
                CombatantSetup::preset("bot_2", 1800.0, 1600.0),
            ],
        }
    }

    /// Every stock preset on a ring in the middle of the arena.
    #[must_use]
    pub fn free_for_all() -> Self {
        let center = DEFAULT_ARENA_SIZE.scale(0.5);
        let names = arena_core::data::PRESET_NAMES;
        let combatants = names
            .iter()
            .enumerate()
            .map(|(index, preset)| {
                let angle = std::f32::consts::TAU * index as f32 / names.len() as f32;
                let spot = center + Vec2::from_angle(angle).scale(500.0);
                CombatantSetup::preset(preset, spot.x, spot.y)
            })
            .collect();

        Self {
            name: "free_for_all".to_string(),
            description: "All nine presets in one arena".to_string(),
            combatants,
            ..Self::duel()
        }
    }

    /// Build a simulation seeded with `seed`.
    pub fn build(&self, seed: u64) -> Result<ArenaSimulation, ScenarioError> {
        let mut sim = ArenaSimulation::new(seed)
            .with_arena_size(Vec2::new(self.arena_size.0, self.arena_size.1))
            .with_view(ViewRect::new(self.view.0, self.view.1))
            .with_tick_delta_ms(self.tick_delta_ms);
        if let Some(catalog) = &self.catalog {
            sim = sim.with_catalog(catalog.clone());
        }

        for (index, setup) in self.combatants.iter().enumerate() {
            let profile = setup.resolve_profile(index)?;
            let center = Vec2::new(setup.position.0, setup.position.1);
            let mut params = AgentSpawnParams::new(profile, center);
            if let Some(name) = &setup.name {
                params = params.with_name(name.clone());
            }
            if let Some(max_speed) = setup.max_speed {
                params = params.with_max_speed(max_speed);
            }
            sim.spawn(params)?;
        }

        Ok(sim)
    }
}
