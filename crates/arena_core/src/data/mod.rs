//! Data-driven configuration.
//!
//! Pure data types for action catalogs and AI profiles, all loadable from
//! RON. Parsing works on strings; reading files is left to the caller.

mod action_data;
mod profile_data;

pub use action_data::{ActionCatalog, ActionData, ProjectileData, BLINK_COOLDOWN, BLINK_DISTANCE};
pub use profile_data::{
    AiProfile, Loadout, WanderConfig, DEFAULT_FLEE_DURATION, DEFAULT_FLEE_TRIGGER,
    DEFAULT_REPOSITION_ANGLE, PRESET_NAMES,
};
