//! Per-bot AI tuning.
//!
//! A profile fixes everything that makes one bot play differently from
//! another: how it roams, how well it aims, how jumpy it is in a fight and
//! what it carries. Nine presets ship with the crate; custom profiles load
//! from RON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::actions::{ActionRegistry, ActionSlot, DEFAULT_TRIGGER_WINDOW};
use crate::data::ActionCatalog;
use crate::error::{ArenaError, Result};
use crate::rng::UniformRange;
use crate::steering::WanderState;

/// Default flee duration (seconds).
pub const DEFAULT_FLEE_DURATION: UniformRange = UniformRange::new(1.0, 3.0);

/// Default flee trigger window (ratio, compared against the frame delta).
pub const DEFAULT_FLEE_TRIGGER: UniformRange = UniformRange::new(2.0, 6.0);

/// Default repositioning angle (degrees).
pub const DEFAULT_REPOSITION_ANGLE: UniformRange = UniformRange::new(-45.0, 45.0);

/// Wander circle parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WanderConfig {
    /// Radius of the wander circle.
    pub radial_mag: f32,
    /// Distance of the circle ahead of the body.
    pub distance_extension: f32,
    /// Largest angle change per wander step (radians).
    pub variance: f32,
}

impl WanderConfig {
    /// Fresh wander state starting at angle 0.
    #[must_use]
    pub fn state(&self) -> WanderState {
        WanderState::new(self.radial_mag, self.distance_extension, self.variance)
    }
}

/// Catalog names bound to each slot. Empty slots stay unbound.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loadout {
    /// Main weapon.
    #[serde(default)]
    pub weapon_primary: Option<String>,
    /// Backup weapon.
    #[serde(default)]
    pub weapon_secondary: Option<String>,
    /// First ability.
    #[serde(default)]
    pub ability_1: Option<String>,
    /// Second ability.
    #[serde(default)]
    pub ability_2: Option<String>,
    /// Third ability.
    #[serde(default)]
    pub ability_3: Option<String>,
    /// Fourth ability.
    #[serde(default)]
    pub ability_4: Option<String>,
}

impl Loadout {
    /// The stock kit: two guns plus arrow, flame, blink and root.
    #[must_use]
    pub fn standard(primary: &str, secondary: &str) -> Self {
        Self {
            weapon_primary: Some(primary.to_string()),
            weapon_secondary: Some(secondary.to_string()),
            ability_1: Some("charged_arrow".to_string()),
            ability_2: Some("flame".to_string()),
            ability_3: Some("blink".to_string()),
            ability_4: Some("root_tip".to_string()),
        }
    }

    /// Bound slots with their catalog names, in slot order.
    #[must_use]
    pub fn slots(&self) -> Vec<(ActionSlot, &str)> {
        let named = [
            (ActionSlot::WeaponPrimary, &self.weapon_primary),
            (ActionSlot::WeaponSecondary, &self.weapon_secondary),
            (ActionSlot::Ability1, &self.ability_1),
            (ActionSlot::Ability2, &self.ability_2),
            (ActionSlot::Ability3, &self.ability_3),
            (ActionSlot::Ability4, &self.ability_4),
        ];
        named
            .into_iter()
            .filter_map(|(slot, name)| name.as_deref().map(|name| (slot, name)))
            .collect()
    }
}

/// Everything that tunes one bot.
///
/// # Example RON
///
/// ```ron
/// AiProfile(
///     id: "sniper",
///     wander: WanderConfig(radial_mag: 200.0, distance_extension: 100.0, variance: 0.1),
///     precision_handicap: 4.0,
///     flee_duration: (min: 0.5, max: 1.5),
///     loadout: Loadout(weapon_primary: Some("revolver")),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiProfile {
    /// Profile identifier.
    pub id: String,
    /// Roaming parameters.
    pub wander: WanderConfig,
    /// Aim error scale in degrees. Zero is perfect aim.
    pub precision_handicap: f32,
    /// How long a flee lasts (seconds).
    #[serde(default = "default_flee_duration")]
    pub flee_duration: UniformRange,
    /// Ratio window of the random flee roll.
    #[serde(default = "default_flee_trigger")]
    pub flee_trigger: UniformRange,
    /// Angle offset applied when circling a target (degrees).
    #[serde(default = "default_reposition_angle")]
    pub reposition_angle: UniformRange,
    /// Trigger windows overriding the default per slot.
    #[serde(default)]
    pub trigger_windows: BTreeMap<ActionSlot, UniformRange>,
    /// Carried weapons and abilities.
    #[serde(default)]
    pub loadout: Loadout,
}

const fn default_flee_duration() -> UniformRange {
    DEFAULT_FLEE_DURATION
}

const fn default_flee_trigger() -> UniformRange {
    DEFAULT_FLEE_TRIGGER
}

const fn default_reposition_angle() -> UniformRange {
    DEFAULT_REPOSITION_ANGLE
}

/// Names accepted by [`AiProfile::preset`].
pub const PRESET_NAMES: [&str; 9] = [
    "bot_1", "bot_2", "bot_3", "bot_4", "bot_5", "bot_6", "bot_7", "bot_8", "bot_9",
];

impl AiProfile {
    /// Create a profile with default combat timing and an empty loadout.
    #[must_use]
    pub fn new(id: impl Into<String>, wander: WanderConfig, precision_handicap: f32) -> Self {
        Self {
            id: id.into(),
            wander,
            precision_handicap,
            flee_duration: DEFAULT_FLEE_DURATION,
            flee_trigger: DEFAULT_FLEE_TRIGGER,
            reposition_angle: DEFAULT_REPOSITION_ANGLE,
            trigger_windows: BTreeMap::new(),
            loadout: Loadout::default(),
        }
    }

    /// Builder method to set the loadout.
    #[must_use]
    pub fn with_loadout(mut self, loadout: Loadout) -> Self {
        self.loadout = loadout;
        self
    }

    /// Builder method to override one slot's trigger window.
    #[must_use]
    pub fn with_trigger_window(mut self, slot: ActionSlot, window: UniformRange) -> Self {
        self.trigger_windows.insert(slot, window);
        self
    }

    /// Builder method to set the flee ranges.
    #[must_use]
    pub fn with_flee(mut self, duration: UniformRange, trigger: UniformRange) -> Self {
        self.flee_duration = duration;
        self.flee_trigger = trigger;
        self
    }

    /// Builder method to set the repositioning angle range.
    #[must_use]
    pub fn with_reposition_angle(mut self, angle: UniformRange) -> Self {
        self.reposition_angle = angle;
        self
    }

    /// Look up a built-in preset.
    pub fn preset(name: &str) -> Result<Self> {
        let (wander, handicap, primary, secondary) = match name {
            "bot_1" => ((200.0, 100.0, 0.1), 14.0, "pistol", "ak47"),
            "bot_2" => ((100.0, 150.0, 0.01), 14.0, "p90", "ak47"),
            "bot_3" => ((300.0, 200.0, 0.03), 14.0, "revolver", "thompson"),
            "bot_4" => ((400.0, 600.0, 0.004), 18.0, "pistol", "ak47"),
            "bot_5" => ((100.0, 100.0, 0.005), 5.0, "pistol", "ak47"),
            "bot_6" => ((400.0, 500.0, 0.03), 20.0, "pistol", "ak47"),
            "bot_7" => ((189.0, 170.0, 0.05), 30.0, "pistol", "ak47"),
            "bot_8" => ((400.0, 300.0, 0.1), 28.0, "pistol", "ak47"),
            "bot_9" => ((1000.0, 200.0, 0.01), 10.0, "pistol", "ak47"),
            _ => return Err(ArenaError::UnknownProfile(name.to_string())),
        };
        let (radial_mag, distance_extension, variance) = wander;

        Ok(Self::new(
            name,
            WanderConfig {
                radial_mag,
                distance_extension,
                variance,
            },
            handicap,
        )
        .with_loadout(Loadout::standard(primary, secondary)))
    }

    /// All built-in presets in name order.
    #[must_use]
    pub fn presets() -> Vec<Self> {
        PRESET_NAMES
            .iter()
            .filter_map(|name| Self::preset(name).ok())
            .collect()
    }

    /// Parse and validate a profile from RON.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        let profile: Self = ron::from_str(source).map_err(|e| ArenaError::DataParseError {
            what: "AI profile".to_string(),
            message: e.to_string(),
        })?;
        profile.ensure_valid()?;
        Ok(profile)
    }

    /// Trigger window for `slot`: the override, else the default.
    #[must_use]
    pub fn trigger_window(&self, slot: ActionSlot) -> UniformRange {
        self.trigger_windows
            .get(&slot)
            .copied()
            .unwrap_or(DEFAULT_TRIGGER_WINDOW)
    }

    /// Check every tuning value. Returns a list of problems.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let non_negative = |value: f32| value.is_finite() && value >= 0.0;
        if !non_negative(self.wander.radial_mag) {
            errors.push(format!("wander.radial_mag must be >= 0, got {}", self.wander.radial_mag));
        }
        if !non_negative(self.wander.distance_extension) {
            errors.push(format!(
                "wander.distance_extension must be >= 0, got {}",
                self.wander.distance_extension
            ));
        }
        if !non_negative(self.wander.variance) {
            errors.push(format!("wander.variance must be >= 0, got {}", self.wander.variance));
        }
        if !non_negative(self.precision_handicap) {
            errors.push(format!("precision_handicap must be >= 0, got {}", self.precision_handicap));
        }

        let mut check_range = |field: String, range: UniformRange, allow_negative: bool| {
            if !range.is_ordered() {
                errors.push(format!("{field} must be finite with min <= max, got {range:?}"));
            } else if !allow_negative && range.min < 0.0 {
                errors.push(format!("{field} must not be negative, got {range:?}"));
            }
        };
        check_range("flee_duration".to_string(), self.flee_duration, false);
        check_range("flee_trigger".to_string(), self.flee_trigger, false);
        check_range("reposition_angle".to_string(), self.reposition_angle, true);
        for (slot, window) in &self.trigger_windows {
            check_range(format!("trigger_windows.{slot:?}"), *window, false);
        }

        errors
    }

    /// [`validate`](Self::validate) as a `Result`.
    pub fn ensure_valid(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ArenaError::invalid_config(
                format!("profile.{}", self.id),
                errors.join("; "),
            ))
        }
    }

    /// Resolve the loadout against `catalog`, applying trigger windows.
    pub fn build_actions(&self, catalog: &ActionCatalog) -> Result<ActionRegistry> {
        let mut registry = ActionRegistry::new();
        for (slot, name) in self.loadout.slots() {
            let data = catalog.get(name).ok_or_else(|| ArenaError::UnknownAction {
                slot,
                name: name.to_string(),
            })?;
            registry.insert(slot, data.to_action(self.trigger_window(slot)));
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        let presets = AiProfile::presets();
        assert_eq!(presets.len(), PRESET_NAMES.len());
        for profile in &presets {
            let errors = profile.validate();
            assert!(errors.is_empty(), "{}: {errors:?}", profile.id);
        }
    }

    #[test]
    fn test_preset_values() {
        let bot = AiProfile::preset("bot_4").expect("known preset");
        assert_eq!(bot.wander.radial_mag, 400.0);
        assert_eq!(bot.wander.distance_extension, 600.0);
        assert_eq!(bot.wander.variance, 0.004);
        assert_eq!(bot.precision_handicap, 18.0);

        let bot = AiProfile::preset("bot_3").expect("known preset");
        assert_eq!(bot.loadout.weapon_primary.as_deref(), Some("revolver"));
        assert_eq!(bot.loadout.weapon_secondary.as_deref(), Some("thompson"));
    }

    #[test]
    fn test_unknown_preset() {
        assert!(matches!(
            AiProfile::preset("bot_10"),
            Err(ArenaError::UnknownProfile(name)) if name == "bot_10"
        ));
    }

    #[test]
    fn test_validate_rejects_bad_ranges() {
        let mut profile = AiProfile::preset("bot_1").expect("known preset");
        profile.flee_duration = UniformRange::new(3.0, 1.0);
        profile.precision_handicap = -1.0;
        profile.trigger_windows.insert(ActionSlot::Ability1, UniformRange::new(-0.5, 1.0));

        let errors = profile.validate();
        assert_eq!(errors.len(), 3, "{errors:?}");
        assert!(matches!(profile.ensure_valid(), Err(ArenaError::InvalidConfig { .. })));
    }

    #[test]
    fn test_negative_reposition_angle_allowed() {
        let profile = AiProfile::preset("bot_1")
            .expect("known preset")
            .with_reposition_angle(UniformRange::new(-90.0, -10.0));
        assert!(profile.validate().is_empty());
    }

    #[test]
    fn test_build_actions_applies_windows() {
        let window = UniformRange::new(0.1, 0.2);
        let profile = AiProfile::preset("bot_1")
            .expect("known preset")
            .with_trigger_window(ActionSlot::WeaponSecondary, window);
        let registry = profile
            .build_actions(&ActionCatalog::standard())
            .expect("stock loadout resolves");

        assert_eq!(registry.len(), 6);
        assert_eq!(registry.get(ActionSlot::WeaponSecondary).map(|a| a.trigger_window), Some(window));
        assert_eq!(
            registry.get(ActionSlot::WeaponPrimary).map(|a| a.trigger_window),
            Some(DEFAULT_TRIGGER_WINDOW)
        );
        assert!(registry.get(ActionSlot::Ability3).is_some_and(|a| a.kind.is_blink()));
    }

    #[test]
    fn test_build_actions_unknown_name() {
        let profile = AiProfile::new(
            "custom",
            WanderConfig {
                radial_mag: 10.0,
                distance_extension: 10.0,
                variance: 0.1,
            },
            0.0,
        )
        .with_loadout(Loadout {
            weapon_primary: Some("railgun".to_string()),
            ..Loadout::default()
        });

        assert!(matches!(
            profile.build_actions(&ActionCatalog::standard()),
            Err(ArenaError::UnknownAction { slot: ActionSlot::WeaponPrimary, .. })
        ));
    }

    #[test]
    fn test_parse_ron_profile() {
        let source = r#"
            AiProfile(
                id: "sniper",
                wander: WanderConfig(radial_mag: 200.0, distance_extension: 100.0, variance: 0.1),
                precision_handicap: 4.0,
                flee_duration: (min: 0.5, max: 1.5),
                trigger_windows: { WeaponPrimary: (min: 0.2, max: 0.6) },
                loadout: Loadout(weapon_primary: Some("revolver")),
            )
        "#;
        let profile = AiProfile::from_ron_str(source).expect("valid profile");
        assert_eq!(profile.id, "sniper");
        assert_eq!(profile.flee_duration, UniformRange::new(0.5, 1.5));
        assert_eq!(profile.flee_trigger, DEFAULT_FLEE_TRIGGER);
        assert_eq!(profile.trigger_window(ActionSlot::WeaponPrimary), UniformRange::new(0.2, 0.6));
        assert_eq!(profile.loadout.slots(), vec![(ActionSlot::WeaponPrimary, "revolver")]);
    }

    #[test]
    fn test_parse_rejects_invalid_profile() {
        let source = r#"
            AiProfile(
                id: "broken",
                wander: WanderConfig(radial_mag: 200.0, distance_extension: 100.0, variance: 0.1),
                precision_handicap: 4.0,
                flee_trigger: (min: 5.0, max: 1.0),
            )
        "#;
        assert!(matches!(
            AiProfile::from_ron_str(source),
            Err(ArenaError::InvalidConfig { .. })
        ));
    }
}
