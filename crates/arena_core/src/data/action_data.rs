//! Weapon and ability definitions.

use serde::{Deserialize, Serialize};

use crate::actions::{AbilityEffect, Action, ActionKind, Travel};
use crate::error::{ArenaError, Result};
use crate::rng::UniformRange;

/// Blink reach in world units.
pub const BLINK_DISTANCE: f32 = 500.0;

/// Blink cooldown in seconds.
pub const BLINK_COOLDOWN: f32 = 10.0;

/// Ballistic parameters of a projectile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileData {
    /// Flight speed (units per second).
    pub speed: f32,
    /// Seconds before the projectile despawns.
    pub lifespan: f32,
}

impl ProjectileData {
    /// Furthest point the projectile reaches.
    #[must_use]
    pub fn reach(&self) -> f32 {
        self.speed * self.lifespan
    }
}

/// Data-driven action definition.
///
/// # Example RON
///
/// ```ron
/// ActionData(
///     name: "pistol",
///     kind: Weapon,
///     cooldown_delay: 0.4,
///     projectile: Some(ProjectileData(speed: 800.0, lifespan: 0.5)),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionData {
    /// Catalog name referenced by loadouts.
    pub name: String,
    /// Weapon or ability variant.
    pub kind: ActionKind,
    /// Cooldown between uses (seconds).
    pub cooldown_delay: f32,
    /// Explicit reach. Falls back to the projectile reach when absent.
    #[serde(default)]
    pub range: Option<f32>,
    /// Projectile fired by the action, if any.
    #[serde(default)]
    pub projectile: Option<ProjectileData>,
    /// Delay before a placed effect lands (seconds).
    #[serde(default)]
    pub trigger_after: Option<f32>,
}

impl ActionData {
    /// Reach of the action's range circle.
    #[must_use]
    pub fn range_distance(&self) -> f32 {
        self.range
            .or_else(|| self.projectile.map(|p| p.reach()))
            .unwrap_or(0.0)
    }

    /// Time-to-target model. Projectile speed takes precedence over a
    /// trigger delay.
    #[must_use]
    pub fn travel(&self) -> Travel {
        match (self.projectile, self.trigger_after) {
            (Some(projectile), _) => Travel::Speed(projectile.speed),
            (None, Some(delay)) => Travel::Delay(delay),
            (None, None) => Travel::Instant,
        }
    }

    /// Build a ready [`Action`] gated by `trigger_window`.
    #[must_use]
    pub fn to_action(&self, trigger_window: UniformRange) -> Action {
        Action {
            name: self.name.clone(),
            kind: self.kind,
            range_distance: self.range_distance(),
            cooldown_delay: self.cooldown_delay,
            travel: self.travel(),
            trigger_window,
            ready: true,
        }
    }

    /// Check numeric fields. Returns a list of problems.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !(self.cooldown_delay.is_finite() && self.cooldown_delay >= 0.0) {
            errors.push(format!("Action '{}' has invalid cooldown {}", self.name, self.cooldown_delay));
        }
        if let Some(range) = self.range {
            if !(range.is_finite() && range >= 0.0) {
                errors.push(format!("Action '{}' has invalid range {range}", self.name));
            }
        }
        if let Some(projectile) = self.projectile {
            if !(projectile.speed.is_finite() && projectile.speed > 0.0) {
                errors.push(format!("Action '{}' has invalid projectile speed {}", self.name, projectile.speed));
            }
            if !(projectile.lifespan.is_finite() && projectile.lifespan >= 0.0) {
                errors.push(format!(
                    "Action '{}' has invalid projectile lifespan {}",
                    self.name, projectile.lifespan
                ));
            }
        }
        if let Some(delay) = self.trigger_after {
            if !(delay.is_finite() && delay >= 0.0) {
                errors.push(format!("Action '{}' has invalid trigger delay {delay}", self.name));
            }
        }
        if self.range.is_none() && self.projectile.is_none() && !self.kind.is_blink() {
            errors.push(format!("Action '{}' has neither a range nor a projectile", self.name));
        }

        errors
    }
}

/// Named action definitions that loadouts draw from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionCatalog {
    /// All definitions. Names are unique.
    pub actions: Vec<ActionData>,
}

impl ActionCatalog {
    /// The stock arsenal: five guns and four abilities.
    #[must_use]
    pub fn standard() -> Self {
        let gun = |name: &str, cooldown_delay: f32, speed: f32, lifespan: f32| ActionData {
            name: name.to_string(),
            kind: ActionKind::Weapon,
            cooldown_delay,
            range: None,
            projectile: Some(ProjectileData { speed, lifespan }),
            trigger_after: None,
        };

        Self {
            actions: vec![
                gun("pistol", 0.4, 800.0, 0.5),
                gun("ak47", 0.1, 1000.0, 0.6),
                gun("p90", 0.07, 900.0, 0.45),
                gun("revolver", 0.8, 1100.0, 0.6),
                gun("thompson", 0.09, 850.0, 0.55),
                ActionData {
                    name: "charged_arrow".to_string(),
                    kind: ActionKind::Ability(AbilityEffect::ProjectileWithRotation),
                    cooldown_delay: 3.0,
                    range: None,
                    projectile: Some(ProjectileData {
                        speed: 1200.0,
                        lifespan: 0.8,
                    }),
                    trigger_after: None,
                },
                ActionData {
                    name: "flame".to_string(),
                    kind: ActionKind::Ability(AbilityEffect::Projectile),
                    cooldown_delay: 5.0,
                    range: Some(300.0),
                    projectile: None,
                    trigger_after: Some(0.3),
                },
                ActionData {
                    name: "blink".to_string(),
                    kind: ActionKind::Ability(AbilityEffect::Blink),
                    cooldown_delay: BLINK_COOLDOWN,
                    range: Some(BLINK_DISTANCE),
                    projectile: None,
                    trigger_after: None,
                },
                ActionData {
                    name: "root_tip".to_string(),
                    kind: ActionKind::Ability(AbilityEffect::Projectile),
                    cooldown_delay: 8.0,
                    range: Some(450.0),
                    projectile: None,
                    trigger_after: Some(1.0),
                },
            ],
        }
    }

    /// Parse a catalog from RON.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        let catalog: Self = ron::from_str(source).map_err(|e| ArenaError::DataParseError {
            what: "action catalog".to_string(),
            message: e.to_string(),
        })?;

        let errors = catalog.validate();
        if !errors.is_empty() {
            return Err(ArenaError::invalid_config("actions", errors.join("; ")));
        }
        Ok(catalog)
    }

    /// Look up a definition by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ActionData> {
        self.actions.iter().find(|a| a.name == name)
    }

    /// Names in catalog order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(|a| a.name.as_str())
    }

    /// Check every definition and name uniqueness.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors: Vec<String> = self.actions.iter().flat_map(ActionData::validate).collect();

        for (index, action) in self.actions.iter().enumerate() {
            if self.actions[..index].iter().any(|a| a.name == action.name) {
                errors.push(format!("Duplicate action '{}'", action.name));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_from_projectile() {
        let catalog = ActionCatalog::standard();
        let pistol = catalog.get("pistol").expect("stock pistol");
        assert!((pistol.range_distance() - 400.0).abs() < 1e-3);
        assert_eq!(pistol.travel(), Travel::Speed(800.0));
    }

    #[test]
    fn test_explicit_range_and_delay() {
        let catalog = ActionCatalog::standard();
        let flame = catalog.get("flame").expect("stock flame");
        assert_eq!(flame.range_distance(), 300.0);
        assert_eq!(flame.travel(), Travel::Delay(0.3));

        let blink = catalog.get("blink").expect("stock blink");
        assert_eq!(blink.travel(), Travel::Instant);
        assert!(blink.kind.is_blink());
    }

    #[test]
    fn test_standard_catalog_is_valid() {
        let catalog = ActionCatalog::standard();
        let errors = catalog.validate();
        assert!(errors.is_empty(), "Errors: {errors:?}");
        assert_eq!(catalog.names().count(), 9);
    }

    #[test]
    fn test_to_action() {
        let catalog = ActionCatalog::standard();
        let window = UniformRange::new(0.2, 0.4);
        let action = catalog.get("ak47").expect("stock ak47").to_action(window);
        assert_eq!(action.trigger_window, window);
        assert!(action.ready);
        assert_eq!(action.kind, ActionKind::Weapon);
    }

    #[test]
    fn test_parse_ron_catalog() {
        let source = r#"
            ActionCatalog(
                actions: [
                    ActionData(
                        name: "shotgun",
                        kind: Weapon,
                        cooldown_delay: 1.2,
                        projectile: Some(ProjectileData(speed: 600.0, lifespan: 0.3)),
                    ),
                    ActionData(
                        name: "mine",
                        kind: Ability(Projectile),
                        cooldown_delay: 6.0,
                        range: Some(250.0),
                        trigger_after: Some(0.5),
                    ),
                ],
            )
        "#;
        let catalog = ActionCatalog::from_ron_str(source).expect("valid catalog");
        assert_eq!(catalog.actions.len(), 2);
        assert!((catalog.get("shotgun").map(ActionData::range_distance).unwrap_or(0.0) - 180.0).abs() < 1e-3);
    }

    #[test]
    fn test_rejects_bad_catalog() {
        assert!(matches!(
            ActionCatalog::from_ron_str("not ron"),
            Err(ArenaError::DataParseError { .. })
        ));

        let mut catalog = ActionCatalog::standard();
        catalog.actions.push(catalog.actions[0].clone());
        catalog.actions[1].cooldown_delay = -1.0;
        let errors = catalog.validate();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.contains("Duplicate")));
    }
}
