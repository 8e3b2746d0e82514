//! Weapons, abilities and the per-agent action registry.
//!
//! An agent carries up to six actions, one per [`ActionSlot`]. Readiness is
//! owned by the host (cooldown tracking); the AI core only reads it and
//! invokes fire/cast through an [`ActionDispatcher`](crate::attack::ActionDispatcher).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::rng::UniformRange;

/// Loadout slot an action is bound to. Acts as the action key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActionSlot {
    /// Main weapon.
    WeaponPrimary,
    /// Backup weapon.
    WeaponSecondary,
    /// First ability.
    Ability1,
    /// Second ability.
    Ability2,
    /// Third ability.
    Ability3,
    /// Fourth ability.
    Ability4,
}

impl ActionSlot {
    /// All slots in registry order.
    pub const ALL: [ActionSlot; 6] = [
        ActionSlot::WeaponPrimary,
        ActionSlot::WeaponSecondary,
        ActionSlot::Ability1,
        ActionSlot::Ability2,
        ActionSlot::Ability3,
        ActionSlot::Ability4,
    ];

    /// Check if this slot holds a weapon.
    #[must_use]
    pub const fn is_weapon_slot(self) -> bool {
        matches!(self, Self::WeaponPrimary | Self::WeaponSecondary)
    }
}

/// What an ability does when cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityEffect {
    /// Teleports the caster.
    Blink,
    /// Spawns a projectile at the target point.
    Projectile,
    /// Fires a projectile from the caster toward the target point.
    ProjectileWithRotation,
}

/// Weapon or ability, with the data the attack path needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Fired with `fire_weapon`.
    Weapon,
    /// Cast with `cast_ability`.
    Ability(AbilityEffect),
}

impl ActionKind {
    /// Check if this is a blink-style self displacement.
    #[must_use]
    pub const fn is_blink(self) -> bool {
        matches!(self, Self::Ability(AbilityEffect::Blink))
    }
}

/// How long an action takes to reach its target.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Travel {
    /// Lands the same frame.
    #[default]
    Instant,
    /// Projectile flying at a constant speed (units per second).
    Speed(f32),
    /// Effect that lands after a fixed delay (seconds).
    Delay(f32),
}

impl Travel {
    /// Seconds until the action reaches a target `distance` away.
    #[must_use]
    pub fn time_to_reach(self, distance: f32) -> f32 {
        match self {
            Travel::Speed(speed) if speed > 0.0 => distance / speed,
            Travel::Delay(delay) => delay,
            Travel::Speed(_) | Travel::Instant => 0.0,
        }
    }
}

/// A weapon or ability bound to an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Catalog name (e.g. "pistol", "blink").
    pub name: String,
    /// Weapon or ability variant.
    pub kind: ActionKind,
    /// Reach of the action's range circle.
    pub range_distance: f32,
    /// Cooldown between uses (seconds).
    pub cooldown_delay: f32,
    /// Time-to-target model used for lead prediction.
    pub travel: Travel,
    /// Ratio window gating when a ready action actually fires.
    pub trigger_window: UniformRange,
    /// Host-maintained readiness flag.
    pub ready: bool,
}

/// Default trigger window applied when a profile does not override it.
pub const DEFAULT_TRIGGER_WINDOW: UniformRange = UniformRange::new(0.5, 1.5);

impl Action {
    /// Create a ready weapon.
    #[must_use]
    pub fn weapon(name: impl Into<String>, range_distance: f32, cooldown_delay: f32) -> Self {
        Self {
            name: name.into(),
            kind: ActionKind::Weapon,
            range_distance,
            cooldown_delay,
            travel: Travel::Instant,
            trigger_window: DEFAULT_TRIGGER_WINDOW,
            ready: true,
        }
    }

    /// Create a ready ability.
    #[must_use]
    pub fn ability(
        name: impl Into<String>,
        effect: AbilityEffect,
        range_distance: f32,
        cooldown_delay: f32,
    ) -> Self {
        Self {
            kind: ActionKind::Ability(effect),
            ..Self::weapon(name, range_distance, cooldown_delay)
        }
    }

    /// Builder method to set the travel model.
    #[must_use]
    pub fn with_travel(mut self, travel: Travel) -> Self {
        self.travel = travel;
        self
    }

    /// Builder method to set the trigger window.
    #[must_use]
    pub fn with_trigger_window(mut self, window: UniformRange) -> Self {
        self.trigger_window = window;
        self
    }

    /// Builder method to set readiness.
    #[must_use]
    pub fn with_ready(mut self, ready: bool) -> Self {
        self.ready = ready;
        self
    }

    /// Check if `distance` falls inside the range circle (inclusive).
    #[must_use]
    pub fn in_range(&self, distance: f32) -> bool {
        distance <= self.range_distance
    }
}

/// Slot-keyed action storage with deterministic iteration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionRegistry {
    actions: BTreeMap<ActionSlot, Action>,
}

impl ActionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to bind an action to a slot.
    #[must_use]
    pub fn with(mut self, slot: ActionSlot, action: Action) -> Self {
        self.insert(slot, action);
        self
    }

    /// Bind an action, returning whatever occupied the slot.
    pub fn insert(&mut self, slot: ActionSlot, action: Action) -> Option<Action> {
        self.actions.insert(slot, action)
    }

    /// Look up an action.
    #[must_use]
    pub fn get(&self, slot: ActionSlot) -> Option<&Action> {
        self.actions.get(&slot)
    }

    /// Look up an action mutably.
    pub fn get_mut(&mut self, slot: ActionSlot) -> Option<&mut Action> {
        self.actions.get_mut(&slot)
    }

    /// Set the readiness flag. Returns `false` if the slot is empty.
    pub fn set_ready(&mut self, slot: ActionSlot, ready: bool) -> bool {
        match self.actions.get_mut(&slot) {
            Some(action) => {
                action.ready = ready;
                true
            }
            None => false,
        }
    }

    /// Slots whose action is currently ready, in slot order.
    #[must_use]
    pub fn ready_slots(&self) -> Vec<ActionSlot> {
        self.actions
            .iter()
            .filter(|(_, action)| action.ready)
            .map(|(slot, _)| *slot)
            .collect()
    }

    /// Ready slots paired with their range, longest range first.
    ///
    /// Ties keep slot order.
    #[must_use]
    pub fn ready_by_range(&self) -> Vec<(ActionSlot, f32)> {
        let mut ranked: Vec<(ActionSlot, f32)> = self
            .actions
            .iter()
            .filter(|(_, action)| action.ready)
            .map(|(slot, action)| (*slot, action.range_distance))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    /// Iterate over bound actions in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&ActionSlot, &Action)> {
        self.actions.iter()
    }

    /// Number of bound actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Check if no action is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
