//! Stochastic combat timing.
//!
//! Two gates keep bots from acting on a perfect metronome:
//!
//! - [`should_trigger`] turns a ready action into a per-tick Bernoulli
//!   trial whose long-run rate is roughly `dt / (cooldown * mean_ratio)`.
//! - [`FleeWindow`] decides when an engaged bot breaks off and for how long.
//!
//! The flee expiry is a timestamp on the agent's own clock. It is checked
//! at the start of every tick; there are no timers or threads.

use serde::{Deserialize, Serialize};

use crate::actions::Action;
use crate::rng::{CombatRng, UniformRange};

/// Check if a ready action should fire this frame.
///
/// The randomized threshold is `cooldown * U(window) * U[0,1) * 2`; the
/// action fires when the threshold fits inside the frame.
pub fn should_trigger(action: &Action, frame_delta_secs: f32, rng: &mut CombatRng) -> bool {
    let ratio = rng.scaled_ratio(&action.trigger_window);
    let threshold = action.cooldown_delay * ratio;
    threshold <= frame_delta_secs
}

/// Timed "fleeing in combat" state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleeWindow {
    is_fleeing: bool,
    expires_at: Option<f64>,
    /// Seconds a flee lasts once triggered.
    pub flee_duration: UniformRange,
    /// Ratio window for the random flee roll.
    pub flee_trigger: UniformRange,
}

impl FleeWindow {
    /// Create a window that is not fleeing.
    #[must_use]
    pub fn new(flee_duration: UniformRange, flee_trigger: UniformRange) -> Self {
        Self {
            is_fleeing: false,
            expires_at: None,
            flee_duration,
            flee_trigger,
        }
    }

    /// Current flag.
    #[must_use]
    pub fn is_fleeing(&self) -> bool {
        self.is_fleeing
    }

    /// Clock time at which the pending flee ends, if any.
    #[must_use]
    pub fn expires_at(&self) -> Option<f64> {
        self.expires_at
    }

    /// Clear the flag if its expiry has passed. Returns `true` on the tick
    /// the flee ends.
    pub fn expire(&mut self, now: f64) -> bool {
        match self.expires_at {
            Some(at) if now >= at => {
                self.is_fleeing = false;
                self.expires_at = None;
                true
            }
            _ => false,
        }
    }

    /// Roll the flee gate for this tick. Returns `true` if a flee was
    /// (re)scheduled.
    ///
    /// The condition is `(!fleeing && !has_ready_action) || roll`. A
    /// trigger while a flee is already pending replaces the pending expiry.
    pub fn update(
        &mut self,
        has_ready_action: bool,
        frame_delta_secs: f32,
        now: f64,
        rng: &mut CombatRng,
    ) -> bool {
        let roll = rng.scaled_ratio(&self.flee_trigger) <= frame_delta_secs;

        if (!self.is_fleeing && !has_ready_action) || roll {
            let duration = self.flee_duration.sample(rng);
            self.is_fleeing = true;
            self.expires_at = Some(now + f64::from(duration));
            tracing::trace!(duration, forced = !has_ready_action, "Flee scheduled");
            return true;
        }
        false
    }
}
