//! Uniform target and action sampling.

use serde::{Deserialize, Serialize};

use crate::actions::ActionSlot;
use crate::agent::AgentSnapshot;
use crate::perception::PerceivedOpponent;
use crate::rng::CombatRng;

/// A candidate engagement for this tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Engagement {
    /// Chosen opponent.
    pub target: AgentSnapshot,
    /// Chosen action, or `None` when nothing reaches the opponent.
    pub action: Option<ActionSlot>,
}

/// Pick one opponent, then one of its hittable actions, uniformly.
///
/// Returns `None` only when `hittable` is empty.
pub fn select_engagement(hittable: &[PerceivedOpponent], rng: &mut CombatRng) -> Option<Engagement> {
    let chosen = rng.pick(hittable)?;
    let action = rng.pick(&chosen.hittable).copied();
    Some(Engagement {
        target: chosen.opponent,
        action,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Body;
    use crate::math::Vec2;

    fn opponent(id: u32, hittable: Vec<ActionSlot>) -> PerceivedOpponent {
        PerceivedOpponent {
            opponent: AgentSnapshot {
                id,
                body: Body::new(Vec2::new(id as f32 * 10.0, 0.0), 300.0),
            },
            hittable,
        }
    }

    #[test]
    fn test_empty_list_selects_nothing() {
        let mut rng = CombatRng::seed_from_u64(5);
        assert!(select_engagement(&[], &mut rng).is_none());
    }

    #[test]
    fn test_no_hittable_action_is_sentinel() {
        let mut rng = CombatRng::seed_from_u64(5);
        let engagement = select_engagement(&[opponent(2, vec![])], &mut rng);
        let engagement = engagement.expect("one opponent");
        assert_eq!(engagement.target.id, 2);
        assert_eq!(engagement.action, None);
    }

    #[test]
    fn test_selection_covers_all_candidates() {
        let mut rng = CombatRng::seed_from_u64(5);
        let list = vec![
            opponent(2, vec![ActionSlot::WeaponPrimary, ActionSlot::Ability1]),
            opponent(3, vec![ActionSlot::WeaponSecondary]),
        ];

        let mut seen_targets = std::collections::BTreeSet::new();
        let mut seen_actions = std::collections::BTreeSet::new();
        for _ in 0..200 {
            let engagement = select_engagement(&list, &mut rng).expect("non-empty");
            seen_targets.insert(engagement.target.id);
            let action = engagement.action.expect("every opponent has actions");
            // The action always belongs to the chosen opponent's list
            let owner = list.iter().find(|o| o.id() == engagement.target.id).expect("known");
            assert!(owner.hittable.contains(&action));
            seen_actions.insert(action);
        }
        assert_eq!(seen_targets.len(), 2);
        assert_eq!(seen_actions.len(), 3);
    }
}
