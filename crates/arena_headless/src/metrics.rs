//! Match metrics collection for bot behavior analysis.
//!
//! Counts what each bot did per tick (attack, reposition, flee, wander,
//! idle) and what it dispatched, so batches of matches can be compared
//! across profiles.

use std::collections::BTreeMap;

use arena_core::attack::Dispatch;
use arena_core::behavior::Decision;
use arena_core::components::AgentId;
use arena_core::simulation::{ArenaSimulation, TickEvents};
use serde::{Deserialize, Serialize};

/// Complete metrics for a single match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchMetrics {
    /// Unique match identifier.
    pub match_id: String,
    /// Scenario name.
    pub scenario: String,
    /// Random seed used.
    pub seed: u64,
    /// Total match duration in ticks.
    pub duration_ticks: u64,
    /// Per-agent metrics keyed by agent id.
    pub agents: BTreeMap<AgentId, AgentMetrics>,
    /// Final simulation state hash (for determinism validation).
    pub final_state_hash: u64,
}

impl MatchMetrics {
    /// Create a new match metrics instance.
    #[must_use]
    pub fn new(match_id: impl Into<String>, scenario: impl Into<String>, seed: u64) -> Self {
        Self {
            match_id: match_id.into(),
            scenario: scenario.into(),
            seed,
            ..Default::default()
        }
    }

    /// Get or create agent metrics.
    pub fn agent_mut(&mut self, id: AgentId) -> &mut AgentMetrics {
        self.agents.entry(id).or_insert_with(|| AgentMetrics {
            agent_id: id,
            ..Default::default()
        })
    }

    /// Shots fired by every agent combined.
    #[must_use]
    pub fn total_shots(&self) -> u64 {
        self.agents.values().map(|a| a.shots_fired).sum()
    }

    /// Serialize as pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Metrics for a single bot in a match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentMetrics {
    /// Agent identifier.
    pub agent_id: AgentId,
    /// Display name.
    pub name: String,
    /// Profile the bot ran.
    pub profile: String,

    // === Dispatches ===
    /// Weapon fire requests.
    pub shots_fired: u64,
    /// Ability casts (blinks included).
    pub abilities_cast: u64,
    /// Blink teleports.
    pub blinks: u64,

    // === Decisions ===
    /// Ticks that ended in an attack.
    pub ticks_attacking: u64,
    /// Ticks spent evading an opponent.
    pub ticks_fleeing: u64,
    /// Ticks spent roaming with nobody in view.
    pub ticks_wandering: u64,
    /// Ticks spent circling an opponent.
    pub ticks_repositioning: u64,
    /// Ticks with no decision.
    pub ticks_idle: u64,
    /// Flee windows that ran out.
    pub flees_completed: u64,

    // === Timing ===
    /// Tick of the first fire request.
    pub first_shot_tick: Option<u64>,
    /// Distance covered over the match (world units).
    pub distance_travelled: f64,
}

impl AgentMetrics {
    /// Count one tick's decision.
    pub fn record_decision(&mut self, decision: Decision) {
        match decision {
            Decision::Attack { .. } => self.ticks_attacking += 1,
            Decision::Reposition { fleeing: true, .. } => self.ticks_fleeing += 1,
            Decision::Reposition { fleeing: false, .. } => self.ticks_repositioning += 1,
            Decision::Wander => self.ticks_wandering += 1,
            Decision::Idle => self.ticks_idle += 1,
        }
    }

    /// Count one dispatch.
    pub fn record_dispatch(&mut self, tick: u64, dispatch: &Dispatch) {
        match dispatch {
            Dispatch::Fire { .. } => {
                self.shots_fired += 1;
                self.first_shot_tick.get_or_insert(tick);
            }
            Dispatch::Cast { .. } => self.abilities_cast += 1,
        }
    }

    /// Ticks observed.
    #[must_use]
    pub fn total_ticks(&self) -> u64 {
        self.ticks_attacking + self.ticks_fleeing + self.ticks_wandering + self.ticks_repositioning + self.ticks_idle
    }

    /// Share of observed ticks spent fleeing.
    #[must_use]
    pub fn flee_ratio(&self) -> f64 {
        self.ticks_fleeing as f64 / self.total_ticks().max(1) as f64
    }
}

/// Aggregate per profile across a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    /// Bot appearances with this profile.
    pub appearances: u32,
    /// Average shots per appearance.
    pub avg_shots: f64,
    /// Average ability casts per appearance.
    pub avg_casts: f64,
    /// Average blinks per appearance.
    pub avg_blinks: f64,
    /// Average share of ticks spent fleeing.
    pub avg_flee_ratio: f64,
    /// Average tick of the first shot, over appearances that fired.
    pub avg_first_shot_tick: Option<f64>,
}

/// Summary statistics across multiple matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Total matches played.
    pub total_matches: u32,
    /// Average match duration in ticks.
    pub avg_duration_ticks: f64,
    /// Average shots per match, all bots combined.
    pub avg_shots_per_match: f64,
    /// Per-profile aggregates.
    pub profiles: BTreeMap<String, ProfileSummary>,
}

impl BatchSummary {
    /// Calculate summary from a list of match metrics.
    #[must_use]
    pub fn from_matches(matches: &[MatchMetrics]) -> Self {
        if matches.is_empty() {
            return Self::default();
        }

        let count = matches.len() as f64;
        let mut summary = Self {
            total_matches: matches.len() as u32,
            avg_duration_ticks: matches.iter().map(|m| m.duration_ticks as f64).sum::<f64>() / count,
            avg_shots_per_match: matches.iter().map(|m| m.total_shots() as f64).sum::<f64>() / count,
            ..Default::default()
        };

        let mut by_profile: BTreeMap<String, Vec<&AgentMetrics>> = BTreeMap::new();
        for agent in matches.iter().flat_map(|m| m.agents.values()) {
            by_profile.entry(agent.profile.clone()).or_default().push(agent);
        }

        for (profile, agents) in by_profile {
            let n = agents.len() as f64;
            let first_shots: Vec<u64> = agents.iter().filter_map(|a| a.first_shot_tick).collect();
            let avg_first_shot_tick = (!first_shots.is_empty())
                .then(|| first_shots.iter().sum::<u64>() as f64 / first_shots.len() as f64);

            summary.profiles.insert(
                profile,
                ProfileSummary {
                    appearances: agents.len() as u32,
                    avg_shots: agents.iter().map(|a| a.shots_fired as f64).sum::<f64>() / n,
                    avg_casts: agents.iter().map(|a| a.abilities_cast as f64).sum::<f64>() / n,
                    avg_blinks: agents.iter().map(|a| a.blinks as f64).sum::<f64>() / n,
                    avg_flee_ratio: agents.iter().map(|a| a.flee_ratio()).sum::<f64>() / n,
                    avg_first_shot_tick,
                },
            );
        }

        summary
    }

    /// Profile with the most shots per appearance.
    #[must_use]
    pub fn most_aggressive(&self) -> Option<&str> {
        self.profiles
            .iter()
            .max_by(|a, b| a.1.avg_shots.total_cmp(&b.1.avg_shots))
            .map(|(name, _)| name.as_str())
    }
}

/// Metrics collector that tracks events during a match.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    /// Current match metrics.
    metrics: MatchMetrics,
    /// Agent centers at the previous observation.
    last_centers: BTreeMap<AgentId, (f64, f64)>,
}

impl MetricsCollector {
    /// Create a collector and register every agent already in `sim`.
    #[must_use]
    pub fn new(match_id: &str, scenario: &str, sim: &ArenaSimulation) -> Self {
        let mut collector = Self {
            metrics: MatchMetrics::new(match_id, scenario, sim.seed()),
            last_centers: BTreeMap::new(),
        };

        for id in sim.agent_ids() {
            let Some(combatant) = sim.combatant(id) else {
                continue;
            };
            let entry = collector.metrics.agent_mut(id);
            entry.name = combatant.agent.name.clone();
            entry.profile = combatant.controller().profile().id.clone();

            let center = combatant.agent.center();
            collector
                .last_centers
                .insert(id, (f64::from(center.x), f64::from(center.y)));
        }

        collector
    }

    /// Fold one tick's events and the post-tick positions into the metrics.
    pub fn observe(&mut self, events: &TickEvents, sim: &ArenaSimulation) {
        for (id, decision) in &events.decisions {
            self.metrics.agent_mut(*id).record_decision(*decision);
        }
        for dispatch in &events.dispatches {
            self.metrics
                .agent_mut(dispatch.agent())
                .record_dispatch(events.tick, dispatch);
        }
        for (id, _) in &events.blinks {
            self.metrics.agent_mut(*id).blinks += 1;
        }
        for id in &events.flee_ended {
            self.metrics.agent_mut(*id).flees_completed += 1;
        }

        for agent in sim.agents() {
            let center = agent.center();
            let now = (f64::from(center.x), f64::from(center.y));
            if let Some(before) = self.last_centers.insert(agent.id, now) {
                self.metrics.agent_mut(agent.id).distance_travelled +=
                    (now.0 - before.0).hypot(now.1 - before.1);
            }
        }
    }

    /// Finalize the match.
    #[must_use]
    pub fn finalize(mut self, sim: &ArenaSimulation) -> MatchMetrics {
        self.metrics.duration_ticks = sim.current_tick();
        self.metrics.final_state_hash = sim.state_hash();
        self.metrics
    }

    /// Metrics so far.
    #[must_use]
    pub fn current(&self) -> &MatchMetrics {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::actions::ActionSlot;
    use arena_core::math::Vec2;

    #[test]
    fn test_match_metrics_new() {
        let metrics = MatchMetrics::new("match_001", "duel", 12345);
        assert_eq!(metrics.match_id, "match_001");
        assert_eq!(metrics.seed, 12345);
        assert!(metrics.agents.is_empty());
    }

    #[test]
    fn test_decision_counting() {
        let mut agent = AgentMetrics::default();
        agent.record_decision(Decision::Wander);
        agent.record_decision(Decision::Reposition {
            target: 2,
            fleeing: true,
        });
        agent.record_decision(Decision::Reposition {
            target: 2,
            fleeing: false,
        });
        agent.record_decision(Decision::Attack {
            target: 2,
            slot: ActionSlot::WeaponPrimary,
        });

        assert_eq!(agent.total_ticks(), 4);
        assert_eq!(agent.ticks_fleeing, 1);
        assert!((agent.flee_ratio() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_dispatch_counting() {
        let mut agent = AgentMetrics::default();
        let fire = Dispatch::Fire {
            agent: 1,
            slot: ActionSlot::WeaponPrimary,
            aim: Vec2::ZERO,
        };
        let cast = Dispatch::Cast {
            agent: 1,
            slot: ActionSlot::Ability1,
            target: Vec2::ZERO,
        };
        agent.record_dispatch(7, &fire);
        agent.record_dispatch(9, &fire);
        agent.record_dispatch(9, &cast);

        assert_eq!(agent.shots_fired, 2);
        assert_eq!(agent.abilities_cast, 1);
        assert_eq!(agent.first_shot_tick, Some(7));
    }

    #[test]
    fn test_batch_summary() {
        let mut m1 = MatchMetrics::new("m1", "duel", 1);
        m1.duration_ticks = 1000;
        let a = m1.agent_mut(1);
        a.profile = "bot_1".to_string();
        a.shots_fired = 10;

        let mut m2 = MatchMetrics::new("m2", "duel", 2);
        m2.duration_ticks = 2000;
        let b = m2.agent_mut(1);
        b.profile = "bot_1".to_string();
        b.shots_fired = 30;
        let c = m2.agent_mut(2);
        c.profile = "bot_2".to_string();
        c.shots_fired = 50;

        let summary = BatchSummary::from_matches(&[m1, m2]);

        assert_eq!(summary.total_matches, 2);
        assert!((summary.avg_duration_ticks - 1500.0).abs() < 1e-9);
        assert!((summary.avg_shots_per_match - 45.0).abs() < 1e-9);
        assert_eq!(summary.profiles["bot_1"].appearances, 2);
        assert!((summary.profiles["bot_1"].avg_shots - 20.0).abs() < 1e-9);
        assert_eq!(summary.most_aggressive(), Some("bot_2"));
    }

    #[test]
    fn test_collector_tracks_live_match() {
        let mut sim = ArenaSimulation::new(3);
        sim.spawn_preset("bot_1", Vec2::new(1000.0, 1000.0)).expect("spawn");
        sim.spawn_preset("bot_2", Vec2::new(1300.0, 1000.0)).expect("spawn");

        let mut collector = MetricsCollector::new("live", "duel", &sim);
        for _ in 0..120 {
            let events = sim.tick();
            collector.observe(&events, &sim);
        }
        let metrics = collector.finalize(&sim);

        assert_eq!(metrics.duration_ticks, 120);
        assert_eq!(metrics.agents.len(), 2);
        for agent in metrics.agents.values() {
            assert_eq!(agent.total_ticks(), 120);
            assert!(agent.profile.starts_with("bot_"));
        }
        assert_eq!(metrics.final_state_hash, sim.state_hash());
    }
}
