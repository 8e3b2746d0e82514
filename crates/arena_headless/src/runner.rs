//! Single-match runner.
//!
//! Builds an arena from a scenario, ticks it to completion and collects
//! [`MatchMetrics`].

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::metrics::{MatchMetrics, MetricsCollector};
use crate::scenario::{ArenaScenario, ScenarioError};

/// Configuration for one match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Scenario to play.
    pub scenario: ArenaScenario,
    /// Match seed.
    pub seed: u64,
    /// Tick budget. Falls back to the scenario's when `None`.
    pub max_ticks: Option<u64>,
    /// Identifier written into the metrics.
    pub match_id: String,
}

impl MatchConfig {
    /// Play `scenario` with `seed`.
    #[must_use]
    pub fn new(scenario: ArenaScenario, seed: u64) -> Self {
        Self {
            scenario,
            seed,
            max_ticks: None,
            match_id: format!("match_{seed}"),
        }
    }

    /// Override the tick budget.
    #[must_use]
    pub fn with_max_ticks(mut self, ticks: u64) -> Self {
        self.max_ticks = Some(ticks);
        self
    }

    /// Ticks this match will run.
    #[must_use]
    pub fn tick_budget(&self) -> u64 {
        self.max_ticks.unwrap_or(self.scenario.max_ticks)
    }
}

/// Run one match to its tick budget.
pub fn run_match(config: &MatchConfig) -> Result<MatchMetrics, ScenarioError> {
    let mut sim = config.scenario.build(config.seed)?;
    let mut collector = MetricsCollector::new(&config.match_id, &config.scenario.name, &sim);
    let ticks = config.tick_budget();

    debug!(
        match_id = %config.match_id,
        seed = config.seed,
        ticks,
        agents = sim.len(),
        "Match started"
    );

    for _ in 0..ticks {
        let events = sim.tick();
        collector.observe(&events, &sim);
    }

    let metrics = collector.finalize(&sim);
    debug!(
        match_id = %metrics.match_id,
        shots = metrics.total_shots(),
        state_hash = metrics.final_state_hash,
        "Match finished"
    );
    Ok(metrics)
}

/// Outcome of a determinism check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyReport {
    /// Final state hash of each run.
    pub hashes: Vec<u64>,
    /// Whether all hashes match.
    pub deterministic: bool,
}

/// Play the same match `runs` times and compare final state hashes.
pub fn verify_determinism(config: &MatchConfig, runs: u32) -> Result<VerifyReport, ScenarioError> {
    let hashes = (0..runs)
        .map(|_| run_match(config).map(|m| m.final_state_hash))
        .collect::<Result<Vec<_>, _>>()?;
    let deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    info!(runs, deterministic, "Determinism check complete");
    Ok(VerifyReport { hashes, deterministic })
}

/// Tick throughput measurement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    /// Agents in the arena.
    pub agents: usize,
    /// Ticks measured (after warmup).
    pub ticks: u64,
    /// Wall-clock time for the measured ticks.
    pub elapsed: Duration,
    /// State hash after the run.
    pub state_hash: u64,
}

impl BenchmarkReport {
    /// Ticks per wall-clock second.
    #[must_use]
    pub fn ticks_per_second(&self) -> f64 {
        self.ticks as f64 / self.elapsed.as_secs_f64().max(f64::EPSILON)
    }

    /// Milliseconds per tick.
    #[must_use]
    pub fn ms_per_tick(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0 / self.ticks.max(1) as f64
    }
}

const WARMUP_TICKS: u64 = 100;

/// Time `ticks` arena steps after a short warmup.
pub fn benchmark(scenario: &ArenaScenario, seed: u64, ticks: u64) -> Result<BenchmarkReport, ScenarioError> {
    let mut sim = scenario.build(seed)?;

    for _ in 0..WARMUP_TICKS {
        sim.tick();
    }

    let start = Instant::now();
    for _ in 0..ticks {
        sim.tick();
    }
    let elapsed = start.elapsed();

    Ok(BenchmarkReport {
        agents: sim.len(),
        ticks,
        elapsed,
        state_hash: sim.state_hash(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_match_counts_every_tick() {
        let config = MatchConfig::new(ArenaScenario::duel(), 17).with_max_ticks(240);
        let metrics = run_match(&config).expect("duel runs");

        assert_eq!(metrics.duration_ticks, 240);
        assert_eq!(metrics.match_id, "match_17");
        for agent in metrics.agents.values() {
            assert_eq!(agent.total_ticks(), 240);
        }
    }

    #[test]
    fn test_duel_bots_engage() {
        let config = MatchConfig::new(ArenaScenario::duel(), 5).with_max_ticks(600);
        let metrics = run_match(&config).expect("duel runs");
        let engaged: u64 = metrics
            .agents
            .values()
            .map(|a| a.ticks_attacking + a.ticks_repositioning + a.ticks_fleeing)
            .sum();
        assert!(engaged > 0);
    }

    #[test]
    fn test_verify_same_seed() {
        let config = MatchConfig::new(ArenaScenario::free_for_all(), 99).with_max_ticks(120);
        let report = verify_determinism(&config, 3).expect("runs");
        assert!(report.deterministic);
        assert_eq!(report.hashes.len(), 3);
    }

    #[test]
    fn test_benchmark_reports_throughput() {
        let report = benchmark(&ArenaScenario::duel(), 1, 50).expect("runs");
        assert_eq!(report.agents, 2);
        assert_eq!(report.ticks, 50);
        assert!(report.ticks_per_second() > 0.0);
    }
}
