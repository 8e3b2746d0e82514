//! Headless arena runner for bot behavior testing and CI verification.
//!
//! Plays arena matches without graphics so bot profiles can be compared
//! and the decision core checked for determinism:
//!
//! - **Scenarios**: RON files placing presets or inline profiles in an arena
//! - **Batch runs**: many seeds in parallel, aggregated per profile
//! - **Verification**: identical seeds must end in identical state hashes
//!
//! # Example
//!
//! ```bash
//! # Play one match and print its metrics as JSON
//! cargo run -p arena_headless -- run --scenario duel --seed 7
//!
//! # Run a batch
//! cargo run -p arena_headless -- batch --scenario ffa --count 200 --output results/
//!
//! # Verify determinism
//! cargo run -p arena_headless -- verify --scenario crates/arena_headless/scenarios/sniper_duel.ron --runs 5
//! ```

pub mod batch;
pub mod metrics;
pub mod runner;
pub mod scenario;

pub use batch::{run_batch, BatchConfig, BatchResults};
pub use metrics::{AgentMetrics, BatchSummary, MatchMetrics, MetricsCollector};
pub use runner::{benchmark, run_match, verify_determinism, MatchConfig};
pub use scenario::{ArenaScenario, CombatantSetup, ScenarioError};
