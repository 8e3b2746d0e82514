//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the arena simulation produces
//! identical results given identical seeds and spawns.
//!
//! # Testing Strategy
//!
//! Bot behavior is stochastic, but every random draw comes from a seeded
//! [`CombatRng`](arena_core::rng::CombatRng). Sources of non-determinism
//! the harness is meant to catch:
//!
//! - **Unseeded randomness**: any draw outside the controller's generator.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Combatants and action slots are always iterated in sorted order.
//!
//! - **Order-dependent perception**: one bot observing another's
//!   half-applied tick. Perception reads a snapshot taken at tick start.
//!
//! - **Lossy persistence**: a save/load cycle that drops controller state
//!   such as the random stream position or the flee deadline.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual module determinism (perception, steering, ...)
//! 2. **Property tests**: Random inputs must still produce deterministic outputs
//! 3. **Integration tests**: Full arena scenarios are reproducible
//! 4. **Parallel tests**: Running N simulations in parallel all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use arena_core::simulation::ArenaSimulation;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the simulation produced different hashes across runs.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Result of parallel simulation runs.
#[derive(Debug, Clone)]
pub struct ParallelSimResult {
    /// Final state hash from each simulation.
    pub hashes: Vec<u64>,
    /// Number of ticks each simulation ran.
    pub ticks: u64,
    /// Number of simulations run.
    pub num_sims: usize,
}

impl ParallelSimResult {
    /// Check if all simulations produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all simulations matched.
    ///
    /// # Panics
    ///
    /// Panics if simulations produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel simulations diverged!\n\
                 Simulations: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_sims,
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `ticks` - Number of ticks to simulate per run
/// * `setup` - Function to create initial simulation state
/// * `step` - Function to advance simulation by one tick
/// * `hash` - Function to compute state hash
///
/// # Example
///
/// ```
/// use arena_test_utils::determinism::verify_determinism;
///
/// let result = verify_determinism(3, 10, || 0u64, |n| *n += 2, |n| *n);
/// result.assert_deterministic();
/// assert_eq!(result.hashes, vec![20, 20, 20]);
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Run an arena twice with identical setup and compare final hashes.
///
/// # Example
///
/// ```
/// use arena_core::math::Vec2;
/// use arena_core::simulation::ArenaSimulation;
/// use arena_test_utils::determinism::verify_arena_determinism;
///
/// let is_deterministic = verify_arena_determinism(
///     || {
///         let mut sim = ArenaSimulation::new(42);
///         sim.spawn_preset("bot_1", Vec2::new(1000.0, 1000.0)).unwrap();
///         sim.spawn_preset("bot_2", Vec2::new(1300.0, 1000.0)).unwrap();
///         sim
///     },
///     60,
/// );
/// assert!(is_deterministic);
/// ```
pub fn verify_arena_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> ArenaSimulation,
{
    let result = verify_determinism(
        2,
        num_ticks,
        &setup_fn,
        |sim| {
            sim.tick();
        },
        |sim| sim.state_hash(),
    );
    result.is_deterministic
}

/// Run N arenas on scoped threads and collect final hashes.
///
/// Catches non-determinism that only shows up under thread scheduling
/// or memory layout differences.
///
/// # Panics
///
/// Panics if a simulation thread panics.
pub fn run_parallel_arenas<F>(setup_fn: F, num_sims: usize, num_ticks: u64) -> ParallelSimResult
where
    F: Fn() -> ArenaSimulation + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut sim = setup_fn();
                    for _ in 0..num_ticks {
                        sim.tick();
                    }
                    sim.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("simulation thread panicked"))
            .collect()
    });

    ParallelSimResult {
        hashes,
        ticks: num_ticks,
        num_sims,
    }
}

/// Compare two arena runs tick-by-tick, finding first divergence.
///
/// # Returns
///
/// `None` if the runs match, `Some(tick)` if they diverge at that tick.
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> ArenaSimulation,
{
    let mut sim1 = setup_fn();
    let mut sim2 = setup_fn();

    if sim1.state_hash() != sim2.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        sim1.tick();
        sim2.tick();

        if sim1.state_hash() != sim2.state_hash() {
            tracing::debug!(tick, "Arena runs diverged");
            return Some(tick);
        }
    }

    None
}

/// Verify that a save/load cycle preserves arena state exactly, and that
/// the restored arena keeps evolving identically to the original.
pub fn verify_serialization_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> ArenaSimulation,
{
    let mut sim = setup_fn();

    for _ in 0..num_ticks {
        sim.tick();
    }

    let Ok(bytes) = sim.serialize() else {
        return false;
    };
    let Ok(mut restored) = ArenaSimulation::deserialize(&bytes) else {
        return false;
    };

    if sim.state_hash() != restored.state_hash() {
        return false;
    }

    for _ in 0..num_ticks.min(30) {
        sim.tick();
        restored.tick();
    }

    sim.state_hash() == restored.state_hash()
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for arena testing.
pub mod strategies {
    use arena_core::agent::AgentSnapshot;
    use arena_core::components::{AgentId, Body, DEFAULT_MAX_SPEED};
    use arena_core::data::PRESET_NAMES;
    use arena_core::math::Vec2;
    use arena_core::rng::UniformRange;
    use proptest::prelude::*;

    /// Coordinate inside the default arena.
    pub fn arb_coordinate() -> impl Strategy<Value = f32> {
        0.0f32..3200.0
    }

    /// Position inside the default arena.
    pub fn arb_position() -> impl Strategy<Value = Vec2> {
        (arb_coordinate(), arb_coordinate()).prop_map(|(x, y)| Vec2::new(x, y))
    }

    /// Offset of up to `reach` on each axis.
    pub fn arb_offset(reach: f32) -> impl Strategy<Value = Vec2> {
        (-reach..reach, -reach..reach).prop_map(|(x, y)| Vec2::new(x, y))
    }

    /// Velocity up to the default max speed on each axis.
    pub fn arb_velocity() -> impl Strategy<Value = Vec2> {
        arb_offset(DEFAULT_MAX_SPEED)
    }

    /// Action reach (units).
    pub fn arb_range() -> impl Strategy<Value = f32> {
        50.0f32..1200.0
    }

    /// Wander variance (radians per step).
    pub fn arb_variance() -> impl Strategy<Value = f32> {
        0.0f32..0.5
    }

    /// Precision handicap (degrees).
    pub fn arb_handicap() -> impl Strategy<Value = f32> {
        0.0f32..30.0
    }

    /// Frame delta around 60 FPS (seconds).
    pub fn arb_frame_delta() -> impl Strategy<Value = f32> {
        0.001f32..0.05
    }

    /// Ordered interval with `min` in `[low, high)` and a non-negative width.
    pub fn arb_uniform_range(low: f32, high: f32) -> impl Strategy<Value = UniformRange> {
        (low..high, 0.0f32..(high - low)).prop_map(|(min, width)| UniformRange::new(min, min + width))
    }

    /// Snapshot of a moving opponent somewhere in the arena.
    pub fn arb_snapshot(id: AgentId) -> impl Strategy<Value = AgentSnapshot> {
        (arb_position(), arb_velocity()).prop_map(move |(center, velocity)| AgentSnapshot {
            id,
            body: Body::centered_at(center, DEFAULT_MAX_SPEED).with_velocity(velocity),
        })
    }

    /// Opponents with ids `1..=n`, scattered within `reach` of `around`.
    pub fn arb_opponents(around: Vec2, reach: f32, max_len: usize) -> impl Strategy<Value = Vec<AgentSnapshot>> {
        proptest::collection::vec((arb_offset(reach), arb_velocity()), 0..max_len).prop_map(move |entries| {
            entries
                .into_iter()
                .enumerate()
                .map(|(index, (offset, velocity))| AgentSnapshot {
                    id: index as AgentId + 1,
                    body: Body::centered_at(around + offset, DEFAULT_MAX_SPEED).with_velocity(velocity),
                })
                .collect()
        })
    }

    /// Any stock preset name.
    pub fn arb_preset_name() -> impl Strategy<Value = &'static str> {
        proptest::sample::select(PRESET_NAMES.to_vec())
    }

    /// A roster of stock presets for an arena.
    pub fn arb_roster(max_len: usize) -> impl Strategy<Value = Vec<&'static str>> {
        proptest::collection::vec(arb_preset_name(), 1..max_len)
    }
}
