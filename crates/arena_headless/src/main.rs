//! Headless arena match runner.
//!
//! Runs bot matches without graphics. Results go to stdout as JSON, logs
//! go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Play one match
//! cargo run -p arena_headless -- run --scenario duel --seed 7 --ticks 3600
//!
//! # Run batch of matches
//! cargo run -p arena_headless -- batch --scenario ffa --count 1000 --output results/
//!
//! # Verify determinism
//! cargo run -p arena_headless -- verify --scenario duel --seed 12345 --runs 5
//!
//! # Check a profile file
//! cargo run -p arena_headless -- validate --profile crates/arena_headless/profiles/sniper.ron
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use arena_core::data::{ActionCatalog, AiProfile};
use arena_headless::{
    batch::{run_batch, BatchConfig},
    runner::{benchmark, run_match, verify_determinism, MatchConfig},
    scenario::ArenaScenario,
};

#[derive(Parser)]
#[command(name = "arena_headless")]
#[command(about = "Headless arena runner for bot behavior testing and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single match and print its metrics
    Run {
        /// Built-in scenario (duel, ffa) or RON file
        #[arg(short, long, default_value = "duel")]
        scenario: String,

        /// Match seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Ticks to play (default: the scenario's)
        #[arg(short, long)]
        ticks: Option<u64>,
    },

    /// Run a batch of matches in parallel
    Batch {
        /// Built-in scenario (duel, ffa) or RON file
        #[arg(short, long, default_value = "duel")]
        scenario: String,

        /// Number of matches to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Maximum parallel matches (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Starting random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Ticks per match (default: the scenario's)
        #[arg(short, long)]
        ticks: Option<u64>,
    },

    /// Verify determinism by running same seed multiple times
    Verify {
        /// Built-in scenario (duel, ffa) or RON file
        #[arg(short, long, default_value = "duel")]
        scenario: String,

        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,

        /// Ticks per run (default: the scenario's)
        #[arg(short, long)]
        ticks: Option<u64>,
    },

    /// Load and validate an AI profile file
    Validate {
        /// Profile RON file
        #[arg(short, long)]
        profile: PathBuf,
    },

    /// Run N ticks for benchmarking
    Benchmark {
        /// Number of ticks to run
        #[arg(short, long, default_value = "36000")]
        ticks: u64,

        /// Built-in scenario (duel, ffa) or RON file
        #[arg(short, long, default_value = "ffa")]
        scenario: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries results
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .init();

    let outcome = match cli.command {
        Commands::Run {
            scenario,
            seed,
            ticks,
        } => cmd_run(&scenario, seed, ticks),
        Commands::Batch {
            scenario,
            count,
            parallel,
            output,
            seed,
            ticks,
        } => cmd_batch(&scenario, count, parallel, output, seed, ticks),
        Commands::Verify {
            scenario,
            seed,
            runs,
            ticks,
        } => cmd_verify(&scenario, seed, runs, ticks),
        Commands::Validate { profile } => cmd_validate(&profile),
        Commands::Benchmark { ticks, scenario } => cmd_benchmark(&scenario, ticks),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            tracing::error!("{message}");
            eprintln!("FATAL: {message}");
            ExitCode::FAILURE
        }
    }
}

fn load_scenario(name: &str) -> Result<ArenaScenario, String> {
    ArenaScenario::resolve(name).map_err(|e| format!("Failed to load scenario '{name}': {e}"))
}

fn match_config(scenario: ArenaScenario, seed: u64, ticks: Option<u64>) -> MatchConfig {
    let config = MatchConfig::new(scenario, seed);
    match ticks {
        Some(ticks) => config.with_max_ticks(ticks),
        None => config,
    }
}

/// Play one match
fn cmd_run(scenario: &str, seed: u64, ticks: Option<u64>) -> Result<(), String> {
    let scenario = load_scenario(scenario)?;
    tracing::info!(scenario = %scenario.name, seed, "Starting match");

    let metrics = run_match(&match_config(scenario, seed, ticks)).map_err(|e| e.to_string())?;
    let json = metrics.to_json().map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

/// Run batch of matches
fn cmd_batch(
    scenario: &str,
    count: u32,
    parallel: u32,
    output: PathBuf,
    seed: u64,
    ticks: Option<u64>,
) -> Result<(), String> {
    let scenario = load_scenario(scenario)?;

    let num_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);

    tracing::info!(
        scenario = %scenario.name,
        count,
        parallel,
        seed,
        output = %output.display(),
        cpus_available = num_cpus,
        ticks = ?ticks,
        "Batch configuration"
    );

    std::fs::create_dir_all(&output)
        .map_err(|e| format!("Cannot create output directory '{}': {e}", output.display()))?;

    let mut config = BatchConfig::new(scenario, count)
        .with_output(output.clone())
        .with_seed(seed);
    config.parallel_matches = parallel;
    config.max_ticks = ticks;

    let results = run_batch(config);

    let results_path = output.join("batch_results.json");
    results
        .save(&results_path)
        .map_err(|e| format!("Failed to save results: {e}"))?;

    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Matches played: {}", results.matches.len());
    if !results.errors.is_empty() {
        eprintln!("Matches FAILED: {}", results.errors.len());
    }
    eprintln!("Duration: {:.1}s", results.duration_seconds);
    eprintln!(
        "Throughput: {:.1} matches/sec",
        results.matches.len() as f64 / results.duration_seconds.max(0.001)
    );
    eprintln!("\nPer profile:");
    for (profile, stats) in &results.summary.profiles {
        eprintln!(
            "  {profile}: {:.1} shots, {:.1} casts, {:.1} blinks, {:.1}% fleeing",
            stats.avg_shots,
            stats.avg_casts,
            stats.avg_blinks,
            stats.avg_flee_ratio * 100.0
        );
    }

    if !results.errors.is_empty() {
        eprintln!("\nMATCH FAILURES:");
        for error in results.errors.iter().take(10) {
            eprintln!("  Match {} (seed {}): {}", error.match_index, error.seed, error.message);
        }
        if results.errors.len() > 10 {
            eprintln!("  ... and {} more failures", results.errors.len() - 10);
        }
    }

    eprintln!("\nResults saved to: {}", results_path.display());
    Ok(())
}

/// Verify determinism
fn cmd_verify(scenario: &str, seed: u64, runs: u32, ticks: Option<u64>) -> Result<(), String> {
    let scenario = load_scenario(scenario)?;
    tracing::info!(
        "Verifying determinism: {} with seed {} ({} runs)",
        scenario.name,
        seed,
        runs
    );

    let report = verify_determinism(&match_config(scenario, seed, ticks), runs).map_err(|e| e.to_string())?;

    if report.deterministic {
        eprintln!("PASS: All {runs} runs produced identical results");
        if let Some(hash) = report.hashes.first() {
            eprintln!("  State hash: {hash:016x}");
        }
        Ok(())
    } else {
        for (run, hash) in report.hashes.iter().enumerate() {
            eprintln!("  Run {run}: {hash:016x}");
        }
        Err("Non-determinism detected!".to_string())
    }
}

/// Validate a profile file
fn cmd_validate(path: &Path) -> Result<(), String> {
    let source =
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read '{}': {e}", path.display()))?;
    let profile = AiProfile::from_ron_str(&source).map_err(|e| e.to_string())?;

    let mut errors = profile.validate();
    match profile.build_actions(&ActionCatalog::standard()) {
        Ok(actions) => tracing::debug!(profile = %profile.id, actions = actions.len(), "Loadout resolved"),
        Err(e) => errors.push(e.to_string()),
    }
    if !errors.is_empty() {
        for error in &errors {
            eprintln!("  - {error}");
        }
        return Err(format!("Profile '{}' has {} problem(s)", profile.id, errors.len()));
    }

    eprintln!("OK: profile '{}' is valid", profile.id);
    Ok(())
}

/// Run benchmark
fn cmd_benchmark(scenario: &str, ticks: u64) -> Result<(), String> {
    let scenario = load_scenario(scenario)?;
    tracing::info!("Running {} tick benchmark on '{}'", ticks, scenario.name);

    let report = benchmark(&scenario, 0, ticks).map_err(|e| e.to_string())?;

    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BENCHMARK RESULTS");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Agents: {}", report.agents);
    eprintln!("Ticks: {}", report.ticks);
    eprintln!("Duration: {:.3}s", report.elapsed.as_secs_f64());
    eprintln!("Ticks/second: {:.1}", report.ticks_per_second());
    eprintln!("ms/tick: {:.4}", report.ms_per_tick());
    eprintln!("State hash: {:016x}", report.state_hash);
    Ok(())
}
