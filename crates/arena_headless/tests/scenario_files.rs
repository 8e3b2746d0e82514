//! Shipped scenario and profile files load, build and replay identically.

use std::path::PathBuf;

use arena_core::data::{ActionCatalog, AiProfile};
use arena_headless::{run_match, ArenaScenario, MatchConfig};
use arena_test_utils::determinism::{run_parallel_arenas, verify_arena_determinism};

fn data_file(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(relative)
}

#[test]
fn sniper_profile_is_valid() {
    let source = std::fs::read_to_string(data_file("profiles/sniper.ron")).expect("profile file");
    let profile = AiProfile::from_ron_str(&source).expect("parses");

    assert_eq!(profile.id, "sniper");
    assert!(profile.validate().is_empty());

    let actions = profile.build_actions(&ActionCatalog::standard()).expect("loadout resolves");
    assert_eq!(actions.len(), 3);
}

#[test]
fn sniper_duel_scenario_plays() {
    let scenario = ArenaScenario::load(data_file("scenarios/sniper_duel.ron")).expect("scenario file");
    assert_eq!(scenario.max_ticks, 1800);

    let metrics = run_match(&MatchConfig::new(scenario, 3).with_max_ticks(300)).expect("plays");
    assert_eq!(metrics.duration_ticks, 300);

    let names: Vec<&str> = metrics.agents.values().map(|a| a.name.as_str()).collect();
    assert!(names.contains(&"marksman"));
}

#[test]
fn scenario_file_replays_identically() {
    let scenario = ArenaScenario::load(data_file("scenarios/sniper_duel.ron")).expect("scenario file");
    let setup = || scenario.build(41).expect("builds");

    assert!(verify_arena_determinism(setup, 240));
    run_parallel_arenas(setup, 4, 240).assert_deterministic();
}

#[test]
fn resolve_accepts_paths() {
    let path = data_file("scenarios/sniper_duel.ron");
    let scenario = ArenaScenario::resolve(&path.display().to_string()).expect("resolves");
    assert_eq!(scenario.name, "sniper_duel");
}
