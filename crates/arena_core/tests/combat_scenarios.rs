//! End-to-end combat scenarios driven through the public API.
//!
//! Each test builds a tiny world by hand, runs one controller tick (or a
//! single attack) and checks the dispatched request.

use arena_core::actions::{ActionRegistry, ActionSlot, Travel};
use arena_core::attack::{execute_attack, predict_intercept, Dispatch, DispatchLog};
use arena_core::behavior::Decision;
use arena_core::controller::AiController;
use arena_core::math::{Vec2, EPSILON};
use arena_core::perception::ViewRect;
use arena_core::rng::CombatRng;
use arena_core::simulation::TICK_DURATION_MS;
use arena_core::steering::{facing, SteeringBehaviour};
use arena_test_utils::fixtures::{
    agent_at, armed_agent, hair_trigger, moving_snapshot, pistol, sharpshooter, snapshot_at,
};

// =============================================================================
// Lead prediction
// =============================================================================

#[test]
fn stationary_target_is_aimed_at_directly() {
    let shooter = armed_agent(1, Vec2::ZERO, pistol());
    let target = snapshot_at(2, Vec2::new(300.0, 0.0));
    let mut rng = CombatRng::seed_from_u64(11);
    let mut log = DispatchLog::new();

    let outcome = execute_attack(&shooter, &target, ActionSlot::WeaponPrimary, 0.0, &mut rng, &mut log)
        .expect("pistol is bound");

    assert_eq!(outcome.intercept.predicted, target.center());
    assert!(outcome.dispatch.point().approx_eq(target.center(), EPSILON));
    assert_eq!(log.len(), 1);
}

#[test]
fn moving_target_is_led_by_travel_time() {
    let rifle = hair_trigger("rifle", 600.0, Travel::Speed(500.0));
    let shooter = armed_agent(1, Vec2::ZERO, rifle);
    let target = moving_snapshot(2, Vec2::new(500.0, 0.0), Vec2::new(100.0, 0.0));
    let mut rng = CombatRng::seed_from_u64(11);
    let mut log = DispatchLog::new();

    let outcome = execute_attack(&shooter, &target, ActionSlot::WeaponPrimary, 0.0, &mut rng, &mut log)
        .expect("rifle is bound");

    assert_eq!(outcome.intercept.travel_time, 1.0);
    assert_eq!(outcome.intercept.predicted, Vec2::new(600.0, 0.0));
    assert_eq!(outcome.dispatch.point(), outcome.intercept.predicted);
}

#[test]
fn delayed_effect_leads_by_its_delay() {
    let target = moving_snapshot(2, Vec2::new(250.0, 0.0), Vec2::new(0.0, 40.0));
    let intercept = predict_intercept(Vec2::ZERO, &target, Travel::Delay(0.5));
    assert_eq!(intercept.travel_time, 0.5);
    assert!(intercept.predicted.approx_eq(Vec2::new(250.0, 20.0), EPSILON));
}

// =============================================================================
// Controller ticks
// =============================================================================

#[test]
fn controller_fires_at_stationary_target() {
    let mut shooter = armed_agent(1, Vec2::new(1000.0, 1000.0), hair_trigger("pistol", 400.0, Travel::Speed(800.0)));
    let target = snapshot_at(2, Vec2::new(1300.0, 1000.0));
    let world = [shooter.snapshot(), target];
    let mut brain = AiController::new(sharpshooter("sharp"), 3).expect("valid profile");
    let mut log = DispatchLog::new();

    let report = brain.update(&mut shooter, &world, ViewRect::default(), TICK_DURATION_MS, &mut log);

    assert_eq!(
        report.decision,
        Decision::Attack {
            target: 2,
            slot: ActionSlot::WeaponPrimary
        }
    );
    match log.entries() {
        [Dispatch::Fire { agent, slot, aim }] => {
            assert_eq!(*agent, 1);
            assert_eq!(*slot, ActionSlot::WeaponPrimary);
            assert!(aim.approx_eq(target.center(), EPSILON));
        }
        other => panic!("expected one fire request, got {other:?}"),
    }
    assert!((shooter.rotation - facing(target.center() - shooter.center())).abs() < EPSILON);
    assert!(report.behaviours.is_empty());
}

#[test]
fn no_ready_actions_forces_flee() {
    let mut unarmed = agent_at(1, Vec2::new(1000.0, 1000.0)).with_actions(
        ActionRegistry::new().with(ActionSlot::WeaponPrimary, pistol().with_ready(false)),
    );
    let world = [unarmed.snapshot(), snapshot_at(2, Vec2::new(1200.0, 1000.0))];

    for seed in 0..32 {
        let mut brain = AiController::new(sharpshooter("cornered"), seed).expect("valid profile");
        let mut log = DispatchLog::new();

        let report = brain.update(&mut unarmed, &world, ViewRect::default(), TICK_DURATION_MS, &mut log);

        assert!(brain.is_fleeing(), "seed {seed} did not flee");
        assert_eq!(
            report.decision,
            Decision::Reposition {
                target: 2,
                fleeing: true
            }
        );
        assert!(report.behaviours.contains(&SteeringBehaviour::Flee));
        assert!(log.is_empty());
    }
}

#[test]
fn empty_view_wanders() {
    let mut loner = armed_agent(1, Vec2::new(1000.0, 1000.0), pistol());
    let world = [loner.snapshot(), snapshot_at(2, Vec2::new(2500.0, 2500.0))];
    let mut brain = AiController::new(sharpshooter("loner"), 8).expect("valid profile");
    let mut log = DispatchLog::new();

    let report = brain.update(&mut loner, &world, ViewRect::default(), TICK_DURATION_MS, &mut log);

    assert_eq!(report.decision, Decision::Wander);
    assert_eq!(report.behaviours, vec![SteeringBehaviour::Wander]);
    assert_eq!(report.in_view, 0);
    assert!(log.is_empty());
}

#[test]
fn out_of_reach_opponent_in_view_is_not_shot() {
    let mut shooter = armed_agent(1, Vec2::new(1000.0, 1000.0), hair_trigger("pistol", 400.0, Travel::Speed(800.0)));
    let world = [shooter.snapshot(), snapshot_at(2, Vec2::new(1600.0, 1000.0))];
    let mut brain = AiController::new(sharpshooter("patient"), 21).expect("valid profile");
    let mut log = DispatchLog::new();

    let report = brain.update(&mut shooter, &world, ViewRect::default(), TICK_DURATION_MS, &mut log);

    assert_eq!(report.in_view, 1);
    assert!(matches!(report.decision, Decision::Reposition { target: 2, .. }));
    assert!(log.is_empty());
}

#[test]
fn blink_lands_at_its_range() {
    use arena_test_utils::fixtures::blink;

    let caster = agent_at(1, Vec2::new(1000.0, 1000.0))
        .with_actions(ActionRegistry::new().with(ActionSlot::Ability1, blink(500.0)));
    let target = snapshot_at(2, Vec2::new(1100.0, 1000.0));
    let mut rng = CombatRng::seed_from_u64(99);
    let mut log = DispatchLog::new();

    let outcome = execute_attack(&caster, &target, ActionSlot::Ability1, 10.0, &mut rng, &mut log)
        .expect("blink is bound");

    assert!(matches!(outcome.dispatch, Dispatch::Cast { .. }));
    assert!((outcome.dispatch.point().distance(caster.center()) - 500.0).abs() < 1e-2);
    assert_eq!(outcome.facing, None);
}
