//! Tests for the simulation engine: tick phases, commands, and save images.

use bulwark_core::commands::{CommandOutcome, PlayerCommand};
use bulwark_core::enums::*;
use bulwark_core::errors::{CommandError, ConfigError, SimError};
use bulwark_core::map::{
    default_structures, default_units, MapDefinition, Region, Route, SpawnEvent, SpawnSequence,
    StructureProfile, UnitProfile,
};
use bulwark_core::path::Path;
use bulwark_core::save::SessionState;
use bulwark_core::types::{Economy, EntityId, Point};

use crate::engine::{SimConfig, Simulation};

// ---- Fixtures ----

/// Three-waypoint path (0,0) -> (5,0) -> (5,5), buildable ground around
/// waypoint 1 and a strip beside the first leg.
fn test_map(waves: Vec<SpawnEvent>, currency: u32) -> MapDefinition {
    let mut units = default_units();
    units.insert(
        "grunt".to_string(),
        UnitProfile {
            max_health: 10.0,
            speed: 1.0,
            bounty: 5,
            goal_damage: 1,
        },
    );
    let mut structures = default_structures();
    structures.insert(
        "bolt".to_string(),
        StructureProfile {
            cost: 10,
            range: 2.0,
            cooldown_secs: 1.0,
            damage: 10.0,
            delivery: Delivery::Instant,
            splash_radius: None,
            effect: None,
            tiers: Vec::new(),
            sell_ratio: 0.5,
        },
    );
    MapDefinition {
        name: "corridor".to_string(),
        path: Path::new(vec![
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(5.0, 5.0),
        ])
        .unwrap(),
        path_weight: 1,
        routes: Vec::new(),
        buildable: vec![
            Region::Circle {
                center: Point::new(5.0, 0.0),
                radius: 1.5,
            },
            Region::Rect {
                min: Point::new(0.0, 1.0),
                max: Point::new(4.0, 3.0),
            },
        ],
        waves,
        sequences: Vec::new(),
        starting: Economy {
            currency,
            lives: 5,
        },
        units,
        structures,
    }
}

fn spawn(unit: &str, at_secs: f64, wave: u32) -> SpawnEvent {
    SpawnEvent {
        unit: unit.to_string(),
        at_secs,
        wave,
        spawn_point: 0,
    }
}

fn place(sim: &mut Simulation, x: f64, y: f64, kind: &str) -> EntityId {
    match sim
        .apply_command(PlayerCommand::PlaceStructure {
            position: Point::new(x, y),
            kind: kind.to_string(),
        })
        .unwrap()
    {
        CommandOutcome::Placed { id } => id,
        other => panic!("unexpected outcome {other:?}"),
    }
}

fn run_ticks(sim: &mut Simulation, ticks: u32) {
    let dt = sim.config().fixed_dt();
    for _ in 0..ticks {
        sim.step(dt).unwrap();
    }
}

fn snapshot_json(sim: &Simulation) -> String {
    serde_json::to_string(&sim.snapshot()).unwrap()
}

// ---- End-to-end ----

#[test]
fn test_structure_at_waypoint_kills_unit_before_next_waypoint() {
    let mut sim = Simulation::new(test_map(vec![spawn("grunt", 0.0, 1)], 100), SimConfig::default());
    assert_eq!(sim.units_alive(), 1, "t=0 spawn is released on creation");
    let unit = sim.snapshot().units[0].id;

    place(&mut sim, 5.0, 0.0, "bolt");
    assert_eq!(sim.economy().currency, 90);

    let path = sim.map().path.clone();
    let waypoint_2 = path.length();
    let mut max_progress = 0.0;
    while sim.time().elapsed_secs < 15.0 && sim.units_alive() > 0 {
        if let Some(view) = sim.snapshot().unit(unit) {
            max_progress = view.progress;
        }
        run_ticks(&mut sim, 1);
    }

    assert_eq!(sim.units_alive(), 0);
    assert_eq!(sim.stats().units_killed, 1);
    assert_eq!(sim.stats().units_leaked, 0);
    assert!(max_progress < waypoint_2, "died at progress {max_progress}");
    assert!(sim.time().elapsed_secs < 10.0);
    assert_eq!(sim.economy().currency, 95);
    assert_eq!(sim.economy().lives, 5);
    assert_eq!(sim.phase(), GamePhase::Victory);
}

#[test]
fn test_unit_leaks_and_defeats_player() {
    let mut map = test_map(vec![spawn("grunt", 0.0, 1)], 100);
    map.starting.lives = 1;
    let mut sim = Simulation::new(map, SimConfig::default());

    // Path length 10 at speed 1.
    run_ticks(&mut sim, 301);

    assert_eq!(sim.economy().lives, 0);
    assert_eq!(sim.stats().units_leaked, 1);
    assert_eq!(sim.phase(), GamePhase::Defeat);

    // Game over: further ticks and commands do nothing.
    let before = snapshot_json(&sim);
    run_ticks(&mut sim, 10);
    assert_eq!(before, snapshot_json(&sim));
    let err = sim.place_structure(Point::new(2.0, 2.0), "bolt").unwrap_err();
    assert_eq!(err, CommandError::NotAccepting(GamePhase::Defeat));
}

// ---- Timing ----

#[test]
fn test_timestep_consistency() {
    let fixture = || {
        test_map(
            vec![
                spawn("grunt", 0.0, 1),
                spawn("pig", 0.5, 1),
                spawn("ogre", 1.2, 2),
            ],
            200,
        )
    };
    let config = SimConfig {
        max_steps_per_advance: 10_000,
        ..Default::default()
    };

    let mut whole = Simulation::new(fixture(), config.clone());
    let mut sliced = Simulation::new(fixture(), config);
    place(&mut whole, 2.0, 2.0, "frost");
    place(&mut sliced, 2.0, 2.0, "frost");

    let ran_whole = whole.advance(3.0).unwrap();
    let mut ran_sliced = 0;
    for _ in 0..30 {
        ran_sliced += sliced.advance(0.1).unwrap();
    }
    assert_eq!(ran_whole, 90);
    assert_eq!(ran_whole, ran_sliced);

    let a = whole.snapshot();
    let b = sliced.snapshot();
    assert_eq!(a.units.len(), b.units.len());
    for (ua, ub) in a.units.iter().zip(&b.units) {
        assert_eq!(ua.id, ub.id);
        assert!(ua.position.distance(ub.position) < 1e-9);
        assert!((ua.health - ub.health).abs() < 1e-9);
    }
}

#[test]
fn test_step_slicing_matches_single_step() {
    let mut coarse = Simulation::new(test_map(vec![spawn("grunt", 0.0, 1)], 0), SimConfig::default());
    let mut fine = Simulation::new(test_map(vec![spawn("grunt", 0.0, 1)], 0), SimConfig::default());

    coarse.step(0.5).unwrap();
    for _ in 0..5 {
        fine.step(0.1).unwrap();
    }
    let a = &coarse.snapshot().units[0];
    let b = &fine.snapshot().units[0];
    assert!((a.progress - b.progress).abs() < 1e-9);
    assert!(a.position.distance(b.position) < 1e-9);
}

#[test]
fn test_invalid_timestep_is_rejected_without_change() {
    let mut sim = Simulation::new(test_map(vec![spawn("grunt", 0.0, 1)], 0), SimConfig::default());
    run_ticks(&mut sim, 3);
    let before = snapshot_json(&sim);

    assert_eq!(sim.step(-0.1), Err(SimError::InvalidTimestep(-0.1)));
    assert!(sim.step(f64::NAN).is_err());
    assert!(sim.advance(f64::INFINITY).is_err());
    assert_eq!(before, snapshot_json(&sim));

    // The loop carries on afterwards.
    sim.step(0.1).unwrap();
    assert_ne!(before, snapshot_json(&sim));
}

#[test]
fn test_advance_caps_catch_up() {
    let mut sim = Simulation::new(test_map(vec![spawn("grunt", 0.0, 1)], 0), SimConfig::default());
    let ran = sim.advance(5.0).unwrap();
    assert_eq!(ran, SimConfig::default().max_steps_per_advance);
}

#[test]
fn test_pause_freezes_the_world() {
    let mut sim = Simulation::new(test_map(vec![spawn("grunt", 0.0, 1)], 0), SimConfig::default());
    run_ticks(&mut sim, 5);
    assert!(sim.pause());
    let before = snapshot_json(&sim);
    assert_eq!(sim.advance(1.0).unwrap(), 0);
    sim.step(0.1).unwrap();
    assert_eq!(before, snapshot_json(&sim));

    assert!(sim.resume());
    assert!(!sim.resume());
    run_ticks(&mut sim, 1);
    assert_ne!(before, snapshot_json(&sim));
}

#[test]
fn test_time_scale_speeds_up_ticks() {
    let mut sim = Simulation::new(
        test_map(vec![spawn("grunt", 0.0, 1)], 0),
        SimConfig {
            time_scale: 2.0,
            max_steps_per_advance: 100,
            ..Default::default()
        },
    );
    assert_eq!(sim.advance(0.5).unwrap(), 30);
    sim.set_time_scale(99.0);
    assert_eq!(sim.time_scale(), 4.0);
}

// ---- Invariants ----

#[test]
fn test_progress_is_monotonic() {
    let mut sim = Simulation::new(
        test_map(
            vec![
                spawn("pig", 0.0, 1),
                spawn("ogre", 0.3, 1),
                spawn("pig", 1.0, 2),
            ],
            500,
        ),
        SimConfig::default(),
    );
    place(&mut sim, 2.0, 1.5, "frost");
    place(&mut sim, 4.0, 2.5, "cannon");

    let mut last = std::collections::BTreeMap::new();
    for _ in 0..600 {
        run_ticks(&mut sim, 1);
        let snapshot = sim.snapshot();
        for unit in &snapshot.units {
            if let Some(prev) = last.insert(unit.id, unit.progress) {
                assert!(unit.progress >= prev, "unit {} went backwards", unit.id);
            }
            assert!(unit.progress <= sim.map().path.length());
        }
        for structure in &snapshot.structures {
            assert!(structure.cooldown_remaining >= 0.0);
        }
    }
}

#[test]
fn test_placement_over_budget_is_rejected_unchanged() {
    let mut sim = Simulation::new(test_map(vec![spawn("grunt", 0.0, 1)], 30), SimConfig::default());
    let before = snapshot_json(&sim);

    let err = sim
        .apply_command(PlayerCommand::PlaceStructure {
            position: Point::new(2.0, 2.0),
            kind: "arrow".to_string(),
        })
        .unwrap_err();
    assert_eq!(
        err,
        CommandError::InsufficientFunds {
            needed: 50,
            available: 30
        }
    );
    assert_eq!(err.code(), "insufficient_funds");
    assert_eq!(before, snapshot_json(&sim));
    assert!(sim.snapshot().structures.is_empty());
}

#[test]
fn test_placement_validation() {
    let mut sim = Simulation::new(test_map(Vec::new(), 1000), SimConfig::default());

    assert_eq!(
        sim.place_structure(Point::new(2.0, -3.0), "bolt"),
        Err(CommandError::OutsideBuildableArea)
    );
    assert_eq!(
        sim.place_structure(Point::new(2.0, 2.0), "catapult"),
        Err(CommandError::UnknownStructureType("catapult".to_string()))
    );

    let first = sim.place_structure(Point::new(2.0, 2.0), "bolt").unwrap();
    assert_eq!(
        sim.place_structure(Point::new(2.5, 2.0), "bolt"),
        Err(CommandError::Overlapping { other: first })
    );
    // Exactly one footprint diameter apart is allowed.
    sim.place_structure(Point::new(3.0, 2.0), "bolt").unwrap();
    assert_eq!(sim.stats().structures_built, 2);
    assert_eq!(sim.economy().currency, 980);
}

#[test]
fn test_sell_refunds_and_frees_spot() {
    let mut sim = Simulation::new(test_map(Vec::new(), 100), SimConfig::default());
    let id = place(&mut sim, 2.0, 2.0, "arrow");
    assert_eq!(sim.economy().currency, 50);

    let outcome = sim
        .apply_command(PlayerCommand::SellStructure { id })
        .unwrap();
    assert_eq!(outcome, CommandOutcome::Sold { refund: 25 });
    assert_eq!(sim.economy().currency, 75);
    assert!(sim.snapshot().structures.is_empty());
    assert_eq!(
        sim.sell_structure(id),
        Err(CommandError::UnknownStructure(id))
    );

    let again = place(&mut sim, 2.0, 2.0, "arrow");
    assert_ne!(again, id, "ids are never reused");
}

#[test]
fn test_upgrade_through_tiers_then_reject() {
    let mut sim = Simulation::new(test_map(Vec::new(), 1000), SimConfig::default());
    let id = place(&mut sim, 2.0, 2.0, "arrow");

    assert_eq!(
        sim.apply_command(PlayerCommand::UpgradeStructure { id }),
        Ok(CommandOutcome::Upgraded { tier: 1 })
    );
    assert_eq!(sim.upgrade_structure(id), Ok(2));
    let view = sim.snapshot().structure(id).cloned().unwrap();
    assert_eq!(view.tier, 2);
    assert_eq!(view.range, 4.0);

    let currency = sim.economy().currency;
    assert_eq!(currency, 1000 - 50 - 40 - 80);
    assert_eq!(
        sim.upgrade_structure(id),
        Err(CommandError::MaxTierReached { id, tier: 2 })
    );
    assert_eq!(sim.economy().currency, currency);

    // Upgrades count toward the refund.
    assert_eq!(sim.sell_structure(id), Ok(85));
}

#[test]
fn test_upgrade_requires_funds() {
    let mut sim = Simulation::new(test_map(Vec::new(), 60), SimConfig::default());
    let id = place(&mut sim, 2.0, 2.0, "arrow");
    assert_eq!(
        sim.upgrade_structure(id),
        Err(CommandError::InsufficientFunds {
            needed: 40,
            available: 10
        })
    );
    assert_eq!(sim.snapshot().structure(id).unwrap().tier, 0);
}

#[test]
fn test_commands_on_units_are_rejected() {
    let mut sim = Simulation::new(test_map(vec![spawn("grunt", 0.0, 1)], 100), SimConfig::default());
    let unit = sim.snapshot().units[0].id;
    assert_eq!(
        sim.sell_structure(unit),
        Err(CommandError::UnknownStructure(unit))
    );
    assert_eq!(
        sim.set_target_priority(EntityId(999), TargetPriority::First),
        Err(CommandError::UnknownStructure(EntityId(999)))
    );
}

#[test]
fn test_target_priority_changes_choice() {
    let mut sim = Simulation::new(test_map(Vec::new(), 1000), SimConfig::default());
    let tower = place(&mut sim, 2.0, 1.0, "frost");
    let near = sim.spawn_test_unit("pig");
    run_ticks(&mut sim, 30);
    let far = sim.spawn_test_unit("ogre");
    sim.set_health(near, 1.0);
    run_ticks(&mut sim, 1);
    let target = sim.snapshot().structure(tower).unwrap().target;
    // Pig (further along, closer to the tower) is nearest.
    assert_eq!(target, Some(near));

    sim.apply_command(PlayerCommand::SetTargetPriority {
        id: tower,
        priority: TargetPriority::Strongest,
    })
    .unwrap();
    run_ticks(&mut sim, 1);
    assert_eq!(sim.snapshot().structure(tower).unwrap().target, Some(far));
}

// ---- Weak references ----

#[test]
fn test_projectile_whose_target_dies_resolves_as_miss() {
    let mut sim = Simulation::new(test_map(vec![spawn("ogre", 0.0, 1)], 100), SimConfig::default());
    let ogre = sim.snapshot().units[0].id;
    place(&mut sim, 2.0, 2.0, "arrow");

    run_ticks(&mut sim, 1);
    let in_flight = sim.snapshot().projectiles;
    assert_eq!(in_flight.len(), 1);
    assert_eq!(in_flight[0].target, ogre);

    // Kill the target out from under the projectile.
    sim.set_health(ogre, 0.0);
    run_ticks(&mut sim, 1);

    let snapshot = sim.snapshot();
    assert!(snapshot.units.is_empty());
    assert!(snapshot.projectiles.is_empty());
    assert!(sim.position_of(in_flight[0].id).is_none());
    assert_eq!(sim.stats().units_killed, 1);
    // The arrow never landed.
    assert_eq!(sim.stats().damage_dealt, 0.0);
}

#[test]
fn test_projectile_hits_moving_target() {
    let mut sim = Simulation::new(test_map(vec![spawn("ogre", 0.0, 1)], 100), SimConfig::default());
    place(&mut sim, 2.0, 2.0, "arrow");
    run_ticks(&mut sim, 20);
    assert!(sim.stats().damage_dealt >= 5.0);
    assert!(sim.snapshot().units[0].health <= 55.0);
}

#[test]
fn test_sold_structure_projectiles_still_land() {
    let mut sim = Simulation::new(test_map(vec![spawn("ogre", 0.0, 1)], 100), SimConfig::default());
    let tower = place(&mut sim, 2.0, 2.0, "arrow");
    run_ticks(&mut sim, 1);
    assert_eq!(sim.snapshot().projectiles.len(), 1);

    sim.sell_structure(tower).unwrap();
    run_ticks(&mut sim, 20);
    assert_eq!(sim.stats().damage_dealt, 5.0);
}

// ---- Effects ----

#[test]
fn test_frost_slows_and_cannon_burns() {
    let fixture = || test_map(vec![spawn("ogre", 0.0, 1)], 500);
    let mut plain = Simulation::new(fixture(), SimConfig::default());
    let mut frosted = Simulation::new(fixture(), SimConfig::default());
    place(&mut frosted, 1.0, 1.0, "frost");
    run_ticks(&mut plain, 60);
    run_ticks(&mut frosted, 60);
    let plain_progress = plain.snapshot().units[0].progress;
    let frosted_unit = frosted.snapshot().units[0].clone();
    assert!(frosted_unit.progress < plain_progress);
    assert!(frosted_unit.effects.contains(&EffectKind::Slow));

    let mut burned = Simulation::new(fixture(), SimConfig::default());
    place(&mut burned, 1.0, 1.0, "cannon");
    run_ticks(&mut burned, 45);
    let unit = burned.snapshot().units[0].clone();
    assert!(unit.effects.contains(&EffectKind::Burn));
    assert!(unit.health < 60.0 - 15.0, "burn adds to impact damage");
}

// ---- Determinism & persistence ----

fn busy_session() -> Simulation {
    let mut sim = Simulation::new(
        test_map(
            vec![
                spawn("pig", 0.0, 1),
                spawn("pig", 0.7, 1),
                spawn("ogre", 1.5, 1),
                spawn("pig", 6.0, 2),
            ],
            400,
        ),
        SimConfig::default(),
    );
    place(&mut sim, 2.0, 2.0, "arrow");
    place(&mut sim, 4.0, 1.2, "cannon");
    place(&mut sim, 5.5, 1.0, "frost");
    sim
}

#[test]
fn test_determinism_same_inputs() {
    let mut a = busy_session();
    let mut b = busy_session();
    for _ in 0..400 {
        run_ticks(&mut a, 1);
        run_ticks(&mut b, 1);
        assert_eq!(snapshot_json(&a), snapshot_json(&b), "snapshots diverged");
    }
}

#[test]
fn test_session_round_trip_reproduces_state() {
    let mut sim = busy_session();
    run_ticks(&mut sim, 75);
    assert!(!sim.snapshot().units.is_empty());

    let state = sim.to_session();
    let json = serde_json::to_string(&state).unwrap();
    let parsed: SessionState = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, state);

    let mut restored = Simulation::from_session(parsed, SimConfig::default());
    assert_eq!(snapshot_json(&sim), snapshot_json(&restored));
    assert_eq!(restored.economy(), sim.economy());

    // Both continue identically, including freshly allocated ids.
    for _ in 0..200 {
        run_ticks(&mut sim, 1);
        run_ticks(&mut restored, 1);
    }
    assert_eq!(snapshot_json(&sim), snapshot_json(&restored));
    let a = sim.place_structure(Point::new(1.0, 2.5), "bolt");
    let b = restored.place_structure(Point::new(1.0, 2.5), "bolt");
    assert_eq!(a, b);
}

#[test]
fn test_restore_bumps_stale_id_counter() {
    let sim = busy_session();
    let mut state = sim.to_session();
    state.next_entity_id = 0;
    let mut restored = Simulation::from_session(state, SimConfig::default());
    let id = restored.place_structure(Point::new(1.0, 2.5), "bolt").unwrap();
    assert!(sim.snapshot().structures.iter().all(|s| s.id < id));
    assert!(sim.snapshot().units.iter().all(|u| u.id < id));
}

// ---- Routes ----

/// `test_map` plus a detour from the same spawn point and a second spawn
/// point east of the goal. Pigs leave spawn point 0 every second, ogres
/// leave spawn point 1 every two seconds.
fn forked_map() -> MapDefinition {
    let mut map = test_map(Vec::new(), 500);
    map.path_weight = 2;
    map.routes = vec![
        Route {
            path: Path::new(vec![Point::ZERO, Point::new(0.0, 5.0), Point::new(5.0, 5.0)])
                .unwrap(),
            spawn_point: 0,
            weight: 1,
        },
        Route {
            path: Path::new(vec![Point::new(10.0, 0.0), Point::new(5.0, 5.0)]).unwrap(),
            spawn_point: 1,
            weight: 1,
        },
    ];
    map.sequences = vec![
        SpawnSequence {
            first_at_secs: 0.0,
            interval_secs: 1.0,
            units: vec!["pig".to_string(); 6],
            wave: 1,
            spawn_point: 0,
        },
        SpawnSequence {
            first_at_secs: 0.5,
            interval_secs: 2.0,
            units: vec!["ogre".to_string(); 2],
            wave: 1,
            spawn_point: 1,
        },
    ];
    map
}

#[test]
fn test_units_split_across_routes_by_weight() {
    let mut sim = Simulation::new(forked_map(), SimConfig::default());
    assert_eq!(sim.pending_spawns(), 7, "sequences expand into the schedule");
    run_ticks(&mut sim, 155);

    let snapshot = sim.snapshot();
    let routes: Vec<usize> = snapshot.units.iter().map(|u| u.route).collect();
    assert_eq!(routes, vec![0, 2, 0, 1, 2, 0, 0, 1]);
    for unit in snapshot.units.iter().filter(|u| u.route == 1) {
        assert!(unit.position.x.abs() < 1e-9, "detour runs up the y axis");
    }
    let east = snapshot.units.iter().find(|u| u.route == 2).unwrap();
    assert!(east.position.x > 5.0);
    assert_eq!(sim.pending_spawns(), 0);
}

#[test]
fn test_branch_rotation_survives_save() {
    let mut sim = Simulation::new(forked_map(), SimConfig::default());
    run_ticks(&mut sim, 100);

    let state = sim.to_session();
    assert!(state.map.sequences.is_empty());
    assert_eq!(state.branch_cursors.len(), 2);
    let json = serde_json::to_string(&state).unwrap();
    let parsed: SessionState = serde_json::from_str(&json).unwrap();
    let mut restored = Simulation::from_session(parsed, SimConfig::default());
    assert_eq!(snapshot_json(&sim), snapshot_json(&restored));

    for _ in 0..120 {
        run_ticks(&mut sim, 1);
        run_ticks(&mut restored, 1);
    }
    assert_eq!(snapshot_json(&sim), snapshot_json(&restored));
}

// ---- Extreme documents ----

const HUGE_MAP: &str = r#"{
    "name": "big",
    "path": [[0.0, 0.0], [1e12, 1e12]],
    "buildable": [{ "shape": "Circle", "center": [0.0, 2.0], "radius": 1.0 }],
    "waves": [{ "unit": "pig", "at_secs": 0.0, "wave": 1 }],
    "starting": { "currency": 100, "lives": 1 }
}"#;

#[test]
fn test_huge_map_runs_with_any_cell_size() {
    let run = |config: SimConfig| {
        let map: MapDefinition = serde_json::from_str(HUGE_MAP).unwrap();
        let mut sim = Simulation::new(map, config);
        place(&mut sim, 0.0, 2.0, "arrow");
        run_ticks(&mut sim, 90);
        sim
    };
    let coarse = run(SimConfig::default());
    let fine = run(SimConfig {
        spatial_cell_size: 1e-9,
        ..Default::default()
    });

    assert_eq!(coarse.stats().units_killed, 1);
    assert_eq!(coarse.phase(), GamePhase::Victory);
    assert_eq!(snapshot_json(&coarse), snapshot_json(&fine));
}

#[test]
fn test_config_validation() {
    assert_eq!(SimConfig::default().validate(), Ok(()));

    let field = |config: SimConfig| match config.validate() {
        Err(ConfigError::InvalidField { field, .. }) => field,
        Ok(()) => "none",
    };
    let base = SimConfig::default;
    assert_eq!(field(SimConfig { tick_rate: 0, ..base() }), "tick_rate");
    assert_eq!(field(SimConfig { tick_rate: 100_000, ..base() }), "tick_rate");
    assert_eq!(
        field(SimConfig { spatial_cell_size: 0.0, ..base() }),
        "spatial_cell_size"
    );
    assert_eq!(
        field(SimConfig { spatial_cell_size: f64::NAN, ..base() }),
        "spatial_cell_size"
    );
    assert_eq!(
        field(SimConfig { max_steps_per_advance: 0, ..base() }),
        "max_steps_per_advance"
    );
    assert_eq!(field(SimConfig { time_scale: -1.0, ..base() }), "time_scale");
    // Tiny but positive cells are legal.
    assert_eq!(field(SimConfig { spatial_cell_size: 1e-9, ..base() }), "none");
}
