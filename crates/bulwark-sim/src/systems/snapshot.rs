//! Snapshot system: queries the ECS world and builds a complete SimSnapshot.
//!
//! This system is read-only. Entity lists are grouped by kind marker and
//! sorted by id.

use hecs::World;

use bulwark_core::components::*;
use bulwark_core::enums::GamePhase;
use bulwark_core::state::*;
use bulwark_core::types::{Economy, EntityId, SimTime, Statistics};

/// Build a snapshot of the current world state.
pub fn build_snapshot(
    world: &World,
    time: SimTime,
    phase: GamePhase,
    economy: Economy,
    stats: &Statistics,
    pending_spawns: u32,
) -> SimSnapshot {
    SimSnapshot {
        sequence: 0,
        time,
        phase,
        economy,
        stats: stats.clone(),
        units: build_units(world),
        structures: build_structures(world),
        projectiles: build_projectiles(world),
        pending_spawns,
    }
}

fn build_units(world: &World) -> Vec<UnitView> {
    let mut units: Vec<UnitView> = world
        .query::<(
            &EntityId,
            &Unit,
            &Position,
            &Heading,
            &PathFollower,
            &Health,
            Option<&StatusEffects>,
        )>()
        .iter()
        .map(
            |(_, (id, unit, pos, heading, follower, health, effects))| UnitView {
                id: *id,
                kind: unit.kind.clone(),
                position: pos.0,
                heading: heading.0,
                route: follower.route,
                progress: follower.progress,
                health: health.current,
                max_health: health.max,
                effects: effects
                    .map(|e| e.active.iter().map(|a| a.kind).collect())
                    .unwrap_or_default(),
            },
        )
        .collect();
    units.sort_by_key(|u| u.id);
    units
}

fn build_structures(world: &World) -> Vec<StructureView> {
    let mut structures: Vec<StructureView> = world
        .query::<(&EntityId, &Structure, &Position, &Targeter, &Upgradable)>()
        .iter()
        .map(
            |(_, (id, _, pos, targeter, upgradable))| StructureView {
                id: *id,
                kind: upgradable.kind.clone(),
                tier: upgradable.tier,
                position: pos.0,
                range: targeter.range,
                cooldown_remaining: targeter.cooldown_remaining,
                priority: targeter.priority,
                target: targeter.target,
            },
        )
        .collect();
    structures.sort_by_key(|s| s.id);
    structures
}

fn build_projectiles(world: &World) -> Vec<ProjectileView> {
    let mut projectiles: Vec<ProjectileView> = world
        .query::<(&EntityId, &Projectile, &Position, &Heading, &ProjectileState)>()
        .iter()
        .map(|(_, (id, _, pos, heading, state))| ProjectileView {
            id: *id,
            position: pos.0,
            heading: heading.0,
            target: state.target,
        })
        .collect();
    projectiles.sort_by_key(|p| p.id);
    projectiles
}
