//! Publish-Spawns: release scheduled units whose time has come.
//!
//! Each unit leaves from its event's spawn point and takes one of that
//! point's routes, chosen by the point's `BranchCursor`.

use hecs::World;

use bulwark_core::constants::TIMER_EPSILON;
use bulwark_core::map::{BranchCursor, MapDefinition};
use bulwark_core::types::{IdAllocator, Statistics};

use crate::world_setup::{self, Registry};

/// Spawn every event in `map.waves[*cursor..]` due at or before `elapsed`.
///
/// `map.waves` must be sorted by time. `branches` holds one cursor per
/// spawn point. Returns the number of units spawned.
#[allow(clippy::too_many_arguments)]
pub fn run(
    world: &mut World,
    registry: &mut Registry,
    ids: &mut IdAllocator,
    map: &MapDefinition,
    cursor: &mut usize,
    branches: &mut [BranchCursor],
    elapsed: f64,
    stats: &mut Statistics,
) -> usize {
    let mut spawned = 0;
    while let Some(event) = map.waves.get(*cursor) {
        if event.at_secs > elapsed + TIMER_EPSILON {
            break;
        }
        let opens_wave = *cursor == 0 || map.waves[*cursor - 1].wave != event.wave;
        if opens_wave {
            stats.waves_started += 1;
            tracing::info!(wave = event.wave, at_secs = event.at_secs, "wave started");
        }
        *cursor += 1;

        let Some(profile) = map.units.get(&event.unit) else {
            tracing::warn!(kind = %event.unit, "spawn event names an unknown unit, skipping");
            continue;
        };
        let candidates = map.branches_from(event.spawn_point);
        let weights: Vec<u32> = candidates.iter().map(|(_, w)| *w).collect();
        let picked = branches
            .get_mut(event.spawn_point as usize)
            .and_then(|b| b.next(&weights))
            .and_then(|i| candidates.get(i))
            .and_then(|&(route, _)| Some((route, map.route(route)?)));
        let Some((route, path)) = picked else {
            tracing::warn!(
                spawn_point = event.spawn_point,
                "spawn event names a spawn point with no routes, skipping"
            );
            continue;
        };
        let id = world_setup::spawn_unit(world, registry, ids, route, path, &event.unit, profile);
        tracing::debug!(unit = %id, kind = %event.unit, route, "unit spawned");
        spawned += 1;
    }
    spawned
}
