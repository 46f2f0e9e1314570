//! Resolve-Lifecycle: remove dead units, leaked units, and spent projectiles.
//!
//! A unit that is both depleted and at the goal counts as a kill.

use hecs::{Entity, World};

use bulwark_core::components::{Bounty, Health, PathFollower, ProjectileState};
use bulwark_core::types::{Economy, EntityId, Statistics};

use crate::spatial::SpatialIndex;
use crate::world_setup::Registry;

/// Despawn finished entities and settle the economy.
pub fn run(
    world: &mut World,
    registry: &mut Registry,
    units: &mut SpatialIndex,
    economy: &mut Economy,
    stats: &mut Statistics,
    despawn_buffer: &mut Vec<(Entity, EntityId)>,
) {
    despawn_buffer.clear();

    for (entity, (id, health, follower, bounty)) in world.query_mut::<(
        &EntityId,
        &Health,
        Option<&PathFollower>,
        Option<&Bounty>,
    )>() {
        if health.is_depleted() {
            if !health.current.is_finite() {
                tracing::warn!(unit = %id, "non-finite health, removing unit");
            }
            let reward = bounty.map_or(0, |b| b.currency);
            economy.earn(reward);
            stats.units_killed += 1;
            tracing::debug!(unit = %id, reward, "unit destroyed");
            despawn_buffer.push((entity, *id));
        } else if follower.is_some_and(|f| f.goal_reached) {
            let lives = bounty.map_or(0, |b| b.lives);
            economy.lose_lives(lives);
            stats.units_leaked += 1;
            tracing::debug!(unit = %id, lives, remaining = economy.lives, "unit reached the goal");
            despawn_buffer.push((entity, *id));
        }
    }

    for (entity, (id, state)) in world.query_mut::<(&EntityId, &ProjectileState)>() {
        if state.spent {
            despawn_buffer.push((entity, *id));
        }
    }

    for (entity, id) in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
        registry.remove(id);
        units.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_unit(world: &mut World, registry: &mut Registry, id: u64, hp: f64, at_goal: bool) {
        let entity = world.spawn((
            EntityId(id),
            Health {
                current: hp,
                max: 10.0,
            },
            PathFollower {
                route: 0,
                progress: 0.0,
                speed: 1.0,
                goal_reached: at_goal,
            },
            Bounty {
                currency: 7,
                lives: 2,
            },
        ));
        registry.insert(EntityId(id), entity);
    }

    #[test]
    fn test_kill_credits_and_leak_debits() {
        let mut world = World::new();
        let mut registry = Registry::default();
        let mut units = SpatialIndex::new(2.0);
        let mut economy = Economy {
            currency: 0,
            lives: 3,
        };
        let mut stats = Statistics::default();
        let mut buffer = Vec::new();

        spawn_unit(&mut world, &mut registry, 1, 0.0, false);
        spawn_unit(&mut world, &mut registry, 2, 5.0, true);
        spawn_unit(&mut world, &mut registry, 3, -1.0, true);
        spawn_unit(&mut world, &mut registry, 4, 5.0, false);

        run(
            &mut world,
            &mut registry,
            &mut units,
            &mut economy,
            &mut stats,
            &mut buffer,
        );

        assert_eq!(economy.currency, 14);
        assert_eq!(economy.lives, 1);
        assert_eq!(stats.units_killed, 2);
        assert_eq!(stats.units_leaked, 1);
        assert_eq!(world.len(), 1);
        assert!(registry.contains(EntityId(4)));
        assert!(!registry.contains(EntityId(3)));
    }

    #[test]
    fn test_lives_saturate_at_zero() {
        let mut world = World::new();
        let mut registry = Registry::default();
        let mut units = SpatialIndex::new(2.0);
        let mut economy = Economy {
            currency: 0,
            lives: 1,
        };
        let mut stats = Statistics::default();
        let mut buffer = Vec::new();
        spawn_unit(&mut world, &mut registry, 1, 5.0, true);

        run(
            &mut world,
            &mut registry,
            &mut units,
            &mut economy,
            &mut stats,
            &mut buffer,
        );
        assert_eq!(economy.lives, 0);
    }
}
