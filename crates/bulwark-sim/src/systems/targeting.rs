//! Resolve-Targeting: each structure picks one in-range unit.
//!
//! Candidates come from the unit spatial index, which was rebuilt after
//! movement, so every structure sees the same finished positions.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use hecs::World;

use bulwark_core::components::{Health, PathFollower, Position, Targeter};
use bulwark_core::enums::TargetPriority;
use bulwark_core::types::{EntityId, Point};

use crate::spatial::SpatialIndex;

/// What a targeter knows about a unit when ranking it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub id: EntityId,
    pub distance: f64,
    pub progress: f64,
    pub health: f64,
}

/// Ordering under `priority`; `Less` means "shoot this one first".
///
/// Every policy falls through to distance, then lowest health, then id.
pub fn compare(priority: TargetPriority, a: &Candidate, b: &Candidate) -> Ordering {
    let primary = match priority {
        TargetPriority::Nearest => Ordering::Equal,
        TargetPriority::First => b.progress.total_cmp(&a.progress),
        TargetPriority::Last => a.progress.total_cmp(&b.progress),
        TargetPriority::Strongest => b.health.total_cmp(&a.health),
        TargetPriority::Weakest => a.health.total_cmp(&b.health),
    };
    primary
        .then_with(|| a.distance.total_cmp(&b.distance))
        .then_with(|| a.health.total_cmp(&b.health))
        .then_with(|| a.id.cmp(&b.id))
}

struct Eligible {
    position: Point,
    progress: f64,
    health: f64,
}

/// Assign `Targeter::target` for every structure.
pub fn run(world: &mut World, units: &SpatialIndex) {
    // Damageable, alive, and not already leaking.
    let eligible: BTreeMap<EntityId, Eligible> = world
        .query::<(&EntityId, &Health, Option<&PathFollower>)>()
        .iter()
        .filter(|(_, (_, health, follower))| {
            !health.is_depleted() && !follower.is_some_and(|f| f.goal_reached)
        })
        .filter_map(|(_, (id, health, follower))| {
            units.position_of(*id).map(|position| {
                (
                    *id,
                    Eligible {
                        position,
                        progress: follower.map_or(0.0, |f| f.progress),
                        health: health.current,
                    },
                )
            })
        })
        .collect();

    for (_entity, (pos, targeter)) in world.query_mut::<(&Position, &mut Targeter)>() {
        targeter.target = units
            .query_within_radius(pos.0, targeter.range)
            .into_iter()
            .filter_map(|id| {
                eligible.get(&id).map(|unit| Candidate {
                    id,
                    distance: pos.0.distance(unit.position),
                    progress: unit.progress,
                    health: unit.health,
                })
            })
            .min_by(|a, b| compare(targeter.priority, a, b))
            .map(|c| c.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: u64, distance: f64, progress: f64, health: f64) -> Candidate {
        Candidate {
            id: EntityId(id),
            distance,
            progress,
            health,
        }
    }

    fn best(priority: TargetPriority, pool: &[Candidate]) -> EntityId {
        pool.iter()
            .min_by(|a, b| compare(priority, a, b))
            .unwrap()
            .id
    }

    #[test]
    fn test_nearest_breaks_ties_by_health_then_id() {
        let pool = [
            candidate(3, 1.0, 0.0, 5.0),
            candidate(1, 1.0, 0.0, 5.0),
            candidate(2, 1.0, 0.0, 4.0),
            candidate(4, 2.0, 0.0, 1.0),
        ];
        assert_eq!(best(TargetPriority::Nearest, &pool), EntityId(2));
        assert_eq!(best(TargetPriority::Nearest, &pool[..2]), EntityId(1));
    }

    #[test]
    fn test_each_policy_picks_its_primary_key() {
        let pool = [
            candidate(1, 3.0, 8.0, 20.0),
            candidate(2, 1.0, 2.0, 5.0),
            candidate(3, 2.0, 5.0, 50.0),
        ];
        assert_eq!(best(TargetPriority::Nearest, &pool), EntityId(2));
        assert_eq!(best(TargetPriority::First, &pool), EntityId(1));
        assert_eq!(best(TargetPriority::Last, &pool), EntityId(2));
        assert_eq!(best(TargetPriority::Strongest, &pool), EntityId(3));
        assert_eq!(best(TargetPriority::Weakest, &pool), EntityId(2));
    }

    #[test]
    fn test_structure_picks_unit_in_range_only() {
        let mut world = World::new();
        let mut units = SpatialIndex::new(2.0);
        for (id, x) in [(1u64, 1.0), (2, 4.0)] {
            world.spawn((
                EntityId(id),
                Health::full(10.0),
                PathFollower {
                    route: 0,
                    progress: x,
                    speed: 1.0,
                    goal_reached: false,
                },
            ));
            units.insert(EntityId(id), Point::new(x, 0.0));
        }
        let tower = world.spawn((
            Position(Point::new(5.0, 0.0)),
            Targeter {
                range: 2.0,
                cooldown_secs: 1.0,
                cooldown_remaining: 0.0,
                priority: TargetPriority::Nearest,
                target: None,
            },
        ));
        run(&mut world, &units);
        assert_eq!(
            world.get::<&Targeter>(tower).unwrap().target,
            Some(EntityId(2))
        );
    }
}
