//! Apply-Effects: projectile impacts, then structure fire.
//!
//! Damage and status effects are applied through `apply_payload`, which
//! resolves splash victims through the unit spatial index.

use hecs::{Entity, World};

use bulwark_core::components::*;
use bulwark_core::constants::TIMER_EPSILON;
use bulwark_core::enums::Delivery;
use bulwark_core::types::{EntityId, IdAllocator, Point, Statistics};

use crate::spatial::SpatialIndex;
use crate::systems::movement::target_position;
use crate::world_setup::{self, Registry};

/// Land every projectile that arrived this tick.
pub fn resolve_impacts(
    world: &mut World,
    registry: &Registry,
    units: &SpatialIndex,
    stats: &mut Statistics,
) {
    let mut arrivals: Vec<(EntityId, Entity, EntityId, Point, Payload)> = world
        .query::<(&EntityId, &ProjectileState, &Position, &Payload)>()
        .iter()
        .filter(|(_, (_, state, _, _))| state.arrived && !state.spent)
        .map(|(entity, (id, state, pos, payload))| (*id, entity, state.target, pos.0, *payload))
        .collect();
    arrivals.sort_by_key(|a| a.0);

    for (_, entity, target, impact, payload) in arrivals {
        if target_position(world, registry, target).is_some() {
            apply_payload(world, registry, units, target, impact, &payload, stats);
        } else {
            tracing::debug!(%target, "projectile arrived after its target was destroyed");
        }
        if let Ok(mut state) = world.get::<&mut ProjectileState>(entity) {
            state.spent = true;
        }
    }
}

struct FireOrder {
    structure: Entity,
    source: EntityId,
    origin: Point,
    target: EntityId,
    payload: Payload,
}

/// Count down cooldowns and fire every ready structure that has a target.
pub fn fire(
    world: &mut World,
    registry: &mut Registry,
    ids: &mut IdAllocator,
    units: &SpatialIndex,
    stats: &mut Statistics,
    dt: f64,
) {
    for (_entity, targeter) in world.query_mut::<&mut Targeter>() {
        targeter.cooldown_remaining = (targeter.cooldown_remaining - dt).max(0.0);
    }

    let mut orders: Vec<FireOrder> = world
        .query::<(&EntityId, &Position, &Targeter, &Payload)>()
        .iter()
        .filter(|(_, (_, _, targeter, _))| targeter.cooldown_remaining <= TIMER_EPSILON)
        .filter_map(|(structure, (id, pos, targeter, payload))| {
            targeter.target.map(|target| FireOrder {
                structure,
                source: *id,
                origin: pos.0,
                target,
                payload: *payload,
            })
        })
        .collect();
    orders.sort_by_key(|o| o.source);

    for order in orders {
        // An earlier instant hit this tick may already have killed it.
        let Some(aim) = target_position(world, registry, order.target) else {
            continue;
        };
        if let Ok(mut targeter) = world.get::<&mut Targeter>(order.structure) {
            targeter.cooldown_remaining = targeter.cooldown_secs;
        }
        stats.shots_fired += 1;

        match order.payload.delivery {
            Delivery::Instant => {
                apply_payload(
                    world,
                    registry,
                    units,
                    order.target,
                    aim,
                    &order.payload,
                    stats,
                );
            }
            Delivery::Projectile { speed } => {
                world_setup::spawn_projectile(
                    world,
                    registry,
                    ids,
                    order.source,
                    order.target,
                    order.origin,
                    speed,
                    order.payload,
                );
            }
        }
    }
}

/// Deal `payload` to `primary`, and to every unit within its splash radius
/// of `center`.
pub fn apply_payload(
    world: &mut World,
    registry: &Registry,
    units: &SpatialIndex,
    primary: EntityId,
    center: Point,
    payload: &Payload,
    stats: &mut Statistics,
) {
    let mut victims = match payload.splash_radius {
        Some(radius) => units.query_within_radius(center, radius),
        None => Vec::new(),
    };
    if !victims.contains(&primary) {
        victims.push(primary);
    }

    let effect = payload.effect.as_ref().map(ActiveEffect::from_profile);
    for victim in victims {
        let Some(entity) = registry.resolve(world, victim) else {
            continue;
        };
        let Ok((health, effects)) =
            world.query_one_mut::<(&mut Health, Option<&mut StatusEffects>)>(entity)
        else {
            continue;
        };
        if health.is_depleted() {
            continue;
        }
        let damage = payload.damage.max(0.0);
        health.current -= damage;
        stats.damage_dealt += damage;
        if let (Some(effects), Some(effect)) = (effects, effect) {
            effects.apply(effect);
        }
    }
}
