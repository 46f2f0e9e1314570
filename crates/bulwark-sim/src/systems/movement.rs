//! Advance-Movement: path followers, homing projectiles, and status effects.
//!
//! Path progress is integrated as `speed * slow_factor * dt` and clamped to
//! the path length, so it never decreases and never overshoots the goal.

use hecs::{Entity, World};

use bulwark_core::components::*;
use bulwark_core::constants::{PROJECTILE_HIT_RADIUS, TIMER_EPSILON};
use bulwark_core::enums::EffectKind;
use bulwark_core::geometry::heading_between;
use bulwark_core::path::Path;
use bulwark_core::types::{EntityId, Point, Statistics};

use crate::world_setup::Registry;

/// Move every path follower along its route. `routes` is indexed by
/// `PathFollower::route`; a follower on an unknown route does not move.
pub fn run(world: &mut World, routes: &[&Path], dt: f64) {
    for (_entity, (id, follower, pos, heading, effects)) in world.query_mut::<(
        &EntityId,
        &mut PathFollower,
        &mut Position,
        &mut Heading,
        Option<&StatusEffects>,
    )>() {
        let Some(path) = routes.get(follower.route) else {
            tracing::warn!(unit = %id, route = follower.route, "unit on unknown route");
            continue;
        };
        let length = path.length();
        let factor = effects.map_or(1.0, StatusEffects::speed_factor);
        // `max` discards NaN, so a corrupt speed stalls the unit instead of
        // poisoning its progress.
        let travel = (follower.speed * factor).max(0.0) * dt;
        follower.progress = (follower.progress + travel).min(length).max(follower.progress);

        let sample = path.position_at(follower.progress);
        pos.0 = sample.position;
        heading.0 = sample.heading;
        follower.goal_reached = sample.goal_reached;
    }
}

/// Steer projectiles at their target's current position.
///
/// A projectile whose target no longer resolves is marked spent (a miss).
pub fn advance_projectiles(world: &mut World, registry: &Registry, dt: f64) {
    let aims: Vec<(Entity, Option<Point>)> = world
        .query::<&ProjectileState>()
        .iter()
        .filter(|(_, state)| !state.spent && !state.arrived)
        .map(|(entity, state)| (entity, target_position(world, registry, state.target)))
        .collect();

    for (entity, aim) in aims {
        let Ok((id, pos, heading, homing, state)) = world.query_one_mut::<(
            &EntityId,
            &mut Position,
            &mut Heading,
            &Homing,
            &mut ProjectileState,
        )>(entity) else {
            continue;
        };

        match aim {
            None => {
                tracing::debug!(projectile = %id, target = %state.target, "target gone, projectile misses");
                state.spent = true;
                continue;
            }
            Some(target) => {
                let distance = pos.0.distance(target);
                let reach = homing.speed.max(0.0) * dt;
                if distance > 0.0 {
                    heading.0 = heading_between(pos.0, target);
                }
                if distance <= reach + PROJECTILE_HIT_RADIUS {
                    pos.0 = target;
                    state.arrived = true;
                } else {
                    pos.0 += (target - pos.0) / distance * reach;
                }
            }
        }

        state.lifetime_remaining = (state.lifetime_remaining - dt).max(0.0);
        if !state.arrived && state.lifetime_remaining <= TIMER_EPSILON {
            tracing::debug!(projectile = %id, "projectile expired");
            state.spent = true;
        }
    }
}

/// Tick burn damage and expire finished effects.
pub fn tick_status_effects(world: &mut World, dt: f64, stats: &mut Statistics) {
    let mut dealt: Vec<(EntityId, f64)> = Vec::new();
    for (_entity, (id, effects, health)) in
        world.query_mut::<(&EntityId, &mut StatusEffects, &mut Health)>()
    {
        for effect in &mut effects.active {
            let active_for = dt.min(effect.remaining_secs).max(0.0);
            if effect.kind == EffectKind::Burn && !health.is_depleted() {
                let damage = effect.magnitude.max(0.0) * active_for;
                health.current -= damage;
                dealt.push((*id, damage));
            }
            effect.remaining_secs -= dt;
        }
        effects.active.retain(|e| e.remaining_secs > TIMER_EPSILON);
    }
    // Summed in id order so the total does not depend on archetype layout.
    dealt.sort_by_key(|(id, _)| *id);
    stats.damage_dealt += dealt.iter().map(|(_, d)| d).sum::<f64>();
}

/// Current position of a live, damageable target.
pub(crate) fn target_position(world: &World, registry: &Registry, id: EntityId) -> Option<Point> {
    let entity = registry.resolve(world, id)?;
    let health = world.get::<&Health>(entity).ok()?;
    if health.is_depleted() {
        return None;
    }
    world.get::<&Position>(entity).ok().map(|p| p.0)
}
