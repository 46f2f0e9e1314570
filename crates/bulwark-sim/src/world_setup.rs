//! Entity spawn factories and the id registry.
//!
//! Every entity carries its `EntityId` as a component. The registry maps ids
//! back to hecs handles; an id that is no longer registered resolves to
//! `None`, which is how weak references detect that their target is gone.

use std::collections::BTreeMap;

use hecs::{Entity, World};

use bulwark_core::components::*;
use bulwark_core::constants::PROJECTILE_MAX_LIFETIME_SECS;
use bulwark_core::enums::TargetPriority;
use bulwark_core::map::{StructureProfile, UnitProfile};
use bulwark_core::path::Path;
use bulwark_core::save::{ProjectileRecord, StructureRecord, UnitRecord};
use bulwark_core::types::{EntityId, IdAllocator, Point};

/// Live `EntityId` to hecs handle lookup.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    entities: BTreeMap<EntityId, Entity>,
}

impl Registry {
    pub fn insert(&mut self, id: EntityId, entity: Entity) {
        self.entities.insert(id, entity);
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    /// Handle for `id`, if it is still alive in `world`.
    pub fn resolve(&self, world: &World, id: EntityId) -> Option<Entity> {
        self.entities
            .get(&id)
            .copied()
            .filter(|&entity| world.contains(entity))
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Highest registered id.
    pub fn max_id(&self) -> Option<EntityId> {
        self.entities.keys().next_back().copied()
    }
}

/// Spawn a unit of `kind` at the start of `path`, which is route `route`.
pub fn spawn_unit(
    world: &mut World,
    registry: &mut Registry,
    ids: &mut IdAllocator,
    route: usize,
    path: &Path,
    kind: &str,
    profile: &UnitProfile,
) -> EntityId {
    let id = ids.allocate();
    let sample = path.position_at(0.0);
    let entity = world.spawn((
        id,
        Unit {
            kind: kind.to_string(),
        },
        Position(sample.position),
        Heading(sample.heading),
        PathFollower {
            route,
            progress: 0.0,
            speed: profile.speed.max(0.0),
            goal_reached: sample.goal_reached,
        },
        Health::full(profile.max_health),
        StatusEffects::default(),
        Bounty {
            currency: profile.bounty,
            lives: profile.goal_damage,
        },
    ));
    registry.insert(id, entity);
    id
}

/// Spawn a base-tier structure of `kind` at `position`.
pub fn spawn_structure(
    world: &mut World,
    registry: &mut Registry,
    ids: &mut IdAllocator,
    kind: &str,
    profile: &StructureProfile,
    position: Point,
    priority: TargetPriority,
) -> EntityId {
    let id = ids.allocate();
    let entity = world.spawn((
        id,
        Structure,
        Position(position),
        Targeter {
            range: profile.range,
            cooldown_secs: profile.cooldown_secs.max(0.0),
            cooldown_remaining: 0.0,
            priority,
            target: None,
        },
        Payload {
            damage: profile.damage,
            delivery: profile.delivery,
            splash_radius: profile.splash_radius,
            effect: profile.effect,
        },
        Economic {
            invested: profile.cost,
            sell_ratio: profile.sell_ratio,
        },
        Upgradable {
            kind: kind.to_string(),
            tier: 0,
        },
    ));
    registry.insert(id, entity);
    id
}

/// Launch a homing projectile from `origin` toward `target`.
#[allow(clippy::too_many_arguments)]
pub fn spawn_projectile(
    world: &mut World,
    registry: &mut Registry,
    ids: &mut IdAllocator,
    source: EntityId,
    target: EntityId,
    origin: Point,
    speed: f64,
    payload: Payload,
) -> EntityId {
    let id = ids.allocate();
    let entity = world.spawn((
        id,
        Projectile,
        Position(origin),
        Heading(0.0),
        Homing { speed },
        ProjectileState {
            target,
            source,
            lifetime_remaining: PROJECTILE_MAX_LIFETIME_SECS,
            arrived: false,
            spent: false,
        },
        payload,
    ));
    registry.insert(id, entity);
    id
}

// --- Restoring from save records ---

/// `path` is the route the record walks.
pub fn restore_unit(world: &mut World, registry: &mut Registry, path: &Path, record: &UnitRecord) {
    let entity = world.spawn((
        record.id,
        Unit {
            kind: record.kind.clone(),
        },
        Position(record.position),
        Heading(record.heading),
        PathFollower {
            route: record.route,
            progress: record.progress,
            speed: record.speed,
            goal_reached: record.progress >= path.length(),
        },
        record.health,
        record.effects.clone(),
        record.bounty,
    ));
    registry.insert(record.id, entity);
}

pub fn restore_structure(world: &mut World, registry: &mut Registry, record: &StructureRecord) {
    let entity = world.spawn((
        record.id,
        Structure,
        Position(record.position),
        record.targeter,
        record.payload,
        record.economic,
        Upgradable {
            kind: record.kind.clone(),
            tier: record.tier,
        },
    ));
    registry.insert(record.id, entity);
}

pub fn restore_projectile(world: &mut World, registry: &mut Registry, record: &ProjectileRecord) {
    let entity = world.spawn((
        record.id,
        Projectile,
        Position(record.position),
        Heading(record.heading),
        record.homing,
        record.state,
        record.payload,
    ));
    registry.insert(record.id, entity);
}
