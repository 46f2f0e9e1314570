//! Simulation engine: the authoritative game state.
//!
//! `Simulation` owns the hecs ECS world, validates player commands, runs all
//! systems in phase order on a fixed timestep, and produces `SimSnapshot`s.
//! Completely headless, enabling deterministic testing.

use hecs::{Entity, World};
use serde::{Deserialize, Serialize};

use bulwark_core::commands::{CommandOutcome, PlayerCommand};
use bulwark_core::components::*;
use bulwark_core::constants::*;
use bulwark_core::enums::{GamePhase, TargetPriority};
use bulwark_core::errors::{CommandError, ConfigError, SimError};
use bulwark_core::map::{BranchCursor, MapDefinition};
use bulwark_core::save::{
    EntityRecords, ProjectileRecord, SessionState, StructureRecord, UnitRecord,
};
use bulwark_core::state::SimSnapshot;
use bulwark_core::types::{Economy, EntityId, IdAllocator, Point, SimTime, Statistics};

use crate::clock::FixedStepClock;
use crate::spatial::SpatialIndex;
use crate::systems;
use crate::world_setup::{self, Registry};

/// Configuration for running a simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Logical ticks per simulated second.
    pub tick_rate: u32,
    /// Priority given to newly placed structures.
    pub default_priority: TargetPriority,
    /// Spatial grid bucket size in map units.
    pub spatial_cell_size: f64,
    /// Most fixed steps run by one `advance` call.
    pub max_steps_per_advance: u32,
    /// Simulated seconds per real second (0 freezes, max 4).
    pub time_scale: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate: DEFAULT_TICK_RATE,
            default_priority: TargetPriority::default(),
            spatial_cell_size: DEFAULT_SPATIAL_CELL_SIZE,
            max_steps_per_advance: DEFAULT_MAX_STEPS_PER_ADVANCE,
            time_scale: 1.0,
        }
    }
}

impl SimConfig {
    /// Seconds of simulated time per tick.
    pub fn fixed_dt(&self) -> f64 {
        1.0 / f64::from(self.tick_rate.max(1))
    }

    /// Reject values the engine would otherwise have to paper over.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason: String| Err(ConfigError::InvalidField { field, reason });
        if !(1..=MAX_TICK_RATE).contains(&self.tick_rate) {
            return invalid(
                "tick_rate",
                format!("{} is outside 1..={MAX_TICK_RATE}", self.tick_rate),
            );
        }
        if !(self.spatial_cell_size.is_finite() && self.spatial_cell_size > 0.0) {
            return invalid(
                "spatial_cell_size",
                format!("{} is not a positive number", self.spatial_cell_size),
            );
        }
        if self.max_steps_per_advance == 0 {
            return invalid("max_steps_per_advance", "must be at least 1".into());
        }
        if !(self.time_scale.is_finite() && (0.0..=MAX_TIME_SCALE).contains(&self.time_scale)) {
            return invalid(
                "time_scale",
                format!("{} is outside 0..={MAX_TIME_SCALE}", self.time_scale),
            );
        }
        Ok(())
    }
}

/// The simulation. Owns the ECS world and all sim state.
pub struct Simulation {
    config: SimConfig,
    map: MapDefinition,
    world: World,
    registry: Registry,
    ids: IdAllocator,
    time: SimTime,
    phase: GamePhase,
    economy: Economy,
    stats: Statistics,
    clock: FixedStepClock,
    /// Units, rebuilt after movement every tick.
    units_index: SpatialIndex,
    /// Structures, updated on place and sell.
    structures_index: SpatialIndex,
    /// First spawn event in `map.waves` not yet released.
    next_spawn: usize,
    /// Round-robin state per spawn point.
    branch_cursors: Vec<BranchCursor>,
    despawn_buffer: Vec<(Entity, EntityId)>,
}

impl Simulation {
    /// Start a fresh session on `map`. Spawn events due at t = 0 are
    /// released immediately.
    pub fn new(map: MapDefinition, config: SimConfig) -> Self {
        let mut sim = Self::empty(map, config);
        sim.economy = sim.map.starting;
        sim.release_spawns();
        sim.rebuild_unit_index();
        tracing::info!(
            map = %sim.map.name,
            waves = sim.map.wave_count(),
            spawn_events = sim.map.waves.len(),
            "simulation created"
        );
        sim
    }

    /// Rebuild a session from a save image.
    pub fn from_session(state: SessionState, config: SimConfig) -> Self {
        let mut sim = Self::empty(state.map, config);
        sim.time = state.time;
        sim.phase = state.phase;
        sim.economy = state.economy;
        sim.stats = state.stats;
        sim.next_spawn = state.next_spawn.min(sim.map.waves.len());
        for (slot, saved) in sim.branch_cursors.iter_mut().zip(state.branch_cursors) {
            *slot = saved;
        }

        let records = &state.entities;
        for record in &records.units {
            let Some(path) = sim.map.route(record.route) else {
                tracing::warn!(
                    unit = %record.id,
                    route = record.route,
                    "unit on unknown route, dropped"
                );
                continue;
            };
            world_setup::restore_unit(&mut sim.world, &mut sim.registry, path, record);
        }
        for record in &records.structures {
            world_setup::restore_structure(&mut sim.world, &mut sim.registry, record);
            sim.structures_index.insert(record.id, record.position);
        }
        for record in &records.projectiles {
            world_setup::restore_projectile(&mut sim.world, &mut sim.registry, record);
        }

        let floor = sim.registry.max_id().map_or(0, |id| id.0 + 1);
        if state.next_entity_id < floor {
            tracing::warn!(
                saved = state.next_entity_id,
                floor,
                "id counter behind live entities, bumping"
            );
        }
        sim.ids = IdAllocator::starting_at(state.next_entity_id.max(floor));
        sim.rebuild_unit_index();
        tracing::info!(
            map = %sim.map.name,
            tick = sim.time.tick,
            entities = sim.registry.len(),
            "simulation restored"
        );
        sim
    }

    fn empty(mut map: MapDefinition, mut config: SimConfig) -> Self {
        map.expand_sequences();
        map.sort_waves();
        config.time_scale = clamp_time_scale(config.time_scale);
        Self {
            clock: FixedStepClock::new(config.tick_rate, config.max_steps_per_advance),
            units_index: SpatialIndex::new(config.spatial_cell_size),
            structures_index: SpatialIndex::new(config.spatial_cell_size),
            branch_cursors: vec![BranchCursor::default(); map.spawn_point_count()],
            config,
            map,
            world: World::new(),
            registry: Registry::default(),
            ids: IdAllocator::default(),
            time: SimTime::default(),
            phase: GamePhase::default(),
            economy: Economy::default(),
            stats: Statistics::default(),
            next_spawn: 0,
            despawn_buffer: Vec::new(),
        }
    }

    /// Capture the session as a save image.
    pub fn to_session(&self) -> SessionState {
        SessionState {
            version: SessionState::current_version(),
            map: self.map.clone(),
            time: self.time,
            phase: self.phase,
            economy: self.economy,
            stats: self.stats.clone(),
            next_entity_id: self.ids.peek(),
            next_spawn: self.next_spawn,
            branch_cursors: self.branch_cursors.clone(),
            entities: self.entity_records(),
        }
    }

    fn entity_records(&self) -> EntityRecords {
        let mut units: Vec<UnitRecord> = self
            .world
            .query::<(
                &EntityId,
                &Unit,
                &Position,
                &Heading,
                &PathFollower,
                &Health,
                Option<&StatusEffects>,
                &Bounty,
            )>()
            .iter()
            .map(
                |(_, (id, unit, pos, heading, follower, health, effects, bounty))| UnitRecord {
                    id: *id,
                    kind: unit.kind.clone(),
                    position: pos.0,
                    heading: heading.0,
                    route: follower.route,
                    progress: follower.progress,
                    speed: follower.speed,
                    health: *health,
                    effects: effects.cloned().unwrap_or_default(),
                    bounty: *bounty,
                },
            )
            .collect();
        units.sort_by_key(|r| r.id);

        let mut structures: Vec<StructureRecord> = self
            .world
            .query::<(
                &EntityId,
                &Position,
                &Targeter,
                &Payload,
                &Economic,
                &Upgradable,
            )>()
            .iter()
            .map(
                |(_, (id, pos, targeter, payload, economic, upgradable))| StructureRecord {
                    id: *id,
                    kind: upgradable.kind.clone(),
                    tier: upgradable.tier,
                    position: pos.0,
                    targeter: *targeter,
                    payload: *payload,
                    economic: *economic,
                },
            )
            .collect();
        structures.sort_by_key(|r| r.id);

        let mut projectiles: Vec<ProjectileRecord> = self
            .world
            .query::<(
                &EntityId,
                &Position,
                &Heading,
                &Homing,
                &ProjectileState,
                &Payload,
            )>()
            .iter()
            .map(
                |(_, (id, pos, heading, homing, state, payload))| ProjectileRecord {
                    id: *id,
                    position: pos.0,
                    heading: heading.0,
                    homing: *homing,
                    state: *state,
                    payload: *payload,
                },
            )
            .collect();
        projectiles.sort_by_key(|r| r.id);

        EntityRecords {
            units,
            structures,
            projectiles,
        }
    }

    // --- Accessors ---

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn map(&self) -> &MapDefinition {
        &self.map
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn economy(&self) -> Economy {
        self.economy
    }

    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    pub fn time_scale(&self) -> f64 {
        self.config.time_scale
    }

    pub fn set_time_scale(&mut self, scale: f64) {
        self.config.time_scale = clamp_time_scale(scale);
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Spawn events not yet released.
    pub fn pending_spawns(&self) -> usize {
        self.map.waves.len() - self.next_spawn
    }

    /// Current position of any live entity.
    pub fn position_of(&self, id: EntityId) -> Option<Point> {
        let entity = self.registry.resolve(&self.world, id)?;
        self.world.get::<&Position>(entity).ok().map(|p| p.0)
    }

    /// Hostile units still in play.
    pub fn units_alive(&self) -> usize {
        self.world.query::<&Unit>().iter().count()
    }

    // --- Session phase ---

    /// Returns `true` if the phase changed.
    pub fn pause(&mut self) -> bool {
        if self.phase == GamePhase::Running {
            self.phase = GamePhase::Paused;
            self.clock.reset();
            true
        } else {
            false
        }
    }

    /// Returns `true` if the phase changed.
    pub fn resume(&mut self) -> bool {
        if self.phase == GamePhase::Paused {
            self.phase = GamePhase::Running;
            self.clock.reset();
            true
        } else {
            false
        }
    }

    // --- Ticking ---

    /// Feed `real_dt` seconds of wall-clock time and run every fixed step
    /// now due. Returns the number of ticks run.
    pub fn advance(&mut self, real_dt: f64) -> Result<u32, SimError> {
        validate_dt(real_dt)?;
        if self.phase != GamePhase::Running {
            self.clock.reset();
            return Ok(0);
        }
        let due = self.clock.push(real_dt * self.config.time_scale);
        let dt = self.clock.step_secs();
        let mut ran = 0;
        for _ in 0..due {
            self.step(dt)?;
            ran += 1;
            if self.phase != GamePhase::Running {
                self.clock.reset();
                break;
            }
        }
        Ok(ran)
    }

    /// Run one logical tick of `dt` seconds.
    ///
    /// A negative or non-finite `dt` is rejected and nothing changes. Outside
    /// `Running` the tick is a no-op.
    pub fn step(&mut self, dt: f64) -> Result<(), SimError> {
        validate_dt(dt)?;
        if self.phase != GamePhase::Running {
            return Ok(());
        }
        self.run_systems(dt);
        Ok(())
    }

    /// Run all systems in phase order.
    fn run_systems(&mut self, dt: f64) {
        // 1. Advance-Movement
        systems::movement::run(&mut self.world, &self.map.route_paths(), dt);
        systems::movement::advance_projectiles(&mut self.world, &self.registry, dt);
        systems::movement::tick_status_effects(&mut self.world, dt, &mut self.stats);
        self.rebuild_unit_index();
        // 2. Resolve-Targeting
        systems::targeting::run(&mut self.world, &self.units_index);
        // 3. Apply-Effects
        systems::combat::resolve_impacts(
            &mut self.world,
            &self.registry,
            &self.units_index,
            &mut self.stats,
        );
        systems::combat::fire(
            &mut self.world,
            &mut self.registry,
            &mut self.ids,
            &self.units_index,
            &mut self.stats,
            dt,
        );
        // 4. Resolve-Lifecycle
        systems::lifecycle::run(
            &mut self.world,
            &mut self.registry,
            &mut self.units_index,
            &mut self.economy,
            &mut self.stats,
            &mut self.despawn_buffer,
        );
        // 5. Publish-Spawns
        self.time.advance(dt);
        self.stats.time_in_game_secs = self.time.elapsed_secs;
        self.release_spawns();
        self.rebuild_unit_index();
        // 6. Phase check
        self.update_phase();
    }

    fn release_spawns(&mut self) {
        systems::wave_spawner::run(
            &mut self.world,
            &mut self.registry,
            &mut self.ids,
            &self.map,
            &mut self.next_spawn,
            &mut self.branch_cursors,
            self.time.elapsed_secs,
            &mut self.stats,
        );
    }

    fn rebuild_unit_index(&mut self) {
        let entries: Vec<(EntityId, Point)> = self
            .world
            .query::<(&EntityId, &Position, &Health)>()
            .iter()
            .map(|(_, (id, pos, _))| (*id, pos.0))
            .collect();
        self.units_index.rebuild(entries);
    }

    fn update_phase(&mut self) {
        if self.economy.lives == 0 {
            self.phase = GamePhase::Defeat;
            tracing::info!(tick = self.time.tick, "defeat: no lives left");
        } else if self.next_spawn >= self.map.waves.len() && self.units_alive() == 0 {
            self.phase = GamePhase::Victory;
            tracing::info!(tick = self.time.tick, "victory: all waves cleared");
        }
    }

    /// Build a snapshot of the current tick boundary.
    pub fn snapshot(&self) -> SimSnapshot {
        systems::snapshot::build_snapshot(
            &self.world,
            self.time,
            self.phase,
            self.economy,
            &self.stats,
            u32::try_from(self.pending_spawns()).unwrap_or(u32::MAX),
        )
    }

    // --- Commands ---

    /// Validate and apply a player command. A rejected command changes
    /// nothing.
    pub fn apply_command(
        &mut self,
        command: PlayerCommand,
    ) -> Result<CommandOutcome, CommandError> {
        let result = match command {
            PlayerCommand::PlaceStructure { position, kind } => self
                .place_structure(position, &kind)
                .map(|id| CommandOutcome::Placed { id }),
            PlayerCommand::SellStructure { id } => self
                .sell_structure(id)
                .map(|refund| CommandOutcome::Sold { refund }),
            PlayerCommand::UpgradeStructure { id } => self
                .upgrade_structure(id)
                .map(|tier| CommandOutcome::Upgraded { tier }),
            PlayerCommand::SetTargetPriority { id, priority } => self
                .set_target_priority(id, priority)
                .map(|()| CommandOutcome::PriorityChanged),
        };
        if let Err(err) = &result {
            tracing::debug!(code = err.code(), %err, "command rejected");
        }
        result
    }

    /// Build a structure of `kind` at `position`.
    pub fn place_structure(
        &mut self,
        position: Point,
        kind: &str,
    ) -> Result<EntityId, CommandError> {
        self.check_accepting()?;
        let profile = self
            .map
            .structures
            .get(kind)
            .cloned()
            .ok_or_else(|| CommandError::UnknownStructureType(kind.to_string()))?;
        if !position.is_finite() || !self.map.is_buildable(position) {
            return Err(CommandError::OutsideBuildableArea);
        }
        let spacing = 2.0 * STRUCTURE_FOOTPRINT_RADIUS;
        if let Some((other, d)) = self.structures_index.nearest(position, spacing) {
            if d < spacing {
                return Err(CommandError::Overlapping { other });
            }
        }
        if !self.economy.try_spend(profile.cost) {
            return Err(CommandError::InsufficientFunds {
                needed: profile.cost,
                available: self.economy.currency,
            });
        }

        let id = world_setup::spawn_structure(
            &mut self.world,
            &mut self.registry,
            &mut self.ids,
            kind,
            &profile,
            position,
            self.config.default_priority,
        );
        self.structures_index.insert(id, position);
        self.stats.structures_built += 1;
        tracing::debug!(structure = %id, kind, x = position.x, y = position.y, "structure placed");
        Ok(id)
    }

    /// Remove a structure and credit its refund.
    pub fn sell_structure(&mut self, id: EntityId) -> Result<u32, CommandError> {
        self.check_accepting()?;
        let entity = self.structure_entity(id)?;
        let refund = self
            .world
            .get::<&Economic>(entity)
            .map(|e| e.refund())
            .unwrap_or(0);
        let _ = self.world.despawn(entity);
        self.registry.remove(id);
        self.structures_index.remove(id);
        self.economy.earn(refund);
        tracing::debug!(structure = %id, refund, "structure sold");
        Ok(refund)
    }

    /// Move a structure to its next tier. Returns the new tier.
    pub fn upgrade_structure(&mut self, id: EntityId) -> Result<u32, CommandError> {
        self.check_accepting()?;
        let entity = self.structure_entity(id)?;
        let (targeter, payload, economic, upgradable) = self
            .world
            .query_one_mut::<(&mut Targeter, &mut Payload, &mut Economic, &mut Upgradable)>(entity)
            .map_err(|_| CommandError::UnknownStructure(id))?;
        let profile = self
            .map
            .structures
            .get(&upgradable.kind)
            .ok_or_else(|| CommandError::UnknownStructureType(upgradable.kind.clone()))?;
        let next = profile
            .tiers
            .get(upgradable.tier as usize)
            .ok_or(CommandError::MaxTierReached {
                id,
                tier: upgradable.tier,
            })?;
        if !self.economy.try_spend(next.cost) {
            return Err(CommandError::InsufficientFunds {
                needed: next.cost,
                available: self.economy.currency,
            });
        }

        targeter.range = next.range;
        targeter.cooldown_secs = next.cooldown_secs.max(0.0);
        targeter.cooldown_remaining = targeter.cooldown_remaining.min(targeter.cooldown_secs);
        payload.damage = next.damage;
        economic.invested = economic.invested.saturating_add(next.cost);
        upgradable.tier += 1;
        tracing::debug!(structure = %id, tier = upgradable.tier, "structure upgraded");
        Ok(upgradable.tier)
    }

    /// Change a structure's target priority.
    pub fn set_target_priority(
        &mut self,
        id: EntityId,
        priority: TargetPriority,
    ) -> Result<(), CommandError> {
        self.check_accepting()?;
        let entity = self.structure_entity(id)?;
        let mut targeter = self
            .world
            .get::<&mut Targeter>(entity)
            .map_err(|_| CommandError::UnknownStructure(id))?;
        targeter.priority = priority;
        Ok(())
    }

    fn check_accepting(&self) -> Result<(), CommandError> {
        if self.phase.is_over() {
            Err(CommandError::NotAccepting(self.phase))
        } else {
            Ok(())
        }
    }

    fn structure_entity(&self, id: EntityId) -> Result<Entity, CommandError> {
        self.registry
            .resolve(&self.world, id)
            .filter(|&entity| self.world.get::<&Structure>(entity).is_ok())
            .ok_or(CommandError::UnknownStructure(id))
    }

    /// Spawn a unit outside the wave schedule.
    #[cfg(test)]
    pub(crate) fn spawn_test_unit(&mut self, kind: &str) -> EntityId {
        let profile = self.map.units[kind].clone();
        let id = world_setup::spawn_unit(
            &mut self.world,
            &mut self.registry,
            &mut self.ids,
            0,
            &self.map.path,
            kind,
            &profile,
        );
        self.rebuild_unit_index();
        id
    }

    /// Overwrite a unit's health.
    #[cfg(test)]
    pub(crate) fn set_health(&mut self, id: EntityId, current: f64) {
        if let Some(entity) = self.registry.resolve(&self.world, id) {
            if let Ok(mut health) = self.world.get::<&mut Health>(entity) {
                health.current = current;
            }
        }
    }
}

fn validate_dt(dt: f64) -> Result<(), SimError> {
    if dt.is_finite() && dt >= 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidTimestep(dt))
    }
}

fn clamp_time_scale(scale: f64) -> f64 {
    if scale.is_finite() {
        scale.clamp(0.0, MAX_TIME_SCALE)
    } else {
        1.0
    }
}
