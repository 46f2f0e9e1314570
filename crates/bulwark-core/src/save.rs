//! Save-state data shape.
//!
//! A `SessionState` is a flat, serializable image of a session taken at a
//! tick boundary. Entity records carry their components verbatim so a reload
//! rebuilds exactly the same world, ids included.

use serde::{Deserialize, Serialize};

use crate::components::{
    Bounty, Economic, Health, Homing, Payload, ProjectileState, StatusEffects, Targeter,
};
use crate::constants::SAVE_FORMAT_VERSION;
use crate::enums::GamePhase;
use crate::map::{BranchCursor, MapDefinition};
use crate::types::{Economy, EntityId, Point, SimTime, Statistics};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRecord {
    pub id: EntityId,
    pub kind: String,
    pub position: Point,
    pub heading: f64,
    #[serde(default)]
    pub route: usize,
    pub progress: f64,
    pub speed: f64,
    pub health: Health,
    #[serde(default)]
    pub effects: StatusEffects,
    pub bounty: Bounty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureRecord {
    pub id: EntityId,
    pub kind: String,
    pub tier: u32,
    pub position: Point,
    pub targeter: Targeter,
    pub payload: Payload,
    pub economic: Economic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileRecord {
    pub id: EntityId,
    pub position: Point,
    pub heading: f64,
    pub homing: Homing,
    pub state: ProjectileState,
    pub payload: Payload,
}

/// Live entities at the moment of saving.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityRecords {
    pub units: Vec<UnitRecord>,
    pub structures: Vec<StructureRecord>,
    pub projectiles: Vec<ProjectileRecord>,
}

impl EntityRecords {
    /// All ids in the records, in record order.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.units
            .iter()
            .map(|u| u.id)
            .chain(self.structures.iter().map(|s| s.id))
            .chain(self.projectiles.iter().map(|p| p.id))
    }
}

/// A complete session image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub version: u32,
    pub map: MapDefinition,
    pub time: SimTime,
    pub phase: GamePhase,
    pub economy: Economy,
    pub stats: Statistics,
    /// Next id the allocator will hand out.
    pub next_entity_id: u64,
    /// Index of the first spawn event in `map.waves` not yet released.
    pub next_spawn: usize,
    /// Round-robin state per spawn point. Missing entries start fresh.
    #[serde(default)]
    pub branch_cursors: Vec<BranchCursor>,
    pub entities: EntityRecords,
}

impl SessionState {
    pub fn current_version() -> u32 {
        SAVE_FORMAT_VERSION
    }
}
