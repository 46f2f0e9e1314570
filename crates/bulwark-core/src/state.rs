//! Simulation snapshot: the complete visible state handed to the renderer.
//!
//! A snapshot owns all of its data. Nothing in it borrows from or aliases the
//! live world, so a renderer can hold one for as long as it likes.

use serde::{Deserialize, Serialize};

use crate::enums::{EffectKind, GamePhase, TargetPriority};
use crate::types::{Economy, EntityId, Point, SimTime, Statistics};

/// Complete game state at a tick boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimSnapshot {
    /// Increments with every published snapshot.
    pub sequence: u64,
    pub time: SimTime,
    pub phase: GamePhase,
    pub economy: Economy,
    pub stats: Statistics,
    /// Sorted by id.
    pub units: Vec<UnitView>,
    /// Sorted by id.
    pub structures: Vec<StructureView>,
    /// Sorted by id.
    pub projectiles: Vec<ProjectileView>,
    /// Spawn events not yet released.
    pub pending_spawns: u32,
}

impl SimSnapshot {
    pub fn unit(&self, id: EntityId) -> Option<&UnitView> {
        self.units
            .binary_search_by_key(&id, |u| u.id)
            .ok()
            .map(|i| &self.units[i])
    }

    pub fn structure(&self, id: EntityId) -> Option<&StructureView> {
        self.structures
            .binary_search_by_key(&id, |s| s.id)
            .ok()
            .map(|i| &self.structures[i])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitView {
    pub id: EntityId,
    pub kind: String,
    pub position: Point,
    pub heading: f64,
    pub route: usize,
    pub progress: f64,
    pub health: f64,
    pub max_health: f64,
    pub effects: Vec<EffectKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureView {
    pub id: EntityId,
    pub kind: String,
    pub tier: u32,
    pub position: Point,
    pub range: f64,
    pub cooldown_remaining: f64,
    pub priority: TargetPriority,
    pub target: Option<EntityId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileView {
    pub id: EntityId,
    pub position: Point,
    pub heading: f64,
    pub target: EntityId,
}
