//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Session phase. Only `Running` advances the world.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    Running,
    Paused,
    /// Wave schedule exhausted and no hostile units remain.
    Victory,
    /// Lives reached zero.
    Defeat,
}

impl GamePhase {
    pub fn is_over(self) -> bool {
        matches!(self, GamePhase::Victory | GamePhase::Defeat)
    }
}

/// Which in-range unit a structure prefers.
///
/// Every policy falls back to distance, then lowest health, then id, so the
/// ordering is total and identical across runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetPriority {
    /// Closest to the structure.
    #[default]
    Nearest,
    /// Furthest along the path (closest to the goal).
    First,
    /// Least far along the path.
    Last,
    /// Highest current health.
    Strongest,
    /// Lowest current health.
    Weakest,
}

/// How a structure's payload reaches its target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Delivery {
    /// Damage lands the tick the structure fires.
    #[default]
    Instant,
    /// A homing projectile travels to the target at `speed` units/second.
    Projectile { speed: f64 },
}

/// Status effect family. A unit carries at most one effect per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EffectKind {
    Slow,
    Burn,
}

/// Entity kind as seen by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Unit,
    Structure,
    Projectile,
}
