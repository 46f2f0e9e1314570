//! ECS components for hecs entities.
//!
//! Components are plain data. Each one is a capability the tick loop
//! dispatches on, so an entity kind is just the set it carries:
//!
//! - unit: `PathFollower` + `Health` + `StatusEffects` + `Bounty`
//! - structure: `Targeter` + `Payload` + `Economic` + `Upgradable`
//! - projectile: `Homing` + `ProjectileState` + `Payload`

use serde::{Deserialize, Serialize};

use crate::enums::{Delivery, EffectKind, TargetPriority};
use crate::map::EffectProfile;
use crate::types::{EntityId, Point};

/// World-space position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position(pub Point);

/// Facing in radians, `atan2(dy, dx)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Heading(pub f64);

// --- Movable ---

/// Walks one of the map's routes. `progress` only ever increases.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathFollower {
    /// Route index, see `MapDefinition::route`.
    pub route: usize,
    pub progress: f64,
    /// Base speed before status effects (units/second).
    pub speed: f64,
    /// Set when progress reached the end of the path this tick.
    pub goal_reached: bool,
}

/// Flies straight at a target's current position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Homing {
    pub speed: f64,
}

// --- Damageable ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub current: f64,
    pub max: f64,
}

impl Health {
    pub fn full(max: f64) -> Self {
        Self { current: max, max }
    }

    /// Dead, or holding a value no rule can act on.
    pub fn is_depleted(&self) -> bool {
        !self.current.is_finite() || self.current <= 0.0
    }
}

/// An effect currently applied to a unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub kind: EffectKind,
    /// Slow: speed multiplier. Burn: damage per second.
    pub magnitude: f64,
    pub remaining_secs: f64,
}

impl ActiveEffect {
    pub fn from_profile(profile: &EffectProfile) -> Self {
        match *profile {
            EffectProfile::Slow {
                factor,
                duration_secs,
            } => Self {
                kind: EffectKind::Slow,
                magnitude: factor.clamp(0.0, 1.0),
                remaining_secs: duration_secs,
            },
            EffectProfile::Burn {
                damage_per_sec,
                duration_secs,
            } => Self {
                kind: EffectKind::Burn,
                magnitude: damage_per_sec,
                remaining_secs: duration_secs,
            },
        }
    }
}

/// Active status effects, at most one per [`EffectKind`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusEffects {
    pub active: Vec<ActiveEffect>,
}

impl StatusEffects {
    /// Apply `effect`, refreshing the duration of an existing effect of the
    /// same kind and keeping the stronger magnitude.
    pub fn apply(&mut self, effect: ActiveEffect) {
        match self.active.iter_mut().find(|e| e.kind == effect.kind) {
            Some(existing) => {
                existing.remaining_secs = existing.remaining_secs.max(effect.remaining_secs);
                existing.magnitude = match effect.kind {
                    // Smaller factor is the stronger slow.
                    EffectKind::Slow => existing.magnitude.min(effect.magnitude),
                    EffectKind::Burn => existing.magnitude.max(effect.magnitude),
                };
            }
            None => {
                self.active.push(effect);
                self.active.sort_by_key(|e| e.kind);
            }
        }
    }

    /// Speed multiplier from any active slow.
    pub fn speed_factor(&self) -> f64 {
        self.active
            .iter()
            .filter(|e| e.kind == EffectKind::Slow)
            .map(|e| e.magnitude)
            .fold(1.0, f64::min)
    }

    pub fn has(&self, kind: EffectKind) -> bool {
        self.active.iter().any(|e| e.kind == kind)
    }
}

// --- Targeter ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Targeter {
    pub range: f64,
    pub cooldown_secs: f64,
    /// Time until the structure may fire again. Never negative.
    pub cooldown_remaining: f64,
    pub priority: TargetPriority,
    /// Target chosen this tick, by id only.
    pub target: Option<EntityId>,
}

/// What a hit delivers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub damage: f64,
    pub delivery: Delivery,
    pub splash_radius: Option<f64>,
    pub effect: Option<EffectProfile>,
}

// --- Economic ---

/// Currency sunk into a structure, and how much of it a sale returns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Economic {
    pub invested: u32,
    pub sell_ratio: f64,
}

impl Economic {
    pub fn refund(&self) -> u32 {
        (f64::from(self.invested) * self.sell_ratio.clamp(0.0, 1.0)).floor() as u32
    }
}

/// Reward and penalty attached to a unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounty {
    pub currency: u32,
    pub lives: u32,
}

/// Structure archetype and current upgrade tier (0 = base).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Upgradable {
    pub kind: String,
    pub tier: u32,
}

// --- Projectile ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileState {
    /// Weak reference; may resolve to nothing if the target died mid-flight.
    pub target: EntityId,
    /// Structure that fired it (may have been sold since).
    pub source: EntityId,
    pub lifetime_remaining: f64,
    /// Reached the target this tick, damage pending.
    pub arrived: bool,
    /// Finished (hit, missed, or expired); removed in lifecycle.
    pub spent: bool,
}

// --- Kind markers (presentation grouping only) ---

/// Marks a hostile unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    /// Key into the map's unit catalog.
    pub kind: String,
}

/// Marks a player structure.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Structure;

/// Marks a projectile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Projectile;
