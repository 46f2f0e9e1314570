//! Fundamental identity, geometric, and simulation time types.

use std::fmt;

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// A point or displacement in world space (map units).
pub type Point = DVec2;

/// Session-unique entity identity.
///
/// Allocated from a monotonic counter and never reused, so a stale id held by
/// a projectile or targeter resolves to "missing" instead of a new entity.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic allocator for [`EntityId`]s.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    /// Resume allocation after `next` (used when restoring a save).
    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }

    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }

    /// The id the next call to `allocate` will hand out.
    pub fn peek(&self) -> u64 {
        self.next
    }
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimTime {
    /// Logical ticks run so far.
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Advance by one tick of `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        self.tick += 1;
        self.elapsed_secs += dt;
    }
}

/// Player resources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Economy {
    pub currency: u32,
    pub lives: u32,
}

impl Economy {
    pub fn can_afford(&self, cost: u32) -> bool {
        self.currency >= cost
    }

    /// Spend `cost`, or return `false` and leave the balance untouched.
    pub fn try_spend(&mut self, cost: u32) -> bool {
        match self.currency.checked_sub(cost) {
            Some(rest) => {
                self.currency = rest;
                true
            }
            None => false,
        }
    }

    pub fn earn(&mut self, amount: u32) {
        self.currency = self.currency.saturating_add(amount);
    }

    /// Remove lives, bottoming out at zero.
    pub fn lose_lives(&mut self, amount: u32) {
        self.lives = self.lives.saturating_sub(amount);
    }
}

/// Running statistics for a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub units_killed: u32,
    pub units_leaked: u32,
    pub damage_dealt: f64,
    pub shots_fired: u32,
    pub structures_built: u32,
    pub waves_started: u32,
    pub time_in_game_secs: f64,
}
