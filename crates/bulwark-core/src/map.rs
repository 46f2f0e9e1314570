//! Map definition: the data a session starts from.
//!
//! This is the shape the persistence adapter must produce. Unit and structure
//! catalogs are keyed by name; a map that omits them gets the built-in set.
//!
//! Routes are numbered with `path` as route 0 and `routes[i]` as route
//! `i + 1`. Every route leaves from a spawn point; units spawned there are
//! split across its routes by weighted round-robin.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_GOAL_DAMAGE, DEFAULT_ROUTE_WEIGHT, DEFAULT_SELL_RATIO, MAP_BOUNDS_MARGIN,
};
use crate::enums::Delivery;
use crate::geometry::{point_in_circle, point_in_rect};
use crate::path::Path;
use crate::types::{Economy, Point};

/// Area where structures may be placed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape")]
pub enum Region {
    Circle { center: Point, radius: f64 },
    Rect { min: Point, max: Point },
}

impl Region {
    pub fn contains(&self, point: Point) -> bool {
        match *self {
            Region::Circle { center, radius } => point_in_circle(point, center, radius),
            Region::Rect { min, max } => point_in_rect(point, min, max),
        }
    }

    fn extent(&self) -> (Point, Point) {
        match *self {
            Region::Circle { center, radius } => {
                (center - Point::splat(radius), center + Point::splat(radius))
            }
            Region::Rect { min, max } => (min, max),
        }
    }
}

/// One scheduled unit arrival.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnEvent {
    /// Key into `MapDefinition::units`.
    pub unit: String,
    /// Simulation time at which the unit appears at the path start.
    pub at_secs: f64,
    /// Wave number, for statistics and presentation.
    #[serde(default)]
    pub wave: u32,
    /// Spawn point the unit leaves from.
    #[serde(default)]
    pub spawn_point: u32,
}

/// Units released one after another from a spawn point, `interval_secs`
/// apart. Expanded into `SpawnEvent`s when the map is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnSequence {
    pub first_at_secs: f64,
    pub interval_secs: f64,
    pub units: Vec<String>,
    #[serde(default)]
    pub wave: u32,
    #[serde(default)]
    pub spawn_point: u32,
}

impl SpawnSequence {
    pub fn events(&self) -> impl Iterator<Item = SpawnEvent> + '_ {
        self.units.iter().enumerate().map(|(i, unit)| SpawnEvent {
            unit: unit.clone(),
            at_secs: self.first_at_secs + i as f64 * self.interval_secs,
            wave: self.wave,
            spawn_point: self.spawn_point,
        })
    }
}

/// An additional trajectory from a spawn point to the goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub path: Path,
    #[serde(default)]
    pub spawn_point: u32,
    /// Consecutive units sent down this route before the next one gets a
    /// turn.
    #[serde(default = "default_route_weight")]
    pub weight: u32,
}

/// Weighted round-robin state for one spawn point.
///
/// `branch` indexes the spawn point's routes in route order; `served` units
/// have taken it since it was last switched to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchCursor {
    pub branch: usize,
    pub served: u32,
}

impl BranchCursor {
    /// Pick the branch for the next unit given the branch weights. `None`
    /// when there are no branches.
    pub fn next(&mut self, weights: &[u32]) -> Option<usize> {
        if weights.is_empty() {
            return None;
        }
        if self.branch >= weights.len() {
            *self = Self::default();
        }
        if self.served >= weights[self.branch].max(1) {
            self.branch = (self.branch + 1) % weights.len();
            self.served = 0;
        }
        self.served += 1;
        Some(self.branch)
    }
}

/// Enemy archetype stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitProfile {
    pub max_health: f64,
    /// Path units per second.
    pub speed: f64,
    /// Currency credited when killed.
    pub bounty: u32,
    /// Lives removed when the unit reaches the goal.
    #[serde(default = "default_goal_damage")]
    pub goal_damage: u32,
}

/// Status effect a structure applies on hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EffectProfile {
    /// Multiply speed by `factor` (0..1) for the duration.
    Slow { factor: f64, duration_secs: f64 },
    /// Deal `damage_per_sec` continuously for the duration.
    Burn {
        damage_per_sec: f64,
        duration_secs: f64,
    },
}

/// Stats reached by upgrading to a tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierProfile {
    pub cost: u32,
    pub damage: f64,
    pub range: f64,
    pub cooldown_secs: f64,
}

/// Defensive structure archetype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureProfile {
    pub cost: u32,
    pub range: f64,
    pub cooldown_secs: f64,
    pub damage: f64,
    #[serde(default)]
    pub delivery: Delivery,
    #[serde(default)]
    pub splash_radius: Option<f64>,
    #[serde(default)]
    pub effect: Option<EffectProfile>,
    /// Upgrade ladder after the base tier.
    #[serde(default)]
    pub tiers: Vec<TierProfile>,
    #[serde(default = "default_sell_ratio")]
    pub sell_ratio: f64,
}

/// Everything needed to start a session on a map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDefinition {
    pub name: String,
    /// Route 0, leaving from spawn point 0.
    pub path: Path,
    #[serde(default = "default_route_weight")]
    pub path_weight: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<Route>,
    #[serde(default)]
    pub buildable: Vec<Region>,
    /// Spawn events, ordered by `at_secs`.
    #[serde(default)]
    pub waves: Vec<SpawnEvent>,
    /// Interval spawns, folded into `waves` by `expand_sequences`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sequences: Vec<SpawnSequence>,
    pub starting: Economy,
    #[serde(default = "default_units")]
    pub units: BTreeMap<String, UnitProfile>,
    #[serde(default = "default_structures")]
    pub structures: BTreeMap<String, StructureProfile>,
}

impl MapDefinition {
    pub fn is_buildable(&self, point: Point) -> bool {
        self.buildable.iter().any(|r| r.contains(point))
    }

    /// Path of route `index`.
    pub fn route(&self, index: usize) -> Option<&Path> {
        match index {
            0 => Some(&self.path),
            i => self.routes.get(i - 1).map(|r| &r.path),
        }
    }

    pub fn route_count(&self) -> usize {
        self.routes.len() + 1
    }

    /// Every route path, in route order.
    pub fn route_paths(&self) -> Vec<&Path> {
        std::iter::once(&self.path)
            .chain(self.routes.iter().map(|r| &r.path))
            .collect()
    }

    /// `(route index, weight)` of each route leaving `spawn_point`.
    pub fn branches_from(&self, spawn_point: u32) -> Vec<(usize, u32)> {
        let main = (spawn_point == 0).then_some((0, self.path_weight));
        main.into_iter()
            .chain(
                self.routes
                    .iter()
                    .enumerate()
                    .filter(|(_, r)| r.spawn_point == spawn_point)
                    .map(|(i, r)| (i + 1, r.weight)),
            )
            .collect()
    }

    /// One past the highest spawn point any route leaves from.
    pub fn spawn_point_count(&self) -> usize {
        self.routes
            .iter()
            .map(|r| r.spawn_point as usize + 1)
            .max()
            .unwrap_or(1)
            .max(1)
    }

    /// Axis-aligned bounds covering every route and buildable region, padded.
    pub fn bounds(&self) -> (Point, Point) {
        let mut min = Point::splat(f64::INFINITY);
        let mut max = Point::splat(f64::NEG_INFINITY);
        for wp in self.route_paths().into_iter().flat_map(|p| p.waypoints()) {
            min = min.min(*wp);
            max = max.max(*wp);
        }
        for region in &self.buildable {
            let (lo, hi) = region.extent();
            min = min.min(lo);
            max = max.max(hi);
        }
        (
            min - Point::splat(MAP_BOUNDS_MARGIN),
            max + Point::splat(MAP_BOUNDS_MARGIN),
        )
    }

    /// Sort spawn events by time. Stable, so equal times keep document order.
    pub fn sort_waves(&mut self) {
        self.waves.sort_by(|a, b| a.at_secs.total_cmp(&b.at_secs));
    }

    /// Fold every sequence into `waves` and re-sort. Sequence events come
    /// after explicit events at the same time, in sequence order.
    pub fn expand_sequences(&mut self) {
        if self.sequences.is_empty() {
            return;
        }
        let sequences = std::mem::take(&mut self.sequences);
        for sequence in &sequences {
            self.waves.extend(sequence.events());
        }
        self.sort_waves();
    }

    /// Number of distinct waves in the schedule.
    pub fn wave_count(&self) -> usize {
        self.waves
            .iter()
            .map(|e| e.wave)
            .collect::<BTreeSet<_>>()
            .len()
    }
}

fn default_goal_damage() -> u32 {
    DEFAULT_GOAL_DAMAGE
}

fn default_route_weight() -> u32 {
    DEFAULT_ROUTE_WEIGHT
}

fn default_sell_ratio() -> f64 {
    DEFAULT_SELL_RATIO
}

/// Built-in enemy catalog.
pub fn default_units() -> BTreeMap<String, UnitProfile> {
    BTreeMap::from([
        (
            "pig".to_string(),
            UnitProfile {
                max_health: 10.0,
                speed: 1.5,
                bounty: 5,
                goal_damage: 1,
            },
        ),
        (
            "ogre".to_string(),
            UnitProfile {
                max_health: 60.0,
                speed: 0.7,
                bounty: 20,
                goal_damage: 3,
            },
        ),
    ])
}

/// Built-in structure catalog.
pub fn default_structures() -> BTreeMap<String, StructureProfile> {
    BTreeMap::from([
        (
            "arrow".to_string(),
            StructureProfile {
                cost: 50,
                range: 3.0,
                cooldown_secs: 1.0,
                damage: 5.0,
                delivery: Delivery::Projectile { speed: 8.0 },
                splash_radius: None,
                effect: None,
                tiers: vec![
                    TierProfile {
                        cost: 40,
                        damage: 8.0,
                        range: 3.5,
                        cooldown_secs: 0.9,
                    },
                    TierProfile {
                        cost: 80,
                        damage: 12.0,
                        range: 4.0,
                        cooldown_secs: 0.8,
                    },
                ],
                sell_ratio: DEFAULT_SELL_RATIO,
            },
        ),
        (
            "cannon".to_string(),
            StructureProfile {
                cost: 90,
                range: 2.5,
                cooldown_secs: 2.0,
                damage: 15.0,
                delivery: Delivery::Projectile { speed: 5.0 },
                splash_radius: Some(1.0),
                effect: Some(EffectProfile::Burn {
                    damage_per_sec: 2.0,
                    duration_secs: 3.0,
                }),
                tiers: vec![TierProfile {
                    cost: 120,
                    damage: 25.0,
                    range: 3.0,
                    cooldown_secs: 1.8,
                }],
                sell_ratio: DEFAULT_SELL_RATIO,
            },
        ),
        (
            "frost".to_string(),
            StructureProfile {
                cost: 70,
                range: 2.5,
                cooldown_secs: 1.5,
                damage: 2.0,
                delivery: Delivery::Instant,
                splash_radius: None,
                effect: Some(EffectProfile::Slow {
                    factor: 0.5,
                    duration_secs: 2.0,
                }),
                tiers: Vec::new(),
                sell_ratio: DEFAULT_SELL_RATIO,
            },
        ),
    ])
}
