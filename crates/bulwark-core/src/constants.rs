//! Simulation constants and tuning parameters.

/// Default simulation tick rate (Hz).
pub const DEFAULT_TICK_RATE: u32 = 30;

/// Highest tick rate a configuration may ask for.
pub const MAX_TICK_RATE: u32 = 1000;

/// Upper bound on `SimConfig::time_scale`.
pub const MAX_TIME_SCALE: f64 = 4.0;

/// Default spatial grid bucket size in map units.
pub const DEFAULT_SPATIAL_CELL_SIZE: f64 = 2.0;

/// Default cap on fixed steps drained from the accumulator per advance.
pub const DEFAULT_MAX_STEPS_PER_ADVANCE: u32 = 8;

/// Accumulator slack absorbed when deciding whether a full step is due.
/// Keeps `advance(0.1)` x 10 and `advance(1.0)` on the same tick count.
pub const ACCUMULATOR_EPSILON: f64 = 1e-9;

/// Slack for countdown timers compared against zero.
pub const TIMER_EPSILON: f64 = 1e-9;

// --- Structures ---

/// Radius of a structure's footprint. Two structures may not be closer than
/// twice this.
pub const STRUCTURE_FOOTPRINT_RADIUS: f64 = 0.5;

/// Fraction of the invested currency refunded on sale when a profile does
/// not specify one.
pub const DEFAULT_SELL_RATIO: f64 = 0.5;

// --- Projectiles ---

/// Projectiles still in flight after this long are discarded as misses.
pub const PROJECTILE_MAX_LIFETIME_SECS: f64 = 10.0;

/// Distance at which a projectile counts as having reached its target.
pub const PROJECTILE_HIT_RADIUS: f64 = 0.05;

// --- Units ---

/// Lives removed when a unit profile does not specify `goal_damage`.
pub const DEFAULT_GOAL_DAMAGE: u32 = 1;

// --- Maps ---

/// Margin added around waypoints and buildable regions when deriving map bounds.
pub const MAP_BOUNDS_MARGIN: f64 = 4.0;

/// Round-robin weight of a route that does not specify one.
pub const DEFAULT_ROUTE_WEIGHT: u32 = 1;

/// Coordinates beyond this magnitude are rejected when loading a map.
pub const MAX_MAP_COORDINATE: f64 = 1.0e15;

/// Save format version written by `save_session`.
pub const SAVE_FORMAT_VERSION: u32 = 1;
