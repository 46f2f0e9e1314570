//! JSON persistence for map definitions and session saves.
//!
//! Documents are validated in full before they are handed to the
//! simulation; a malformed document is rejected as a whole, never partially
//! loaded.

pub mod slots;

use std::collections::BTreeSet;

use thiserror::Error;

use bulwark_core::constants::{MAX_MAP_COORDINATE, SAVE_FORMAT_VERSION};
use bulwark_core::enums::Delivery;
use bulwark_core::map::{MapDefinition, Region, StructureProfile};
use bulwark_core::save::SessionState;
use bulwark_core::types::Point;

pub use slots::{delete_save, list_saves, load_from_file, save_to_file, SaveFile, SaveMetadata};

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("invalid map format: {0}")]
    InvalidMapFormat(String),

    #[error("invalid save format: {0}")]
    InvalidSaveFormat(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PersistError>;

/// Parse and validate a map document. Spawn sequences are expanded and the
/// spawn events returned sorted by time.
pub fn load_map(source: &str) -> Result<MapDefinition> {
    let mut map: MapDefinition =
        serde_json::from_str(source).map_err(|e| PersistError::InvalidMapFormat(e.to_string()))?;
    validate_map(&map).map_err(PersistError::InvalidMapFormat)?;
    map.expand_sequences();
    map.sort_waves();
    tracing::debug!(
        map = %map.name,
        waypoints = map.path.waypoints().len(),
        routes = map.route_count(),
        spawn_events = map.waves.len(),
        "map loaded"
    );
    Ok(map)
}

/// Parse and validate a session save document.
pub fn load_session(source: &str) -> Result<SessionState> {
    let state: SessionState =
        serde_json::from_str(source).map_err(|e| PersistError::InvalidSaveFormat(e.to_string()))?;
    validate_session(&state).map_err(PersistError::InvalidSaveFormat)?;
    tracing::debug!(
        map = %state.map.name,
        tick = state.time.tick,
        units = state.entities.units.len(),
        structures = state.entities.structures.len(),
        "session loaded"
    );
    Ok(state)
}

/// Serialize a session. States that could not be loaded back are refused.
pub fn save_session(state: &SessionState) -> Result<String> {
    validate_session(state).map_err(PersistError::InvalidSaveFormat)?;
    serde_json::to_string_pretty(state).map_err(|e| PersistError::InvalidSaveFormat(e.to_string()))
}

/// Semantic checks on a parsed map.
pub fn validate_map(map: &MapDefinition) -> std::result::Result<(), String> {
    if map.starting.lives == 0 {
        return Err("starting lives must be positive".into());
    }
    for (index, path) in map.route_paths().into_iter().enumerate() {
        if !path.waypoints().iter().copied().all(in_range) {
            return Err(format!("route {index}: waypoint out of range"));
        }
    }
    if map.path_weight == 0 || map.routes.iter().any(|r| r.weight == 0) {
        return Err("route weights must be positive".into());
    }
    for (i, region) in map.buildable.iter().enumerate() {
        match *region {
            Region::Circle { center, radius } => {
                if !in_range(center) || !is_non_negative(radius) || radius > MAX_MAP_COORDINATE {
                    return Err(format!("buildable region {i}: bad circle"));
                }
            }
            Region::Rect { min, max } => {
                if !in_range(min) || !in_range(max) || min.x > max.x || min.y > max.y {
                    return Err(format!("buildable region {i}: bad rectangle"));
                }
            }
        }
    }
    for (name, unit) in &map.units {
        if !is_positive(unit.max_health) {
            return Err(format!("unit '{name}': max_health must be positive"));
        }
        if !is_positive(unit.speed) {
            return Err(format!("unit '{name}': speed must be positive"));
        }
    }
    for (name, structure) in &map.structures {
        validate_structure(structure).map_err(|e| format!("structure '{name}': {e}"))?;
    }
    for (i, event) in map.waves.iter().enumerate() {
        if !map.units.contains_key(&event.unit) {
            return Err(format!("spawn event {i}: unknown unit '{}'", event.unit));
        }
        if !is_non_negative(event.at_secs) {
            return Err(format!("spawn event {i}: bad time {}", event.at_secs));
        }
        if map.branches_from(event.spawn_point).is_empty() {
            return Err(format!(
                "spawn event {i}: no route leaves spawn point {}",
                event.spawn_point
            ));
        }
    }
    for (i, sequence) in map.sequences.iter().enumerate() {
        if !is_non_negative(sequence.first_at_secs) || !is_non_negative(sequence.interval_secs) {
            return Err(format!("spawn sequence {i}: times must be non-negative"));
        }
        if let Some(unit) = sequence.units.iter().find(|u| !map.units.contains_key(*u)) {
            return Err(format!("spawn sequence {i}: unknown unit '{unit}'"));
        }
        if map.branches_from(sequence.spawn_point).is_empty() {
            return Err(format!(
                "spawn sequence {i}: no route leaves spawn point {}",
                sequence.spawn_point
            ));
        }
    }
    Ok(())
}

fn validate_structure(profile: &StructureProfile) -> std::result::Result<(), String> {
    let tiers = profile
        .tiers
        .iter()
        .map(|t| (t.range, t.cooldown_secs, t.damage));
    for (range, cooldown, damage) in std::iter::once((
        profile.range,
        profile.cooldown_secs,
        profile.damage,
    ))
    .chain(tiers)
    {
        if !is_non_negative(range) || !is_non_negative(cooldown) || !is_non_negative(damage) {
            return Err("range, cooldown and damage must be finite and non-negative".into());
        }
    }
    if let Delivery::Projectile { speed } = profile.delivery {
        if !is_positive(speed) {
            return Err("projectile speed must be positive".into());
        }
    }
    if let Some(radius) = profile.splash_radius {
        if !is_positive(radius) {
            return Err("splash radius must be positive".into());
        }
    }
    if !(0.0..=1.0).contains(&profile.sell_ratio) {
        return Err("sell_ratio must be within [0, 1]".into());
    }
    Ok(())
}

/// Semantic checks on a parsed save.
pub fn validate_session(state: &SessionState) -> std::result::Result<(), String> {
    if state.version != SAVE_FORMAT_VERSION {
        return Err(format!(
            "unsupported save version {} (expected {SAVE_FORMAT_VERSION})",
            state.version
        ));
    }
    validate_map(&state.map).map_err(|e| format!("map: {e}"))?;
    if !state.map.sequences.is_empty() {
        return Err("map: saved schedules must already be expanded".into());
    }
    if state
        .map
        .waves
        .windows(2)
        .any(|w| w[0].at_secs > w[1].at_secs)
    {
        return Err("map: spawn events are not in time order".into());
    }
    if state.next_spawn > state.map.waves.len() {
        return Err("spawn cursor past the end of the schedule".into());
    }
    if !is_non_negative(state.time.elapsed_secs) {
        return Err("elapsed time must be finite and non-negative".into());
    }
    if state.branch_cursors.len() > state.map.spawn_point_count() {
        return Err("more branch cursors than spawn points".into());
    }
    for (spawn_point, cursor) in state.branch_cursors.iter().enumerate() {
        let branches = state.map.branches_from(spawn_point as u32).len();
        if cursor.branch >= branches.max(1) {
            return Err(format!("spawn point {spawn_point}: branch cursor out of range"));
        }
    }

    let mut seen = BTreeSet::new();
    for id in state.entities.ids() {
        if !seen.insert(id) {
            return Err(format!("duplicate entity id {id}"));
        }
        if id.0 >= state.next_entity_id {
            return Err(format!("entity id {id} not below the id counter"));
        }
    }

    for unit in &state.entities.units {
        if !state.map.units.contains_key(&unit.kind) {
            return Err(format!("unit {}: unknown kind '{}'", unit.id, unit.kind));
        }
        let Some(length) = state.map.route(unit.route).map(|p| p.length()) else {
            return Err(format!("unit {}: unknown route {}", unit.id, unit.route));
        };
        if !unit.position.is_finite()
            || !unit.health.current.is_finite()
            || !is_non_negative(unit.progress)
            || unit.progress > length
        {
            return Err(format!("unit {}: corrupt state", unit.id));
        }
    }
    for structure in &state.entities.structures {
        let Some(profile) = state.map.structures.get(&structure.kind) else {
            return Err(format!(
                "structure {}: unknown kind '{}'",
                structure.id, structure.kind
            ));
        };
        if structure.tier as usize > profile.tiers.len() {
            return Err(format!("structure {}: tier out of range", structure.id));
        }
        if !structure.position.is_finite()
            || !is_non_negative(structure.targeter.cooldown_remaining)
        {
            return Err(format!("structure {}: corrupt state", structure.id));
        }
    }
    for projectile in &state.entities.projectiles {
        if !projectile.position.is_finite() || !projectile.state.lifetime_remaining.is_finite() {
            return Err(format!("projectile {}: corrupt state", projectile.id));
        }
    }
    Ok(())
}

fn in_range(point: Point) -> bool {
    point.is_finite() && point.abs().max_element() <= MAX_MAP_COORDINATE
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}
