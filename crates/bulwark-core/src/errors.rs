//! Error taxonomy shared by the simulation layers.

use thiserror::Error;

use crate::enums::GamePhase;
use crate::types::EntityId;

/// Malformed geometric input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

/// A player command was rejected. Simulation state is unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("insufficient funds: needed {needed}, available {available}")]
    InsufficientFunds { needed: u32, available: u32 },

    #[error("position is outside every buildable region")]
    OutsideBuildableArea,

    #[error("position overlaps structure {other}")]
    Overlapping { other: EntityId },

    #[error("unknown structure type: {0}")]
    UnknownStructureType(String),

    #[error("no structure with id {0}")]
    UnknownStructure(EntityId),

    #[error("structure {id} is already at its final tier ({tier})")]
    MaxTierReached { id: EntityId, tier: u32 },

    #[error("commands are not accepted while {0:?}")]
    NotAccepting(GamePhase),
}

impl CommandError {
    /// Stable reason code for the presentation layer.
    pub fn code(&self) -> &'static str {
        match self {
            CommandError::InsufficientFunds { .. } => "insufficient_funds",
            CommandError::OutsideBuildableArea => "outside_buildable_area",
            CommandError::Overlapping { .. } => "overlapping",
            CommandError::UnknownStructureType(_) => "unknown_structure_type",
            CommandError::UnknownStructure(_) => "unknown_structure",
            CommandError::MaxTierReached { .. } => "max_tier_reached",
            CommandError::NotAccepting(_) => "not_accepting",
        }
    }
}

/// Rejected tick input.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum SimError {
    #[error("invalid timestep: {0}")]
    InvalidTimestep(f64),
}

/// A configuration value the simulation cannot run with.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
}
