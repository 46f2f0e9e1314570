//! Player commands sent from the presentation layer to the simulation.
//!
//! Commands are validated against the economy and map before anything is
//! mutated; a rejected command leaves the world untouched.

use serde::{Deserialize, Serialize};

use crate::enums::TargetPriority;
use crate::types::{EntityId, Point};

/// All possible player actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    /// Build a structure of `kind` centred on `position`.
    PlaceStructure { position: Point, kind: String },
    /// Remove a structure and refund part of its cost.
    SellStructure { id: EntityId },
    /// Move a structure to its next tier.
    UpgradeStructure { id: EntityId },
    /// Change which in-range unit a structure prefers.
    SetTargetPriority {
        id: EntityId,
        priority: TargetPriority,
    },
}

/// Result of an accepted command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CommandOutcome {
    Placed { id: EntityId },
    Sold { refund: u32 },
    Upgraded { tier: u32 },
    PriorityChanged,
}
