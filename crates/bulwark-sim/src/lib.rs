//! Simulation engine for Bulwark.
//!
//! Owns the hecs ECS world, runs systems at a fixed tick rate, and publishes
//! `SimSnapshot`s for the presentation layer through `SnapshotBridge`.

pub mod bridge;
pub mod clock;
pub mod engine;
pub mod spatial;
pub mod systems;
pub mod world_setup;

pub use bridge::{SnapshotBridge, SnapshotHandle};
pub use bulwark_core as core;
pub use engine::{SimConfig, Simulation};

#[cfg(test)]
mod tests;
