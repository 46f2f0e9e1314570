//! ECS systems that operate on the simulation world each tick.
//!
//! Systems are pure functions that take `&mut World` (or `&World` for read-only).
//! They do not own state; all state lives in components. The engine calls
//! them in phase order: movement, targeting, combat, lifecycle, spawns.

pub mod combat;
pub mod lifecycle;
pub mod movement;
pub mod snapshot;
pub mod targeting;
pub mod wave_spawner;
