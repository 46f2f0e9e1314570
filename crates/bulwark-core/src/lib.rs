//! Core types and definitions for the Bulwark defense simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! geometry, the path model, map and save data shapes, components,
//! commands, snapshots, errors, and constants. It has no dependency on the
//! ECS or any runtime.

pub mod commands;
pub mod components;
pub mod constants;
pub mod enums;
pub mod errors;
pub mod geometry;
pub mod map;
pub mod path;
pub mod save;
pub mod state;
pub mod types;
