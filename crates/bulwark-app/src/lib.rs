//! Bulwark application layer.
//!
//! Runs a `Simulation` on its own thread behind a `Session`, and exposes the
//! snapshot bridge and command channel to whatever presents it.

pub mod cli;
pub mod game_loop;
pub mod session;

pub use bulwark_core as core;
pub use game_loop::LoopConfig;
pub use session::{Session, SessionError};
