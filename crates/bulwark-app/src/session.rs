//! Session control: start, pause, resume and stop a simulation running on
//! its own thread, and the presentation-side entry points into it.

use std::sync::{mpsc, Arc};

use thiserror::Error;

use bulwark_core::commands::{CommandOutcome, PlayerCommand};
use bulwark_core::errors::CommandError;
use bulwark_core::types::{EntityId, Point};
use bulwark_persistence::PersistError;
use bulwark_sim::{Simulation, SnapshotBridge, SnapshotHandle};

use crate::game_loop::{self, LoopConfig, LoopHandle, LoopMessage};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("session already started")]
    AlreadyStarted,

    #[error("session is not running")]
    NotRunning,

    #[error("session must be paused to save")]
    NotPaused,

    #[error("game loop thread is gone")]
    Disconnected,

    #[error("failed to spawn game loop: {0}")]
    Spawn(#[source] std::io::Error),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

enum Stage {
    Idle(Simulation),
    Running(LoopHandle),
    Stopped,
}

/// A simulation session and its loop thread.
pub struct Session {
    config: LoopConfig,
    bridge: Arc<SnapshotBridge>,
    stage: Stage,
}

impl Session {
    pub fn new(sim: Simulation, config: LoopConfig) -> Self {
        let bridge = Arc::new(SnapshotBridge::new(sim.snapshot()));
        Self {
            config,
            bridge,
            stage: Stage::Idle(sim),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.stage, Stage::Running(_))
    }

    /// Shared snapshot bridge, for render threads that poll on their own.
    pub fn bridge(&self) -> Arc<SnapshotBridge> {
        Arc::clone(&self.bridge)
    }

    /// Latest published snapshot. Never blocks on the simulation.
    pub fn current_snapshot(&self) -> SnapshotHandle {
        self.bridge.latest()
    }

    /// Move the simulation onto its loop thread.
    pub fn start(&mut self) -> Result<(), SessionError> {
        match std::mem::replace(&mut self.stage, Stage::Stopped) {
            Stage::Idle(sim) => {
                let handle = game_loop::spawn_game_loop(sim, self.bridge(), &self.config)
                    .map_err(SessionError::Spawn)?;
                self.stage = Stage::Running(handle);
                Ok(())
            }
            other => {
                self.stage = other;
                Err(SessionError::AlreadyStarted)
            }
        }
    }

    pub fn pause(&self) -> Result<(), SessionError> {
        self.send(LoopMessage::Pause)
    }

    pub fn resume(&self) -> Result<(), SessionError> {
        self.send(LoopMessage::Resume)
    }

    pub fn set_time_scale(&self, scale: f64) -> Result<(), SessionError> {
        self.send(LoopMessage::SetTimeScale(scale))
    }

    /// Forward a player command and wait for its outcome. The command is
    /// applied between ticks.
    pub fn command(&self, command: PlayerCommand) -> Result<CommandOutcome, SessionError> {
        let (reply, outcome) = mpsc::channel();
        self.send(LoopMessage::Command { command, reply })?;
        let result = outcome.recv().map_err(|_| SessionError::Disconnected)?;
        Ok(result?)
    }

    pub fn place_structure(
        &self,
        position: Point,
        kind: &str,
    ) -> Result<CommandOutcome, SessionError> {
        self.command(PlayerCommand::PlaceStructure {
            position,
            kind: kind.to_string(),
        })
    }

    pub fn sell_structure(&self, id: EntityId) -> Result<CommandOutcome, SessionError> {
        self.command(PlayerCommand::SellStructure { id })
    }

    pub fn upgrade_structure(&self, id: EntityId) -> Result<CommandOutcome, SessionError> {
        self.command(PlayerCommand::UpgradeStructure { id })
    }

    /// Serialize the session. Only accepted while paused.
    pub fn save(&self) -> Result<String, SessionError> {
        let (reply, state) = mpsc::channel();
        self.send(LoopMessage::Save { reply })?;
        let state = state
            .recv()
            .map_err(|_| SessionError::Disconnected)?
            .ok_or(SessionError::NotPaused)?;
        Ok(bulwark_persistence::save_session(&state)?)
    }

    /// Stop the loop after its current tick and take the simulation back.
    /// A session that was never started hands back its idle simulation.
    pub fn stop(&mut self) -> Result<Simulation, SessionError> {
        match std::mem::replace(&mut self.stage, Stage::Stopped) {
            Stage::Idle(sim) => Ok(sim),
            Stage::Running(handle) => {
                let sim = handle.stop().ok_or(SessionError::Disconnected)?;
                self.bridge.publish(sim.snapshot());
                Ok(sim)
            }
            Stage::Stopped => Err(SessionError::NotRunning),
        }
    }

    fn send(&self, message: LoopMessage) -> Result<(), SessionError> {
        let Stage::Running(handle) = &self.stage else {
            return Err(SessionError::NotRunning);
        };
        if handle.send(message) {
            Ok(())
        } else {
            Err(SessionError::Disconnected)
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Stage::Running(handle) = std::mem::replace(&mut self.stage, Stage::Stopped) {
            let _ = handle.stop();
        }
    }
}
