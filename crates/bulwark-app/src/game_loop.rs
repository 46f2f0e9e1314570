//! Game loop thread: owns the `Simulation`, runs it against wall-clock time
//! and publishes snapshots through the bridge.
//!
//! The simulation moves into the thread on spawn and comes back out of the
//! join handle on stop. Everything else talks to it through the message
//! channel, which is drained between ticks, never during one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use bulwark_core::commands::{CommandOutcome, PlayerCommand};
use bulwark_core::enums::GamePhase;
use bulwark_core::errors::CommandError;
use bulwark_core::save::SessionState;
use bulwark_sim::{Simulation, SnapshotBridge};

/// Settings for the loop thread itself (the simulation has its own).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    pub thread_name: String,
    /// Upper bound on real time fed to the simulation per iteration, so a
    /// stalled thread does not arrive with a huge backlog.
    pub max_frame_secs: f64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            thread_name: "bulwark-game-loop".into(),
            max_frame_secs: 0.25,
        }
    }
}

pub type CommandReply = mpsc::Sender<Result<CommandOutcome, CommandError>>;

/// Messages sent from the session to the game loop thread.
#[derive(Debug)]
pub enum LoopMessage {
    /// A player command; the outcome goes back on `reply`.
    Command {
        command: PlayerCommand,
        reply: CommandReply,
    },
    Pause,
    Resume,
    SetTimeScale(f64),
    /// Capture the session state. Answered with `None` unless paused.
    Save {
        reply: mpsc::Sender<Option<SessionState>>,
    },
}

/// The caller's side of a running loop thread.
#[derive(Debug)]
pub struct LoopHandle {
    tx: mpsc::Sender<LoopMessage>,
    stop: Arc<AtomicBool>,
    thread: JoinHandle<Simulation>,
}

impl LoopHandle {
    /// Returns `false` if the loop thread has gone away.
    pub fn send(&self, message: LoopMessage) -> bool {
        self.tx.send(message).is_ok()
    }

    /// Signal the loop to stop after its current tick and wait for it.
    /// `None` if the loop thread panicked.
    pub fn stop(self) -> Option<Simulation> {
        self.stop.store(true, Ordering::Release);
        self.thread.join().ok()
    }
}

/// Spawn the game loop on a named thread.
pub fn spawn_game_loop(
    sim: Simulation,
    bridge: Arc<SnapshotBridge>,
    config: &LoopConfig,
) -> std::io::Result<LoopHandle> {
    let (tx, rx) = mpsc::channel::<LoopMessage>();
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = Arc::clone(&stop);
    let max_frame_secs = config.max_frame_secs;

    let thread = std::thread::Builder::new()
        .name(config.thread_name.clone())
        .spawn(move || run_game_loop(sim, &rx, &bridge, &stop_flag, max_frame_secs))?;

    Ok(LoopHandle { tx, stop, thread })
}

/// The loop. Runs until the stop flag is set or every sender is dropped.
fn run_game_loop(
    mut sim: Simulation,
    rx: &mpsc::Receiver<LoopMessage>,
    bridge: &SnapshotBridge,
    stop: &AtomicBool,
    max_frame_secs: f64,
) -> Simulation {
    let tick_duration = Duration::from_secs_f64(sim.config().fixed_dt());
    let mut last_frame = Instant::now();
    let mut next_tick_time = last_frame;
    let mut last_phase = sim.phase();
    tracing::info!(tick = sim.time().tick, phase = ?last_phase, "game loop started");

    while !stop.load(Ordering::Acquire) {
        // 1. Drain pending messages
        let mut dirty = false;
        loop {
            match rx.try_recv() {
                Ok(message) => {
                    dirty |= handle_message(&mut sim, message, &mut last_frame);
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    tracing::info!("session dropped, game loop exiting");
                    return sim;
                }
            }
        }

        // 2. Feed real elapsed time into the fixed-step clock
        let now = Instant::now();
        let elapsed = (now - last_frame).as_secs_f64().min(max_frame_secs);
        last_frame = now;
        match sim.advance(elapsed) {
            Ok(ticks) => dirty |= ticks > 0,
            Err(err) => tracing::warn!(%err, "frame skipped"),
        }

        // 3. Publish
        if dirty {
            bridge.publish(sim.snapshot());
        }
        if sim.phase() != last_phase {
            last_phase = sim.phase();
            tracing::info!(tick = sim.time().tick, phase = ?last_phase, "phase changed");
        }

        // 4. Sleep until the next step deadline
        next_tick_time += tick_duration;
        let now = Instant::now();
        if next_tick_time > now {
            std::thread::sleep(next_tick_time - now);
        } else if now - next_tick_time > tick_duration * 2 {
            // Too far behind, reset to avoid catch-up spiral
            next_tick_time = now;
        }
    }

    // Messages sent before the stop signal are still answered, but no
    // further ticks run.
    let mut last_frame = Instant::now();
    for message in rx.try_iter() {
        handle_message(&mut sim, message, &mut last_frame);
    }
    tracing::info!(tick = sim.time().tick, phase = ?sim.phase(), "game loop stopped");
    sim
}

/// Apply one message. Returns `true` if visible state may have changed.
fn handle_message(sim: &mut Simulation, message: LoopMessage, last_frame: &mut Instant) -> bool {
    match message {
        LoopMessage::Command { command, reply } => {
            let result = sim.apply_command(command);
            let changed = result.is_ok();
            // The caller may have given up waiting.
            let _ = reply.send(result);
            changed
        }
        LoopMessage::Pause => sim.pause(),
        LoopMessage::Resume => {
            // Time spent paused is not owed to the simulation.
            *last_frame = Instant::now();
            sim.resume()
        }
        LoopMessage::SetTimeScale(scale) => {
            sim.set_time_scale(scale);
            false
        }
        LoopMessage::Save { reply } => {
            let state = (sim.phase() == GamePhase::Paused).then(|| sim.to_session());
            let _ = reply.send(state);
            false
        }
    }
}
