//! `bulwark` command line: headless sessions and document checks.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use bulwark_core::commands::PlayerCommand;
use bulwark_core::enums::GamePhase;
use bulwark_persistence::{self as persistence, SaveFile};
use bulwark_sim::{SimConfig, Simulation};

use crate::game_loop::LoopConfig;
use crate::session::{Session, SessionError};

/// Bulwark tower-defense simulation
#[derive(Parser)]
#[command(name = "bulwark")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a headless session in real time
    Run {
        /// Map document to start from
        #[arg(short, long, required_unless_present_any = ["resume", "resume_slot"])]
        map: Option<PathBuf>,

        /// Session document to resume instead of a fresh map
        #[arg(long, conflicts_with = "map")]
        resume: Option<PathBuf>,

        /// Save slot (in `--save-dir`) to resume instead of a fresh map
        #[arg(long, conflicts_with_all = ["map", "resume"])]
        resume_slot: Option<String>,

        /// Simulation config (JSON); flags below override it
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Wall-clock seconds to run for
        #[arg(long, default_value_t = 30.0)]
        seconds: f64,

        #[arg(long)]
        time_scale: Option<f64>,

        #[arg(long)]
        tick_rate: Option<u32>,

        /// JSON array of player commands applied right after start
        #[arg(long)]
        commands: Option<PathBuf>,

        /// Seconds between snapshot summaries
        #[arg(long, default_value_t = 1.0)]
        report_every: f64,

        /// Write the final session document here
        #[arg(long)]
        save: Option<PathBuf>,

        /// Also store the final session in this save slot
        #[arg(long)]
        save_slot: Option<String>,

        #[arg(long, default_value = "saves")]
        save_dir: PathBuf,
    },

    /// Validate a map document
    Check {
        #[arg(short, long)]
        map: PathBuf,
    },

    /// List (or delete) save slots
    Saves {
        #[arg(long, default_value = "saves")]
        dir: PathBuf,

        /// Slot to delete
        #[arg(long)]
        delete: Option<String>,
    },
}

pub fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run {
            map,
            resume,
            resume_slot,
            config,
            seconds,
            time_scale,
            tick_rate,
            commands,
            report_every,
            save,
            save_slot,
            save_dir,
        } => {
            let sim_config = load_config(config.as_deref(), time_scale, tick_rate)?;

            let sim = match (map, resume, resume_slot) {
                (_, _, Some(slot)) => {
                    let save = persistence::load_from_file(&save_dir, &slot)
                        .with_context(|| format!("loading save slot '{slot}'"))?;
                    tracing::info!(%slot, timestamp = save.timestamp, "resuming save slot");
                    Simulation::from_session(save.session, sim_config)
                }
                (_, Some(path), None) => {
                    let state = persistence::load_session(&read(&path)?)?;
                    Simulation::from_session(state, sim_config)
                }
                (Some(path), None, None) => {
                    let map = persistence::load_map(&read(&path)?)?;
                    Simulation::new(map, sim_config)
                }
                (None, None, None) => {
                    anyhow::bail!("one of --map, --resume or --resume-slot is required")
                }
            };

            let commands = match commands {
                Some(path) => serde_json::from_str::<Vec<PlayerCommand>>(&read(&path)?)
                    .with_context(|| format!("parsing commands {}", path.display()))?,
                None => Vec::new(),
            };

            let sim = run_session(sim, commands, seconds, report_every)?;

            let state = sim.to_session();
            if let Some(path) = save {
                fs::write(&path, persistence::save_session(&state)?)
                    .with_context(|| format!("writing {}", path.display()))?;
                tracing::info!(path = %path.display(), "session written");
            }
            if let Some(slot) = save_slot {
                persistence::save_to_file(&save_dir, &SaveFile::new(&slot, state))?;
            }
            Ok(())
        }
        Commands::Check { map } => {
            let map = persistence::load_map(&read(&map)?)?;
            tracing::info!(
                map = %map.name,
                path_length = map.path.length(),
                waypoints = map.path.waypoints().len(),
                routes = map.route_count(),
                spawn_points = map.spawn_point_count(),
                waves = map.wave_count(),
                spawn_events = map.waves.len(),
                structures = map.structures.len(),
                "map ok"
            );
            Ok(())
        }
        Commands::Saves { dir, delete } => {
            if let Some(slot) = delete {
                persistence::delete_save(&dir, &slot)?;
                tracing::info!(%slot, "save deleted");
            }
            for save in persistence::list_saves(&dir) {
                println!(
                    "{}\t{}\ttick {}\tcurrency {}\tlives {}",
                    save.slot_name, save.map, save.tick, save.currency, save.lives
                );
            }
            Ok(())
        }
    }
}

/// Read the simulation config at `path` (or the default), apply flag
/// overrides, and validate the result.
pub fn load_config(
    path: Option<&Path>,
    time_scale: Option<f64>,
    tick_rate: Option<u32>,
) -> Result<SimConfig> {
    let mut config = match path {
        Some(path) => serde_json::from_str(&read(path)?)
            .with_context(|| format!("parsing config {}", path.display()))?,
        None => SimConfig::default(),
    };
    if let Some(scale) = time_scale {
        config.time_scale = scale;
    }
    if let Some(rate) = tick_rate {
        config.tick_rate = rate;
    }
    config.validate().context("checking simulation config")?;
    Ok(config)
}

/// Run `sim` on a session thread for `seconds` of wall-clock time or until
/// the game ends, then hand it back paused.
pub fn run_session(
    sim: Simulation,
    commands: Vec<PlayerCommand>,
    seconds: f64,
    report_every: f64,
) -> Result<Simulation> {
    let resume = sim.phase() == GamePhase::Paused;
    let mut session = Session::new(sim, LoopConfig::default());
    session.start()?;
    if resume {
        session.resume()?;
    }

    for command in commands {
        match session.command(command) {
            Ok(outcome) => tracing::info!(?outcome, "command applied"),
            Err(SessionError::Command(err)) => {
                tracing::warn!(code = err.code(), %err, "command rejected");
            }
            Err(err) => return Err(err.into()),
        }
    }

    let started = Instant::now();
    let run_for = Duration::try_from_secs_f64(seconds).unwrap_or(Duration::ZERO);
    let report =
        Duration::try_from_secs_f64(report_every.max(0.05)).unwrap_or(Duration::from_secs(1));
    loop {
        let elapsed = started.elapsed();
        if elapsed >= run_for {
            break;
        }
        std::thread::sleep(report.min(run_for - elapsed));

        let snapshot = session.current_snapshot();
        tracing::info!(
            tick = snapshot.time.tick,
            phase = ?snapshot.phase,
            currency = snapshot.economy.currency,
            lives = snapshot.economy.lives,
            units = snapshot.units.len(),
            structures = snapshot.structures.len(),
            projectiles = snapshot.projectiles.len(),
            "snapshot"
        );
        if snapshot.phase.is_over() {
            break;
        }
    }

    session.pause()?;
    let sim = session.stop()?;
    let stats = sim.stats();
    tracing::info!(
        phase = ?sim.phase(),
        tick = sim.time().tick,
        killed = stats.units_killed,
        leaked = stats.units_leaked,
        shots = stats.shots_fired,
        damage = stats.damage_dealt,
        "session finished"
    );
    Ok(sim)
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}
