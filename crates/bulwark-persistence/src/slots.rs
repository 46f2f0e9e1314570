//! Named save slots on disk: one JSON file per slot.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use bulwark_core::save::SessionState;

use crate::{validate_session, PersistError, Result};

/// Full save data written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveFile {
    pub slot_name: String,
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
    pub session: SessionState,
}

impl SaveFile {
    /// Wrap `session` for `slot`, stamped with the current time.
    pub fn new(slot: &str, session: SessionState) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        Self {
            slot_name: slot.to_string(),
            timestamp,
            session,
        }
    }
}

/// Lightweight metadata for listing saves without keeping full state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveMetadata {
    pub slot_name: String,
    pub timestamp: u64,
    pub map: String,
    pub tick: u64,
    pub currency: u32,
    pub lives: u32,
}

fn save_path(dir: &Path, slot: &str) -> PathBuf {
    dir.join(format!("{slot}.json"))
}

pub fn save_to_file(dir: &Path, save: &SaveFile) -> Result<()> {
    validate_session(&save.session).map_err(PersistError::InvalidSaveFormat)?;
    fs::create_dir_all(dir)?;
    let path = save_path(dir, &save.slot_name);
    let json = serde_json::to_string_pretty(save)
        .map_err(|e| PersistError::InvalidSaveFormat(e.to_string()))?;
    fs::write(&path, json)?;
    tracing::info!(slot = %save.slot_name, path = %path.display(), "session saved");
    Ok(())
}

pub fn load_from_file(dir: &Path, slot: &str) -> Result<SaveFile> {
    let path = save_path(dir, slot);
    let json = fs::read_to_string(&path)?;
    let save: SaveFile =
        serde_json::from_str(&json).map_err(|e| PersistError::InvalidSaveFormat(e.to_string()))?;
    validate_session(&save.session).map_err(PersistError::InvalidSaveFormat)?;
    Ok(save)
}

/// Every readable save in `dir`, newest first. Unreadable files are skipped.
pub fn list_saves(dir: &Path) -> Vec<SaveMetadata> {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return Vec::new(),
    };

    let mut saves = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.extension().is_some_and(|ext| ext == "json") {
            continue;
        }
        let Ok(json) = fs::read_to_string(&path) else {
            continue;
        };
        match serde_json::from_str::<SaveFile>(&json) {
            Ok(save) => saves.push(SaveMetadata {
                slot_name: save.slot_name,
                timestamp: save.timestamp,
                map: save.session.map.name,
                tick: save.session.time.tick,
                currency: save.session.economy.currency,
                lives: save.session.economy.lives,
            }),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable save");
            }
        }
    }
    saves.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    saves
}

pub fn delete_save(dir: &Path, slot: &str) -> Result<()> {
    let path = save_path(dir, slot);
    if path.exists() {
        fs::remove_file(&path)?;
    }
    Ok(())
}
