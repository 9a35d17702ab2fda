// src/save.rs
//
// A single save slot, overwritten whole on every write.
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, read_to_string, remove_file, write};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::SaveError;
use crate::scene::Scene;
use crate::state::SessionState;

pub const SAVE_FILE: &str = "ariel_trpg_save_v1.json";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaveSlot {
    /// Milliseconds since the Unix epoch.
    pub updated_at: i64,
    pub state: SessionState,
    #[serde(default)]
    pub last_scene: Option<Scene>,
}

impl SaveSlot {
    pub fn new(state: SessionState, last_scene: Option<Scene>) -> Self {
        Self {
            updated_at: Utc::now().timestamp_millis(),
            state,
            last_scene,
        }
    }
}

/// Where a `SaveSlot` lives between runs.
pub trait SlotStore: Send {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<SaveSlot>, SaveError>;
    fn save(&self, slot: &SaveSlot) -> Result<(), SaveError>;
    fn clear(&self) -> Result<(), SaveError>;
}

#[derive(Clone, Debug)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(SAVE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SlotStore for FileSlot {
    fn load(&self) -> Result<Option<SaveSlot>, SaveError> {
        let raw = match read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&self, slot: &SaveSlot) -> Result<(), SaveError> {
        if let Some(parent) = self.path.parent() {
            create_dir_all(parent)?;
        }
        let serialized = serde_json::to_string_pretty(slot)?;
        write(&self.path, serialized)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SaveError> {
        match remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Load the slot, treating a broken or unreadable save as no save.
pub fn load_or_absent(store: &dyn SlotStore) -> Option<SaveSlot> {
    match store.load() {
        Ok(slot) => slot,
        Err(e) => {
            log::warn!("Ignoring unreadable save: {e}");
            None
        }
    }
}

/// Write the slot; failures are logged and the session carries on in memory.
pub fn save_quietly(store: &dyn SlotStore, slot: &SaveSlot) {
    if let Err(e) = store.save(slot) {
        log::warn!("Failed to write save slot: {e}");
    }
}
