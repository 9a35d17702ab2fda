// Import necessary libraries and modules for file I/O and serialization.
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::state::DEFAULT_HISTORY_BOUND;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

// Define a structure to hold application settings with serialization and deserialization capabilities.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub language: String, // Preferred language for the narration.
    pub openai_api_key: Option<String>, // Optional API key for OpenAI services.
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    pub history_bound: usize, // Turns kept in the history log sent back to the narrator.
    pub debug_mode: bool,     // Flag to enable or disable debug logging.
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            language: "English".to_string(),
            openai_api_key: None,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.9,
            top_p: 0.9,
            max_tokens: 1400,
            history_bound: DEFAULT_HISTORY_BOUND,
            debug_mode: false,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    // Load settings from the data directory, falling back to defaults when the file is
    // missing or unreadable. The API key may also come from the environment.
    pub fn load() -> Self {
        let mut settings = data_dir()
            .map(|dir| dir.join("settings.json"))
            .and_then(|path| Self::load_settings_from_file(path).map_err(AppError::from))
            .unwrap_or_default();
        if settings.openai_api_key.is_none() {
            settings.openai_api_key = std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty());
        }
        settings
    }

    // Save current settings to the data directory.
    pub fn save(&self) -> Result<()> {
        self.save_to_file(data_dir()?.join("settings.json"))?;
        Ok(())
    }

    // Load settings from a specified file path.
    pub fn load_settings_from_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let data = fs::read_to_string(path)?; // Read settings from file.
        let settings = serde_json::from_str(&data)?; // Deserialize JSON data into settings.
        Ok(settings)
    }

    // Save current settings to a specified file path.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        let data = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?; // Create the directory if it doesn't exist.
        }
        let mut file = fs::File::create(path)?; // Create or overwrite the file.
        file.write_all(data.as_bytes())?;
        Ok(())
    }
}

/// `~/ariel/data`, home of the settings, the save slot and the log.
pub fn data_dir() -> Result<PathBuf> {
    let home_dir = dir::home_dir().ok_or(AppError::NoHomeDir)?;
    Ok(home_dir.join("ariel").join("data"))
}
