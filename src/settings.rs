//! User settings persistence.
//!
//! Stored as pretty JSON in `~/.config/snipkit/settings.json` (platform
//! config dir). A missing or unreadable file yields defaults; a bad field
//! falls back to its default without discarding the rest.

use crate::annotation::Style;
use crate::selection::SelectionTuning;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_HOTKEY: &str = "Ctrl+Shift+S";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("No config directory on this platform")]
    NoConfigDir,
    #[error("Settings I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Settings JSON invalid: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub hotkey: String,
    pub smart_select: bool,
    /// Where saved screenshots go. `None` means the pictures directory.
    pub save_dir: Option<PathBuf>,
    pub auto_save: bool,
    pub theme: Theme,
    pub default_style: Style,
    pub tuning: SelectionTuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hotkey: DEFAULT_HOTKEY.to_string(),
            smart_select: true,
            save_dir: None,
            auto_save: false,
            theme: Theme::default(),
            default_style: Style::default(),
            tuning: SelectionTuning::default(),
        }
    }
}

impl Settings {
    /// Directory screenshots are saved to.
    pub fn resolved_save_dir(&self) -> PathBuf {
        self.save_dir
            .clone()
            .or_else(dirs::picture_dir)
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// `<save dir>/snipkit_<timestamp>.png`
    pub fn default_save_path(&self, timestamp_ms: u64) -> PathBuf {
        self.resolved_save_dir()
            .join(format!("snipkit_{}.png", timestamp_ms))
    }
}

/// Full path to the settings file.
pub fn settings_path() -> Result<PathBuf, SettingsError> {
    dirs::config_dir()
        .map(|d| d.join("snipkit").join("settings.json"))
        .ok_or(SettingsError::NoConfigDir)
}

/// Load settings from the default location.
pub fn load() -> Settings {
    match settings_path() {
        Ok(path) => load_from(&path),
        Err(e) => {
            log::warn!("[SETTINGS] {}; using defaults", e);
            Settings::default()
        }
    }
}

pub fn load_from(path: &Path) -> Settings {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Settings::default(),
        Err(e) => {
            log::warn!("[SETTINGS] Failed to read {}: {}", path.display(), e);
            return Settings::default();
        }
    };
    parse_lenient(&raw).unwrap_or_else(|e| {
        log::warn!("[SETTINGS] Ignoring corrupt {}: {}", path.display(), e);
        Settings::default()
    })
}

/// Parse, keeping every field that is valid on its own.
fn parse_lenient(raw: &str) -> Result<Settings, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    if let Ok(settings) = serde_json::from_value::<Settings>(value.clone()) {
        return Ok(settings);
    }
    let mut merged = serde_json::to_value(Settings::default())?;
    if let (Some(target), Some(source)) = (merged.as_object_mut(), value.as_object()) {
        for (key, field) in source {
            if let Some(slot) = target.get_mut(key) {
                let previous = std::mem::replace(slot, field.clone());
                if serde_json::from_value::<Settings>(serde_json::Value::Object(target.clone())).is_err() {
                    log::warn!("[SETTINGS] Dropping invalid field '{}'", key);
                    if let Some(slot) = target.get_mut(key) {
                        *slot = previous;
                    }
                }
            }
        }
    }
    serde_json::from_value(merged)
}

pub fn save(settings: &Settings) -> Result<(), SettingsError> {
    save_to(&settings_path()?, settings)
}

pub fn save_to(path: &Path, settings: &Settings) -> Result<(), SettingsError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, json)?;
    log::info!("[SETTINGS] Saved to {}", path.display());
    Ok(())
}
