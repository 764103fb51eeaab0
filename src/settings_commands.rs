//! Settings panel Tauri commands.
//!
//! Handles:
//! - Reading and saving `Settings` (settings.rs does the file I/O)
//! - Rebinding the global capture hotkey

use crate::hotkeys;
use crate::settings::{self, Settings};
use std::sync::Mutex;

/// In-memory copy of the settings file, shared by all commands.
pub struct SettingsState {
    current: Mutex<Settings>,
}

impl SettingsState {
    pub fn new(settings: Settings) -> Self {
        Self {
            current: Mutex::new(settings),
        }
    }

    pub fn snapshot(&self) -> Result<Settings, String> {
        self.current
            .lock()
            .map(|s| s.clone())
            .map_err(|e| e.to_string())
    }

    /// Apply `f`, persist, and return the new settings.
    pub fn update(&self, f: impl FnOnce(&mut Settings)) -> Result<Settings, String> {
        let mut guard = self.current.lock().map_err(|e| e.to_string())?;
        f(&mut guard);
        settings::save(&guard).map_err(|e| e.to_string())?;
        Ok(guard.clone())
    }
}

/// Tauri command: current settings for the settings panel.
#[tauri::command]
pub fn get_settings(state: tauri::State<'_, SettingsState>) -> Result<Settings, String> {
    state.snapshot()
}

/// Tauri command: replace and persist all settings.
///
/// A changed hotkey is rebound immediately; if the new one cannot be
/// registered the old one is restored and the error is returned.
#[tauri::command]
pub fn save_settings(
    app: tauri::AppHandle,
    state: tauri::State<'_, SettingsState>,
    settings: Settings,
) -> Result<Settings, String> {
    let previous = state.snapshot()?;
    if previous.hotkey != settings.hotkey {
        rebind(&app, &previous.hotkey, &settings.hotkey)?;
    }
    let saved = state.update(|s| *s = settings)?;
    log::info!("[SETTINGS] Saved (hotkey {})", saved.hotkey);
    Ok(saved)
}

/// Tauri command: bind a new capture hotkey and remember it.
#[tauri::command]
pub fn register_hotkey(
    app: tauri::AppHandle,
    state: tauri::State<'_, SettingsState>,
    accelerator: String,
) -> Result<(), String> {
    let previous = state.snapshot()?.hotkey;
    rebind(&app, &previous, &accelerator)?;
    state.update(|s| s.hotkey = accelerator)?;
    Ok(())
}

/// Tauri command: drop every global hotkey until the next register.
#[tauri::command]
pub fn unregister_hotkey(app: tauri::AppHandle) -> Result<(), String> {
    hotkeys::unregister_all(&app)
}

fn rebind(app: &tauri::AppHandle, previous: &str, next: &str) -> Result<(), String> {
    hotkeys::unregister_all(app)?;
    if let Err(e) = hotkeys::register(app, next) {
        log::warn!("[HOTKEY] {}; restoring {}", e, previous);
        hotkeys::register(app, previous)?;
        return Err(e);
    }
    Ok(())
}
