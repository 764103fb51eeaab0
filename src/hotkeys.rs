//! Global hotkey → new capture session.
//!
//! The hotkey picks the monitor under the cursor, starts a fresh session on
//! it (replacing any session in progress), parks the overlay over that
//! monitor and tells the frontend which monitor it is on.

use crate::capture::desktop::{monitor_at, OVERLAY_LABEL};
use crate::capture::{MonitorOffset, OVERLAY_TITLE};
use crate::session::{CaptureSession, SessionSlot};
use crate::settings_commands::SettingsState;
use tauri::{AppHandle, Emitter, Manager};
use tauri_plugin_global_shortcut::{GlobalShortcutExt, Shortcut, ShortcutState};

/// Bind `accelerator` (e.g. "Ctrl+Shift+S") to start a capture.
pub fn register(app: &AppHandle, accelerator: &str) -> Result<(), String> {
    let shortcut: Shortcut = accelerator
        .parse()
        .map_err(|e| format!("Invalid shortcut '{}': {}", accelerator, e))?;

    app.global_shortcut()
        .on_shortcut(shortcut, |app, _shortcut, event| {
            if event.state == ShortcutState::Pressed {
                if let Err(e) = start_capture(app) {
                    log::error!("[HOTKEY] Failed to start capture: {}", e);
                }
            }
        })
        .map_err(|e| format!("Failed to register global shortcut: {}", e))?;

    log::info!("[HOTKEY] Registered {}", accelerator);
    Ok(())
}

pub fn unregister_all(app: &AppHandle) -> Result<(), String> {
    app.global_shortcut()
        .unregister_all()
        .map_err(|e| format!("Failed to unregister shortcuts: {}", e))?;
    log::info!("[HOTKEY] Unregistered all shortcuts");
    Ok(())
}

/// Start a capture session on the monitor under the cursor.
pub fn start_capture(app: &AppHandle) -> Result<MonitorOffset, String> {
    let start = std::time::Instant::now();

    let cursor = app.cursor_position().map_err(|e| e.to_string())?;
    let monitor = monitor_at(cursor.x.round() as i32, cursor.y.round() as i32)
        .map_err(|e| e.to_string())?;
    let offset = monitor.offset();
    log::info!(
        "[HOTKEY] Cursor ({:.0}, {:.0}) on '{}' {}x{} at ({}, {}) scale {}",
        cursor.x,
        cursor.y,
        monitor.name,
        offset.width,
        offset.height,
        offset.x,
        offset.y,
        offset.scale_factor
    );

    let settings = app.state::<SettingsState>().snapshot()?;
    app.state::<SessionSlot>()
        .replace(CaptureSession::from_settings(offset, &settings))
        .map_err(|e| e.to_string())?;

    show_overlay(app, &offset)?;
    app.emit("hotkey-triggered", offset)
        .map_err(|e| e.to_string())?;

    log::info!("[LATENCY] hotkey_to_overlay={}ms", start.elapsed().as_millis());
    Ok(offset)
}

/// Cover `monitor` with the overlay, creating the window on first use.
fn show_overlay(app: &AppHandle, monitor: &MonitorOffset) -> Result<(), String> {
    let overlay = match app.get_webview_window(OVERLAY_LABEL) {
        Some(window) => window,
        None => tauri::WebviewWindowBuilder::new(
            app,
            OVERLAY_LABEL,
            tauri::WebviewUrl::App("index.html".into()),
        )
        .title(OVERLAY_TITLE)
        .transparent(true)
        .decorations(false)
        .always_on_top(true)
        .skip_taskbar(true)
        .shadow(false)
        .visible(false)
        .build()
        .map_err(|e| e.to_string())?,
    };

    // xcap reports physical pixels, so position in physical units.
    overlay
        .set_position(tauri::PhysicalPosition::new(monitor.x, monitor.y))
        .map_err(|e| e.to_string())?;
    overlay
        .set_size(tauri::PhysicalSize::new(monitor.width, monitor.height))
        .map_err(|e| e.to_string())?;
    overlay.show().map_err(|e| e.to_string())?;
    let _ = overlay.set_focus();
    overlay
        .set_ignore_cursor_events(false)
        .map_err(|e| e.to_string())?;
    Ok(())
}

/// Hide the overlay and make sure it takes input next time it shows.
pub fn hide_overlay(app: &AppHandle) {
    if let Some(overlay) = app.get_webview_window(OVERLAY_LABEL) {
        let _ = overlay.set_ignore_cursor_events(false);
        let _ = overlay.hide();
    }
}
