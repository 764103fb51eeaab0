//! Tauri command handlers.
//!
//! Thin wrappers that bridge frontend invoke() calls to the core. Multi-step
//! selection work is delegated to pipeline.rs; editor commands lock the
//! session slot, do one thing and return the new editor view.

use crate::annotation::{Annotation, StylePatch, Tool};
use crate::capture::desktop::{list_monitors, DesktopBackend};
use crate::capture::{MonitorInfo, Point};
use crate::editor::{EditorView, KeyAction, KeyInput};
use crate::export::{self, Framework};
use crate::hotkeys;
use crate::pipeline::{self, FinishOutcome};
use crate::selection::SelectionView;
use crate::session::{SessionSlot, SessionView};
use crate::settings_commands::SettingsState;
use tauri::{Emitter, Manager};
use uuid::Uuid;

// ── Overlay selection ────────────────────────────────────────────────

#[tauri::command]
pub fn selection_pointer_down(
    slot: tauri::State<'_, SessionSlot>,
    x: f64,
    y: f64,
) -> Result<SelectionView, String> {
    pipeline::pointer_down(&slot, x, y).map_err(|e| e.to_string())
}

/// Tauri command: pointer moved on the overlay.
///
/// May run a window hit-test; the returned view already reflects it.
#[tauri::command]
pub async fn selection_pointer_move(
    app: tauri::AppHandle,
    slot: tauri::State<'_, SessionSlot>,
    x: f64,
    y: f64,
) -> Result<SelectionView, String> {
    let backend = DesktopBackend::new(app.clone());
    pipeline::pointer_move(&slot, &backend, x, y)
        .await
        .map_err(|e| e.to_string())
}

/// Tauri command: pointer released on the overlay.
///
/// Emits `region-finalized` once the selection is accepted, then either
/// `screenshot-ready` or `capture-failed`.
#[tauri::command]
pub async fn selection_pointer_up(
    app: tauri::AppHandle,
    slot: tauri::State<'_, SessionSlot>,
    x: f64,
    y: f64,
) -> Result<FinishOutcome, String> {
    let backend = DesktopBackend::new(app.clone());
    let outcome = pipeline::pointer_up(&slot, &backend, x, y, |request| {
        if let Err(e) = app.emit("region-finalized", request) {
            log::warn!("[SELECT] Failed to emit region-finalized: {}", e);
        }
    })
    .await
    .map_err(|e| e.to_string())?;

    match &outcome {
        FinishOutcome::Captured { .. } => app.emit("screenshot-ready", &outcome),
        FinishOutcome::CaptureFailed { message } => app.emit("capture-failed", message),
        _ => Ok(()),
    }
    .map_err(|e| e.to_string())?;
    Ok(outcome)
}

/// Tauri command: Escape on the overlay.
#[tauri::command]
pub fn selection_cancel(slot: tauri::State<'_, SessionSlot>) -> Result<SelectionView, String> {
    pipeline::cancel(&slot).map_err(|e| e.to_string())
}

/// Tauri command: flip smart select for this session and future ones.
#[tauri::command]
pub fn toggle_smart_select(
    slot: tauri::State<'_, SessionSlot>,
    settings: tauri::State<'_, SettingsState>,
    enabled: bool,
) -> Result<SelectionView, String> {
    if let Err(e) = settings.update(|s| s.smart_select = enabled) {
        log::warn!("[SETTINGS] Could not persist smart select: {}", e);
    }
    pipeline::set_smart_select(&slot, enabled).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn get_session_view(slot: tauri::State<'_, SessionSlot>) -> Result<SessionView, String> {
    slot.with(|s| s.view()).map_err(|e| e.to_string())
}

/// Tauri command: end the session and hide the overlay.
#[tauri::command]
pub fn close_session(app: tauri::AppHandle, slot: tauri::State<'_, SessionSlot>) -> Result<(), String> {
    if let Some(session) = slot.close().map_err(|e| e.to_string())? {
        log::info!("[SESSION] Closed {}", session.id());
    }
    hotkeys::hide_overlay(&app);
    Ok(())
}

// ── Editor ───────────────────────────────────────────────────────────

fn with_editor<R>(
    slot: &SessionSlot,
    f: impl FnOnce(&mut crate::editor::EditorSession) -> R,
) -> Result<R, String> {
    slot.with_editor(f).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn get_editor_state(slot: tauri::State<'_, SessionSlot>) -> Result<EditorView, String> {
    with_editor(&slot, |e| e.view())
}

/// Tauri command: the captured image as a `data:` URL.
#[tauri::command]
pub fn get_screenshot_data_url(slot: tauri::State<'_, SessionSlot>) -> Result<String, String> {
    with_editor(&slot, |e| e.screenshot().data_url())
}

#[tauri::command]
pub fn editor_set_tool(slot: tauri::State<'_, SessionSlot>, tool: Tool) -> Result<EditorView, String> {
    with_editor(&slot, |e| {
        e.set_tool(tool);
        e.view()
    })
}

#[tauri::command]
pub fn editor_pointer_down(slot: tauri::State<'_, SessionSlot>, x: f64, y: f64) -> Result<EditorView, String> {
    with_editor(&slot, |e| {
        e.pointer_down(Point::new(x, y));
        e.view()
    })
}

#[tauri::command]
pub fn editor_pointer_move(slot: tauri::State<'_, SessionSlot>, x: f64, y: f64) -> Result<EditorView, String> {
    with_editor(&slot, |e| {
        e.pointer_move(Point::new(x, y));
        e.view()
    })
}

#[tauri::command]
pub fn editor_pointer_up(slot: tauri::State<'_, SessionSlot>, x: f64, y: f64) -> Result<EditorView, String> {
    with_editor(&slot, |e| {
        e.pointer_up(Point::new(x, y));
        e.view()
    })
}

/// Tauri command: key press in the editor. The frontend closes the editor
/// on `close`.
#[tauri::command]
pub fn editor_key(slot: tauri::State<'_, SessionSlot>, input: KeyInput) -> Result<KeyAction, String> {
    with_editor(&slot, |e| e.handle_key(&input))
}

#[tauri::command]
pub fn editor_undo(slot: tauri::State<'_, SessionSlot>) -> Result<EditorView, String> {
    with_editor(&slot, |e| {
        e.undo();
        e.view()
    })
}

#[tauri::command]
pub fn editor_redo(slot: tauri::State<'_, SessionSlot>) -> Result<EditorView, String> {
    with_editor(&slot, |e| {
        e.redo();
        e.view()
    })
}

#[tauri::command]
pub fn editor_remove_annotation(slot: tauri::State<'_, SessionSlot>, id: Uuid) -> Result<EditorView, String> {
    with_editor(&slot, |e| {
        e.remove(id);
        e.view()
    })
}

/// Tauri command: live geometry change (drag/resize). Not undoable.
#[tauri::command]
pub fn editor_update_annotation(
    slot: tauri::State<'_, SessionSlot>,
    annotation: Annotation,
) -> Result<EditorView, String> {
    with_editor(&slot, |e| {
        e.update(annotation);
        e.view()
    })
}

#[tauri::command]
pub fn editor_clear(slot: tauri::State<'_, SessionSlot>) -> Result<EditorView, String> {
    with_editor(&slot, |e| {
        e.clear();
        e.view()
    })
}

#[tauri::command]
pub fn editor_update_style(slot: tauri::State<'_, SessionSlot>, patch: StylePatch) -> Result<EditorView, String> {
    with_editor(&slot, |e| {
        e.update_style(patch);
        e.view()
    })
}

// ── Export ───────────────────────────────────────────────────────────

/// Tauri command: put an encoded image (PNG/BMP/JPEG) on the clipboard.
///
/// navigator.clipboard is unreliable in transparent webview windows, so
/// this goes through arboard.
#[tauri::command]
pub async fn copy_image_to_clipboard(image_data: Vec<u8>) -> Result<(), String> {
    let img = export::clipboard_image(&image_data).map_err(|e| e.to_string())?;
    let (width, height) = (img.width() as usize, img.height() as usize);
    let mut clipboard = arboard::Clipboard::new()
        .map_err(|e| format!("Failed to access clipboard: {}", e))?;
    clipboard
        .set_image(arboard::ImageData {
            width,
            height,
            bytes: img.into_raw().into(),
        })
        .map_err(|e| format!("Failed to copy image to clipboard: {}", e))?;
    log::info!("[EXPORT] Copied {}x{} image to clipboard", width, height);
    Ok(())
}

#[tauri::command]
pub async fn save_image(path: String, image_data: Vec<u8>) -> Result<(), String> {
    export::write_image(std::path::Path::new(&path), &image_data).map_err(|e| e.to_string())
}

/// Tauri command: native save dialog, PNG filter, starting in the save dir.
#[tauri::command]
pub async fn open_save_dialog(
    app: tauri::AppHandle,
    settings: tauri::State<'_, SettingsState>,
) -> Result<Option<String>, String> {
    use tauri_plugin_dialog::DialogExt;

    let dir = settings.snapshot()?.resolved_save_dir();
    let picked = app
        .dialog()
        .file()
        .add_filter("Image", &["png"])
        .set_directory(dir)
        .blocking_save_file();
    Ok(picked.map(|p| p.to_string()))
}

/// Tauri command: timestamped path in the configured save directory.
#[tauri::command]
pub fn default_save_path(settings: tauri::State<'_, SettingsState>) -> Result<String, String> {
    let now_ms = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_err(|e| e.to_string())?
        .as_millis() as u64;
    Ok(settings
        .snapshot()?
        .default_save_path(now_ms)
        .to_string_lossy()
        .into_owned())
}

/// Tauri command: pin the image (with its annotations) in a frameless,
/// always-on-top window.
#[tauri::command]
#[allow(clippy::too_many_arguments)]
pub async fn create_sticky_window(
    app: tauri::AppHandle,
    image_src: String,
    annotations_json: String,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    native_width: f64,
    native_height: f64,
) -> Result<String, String> {
    let label = export::window_label("sticky");
    let script = export::sticky_init_script(&image_src, &annotations_json, native_width, native_height)
        .map_err(|e| e.to_string())?;

    tauri::WebviewWindowBuilder::new(&app, &label, tauri::WebviewUrl::App("index.html".into()))
        .title("SnipKit Sticky")
        .decorations(false)
        .transparent(true)
        .resizable(true)
        .always_on_top(true)
        .skip_taskbar(true)
        .shadow(true)
        .inner_size(width, height)
        .position(x, y)
        .initialization_script(&script)
        .build()
        .map_err(|e| e.to_string())?;

    log::info!("[EXPORT] Sticky window {} ({}x{})", label, width, height);
    Ok(label)
}

/// Tauri command: open the code-generation panel for the capture.
#[tauri::command]
pub async fn create_ai_panel_window(
    app: tauri::AppHandle,
    image_src: String,
    framework: Framework,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) -> Result<String, String> {
    let label = export::window_label("ai_panel");
    let script = export::ai_panel_init_script(&image_src, framework).map_err(|e| e.to_string())?;

    tauri::WebviewWindowBuilder::new(&app, &label, tauri::WebviewUrl::App("index.html".into()))
        .title("SnipKit AI Code")
        .decorations(false)
        .transparent(true)
        .resizable(true)
        .shadow(true)
        .inner_size(width, height)
        .position(x, y)
        .initialization_script(&script)
        .build()
        .map_err(|e| e.to_string())?;

    if let Some(overlay) = app.get_webview_window(crate::capture::desktop::OVERLAY_LABEL) {
        let _ = overlay.set_always_on_top(false);
    }
    log::info!("[EXPORT] AI panel {} ({:?})", label, framework);
    Ok(label)
}

#[tauri::command]
pub async fn get_all_monitors() -> Result<Vec<MonitorInfo>, String> {
    tauri::async_runtime::spawn_blocking(list_monitors)
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())
}
