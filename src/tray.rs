//! System tray icon.
//!
//! Left-click starts a capture on the monitor under the cursor, same as
//! the global hotkey. Right-click opens a menu with Capture and Quit.

use crate::hotkeys;
use tauri::{
    image::Image as TauriImage,
    menu::{MenuBuilder, MenuItemBuilder},
    tray::{MouseButton, TrayIconBuilder, TrayIconEvent},
    AppHandle,
};

pub fn setup_tray(app: &AppHandle) -> Result<(), Box<dyn std::error::Error>> {
    let capture_item = MenuItemBuilder::with_id("capture", "Capture").build(app)?;
    let quit_item = MenuItemBuilder::with_id("quit", "Quit SnipKit").build(app)?;
    let menu = MenuBuilder::new(app)
        .item(&capture_item)
        .separator()
        .item(&quit_item)
        .build()?;

    // Tauri's Image wants raw RGBA.
    let icon_img = image::load_from_memory(include_bytes!("../icons/icon.png"))
        .map_err(|e| format!("Failed to decode tray icon: {}", e))?;
    let rgba = icon_img.to_rgba8();
    let (w, h) = (rgba.width(), rgba.height());
    let tray_icon = TauriImage::new_owned(rgba.into_raw(), w, h);

    TrayIconBuilder::new()
        .icon(tray_icon)
        .tooltip("SnipKit — Click to capture")
        .menu(&menu)
        .show_menu_on_left_click(false)
        .on_tray_icon_event(|tray_icon, event| {
            if let TrayIconEvent::Click {
                button: MouseButton::Left,
                ..
            } = event
            {
                log::info!("[TRAY] Click");
                if let Err(e) = hotkeys::start_capture(tray_icon.app_handle()) {
                    log::error!("[TRAY] Failed to start capture: {}", e);
                }
            }
        })
        .on_menu_event(|app, event| match event.id().as_ref() {
            "capture" => {
                if let Err(e) = hotkeys::start_capture(app) {
                    log::error!("[TRAY] Failed to start capture: {}", e);
                }
            }
            "quit" => {
                log::info!("Quit requested from tray menu");
                app.exit(0);
            }
            _ => {}
        })
        .build(app)?;

    Ok(())
}
