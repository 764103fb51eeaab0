//! SnipKit — region/window capture and annotation.
//!
//! The core (selection, capture pipeline, annotation history, settings) is
//! plain Rust and builds without a windowing system. The Tauri shell that
//! wires it to real windows lives behind the `desktop` feature:
//!   - commands.rs           — overlay, editor and export commands
//!   - settings_commands.rs  — settings panel + hotkey rebinding
//!   - hotkeys.rs            — global shortcut → new capture session
//!   - tray.rs               — tray icon entry point

pub mod annotation;
pub mod capture;
pub mod editor;
pub mod export;
pub mod pipeline;
pub mod selection;
pub mod session;
pub mod settings;

#[cfg(feature = "desktop")]
mod commands;
#[cfg(feature = "desktop")]
mod hotkeys;
#[cfg(feature = "desktop")]
mod settings_commands;
#[cfg(feature = "desktop")]
mod tray;

#[cfg(feature = "desktop")]
pub use desktop::run;

#[cfg(feature = "desktop")]
mod desktop {
    use crate::session::SessionSlot;
    use crate::settings_commands::SettingsState;
    use crate::{commands, hotkeys, settings_commands, tray};

    /// Application entry point, called from main.rs.
    #[cfg_attr(mobile, tauri::mobile_entry_point)]
    pub fn run() {
        env_logger::init();

        let settings = crate::settings::load();
        let hotkey = settings.hotkey.clone();

        tauri::Builder::default()
            .plugin(tauri_plugin_dialog::init())
            .plugin(tauri_plugin_global_shortcut::Builder::new().build())
            .manage(SessionSlot::new())
            .manage(SettingsState::new(settings))
            .invoke_handler(tauri::generate_handler![
                // Overlay selection (commands.rs)
                commands::selection_pointer_down,
                commands::selection_pointer_move,
                commands::selection_pointer_up,
                commands::selection_cancel,
                commands::toggle_smart_select,
                commands::get_session_view,
                commands::close_session,
                // Editor (commands.rs)
                commands::get_editor_state,
                commands::get_screenshot_data_url,
                commands::editor_set_tool,
                commands::editor_pointer_down,
                commands::editor_pointer_move,
                commands::editor_pointer_up,
                commands::editor_key,
                commands::editor_undo,
                commands::editor_redo,
                commands::editor_remove_annotation,
                commands::editor_update_annotation,
                commands::editor_clear,
                commands::editor_update_style,
                // Export (commands.rs)
                commands::copy_image_to_clipboard,
                commands::save_image,
                commands::open_save_dialog,
                commands::default_save_path,
                commands::create_sticky_window,
                commands::create_ai_panel_window,
                commands::get_all_monitors,
                // Settings (settings_commands.rs)
                settings_commands::get_settings,
                settings_commands::save_settings,
                settings_commands::register_hotkey,
                settings_commands::unregister_hotkey,
            ])
            .setup(move |app| {
                log::info!("SnipKit starting up");

                tray::setup_tray(app.handle())?;

                if let Err(e) = hotkeys::register(app.handle(), &hotkey) {
                    log::error!("[HOTKEY] Failed to register {}: {}", hotkey, e);
                }

                log::info!("Ready — press {} or click the tray icon", hotkey);
                Ok(())
            })
            .run(tauri::generate_context!())
            .expect("Error running SnipKit");
    }
}
