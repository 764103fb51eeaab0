//! Export helpers: files on disk and payloads for the detached windows.
//!
//! Sticky and AI-panel windows load the same frontend bundle; what they show
//! is injected as an initialization script that sets a few globals.

use crate::capture::{decode_rgba, CaptureError};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to write image: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Image(#[from] CaptureError),
}

/// Code-generation targets offered by the AI panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    React,
    Vue,
    Flutter,
}

/// Write encoded image bytes, creating parent directories as needed.
pub fn write_image(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, bytes)?;
    log::info!("[EXPORT] Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Decode for the clipboard, which wants raw RGBA.
pub fn clipboard_image(bytes: &[u8]) -> Result<RgbaImage, ExportError> {
    Ok(decode_rgba(bytes)?)
}

/// Unique window label, e.g. `sticky_3f2a…`.
pub fn window_label(prefix: &str) -> String {
    format!("{}_{}", prefix, uuid::Uuid::new_v4().simple())
}

/// Init script for a pinned sticky window.
///
/// `native_width`/`native_height` are the image's physical size, used by
/// the window to scale annotations when it is resized.
pub fn sticky_init_script(
    image_src: &str,
    annotations_json: &str,
    native_width: f64,
    native_height: f64,
) -> Result<String, ExportError> {
    Ok(format!(
        "window.__WINDOW_TYPE__ = 'sticky';\n\
         window.__STICKY_IMAGE_SRC__ = {};\n\
         window.__STICKY_ANNOTATIONS__ = {};\n\
         window.__STICKY_NATIVE_WIDTH__ = {};\n\
         window.__STICKY_NATIVE_HEIGHT__ = {};",
        serde_json::to_string(image_src)?,
        serde_json::to_string(annotations_json)?,
        native_width,
        native_height
    ))
}

pub fn ai_panel_init_script(image_src: &str, framework: Framework) -> Result<String, ExportError> {
    let data = serde_json::json!({ "imageSrc": image_src, "framework": framework });
    Ok(format!(
        "window.__WINDOW_TYPE__ = 'ai_panel'; window.__AI_PANEL_DATA__ = {};",
        data
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_image_creates_directories() {
        let dir = std::env::temp_dir().join(format!("snipkit-export-{}", std::process::id()));
        let path = dir.join("nested").join("shot.png");
        write_image(&path, &[1, 2, 3]).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3]);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn sticky_script_escapes_payloads() {
        let script = sticky_init_script("data:image/png;base64,AA==", r#"[{"text":"a'b"}]"#, 800.0, 600.0).unwrap();
        assert!(script.contains("window.__WINDOW_TYPE__ = 'sticky';"));
        assert!(script.contains(r#"window.__STICKY_ANNOTATIONS__ = "[{\"text\":\"a'b\"}]";"#));
        assert!(script.contains("window.__STICKY_NATIVE_WIDTH__ = 800;"));
    }

    #[test]
    fn ai_panel_script_carries_framework() {
        let script = ai_panel_init_script("src", Framework::Flutter).unwrap();
        assert!(script.contains(r#""framework":"flutter""#));
        assert!(script.contains(r#""imageSrc":"src""#));
    }

    #[test]
    fn labels_are_unique() {
        assert_ne!(window_label("sticky"), window_label("sticky"));
        assert!(window_label("ai_panel").starts_with("ai_panel_"));
    }

    #[test]
    fn clipboard_rejects_garbage() {
        assert!(clipboard_image(b"not an image").is_err());
    }
}
