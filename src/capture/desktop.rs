//! xcap + Tauri implementation of [`ScreenBackend`].
//!
//! xcap calls block, so each one runs on the blocking pool. Coordinates
//! coming from xcap are treated as physical virtual-desktop pixels.

use super::backend::{topmost_window_at, CaptureError, MonitorInfo, ScreenBackend, WindowInfo};
use super::coords::{MonitorOffset, PhysicalPoint, PhysicalRect};
use super::region::{crop_to_png_bytes, encode_png};
use tauri::{AppHandle, Manager};
use xcap::Monitor;

/// Label of the full-screen selection window.
pub const OVERLAY_LABEL: &str = "overlay";

/// Our own windows are filtered out of point queries by this name.
pub const APP_NAME: &str = "snipkit";

pub struct DesktopBackend {
    app: AppHandle,
}

impl DesktopBackend {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }

    fn overlay(&self) -> Result<tauri::WebviewWindow, CaptureError> {
        self.app
            .get_webview_window(OVERLAY_LABEL)
            .ok_or_else(|| CaptureError::Overlay("overlay window not open".to_string()))
    }
}

async fn blocking<T, F>(f: F) -> Result<T, CaptureError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, CaptureError> + Send + 'static,
{
    tauri::async_runtime::spawn_blocking(f)
        .await
        .map_err(|e| CaptureError::Capture(format!("worker failed: {}", e)))?
}

impl ScreenBackend for DesktopBackend {
    fn set_overlay_input_transparent(&self, transparent: bool) -> Result<(), CaptureError> {
        self.overlay()?
            .set_ignore_cursor_events(transparent)
            .map_err(|e| CaptureError::Overlay(e.to_string()))
    }

    fn set_overlay_visible(&self, visible: bool) -> Result<(), CaptureError> {
        let overlay = self.overlay()?;
        let result = if visible {
            overlay.show().and_then(|_| overlay.set_focus())
        } else {
            overlay.hide()
        };
        result.map_err(|e| CaptureError::Overlay(e.to_string()))
    }

    async fn point_query_window(&self, at: PhysicalPoint) -> Result<Option<WindowInfo>, CaptureError> {
        blocking(move || window_at(at)).await
    }

    async fn capture_region(&self, rect: PhysicalRect) -> Result<Vec<u8>, CaptureError> {
        blocking(move || {
            let center_x = rect.x + (rect.width / 2) as i32;
            let center_y = rect.y + (rect.height / 2) as i32;
            let monitor = monitor_containing(center_x, center_y)?;
            let (mx, my) = (monitor.x().unwrap_or(0), monitor.y().unwrap_or(0));
            let image = monitor
                .capture_image()
                .map_err(|e| CaptureError::Capture(e.to_string()))?;
            crop_to_png_bytes(&image, rect.x - mx, rect.y - my, rect.width, rect.height)
        })
        .await
    }

    async fn capture_full_screen(&self, target: MonitorOffset) -> Result<Vec<u8>, CaptureError> {
        blocking(move || {
            let image = monitor_containing(target.x, target.y)?
                .capture_image()
                .map_err(|e| CaptureError::Capture(e.to_string()))?;
            encode_png(&image)
        })
        .await
    }
}

fn window_at(at: PhysicalPoint) -> Result<Option<WindowInfo>, CaptureError> {
    let windows = xcap::Window::all().map_err(|e| CaptureError::WindowQuery(e.to_string()))?;
    // xcap lists windows front to back; the index is the z-order.
    let candidates = windows
        .iter()
        .enumerate()
        .filter(|(_, w)| !w.is_minimized().unwrap_or(false))
        .map(|(z, w)| WindowInfo {
            id: w.id().unwrap_or(0) as i64,
            title: w.title().unwrap_or_default(),
            app_name: w.app_name().unwrap_or_default(),
            x: w.x().unwrap_or(0),
            y: w.y().unwrap_or(0),
            width: w.width().unwrap_or(0),
            height: w.height().unwrap_or(0),
            z_order: z as i32,
        });
    Ok(topmost_window_at(candidates, at, APP_NAME))
}

fn monitor_containing(x: i32, y: i32) -> Result<Monitor, CaptureError> {
    let monitors = Monitor::all().map_err(|e| CaptureError::Capture(e.to_string()))?;
    let index = monitors
        .iter()
        .position(|m| describe(m).contains(x, y))
        .or_else(|| monitors.iter().position(|m| m.is_primary().unwrap_or(false)))
        .ok_or(CaptureError::NoMonitor { x, y })?;
    monitors
        .into_iter()
        .nth(index)
        .ok_or(CaptureError::NoMonitor { x, y })
}

fn describe(m: &Monitor) -> MonitorInfo {
    MonitorInfo {
        id: m.id().unwrap_or(0),
        name: m.name().unwrap_or_default(),
        x: m.x().unwrap_or(0),
        y: m.y().unwrap_or(0),
        width: m.width().unwrap_or(0),
        height: m.height().unwrap_or(0),
        scale_factor: m.scale_factor().unwrap_or(1.0) as f64,
        is_primary: m.is_primary().unwrap_or(false),
    }
}

/// Every connected display.
pub fn list_monitors() -> Result<Vec<MonitorInfo>, CaptureError> {
    let monitors = Monitor::all().map_err(|e| CaptureError::Capture(e.to_string()))?;
    Ok(monitors.iter().map(describe).collect())
}

/// The display under (x, y), falling back to the primary one.
pub fn monitor_at(x: i32, y: i32) -> Result<MonitorInfo, CaptureError> {
    monitor_containing(x, y).map(|m| describe(&m))
}
