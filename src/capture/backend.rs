//! The narrow interface between the selection core and the OS.
//!
//! Screen capture, window enumeration and overlay input passthrough are
//! platform calls. The core only ever talks to them through [`ScreenBackend`],
//! which keeps the state machines testable with a scripted fake.

use super::coords::{MonitorOffset, PhysicalPoint, PhysicalRect};
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Errors raised by a screen backend.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("No monitor found at ({x}, {y})")]
    NoMonitor { x: i32, y: i32 },
    #[error("Window query failed: {0}")]
    WindowQuery(String),
    #[error("Screen capture failed: {0}")]
    Capture(String),
    #[error("Image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("Invalid capture region: {0}")]
    InvalidRegion(String),
    #[error("Overlay window unavailable: {0}")]
    Overlay(String),
}

/// A top-level window as reported by the OS, in physical pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowInfo {
    pub id: i64,
    pub title: String,
    pub app_name: String,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    /// Lower = closer to the user.
    pub z_order: i32,
}

impl WindowInfo {
    pub fn bounds(&self) -> PhysicalRect {
        PhysicalRect {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }

    pub fn contains(&self, p: PhysicalPoint) -> bool {
        p.x >= self.x
            && p.y >= self.y
            && (p.x as i64) < self.x as i64 + self.width as i64
            && (p.y as i64) < self.y as i64 + self.height as i64
    }
}

/// Titles of shell windows that cover the desktop but are never a capture
/// target.
const SHELL_TITLES: [&str; 2] = ["program manager", "default ime"];

/// Title of the selection overlay window.
pub const OVERLAY_TITLE: &str = "SnipKit Overlay";

/// True for windows smart select must never offer: zero-sized, shell
/// windows, and anything belonging to `own_app` (our overlay included).
pub fn is_excluded_window(w: &WindowInfo, own_app: &str) -> bool {
    let title = w.title.to_lowercase();
    let app = w.app_name.to_lowercase();
    let own = own_app.to_lowercase();
    w.width == 0
        || w.height == 0
        || SHELL_TITLES.contains(&title.as_str())
        || w.title == OVERLAY_TITLE
        || app.contains(&own)
        || title.contains(&own)
}

/// Topmost (lowest `z_order`) candidate containing `at`.
pub fn topmost_window_at<I>(windows: I, at: PhysicalPoint, own_app: &str) -> Option<WindowInfo>
where
    I: IntoIterator<Item = WindowInfo>,
{
    windows
        .into_iter()
        .filter(|w| w.contains(at) && !is_excluded_window(w, own_app))
        .min_by_key(|w| w.z_order)
}

/// A connected display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorInfo {
    pub id: u32,
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub scale_factor: f64,
    pub is_primary: bool,
}

impl MonitorInfo {
    pub fn offset(&self) -> MonitorOffset {
        MonitorOffset {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            scale_factor: self.scale_factor,
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x
            && y >= self.y
            && (x as i64) < self.x as i64 + self.width as i64
            && (y as i64) < self.y as i64 + self.height as i64
    }
}

/// Platform calls the selection core depends on.
///
/// Image bytes returned by the capture calls are PNG-encoded.
pub trait ScreenBackend: Send + Sync {
    /// Let pointer input fall through the overlay to the windows beneath it.
    fn set_overlay_input_transparent(&self, transparent: bool) -> Result<(), CaptureError>;

    /// Show or hide the overlay. Hidden before a capture and shown again
    /// afterwards, hosting the editor on success or the selection on failure.
    fn set_overlay_visible(&self, _visible: bool) -> Result<(), CaptureError> {
        Ok(())
    }

    /// Topmost window containing `at` (absolute physical pixels), if any.
    fn point_query_window(
        &self,
        at: PhysicalPoint,
    ) -> impl Future<Output = Result<Option<WindowInfo>, CaptureError>> + Send;

    /// Capture an absolute physical rectangle.
    fn capture_region(
        &self,
        rect: PhysicalRect,
    ) -> impl Future<Output = Result<Vec<u8>, CaptureError>> + Send;

    /// Capture the whole monitor the overlay is on.
    fn capture_full_screen(
        &self,
        monitor: MonitorOffset,
    ) -> impl Future<Output = Result<Vec<u8>, CaptureError>> + Send;
}

/// Holds the overlay input-transparent for as long as it lives.
///
/// Dropping it always restores normal input, including when the query it
/// wraps fails or its future is dropped mid-flight.
pub struct InputPassthrough<'a, B: ScreenBackend + ?Sized> {
    backend: &'a B,
}

impl<'a, B: ScreenBackend + ?Sized> InputPassthrough<'a, B> {
    pub fn engage(backend: &'a B) -> Self {
        if let Err(e) = backend.set_overlay_input_transparent(true) {
            log::warn!("[HITTEST] Could not make overlay input-transparent: {}", e);
        }
        Self { backend }
    }
}

impl<B: ScreenBackend + ?Sized> Drop for InputPassthrough<'_, B> {
    fn drop(&mut self) {
        if let Err(e) = self.backend.set_overlay_input_transparent(false) {
            log::error!("[HITTEST] Failed to restore overlay input: {}", e);
        }
    }
}
