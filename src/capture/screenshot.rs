//! The captured image aggregate and the pipeline that produces it.

use super::backend::{CaptureError, ScreenBackend};
use super::coords::{snap_region_to_pixel_grid, to_screen_absolute, MonitorOffset, Region};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    #[default]
    Capture,
    Scrolling,
    Record,
    Live,
}

/// What a finished selection asks the backend to capture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CaptureRequest {
    /// A logical region on the overlay's monitor.
    Region { region: Region },
    /// The whole monitor, via the dedicated full-screen call.
    FullScreen,
}

/// One successful capture. Owns the image; the editor's annotation history
/// lives and dies with it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Screenshot {
    pub id: Uuid,
    #[serde(skip)]
    pub png: Vec<u8>,
    /// Logical region on the source monitor.
    pub region: Region,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub mode: CaptureMode,
}

impl Screenshot {
    pub fn new(png: Vec<u8>, region: Region, mode: CaptureMode) -> Self {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        Self {
            id: Uuid::new_v4(),
            png,
            region,
            timestamp,
            mode,
        }
    }

    /// `data:` URL the webview can use directly as an image source.
    pub fn data_url(&self) -> String {
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.png)
        )
    }
}

/// Run a finished selection through the backend.
///
/// Waits `paint_settle` first so the compositor has dropped the overlay
/// from the frame. Regions are snapped to the device pixel grid in logical
/// space and only then scaled and offset into physical screen space.
pub async fn capture_selection<B: ScreenBackend>(
    backend: &B,
    monitor: &MonitorOffset,
    request: CaptureRequest,
    paint_settle: Duration,
) -> Result<Screenshot, CaptureError> {
    let start = Instant::now();
    if let Err(e) = backend.set_overlay_visible(false) {
        log::warn!("[CAPTURE] Could not hide overlay: {}", e);
    }
    tokio::time::sleep(paint_settle).await;
    let settle_ms = start.elapsed().as_millis();

    // The overlay comes back either way: as the editor on success, as the
    // selection surface on failure.
    let result = grab(backend, monitor, request).await;
    if let Err(e) = backend.set_overlay_visible(true) {
        log::warn!("[CAPTURE] Could not restore overlay: {}", e);
    }
    let (png, region) = result?;

    log::info!(
        "[LATENCY] settle={}ms total={}ms ({} bytes)",
        settle_ms,
        start.elapsed().as_millis(),
        png.len()
    );

    Ok(Screenshot::new(png, region, CaptureMode::Capture))
}

async fn grab<B: ScreenBackend>(
    backend: &B,
    monitor: &MonitorOffset,
    request: CaptureRequest,
) -> Result<(Vec<u8>, Region), CaptureError> {
    let grabbed = match request {
        CaptureRequest::Region { region } => {
            let snapped = snap_region_to_pixel_grid(region, monitor.scale_factor);
            let rect = to_screen_absolute(snapped, monitor);
            if rect.width == 0 || rect.height == 0 {
                return Err(CaptureError::InvalidRegion(format!(
                    "{}x{} at ({}, {})",
                    rect.width, rect.height, rect.x, rect.y
                )));
            }
            log::info!(
                "[CAPTURE] Region {:?} -> physical {}x{} at ({}, {})",
                snapped,
                rect.width,
                rect.height,
                rect.x,
                rect.y
            );
            (backend.capture_region(rect).await?, snapped)
        }
        CaptureRequest::FullScreen => {
            log::info!(
                "[CAPTURE] Full screen {}x{} at ({}, {})",
                monitor.width,
                monitor.height,
                monitor.x,
                monitor.y
            );
            (
                backend.capture_full_screen(*monitor).await?,
                monitor.logical_bounds(),
            )
        }
    };
    Ok(grabbed)
}
