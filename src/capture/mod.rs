//! Screen capture domain — public API.
//!
//! Coordinate spaces, the backend seam and the capture pipeline:
//!   - coords.rs     — logical/physical conversion and pixel-grid snapping
//!   - backend.rs    — `ScreenBackend` trait, window and monitor records
//!   - region.rs     — crop + PNG encode helpers used by backends
//!   - screenshot.rs — `Screenshot` and `capture_selection`
//!   - desktop.rs    — xcap/Tauri backend (desktop feature only)

mod backend;
mod coords;
mod region;
mod screenshot;

#[cfg(feature = "desktop")]
pub mod desktop;

pub use backend::{
    is_excluded_window, topmost_window_at, CaptureError, InputPassthrough, MonitorInfo,
    ScreenBackend, WindowInfo, OVERLAY_TITLE,
};
pub use coords::{
    from_screen_absolute, point_to_screen_absolute, snap_region_to_pixel_grid, to_logical,
    to_physical, to_screen_absolute, MonitorOffset, PhysicalPoint, PhysicalRect, Point, Region,
};
pub use region::{crop_to_png_bytes, decode_rgba, encode_png};
pub use screenshot::{capture_selection, CaptureMode, CaptureRequest, Screenshot};
