//! Logical ↔ physical pixel conversion.
//!
//! Everything the overlay sees (pointer events, drawn rectangles) is in
//! logical pixels relative to the monitor the overlay covers. Everything the
//! OS sees (window rectangles, capture rectangles) is in physical pixels in
//! virtual-desktop space. These functions are the only place the two meet.

use serde::{Deserialize, Serialize};

/// A point in logical (DPI-independent) pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// An axis-aligned rectangle in logical pixels, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Region {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Bounding box of two corner points, in any drag direction.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x
            && p.x <= self.x + self.width
            && p.y >= self.y
            && p.y <= self.y + self.height
    }

    /// Overlap with `other`, or `None` when they only touch or are apart.
    pub fn intersection(&self, other: &Region) -> Option<Region> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = (self.x + self.width).min(other.x + other.width);
        let bottom = (self.y + self.height).min(other.y + other.height);
        if right <= left || bottom <= top {
            return None;
        }
        Some(Region::new(left, top, right - left, bottom - top))
    }

    /// True when both sides are strictly larger than `min`.
    pub fn exceeds(&self, min: f64) -> bool {
        self.width > min && self.height > min
    }
}

/// A point in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalPoint {
    pub x: i32,
    pub y: i32,
}

/// A rectangle in physical pixels, virtual-desktop space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Physical origin, physical size and scale factor of the monitor the
/// overlay is showing on. Set once per hotkey trigger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorOffset {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub scale_factor: f64,
}

impl MonitorOffset {
    /// The monitor's extent in logical pixels, origin at (0, 0).
    pub fn logical_bounds(&self) -> Region {
        Region::new(
            0.0,
            0.0,
            self.width as f64 / self.scale_factor,
            self.height as f64 / self.scale_factor,
        )
    }
}

impl Default for MonitorOffset {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            width: 1920,
            height: 1080,
            scale_factor: 1.0,
        }
    }
}

pub fn to_physical(p: Point, scale_factor: f64) -> PhysicalPoint {
    PhysicalPoint {
        x: (p.x * scale_factor).round() as i32,
        y: (p.y * scale_factor).round() as i32,
    }
}

pub fn to_logical(p: PhysicalPoint, scale_factor: f64) -> Point {
    Point {
        x: p.x as f64 / scale_factor,
        y: p.y as f64 / scale_factor,
    }
}

fn snap(v: f64, scale_factor: f64) -> f64 {
    (v * scale_factor).round() / scale_factor
}

/// Align every edge of `region` to a whole device pixel.
///
/// A region with fractional physical extents is captured at device resolution
/// but displayed at logical resolution, which blurs the result.
pub fn snap_region_to_pixel_grid(region: Region, scale_factor: f64) -> Region {
    Region {
        x: snap(region.x, scale_factor),
        y: snap(region.y, scale_factor),
        width: snap(region.width, scale_factor),
        height: snap(region.height, scale_factor),
    }
}

/// Monitor-relative logical point → absolute physical screen point.
pub fn point_to_screen_absolute(p: Point, monitor: &MonitorOffset) -> PhysicalPoint {
    let local = to_physical(p, monitor.scale_factor);
    PhysicalPoint {
        x: local.x + monitor.x,
        y: local.y + monitor.y,
    }
}

/// Monitor-relative logical region → absolute physical screen rectangle.
///
/// Origin is offset by the monitor position; size is only scaled.
pub fn to_screen_absolute(region: Region, monitor: &MonitorOffset) -> PhysicalRect {
    let s = monitor.scale_factor;
    PhysicalRect {
        x: (region.x * s).round() as i32 + monitor.x,
        y: (region.y * s).round() as i32 + monitor.y,
        width: (region.width * s).round().max(0.0) as u32,
        height: (region.height * s).round().max(0.0) as u32,
    }
}

/// Inverse of [`to_screen_absolute`], for rectangles reported by the OS.
pub fn from_screen_absolute(rect: PhysicalRect, monitor: &MonitorOffset) -> Region {
    let s = monitor.scale_factor;
    Region {
        x: (rect.x - monitor.x) as f64 / s,
        y: (rect.y - monitor.y) as f64 / s,
        width: rect.width as f64 / s,
        height: rect.height as f64 / s,
    }
}
