//! Region selection domain — public API.
//!
//! Turns raw overlay pointer events into a capture request:
//!   - hit_test.rs — which window is under the pointer (smart select)
//!   - engine.rs   — drag vs click vs edge-click state machine

pub mod engine;
pub mod hit_test;

pub use engine::{
    DiscardReason, RegionSelectionEngine, SelectionOutcome, SelectionPhase, SelectionView,
};
pub use hit_test::{
    query_backend, HighlightedWindow, HitTestOutcome, HitTestStep, HitTestTicket, WindowHitTester,
    FULL_SCREEN_WINDOW_ID,
};

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunable thresholds for selection and smart select.
///
/// Distances are logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectionTuning {
    /// Width of the band along each screen edge that means "full screen".
    pub edge_margin: f64,
    /// Minimum time between backend hit-tests...
    pub hit_test_interval_ms: u64,
    /// ...unless the pointer has moved at least this far.
    pub hit_test_min_move: f64,
    /// Pointer travel beyond which a press becomes a drag.
    pub drag_threshold: f64,
    /// Dragged regions must exceed this on both sides.
    pub min_region_size: f64,
    /// Delay before capture so the overlay is gone from the frame buffer.
    pub paint_settle_ms: u64,
}

impl SelectionTuning {
    pub fn hit_test_interval(&self) -> Duration {
        Duration::from_millis(self.hit_test_interval_ms)
    }

    pub fn paint_settle(&self) -> Duration {
        Duration::from_millis(self.paint_settle_ms)
    }
}

impl Default for SelectionTuning {
    fn default() -> Self {
        Self {
            edge_margin: 20.0,
            hit_test_interval_ms: 250,
            hit_test_min_move: 30.0,
            drag_threshold: 5.0,
            min_region_size: 5.0,
            paint_settle_ms: 30,
        }
    }
}
