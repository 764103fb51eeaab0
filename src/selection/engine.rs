//! Region selection state machine.
//!
//! Hover → Armed (pointer down) → Dragging (moved past the drag threshold)
//! → Capturing. A release without a drag is a click and resolves to a full
//! screen capture, the highlighted window, or nothing. Discarded selections
//! and failed captures return to Hover so the user can try again.

use super::hit_test::{
    in_edge_zone, HighlightedWindow, HitTestOutcome, HitTestStep, HitTestTicket, WindowHitTester,
};
use super::SelectionTuning;
use crate::capture::{CaptureError, CaptureRequest, MonitorOffset, Point, Region, WindowInfo};
use serde::Serialize;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "phase", rename_all = "camelCase")]
pub enum SelectionPhase {
    Hover,
    /// Pointer is down but has not travelled past the drag threshold.
    Armed { origin: Point },
    Dragging { origin: Point, region: Region },
    /// A capture request is out; pointer input is ignored until it resolves.
    Capturing,
    Captured,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DiscardReason {
    /// Dragged region was not larger than the minimum on both sides.
    TooSmall,
    /// Click away from the edges with nothing highlighted.
    NoTarget,
}

/// Result of releasing the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionOutcome {
    /// The region is final. Published once; the toolbar and the capture
    /// pipeline both react to it.
    Capture(CaptureRequest),
    Discarded(DiscardReason),
    /// Release arrived in a phase where it means nothing.
    Ignored,
}

/// Snapshot the overlay renders from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionView {
    pub phase: SelectionPhase,
    /// Cut-out in the dim mask, if any.
    pub region: Option<Region>,
    pub highlight: Option<HighlightedWindow>,
    /// e.g. "200 x 150", shown next to the selection.
    pub dimensions: Option<String>,
    pub smart_select: bool,
}

pub struct RegionSelectionEngine {
    tuning: SelectionTuning,
    monitor: MonitorOffset,
    smart_select: bool,
    phase: SelectionPhase,
    region: Option<Region>,
    tester: WindowHitTester,
}

impl RegionSelectionEngine {
    pub fn new(monitor: MonitorOffset, tuning: SelectionTuning, smart_select: bool) -> Self {
        Self {
            tuning,
            monitor,
            smart_select,
            phase: SelectionPhase::Hover,
            region: None,
            tester: WindowHitTester::new(tuning),
        }
    }

    pub fn phase(&self) -> SelectionPhase {
        self.phase
    }

    pub fn monitor(&self) -> &MonitorOffset {
        &self.monitor
    }

    pub fn tuning(&self) -> &SelectionTuning {
        &self.tuning
    }

    pub fn region(&self) -> Option<Region> {
        self.region
    }

    pub fn smart_select(&self) -> bool {
        self.smart_select
    }

    /// The highlighted window, while one can still be clicked.
    pub fn highlighted(&self) -> Option<&HighlightedWindow> {
        match self.phase {
            SelectionPhase::Hover | SelectionPhase::Armed { .. } => self.tester.current(),
            _ => None,
        }
    }

    pub fn hit_tester(&self) -> &WindowHitTester {
        &self.tester
    }

    pub fn set_smart_select(&mut self, enabled: bool) {
        if self.smart_select == enabled {
            return;
        }
        self.smart_select = enabled;
        if !enabled {
            self.tester.invalidate();
        }
        log::info!("[SELECT] Smart select {}", if enabled { "on" } else { "off" });
    }

    pub fn pointer_down(&mut self, p: Point) {
        if self.phase == SelectionPhase::Hover {
            self.phase = SelectionPhase::Armed { origin: p };
        }
    }

    /// Track the pointer. In Hover this may ask for a window hit-test.
    pub fn pointer_move(&mut self, p: Point, now: Instant) -> HitTestStep {
        match self.phase {
            SelectionPhase::Hover if self.smart_select => self.tester.begin(p, &self.monitor, now),
            SelectionPhase::Armed { origin } => {
                if origin.distance_to(p) > self.tuning.drag_threshold {
                    self.start_drag(origin, p);
                }
                HitTestStep::Unchanged
            }
            SelectionPhase::Dragging { origin, .. } => {
                let region = Region::from_corners(origin, p);
                self.phase = SelectionPhase::Dragging { origin, region };
                self.region = Some(region);
                HitTestStep::Unchanged
            }
            _ => HitTestStep::Unchanged,
        }
    }

    /// Apply a backend answer. Always frees the tester's request slot.
    pub fn complete_hit_test(
        &mut self,
        ticket: HitTestTicket,
        result: Result<Option<WindowInfo>, CaptureError>,
    ) -> HitTestOutcome {
        self.tester.complete(ticket, result, &self.monitor)
    }

    pub fn pointer_up(&mut self, p: Point) -> SelectionOutcome {
        match self.phase {
            SelectionPhase::Armed { origin } => {
                if origin.distance_to(p) > self.tuning.drag_threshold {
                    self.finish_drag(Region::from_corners(origin, p))
                } else {
                    self.resolve_click(p)
                }
            }
            SelectionPhase::Dragging { origin, .. } => {
                self.finish_drag(Region::from_corners(origin, p))
            }
            _ => SelectionOutcome::Ignored,
        }
    }

    /// Capture failed; go back to selecting.
    pub fn capture_failed(&mut self) {
        log::info!("[SELECT] Capture failed, back to hover");
        self.reset();
    }

    pub fn capture_succeeded(&mut self) {
        if self.phase == SelectionPhase::Capturing {
            self.phase = SelectionPhase::Captured;
        }
    }

    /// Drop any selection in progress.
    pub fn cancel(&mut self) {
        if self.phase != SelectionPhase::Captured {
            self.reset();
        }
    }

    pub fn view(&self) -> SelectionView {
        let region = match self.phase {
            SelectionPhase::Dragging { region, .. } => Some(region),
            _ => self.region,
        };
        SelectionView {
            phase: self.phase,
            region,
            highlight: self.highlighted().cloned(),
            dimensions: region.map(|r| format!("{} x {}", r.width.round(), r.height.round())),
            smart_select: self.smart_select,
        }
    }

    fn start_drag(&mut self, origin: Point, p: Point) {
        let region = Region::from_corners(origin, p);
        self.phase = SelectionPhase::Dragging { origin, region };
        self.region = Some(region);
        self.tester.invalidate();
    }

    fn finish_drag(&mut self, region: Region) -> SelectionOutcome {
        if region.exceeds(self.tuning.min_region_size) {
            log::info!("[SELECT] Region {:?}", region);
            self.phase = SelectionPhase::Capturing;
            self.region = Some(region);
            SelectionOutcome::Capture(CaptureRequest::Region { region })
        } else {
            log::debug!("[SELECT] Discarding {}x{} region", region.width, region.height);
            self.reset();
            SelectionOutcome::Discarded(DiscardReason::TooSmall)
        }
    }

    fn resolve_click(&mut self, p: Point) -> SelectionOutcome {
        let bounds = self.monitor.logical_bounds();
        if in_edge_zone(p, &bounds, self.tuning.edge_margin) {
            log::info!("[SELECT] Edge click, full screen");
            return self.request_full_screen(bounds);
        }

        let highlighted = if self.smart_select {
            self.tester.current().cloned()
        } else {
            None
        };
        match highlighted {
            Some(w) if w.is_full_screen() => self.request_full_screen(bounds),
            Some(w) => {
                log::info!("[SELECT] Window \"{}\" ({}) {:?}", w.title, w.app_name, w.region);
                self.phase = SelectionPhase::Capturing;
                self.region = Some(w.region);
                SelectionOutcome::Capture(CaptureRequest::Region { region: w.region })
            }
            None => {
                self.reset();
                SelectionOutcome::Discarded(DiscardReason::NoTarget)
            }
        }
    }

    fn request_full_screen(&mut self, bounds: Region) -> SelectionOutcome {
        self.phase = SelectionPhase::Capturing;
        self.region = Some(bounds);
        SelectionOutcome::Capture(CaptureRequest::FullScreen)
    }

    fn reset(&mut self) {
        self.phase = SelectionPhase::Hover;
        self.region = None;
        self.tester.invalidate();
    }
}
