//! Smart select: which window is under the pointer.
//!
//! Pointer moves arrive far faster than the OS can answer a window query, so
//! the tester keeps a single request slot. A request is dispatched only when
//! the slot is free and the pointer has moved or waited enough since the last
//! one. Every dispatch, and every edge-zone hit, bumps a generation counter;
//! a response carrying an older generation is dropped on arrival.
//!
//! The tester itself never awaits. `begin` decides and hands out a ticket,
//! the caller runs [`query_backend`] with it outside any lock, and `complete`
//! applies the response.

use super::SelectionTuning;
use crate::capture::{
    from_screen_absolute, point_to_screen_absolute, CaptureError, InputPassthrough,
    MonitorOffset, PhysicalPoint, Point, Region, ScreenBackend, WindowInfo,
};
use serde::Serialize;
use std::time::Instant;

/// Id of the synthetic window that stands for the whole screen.
pub const FULL_SCREEN_WINDOW_ID: i64 = -999;

/// A smart-select candidate in logical pixels, ready for the overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightedWindow {
    pub id: i64,
    pub title: String,
    pub app_name: String,
    pub region: Region,
    pub z_order: i32,
}

impl HighlightedWindow {
    pub fn full_screen(bounds: Region) -> Self {
        Self {
            id: FULL_SCREEN_WINDOW_ID,
            title: "Full Screen".to_string(),
            app_name: String::new(),
            region: bounds,
            z_order: -1,
        }
    }

    /// Convert an OS window into overlay space, clipped to the monitor.
    pub fn from_window(info: &WindowInfo, monitor: &MonitorOffset) -> Self {
        let region = from_screen_absolute(info.bounds(), monitor);
        let region = region
            .intersection(&monitor.logical_bounds())
            .unwrap_or(region);
        Self {
            id: info.id,
            title: info.title.clone(),
            app_name: info.app_name.clone(),
            region,
            z_order: info.z_order,
        }
    }

    pub fn is_full_screen(&self) -> bool {
        self.id == FULL_SCREEN_WINDOW_ID
    }
}

/// True when `p` lies within `margin` of any edge of `bounds`.
pub fn in_edge_zone(p: Point, bounds: &Region, margin: f64) -> bool {
    p.x - bounds.x < margin
        || p.y - bounds.y < margin
        || bounds.x + bounds.width - p.x < margin
        || bounds.y + bounds.height - p.y < margin
}

/// A dispatched backend query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitTestTicket {
    pub generation: u64,
    /// Absolute physical point to query.
    pub at: PhysicalPoint,
}

/// What the caller should do after a pointer move.
#[derive(Debug, Clone, PartialEq)]
pub enum HitTestStep {
    /// Answered locally (edge zone). No backend call.
    Resolved(Option<HighlightedWindow>),
    /// Throttled or a request is already in flight; keep the current answer.
    Unchanged,
    /// Run [`query_backend`] with this ticket, then call `complete`.
    Dispatch(HitTestTicket),
}

#[derive(Debug, Clone, PartialEq)]
pub enum HitTestOutcome {
    Applied(Option<HighlightedWindow>),
    /// A newer request or an edge hit superseded this response.
    Stale,
}

pub struct WindowHitTester {
    tuning: SelectionTuning,
    generation: u64,
    in_flight: bool,
    last_check: Option<(Instant, Point)>,
    current: Option<HighlightedWindow>,
}

impl WindowHitTester {
    pub fn new(tuning: SelectionTuning) -> Self {
        Self {
            tuning,
            generation: 0,
            in_flight: false,
            last_check: None,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&HighlightedWindow> {
        self.current.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Decide what a pointer move at `point` should do.
    pub fn begin(&mut self, point: Point, monitor: &MonitorOffset, now: Instant) -> HitTestStep {
        let bounds = monitor.logical_bounds();
        if in_edge_zone(point, &bounds, self.tuning.edge_margin) {
            // Also orphans any in-flight request.
            self.generation += 1;
            self.last_check = None;
            self.current = Some(HighlightedWindow::full_screen(bounds));
            return HitTestStep::Resolved(self.current.clone());
        }

        if let Some((at, from)) = self.last_check {
            let recent = now.saturating_duration_since(at) < self.tuning.hit_test_interval();
            let near = from.distance_to(point) < self.tuning.hit_test_min_move;
            if recent && near {
                return HitTestStep::Unchanged;
            }
        }

        if self.in_flight {
            return HitTestStep::Unchanged;
        }

        self.generation += 1;
        self.in_flight = true;
        self.last_check = Some((now, point));
        HitTestStep::Dispatch(HitTestTicket {
            generation: self.generation,
            at: point_to_screen_absolute(point, monitor),
        })
    }

    /// Apply the backend's answer to `ticket`.
    ///
    /// Errors are logged and read as "no window"; they never reach the caller.
    pub fn complete(
        &mut self,
        ticket: HitTestTicket,
        result: Result<Option<WindowInfo>, CaptureError>,
        monitor: &MonitorOffset,
    ) -> HitTestOutcome {
        self.in_flight = false;

        if ticket.generation != self.generation {
            log::debug!(
                "[HITTEST] Dropping stale response (gen {} < {})",
                ticket.generation,
                self.generation
            );
            return HitTestOutcome::Stale;
        }

        self.current = match result {
            Ok(Some(info)) => Some(HighlightedWindow::from_window(&info, monitor)),
            Ok(None) => None,
            Err(e) => {
                log::warn!("[HITTEST] Window query failed: {}", e);
                None
            }
        };
        HitTestOutcome::Applied(self.current.clone())
    }

    /// Forget the current answer and orphan any in-flight request.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.last_check = None;
        self.current = None;
    }
}

/// Ask the backend which window sits under `ticket.at`.
///
/// The overlay is input-transparent for the duration of the query so the OS
/// reports the window beneath it, and is restored however the query ends.
pub async fn query_backend<B: ScreenBackend>(
    backend: &B,
    ticket: &HitTestTicket,
) -> Result<Option<WindowInfo>, CaptureError> {
    let _passthrough = InputPassthrough::engage(backend);
    backend.point_query_window(ticket.at).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::PhysicalRect;
    use std::sync::Mutex;
    use std::time::Duration;

    fn monitor() -> MonitorOffset {
        MonitorOffset {
            x: 0,
            y: 0,
            width: 1920,
            height: 1080,
            scale_factor: 1.0,
        }
    }

    fn window(id: i64, x: i32, y: i32, w: u32, h: u32) -> WindowInfo {
        WindowInfo {
            id,
            title: format!("window {}", id),
            app_name: "app".to_string(),
            x,
            y,
            width: w,
            height: h,
            z_order: 0,
        }
    }

    fn dispatch(tester: &mut WindowHitTester, p: Point, now: Instant) -> HitTestTicket {
        match tester.begin(p, &monitor(), now) {
            HitTestStep::Dispatch(t) => t,
            other => panic!("expected dispatch, got {:?}", other),
        }
    }

    #[test]
    fn edge_zone_resolves_to_full_screen_without_dispatch() {
        let mut tester = WindowHitTester::new(SelectionTuning::default());
        let step = tester.begin(Point::new(10.0, 500.0), &monitor(), Instant::now());
        match step {
            HitTestStep::Resolved(Some(w)) => {
                assert!(w.is_full_screen());
                assert_eq!(w.region, Region::new(0.0, 0.0, 1920.0, 1080.0));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(!tester.is_in_flight());
    }

    #[test]
    fn every_edge_counts() {
        let b = Region::new(0.0, 0.0, 1920.0, 1080.0);
        assert!(in_edge_zone(Point::new(500.0, 5.0), &b, 20.0));
        assert!(in_edge_zone(Point::new(1905.0, 500.0), &b, 20.0));
        assert!(in_edge_zone(Point::new(500.0, 1070.0), &b, 20.0));
        assert!(!in_edge_zone(Point::new(20.0, 20.0), &b, 20.0));
        assert!(!in_edge_zone(Point::new(960.0, 540.0), &b, 20.0));
    }

    #[test]
    fn dispatch_uses_absolute_physical_point() {
        let m = MonitorOffset {
            x: 1920,
            y: 0,
            width: 3840,
            height: 2160,
            scale_factor: 2.0,
        };
        let mut tester = WindowHitTester::new(SelectionTuning::default());
        match tester.begin(Point::new(100.0, 50.0), &m, Instant::now()) {
            HitTestStep::Dispatch(t) => assert_eq!(t.at, PhysicalPoint { x: 2120, y: 100 }),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn throttles_small_quick_moves() {
        let mut tester = WindowHitTester::new(SelectionTuning::default());
        let t0 = Instant::now();
        let ticket = dispatch(&mut tester, Point::new(500.0, 500.0), t0);
        tester.complete(ticket, Ok(None), &monitor());

        let step = tester.begin(Point::new(510.0, 505.0), &monitor(), t0 + Duration::from_millis(100));
        assert_eq!(step, HitTestStep::Unchanged);
    }

    #[test]
    fn large_move_or_elapsed_time_passes_throttle() {
        let mut tester = WindowHitTester::new(SelectionTuning::default());
        let t0 = Instant::now();
        let ticket = dispatch(&mut tester, Point::new(500.0, 500.0), t0);
        tester.complete(ticket, Ok(None), &monitor());

        let ticket = dispatch(&mut tester, Point::new(540.0, 500.0), t0 + Duration::from_millis(10));
        tester.complete(ticket, Ok(None), &monitor());

        dispatch(&mut tester, Point::new(541.0, 500.0), t0 + Duration::from_millis(400));
    }

    #[test]
    fn in_flight_request_blocks_new_dispatch() {
        let mut tester = WindowHitTester::new(SelectionTuning::default());
        let t0 = Instant::now();
        dispatch(&mut tester, Point::new(500.0, 500.0), t0);
        let step = tester.begin(Point::new(900.0, 700.0), &monitor(), t0 + Duration::from_secs(1));
        assert_eq!(step, HitTestStep::Unchanged);
        assert!(tester.is_in_flight());
    }

    #[test]
    fn applies_response_in_logical_units() {
        let m = MonitorOffset {
            x: 1920,
            y: 0,
            width: 3840,
            height: 2160,
            scale_factor: 2.0,
        };
        let mut tester = WindowHitTester::new(SelectionTuning::default());
        let ticket = match tester.begin(Point::new(300.0, 300.0), &m, Instant::now()) {
            HitTestStep::Dispatch(t) => t,
            other => panic!("unexpected {:?}", other),
        };
        let outcome = tester.complete(ticket, Ok(Some(window(7, 2120, 200, 800, 600))), &m);
        match outcome {
            HitTestOutcome::Applied(Some(w)) => {
                assert_eq!(w.id, 7);
                assert_eq!(w.region, Region::new(100.0, 100.0, 400.0, 300.0));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn window_is_clipped_to_monitor() {
        let info = window(3, -100, 500, 600, 1000);
        let w = HighlightedWindow::from_window(&info, &monitor());
        assert_eq!(w.region, Region::new(0.0, 500.0, 500.0, 580.0));
    }

    #[test]
    fn stale_response_does_not_overwrite_edge_result() {
        let mut tester = WindowHitTester::new(SelectionTuning::default());
        let t0 = Instant::now();
        let ticket = dispatch(&mut tester, Point::new(500.0, 500.0), t0);
        assert_eq!(ticket.generation, 1);

        let step = tester.begin(Point::new(5.0, 500.0), &monitor(), t0 + Duration::from_millis(5));
        assert!(matches!(step, HitTestStep::Resolved(Some(ref w)) if w.is_full_screen()));
        assert_eq!(tester.generation(), 2);

        let outcome = tester.complete(ticket, Ok(Some(window(1, 400, 400, 300, 300))), &monitor());
        assert_eq!(outcome, HitTestOutcome::Stale);
        assert!(tester.current().map(|w| w.is_full_screen()).unwrap_or(false));
        assert!(!tester.is_in_flight());
    }

    #[test]
    fn backend_error_reads_as_no_window() {
        let mut tester = WindowHitTester::new(SelectionTuning::default());
        let t0 = Instant::now();
        let ticket = dispatch(&mut tester, Point::new(500.0, 500.0), t0);
        tester.complete(ticket, Ok(Some(window(1, 400, 400, 300, 300))), &monitor());

        let ticket = dispatch(&mut tester, Point::new(900.0, 500.0), t0 + Duration::from_secs(1));
        let outcome = tester.complete(
            ticket,
            Err(CaptureError::WindowQuery("boom".into())),
            &monitor(),
        );
        assert_eq!(outcome, HitTestOutcome::Applied(None));
        assert!(tester.current().is_none());
    }

    #[test]
    fn invalidate_clears_and_orphans() {
        let mut tester = WindowHitTester::new(SelectionTuning::default());
        let ticket = dispatch(&mut tester, Point::new(500.0, 500.0), Instant::now());
        tester.invalidate();
        let outcome = tester.complete(ticket, Ok(Some(window(1, 0, 0, 10, 10))), &monitor());
        assert_eq!(outcome, HitTestOutcome::Stale);
        assert!(tester.current().is_none());
    }

    /// Records every passthrough toggle; the query itself always fails.
    struct FailingBackend {
        toggles: Mutex<Vec<bool>>,
    }

    impl ScreenBackend for FailingBackend {
        fn set_overlay_input_transparent(&self, transparent: bool) -> Result<(), CaptureError> {
            self.toggles.lock().unwrap().push(transparent);
            Ok(())
        }

        async fn point_query_window(
            &self,
            _at: PhysicalPoint,
        ) -> Result<Option<WindowInfo>, CaptureError> {
            Err(CaptureError::WindowQuery("denied".into()))
        }

        async fn capture_region(&self, _rect: PhysicalRect) -> Result<Vec<u8>, CaptureError> {
            Ok(Vec::new())
        }

        async fn capture_full_screen(&self, _m: MonitorOffset) -> Result<Vec<u8>, CaptureError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn query_restores_input_even_on_error() {
        let backend = FailingBackend {
            toggles: Mutex::new(Vec::new()),
        };
        let ticket = HitTestTicket {
            generation: 1,
            at: PhysicalPoint { x: 1, y: 1 },
        };
        let result = query_backend(&backend, &ticket).await;
        assert!(result.is_err());
        assert_eq!(*backend.toggles.lock().unwrap(), vec![true, false]);
    }
}
