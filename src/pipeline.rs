//! Multi-step selection orchestration.
//!
//! These functions drive the session through the backend:
//! - pointer_move: selection update → (maybe) window hit-test → view
//! - pointer_up:   finalize → region-finalized → settle → capture → editor
//!
//! The session lock is never held across an await. Each step re-enters the
//! slot and checks that the session it started with is still the active one.

use crate::capture::{capture_selection, CaptureRequest, Point, Region, ScreenBackend};
use crate::selection::{query_backend, DiscardReason, HitTestStep, SelectionOutcome, SelectionView};
use crate::session::{SessionError, SessionSlot};
use serde::Serialize;
use std::time::Instant;
use uuid::Uuid;

/// How a pointer release ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FinishOutcome {
    /// Captured; the editor is open on this screenshot.
    Captured { screenshot_id: Uuid, region: Region },
    /// The backend failed. `message` is meant for the user.
    CaptureFailed { message: String },
    Discarded { reason: DiscardReason },
    Ignored,
}

pub fn pointer_down(slot: &SessionSlot, x: f64, y: f64) -> Result<SelectionView, SessionError> {
    slot.with(|s| {
        s.selection_mut().pointer_down(Point::new(x, y));
        s.selection().view()
    })
}

/// Track the pointer and, in smart-select hover, refresh the highlighted
/// window. Returns the view after any hit-test has been applied.
pub async fn pointer_move<B: ScreenBackend>(
    slot: &SessionSlot,
    backend: &B,
    x: f64,
    y: f64,
) -> Result<SelectionView, SessionError> {
    let p = Point::new(x, y);
    let (step, id) = slot.with(|s| (s.selection_mut().pointer_move(p, Instant::now()), s.id()))?;

    if let HitTestStep::Dispatch(ticket) = step {
        let result = query_backend(backend, &ticket).await;
        match slot.with_session(id, |s| s.selection_mut().complete_hit_test(ticket, result)) {
            Ok(_) | Err(SessionError::Superseded) => {}
            Err(e) => return Err(e),
        }
    }

    slot.with(|s| s.selection().view())
}

/// Release the pointer. A finalized selection is announced through
/// `on_finalized` before the capture runs.
pub async fn pointer_up<B: ScreenBackend>(
    slot: &SessionSlot,
    backend: &B,
    x: f64,
    y: f64,
    on_finalized: impl FnOnce(&CaptureRequest),
) -> Result<FinishOutcome, SessionError> {
    let p = Point::new(x, y);
    let (outcome, monitor, settle, id) = slot.with(|s| {
        let outcome = s.selection_mut().pointer_up(p);
        if let SelectionOutcome::Capture(request) = &outcome {
            s.on_region_finalized(request);
        }
        (
            outcome,
            *s.monitor(),
            s.selection().tuning().paint_settle(),
            s.id(),
        )
    })?;

    let request = match outcome {
        SelectionOutcome::Capture(request) => request,
        SelectionOutcome::Discarded(reason) => return Ok(FinishOutcome::Discarded { reason }),
        SelectionOutcome::Ignored => return Ok(FinishOutcome::Ignored),
    };
    on_finalized(&request);

    match capture_selection(backend, &monitor, request, settle).await {
        Ok(screenshot) => {
            let (screenshot_id, region) = (screenshot.id, screenshot.region);
            slot.with_session(id, |s| s.open_editor(screenshot))?;
            Ok(FinishOutcome::Captured {
                screenshot_id,
                region,
            })
        }
        Err(e) => {
            log::error!("[CAPTURE] Capture failed: {}", e);
            match slot.with_session(id, |s| s.on_capture_failed()) {
                Ok(()) | Err(SessionError::Superseded) => {}
                Err(err) => return Err(err),
            }
            Ok(FinishOutcome::CaptureFailed {
                message: format!("Screenshot failed: {}", e),
            })
        }
    }
}

/// Escape on the overlay: drop the selection, keep the session.
pub fn cancel(slot: &SessionSlot) -> Result<SelectionView, SessionError> {
    slot.with(|s| {
        s.cancel_selection();
        s.selection().view()
    })
}

pub fn set_smart_select(slot: &SessionSlot, enabled: bool) -> Result<SelectionView, SessionError> {
    slot.with(|s| {
        s.selection_mut().set_smart_select(enabled);
        s.selection().view()
    })
}
