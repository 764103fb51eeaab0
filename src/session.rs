//! One capture session per hotkey press.
//!
//! A session owns the monitor it was started on, the selection engine and,
//! once a capture succeeds, the editor. Starting a new session replaces the
//! old one wholesale; async work that finishes after that point finds a
//! different session id and is dropped.

use crate::annotation::Style;
use crate::capture::{CaptureRequest, MonitorOffset, Screenshot};
use crate::editor::EditorSession;
use crate::selection::{RegionSelectionEngine, SelectionTuning, SelectionView};
use crate::settings::Settings;
use serde::Serialize;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("No capture session is active")]
    NoSession,
    #[error("Capture session was replaced")]
    Superseded,
    #[error("No screenshot is open in the editor")]
    NoEditor,
    #[error("Session state lock poisoned")]
    Poisoned,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: Uuid,
    pub monitor: MonitorOffset,
    pub selection: SelectionView,
    pub toolbar_visible: bool,
    pub editing: bool,
}

pub struct CaptureSession {
    id: Uuid,
    monitor: MonitorOffset,
    selection: RegionSelectionEngine,
    toolbar_visible: bool,
    editor: Option<EditorSession>,
    default_style: Style,
}

impl CaptureSession {
    pub fn new(monitor: MonitorOffset, tuning: SelectionTuning, smart_select: bool, default_style: Style) -> Self {
        Self {
            id: Uuid::new_v4(),
            monitor,
            selection: RegionSelectionEngine::new(monitor, tuning, smart_select),
            toolbar_visible: false,
            editor: None,
            default_style,
        }
    }

    pub fn from_settings(monitor: MonitorOffset, settings: &Settings) -> Self {
        Self::new(
            monitor,
            settings.tuning,
            settings.smart_select,
            settings.default_style.clone(),
        )
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn monitor(&self) -> &MonitorOffset {
        &self.monitor
    }

    pub fn selection(&self) -> &RegionSelectionEngine {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut RegionSelectionEngine {
        &mut self.selection
    }

    pub fn toolbar_visible(&self) -> bool {
        self.toolbar_visible
    }

    pub fn editor(&self) -> Option<&EditorSession> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Result<&mut EditorSession, SessionError> {
        self.editor.as_mut().ok_or(SessionError::NoEditor)
    }

    /// Toolbar side of the region-finalized event.
    pub fn on_region_finalized(&mut self, request: &CaptureRequest) {
        log::debug!("[SELECT] Region finalized: {:?}", request);
        self.toolbar_visible = true;
    }

    pub fn on_capture_failed(&mut self) {
        self.toolbar_visible = false;
        self.selection.capture_failed();
    }

    pub fn open_editor(&mut self, screenshot: Screenshot) {
        self.selection.capture_succeeded();
        self.editor = Some(EditorSession::new(screenshot, self.default_style.clone()));
    }

    /// Escape on the overlay.
    pub fn cancel_selection(&mut self) {
        self.selection.cancel();
        self.toolbar_visible = false;
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            id: self.id,
            monitor: self.monitor,
            selection: self.selection.view(),
            toolbar_visible: self.toolbar_visible,
            editing: self.editor.is_some(),
        }
    }
}

/// Holds the single active session. Managed as application state.
#[derive(Default)]
pub struct SessionSlot {
    current: Mutex<Option<CaptureSession>>,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `session`, dropping whatever was active.
    pub fn replace(&self, session: CaptureSession) -> Result<Uuid, SessionError> {
        let id = session.id();
        let mut guard = self.current.lock().map_err(|_| SessionError::Poisoned)?;
        if let Some(old) = guard.replace(session) {
            log::info!("[SESSION] Replacing session {}", old.id());
        }
        log::info!("[SESSION] Started {}", id);
        Ok(id)
    }

    pub fn close(&self) -> Result<Option<CaptureSession>, SessionError> {
        let mut guard = self.current.lock().map_err(|_| SessionError::Poisoned)?;
        Ok(guard.take())
    }

    pub fn is_active(&self) -> bool {
        self.current
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Run `f` against the active session.
    pub fn with<R>(&self, f: impl FnOnce(&mut CaptureSession) -> R) -> Result<R, SessionError> {
        let mut guard = self.current.lock().map_err(|_| SessionError::Poisoned)?;
        let session = guard.as_mut().ok_or(SessionError::NoSession)?;
        Ok(f(session))
    }

    /// Like [`with`](Self::with), but only if session `id` is still the
    /// active one.
    pub fn with_session<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut CaptureSession) -> R,
    ) -> Result<R, SessionError> {
        let mut guard = self.current.lock().map_err(|_| SessionError::Poisoned)?;
        match guard.as_mut() {
            Some(session) if session.id() == id => Ok(f(session)),
            Some(_) => Err(SessionError::Superseded),
            None => Err(SessionError::NoSession),
        }
    }

    pub fn with_editor<R>(&self, f: impl FnOnce(&mut EditorSession) -> R) -> Result<R, SessionError> {
        self.with(|s| s.editor_mut().map(f))?
    }
}
