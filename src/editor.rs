//! Screenshot editor: one captured image, its annotations and the active tool.
//!
//! The editor owns its history, so annotations and undo states are dropped
//! together with the screenshot.

use crate::annotation::{
    Annotation, AnnotationHistoryStore, AnnotationToolStateMachine, EditKey, Shape, Style,
    StylePatch, Tool, ToolState,
};
use crate::capture::{Point, Region, Screenshot};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A key press as reported by the webview.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyInput {
    /// DOM `KeyboardEvent.key`, e.g. "a", "Enter", "Escape".
    pub key: String,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyInput {
    pub fn plain(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Default::default()
        }
    }

    pub fn ctrl(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ctrl: true,
            ..Default::default()
        }
    }

    fn has_modifier(&self) -> bool {
        self.ctrl || self.alt || self.meta
    }

    fn single_char(&self) -> Option<char> {
        let mut chars = self.key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }
}

/// What a key press did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "tool", rename_all = "camelCase")]
pub enum KeyAction {
    /// Taken by the text editor.
    Consumed,
    Undo,
    Redo,
    SelectTool(Tool),
    /// Escape outside text editing: the frontend should close the editor.
    Close,
    Ignored,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorView {
    pub screenshot_id: Uuid,
    pub region: Region,
    pub tool: Tool,
    pub style: Style,
    pub annotations: Vec<Annotation>,
    pub preview: Option<Shape>,
    pub tool_state: ToolState,
    pub can_undo: bool,
    pub can_redo: bool,
}

pub struct EditorSession {
    screenshot: Screenshot,
    history: AnnotationHistoryStore,
    tools: AnnotationToolStateMachine,
}

impl EditorSession {
    pub fn new(screenshot: Screenshot, style: Style) -> Self {
        log::info!(
            "[EDITOR] Opened {} ({}x{})",
            screenshot.id,
            screenshot.region.width,
            screenshot.region.height
        );
        Self {
            screenshot,
            history: AnnotationHistoryStore::new(),
            tools: AnnotationToolStateMachine::new(Tool::default(), style),
        }
    }

    pub fn screenshot(&self) -> &Screenshot {
        &self.screenshot
    }

    pub fn annotations(&self) -> &[Annotation] {
        self.history.annotations()
    }

    pub fn history(&self) -> &AnnotationHistoryStore {
        &self.history
    }

    pub fn tool(&self) -> Tool {
        self.tools.tool()
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tools.set_tool(tool, &mut self.history);
    }

    /// Applies to annotations drawn from now on.
    pub fn update_style(&mut self, patch: StylePatch) {
        self.tools.style_mut().apply(patch);
    }

    pub fn pointer_down(&mut self, p: Point) {
        self.tools.pointer_down(p, &mut self.history);
    }

    pub fn pointer_move(&mut self, p: Point) {
        self.tools.pointer_move(p);
    }

    pub fn pointer_up(&mut self, p: Point) -> Option<Annotation> {
        self.tools.pointer_up(p, &mut self.history)
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo()
    }

    pub fn remove(&mut self, id: Uuid) -> bool {
        self.history.remove(id)
    }

    /// Live edit (drag, resize). Not an undo step.
    pub fn update(&mut self, annotation: Annotation) -> bool {
        self.history.update(annotation)
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Route a key press. Text editing sees every key first.
    pub fn handle_key(&mut self, input: &KeyInput) -> KeyAction {
        if self.tools.is_editing_text() {
            let key = match input.key.as_str() {
                "Enter" => Some(EditKey::Enter),
                "Escape" => Some(EditKey::Escape),
                "Backspace" => Some(EditKey::Backspace),
                _ if !input.ctrl && !input.meta => input.single_char().map(EditKey::Char),
                _ => None,
            };
            if let Some(key) = key {
                self.tools.key(key, &mut self.history);
            }
            return KeyAction::Consumed;
        }

        if input.ctrl && !input.alt && !input.meta {
            return match input.key.to_ascii_lowercase().as_str() {
                "z" if self.undo() => KeyAction::Undo,
                "y" if self.redo() => KeyAction::Redo,
                _ => KeyAction::Ignored,
            };
        }
        if input.has_modifier() {
            return KeyAction::Ignored;
        }
        if input.key == "Escape" {
            return KeyAction::Close;
        }
        match input.single_char().and_then(Tool::from_shortcut) {
            Some(tool) => {
                self.set_tool(tool);
                KeyAction::SelectTool(tool)
            }
            None => KeyAction::Ignored,
        }
    }

    /// Annotations as the JSON array the canvas and sticky window consume.
    pub fn annotations_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self.history.annotations())
    }

    pub fn view(&self) -> EditorView {
        EditorView {
            screenshot_id: self.screenshot.id,
            region: self.screenshot.region,
            tool: self.tools.tool(),
            style: self.tools.style().clone(),
            annotations: self.history.annotations().to_vec(),
            preview: self.tools.preview(),
            tool_state: self.tools.state().clone(),
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        }
    }
}
