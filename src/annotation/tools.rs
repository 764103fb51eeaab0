//! Per-tool pointer and keyboard handling for the editor canvas.
//!
//! One tool is active at a time. Shape tools drag out a box, freehand tools
//! collect every sampled point, and the text tool opens an inline edit
//! buffer. Finished geometry is committed straight into the history store.

use super::history::AnnotationHistoryStore;
use super::types::{Annotation, Shape, Style, Tool, ToolKind};
use crate::capture::{Point, Region};
use serde::Serialize;

/// Keyboard input while the text tool is editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    Char(char),
    Backspace,
    Enter,
    Escape,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ToolState {
    Idle,
    Drawing { origin: Point, current: Point },
    Sketching { points: Vec<Point> },
    Editing { at: Point, buffer: String },
}

pub struct AnnotationToolStateMachine {
    tool: Tool,
    style: Style,
    state: ToolState,
}

impl AnnotationToolStateMachine {
    pub fn new(tool: Tool, style: Style) -> Self {
        Self {
            tool,
            style,
            state: ToolState::Idle,
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn style_mut(&mut self) -> &mut Style {
        &mut self.style
    }

    pub fn state(&self) -> &ToolState {
        &self.state
    }

    pub fn is_editing_text(&self) -> bool {
        matches!(self.state, ToolState::Editing { .. })
    }

    /// Switch tools. Pending text is committed first; an empty buffer or a
    /// half-drawn shape is dropped.
    pub fn set_tool(&mut self, tool: Tool, history: &mut AnnotationHistoryStore) {
        if tool == self.tool {
            return;
        }
        self.finish_text(history);
        self.state = ToolState::Idle;
        log::debug!("[EDITOR] Tool {:?} -> {:?}", self.tool, tool);
        self.tool = tool;
    }

    pub fn pointer_down(&mut self, p: Point, history: &mut AnnotationHistoryStore) {
        match self.tool.kind() {
            ToolKind::Inactive => {}
            ToolKind::Shape => {
                self.state = ToolState::Drawing { origin: p, current: p };
            }
            ToolKind::Freehand => {
                self.state = ToolState::Sketching { points: vec![p] };
            }
            ToolKind::Text => {
                self.finish_text(history);
                self.state = ToolState::Editing {
                    at: p,
                    buffer: String::new(),
                };
            }
        }
    }

    pub fn pointer_move(&mut self, p: Point) {
        match &mut self.state {
            ToolState::Drawing { current, .. } => *current = p,
            ToolState::Sketching { points } => points.push(p),
            _ => {}
        }
    }

    /// Finish a shape or stroke. Returns the committed annotation.
    pub fn pointer_up(&mut self, p: Point, history: &mut AnnotationHistoryStore) -> Option<Annotation> {
        let shape = match std::mem::replace(&mut self.state, ToolState::Idle) {
            ToolState::Drawing { origin, .. } => self.shape_from_drag(origin, p),
            ToolState::Sketching { mut points } => {
                if points.last() != Some(&p) {
                    points.push(p);
                }
                self.stroke(points)
            }
            editing @ ToolState::Editing { .. } => {
                self.state = editing;
                None
            }
            ToolState::Idle => None,
        }?;
        Some(self.commit(shape, history))
    }

    /// Feed a key to the text editor. Returns true when the key was consumed
    /// and must not reach any other shortcut handler.
    pub fn key(&mut self, key: EditKey, history: &mut AnnotationHistoryStore) -> bool {
        let ToolState::Editing { buffer, .. } = &mut self.state else {
            return false;
        };
        match key {
            EditKey::Char(c) => buffer.push(c),
            EditKey::Backspace => {
                buffer.pop();
            }
            EditKey::Enter => self.finish_text(history),
            EditKey::Escape => self.state = ToolState::Idle,
        }
        true
    }

    /// Geometry being drawn right now, for the live preview.
    pub fn preview(&self) -> Option<Shape> {
        match &self.state {
            ToolState::Drawing { origin, current } => self.shape_from_drag(*origin, *current),
            ToolState::Sketching { points } => self.stroke(points.clone()),
            _ => None,
        }
    }

    /// Commit pending text if there is any, and leave editing.
    fn finish_text(&mut self, history: &mut AnnotationHistoryStore) {
        if let ToolState::Editing { at, buffer } = std::mem::replace(&mut self.state, ToolState::Idle) {
            if !buffer.is_empty() {
                self.commit(
                    Shape::Text {
                        x: at.x,
                        y: at.y,
                        text: buffer,
                    },
                    history,
                );
            }
        }
    }

    fn shape_from_drag(&self, origin: Point, end: Point) -> Option<Shape> {
        if origin == end {
            return None;
        }
        let bounds = Region::from_corners(origin, end);
        match self.tool {
            Tool::Rectangle => Some(Shape::Rectangle(bounds)),
            Tool::Circle => Some(Shape::Circle(bounds)),
            Tool::Blur => Some(Shape::Blur(bounds)),
            Tool::Arrow => Some(Shape::Arrow {
                points: (origin, end),
            }),
            _ => None,
        }
    }

    fn stroke(&self, points: Vec<Point>) -> Option<Shape> {
        match self.tool {
            Tool::Pen => Some(Shape::Pen { points }),
            Tool::Highlighter => Some(Shape::Highlighter { points }),
            _ => None,
        }
    }

    fn commit(&self, shape: Shape, history: &mut AnnotationHistoryStore) -> Annotation {
        let annotation = Annotation::new(shape, self.style.clone());
        log::debug!("[EDITOR] Commit {:?} {}", annotation.tool(), annotation.id);
        history.add(annotation.clone());
        annotation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine(tool: Tool) -> (AnnotationToolStateMachine, AnnotationHistoryStore) {
        (
            AnnotationToolStateMachine::new(tool, Style::default()),
            AnnotationHistoryStore::new(),
        )
    }

    fn type_text(m: &mut AnnotationToolStateMachine, h: &mut AnnotationHistoryStore, s: &str) {
        for c in s.chars() {
            assert!(m.key(EditKey::Char(c), h));
        }
    }

    #[test]
    fn rectangle_drag_commits_normalized_box() {
        let (mut m, mut h) = machine(Tool::Rectangle);
        m.pointer_down(Point::new(100.0, 80.0), &mut h);
        m.pointer_move(Point::new(60.0, 40.0));
        let a = m.pointer_up(Point::new(40.0, 20.0), &mut h).unwrap();
        assert_eq!(a.shape, Shape::Rectangle(Region::new(40.0, 20.0, 60.0, 60.0)));
        assert_eq!(h.annotations().len(), 1);
        assert_eq!(*m.state(), ToolState::Idle);
    }

    #[test]
    fn arrow_keeps_direction() {
        let (mut m, mut h) = machine(Tool::Arrow);
        m.pointer_down(Point::new(100.0, 100.0), &mut h);
        let a = m.pointer_up(Point::new(10.0, 50.0), &mut h).unwrap();
        assert_eq!(
            a.shape,
            Shape::Arrow {
                points: (Point::new(100.0, 100.0), Point::new(10.0, 50.0))
            }
        );
    }

    #[test]
    fn click_without_drag_draws_nothing() {
        let (mut m, mut h) = machine(Tool::Circle);
        m.pointer_down(Point::new(5.0, 5.0), &mut h);
        assert!(m.pointer_up(Point::new(5.0, 5.0), &mut h).is_none());
        assert!(h.is_empty());
    }

    #[test]
    fn pen_keeps_every_sample() {
        let (mut m, mut h) = machine(Tool::Pen);
        m.pointer_down(Point::new(0.0, 0.0), &mut h);
        for i in 1..=10 {
            m.pointer_move(Point::new(i as f64, 0.5));
        }
        let a = m.pointer_up(Point::new(10.0, 0.5), &mut h).unwrap();
        match a.shape {
            Shape::Pen { points } => assert_eq!(points.len(), 11),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn highlighter_uses_same_interaction_as_pen() {
        let (mut m, mut h) = machine(Tool::Highlighter);
        m.pointer_down(Point::new(0.0, 0.0), &mut h);
        m.pointer_move(Point::new(3.0, 3.0));
        let a = m.pointer_up(Point::new(6.0, 6.0), &mut h).unwrap();
        assert_eq!(a.tool(), Tool::Highlighter);
        assert!(matches!(a.shape, Shape::Highlighter { ref points } if points.len() == 3));
    }

    #[test]
    fn enter_commits_text() {
        let (mut m, mut h) = machine(Tool::Text);
        m.pointer_down(Point::new(10.0, 20.0), &mut h);
        type_text(&mut m, &mut h, "hix");
        assert!(m.key(EditKey::Backspace, &mut h));
        assert!(m.key(EditKey::Enter, &mut h));
        assert_eq!(
            h.annotations()[0].shape,
            Shape::Text {
                x: 10.0,
                y: 20.0,
                text: "hi".into()
            }
        );
        assert!(!m.is_editing_text());
    }

    #[test]
    fn enter_on_empty_buffer_commits_nothing() {
        let (mut m, mut h) = machine(Tool::Text);
        m.pointer_down(Point::new(10.0, 20.0), &mut h);
        assert!(m.key(EditKey::Enter, &mut h));
        assert!(h.is_empty());
        assert!(!h.can_undo());
    }

    #[test]
    fn escape_discards_text() {
        let (mut m, mut h) = machine(Tool::Text);
        m.pointer_down(Point::new(10.0, 20.0), &mut h);
        type_text(&mut m, &mut h, "draft");
        assert!(m.key(EditKey::Escape, &mut h));
        assert!(h.is_empty());
        assert_eq!(*m.state(), ToolState::Idle);
    }

    #[test]
    fn switching_tool_commits_pending_text() {
        let (mut m, mut h) = machine(Tool::Text);
        m.pointer_down(Point::new(50.0, 50.0), &mut h);
        type_text(&mut m, &mut h, "abc");
        m.set_tool(Tool::Pen, &mut h);
        assert_eq!(m.tool(), Tool::Pen);
        assert_eq!(
            h.annotations()[0].shape,
            Shape::Text {
                x: 50.0,
                y: 50.0,
                text: "abc".into()
            }
        );
    }

    #[test]
    fn switching_tool_with_empty_buffer_commits_nothing() {
        let (mut m, mut h) = machine(Tool::Text);
        m.pointer_down(Point::new(50.0, 50.0), &mut h);
        m.set_tool(Tool::Pen, &mut h);
        assert!(h.is_empty());
        assert!(!h.can_undo());
    }

    #[test]
    fn second_text_click_commits_first() {
        let (mut m, mut h) = machine(Tool::Text);
        m.pointer_down(Point::new(1.0, 1.0), &mut h);
        type_text(&mut m, &mut h, "one");
        m.pointer_down(Point::new(2.0, 2.0), &mut h);
        type_text(&mut m, &mut h, "two");
        assert_eq!(h.annotations().len(), 1);
        assert!(matches!(m.state(), ToolState::Editing { at, buffer } if *at == Point::new(2.0, 2.0) && buffer == "two"));
    }

    #[test]
    fn keys_pass_through_when_not_editing() {
        let (mut m, mut h) = machine(Tool::Rectangle);
        assert!(!m.key(EditKey::Char('r'), &mut h));
    }

    #[test]
    fn text_release_keeps_editing() {
        let (mut m, mut h) = machine(Tool::Text);
        m.pointer_down(Point::new(1.0, 1.0), &mut h);
        assert!(m.pointer_up(Point::new(1.0, 1.0), &mut h).is_none());
        assert!(m.is_editing_text());
    }

    #[test]
    fn none_tool_ignores_pointer() {
        let (mut m, mut h) = machine(Tool::None);
        m.pointer_down(Point::new(1.0, 1.0), &mut h);
        assert!(m.pointer_up(Point::new(9.0, 9.0), &mut h).is_none());
        assert_eq!(*m.state(), ToolState::Idle);
    }

    #[test]
    fn preview_tracks_drag() {
        let (mut m, mut h) = machine(Tool::Blur);
        m.pointer_down(Point::new(0.0, 0.0), &mut h);
        m.pointer_move(Point::new(20.0, 10.0));
        assert_eq!(m.preview(), Some(Shape::Blur(Region::new(0.0, 0.0, 20.0, 10.0))));
    }
}
