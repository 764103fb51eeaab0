//! Annotation domain — public API.
//!
//!   - types.rs   — Annotation sum type, Style, Tool
//!   - history.rs — linear undo/redo over annotation snapshots
//!   - tools.rs   — active-tool pointer/keyboard state machine

pub mod history;
pub mod tools;
pub mod types;

pub use history::AnnotationHistoryStore;
pub use tools::{AnnotationToolStateMachine, EditKey, ToolState};
pub use types::{Annotation, Ellipse, Shape, Style, StylePatch, Tool, ToolKind};
