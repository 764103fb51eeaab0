//! Annotation data model.
//!
//! An annotation is a style plus one tool-specific geometry. On the wire it
//! is a flat object tagged by `tool`, which is what the editor canvas and
//! the sticky window render from:
//!
//! ```json
//! {"id":"…","tool":"text","style":{"color":"#ff0000","strokeWidth":2,"opacity":1},"x":50,"y":50,"text":"abc"}
//! ```
//!
//! Line geometry (pen, highlighter, arrow) is a flat `[x1, y1, x2, y2, …]`
//! array.

use crate::capture::{Point, Region};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Editor tool selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    None,
    #[default]
    Rectangle,
    Circle,
    Arrow,
    Pen,
    Highlighter,
    Text,
    Blur,
}

/// How a tool turns pointer input into geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Inactive,
    /// Drag out a box (or a line, for arrows).
    Shape,
    /// Collect every sampled point.
    Freehand,
    Text,
}

impl Tool {
    pub fn kind(self) -> ToolKind {
        match self {
            Tool::None => ToolKind::Inactive,
            Tool::Rectangle | Tool::Circle | Tool::Arrow | Tool::Blur => ToolKind::Shape,
            Tool::Pen | Tool::Highlighter => ToolKind::Freehand,
            Tool::Text => ToolKind::Text,
        }
    }

    /// Single-key editor shortcut.
    pub fn from_shortcut(key: char) -> Option<Tool> {
        match key.to_ascii_lowercase() {
            'p' => Some(Tool::Pen),
            'h' => Some(Tool::Highlighter),
            'r' => Some(Tool::Rectangle),
            'c' => Some(Tool::Circle),
            'a' => Some(Tool::Arrow),
            't' => Some(Tool::Text),
            'b' => Some(Tool::Blur),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    pub color: String,
    pub stroke_width: f64,
    #[serde(default = "full_opacity")]
    pub opacity: f64,
}

fn full_opacity() -> f64 {
    1.0
}

impl Default for Style {
    fn default() -> Self {
        Self {
            color: "#ff0000".to_string(),
            stroke_width: 2.0,
            opacity: 1.0,
        }
    }
}

/// Partial style change from the toolbar; unset fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StylePatch {
    pub color: Option<String>,
    pub stroke_width: Option<f64>,
    pub opacity: Option<f64>,
}

impl Style {
    pub fn apply(&mut self, patch: StylePatch) {
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(w) = patch.stroke_width {
            self.stroke_width = w.max(0.0);
        }
        if let Some(o) = patch.opacity {
            self.opacity = o.clamp(0.0, 1.0);
        }
    }
}

/// Ellipse inscribed in a circle annotation's bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    pub center: Point,
    pub radius_x: f64,
    pub radius_y: f64,
}

impl Ellipse {
    pub fn inscribed(bounds: &Region) -> Self {
        Self {
            center: Point::new(bounds.x + bounds.width / 2.0, bounds.y + bounds.height / 2.0),
            radius_x: bounds.width.abs() / 2.0,
            radius_y: bounds.height.abs() / 2.0,
        }
    }
}

/// Tool-specific geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "lowercase")]
pub enum Shape {
    Rectangle(Region),
    /// Stored as its bounding box, drawn as the inscribed ellipse.
    Circle(Region),
    Blur(Region),
    Arrow {
        #[serde(with = "flat_points::pair")]
        points: (Point, Point),
    },
    Pen {
        #[serde(with = "flat_points")]
        points: Vec<Point>,
    },
    Highlighter {
        #[serde(with = "flat_points")]
        points: Vec<Point>,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
    },
}

impl Shape {
    pub fn tool(&self) -> Tool {
        match self {
            Shape::Rectangle(_) => Tool::Rectangle,
            Shape::Circle(_) => Tool::Circle,
            Shape::Blur(_) => Tool::Blur,
            Shape::Arrow { .. } => Tool::Arrow,
            Shape::Pen { .. } => Tool::Pen,
            Shape::Highlighter { .. } => Tool::Highlighter,
            Shape::Text { .. } => Tool::Text,
        }
    }

    pub fn ellipse(&self) -> Option<Ellipse> {
        match self {
            Shape::Circle(bounds) => Some(Ellipse::inscribed(bounds)),
            _ => None,
        }
    }

    /// Move by (dx, dy) without changing size.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        let shift = |p: &mut Point| {
            p.x += dx;
            p.y += dy;
        };
        match self {
            Shape::Rectangle(r) | Shape::Circle(r) | Shape::Blur(r) => {
                r.x += dx;
                r.y += dy;
            }
            Shape::Arrow { points: (a, b) } => {
                shift(a);
                shift(b);
            }
            Shape::Pen { points } | Shape::Highlighter { points } => points.iter_mut().for_each(shift),
            Shape::Text { x, y, .. } => {
                *x += dx;
                *y += dy;
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: Uuid,
    pub style: Style,
    #[serde(flatten)]
    pub shape: Shape,
}

impl Annotation {
    pub fn new(shape: Shape, style: Style) -> Self {
        Self {
            id: Uuid::new_v4(),
            style,
            shape,
        }
    }

    pub fn tool(&self) -> Tool {
        self.shape.tool()
    }

    /// Style the annotation is drawn with. Highlighter strokes are wider and
    /// translucent regardless of the picked style.
    pub fn render_style(&self) -> Style {
        match self.shape {
            Shape::Highlighter { .. } => Style {
                color: self.style.color.clone(),
                stroke_width: self.style.stroke_width * 3.0,
                opacity: 0.3,
            },
            _ => self.style.clone(),
        }
    }
}

/// Serde adapter: `Vec<Point>` as a flat `[x1, y1, x2, y2, …]` array.
mod flat_points {
    use crate::capture::Point;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(points: &[Point], s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(points.iter().flat_map(|p| [p.x, p.y]))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Point>, D::Error> {
        let flat = Vec::<f64>::deserialize(d)?;
        if flat.len() % 2 != 0 {
            return Err(D::Error::custom("odd number of coordinates"));
        }
        Ok(flat.chunks_exact(2).map(|c| Point::new(c[0], c[1])).collect())
    }

    pub mod pair {
        use super::*;

        pub fn serialize<S: Serializer>(points: &(Point, Point), s: S) -> Result<S::Ok, S::Error> {
            super::serialize(&[points.0, points.1], s)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<(Point, Point), D::Error> {
            match super::deserialize(d)?.as_slice() {
                [a, b] => Ok((*a, *b)),
                other => Err(D::Error::custom(format!(
                    "arrow needs 2 points, got {}",
                    other.len()
                ))),
            }
        }
    }
}
