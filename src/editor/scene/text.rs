use crate::editor::geometry::FontSpec;
use crate::geometry::{CanvasPoint, Color};

pub const DEFAULT_TEXT_CONTENT: &str = "New Text";
pub const DEFAULT_TEXT_SIZE: f64 = 40.0;
pub const DEFAULT_FONT_FAMILY: &str = "Arial";

pub const FONT_FAMILIES: [&str; 13] = [
    "Arial",
    "Verdana",
    "Helvetica",
    "Times New Roman",
    "Courier New",
    "Georgia",
    "Palatino",
    "Garamond",
    "Comic Sans MS",
    "Impact",
    "Lucida Sans Unicode",
    "Tahoma",
    "Trebuchet MS",
];

/// Text anchored at the baseline of its first line.
#[derive(Debug, Clone, PartialEq)]
pub struct TextObject {
    pub content: String,
    pub x: f64,
    pub y: f64,
    pub family: String,
    pub size: f64,
    pub color: Color,
    pub bold: bool,
    pub italic: bool,
    pub max_width: Option<f64>,
}

impl TextObject {
    pub fn font(&self) -> FontSpec<'_> {
        FontSpec {
            family: &self.family,
            size: self.size,
            bold: self.bold,
            italic: self.italic,
        }
    }

    pub fn anchor(&self) -> CanvasPoint {
        CanvasPoint::new(self.x, self.y)
    }

    pub fn line_count(&self) -> usize {
        self.content.split('\n').count()
    }

    pub fn with_content(self, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..self
        }
    }

    pub fn with_position(self, at: CanvasPoint) -> Self {
        Self {
            x: at.x,
            y: at.y,
            ..self
        }
    }

    pub fn with_size(self, size: f64) -> Self {
        Self {
            size: size.max(1.0),
            ..self
        }
    }

    pub fn with_color(self, color: Color) -> Self {
        Self { color, ..self }
    }

    pub fn with_family(self, family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            ..self
        }
    }

    pub fn with_style(self, bold: bool, italic: bool) -> Self {
        Self {
            bold,
            italic,
            ..self
        }
    }

    pub fn with_max_width(self, max_width: Option<f64>) -> Self {
        Self {
            max_width: max_width.filter(|width| *width > 0.0),
            ..self
        }
    }
}

pub fn create_text(at: CanvasPoint, family: impl Into<String>) -> TextObject {
    TextObject {
        content: DEFAULT_TEXT_CONTENT.to_string(),
        x: at.x,
        y: at.y,
        family: family.into(),
        size: DEFAULT_TEXT_SIZE,
        color: Color::BLACK,
        bold: false,
        italic: false,
        max_width: None,
    }
}
