use crate::geometry::{Bounds, CanvasPoint, ClipShape};

use super::scene::TextObject;

pub const LINE_HEIGHT_RATIO: f64 = 1.2;
pub const HANDLE_SIZE: f64 = 8.0;
pub const ROUNDED_CORNER_RADIUS: f64 = 20.0;
pub const IMAGE_MIN_SIZE: f64 = 20.0;
pub const TEXT_MIN_FONT_SIZE: f64 = 10.0;
pub const TEXT_RESIZE_DIVISOR: f64 = 5.0;
pub const DELETE_ICON_RADIUS: f64 = 12.0;
const FALLBACK_ADVANCE_RATIO: f64 = 0.62;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec<'a> {
    pub family: &'a str,
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
}

impl FontSpec<'_> {
    pub fn line_height(&self) -> f64 {
        self.size * LINE_HEIGHT_RATIO
    }
}

/// Measures the horizontal advance of a single line of text.
pub trait TextMeasurer {
    fn line_width(&self, font: &FontSpec<'_>, line: &str) -> f64;
}

/// Cairo toy-font measurement on a scratch surface.
pub struct CairoTextMeasurer {
    context: Option<gtk4::cairo::Context>,
}

impl CairoTextMeasurer {
    pub fn new() -> Self {
        let context = gtk4::cairo::ImageSurface::create(gtk4::cairo::Format::ARgb32, 1, 1)
            .ok()
            .and_then(|surface| gtk4::cairo::Context::new(&surface).ok());
        if context.is_none() {
            tracing::warn!("cairo measurement context unavailable; estimating text widths");
        }
        Self { context }
    }
}

impl Default for CairoTextMeasurer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextMeasurer for CairoTextMeasurer {
    fn line_width(&self, font: &FontSpec<'_>, line: &str) -> f64 {
        if line.is_empty() {
            return 0.0;
        }
        let Some(context) = self.context.as_ref() else {
            return EstimatedTextMeasurer::default().line_width(font, line);
        };
        select_cairo_font(context, font);
        context
            .text_extents(line)
            .map(|extents| extents.x_advance())
            .unwrap_or_else(|_| EstimatedTextMeasurer::default().line_width(font, line))
    }
}

pub fn select_cairo_font(context: &gtk4::cairo::Context, font: &FontSpec<'_>) {
    let weight = if font.bold {
        gtk4::cairo::FontWeight::Bold
    } else {
        gtk4::cairo::FontWeight::Normal
    };
    let slant = if font.italic {
        gtk4::cairo::FontSlant::Italic
    } else {
        gtk4::cairo::FontSlant::Normal
    };
    context.select_font_face(font.family, slant, weight);
    context.set_font_size(font.size.max(1.0));
}

/// Fixed advance per character, proportional to the font size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatedTextMeasurer {
    pub advance_ratio: f64,
}

impl Default for EstimatedTextMeasurer {
    fn default() -> Self {
        Self {
            advance_ratio: FALLBACK_ADVANCE_RATIO,
        }
    }
}

impl TextMeasurer for EstimatedTextMeasurer {
    fn line_width(&self, font: &FontSpec<'_>, line: &str) -> f64 {
        line.chars().count() as f64 * (font.size * self.advance_ratio).max(1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub line_count: usize,
}

/// Splits content on explicit breaks, then word-wraps each line when `max_width` is set.
pub fn layout_text_lines(
    content: &str,
    font: &FontSpec<'_>,
    max_width: Option<f64>,
    measurer: &dyn TextMeasurer,
) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in content.split('\n') {
        match max_width {
            Some(limit) if limit > 0.0 => {
                wrap_paragraph(paragraph, font, limit, measurer, &mut lines)
            }
            _ => lines.push(paragraph.to_string()),
        }
    }
    lines
}

fn wrap_paragraph(
    paragraph: &str,
    font: &FontSpec<'_>,
    limit: f64,
    measurer: &dyn TextMeasurer,
    lines: &mut Vec<String>,
) {
    let mut current = String::new();
    for word in paragraph.split(' ') {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if measurer.line_width(font, &candidate) > limit {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }
    lines.push(current);
}

fn metrics_for_lines(
    lines: &[String],
    font: &FontSpec<'_>,
    measurer: &dyn TextMeasurer,
) -> TextMetrics {
    let width = lines
        .iter()
        .map(|line| measurer.line_width(font, line).max(0.0))
        .fold(0.0, f64::max);
    let line_count = lines.len().max(1);
    TextMetrics {
        width,
        height: font.line_height() * line_count as f64,
        line_count,
    }
}

pub fn measure_text(
    content: &str,
    font: &FontSpec<'_>,
    measurer: &dyn TextMeasurer,
) -> TextMetrics {
    let lines = layout_text_lines(content, font, None, measurer);
    metrics_for_lines(&lines, font, measurer)
}

pub fn measure_text_object(text: &TextObject, measurer: &dyn TextMeasurer) -> TextMetrics {
    let font = text.font();
    let lines = layout_text_lines(&text.content, &font, text.max_width, measurer);
    metrics_for_lines(&lines, &font, measurer)
}

/// Text bounds span from one font size above the first baseline down through every line.
pub fn text_bounds(text: &TextObject, measurer: &dyn TextMeasurer) -> Bounds {
    let metrics = measure_text_object(text, measurer);
    Bounds::new(text.x, text.y - text.size, metrics.width, metrics.height)
}

pub fn hit_test_shape(shape: ClipShape, point: CanvasPoint, bounds: Bounds) -> bool {
    match shape {
        ClipShape::Rectangle | ClipShape::Rounded => bounds.contains(point),
        ClipShape::Circle => {
            let center = bounds.center();
            let radius = bounds.width.min(bounds.height) / 2.0;
            let dx = point.x - center.x;
            let dy = point.y - center.y;
            dx * dx + dy * dy <= radius * radius
        }
        ClipShape::Triangle => point_in_triangle(point, triangle_vertices(bounds)),
    }
}

/// Top-middle, bottom-right, bottom-left.
pub fn triangle_vertices(bounds: Bounds) -> [CanvasPoint; 3] {
    [
        CanvasPoint::new(bounds.x + bounds.width / 2.0, bounds.y),
        CanvasPoint::new(bounds.right(), bounds.bottom()),
        CanvasPoint::new(bounds.x, bounds.bottom()),
    ]
}

fn point_in_triangle(point: CanvasPoint, [p1, p2, p3]: [CanvasPoint; 3]) -> bool {
    let denominator = (p2.y - p3.y) * (p1.x - p3.x) + (p3.x - p2.x) * (p1.y - p3.y);
    if denominator.abs() < f64::EPSILON {
        return false;
    }
    let a = ((p2.y - p3.y) * (point.x - p3.x) + (p3.x - p2.x) * (point.y - p3.y)) / denominator;
    let b = ((p3.y - p1.y) * (point.x - p3.x) + (p1.x - p3.x) * (point.y - p3.y)) / denominator;
    let c = 1.0 - a - b;
    [a, b, c].iter().all(|weight| (0.0..=1.0).contains(weight))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    Nw,
    Ne,
    Sw,
    Se,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 4] = [
        ResizeHandle::Nw,
        ResizeHandle::Ne,
        ResizeHandle::Sw,
        ResizeHandle::Se,
    ];

    pub fn corner(self, bounds: Bounds) -> CanvasPoint {
        match self {
            Self::Nw => CanvasPoint::new(bounds.x, bounds.y),
            Self::Ne => CanvasPoint::new(bounds.right(), bounds.y),
            Self::Sw => CanvasPoint::new(bounds.x, bounds.bottom()),
            Self::Se => CanvasPoint::new(bounds.right(), bounds.bottom()),
        }
    }

    pub const fn opposite(self) -> ResizeHandle {
        match self {
            Self::Nw => Self::Se,
            Self::Ne => Self::Sw,
            Self::Sw => Self::Ne,
            Self::Se => Self::Nw,
        }
    }

    const fn moves_left_edge(self) -> bool {
        matches!(self, Self::Nw | Self::Sw)
    }

    const fn moves_top_edge(self) -> bool {
        matches!(self, Self::Nw | Self::Ne)
    }
}

pub fn handle_corners(bounds: Bounds) -> [(ResizeHandle, CanvasPoint); 4] {
    ResizeHandle::ALL.map(|handle| (handle, handle.corner(bounds)))
}

pub fn resize_handle_at(
    point: CanvasPoint,
    bounds: Bounds,
    handle_size: f64,
) -> Option<ResizeHandle> {
    let half = handle_size / 2.0;
    handle_corners(bounds)
        .into_iter()
        .find(|(_, corner)| {
            (point.x - corner.x).abs() <= half && (point.y - corner.y).abs() <= half
        })
        .map(|(handle, _)| handle)
}

/// Moves the dragged corner to `pointer` while the opposite corner stays fixed.
pub fn apply_resize(
    handle: ResizeHandle,
    bounds: Bounds,
    pointer: CanvasPoint,
    min_size: f64,
) -> Bounds {
    let anchor = handle.opposite().corner(bounds);
    let width = if handle.moves_left_edge() {
        anchor.x - pointer.x
    } else {
        pointer.x - anchor.x
    }
    .max(min_size);
    let height = if handle.moves_top_edge() {
        anchor.y - pointer.y
    } else {
        pointer.y - anchor.y
    }
    .max(min_size);
    let x = if handle.moves_left_edge() {
        anchor.x - width
    } else {
        anchor.x
    };
    let y = if handle.moves_top_edge() {
        anchor.y - height
    } else {
        anchor.y
    };
    Bounds::new(x, y, width, height)
}

/// Vertical drag maps to font size; top handles shrink on downward drags.
pub fn resized_font_size(
    handle: ResizeHandle,
    origin_size: f64,
    origin_y: f64,
    pointer_y: f64,
) -> f64 {
    let delta = (pointer_y - origin_y) / TEXT_RESIZE_DIVISOR;
    let next = match handle {
        ResizeHandle::Se | ResizeHandle::Sw => origin_size + delta,
        ResizeHandle::Ne | ResizeHandle::Nw => origin_size - delta,
    };
    next.max(TEXT_MIN_FONT_SIZE)
}

pub fn image_delete_icon_center(bounds: Bounds) -> CanvasPoint {
    CanvasPoint::new(bounds.right() - 10.0, bounds.y - 10.0)
}

pub fn text_delete_icon_center(text_bounds: Bounds) -> CanvasPoint {
    CanvasPoint::new(text_bounds.right() + 15.0, text_bounds.y - 5.0)
}

pub fn point_in_delete_icon(point: CanvasPoint, center: CanvasPoint) -> bool {
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    (dx * dx + dy * dy).sqrt() <= DELETE_ICON_RADIUS
}
